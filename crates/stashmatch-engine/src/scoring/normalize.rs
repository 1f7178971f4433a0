/// Canonical form of a name for comparison: lower-cased and trimmed.
///
/// Internal whitespace is left as-is, so `"a  b"` and `"a b"` still differ
/// by one edit.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
