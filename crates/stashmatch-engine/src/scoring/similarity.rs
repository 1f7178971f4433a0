use crate::scoring::normalize::normalize;

/// Unit-cost Levenshtein distance over `char`s. Case-sensitive; callers
/// normalize first when they want otherwise.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Similarity of two names on a 0–100 scale, after [`normalize`].
///
/// Two empty names score 0, not 100: an empty name is never a confident
/// match for anything, including another empty name.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0;
    }

    let distance = edit_distance(&a, &b);
    let ratio = 1.0 - distance as f64 / longest as f64;
    (100.0 * ratio).round().clamp(0.0, 100.0) as u8
}
