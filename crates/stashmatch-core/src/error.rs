use thiserror::Error;

/// All errors that can occur in stashmatch-core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid entity kind: {0}")]
    InvalidKind(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
