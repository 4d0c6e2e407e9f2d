use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown {kind} kind: {value}")]
    UnknownKind { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, CleanerError>;
