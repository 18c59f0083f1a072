use thiserror::Error;

/// Top-level error type for Funil.
#[derive(Debug, Error)]
pub enum FunilError {
    /// Error from an external AI service (completion, inference, vision, speech).
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Report encryption or decryption error.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
