use thiserror::Error;

/// Top-level error type for Parley.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// The translation provider could not be reached or returned a failure.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A locale code that is not in the catalog.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    /// The settings file could not be read or parsed.
    #[error("config unreadable: {0}")]
    ConfigUnreadable(String),

    /// The settings file could not be written.
    #[error("config write failed: {0}")]
    ConfigWrite(String),

    /// An outbound reply could not be delivered.
    #[error("reply delivery failed: {0}")]
    ReplyDelivery(String),

    /// Error from the chat platform connection.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
