/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can decide between a user-facing guidance message and a logged failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid wallet address: {0:?}")]
    InvalidAddress(String),

    #[error("asset name is empty")]
    EmptyAsset,

    #[error("{provider} lookup failed: {reason}")]
    LookupFailed {
        provider: &'static str,
        reason: String,
    },

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn lookup(provider: &'static str, reason: impl Into<String>) -> Self {
        Error::LookupFailed {
            provider,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
