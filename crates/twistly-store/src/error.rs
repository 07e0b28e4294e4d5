use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Every failure a store operation can surface. Nothing here is retried:
/// each error is reported once, synchronously, to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already in use")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("text must not be empty")]
    EmptyText,

    #[error("unknown reaction emoji: {0}")]
    UnknownEmoji(String),

    #[error("only images and videos are allowed (got {0})")]
    UnsupportedMedia(String),

    #[error("you must be logged in")]
    NotAuthenticated,

    #[error("corrupt stored value under {key}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}
