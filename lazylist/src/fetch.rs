use async_trait::async_trait;
use serde_json::Value;

use crate::PageRequest;

/// Why a page could not be fetched.
///
/// Every variant is absorbed by the controller: it ends up as a message in
/// [`crate::LoadState::error`] and is forwarded to the error callback, never returned to the
/// caller of a load operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// Anything else, including a response that could not be interpreted.
    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(err.to_string())
    }
}

/// The remote source of pages.
///
/// Implementations issue one request and hand back the parsed JSON envelope; item and total
/// extraction happens in the controller so it can be configured per list.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: PageRequest) -> Result<Value, FetchError>;
}
