use thiserror::Error;

use crate::backends::JellyfinApiError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PagerError {
    /// Indexed access before `init()` has established the total count
    #[error("Pager has not been initialized")]
    NotInitialized,

    #[error("Index {index} out of bounds for list of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Failed to fetch total count: {0}")]
    Init(#[source] JellyfinApiError),

    #[error("Failed to fetch page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: JellyfinApiError,
    },

    /// The owning scope was torn down while the fetch was pending
    #[error("Pager scope was cancelled")]
    Cancelled,

    #[error("Page fetch task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid pager configuration: {0}")]
    InvalidConfig(String),

    #[error("No tokio runtime available to run page fetches")]
    NoRuntime,
}

impl PagerError {
    /// The underlying API error for fetch and probe failures.
    pub fn api_error(&self) -> Option<&JellyfinApiError> {
        match self {
            PagerError::Init(source) | PagerError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}
