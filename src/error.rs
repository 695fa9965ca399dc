use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Which side of the pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The relay or origin could not be reached or answered with a failure status
    Fetch,
    /// The body was not a usable feed
    Parse,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Failed to parse RSS feed: {0}")]
    Xml(String),

    #[error("Failed to parse RSS feed: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("Failed to parse RSS feed: no items found")]
    NoItems,
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) | Self::Status(_) => ErrorKind::Fetch,
            Self::Xml(_) | Self::Feed(_) | Self::NoItems => ErrorKind::Parse,
        }
    }
}

impl From<quick_xml::Error> for FeedError {
    fn from(err: quick_xml::Error) -> Self {
        FeedError::Xml(err.to_string())
    }
}

// Error wrapper for route handlers
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_fetch_kind() {
        let err = FeedError::Status(500);
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(FeedError::Xml("bad".into()).kind(), ErrorKind::Parse);
        assert_eq!(FeedError::NoItems.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_app_error_debug_shows_cause() {
        let err: AppError = FeedError::Status(502).into();
        assert!(format!("{:?}", err).contains("502"));
    }

    #[test]
    fn test_messages_are_not_empty() {
        let errors = [
            FeedError::Status(404),
            FeedError::Xml("unclosed tag".into()),
            FeedError::NoItems,
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
