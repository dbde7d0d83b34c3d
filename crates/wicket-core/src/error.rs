//! Per-request page errors.

use http::StatusCode;
use thiserror::Error;

/// Result type returned by pages.
pub type PageResult<T> = Result<T, PageError>;

/// A failure while rendering a single page.
///
/// These errors never affect the process: the request that hit them gets a
/// 5xx response with a short message and everything else keeps serving.
#[derive(Error, Debug)]
pub enum PageError {
    /// The page could not assemble its output.
    #[error("failed to render page '{page}': {reason}")]
    Render {
        /// Page name.
        page: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// The request could not be interpreted by the page.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An I/O failure while producing the response.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PageError {
    /// Creates a render error.
    pub fn render(page: &'static str, reason: impl Into<String>) -> Self {
        Self::Render {
            page,
            reason: reason.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status used when this error reaches the client.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Render { .. } | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_message() {
        let err = PageError::render("svg", "non-finite coordinate");
        assert_eq!(
            err.to_string(),
            "failed to render page 'svg': non-finite coordinate"
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PageError = io.into();
        assert!(matches!(err, PageError::Io(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            PageError::bad_request("bad query").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
