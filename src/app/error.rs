use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Http(#[from] minreq::Error),

    #[error("Session expired. Please login again.")]
    Unauthorized,

    #[error("Server returned status {status}: {message}")]
    Api { status: i32, message: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

impl AppError {
    /// True when the stored credential is no longer accepted and the user
    /// must re-authenticate.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Api {
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "Server returned status 500: internal error");

        let err = AppError::Settings("bad dim level".to_string());
        assert_eq!(err.to_string(), "Settings error: bad dim level");
    }

    #[test]
    fn test_auth_failure_detection() {
        assert!(AppError::Unauthorized.is_auth_failure());
        assert!(
            !AppError::Api {
                status: 500,
                message: String::new()
            }
            .is_auth_failure()
        );
    }
}
