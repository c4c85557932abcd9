//! Error types for mediakey.
//!
//! Only failures travel through [`Error`]. Defined non-error outcomes such as
//! "no alias matched" or "quota denied" are values of the outcome types in
//! [`crate::models`].

use thiserror::Error;

/// Result type alias using mediakey's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mediakey operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Directory unreadable or unwritable, or a byte write failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sending to or receiving from the chat transport failed
    #[error("Transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty keyword".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty keyword");
    }

    #[test]
    fn test_error_display_transport() {
        let err = Error::Transport("channel closed".to_string());
        assert_eq!(err.to_string(), "Transport error: channel closed");
    }

    #[test]
    fn test_error_display_io_keeps_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
