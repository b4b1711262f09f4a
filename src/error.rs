//! # Error Types
//!
//! Custom error types for Hover Console using `thiserror`.
//!
//! Only the two link-level failures (`Connection`, `TransportDisconnect`) are
//! fatal to the session. Everything else is recoverable and is absorbed by the
//! component that detected it, surfaced through the session status line.

use thiserror::Error;

/// Main error type for Hover Console
#[derive(Debug, Error)]
pub enum HoverConsoleError {
    /// The startup handshake with the vehicle never completed (fatal)
    #[error("connection error: {0}")]
    Connection(String),

    /// The telemetry link failed permanently at runtime (fatal)
    #[error("transport disconnected: {0}")]
    TransportDisconnect(String),

    /// Operator input could not be turned into a command vector (recoverable)
    #[error("invalid command input: {0}")]
    InvalidCommandInput(String),

    /// Appending to the durable sample log failed (recoverable, surfaced)
    #[error("log write error: {0}")]
    LogWrite(#[from] csv::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HoverConsoleError {
    /// Whether this failure must halt the session
    ///
    /// Fatal errors cross component boundaries into session-state
    /// transitions; everything else stays local.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HoverConsoleError::Connection(_) | HoverConsoleError::TransportDisconnect(_)
        )
    }
}

/// Result type alias for Hover Console
pub type Result<T> = std::result::Result<T, HoverConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(HoverConsoleError::Connection("no heartbeat".into()).is_fatal());
        assert!(HoverConsoleError::TransportDisconnect("link lost".into()).is_fatal());
        assert!(!HoverConsoleError::InvalidCommandInput("abc".into()).is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = HoverConsoleError::InvalidCommandInput("forward must be an integer".into());
        assert_eq!(
            err.to_string(),
            "invalid command input: forward must be an integer"
        );

        let err = HoverConsoleError::Connection("no heartbeat within 30s".into());
        assert_eq!(err.to_string(), "connection error: no heartbeat within 30s");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: HoverConsoleError = io_err.into();
        assert!(matches!(err, HoverConsoleError::Io(_)));
        assert!(!err.is_fatal());
    }
}
