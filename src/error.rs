//! Error types for persistor operations.

use crate::bus::BusError;
use thiserror::Error;

/// All errors that can occur while relaying operations to the persistor.
#[derive(Debug, Error)]
pub enum Error {
    /// The event bus failed to deliver the request or the reply.
    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    /// The persistor replied with `status: "error"`.
    #[error("persistor error: {0}")]
    Persistor(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// BSON error.
    #[error("bson error: {0}")]
    Bson(String),

    /// Date parse error.
    #[error("date parse error: {0}")]
    DateParse(String),
}

impl Error {
    /// Create a persistor error from a reply message.
    pub fn persistor(msg: impl Into<String>) -> Self {
        Error::Persistor(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Check if this error originated in the bus rather than the persistor.
    pub fn is_bus_error(&self) -> bool {
        matches!(self, Error::Bus(_))
    }

    /// Check if this is a reply timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Bus(BusError::Timeout))
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Bus(_) => ErrorKind::Bus,
            Error::Persistor(_) => ErrorKind::Persistor,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Serialization(_) | Error::Deserialization(_) | Error::Bson(_) => {
                ErrorKind::Serialization
            }
            Error::DateParse(_) => ErrorKind::Serialization,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bson::ser::Error> for Error {
    fn from(err: bson::ser::Error) -> Self {
        Error::Bson(err.to_string())
    }
}

impl From<bson::de::Error> for Error {
    fn from(err: bson::de::Error) -> Self {
        Error::Bson(err.to_string())
    }
}

/// Result type alias for persistor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kind enumeration for pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bus delivery error.
    Bus,
    /// Persistor-side error.
    Persistor,
    /// Invalid argument.
    InvalidArgument,
    /// Serialization error.
    Serialization,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistor_error_display() {
        let err = Error::persistor("duplicate key");
        assert_eq!(err.to_string(), "persistor error: duplicate key");
        assert_eq!(err.kind(), ErrorKind::Persistor);
    }

    #[test]
    fn test_bus_error_classification() {
        let err: Error = BusError::Timeout.into();
        assert!(err.is_bus_error());
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Bus);
    }

    #[test]
    fn test_no_handler_is_not_timeout() {
        let err: Error = BusError::NoHandler("wse.mongodb.persistor".to_string()).into();
        assert!(err.is_bus_error());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_invalid_argument() {
        let err = Error::invalid_argument("documents must not be empty");
        assert!(err.to_string().contains("documents must not be empty"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_error_message() {
        let err = Error::persistor("query helper error");
        assert_eq!(err.message(), "persistor error: query helper error");
    }
}
