use std::io;
use thiserror::Error;

/// Convenient alias used by every fallible operation of this crate.
pub type Result<T> = std::result::Result<T, MessageError>;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid argument: {reason}")]
    Validation { reason: String },

    #[error("invalid uri: {reason}")]
    Parse { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl MessageError {
    pub fn validation<S: ToString>(str: S) -> Self {
        Self::Validation { reason: str.to_string() }
    }

    pub fn parse<S: ToString>(str: S) -> Self {
        Self::Parse { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Error raised when an operation hits a stream whose resource was closed or detached.
    pub fn detached() -> Self {
        Self::io(io::Error::new(io::ErrorKind::NotConnected, "the stream is detached"))
    }

    /// Error raised when a stream lacks the capability an operation needs.
    pub fn unsupported(capability: &str) -> Self {
        Self::io(io::Error::new(io::ErrorKind::Unsupported, format!("the stream is not {capability}")))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
