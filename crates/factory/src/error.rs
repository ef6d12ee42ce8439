use micro_message::MessageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FactoryError>;

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Message {
        #[from]
        source: MessageError,
    },

    #[error("invalid json body: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid form body: {source}")]
    Form {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("invalid media type: {source}")]
    MediaType {
        #[from]
        source: mime::FromStrError,
    },
}

impl FactoryError {
    /// The underlying message error, if this error came from building a message.
    pub fn as_message_error(&self) -> Option<&MessageError> {
        match self {
            Self::Message { source } => Some(source),
            _ => None,
        }
    }

    pub fn is_body_error(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::Form { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_sources() {
        let error: FactoryError = MessageError::validation("bad method").into();
        assert!(error.as_message_error().is_some_and(MessageError::is_validation));
        assert_eq!(error.to_string(), "invalid argument: bad method");

        let error: FactoryError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(error.is_body_error());
        assert!(error.as_message_error().is_none());

        let error: FactoryError = "not a mime".parse::<mime::Mime>().unwrap_err().into();
        assert!(error.to_string().starts_with("invalid media type"));
        assert!(!error.is_body_error());
    }
}
