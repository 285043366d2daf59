use thiserror::Error;
use tonic::{Code, Status};

#[derive(Debug, Error)]
pub enum KeyProviderError {
    #[error("invalid protocol input: {0}")]
    InvalidProtocol(#[source] serde_json::Error),

    #[error("wrong operation: expected {expected}, got {actual}")]
    WrongOperation { expected: &'static str, actual: String },

    #[error("missing {0} parameters")]
    MissingParameters(&'static str),

    #[error("keyprovider {0} is missing in parameters")]
    MissingProvider(String),

    #[error("no key id listed for keyprovider {0}")]
    MissingKey(String),

    #[error("unmarshal annotation packet: {0}")]
    MalformedAnnotation(#[source] serde_json::Error),

    #[error("marshal {0}: {1}")]
    Serialize(&'static str, #[source] serde_json::Error),

    #[error("kms backend: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),
}

impl KeyProviderError {
    /// Caller-attributable failures map to `InvalidArgument`; everything
    /// else is a fault of this service or the backend.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            KeyProviderError::InvalidProtocol(_)
                | KeyProviderError::WrongOperation { .. }
                | KeyProviderError::MissingParameters(_)
                | KeyProviderError::MissingProvider(_)
                | KeyProviderError::MissingKey(_)
        )
    }
}

impl From<KeyProviderError> for Status {
    fn from(err: KeyProviderError) -> Self {
        let code = if err.is_invalid_input() { Code::InvalidArgument } else { Code::Internal };
        Status::new(code, err.to_string())
    }
}
