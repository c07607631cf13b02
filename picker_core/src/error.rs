use picker_protocol::ProtocolError;
use thiserror::Error;

/// Error conditions raised by the picker; none of them reach the rendered list.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("malformed interaction payload: {0}")]
    MalformedPayload(String),
    #[error("selection requires at least one entry, got {0}")]
    InvalidCount(usize),
    #[error("host transport failure: {0}")]
    TransportFailure(String),
    #[error("invalid picker config: {0}")]
    InvalidConfig(String),
}

impl From<ProtocolError> for PickerError {
    fn from(err: ProtocolError) -> Self {
        PickerError::MalformedPayload(err.to_string())
    }
}
