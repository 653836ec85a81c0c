//! Error taxonomy shared by the node model, the coercion layer and the wire parsers
//!
//! Every fallible operation in the crate reports one of five kinds:
//! - `InvalidArgument`: construction-time invariant violations (blank labels,
//!   language tags, year-month durations carrying days)
//! - `TypeCoercion`: a present value that cannot be represented in the requested host type
//! - `UnsupportedConversion`: a host value with no node mapping
//! - `MalformedWireData`: a payload that breaks its wire grammar, or a failing byte source
//! - `ProtocolCombination`: a response asserting contradictory result shapes
//!
//! Errors are `Clone` so a row sequence can replay its terminal failure.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Shared underlying cause of a coercion or wire failure
pub type Cause = Arc<dyn StdError + Send + Sync>;

/// Errors raised by nodewire
#[derive(Error, Debug, Clone)]
pub enum WireError {
    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Value cannot be represented in the requested type
    #[error("{message}")]
    TypeCoercion {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    /// Host value has no node mapping
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),

    /// Payload violates its wire grammar or the byte source failed
    #[error("Malformed wire data: {message}")]
    MalformedWireData {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    /// Both a boolean and a tabular result, or neither
    #[error("Contradictory result shape: {0}")]
    ProtocolCombination(String),
}

pub type WireResult<T> = Result<T, WireError>;

impl WireError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        WireError::InvalidArgument(message.into())
    }

    /// The canonical narrowing/marshalling failure
    pub fn marshal(
        datatype: &str,
        target: &str,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        WireError::TypeCoercion {
            message: format!("Unable to marshal {} to {}", datatype, target),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        WireError::UnsupportedConversion(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        WireError::MalformedWireData {
            message: message.into(),
            cause: None,
        }
    }

    pub fn malformed_with(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        WireError::MalformedWireData {
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        WireError::ProtocolCombination(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, WireError::InvalidArgument(_))
    }

    pub fn is_type_coercion(&self) -> bool {
        matches!(self, WireError::TypeCoercion { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, WireError::UnsupportedConversion(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, WireError::MalformedWireData { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, WireError::ProtocolCombination(_))
    }
}

// Byte-source and JSON failures enter the taxonomy here and nowhere else.

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        let message = match err.kind() {
            io::ErrorKind::UnexpectedEof => "truncated stream",
            _ => "failed reading response body",
        };
        WireError::malformed_with(message, err)
    }
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        let message = if err.is_eof() {
            "truncated stream"
        } else if err.is_io() {
            "failed reading response body"
        } else {
            "unexpected JSON structure"
        };
        WireError::malformed_with(message, err)
    }
}

/// Lexical failure carried as the cause of a coercion error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LexicalError(pub String);

impl LexicalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
