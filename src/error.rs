//! Error types for attribute decoding and conversion.

use thiserror::Error;

/// Errors raised while decoding or converting attribute values.
#[derive(Debug, Error)]
pub enum Error {
    /// A value carries a type tag outside the DynamoDB attribute set.
    ///
    /// Conversion stops at the first such value.
    #[error("malformed attribute at '{path}': unknown type tag '{tag}'")]
    MalformedAttribute {
        /// Dotted path of the offending value.
        path: String,
        /// The tag that was found.
        tag: String,
    },

    /// A known tag carries a payload of the wrong shape.
    #[error("cannot decode attribute at '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// Input is not valid JSON.
    #[error("invalid JSON input: {0}")]
    Parse(#[source] serde_json::Error),

    /// The converted tree could not be encoded.
    #[error("failed to serialize converted attributes: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("DynamoDB request failed: {0}")]
    Aws(Box<aws_sdk_dynamodb::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the unrecoverable class of failures (bad type tags).
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedAttribute { .. })
    }
}

impl From<aws_sdk_dynamodb::Error> for Error {
    fn from(err: aws_sdk_dynamodb::Error) -> Self {
        Error::Aws(Box::new(err))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
