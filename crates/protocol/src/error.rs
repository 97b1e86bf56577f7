//! Protocol error types
//!
//! Errors that can occur when encoding or decoding packet records.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Record is too short to contain the expected fields
    #[error("record too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort { expected: usize, actual: usize },

    /// A serialized value exceeds the maximum encodable size
    #[error("value for key '{key}' is too large: {size} bytes exceeds maximum {max}")]
    ValueTooLarge {
        key: String,
        size: usize,
        max: usize,
    },

    /// Unknown record format version
    #[error("unsupported record version: {0}")]
    UnsupportedVersion(i32),

    /// Unknown value type tag
    #[error("invalid value tag: {0}")]
    InvalidValueTag(u8),

    /// Negative or nonsensical length field
    #[error("invalid length field: {0}")]
    InvalidLength(i32),

    /// A string field is not valid UTF-8
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,
}

impl ProtocolError {
    /// Create a record too short error
    #[inline]
    pub fn too_short(expected: usize, actual: usize) -> Self {
        Self::RecordTooShort { expected, actual }
    }

    /// Create a value too large error
    #[inline]
    pub fn value_too_large(key: impl Into<String>, size: usize) -> Self {
        Self::ValueTooLarge {
            key: key.into(),
            size,
            max: crate::MAX_VALUE_SIZE,
        }
    }

    /// Check if this error ends a record without poisoning the stream
    ///
    /// Recoverable errors stop decoding of the current record; the caller
    /// keeps whatever was parsed before the error and can advance to the
    /// next record.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RecordTooShort { .. }
                | Self::UnsupportedVersion(_)
                | Self::InvalidValueTag(_)
                | Self::InvalidLength(_)
        )
    }
}
