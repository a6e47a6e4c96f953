//! Error types for value construction, decoding, payload assembly and schema
//! configuration.

use thiserror::Error;

use crate::value::TypeKind;

/// Coarse error classification shared by every error enum in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// C001: Malformed schema configuration
    Configuration,
    /// T001: Native value of the wrong kind
    Type,
    /// V001: Invalid construction argument
    Validation,
    /// R001: Numeric value beyond its declared capacity
    Range,
    /// F001: Malformed wire bytes
    Format,
}

impl ErrorKind {
    /// Returns the error code string (e.g., "F001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "C001",
            ErrorKind::Type => "T001",
            ErrorKind::Validation => "V001",
            ErrorKind::Range => "R001",
            ErrorKind::Format => "F001",
        }
    }
}

/// Error raised when constructing or assigning a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    // === T001 ===
    #[error("[T001] {kind} expects {expected}, found {found}")]
    TypeMismatch {
        kind: TypeKind,
        expected: &'static str,
        found: &'static str,
    },

    // === V001 ===
    #[error("[V001] replacement {replacement:?} for {search:?} is not ASCII")]
    NonAsciiReplacement { search: char, replacement: String },

    #[error("[V001] the replacement table is frozen")]
    ReplacementsFrozen,

    #[error("[V001] invalid {kind}: {reason}")]
    Invalid { kind: TypeKind, reason: String },

    #[error("[V001] {value:?} is not one of the allowed options")]
    NotAnOption { value: String },

    #[error("[V001] rational denominator must not be zero")]
    ZeroDenominator,

    // === R001 ===
    #[error("[R001] {kind} value {value} outside range [{min}, {max}]")]
    OutOfRange {
        kind: TypeKind,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValueError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValueError::TypeMismatch { .. } => ErrorKind::Type,
            ValueError::OutOfRange { .. } => ErrorKind::Range,
            _ => ErrorKind::Validation,
        }
    }
}

/// Error raised when decoding wire bytes into a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("[F001] malformed {kind}: {input:?}")]
    Malformed { kind: TypeKind, input: String },

    #[error("[F001] {kind} expects {expected} bytes, found {found}")]
    UnexpectedLength {
        kind: TypeKind,
        expected: usize,
        found: usize,
    },

    #[error("[F001] invalid UTF-8 in {kind}")]
    InvalidUtf8 { kind: TypeKind },

    #[error("[F001] non-ASCII byte 0x{byte:02x} in ASCII text")]
    NonAsciiByte { byte: u8 },

    #[error("[F001] invalid base64: {0}")]
    InvalidBase64(String),

    #[error("[F001] unrecognized boolean literal {found:?} (expected \"True\" or \"False\")")]
    UnknownBoolean { found: String },

    #[error("[F001] invalid timecode: {0}")]
    InvalidTimecode(#[from] ValueError),
}

impl DecodeError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Format
    }
}

/// Error raised while assembling a model's payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} encodes to {len} bytes, exceeding maximum {max}")]
    LengthExceedsLimit {
        field: String,
        len: usize,
        max: usize,
    },

    #[error("{field} encodes to {len} bytes, below minimum {min}")]
    LengthBelowMinimum {
        field: String,
        len: usize,
        min: usize,
    },

    #[error("{field} has no tag identifier")]
    MissingTag { field: String },

    #[error("{field} tag identifier is not valid for this standard")]
    InvalidTag { field: String },

    #[error("{field} value {value} does not fit the wire representation")]
    ComponentOutOfRange { field: String, value: i64 },

    #[error("model {model} is not writable")]
    NotWritable { model: String },
}

/// Error raised when reading or assigning a property through its path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    #[error("unknown property {path:?}")]
    UnknownProperty { path: String },

    #[error("property {path:?} is read-only")]
    ReadOnly { path: String },

    #[error("model {model} is not readable")]
    NotReadable { model: String },

    #[error("cannot assign {path:?}: {source}")]
    Value {
        path: String,
        #[source]
        source: ValueError,
    },
}

/// Error raised when assembling a model from schema configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[C001] schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("[C001] cannot read schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("[C001] {context} is missing required key {key:?}")]
    MissingKey { context: String, key: &'static str },

    #[error("[C001] {context}: attribute {key:?} must be {expected}")]
    InvalidAttribute {
        context: String,
        key: String,
        expected: &'static str,
    },

    #[error("[C001] field {field:?} declares unknown type {type_name:?}")]
    UnknownType { field: String, type_name: String },

    #[error("[C001] field {field:?} declares invalid tag identifier {tagid}")]
    InvalidTag { field: String, tagid: String },

    #[error("[C001] property path {path:?} is declared more than once")]
    DuplicateProperty { path: String },
}

impl ConfigError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

/// Error raised when writing an encoded payload to disk.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("cannot write payload: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_error_kinds() {
        let mismatch = ValueError::TypeMismatch {
            kind: TypeKind::Short,
            expected: "integer",
            found: "text",
        };
        assert_eq!(mismatch.kind(), ErrorKind::Type);
        assert_eq!(mismatch.kind().code(), "T001");

        let range = ValueError::OutOfRange {
            kind: TypeKind::Short,
            value: 70000.0,
            min: 0.0,
            max: 65535.0,
        };
        assert_eq!(range.kind(), ErrorKind::Range);
        assert_eq!(ValueError::ZeroDenominator.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_messages() {
        let err = DecodeError::UnknownBoolean {
            found: "false".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "[F001] unrecognized boolean literal \"false\" (expected \"True\" or \"False\")"
        );
        assert_eq!(err.kind().code(), "F001");
    }
}
