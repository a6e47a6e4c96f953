//! Typed metadata values.
//!
//! Every value wraps exactly one native datum and owns its own wire rules.
//! [`Value`] is the closed union a [`Field`](crate::model::Field) holds;
//! [`Native`] is what callers assign through property paths before it is
//! coerced into the field's declared [`TypeKind`].

pub mod binary;
pub mod numeric;
pub mod temporal;
pub mod text;

use std::fmt;

pub use binary::Bytes;
pub use numeric::{Boolean, Integer, Long, Rational, Real, Short};
pub use temporal::{Date, Time, Timecode, TimecodeFormat};
pub use text::{
    add_replacement, classify, freeze_replacements, replacements, string, Ascii, Replacements,
    Terminator, Text, TextEncoding, TextValue, Utf8,
};

use crate::error::ValueError;

/// Value type designations a schema field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// 7-bit text with replacement/transliteration on encode.
    Ascii,
    /// Raw UTF-8 text.
    Utf8,
    /// Text that picks ASCII or UTF-8 per value (see [`string`]).
    Text,
    /// 16-bit unsigned integer.
    Short,
    /// 32-bit unsigned integer.
    Long,
    /// Decimal-text integer.
    Integer,
    /// Decimal-text float.
    Real,
    /// Numerator/denominator pair.
    Rational,
    /// `True` / `False` literal.
    Boolean,
    Date,
    Time,
    Timecode,
    /// Opaque bytes (base64 in text payloads).
    Bytes,
}

impl TypeKind {
    /// Describes the native input this kind accepts.
    pub fn expects(self) -> &'static str {
        match self {
            TypeKind::Ascii | TypeKind::Utf8 | TypeKind::Text => "text",
            TypeKind::Short | TypeKind::Long | TypeKind::Integer => "integer",
            TypeKind::Real => "integer or float",
            TypeKind::Rational => "integer, float or \"n/d\" text",
            TypeKind::Boolean => "boolean",
            TypeKind::Date | TypeKind::Time | TypeKind::Timecode => "date/time text",
            TypeKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Ascii => "ASCII",
            TypeKind::Utf8 => "UTF8",
            TypeKind::Text => "Text",
            TypeKind::Short => "Short",
            TypeKind::Long => "Long",
            TypeKind::Integer => "Integer",
            TypeKind::Real => "Real",
            TypeKind::Rational => "Rational",
            TypeKind::Boolean => "Boolean",
            TypeKind::Date => "Date",
            TypeKind::Time => "Time",
            TypeKind::Timecode => "Timecode",
            TypeKind::Bytes => "Bytes",
        };
        f.write_str(name)
    }
}

/// A native datum as supplied by (or returned to) a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Bytes(Vec<u8>),
}

impl Native {
    /// Returns a short name for the datum's kind, used in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Native::Text(_) => "text",
            Native::Integer(_) => "integer",
            Native::Real(_) => "float",
            Native::Boolean(_) => "boolean",
            Native::Bytes(_) => "bytes",
        }
    }
}

impl From<&str> for Native {
    fn from(v: &str) -> Self {
        Native::Text(v.to_string())
    }
}

impl From<String> for Native {
    fn from(v: String) -> Self {
        Native::Text(v)
    }
}

impl From<i64> for Native {
    fn from(v: i64) -> Self {
        Native::Integer(v)
    }
}

impl From<i32> for Native {
    fn from(v: i32) -> Self {
        Native::Integer(v as i64)
    }
}

impl From<u16> for Native {
    fn from(v: u16) -> Self {
        Native::Integer(v as i64)
    }
}

impl From<u32> for Native {
    fn from(v: u32) -> Self {
        Native::Integer(v as i64)
    }
}

impl From<f64> for Native {
    fn from(v: f64) -> Self {
        Native::Real(v)
    }
}

impl From<bool> for Native {
    fn from(v: bool) -> Self {
        Native::Boolean(v)
    }
}

impl From<Vec<u8>> for Native {
    fn from(v: Vec<u8>) -> Self {
        Native::Bytes(v)
    }
}

impl From<&[u8]> for Native {
    fn from(v: &[u8]) -> Self {
        Native::Bytes(v.to_vec())
    }
}

/// A typed metadata value held by a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Ascii(Ascii),
    Utf8(Utf8),
    Short(Short),
    Long(Long),
    Integer(Integer),
    Real(Real),
    Rational(Rational),
    Boolean(Boolean),
    Date(Date),
    Time(Time),
    Timecode(Timecode),
    Bytes(Bytes),
}

impl Value {
    /// Coerces a native datum into a value of the given kind.
    ///
    /// Fails with [`ValueError::TypeMismatch`] when the datum has the wrong
    /// native kind, and with a validation or range error when it has the
    /// right kind but an unacceptable value.
    pub fn coerce(kind: TypeKind, native: Native) -> Result<Value, ValueError> {
        let value = match (kind, native) {
            (TypeKind::Ascii, Native::Text(s)) => Value::Ascii(Ascii::new(s)),
            (TypeKind::Utf8, Native::Text(s)) => Value::Utf8(Utf8::new(s)),
            (TypeKind::Text, Native::Text(s)) => string(s).into(),
            (TypeKind::Short, Native::Integer(i)) => Value::Short(Short::new(i)?),
            (TypeKind::Long, Native::Integer(i)) => Value::Long(Long::new(i)?),
            (TypeKind::Integer, Native::Integer(i)) => Value::Integer(Integer::new(i)),
            (TypeKind::Real, Native::Integer(i)) => Value::Real(Real::new(i as f64)?),
            (TypeKind::Real, Native::Real(f)) => Value::Real(Real::new(f)?),
            (TypeKind::Rational, Native::Integer(i)) => Value::Rational(Rational::new(i, 1)?),
            (TypeKind::Rational, Native::Real(f)) => Value::Rational(Rational::from_f64(f)?),
            (TypeKind::Rational, Native::Text(s)) => Value::Rational(Rational::parse(&s)?),
            (TypeKind::Boolean, Native::Boolean(b)) => Value::Boolean(Boolean::new(b)),
            (TypeKind::Date, Native::Text(s)) => Value::Date(Date::parse(&s)?),
            (TypeKind::Time, Native::Text(s)) => Value::Time(Time::parse(&s)?),
            (TypeKind::Timecode, Native::Text(s)) => Value::Timecode(Timecode::parse(&s)?),
            (TypeKind::Bytes, Native::Bytes(b)) => Value::Bytes(Bytes::new(b)),
            (kind, native) => {
                return Err(ValueError::TypeMismatch {
                    kind,
                    expected: kind.expects(),
                    found: native.type_name(),
                })
            }
        };
        Ok(value)
    }

    /// Returns the concrete kind of this value.
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::Ascii(_) => TypeKind::Ascii,
            Value::Utf8(_) => TypeKind::Utf8,
            Value::Short(_) => TypeKind::Short,
            Value::Long(_) => TypeKind::Long,
            Value::Integer(_) => TypeKind::Integer,
            Value::Real(_) => TypeKind::Real,
            Value::Rational(_) => TypeKind::Rational,
            Value::Boolean(_) => TypeKind::Boolean,
            Value::Date(_) => TypeKind::Date,
            Value::Time(_) => TypeKind::Time,
            Value::Timecode(_) => TypeKind::Timecode,
            Value::Bytes(_) => TypeKind::Bytes,
        }
    }

    /// Returns the native counterpart of this value.
    pub fn to_native(&self) -> Native {
        match self {
            Value::Ascii(v) => Native::Text(v.as_str().to_string()),
            Value::Utf8(v) => Native::Text(v.as_str().to_string()),
            Value::Short(v) => Native::Integer(v.value() as i64),
            Value::Long(v) => Native::Integer(v.value() as i64),
            Value::Integer(v) => Native::Integer(v.value()),
            Value::Real(v) => Native::Real(v.value()),
            Value::Rational(v) => Native::Text(v.to_string()),
            Value::Boolean(v) => Native::Boolean(v.value()),
            Value::Date(v) => Native::Text(v.to_string()),
            Value::Time(v) => Native::Text(v.to_string()),
            Value::Timecode(v) => Native::Text(v.to_string()),
            Value::Bytes(v) => Native::Bytes(v.as_bytes().to_vec()),
        }
    }

    /// Encodes the value using its textual wire form.
    ///
    /// This is the representation the text/XML standard embeds: fixed-width
    /// integers become decimal text and bytes become base64. ASCII text is
    /// not terminated.
    pub fn encode_text(&self) -> Vec<u8> {
        match self {
            Value::Ascii(v) => v.encode(),
            Value::Utf8(v) => v.encode(),
            Value::Short(v) => v.value().to_string().into_bytes(),
            Value::Long(v) => v.value().to_string().into_bytes(),
            Value::Integer(v) => v.encode(),
            Value::Real(v) => v.encode(),
            Value::Rational(v) => v.encode(),
            Value::Boolean(v) => v.encode(),
            Value::Date(v) => v.encode(),
            Value::Time(v) => v.encode(),
            Value::Timecode(v) => v.encode(),
            Value::Bytes(v) => v.encode(),
        }
    }

    /// Returns the numeric magnitude, if this is a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Short(v) => Some(v.value() as f64),
            Value::Long(v) => Some(v.value() as f64),
            Value::Integer(v) => Some(v.value() as f64),
            Value::Real(v) => Some(v.value()),
            Value::Rational(v) => Some(v.to_f64()),
            _ => None,
        }
    }
}

impl From<Text> for Value {
    fn from(text: Text) -> Self {
        match text {
            Text::Ascii(v) => Value::Ascii(v),
            Text::Utf8(v) => Value::Utf8(v),
        }
    }
}

/// A value equals a native datum when the datum coerces to an equal value
/// of the same kind. Timecode text is read in the stored value's format.
impl PartialEq<Native> for Value {
    fn eq(&self, other: &Native) -> bool {
        if let (Value::Timecode(timecode), Native::Text(text)) = (self, other) {
            return Timecode::parse_with(text, timecode.format())
                .is_ok_and(|parsed| parsed == *timecode);
        }
        Value::coerce(self.kind(), other.clone())
            .map(|coerced| coerced == *self)
            .unwrap_or(false)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        *self == Native::from(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        *self == Native::Integer(*other)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        *self == Native::Real(*other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        *self == Native::Boolean(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_by_kind() {
        assert_eq!(Value::coerce(TypeKind::Short, 123i64.into()).unwrap(), 123i64);
        assert_eq!(Value::coerce(TypeKind::Real, 2i64.into()).unwrap(), 2.0f64);
        assert_eq!(
            Value::coerce(TypeKind::Rational, 0.75f64.into()).unwrap().encode_text(),
            b"3/4"
        );
        assert_eq!(Value::coerce(TypeKind::Boolean, true.into()).unwrap(), true);
    }

    #[test]
    fn test_coerce_text_classifies() {
        let plain = Value::coerce(TypeKind::Text, "plain ascii text".into()).unwrap();
        assert_eq!(plain.kind(), TypeKind::Ascii);

        let wide = Value::coerce(TypeKind::Text, "text with \u{2117}".into()).unwrap();
        assert_eq!(wide.kind(), TypeKind::Utf8);
    }

    #[test]
    fn test_coerce_type_mismatch() {
        let err = Value::coerce(TypeKind::Short, "123".into()).unwrap_err();
        assert!(matches!(
            err,
            ValueError::TypeMismatch {
                kind: TypeKind::Short,
                found: "text",
                ..
            }
        ));

        let err = Value::coerce(TypeKind::Bytes, 1i64.into()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Type);
    }

    #[test]
    fn test_coerce_range_error() {
        let err = Value::coerce(TypeKind::Short, 65536i64.into()).unwrap_err();
        assert!(matches!(err, ValueError::OutOfRange { .. }));
    }

    #[test]
    fn test_compare_with_native() {
        let date = Value::coerce(TypeKind::Date, "2025-03-21".into()).unwrap();
        assert_eq!(date, "2025-03-21");
        assert_eq!(date, "2025:03:21");
        assert_ne!(date, "2025-03-22");
        assert_ne!(date, 5i64);

        let label = Value::coerce(TypeKind::Text, "testing".into()).unwrap();
        assert_eq!(label, "testing");
        assert_eq!(label.to_native(), Native::Text("testing".to_string()));
    }

    #[test]
    fn test_timecode_compares_in_its_own_format() {
        let pal = Value::Timecode(
            Timecode::parse_with("00:00:10:05", TimecodeFormat::Fps25).unwrap(),
        );
        assert_eq!(pal, "00:00:10:05");
        assert_ne!(pal, "00:00:10:06");
        assert_ne!(pal, "not a timecode");

        let drop = Value::coerce(TypeKind::Timecode, "01:00:00;02".into()).unwrap();
        assert_eq!(drop, "01:00:00;02");
    }
}
