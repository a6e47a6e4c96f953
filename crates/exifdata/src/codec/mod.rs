//! Payload assembly for the three metadata standards.
//!
//! Each standard walks a [`Model`](crate::model::Model)'s namespaces in
//! registration order and fields in schema order, encodes every assigned
//! value with that standard's rules, and frames the result:
//!
//! - [`exif`]: a TIFF header and one image file directory.
//! - [`iptc`]: IIM datasets.
//! - [`xmp`]: an RDF/XML packet.

pub mod exif;
pub mod iptc;
pub mod primitives;
pub mod xmp;

use std::fmt;

pub use primitives::{ByteOrder, Reader, Writer};

use crate::error::EncodeError;
use crate::model::{Field, Model};
use crate::value::TypeKind;

/// The metadata standard a model serializes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standard {
    /// Binary tag-oriented, TIFF-framed.
    Exif,
    /// Binary dataset-oriented (IIM).
    Iptc,
    /// Text/XML-oriented (RDF).
    Xmp,
}

impl Standard {
    pub const ALL: [Standard; 3] = [Standard::Exif, Standard::Iptc, Standard::Xmp];

    pub fn name(self) -> &'static str {
        match self {
            Standard::Exif => "EXIF",
            Standard::Iptc => "IPTC",
            Standard::Xmp => "XMP",
        }
    }

    /// Matches a model name case-insensitively.
    pub fn from_name(name: &str) -> Option<Standard> {
        Standard::ALL
            .into_iter()
            .find(|standard| standard.name().eq_ignore_ascii_case(name))
    }

    /// IIM mandates big-endian lengths; EXIF defaults to it.
    pub fn default_byte_order(self) -> ByteOrder {
        ByteOrder::Msb
    }

    /// Resolves a schema type name to a value kind.
    ///
    /// Each standard has its own vocabulary; the XMP value types built on
    /// text (`URI`, `ProperName`, ...) all resolve to [`TypeKind::Text`].
    pub fn resolve_type(self, type_name: &str) -> Option<TypeKind> {
        let name = type_name.to_ascii_lowercase();
        let shared = match name.as_str() {
            "ascii" => Some(TypeKind::Ascii),
            "utf8" | "utf-8" => Some(TypeKind::Utf8),
            "short" => Some(TypeKind::Short),
            "long" => Some(TypeKind::Long),
            "rational" => Some(TypeKind::Rational),
            "date" => Some(TypeKind::Date),
            "time" => Some(TypeKind::Time),
            "bytes" => Some(TypeKind::Bytes),
            _ => None,
        };
        if shared.is_some() {
            return shared;
        }

        match (self, name.as_str()) {
            (Standard::Exif, "undefined") => Some(TypeKind::Bytes),
            (Standard::Exif, "datetime") => Some(TypeKind::Date),
            (Standard::Exif, "string") => Some(TypeKind::Text),

            (Standard::Iptc, "string" | "text") => Some(TypeKind::Text),
            (Standard::Iptc, "integer" | "digits") => Some(TypeKind::Integer),
            (Standard::Iptc, "binary") => Some(TypeKind::Bytes),

            (
                Standard::Xmp,
                "text" | "string" | "propername" | "agentname" | "uri" | "url" | "mimetype"
                | "locale" | "guid" | "renditionclass" | "choice",
            ) => Some(TypeKind::Text),
            (Standard::Xmp, "integer") => Some(TypeKind::Integer),
            (Standard::Xmp, "real") => Some(TypeKind::Real),
            (Standard::Xmp, "boolean") => Some(TypeKind::Boolean),
            (Standard::Xmp, "timecode") => Some(TypeKind::Timecode),
            (Standard::Xmp, "thumbnail" | "binary") => Some(TypeKind::Bytes),
            _ => None,
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for encoding a model payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Indent the XMP packet with two spaces per level and break lines
    /// between elements. Ignored by the binary standards.
    pub pretty: bool,
}

impl EncodeOptions {
    /// Creates default (compact) encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates pretty-printing options.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Assembles the payload for `model` according to its standard.
pub fn encode_model(model: &Model, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    if !model.writable() {
        return Err(EncodeError::NotWritable {
            model: model.name().to_string(),
        });
    }
    match model.standard() {
        Standard::Exif => exif::encode(model),
        Standard::Iptc => iptc::encode(model),
        Standard::Xmp => xmp::encode(model, options),
    }
}

/// Enforces a field's `bytes_min` / `bytes_max` on its encoded length.
pub(crate) fn check_length(field: &Field, len: usize) -> Result<(), EncodeError> {
    let attributes = field.attributes();
    if let Some(max) = attributes.bytes_max {
        if len > max {
            return Err(EncodeError::LengthExceedsLimit {
                field: field.path().to_string(),
                len,
                max,
            });
        }
    }
    if let Some(min) = attributes.bytes_min {
        if len < min {
            return Err(EncodeError::LengthBelowMinimum {
                field: field.path().to_string(),
                len,
                min,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_vocabulary() {
        assert_eq!(Standard::Exif.resolve_type("ASCII"), Some(TypeKind::Ascii));
        assert_eq!(Standard::Exif.resolve_type("Undefined"), Some(TypeKind::Bytes));
        assert_eq!(Standard::Exif.resolve_type("Real"), None);
        assert_eq!(Standard::Iptc.resolve_type("String"), Some(TypeKind::Text));
        assert_eq!(Standard::Xmp.resolve_type("URL"), Some(TypeKind::Text));
        assert_eq!(Standard::Xmp.resolve_type("Integer"), Some(TypeKind::Integer));
        assert_eq!(Standard::Xmp.resolve_type("Thing"), None);
    }

    #[test]
    fn test_standard_names() {
        assert_eq!(Standard::from_name("xmp"), Some(Standard::Xmp));
        assert_eq!(Standard::from_name("Exif"), Some(Standard::Exif));
        assert_eq!(Standard::from_name("id3"), None);
    }
}
