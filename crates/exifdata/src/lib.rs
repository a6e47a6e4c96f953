//! exifdata: typed EXIF, IPTC and XMP metadata models.
//!
//! This crate assembles metadata models from JSON schemas, validates values
//! assigned to their fields, and encodes the result as the wire payload of
//! each standard.
//!
//! # Overview
//!
//! - **Values**: every field holds a strongly-typed [`Value`] (ASCII text,
//!   fixed-width integers, rationals, dates, timecodes, ...), coerced from
//!   native Rust values on assignment
//! - **Models**: a [`Model`] groups [`Namespace`]s of [`Field`]s and
//!   addresses them by dotted, case-insensitive paths
//! - **Payloads**: EXIF becomes a TIFF directory, IPTC a stream of IIM
//!   datasets, XMP an RDF/XML packet
//!
//! # Quick Start
//!
//! ```rust
//! use exifdata::{EncodeOptions, Model};
//!
//! let mut xmp = Model::xmp().unwrap();
//! xmp.set("xmp.basic.label", "testing").unwrap();
//! xmp.set("basic.rating", 5i64).unwrap();
//! assert_eq!(*xmp.get("xmp.basic.rating").unwrap().unwrap(), 5i64);
//!
//! let packet = xmp.encode_with_options(EncodeOptions::pretty()).unwrap();
//! assert!(packet.starts_with(b"<?xpacket"));
//! ```
//!
//! # Modules
//!
//! - [`value`]: Typed value codecs
//! - [`model`]: Field, namespace and model containers
//! - [`schema`]: JSON schema assembly
//! - [`codec`]: Payload assembly per standard
//! - [`document`]: Markdown documentation generation
//! - [`error`]: Error types

pub mod codec;
pub mod document;
pub mod error;
pub mod model;
pub mod schema;
pub mod value;

mod util;

// Re-export commonly used types at crate root
pub use codec::{encode_model, ByteOrder, EncodeOptions, Standard};
pub use error::{
    AccessError, ConfigError, DecodeError, EncodeError, ErrorKind, OutputError, ValueError,
};
pub use model::{Attributes, Documented, Field, Model, Namespace, TagId};
pub use value::{Native, TypeKind, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
