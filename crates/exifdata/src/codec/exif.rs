//! EXIF payload assembly.
//!
//! The payload is a TIFF structure in the model's byte order:
//!
//! ```text
//! "MM" | "II"      byte-order marker
//! 42               u16
//! 8                u32 offset of the IFD
//! count            u16
//! entry * count    tag u16, type u16, count u32, value-or-offset u32
//! 0                u32 next IFD offset
//! data area        values longer than four bytes, each word aligned
//! ```
//!
//! Entries are written in ascending tag order. ASCII values are NUL
//! terminated.
//!
//! Only IFD0 is produced. Every assigned tag lands in it, including tags
//! that readers expect in the Exif sub-IFD such as ExifVersion (0x9000);
//! no Exif IFD pointer is generated.

use tracing::debug;

use crate::codec::{check_length, ByteOrder, Writer};
use crate::error::EncodeError;
use crate::model::{Field, Model, TagId};
use crate::value::{Terminator, Value};

/// TIFF field type codes.
pub mod types {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;
    pub const UNDEFINED: u16 = 7;
    pub const SLONG: u16 = 9;
    pub const DOUBLE: u16 = 12;
    pub const UTF8: u16 = 129;

    /// Size in bytes of one component of the given type.
    pub fn unit_size(type_code: u16) -> usize {
        match type_code {
            SHORT => 2,
            LONG | SLONG => 4,
            RATIONAL | DOUBLE => 8,
            _ => 1,
        }
    }
}

pub const HEADER_SIZE: usize = 8;
pub const ENTRY_SIZE: usize = 12;
pub const MAGIC: u16 = 42;

/// One encoded directory entry before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub tag: u16,
    pub type_code: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

fn tag_number(field: &Field) -> Result<u16, EncodeError> {
    match field.attributes().tagid {
        Some(TagId::Number(tag)) => Ok(tag),
        Some(TagId::Dataset { .. }) => Err(EncodeError::InvalidTag {
            field: field.path().to_string(),
        }),
        None => Err(EncodeError::MissingTag {
            field: field.path().to_string(),
        }),
    }
}

fn terminated(mut bytes: Vec<u8>) -> Vec<u8> {
    bytes.push(0);
    bytes
}

/// Encodes one field's value as a directory entry.
pub fn entry(field: &Field, value: &Value, order: ByteOrder) -> Result<Entry, EncodeError> {
    let tag = tag_number(field)?;
    let out_of_range = |value: i64| EncodeError::ComponentOutOfRange {
        field: field.path().to_string(),
        value,
    };

    let (type_code, data) = match value {
        Value::Ascii(v) => (types::ASCII, v.encode_terminated(Terminator::Nul)),
        Value::Utf8(v) => (types::UTF8, terminated(v.encode())),
        Value::Short(v) => (types::SHORT, v.encode(order).to_vec()),
        Value::Long(v) => (types::LONG, v.encode(order).to_vec()),
        Value::Integer(v) => {
            let n = i32::try_from(v.value()).map_err(|_| out_of_range(v.value()))?;
            (types::SLONG, order.pack_u32(n as u32).to_vec())
        }
        Value::Real(v) => (types::DOUBLE, order.pack_u64(v.value().to_bits()).to_vec()),
        Value::Rational(v) => {
            let (numerator, denominator) = v
                .to_u32_pair()
                .ok_or_else(|| out_of_range(v.numerator().min(v.denominator())))?;
            let mut data = order.pack_u32(numerator).to_vec();
            data.extend_from_slice(&order.pack_u32(denominator));
            (types::RATIONAL, data)
        }
        Value::Boolean(v) => (types::BYTE, vec![v.value() as u8]),
        Value::Date(v) => (types::ASCII, terminated(v.encode_exif())),
        Value::Time(v) => (types::ASCII, terminated(v.encode())),
        Value::Timecode(v) => (types::ASCII, terminated(v.encode())),
        Value::Bytes(v) => (types::UNDEFINED, v.as_bytes().to_vec()),
    };

    check_length(field, data.len())?;
    Ok(Entry {
        tag,
        type_code,
        count: (data.len() / types::unit_size(type_code)) as u32,
        data,
    })
}

/// Lays entries out as a TIFF header followed by a single IFD.
pub fn layout(mut entries: Vec<Entry>, order: ByteOrder) -> Vec<u8> {
    entries.sort_by_key(|e| e.tag);

    let data_start = HEADER_SIZE + 2 + ENTRY_SIZE * entries.len() + 4;
    let mut writer = Writer::with_capacity(data_start, order);
    let mut area = Writer::new(order);

    writer.write_bytes(&order.marker());
    writer.write_u16(MAGIC);
    writer.write_u32(HEADER_SIZE as u32);

    writer.write_u16(entries.len() as u16);
    for entry in &entries {
        writer.write_u16(entry.tag);
        writer.write_u16(entry.type_code);
        writer.write_u32(entry.count);
        if entry.data.len() <= 4 {
            writer.write_bytes(&entry.data);
            for _ in entry.data.len()..4 {
                writer.write_byte(0);
            }
        } else {
            writer.write_u32((data_start + area.len()) as u32);
            area.write_bytes(&entry.data);
            area.align(2);
        }
    }
    writer.write_u32(0);
    writer.write_bytes(area.as_bytes());
    writer.into_bytes()
}

pub fn encode(model: &Model) -> Result<Vec<u8>, EncodeError> {
    let order = model.byte_order();
    let mut entries = Vec::new();
    for (_, field) in model.fields() {
        if let Some(value) = field.value() {
            entries.push(entry(field, value, order)?);
        }
    }

    let count = entries.len();
    let payload = layout(entries, order);
    debug!(
        "Assembled EXIF directory with {} entries ({} bytes, {:?})",
        count,
        payload.len(),
        order
    );
    Ok(payload)
}
