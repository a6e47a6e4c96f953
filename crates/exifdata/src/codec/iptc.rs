//! IPTC (IIM) payload assembly.
//!
//! Every assigned field becomes one dataset:
//!
//! ```text
//! 0x1C | record u8 | dataset u8 | length u16 big-endian | data
//! ```
//!
//! Datasets are grouped by ascending record number, keeping schema order
//! within a record. When any text value needs UTF-8, a `1:90` coded
//! character set dataset declaring UTF-8 is emitted first.

use tracing::debug;

use crate::codec::{check_length, ByteOrder, Writer};
use crate::error::EncodeError;
use crate::model::{Field, Model, TagId};
use crate::value::Value;

pub const TAG_MARKER: u8 = 0x1c;

/// Largest data length expressible in a standard (non-extended) dataset.
pub const MAX_DATASET_LEN: usize = 0x7fff;

/// `ESC % G`: ISO 2022 designation of UTF-8.
pub const UTF8_DESIGNATION: &[u8] = b"\x1b%G";

const CHARSET_RECORD: u8 = 1;
const CHARSET_DATASET: u8 = 90;

/// One encoded dataset before framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub record: u8,
    pub dataset: u8,
    pub data: Vec<u8>,
}

impl Dataset {
    fn write(&self, writer: &mut Writer) {
        writer.write_byte(TAG_MARKER);
        writer.write_byte(self.record);
        writer.write_byte(self.dataset);
        writer.write_u16(self.data.len() as u16);
        writer.write_bytes(&self.data);
    }
}

fn dataset_id(field: &Field) -> Result<(u8, u8), EncodeError> {
    match field.attributes().tagid {
        Some(TagId::Dataset { record, dataset }) => Ok((record, dataset)),
        Some(TagId::Number(_)) => Err(EncodeError::InvalidTag {
            field: field.path().to_string(),
        }),
        None => Err(EncodeError::MissingTag {
            field: field.path().to_string(),
        }),
    }
}

/// Encodes one field's value as a dataset.
///
/// Fixed-width integers use `order`; text is never terminated.
pub fn dataset(field: &Field, value: &Value, order: ByteOrder) -> Result<Dataset, EncodeError> {
    let (record, dataset) = dataset_id(field)?;
    let data = match value {
        Value::Short(v) => v.encode(order).to_vec(),
        Value::Long(v) => v.encode(order).to_vec(),
        Value::Date(v) => v.encode_iptc(),
        Value::Time(v) => v.encode_iptc(),
        Value::Bytes(v) => v.as_bytes().to_vec(),
        other => other.encode_text(),
    };

    check_length(field, data.len())?;
    if data.len() > MAX_DATASET_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field: field.path().to_string(),
            len: data.len(),
            max: MAX_DATASET_LEN,
        });
    }
    Ok(Dataset {
        record,
        dataset,
        data,
    })
}

pub fn encode(model: &Model) -> Result<Vec<u8>, EncodeError> {
    let order = model.byte_order();
    let mut datasets = Vec::new();
    let mut utf8 = false;
    for (_, field) in model.fields() {
        if let Some(value) = field.value() {
            utf8 |= matches!(value, Value::Utf8(_));
            datasets.push(dataset(field, value, order)?);
        }
    }

    let declared = datasets
        .iter()
        .any(|d| d.record == CHARSET_RECORD && d.dataset == CHARSET_DATASET);
    if utf8 && !declared {
        datasets.insert(
            0,
            Dataset {
                record: CHARSET_RECORD,
                dataset: CHARSET_DATASET,
                data: UTF8_DESIGNATION.to_vec(),
            },
        );
    }
    datasets.sort_by_key(|d| d.record);

    let mut writer = Writer::new(ByteOrder::Msb);
    for dataset in &datasets {
        dataset.write(&mut writer);
    }
    debug!(
        "Assembled IPTC stream with {} datasets ({} bytes, utf8: {})",
        datasets.len(),
        writer.len(),
        utf8
    );
    Ok(writer.into_bytes())
}
