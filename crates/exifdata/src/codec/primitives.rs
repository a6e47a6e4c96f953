//! Primitive encoding/decoding for the binary tag-oriented standards.
//!
//! Implements byte-order-aware fixed-width unsigned integers and the
//! bounds-checked reader/writer pair the payload codecs are built on.

use crate::error::DecodeError;
use crate::value::TypeKind;

/// Packing order for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Most-significant byte first (big-endian, TIFF `MM`).
    #[default]
    Msb,
    /// Least-significant byte first (little-endian, TIFF `II`).
    Lsb,
}

impl ByteOrder {
    /// Parses the schema spelling (`"MSB"` / `"LSB"`, case-insensitive).
    pub fn parse(s: &str) -> Option<ByteOrder> {
        if s.eq_ignore_ascii_case("msb") || s.eq_ignore_ascii_case("big") {
            Some(ByteOrder::Msb)
        } else if s.eq_ignore_ascii_case("lsb") || s.eq_ignore_ascii_case("little") {
            Some(ByteOrder::Lsb)
        } else {
            None
        }
    }

    /// Returns the two-byte TIFF byte-order marker.
    pub fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::Msb => *b"MM",
            ByteOrder::Lsb => *b"II",
        }
    }

    #[inline]
    pub fn pack_u16(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Msb => value.to_be_bytes(),
            ByteOrder::Lsb => value.to_le_bytes(),
        }
    }

    #[inline]
    pub fn pack_u32(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Msb => value.to_be_bytes(),
            ByteOrder::Lsb => value.to_le_bytes(),
        }
    }

    #[inline]
    pub fn pack_u64(self, value: u64) -> [u8; 8] {
        match self {
            ByteOrder::Msb => value.to_be_bytes(),
            ByteOrder::Lsb => value.to_le_bytes(),
        }
    }

    #[inline]
    pub fn unpack_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Msb => u16::from_be_bytes(bytes),
            ByteOrder::Lsb => u16::from_le_bytes(bytes),
        }
    }

    #[inline]
    pub fn unpack_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Msb => u32::from_be_bytes(bytes),
            ByteOrder::Lsb => u32::from_le_bytes(bytes),
        }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading fixed-width
/// integers in a given byte order with bounds checking.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, pos: 0, order }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, kind: TypeKind) -> Result<&'a [u8], DecodeError> {
        if self.pos + n > self.data.len() {
            return Err(DecodeError::UnexpectedLength {
                kind,
                expected: self.pos + n,
                found: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads an unsigned 16-bit integer.
    #[inline]
    pub fn read_u16(&mut self, kind: TypeKind) -> Result<u16, DecodeError> {
        let bytes = self.read_bytes(2, kind)?;
        Ok(self.order.unpack_u16([bytes[0], bytes[1]]))
    }

    /// Reads an unsigned 32-bit integer.
    #[inline]
    pub fn read_u32(&mut self, kind: TypeKind) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4, kind)?;
        Ok(self.order.unpack_u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(&self, kind: TypeKind) -> Result<(), DecodeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedLength {
                kind,
                expected: self.pos,
                found: self.data.len(),
            })
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl Writer {
    /// Creates a new writer using the given byte order.
    pub fn new(order: ByteOrder) -> Self {
        Self {
            buf: Vec::new(),
            order,
        }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize, order: ByteOrder) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            order,
        }
    }

    /// Returns the byte order used for multi-byte integers.
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&self.order.pack_u16(value));
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&self.order.pack_u32(value));
    }

    /// Pads with zero bytes until the length is a multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) {
        while self.buf.len() % alignment != 0 {
            self.buf.push(0);
        }
    }
}
