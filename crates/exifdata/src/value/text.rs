//! Text values: ASCII, UTF-8 and the auto-selecting `String` classification.
//!
//! ASCII encoding consults a replacement table before falling back to
//! compatibility decomposition (to strip diacritics) and finally `?`.
//!
//! # Replacement registry
//!
//! The process-wide table starts as `{"©": "(c)"}` and is guarded by an
//! `RwLock`. Mutation through [`add_replacement`] is serialized by the lock,
//! but an encode running on another thread may observe the table either
//! before or after a concurrent registration. Callers that encode in
//! parallel register everything up front and then call
//! [`freeze_replacements`]; after that, registration fails with
//! [`ValueError::ReplacementsFrozen`] and every encode sees the same table.
//! Callers that want no shared state at all pass an explicit
//! [`Replacements`] to [`Ascii::encode_with`].

use std::fmt;
use std::sync::{PoisonError, RwLock};

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{DecodeError, ValueError};
use crate::value::TypeKind;

/// Whether an encoded ASCII value carries a trailing NUL byte.
///
/// Fixed-length tag fields (EXIF) terminate; free text (IPTC, XMP) does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    #[default]
    None,
    Nul,
}

// =============================================================================
// REPLACEMENT TABLE
// =============================================================================

/// Mapping from a single character to its ASCII-only substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacements {
    table: FxHashMap<char, String>,
}

impl Default for Replacements {
    fn default() -> Self {
        let mut table = FxHashMap::default();
        table.insert('\u{a9}', "(c)".to_string());
        Self { table }
    }
}

impl Replacements {
    /// Creates the seeded table (`©` → `(c)`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with no entries.
    pub fn empty() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    /// Registers `replacement` as the substitute for `search`.
    pub fn add(&mut self, search: char, replacement: &str) -> Result<(), ValueError> {
        if !replacement.is_ascii() {
            return Err(ValueError::NonAsciiReplacement {
                search,
                replacement: replacement.to_string(),
            });
        }
        self.table.insert(search, replacement.to_string());
        Ok(())
    }

    pub fn get(&self, search: char) -> Option<&str> {
        self.table.get(&search).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns true if every character is ASCII or has a registered substitute.
    pub fn covers(&self, value: &str) -> bool {
        value.chars().all(|c| c.is_ascii() || self.table.contains_key(&c))
    }

    /// Rewrites `value` into pure ASCII.
    pub fn transliterate(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            if let Some(replacement) = self.get(c) {
                out.push_str(replacement);
            } else if c.is_ascii() {
                out.push(c);
            } else {
                push_decomposed(&mut out, c);
            }
        }
        out
    }
}

/// Pushes the ASCII base of `c` under canonical decomposition, dropping
/// combining marks; anything else becomes `?`. Compatibility forms such as
/// superscripts and ligatures are not folded.
fn push_decomposed(out: &mut String, c: char) {
    let start = out.len();
    for d in std::iter::once(c).nfd() {
        if d.is_ascii() {
            out.push(d);
        } else if !is_combining_mark(d) {
            out.push('?');
        }
    }
    if out.len() == start {
        out.push('?');
    }
}

#[derive(Debug)]
struct Registry {
    table: Replacements,
    frozen: bool,
}

impl Registry {
    fn new() -> Self {
        Self {
            table: Replacements::default(),
            frozen: false,
        }
    }

    fn add(&mut self, search: char, replacement: &str) -> Result<(), ValueError> {
        if self.frozen {
            return Err(ValueError::ReplacementsFrozen);
        }
        self.table.add(search, replacement)
    }
}

lazy_static! {
    static ref REGISTRY: RwLock<Registry> = RwLock::new(Registry::new());
}

fn with_registry<R>(f: impl FnOnce(&Replacements) -> R) -> R {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    f(&registry.table)
}

/// Registers a substitute in the process-wide replacement table.
pub fn add_replacement(search: char, replacement: &str) -> Result<(), ValueError> {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .add(search, replacement)
}

/// Makes the process-wide replacement table read-only.
pub fn freeze_replacements() {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .frozen = true;
}

/// Returns a snapshot of the process-wide replacement table.
pub fn replacements() -> Replacements {
    with_registry(Replacements::clone)
}

// =============================================================================
// TEXT VALUES
// =============================================================================

/// Which text representation a value uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Ascii,
    Utf8,
}

/// Shared capability of the text value types.
pub trait TextValue {
    fn as_str(&self) -> &str;

    fn encoding(&self) -> TextEncoding;

    /// Encodes without a terminator.
    fn encode(&self) -> Vec<u8>;
}

/// Text encoded as 7-bit ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ascii {
    value: String,
}

impl Ascii {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Encodes against the process-wide table, without a terminator.
    pub fn encode(&self) -> Vec<u8> {
        self.encode_terminated(Terminator::None)
    }

    /// Encodes against the process-wide table with the given terminator policy.
    pub fn encode_terminated(&self, terminator: Terminator) -> Vec<u8> {
        with_registry(|table| self.encode_with(table, terminator))
    }

    /// Encodes against an explicit table.
    pub fn encode_with(&self, table: &Replacements, terminator: Terminator) -> Vec<u8> {
        let mut bytes = table.transliterate(&self.value).into_bytes();
        if terminator == Terminator::Nul {
            bytes.push(0);
        }
        bytes
    }

    /// Decodes ASCII bytes; trailing NUL terminators are stripped.
    pub fn decode(bytes: &[u8]) -> Result<Ascii, DecodeError> {
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let body = &bytes[..end];
        if let Some(byte) = body.iter().find(|b| !b.is_ascii()) {
            return Err(DecodeError::NonAsciiByte { byte: *byte });
        }
        std::str::from_utf8(body)
            .map(Ascii::new)
            .map_err(|_| DecodeError::InvalidUtf8 {
                kind: TypeKind::Ascii,
            })
    }
}

impl TextValue for Ascii {
    fn as_str(&self) -> &str {
        &self.value
    }

    fn encoding(&self) -> TextEncoding {
        TextEncoding::Ascii
    }

    fn encode(&self) -> Vec<u8> {
        Ascii::encode(self)
    }
}

/// Text encoded as raw UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utf8 {
    value: String,
}

impl Utf8 {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn encode(&self) -> Vec<u8> {
        self.value.as_bytes().to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Utf8, DecodeError> {
        std::str::from_utf8(bytes)
            .map(Utf8::new)
            .map_err(|_| DecodeError::InvalidUtf8 {
                kind: TypeKind::Utf8,
            })
    }
}

impl TextValue for Utf8 {
    fn as_str(&self) -> &str {
        &self.value
    }

    fn encoding(&self) -> TextEncoding {
        TextEncoding::Utf8
    }

    fn encode(&self) -> Vec<u8> {
        Utf8::encode(self)
    }
}

/// Result of classifying text with [`string`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Text {
    Ascii(Ascii),
    Utf8(Utf8),
}

impl TextValue for Text {
    fn as_str(&self) -> &str {
        match self {
            Text::Ascii(v) => v.as_str(),
            Text::Utf8(v) => v.as_str(),
        }
    }

    fn encoding(&self) -> TextEncoding {
        match self {
            Text::Ascii(_) => TextEncoding::Ascii,
            Text::Utf8(_) => TextEncoding::Utf8,
        }
    }

    fn encode(&self) -> Vec<u8> {
        match self {
            Text::Ascii(v) => v.encode(),
            Text::Utf8(v) => v.encode(),
        }
    }
}

/// Decides the representation for `value` against the process-wide table.
pub fn classify(value: &str) -> TextEncoding {
    with_registry(|table| classify_with(value, table))
}

/// Decides the representation for `value` against an explicit table.
pub fn classify_with(value: &str, table: &Replacements) -> TextEncoding {
    if table.covers(value) {
        TextEncoding::Ascii
    } else {
        TextEncoding::Utf8
    }
}

/// Builds an ASCII value when `value` is representable after replacements,
/// otherwise a UTF-8 value.
pub fn string(value: impl Into<String>) -> Text {
    let value = value.into();
    match classify(&value) {
        TextEncoding::Ascii => Text::Ascii(Ascii::new(value)),
        TextEncoding::Utf8 => Text::Utf8(Utf8::new(value)),
    }
}

macro_rules! impl_text_eq {
    ($($ty:ty),*) => {$(
        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

impl_text_eq!(Ascii, Utf8, Text);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_roundtrip() {
        let encoded = Ascii::new("hello");
        assert_eq!(encoded, "hello");
        assert_eq!(encoded.encode(), b"hello");

        let decoded = Ascii::decode(b"hello").unwrap();
        assert_eq!(decoded.as_str(), "hello");
        assert_eq!(decoded.encode(), b"hello");
    }

    #[test]
    fn test_ascii_terminator_policy() {
        let value = Ascii::new("Canon");
        assert_eq!(value.encode_terminated(Terminator::None), b"Canon");
        assert_eq!(value.encode_terminated(Terminator::Nul), b"Canon\0");
        assert_eq!(Ascii::decode(b"Canon\0").unwrap(), "Canon");
    }

    #[test]
    fn test_ascii_decode_rejects_high_bytes() {
        let result = Ascii::decode(b"caf\xc3\xa9");
        assert!(matches!(result, Err(DecodeError::NonAsciiByte { byte: 0xc3 })));
    }

    #[test]
    fn test_add_replacement_shared_table() {
        add_replacement('\u{ae}', "(r)").unwrap();

        let table = replacements();
        assert_eq!(table.get('\u{a9}'), Some("(c)"));
        assert_eq!(table.get('\u{ae}'), Some("(r)"));

        let encoded = Ascii::new("Copyright \u{a9} Example Organisation\u{ae} 2025").encode();
        assert_eq!(encoded, b"Copyright (c) Example Organisation(r) 2025");
    }

    #[test]
    fn test_add_replacement_rejects_non_ascii() {
        let result = add_replacement('\u{ae}', "\u{2117}");
        assert!(matches!(result, Err(ValueError::NonAsciiReplacement { .. })));
    }

    #[test]
    fn test_ascii_fallbacks() {
        add_replacement('\u{ae}', "(r)").unwrap();

        let encoded =
            Ascii::new("The Amazing\u{ae} Caf\u{e9} contains non-ASCII characters like \u{2117}")
                .encode();
        assert_eq!(
            encoded,
            b"The Amazing(r) Cafe contains non-ASCII characters like ?"
        );
    }

    #[test]
    fn test_explicit_table() {
        let mut table = Replacements::empty();
        assert!(table.is_empty());
        assert_eq!(
            Ascii::new("\u{a9} 2025").encode_with(&table, Terminator::None),
            b"? 2025"
        );

        table.add('\u{a9}', "Copyright").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            Ascii::new("\u{a9} 2025").encode_with(&table, Terminator::Nul),
            b"Copyright 2025\0"
        );
    }

    #[test]
    fn test_seeded_table() {
        let table = Replacements::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get('\u{a9}'), Some("(c)"));
    }

    #[test]
    fn test_frozen_registry() {
        let mut registry = Registry::new();
        registry.add('\u{2122}', "(tm)").unwrap();
        registry.frozen = true;
        assert_eq!(
            registry.add('\u{2117}', "(p)"),
            Err(ValueError::ReplacementsFrozen)
        );
        assert_eq!(registry.table.get('\u{2117}'), None);
    }

    #[test]
    fn test_utf8_roundtrip() {
        let encoded = Utf8::new("h\u{e9}llo");
        assert_eq!(encoded.encode(), "h\u{e9}llo".as_bytes());
        assert_eq!(Utf8::decode("h\u{e9}llo".as_bytes()).unwrap(), "h\u{e9}llo");
        assert!(matches!(
            Utf8::decode(b"\xff"),
            Err(DecodeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_string_classification() {
        let plain = string("plain ascii text");
        assert!(matches!(plain, Text::Ascii(_)));
        assert_eq!(plain.encoding(), TextEncoding::Ascii);

        let covered = string("\u{a9} 2025");
        assert!(matches!(covered, Text::Ascii(_)));

        let wide = string("text with \u{2117}");
        assert!(matches!(wide, Text::Utf8(_)));
        assert_eq!(wide.encode(), "text with \u{2117}".as_bytes());
    }

    #[test]
    fn test_compatibility_forms_are_not_folded() {
        let table = Replacements::empty();
        assert_eq!(table.transliterate("x\u{b2}"), "x?");
        assert_eq!(table.transliterate("\u{fb01}"), "?");
        assert_eq!(table.transliterate("Caf\u{e9}"), "Cafe");
    }
}
