//! Schema-described property slots.
//!
//! A [`Field`] holds at most one [`Value`] of its declared [`TypeKind`].
//! Schema vocabulary beyond the identity keys lives in [`Attributes`], a fixed
//! manifest; keys outside it are rejected at schema assembly.

use std::fmt;

use crate::error::ValueError;
use crate::value::{Native, TypeKind, Value};

/// Tag identifier of a field on a binary standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagId {
    /// EXIF/TIFF 16-bit tag number.
    Number(u16),
    /// IPTC `record:dataset` pair.
    Dataset { record: u8, dataset: u8 },
}

impl TagId {
    /// Parses `"0x010E"`, `"270"` or `"2:120"`.
    pub fn parse(s: &str) -> Option<TagId> {
        let s = s.trim();
        if let Some((record, dataset)) = s.split_once(':') {
            return Some(TagId::Dataset {
                record: record.trim().parse().ok()?,
                dataset: dataset.trim().parse().ok()?,
            });
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u16::from_str_radix(hex, 16).ok().map(TagId::Number);
        }
        s.parse().ok().map(TagId::Number)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagId::Number(n) => write!(f, "0x{:04X}", n),
            TagId::Dataset { record, dataset } => write!(f, "{}:{}", record, dataset),
        }
    }
}

/// The recognized descriptive attributes of a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub definition: Option<String>,
    pub tagid: Option<TagId>,
    pub bytes_min: Option<usize>,
    pub bytes_max: Option<usize>,
    pub required: bool,
    pub readonly: bool,
    pub repeatable: bool,
    pub multiple: bool,
    pub count: Option<u32>,
    pub structure: Option<String>,
    /// Element name override (XMP).
    pub tag: Option<String>,
    pub unit: Option<String>,
    pub options: Vec<String>,
    pub encoding: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub default: Option<String>,
    pub related: Option<String>,
    /// Alternate property name; resolves to this field.
    pub alias: Option<String>,
    pub pseudonym: Option<String>,
    /// Citation of the defining section of the standard.
    pub section: Option<String>,
    pub ordered: bool,
    pub combine: bool,
    pub closed: bool,
    pub nullable: bool,
}

/// Raw value of one documentable attribute, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Documented {
    Missing,
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// A named property slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    identifier: String,
    name: String,
    label: Option<String>,
    kind: TypeKind,
    type_name: String,
    attributes: Attributes,
    value: Option<Value>,
    path: String,
}

impl Field {
    /// Creates an unassigned field. Its path is set when its namespace is
    /// registered on a model.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            label: None,
            kind,
            type_name: kind.to_string(),
            attributes: Attributes::default(),
            value: None,
            path: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Records the schema's spelling of the type (e.g. `URL` for text).
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Dotted property path; empty until registered.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// In-place access to the held value (e.g. to adjust a rational).
    pub fn value_mut(&mut self) -> Option<&mut Value> {
        self.value.as_mut()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Coerces `native` into this field's kind and replaces the held value.
    ///
    /// Numeric bounds and closed option lists are enforced here; the
    /// read-only flag is enforced by the owning model.
    pub fn assign(&mut self, native: impl Into<Native>) -> Result<(), ValueError> {
        let value = Value::coerce(self.kind, native.into())?;
        self.replace(value)
    }

    /// Replaces the held value with an already-typed value.
    pub fn replace(&mut self, value: Value) -> Result<(), ValueError> {
        if !self.accepts(value.kind()) {
            return Err(ValueError::TypeMismatch {
                kind: self.kind,
                expected: self.kind.expects(),
                found: value.to_native().type_name(),
            });
        }
        self.check_bounds(&value)?;
        self.check_options(&value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Removes and returns the held value.
    pub fn clear(&mut self) -> Option<Value> {
        self.value.take()
    }

    fn accepts(&self, kind: TypeKind) -> bool {
        match self.kind {
            TypeKind::Text => matches!(kind, TypeKind::Ascii | TypeKind::Utf8),
            declared => declared == kind,
        }
    }

    fn check_bounds(&self, value: &Value) -> Result<(), ValueError> {
        let Some(number) = value.as_f64() else {
            return Ok(());
        };
        let min = self.attributes.minimum.unwrap_or(f64::NEG_INFINITY);
        let max = self.attributes.maximum.unwrap_or(f64::INFINITY);
        if number < min || number > max {
            return Err(ValueError::OutOfRange {
                kind: self.kind,
                value: number,
                min,
                max,
            });
        }
        Ok(())
    }

    fn check_options(&self, value: &Value) -> Result<(), ValueError> {
        if !self.attributes.closed || self.attributes.options.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&value.encode_text()).into_owned();
        if self.attributes.options.iter().any(|option| *option == text) {
            Ok(())
        } else {
            Err(ValueError::NotAnOption { value: text })
        }
    }

    /// Ordered manifest of documentable attributes.
    ///
    /// Identity keys come first, then the tag and byte bounds, then every
    /// other attribute alphabetically. Unset optional attributes are
    /// omitted, except `label` which reports [`Documented::Missing`].
    pub fn documentation(&self) -> Vec<(&'static str, Documented)> {
        fn text(value: &Option<String>) -> Option<Documented> {
            value.clone().map(Documented::Text)
        }
        fn flag(value: bool) -> Option<Documented> {
            value.then_some(Documented::Flag(true))
        }
        fn number<T: Into<f64> + Copy>(value: Option<T>) -> Option<Documented> {
            value.map(|v| Documented::Number(v.into()))
        }

        let a = &self.attributes;
        let entries: [(&'static str, Option<Documented>); 29] = [
            ("identifier", Some(Documented::Text(self.identifier.clone()))),
            ("name", Some(Documented::Text(self.name.clone()))),
            ("label", Some(text(&self.label).unwrap_or(Documented::Missing))),
            ("tagid", a.tagid.map(|t| Documented::Text(t.to_string()))),
            ("bytes_min", number(a.bytes_min.map(|v| v as f64))),
            ("bytes_max", number(a.bytes_max.map(|v| v as f64))),
            ("alias", text(&a.alias)),
            ("closed", flag(a.closed)),
            ("combine", flag(a.combine)),
            ("count", number(a.count)),
            ("default", text(&a.default)),
            ("definition", text(&a.definition)),
            ("encoding", text(&a.encoding)),
            ("maximum", number(a.maximum)),
            ("minimum", number(a.minimum)),
            ("multiple", flag(a.multiple)),
            ("nullable", flag(a.nullable)),
            (
                "options",
                (!a.options.is_empty()).then(|| Documented::List(a.options.clone())),
            ),
            ("ordered", flag(a.ordered)),
            ("pseudonym", text(&a.pseudonym)),
            ("readonly", flag(a.readonly)),
            ("related", text(&a.related)),
            ("repeatable", flag(a.repeatable)),
            ("required", flag(a.required)),
            ("section", text(&a.section)),
            ("structure", text(&a.structure)),
            ("tag", text(&a.tag)),
            ("type", Some(Documented::Text(self.type_name.clone()))),
            ("unit", text(&a.unit)),
        ];

        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier, self.type_name)
    }
}
