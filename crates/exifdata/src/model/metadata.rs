//! The root metadata container.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::codec::{self, ByteOrder, EncodeOptions, Standard};
use crate::document;
use crate::error::{AccessError, ConfigError, EncodeError, OutputError};
use crate::model::{Field, Namespace};
use crate::schema;
use crate::value::{Native, Value};

/// Namespaces for one metadata standard, addressed by dotted property paths.
///
/// Paths are matched case-insensitively. A path may omit the leading model
/// segment (`basic.label` and `xmp.basic.label` are the same property).
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    standard: Standard,
    byte_order: ByteOrder,
    readable: bool,
    writable: bool,
    aliases: Vec<(String, String)>,
    namespaces: Vec<Namespace>,
    index: FxHashMap<String, (usize, usize)>,
}

impl Model {
    pub fn new(name: impl Into<String>, standard: Standard) -> Self {
        Self {
            name: name.into(),
            standard,
            byte_order: standard.default_byte_order(),
            readable: true,
            writable: true,
            aliases: Vec::new(),
            namespaces: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Builds the EXIF model from the bundled schema.
    pub fn exif() -> Result<Model, ConfigError> {
        schema::builtin(Standard::Exif)
    }

    /// Builds the IPTC model from the bundled schema.
    pub fn iptc() -> Result<Model, ConfigError> {
        schema::builtin(Standard::Iptc)
    }

    /// Builds the XMP model from the bundled schema.
    pub fn xmp() -> Result<Model, ConfigError> {
        schema::builtin(Standard::Xmp)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path prefix: the lower-cased model name.
    pub fn path(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn standard(&self) -> Standard {
        self.standard
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.byte_order = order;
    }

    pub fn readable(&self) -> bool {
        self.readable
    }

    pub fn set_readable(&mut self, readable: bool) {
        self.readable = readable;
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// Maps an alternate path tail onto a canonical one, e.g. `dc` onto
    /// `dublincore`. Tails are relative to the model path and replace whole
    /// segments only.
    pub fn add_alias(&mut self, alternate: &str, canonical: &str) {
        self.aliases
            .push((alternate.to_lowercase(), canonical.to_lowercase()));
    }

    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// Links `namespace` to this model and appends it.
    ///
    /// Fails without modifying the model if any of the namespace's field
    /// paths (or field alias paths) is already taken.
    pub fn register(&mut self, mut namespace: Namespace) -> Result<(), ConfigError> {
        let model_path = self.path();
        namespace.link(&model_path);

        let ns_index = self.namespaces.len();
        let mut entries: Vec<(String, (usize, usize))> = Vec::with_capacity(namespace.len());
        for (field_index, field) in namespace.fields().iter().enumerate() {
            let mut paths = vec![field.path().to_lowercase()];
            if let Some(alias) = &field.attributes().alias {
                paths.push(namespace.compose(&model_path, alias).to_lowercase());
            }
            for path in paths {
                let taken = self.index.contains_key(&path)
                    || entries.iter().any(|(existing, _)| *existing == path);
                if taken {
                    return Err(ConfigError::DuplicateProperty { path });
                }
                entries.push((path, (ns_index, field_index)));
            }
        }

        debug!(
            "Registered namespace {} on {} with {} fields",
            namespace.name(),
            self.name,
            namespace.len()
        );
        self.index.extend(entries);
        self.namespaces.push(namespace);
        Ok(())
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Looks a namespace up by name or alias, case-insensitively.
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| {
            ns.name().eq_ignore_ascii_case(name)
                || ns.alias().is_some_and(|alias| alias.eq_ignore_ascii_case(name))
        })
    }

    /// Every field in registration order, paired with its namespace.
    pub fn fields(&self) -> impl Iterator<Item = (&Namespace, &Field)> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.fields().iter().map(move |field| (ns, field)))
    }

    /// Canonical paths of every field, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields().map(|(_, field)| field.path())
    }

    fn resolve(&self, path: &str) -> Option<(usize, usize)> {
        let prefix = format!("{}.", self.path());
        let lowered = path.to_lowercase();
        let full = if lowered.starts_with(&prefix) {
            lowered
        } else {
            format!("{}{}", prefix, lowered)
        };
        if let Some(position) = self.index.get(&full) {
            return Some(*position);
        }

        let tail = &full[prefix.len()..];
        self.aliases.iter().find_map(|(alternate, canonical)| {
            let rest = tail.strip_prefix(alternate.as_str())?;
            if !(rest.is_empty() || rest.starts_with('.')) {
                return None;
            }
            let candidate = format!("{}{}{}", prefix, canonical, rest);
            self.index.get(&candidate).copied()
        })
    }

    pub fn field(&self, path: &str) -> Result<&Field, AccessError> {
        let (ns, field) = self.resolve(path).ok_or_else(|| AccessError::UnknownProperty {
            path: path.to_string(),
        })?;
        Ok(&self.namespaces[ns].fields()[field])
    }

    pub fn field_mut(&mut self, path: &str) -> Result<&mut Field, AccessError> {
        let (ns, field) = self.resolve(path).ok_or_else(|| AccessError::UnknownProperty {
            path: path.to_string(),
        })?;
        Ok(&mut self.namespaces[ns].fields_mut()[field])
    }

    /// Returns the value held at `path`, if any. Fails on a model whose
    /// schema declares it unreadable.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, AccessError> {
        let field = self.field(path)?;
        if !self.readable {
            return Err(AccessError::NotReadable {
                model: self.name.clone(),
            });
        }
        Ok(field.value())
    }

    /// Coerces `value` into the field's declared type and assigns it.
    pub fn set(&mut self, path: &str, value: impl Into<Native>) -> Result<(), AccessError> {
        let field = self.field_mut(path)?;
        if field.attributes().readonly {
            return Err(AccessError::ReadOnly {
                path: field.path().to_string(),
            });
        }
        field.assign(value).map_err(|source| AccessError::Value {
            path: field.path().to_string(),
            source,
        })
    }

    /// Clears the value held at `path`, returning it.
    pub fn unset(&mut self, path: &str) -> Result<Option<Value>, AccessError> {
        let field = self.field_mut(path)?;
        if field.attributes().readonly {
            return Err(AccessError::ReadOnly {
                path: field.path().to_string(),
            });
        }
        Ok(field.clear())
    }

    /// Encodes the standard's payload in compact form.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.encode_with_options(EncodeOptions::default())
    }

    pub fn encode_with_options(&self, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        codec::encode_model(self, options)
    }

    /// Assembles the payload in memory, then writes it in a single call.
    /// Returns the number of bytes written.
    pub fn write(&self, path: impl AsRef<Path>, options: EncodeOptions) -> Result<usize, OutputError> {
        let payload = self.encode_with_options(options)?;
        fs::write(path.as_ref(), &payload)?;
        debug!("Wrote {} bytes of {} to {}", payload.len(), self.name, path.as_ref().display());
        Ok(payload.len())
    }

    /// Markdown lines documenting every namespace and field.
    pub fn document(&self) -> Vec<String> {
        document::assemble(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attributes;
    use crate::value::TypeKind;

    fn sample() -> Model {
        let mut model = Model::new("XMP", Standard::Xmp);
        model
            .register(
                Namespace::new("xmp")
                    .with_alias("basic")
                    .with_field(Field::new("Label", "label", TypeKind::Text))
                    .with_field(Field::new("Rating", "rating", TypeKind::Integer)),
            )
            .unwrap();
        model
            .register(
                Namespace::new("dc")
                    .with_alias("dublinCore")
                    .with_field(Field::new("title", "title", TypeKind::Text).with_attributes(
                        Attributes {
                            alias: Some("headline".to_string()),
                            ..Attributes::default()
                        },
                    )),
            )
            .unwrap();
        model
    }

    #[test]
    fn test_paths_follow_namespace_alias() {
        let model = sample();
        let paths: Vec<&str> = model.paths().collect();
        assert_eq!(
            paths,
            ["xmp.basic.label", "xmp.basic.rating", "xmp.dublincore.title"]
        );
        assert_eq!(model.namespaces()[0].model(), Some("xmp"));
    }

    #[test]
    fn test_set_and_get_case_insensitive() {
        let mut model = sample();
        model.set("xmp.basic.label", "testing").unwrap();
        assert_eq!(*model.get("XMP.Basic.Label").unwrap().unwrap(), "testing");
        assert_eq!(*model.get("basic.label").unwrap().unwrap(), "testing");

        model.set("xmp.basic.rating", 5i64).unwrap();
        assert_eq!(*model.get("xmp.basic.rating").unwrap().unwrap(), 5i64);
    }

    #[test]
    fn test_field_and_model_aliases() {
        let mut model = sample();
        model.set("xmp.dublincore.headline", "Sunrise").unwrap();
        assert_eq!(*model.get("xmp.dublincore.title").unwrap().unwrap(), "Sunrise");

        model.add_alias("dc", "dublincore");
        assert_eq!(*model.get("xmp.dc.title").unwrap().unwrap(), "Sunrise");
        assert!(model.get("xmp.dcx.title").is_err());
    }

    #[test]
    fn test_access_errors() {
        let mut model = sample();
        assert!(matches!(
            model.set("xmp.basic.missing", "x"),
            Err(AccessError::UnknownProperty { .. })
        ));
        let err = model.set("xmp.basic.rating", "five").unwrap_err();
        assert!(matches!(err, AccessError::Value { .. }));
        assert_eq!(model.get("xmp.basic.rating").unwrap(), None);
    }

    #[test]
    fn test_readonly_rejects_assignment() {
        let mut model = Model::new("EXIF", Standard::Exif);
        model
            .register(
                Namespace::new("IFD0").with_unwrap(true).with_field(
                    Field::new("ExifOffset", "exifOffset", TypeKind::Long).with_attributes(
                        Attributes {
                            readonly: true,
                            ..Attributes::default()
                        },
                    ),
                ),
            )
            .unwrap();
        assert_eq!(
            model.set("exif.exifOffset", 8i64),
            Err(AccessError::ReadOnly {
                path: "exif.exifOffset".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let mut model = sample();
        let err = model
            .register(
                Namespace::new("other")
                    .with_alias("basic")
                    .with_field(Field::new("Label", "label", TypeKind::Text)),
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateProperty { .. }));
        assert_eq!(model.namespaces().len(), 2);
    }

    #[test]
    fn test_unreadable_model_rejects_get() {
        let mut model = sample();
        model.set("basic.label", "x").unwrap();
        model.set_readable(false);
        assert_eq!(
            model.get("basic.label"),
            Err(AccessError::NotReadable {
                model: "XMP".to_string()
            })
        );
        assert!(matches!(
            model.get("basic.missing"),
            Err(AccessError::UnknownProperty { .. })
        ));

        model.set_readable(true);
        assert_eq!(*model.get("basic.label").unwrap().unwrap(), "x");
    }

    #[test]
    fn test_unset() {
        let mut model = sample();
        model.set("basic.label", "x").unwrap();
        assert!(model.unset("basic.label").unwrap().is_some());
        assert_eq!(model.get("basic.label").unwrap(), None);
    }
}
