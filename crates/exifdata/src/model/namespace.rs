//! Ordered groups of fields.

use std::fmt;

use crate::model::Field;

/// A named, ordered group of fields.
///
/// An unwrapped namespace contributes no segment to its fields' property
/// paths. The owning model's path is recorded when the namespace is
/// registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    name: String,
    identifier: Option<String>,
    label: Option<String>,
    alias: Option<String>,
    unwrap: bool,
    fields: Vec<Field>,
    model: Option<String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            label: None,
            alias: None,
            unwrap: false,
            fields: Vec::new(),
            model: None,
        }
    }

    /// Sets the namespace identifier (the namespace URI on XMP).
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_unwrap(mut self, unwrap: bool) -> Self {
        self.unwrap = unwrap;
        self
    }

    /// Appends a field; schema order is preserved.
    pub fn with_field(mut self, field: Field) -> Self {
        self.push(field);
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_unwrapped(&self) -> bool {
        self.unwrap
    }

    /// Path segment: the alias if present, else the name, lower-cased.
    pub fn path(&self) -> String {
        self.alias.as_deref().unwrap_or(&self.name).to_lowercase()
    }

    /// Path of the owning model, once registered.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    /// Looks a field up by schema identifier.
    pub fn field(&self, identifier: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.identifier() == identifier)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if any field holds a value.
    pub fn has_values(&self) -> bool {
        self.fields.iter().any(Field::has_value)
    }

    /// Full property path of a field named `name` within this namespace.
    pub fn compose(&self, model_path: &str, name: &str) -> String {
        if self.unwrap {
            format!("{}.{}", model_path, name)
        } else {
            format!("{}.{}.{}", model_path, self.path(), name)
        }
    }

    /// Links this namespace to its model and assigns every field's path.
    pub(crate) fn link(&mut self, model_path: &str) {
        for i in 0..self.fields.len() {
            let path = self.compose(model_path, self.fields[i].name());
            self.fields[i].set_path(path);
        }
        self.model = Some(model_path.to_string());
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeKind;

    #[test]
    fn test_path_prefers_alias() {
        let namespace = Namespace::new("XMP").with_alias("Basic");
        assert_eq!(namespace.path(), "basic");
        assert_eq!(Namespace::new("Dublin").path(), "dublin");
    }

    #[test]
    fn test_link_assigns_paths() {
        let mut wrapped = Namespace::new("xmp")
            .with_alias("basic")
            .with_field(Field::new("CreateDate", "createDate", TypeKind::Date));
        wrapped.link("xmp");
        assert_eq!(wrapped.model(), Some("xmp"));
        assert_eq!(wrapped.fields()[0].path(), "xmp.basic.createDate");

        let mut unwrapped = Namespace::new("IFD0")
            .with_unwrap(true)
            .with_field(Field::new("Make", "make", TypeKind::Ascii));
        unwrapped.link("exif");
        assert_eq!(unwrapped.fields()[0].path(), "exif.make");
    }

    #[test]
    fn test_field_lookup_and_values() {
        let mut namespace = Namespace::new("IFD0")
            .with_field(Field::new("Make", "make", TypeKind::Ascii))
            .with_field(Field::new("Model", "model", TypeKind::Ascii));
        assert_eq!(namespace.len(), 2);
        assert!(namespace.field("Model").is_some());
        assert!(!namespace.has_values());

        namespace.fields_mut()[1].assign("EOS R5").unwrap();
        assert!(namespace.has_values());
    }
}
