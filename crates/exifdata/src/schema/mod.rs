//! Schema assembly: JSON schema documents to [`Model`]s.
//!
//! A schema document is an object whose keys are either model directives
//! (prefixed with `@`) or namespace blocks:
//!
//! ```json
//! {
//!   "@order": "MSB",
//!   "@aliases": { "dc": "dublincore" },
//!   "basic": {
//!     "name": "xmp",
//!     "identifier": "http://ns.adobe.com/xap/1.0/",
//!     "alias": "basic",
//!     "fields": {
//!       "Label": { "name": "label", "type": "Text" }
//!     }
//!   }
//! }
//! ```
//!
//! Key order is preserved, so namespaces register and fields encode in
//! declaration order. Unrecognized attributes are logged and dropped.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::codec::{ByteOrder, Standard};
use crate::error::ConfigError;
use crate::model::{Attributes, Field, Model, Namespace, TagId};

const EXIF_SCHEMA: &str = include_str!("../../schemas/exif.json");
const IPTC_SCHEMA: &str = include_str!("../../schemas/iptc.json");
const XMP_SCHEMA: &str = include_str!("../../schemas/xmp.json");

/// Namespace block of a schema document.
#[derive(Debug, Deserialize)]
pub struct NamespaceSchema {
    pub name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub unwrap: bool,
    pub fields: Map<String, Json>,
    #[serde(flatten)]
    pub unrecognized: Map<String, Json>,
}

/// Field block of a schema document: the identity keys plus the fixed
/// attribute manifest.
#[derive(Debug, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub tagid: Option<Json>,
    #[serde(default)]
    pub bytes_min: Option<usize>,
    #[serde(default)]
    pub bytes_max: Option<usize>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub structure: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub options: Vec<Json>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub default: Option<Json>,
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub pseudonym: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub ordered: bool,
    #[serde(default)]
    pub combine: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(flatten)]
    pub unrecognized: Map<String, Json>,
}

/// Renders a scalar schema value as option/default text.
fn scalar_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Object(map) => map.get("value").map(scalar_text).unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

fn require_text(block: &Map<String, Json>, key: &'static str, context: &str) -> Result<(), ConfigError> {
    match block.get(key) {
        None => Err(ConfigError::MissingKey {
            context: context.to_string(),
            key,
        }),
        Some(Json::String(_)) => Ok(()),
        Some(_) => Err(ConfigError::InvalidAttribute {
            context: context.to_string(),
            key: key.to_string(),
            expected: "text",
        }),
    }
}

fn deserialize<T: DeserializeOwned>(json: Json, context: &str) -> Result<T, ConfigError> {
    serde_json::from_value(json).map_err(|e| ConfigError::InvalidAttribute {
        context: context.to_string(),
        key: e.to_string(),
        expected: "a value matching the schema manifest",
    })
}

fn parse_tag(field: &str, tagid: &Json) -> Result<TagId, ConfigError> {
    let invalid = || ConfigError::InvalidTag {
        field: field.to_string(),
        tagid: tagid.to_string(),
    };
    match tagid {
        Json::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .map(TagId::Number)
            .ok_or_else(invalid),
        Json::String(s) => TagId::parse(s).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Builds one field from its schema block.
pub fn build_field(
    standard: Standard,
    identifier: &str,
    block: Json,
) -> Result<Field, ConfigError> {
    let context = format!("field {:?}", identifier);
    let Json::Object(map) = block else {
        return Err(ConfigError::InvalidAttribute {
            context,
            key: identifier.to_string(),
            expected: "an object",
        });
    };
    require_text(&map, "name", &context)?;
    require_text(&map, "type", &context)?;
    let schema: FieldSchema = deserialize(Json::Object(map), &context)?;

    for key in schema.unrecognized.keys() {
        warn!("Dropping unrecognized attribute {:?} on field {}", key, identifier);
    }

    let kind = standard
        .resolve_type(&schema.type_name)
        .ok_or_else(|| ConfigError::UnknownType {
            field: identifier.to_string(),
            type_name: schema.type_name.clone(),
        })?;
    let tagid = schema
        .tagid
        .as_ref()
        .map(|tagid| parse_tag(identifier, tagid))
        .transpose()?;

    let attributes = Attributes {
        definition: schema.definition,
        tagid,
        bytes_min: schema.bytes_min,
        bytes_max: schema.bytes_max,
        required: schema.required,
        readonly: schema.readonly,
        repeatable: schema.repeatable,
        multiple: schema.multiple,
        count: schema.count,
        structure: schema.structure,
        tag: schema.tag,
        unit: schema.unit,
        options: schema.options.iter().map(scalar_text).collect(),
        encoding: schema.encoding,
        minimum: schema.minimum,
        maximum: schema.maximum,
        default: schema.default.as_ref().map(scalar_text),
        related: schema.related,
        alias: schema.alias,
        pseudonym: schema.pseudonym,
        section: schema.section,
        ordered: schema.ordered,
        combine: schema.combine,
        closed: schema.closed,
        nullable: schema.nullable,
    };

    let mut field = Field::new(identifier, schema.name, kind)
        .with_type_name(schema.type_name)
        .with_attributes(attributes);
    if let Some(label) = schema.label {
        field = field.with_label(label);
    }
    Ok(field)
}

/// Builds one namespace (and its fields, in schema order) from its block.
pub fn build_namespace(standard: Standard, key: &str, block: Json) -> Result<Namespace, ConfigError> {
    let context = format!("namespace {:?}", key);
    let Json::Object(map) = block else {
        return Err(ConfigError::InvalidAttribute {
            context,
            key: key.to_string(),
            expected: "an object",
        });
    };
    require_text(&map, "name", &context)?;
    if !map.contains_key("fields") {
        return Err(ConfigError::MissingKey {
            context,
            key: "fields",
        });
    }
    let schema: NamespaceSchema = deserialize(Json::Object(map), &context)?;

    for attribute in schema.unrecognized.keys() {
        warn!("Dropping unrecognized attribute {:?} on namespace {}", attribute, key);
    }
    if schema.fields.is_empty() {
        warn!("Namespace {} declares no fields", schema.name);
    }

    let mut namespace = Namespace::new(schema.name).with_unwrap(schema.unwrap);
    if let Some(identifier) = schema.identifier {
        namespace = namespace.with_identifier(identifier);
    }
    if let Some(label) = schema.label {
        namespace = namespace.with_label(label);
    }
    if let Some(alias) = schema.alias {
        namespace = namespace.with_alias(alias);
    }
    for (identifier, block) in schema.fields {
        namespace.push(build_field(standard, &identifier, block)?);
    }
    Ok(namespace)
}

fn apply_directive(model: &mut Model, key: &str, value: &Json) -> Result<(), ConfigError> {
    let context = format!("model {}", model.name());
    let invalid = |expected: &'static str| ConfigError::InvalidAttribute {
        context: context.clone(),
        key: key.to_string(),
        expected,
    };
    match key {
        "@aliases" => {
            let aliases = value.as_object().ok_or_else(|| invalid("an object of text"))?;
            for (alternate, canonical) in aliases {
                let canonical = canonical.as_str().ok_or_else(|| invalid("an object of text"))?;
                model.add_alias(alternate, canonical);
            }
        }
        "@readable" => model.set_readable(value.as_bool().ok_or_else(|| invalid("a boolean"))?),
        "@writable" => model.set_writable(value.as_bool().ok_or_else(|| invalid("a boolean"))?),
        "@order" => {
            let order = value
                .as_str()
                .and_then(ByteOrder::parse)
                .ok_or_else(|| invalid("\"MSB\" or \"LSB\""))?;
            model.set_byte_order(order);
        }
        _ => warn!("Dropping unrecognized directive {:?} on model {}", key, model.name()),
    }
    Ok(())
}

/// Assembles a model named `name` from schema JSON text.
pub fn parse(name: &str, standard: Standard, source: &str) -> Result<Model, ConfigError> {
    let document: Map<String, Json> = serde_json::from_str(source)?;
    let mut model = Model::new(name, standard);

    for (key, block) in document {
        if key.starts_with('@') {
            apply_directive(&mut model, &key, &block)?;
        } else {
            let namespace = build_namespace(standard, &key, block)?;
            model.register(namespace)?;
        }
    }

    debug!(
        "Assembled {} model with {} namespaces",
        model.name(),
        model.namespaces().len()
    );
    Ok(model)
}

/// Reads and assembles a schema file. The model is named after the standard.
pub fn load(path: impl AsRef<Path>, standard: Standard) -> Result<Model, ConfigError> {
    let source = fs::read_to_string(path.as_ref())?;
    parse(&standard.name().to_lowercase(), standard, &source)
}

/// Loads several schema files; a failure affects only its own model.
pub fn load_all<P: AsRef<Path>>(
    schemas: impl IntoIterator<Item = (Standard, P)>,
) -> Vec<(Standard, Result<Model, ConfigError>)> {
    schemas
        .into_iter()
        .map(|(standard, path)| {
            let result = load(path, standard);
            if let Err(e) = &result {
                warn!("Skipping {} model: {}", standard, e);
            }
            (standard, result)
        })
        .collect()
}

/// Bundled schema text for a standard.
pub fn builtin_source(standard: Standard) -> &'static str {
    match standard {
        Standard::Exif => EXIF_SCHEMA,
        Standard::Iptc => IPTC_SCHEMA,
        Standard::Xmp => XMP_SCHEMA,
    }
}

/// Assembles the bundled model for a standard.
pub fn builtin(standard: Standard) -> Result<Model, ConfigError> {
    parse(
        &standard.name().to_lowercase(),
        standard,
        builtin_source(standard),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::value::TypeKind;

    const SCHEMA: &str = r#"{
        "@order": "LSB",
        "@aliases": { "ifd": "tiff" },
        "@unknown": 1,
        "tiff": {
            "name": "TIFF",
            "label": "Baseline TIFF",
            "fields": {
                "Orientation": {
                    "name": "orientation",
                    "type": "Short",
                    "tagid": "0x0112",
                    "closed": true,
                    "options": [1, 2, 3, 4, 5, 6, 7, 8],
                    "colour": "blue"
                },
                "Make": { "name": "make", "type": "ASCII", "tagid": 271 }
            }
        }
    }"#;

    #[test]
    fn test_parse_preserves_order_and_directives() {
        let model = parse("exif", Standard::Exif, SCHEMA).unwrap();
        assert_eq!(model.byte_order(), ByteOrder::Lsb);
        let paths: Vec<&str> = model.paths().collect();
        assert_eq!(paths, ["exif.tiff.orientation", "exif.tiff.make"]);

        let orientation = model.field("exif.tiff.orientation").unwrap();
        assert_eq!(orientation.kind(), TypeKind::Short);
        assert_eq!(orientation.attributes().tagid, Some(TagId::Number(0x0112)));
        assert_eq!(orientation.attributes().options.len(), 8);
        assert_eq!(
            model.field("exif.ifd.make").unwrap().attributes().tagid,
            Some(TagId::Number(271))
        );
    }

    #[test]
    fn test_missing_name() {
        let err = parse(
            "exif",
            Standard::Exif,
            r#"{ "ns": { "name": "ns", "fields": { "Make": { "type": "ASCII" } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "name", .. }));
    }

    #[test]
    fn test_non_text_name() {
        let err = parse(
            "exif",
            Standard::Exif,
            r#"{ "ns": { "name": "ns", "fields": { "Make": { "name": 5, "type": "ASCII" } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_unknown_type_and_tag() {
        let err = parse(
            "exif",
            Standard::Exif,
            r#"{ "ns": { "name": "ns", "fields": { "X": { "name": "x", "type": "Real" } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownType { .. }));

        let err = parse(
            "exif",
            Standard::Exif,
            r#"{ "ns": { "name": "ns", "fields": { "X": { "name": "x", "type": "Short", "tagid": 70000 } } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTag { .. }));
    }

    #[test]
    fn test_bad_directive() {
        let err = parse("exif", Standard::Exif, r#"{ "@order": "middle" }"#).unwrap_err();
        assert_eq!(err.kind().code(), "C001");
    }

    #[test]
    fn test_builtin_models_assemble() {
        for standard in Standard::ALL {
            let model = builtin(standard).unwrap();
            assert_eq!(model.standard(), standard);
            assert!(!model.namespaces().is_empty());
        }
    }

    #[test]
    fn test_readable_directive() {
        let mut model = parse(
            "xmp",
            Standard::Xmp,
            r#"{ "@readable": false, "ns": { "name": "ns", "fields": { "A": { "name": "a", "type": "Text" } } } }"#,
        )
        .unwrap();
        assert!(!model.readable());
        model.set("xmp.ns.a", "x").unwrap();
        assert!(matches!(
            model.get("xmp.ns.a"),
            Err(AccessError::NotReadable { .. })
        ));
    }

    #[test]
    fn test_load_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let valid = dir.path().join("exif.json");
        let malformed = dir.path().join("iptc.json");
        let missing = dir.path().join("xmp.json");
        fs::write(&valid, SCHEMA).unwrap();
        fs::write(&malformed, r#"{ "ns": { "name": "ns" } }"#).unwrap();

        let results = load_all([
            (Standard::Exif, valid.as_path()),
            (Standard::Iptc, malformed.as_path()),
            (Standard::Xmp, missing.as_path()),
        ]);
        assert_eq!(results.len(), 3);

        let (standard, model) = &results[0];
        assert_eq!(*standard, Standard::Exif);
        let model = model.as_ref().unwrap();
        assert_eq!(model.name(), "exif");
        assert!(model.field("exif.tiff.make").is_ok());

        assert!(matches!(
            results[1],
            (Standard::Iptc, Err(ConfigError::MissingKey { key: "fields", .. }))
        ));
        assert!(matches!(results[2], (Standard::Xmp, Err(ConfigError::Io(_)))));
    }
}
