//! Markdown documentation generated from a model's schema metadata.
//!
//! Each field contributes an attribute table built from
//! [`Field::documentation`]; [`render`] splices the assembled lines into a
//! template at its `{{fields}}` marker.

use tracing::error;

use crate::model::{Documented, Field, Model};

/// Template marker replaced by the assembled field documentation.
pub const FIELDS_MARKER: &str = "{{fields}}";

const LABELS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("identifier", "ID"),
    ("label", "Label"),
    ("definition", "Definition"),
    ("type", "Type"),
    ("bytes_min", "Minimum bytes"),
    ("bytes_max", "Maximum bytes"),
    ("required", "Required?"),
    ("readonly", "Read Only?"),
    ("repeatable", "Repeatable?"),
    ("multiple", "Multiple?"),
    ("tagid", "Tag ID"),
    ("default", "Default Value"),
    ("count", "Count/Length"),
    ("section", "Citation"),
    ("ordered", "Ordered?"),
    ("combine", "Combine?"),
    ("alias", "Alias"),
    ("pseudonym", "Pseudonym"),
    ("structure", "Structure"),
    ("tag", "Tag"),
    ("unit", "Unit"),
    ("options", "Options"),
    ("closed", "Closed?"),
    ("nullable", "Nullable?"),
    ("minimum", "Minimum Value"),
    ("maximum", "Maximum Value"),
    ("related", "Related Field"),
    ("encoding", "Encoding"),
];

const NUMBERS: [&str; 21] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty",
];

/// Display label of a documentable attribute.
pub fn label(key: &str) -> Option<&'static str> {
    LABELS.iter().find(|(k, _)| *k == key).map(|(_, label)| *label)
}

/// Spells counts up to twenty; larger counts stay numeric.
pub fn spoken(count: usize) -> String {
    NUMBERS
        .get(count)
        .map(|word| word.to_string())
        .unwrap_or_else(|| count.to_string())
}

pub fn pluralise<'a>(plural: &'a str, singular: &'a str, count: usize) -> &'a str {
    if count == 1 { singular } else { plural }
}

/// Formats a documented value for a table cell.
pub fn format_value(key: &str, value: &Documented) -> String {
    match value {
        Documented::Missing => "\u{2013}".to_string(),
        Documented::Flag(true) => "Yes".to_string(),
        Documented::Flag(false) => "No".to_string(),
        Documented::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Documented::Number(n) => n.to_string(),
        Documented::List(items) => items.join(", "),
        Documented::Text(text) => {
            let text = text.trim();
            if key == "definition" && !text.is_empty() && !text.ends_with('.') {
                format!("{}.", text)
            } else {
                text.to_string()
            }
        }
    }
}

/// Attribute table for one field.
pub fn field_lines(field: &Field) -> Vec<String> {
    let mut lines = vec![
        format!(
            "### The `{}` field has the following configuration:",
            field.identifier()
        ),
        String::new(),
        "| Attribute | Value  |".to_string(),
        "|-----------|--------|".to_string(),
        format!("| Path      | {} |", field.path()),
    ];

    let mut missing = Vec::new();
    for (key, value) in field.documentation() {
        let heading = label(key).unwrap_or_else(|| {
            missing.push(key);
            key
        });
        lines.push(format!("| {} | {} |", heading, format_value(key, &value)));
    }
    if !missing.is_empty() {
        error!(
            "Attributes of {} have no documentation label: {:?}",
            field.identifier(),
            missing
        );
    }
    lines
}

/// Documentation lines for every namespace and field of `model`.
pub fn assemble(model: &Model) -> Vec<String> {
    let model_name = model.name().to_uppercase();
    let count = model.namespaces().len();

    let mut lines = vec![
        format!(
            "The {} metadata model has {} {} which {} documented below.",
            model_name,
            spoken(count),
            pluralise("namespaces", "namespace", count),
            pluralise("are", "is", count),
        ),
        String::new(),
    ];

    for namespace in model.namespaces() {
        let count = namespace.len();
        lines.push(format!(
            "The {} metadata model's '{}' namespace offers {} {} which are detailed below:",
            model_name,
            namespace.name(),
            spoken(count),
            pluralise("fields", "field", count),
        ));
        lines.push(String::new());

        for field in namespace.fields() {
            lines.extend(field_lines(field));
            lines.push(String::new());
        }
    }
    lines
}

/// Replaces the `{{fields}}` marker in `template` with the model's
/// documentation.
pub fn render(template: &str, model: &Model) -> String {
    template.replace(FIELDS_MARKER, &assemble(model).join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Standard;
    use crate::model::{Attributes, Namespace, TagId};
    use crate::value::TypeKind;

    fn sample() -> Model {
        let mut model = Model::new("exif", Standard::Exif);
        model
            .register(
                Namespace::new("IFD0").with_unwrap(true).with_field(
                    Field::new("Make", "make", TypeKind::Ascii)
                        .with_label("Make")
                        .with_attributes(Attributes {
                            tagid: Some(TagId::Number(0x010f)),
                            definition: Some(" The manufacturer of the recording equipment ".to_string()),
                            required: true,
                            ..Attributes::default()
                        }),
                ),
            )
            .unwrap();
        model
    }

    #[test]
    fn test_spoken_and_pluralise() {
        assert_eq!(spoken(0), "zero");
        assert_eq!(spoken(20), "twenty");
        assert_eq!(spoken(21), "21");
        assert_eq!(pluralise("fields", "field", 0), "fields");
        assert_eq!(pluralise("fields", "field", 1), "field");
        assert_eq!(pluralise("fields", "field", 2), "fields");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value("label", &Documented::Missing), "\u{2013}");
        assert_eq!(format_value("required", &Documented::Flag(true)), "Yes");
        assert_eq!(format_value("count", &Documented::Number(4.0)), "4");
        assert_eq!(
            format_value("options", &Documented::List(vec!["1".into(), "2".into()])),
            "1, 2"
        );
        assert_eq!(
            format_value("definition", &Documented::Text("A value".into())),
            "A value."
        );
        assert_eq!(format_value("unit", &Documented::Text("mm".into())), "mm");
    }

    #[test]
    fn test_every_manifest_key_has_a_label() {
        let field = Field::new("X", "x", TypeKind::Short).with_attributes(Attributes {
            tagid: Some(TagId::Number(1)),
            bytes_min: Some(1),
            bytes_max: Some(2),
            alias: Some("a".into()),
            closed: true,
            combine: true,
            count: Some(1),
            default: Some("0".into()),
            definition: Some("d".into()),
            encoding: Some("e".into()),
            maximum: Some(1.0),
            minimum: Some(0.0),
            multiple: true,
            nullable: true,
            options: vec!["0".into()],
            ordered: true,
            pseudonym: Some("p".into()),
            readonly: true,
            related: Some("r".into()),
            repeatable: true,
            required: true,
            section: Some("s".into()),
            structure: Some("s".into()),
            tag: Some("t".into()),
            unit: Some("u".into()),
        });
        let documentation = field.documentation();
        assert_eq!(documentation.len(), 29);
        for (key, _) in documentation {
            assert!(label(key).is_some(), "{} has no label", key);
        }
    }

    #[test]
    fn test_render_template() {
        let rendered = render("# EXIF\n\n{{fields}}\n", &sample());
        let expected = [
            "# EXIF",
            "",
            "The EXIF metadata model has one namespace which is documented below.",
            "",
            "The EXIF metadata model's 'IFD0' namespace offers one field which are detailed below:",
            "",
            "### The `Make` field has the following configuration:",
            "",
            "| Attribute | Value  |",
            "|-----------|--------|",
            "| Path      | exif.make |",
            "| ID | Make |",
            "| Name | make |",
            "| Label | Make |",
            "| Tag ID | 0x010F |",
            "| Definition | The manufacturer of the recording equipment. |",
            "| Required? | Yes |",
            "| Type | ASCII |",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }
}
