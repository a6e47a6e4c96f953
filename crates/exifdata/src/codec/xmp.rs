//! XMP packet assembly.
//!
//! Layout:
//!
//! ```text
//! <?xpacket begin="BOM" id="W5M0MpCehiHzreSzNTczkc9d"?>
//! <x:xmpmeta xmlns:x="adobe:ns:meta/">
//!   <rdf:RDF xmlns:rdf="...">
//!     <rdf:Description rdf:about="" xmlns:prefix="uri" ...>
//!       <prefix:Element>value</prefix:Element>
//!     </rdf:Description>
//!   </rdf:RDF>
//! </x:xmpmeta>
//! <?xpacket end="w"?>
//! ```
//!
//! Only namespaces holding at least one value are declared. Fields marked
//! `multiple` wrap their value in `rdf:Bag` (`rdf:Seq` when `ordered`).

use tracing::debug;

use crate::codec::EncodeOptions;
use crate::error::EncodeError;
use crate::model::{Field, Model, Namespace};
use crate::value::Value;

pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";
pub const META_NAMESPACE: &str = "adobe:ns:meta/";
pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

const INDENT: &str = "  ";

/// Escapes text and attribute content.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Line-oriented output that is either indented or fully compact.
struct Document {
    out: String,
    pretty: bool,
}

impl Document {
    fn line(&mut self, depth: usize, text: &str) {
        if self.pretty {
            for _ in 0..depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
            self.out.push('\n');
        } else {
            self.out.push_str(text);
        }
    }
}

/// XMP is UTF-8 throughout, so ASCII-classified text is written as given
/// rather than transliterated.
fn packet_text(value: &Value) -> String {
    match value {
        Value::Ascii(v) => v.as_str().to_string(),
        other => String::from_utf8_lossy(&other.encode_text()).into_owned(),
    }
}

fn element_name(namespace: &Namespace, field: &Field) -> String {
    let local = field
        .attributes()
        .tag
        .as_deref()
        .unwrap_or(field.identifier());
    format!("{}:{}", namespace.name(), local)
}

pub fn encode(model: &Model, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut declarations = Vec::new();
    for namespace in model.namespaces().iter().filter(|ns| ns.has_values()) {
        let uri = namespace.identifier().ok_or_else(|| EncodeError::MissingTag {
            field: format!("{}.{}", model.path(), namespace.path()),
        })?;
        declarations.push(format!(" xmlns:{}=\"{}\"", namespace.name(), escape(uri)));
    }

    let mut doc = Document {
        out: String::new(),
        pretty: options.pretty,
    };

    doc.line(
        0,
        &format!("<?xpacket begin=\"\u{feff}\" id=\"{}\"?>", PACKET_ID),
    );
    doc.line(0, &format!("<x:xmpmeta xmlns:x=\"{}\">", META_NAMESPACE));
    doc.line(1, &format!("<rdf:RDF xmlns:rdf=\"{}\">", RDF_NAMESPACE));
    doc.line(
        2,
        &format!("<rdf:Description rdf:about=\"\"{}>", declarations.concat()),
    );

    let mut count = 0usize;
    for (namespace, field) in model.fields() {
        let Some(value) = field.value() else {
            continue;
        };
        let name = element_name(namespace, field);
        let text = escape(&packet_text(value));

        if field.attributes().multiple {
            let container = if field.attributes().ordered {
                "rdf:Seq"
            } else {
                "rdf:Bag"
            };
            doc.line(3, &format!("<{}>", name));
            doc.line(4, &format!("<{}>", container));
            doc.line(5, &format!("<rdf:li>{}</rdf:li>", text));
            doc.line(4, &format!("</{}>", container));
            doc.line(3, &format!("</{}>", name));
        } else {
            doc.line(3, &format!("<{}>{}</{}>", name, text, name));
        }
        count += 1;
    }

    doc.line(2, "</rdf:Description>");
    doc.line(1, "</rdf:RDF>");
    doc.line(0, "</x:xmpmeta>");
    doc.line(0, "<?xpacket end=\"w\"?>");

    debug!(
        "Assembled XMP packet with {} properties in {} namespaces ({} bytes)",
        count,
        declarations.len(),
        doc.out.len()
    );
    Ok(doc.out.into_bytes())
}
