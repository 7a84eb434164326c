//! SVG document parsing into a generic XML tree
//!
//! The analyzer treats the drawing as plain XML: quick_xml events are
//! folded into an [`XmlNode`] tree that the extractor walks and the
//! annotator clones and extends. A document that is not well-formed
//! markup fails fast here; no partial extraction is attempted.

use anyhow::{bail, ensure, Context, Result};
use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed XML element with its attributes, text, and children.
///
/// Attributes are kept in an `IndexMap` so document order survives a
/// parse -> annotate -> serialize round trip.
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// The element tag name
    pub name: String,
    /// Attribute names to values, in document order
    pub attributes: IndexMap<String, String>,
    /// Text content of this node
    pub text_content: String,
    /// Child elements
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an element with no attributes, text, or children.
    pub fn new(name: &str) -> Self {
        XmlNode {
            name: name.to_string(),
            attributes: IndexMap::new(),
            text_content: String::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, returning self for chained construction.
    pub fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Tag name with any namespace prefix stripped (`svg:line` -> `line`).
    pub fn local_name(&self) -> &str {
        match self.name.rfind(':') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }
}

/// Parse an SVG document from text into its root element.
///
/// Returns an error for malformed markup (unclosed or mismatched tags,
/// bad attribute syntax) or for a document with no root element.
pub fn parse_svg_str(content: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    // Scan past the prolog (declaration, comments, doctype) to the root.
    loop {
        let event = reader
            .read_event()
            .context("failed to read XML event from document")?;
        match event {
            Event::Start(start) => {
                let start = start.into_owned();
                return parse_node(&mut reader, start, false);
            }
            Event::Empty(start) => {
                let start = start.into_owned();
                return parse_node(&mut reader, start, true);
            }
            Event::Eof => bail!("document contains no root element"),
            _ => {}
        }
    }
}

/// Parse an SVG document from a file on disk.
pub fn parse_svg_file<P: AsRef<std::path::Path>>(path: P) -> Result<XmlNode> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
    parse_svg_str(&content)
}

fn parse_node(
    reader: &mut Reader<&[u8]>,
    start: quick_xml::events::BytesStart<'static>,
    self_closing: bool,
) -> Result<XmlNode> {
    let name_bytes = start.name().as_ref().to_vec();
    let name = String::from_utf8_lossy(&name_bytes).to_string();
    let attributes = collect_attributes(start.attributes())?;

    let mut node = XmlNode {
        name,
        attributes,
        text_content: String::new(),
        children: Vec::new(),
    };

    if self_closing {
        return Ok(node);
    }

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("failed to read XML inside element '{}'", node.name))?;
        match event {
            Event::Start(child_start) => {
                let child = parse_node(reader, child_start.into_owned(), false)?;
                node.children.push(child);
            }
            Event::Empty(child_start) => {
                let child = parse_node(reader, child_start.into_owned(), true)?;
                node.children.push(child);
            }
            Event::Text(text) => {
                let value = String::from_utf8_lossy(text.as_ref()).to_string();
                if !value.trim().is_empty() {
                    node.text_content.push_str(&value);
                }
            }
            Event::CData(text) => {
                let value = String::from_utf8_lossy(text.as_ref()).to_string();
                if !value.trim().is_empty() {
                    node.text_content.push_str(&value);
                }
            }
            Event::End(end) => {
                ensure!(
                    end.name().as_ref() == name_bytes.as_slice(),
                    "unexpected closing tag '</{}>' while parsing '<{}>'",
                    String::from_utf8_lossy(end.name().as_ref()),
                    node.name
                );
                return Ok(node);
            }
            Event::Eof => {
                bail!("unexpected end of file while parsing element '{}'", node.name);
            }
            _ => {}
        }
    }
}

fn collect_attributes(
    attributes: quick_xml::events::attributes::Attributes<'_>,
) -> Result<IndexMap<String, String>> {
    let mut map = IndexMap::new();
    for attr in attributes {
        let attr = attr.context("malformed attribute")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = String::from_utf8_lossy(attr.value.as_ref()).to_string();
        map.insert(key, value);
    }
    Ok(map)
}
