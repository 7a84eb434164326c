//! XML serialization - writes XmlNode trees back out as SVG text
//!
//! The annotated drawing is produced by cloning the parsed tree, adding
//! an overlay group, and serializing it here. Output is deterministic:
//! attributes are written in stored order and children in tree order.

use crate::parse_xml::XmlNode;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serialize an XmlNode tree to an XML string with an XML declaration.
pub fn xml_node_to_string(node: &XmlNode) -> String {
    let mut buffer = Vec::with_capacity(1024);
    buffer.extend_from_slice(b"<?xml version=\"1.0\"?>\n");
    write_node_pretty(node, &mut buffer, 0).expect("serialization to memory failed");
    String::from_utf8(buffer).expect("serialized XML was not valid UTF-8")
}

/// Serialize an XmlNode tree to a file on disk.
pub fn xml_node_to_file<P: AsRef<Path>>(node: &XmlNode, file_path: P) -> Result<()> {
    let file = File::create(&file_path)
        .with_context(|| format!("failed to create {}", file_path.as_ref().display()))?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    writer
        .write_all(b"<?xml version=\"1.0\"?>\n")
        .context("failed to write XML declaration")?;
    write_node_pretty(node, &mut writer, 0).context("failed to serialize XML")?;
    writer.flush().context("failed to flush XML writer")?;
    Ok(())
}

/// Format a coordinate value the short way: integral values print
/// without a decimal point ("4" rather than "4.0").
pub fn fmt_coord(value: f32) -> String {
    if value == value.trunc() && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Recursively serialize a node with two-space indentation.
/// Wide nodes (e.g. an svg root with thousands of paths) serialize their
/// children in parallel to memory buffers, then write sequentially.
fn write_node_pretty<W: Write>(node: &XmlNode, writer: &mut W, indent_level: usize) -> io::Result<()> {
    write_indent(writer, indent_level)?;
    writer.write_all(b"<")?;
    writer.write_all(node.name.as_bytes())?;

    for (key, value) in &node.attributes {
        writer.write_all(b" ")?;
        writer.write_all(key.as_bytes())?;
        writer.write_all(b"=\"")?;
        write_escaped_attr(writer, value)?;
        writer.write_all(b"\"")?;
    }

    let text = node.text_content.trim();
    let has_text = !text.is_empty();
    if node.children.is_empty() && !has_text {
        writer.write_all(b" />\n")?;
        return Ok(());
    }

    writer.write_all(b">\n")?;

    if has_text {
        write_indent(writer, indent_level + 1)?;
        write_escaped_text(writer, text)?;
        writer.write_all(b"\n")?;
    }

    if node.children.len() > 64 {
        let child_buffers: Result<Vec<Vec<u8>>, io::Error> = node
            .children
            .par_iter()
            .map(|child| {
                let mut buf = Vec::with_capacity(4096);
                write_node_pretty(child, &mut buf, indent_level + 1)?;
                Ok(buf)
            })
            .collect();

        for buf in child_buffers? {
            writer.write_all(&buf)?;
        }
    } else {
        for child in &node.children {
            write_node_pretty(child, writer, indent_level + 1)?;
        }
    }

    write_indent(writer, indent_level)?;
    writer.write_all(b"</")?;
    writer.write_all(node.name.as_bytes())?;
    writer.write_all(b">\n")?;
    Ok(())
}

fn write_indent<W: Write>(writer: &mut W, indent_level: usize) -> io::Result<()> {
    for _ in 0..indent_level {
        writer.write_all(b"  ")?;
    }
    Ok(())
}

/// Escapes special XML characters in attribute values
fn write_escaped_attr<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    let mut last = 0;
    for (idx, ch) in input.char_indices() {
        let entity = match ch {
            '&' => Some(b"&amp;" as &[u8]),
            '<' => Some(b"&lt;" as &[u8]),
            '>' => Some(b"&gt;" as &[u8]),
            '"' => Some(b"&quot;" as &[u8]),
            '\'' => Some(b"&apos;" as &[u8]),
            _ => None,
        };

        if let Some(bytes) = entity {
            if last < idx {
                writer.write_all(input[last..idx].as_bytes())?;
            }
            writer.write_all(bytes)?;
            last = idx + ch.len_utf8();
        }
    }

    if last < input.len() {
        writer.write_all(input[last..].as_bytes())?;
    }
    Ok(())
}

fn write_escaped_text<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    let mut last = 0;
    for (idx, ch) in input.char_indices() {
        let entity = match ch {
            '&' => Some(b"&amp;" as &[u8]),
            '<' => Some(b"&lt;" as &[u8]),
            '>' => Some(b"&gt;" as &[u8]),
            _ => None,
        };

        if let Some(bytes) = entity {
            if last < idx {
                writer.write_all(input[last..idx].as_bytes())?;
            }
            writer.write_all(bytes)?;
            last = idx + ch.len_utf8();
        }
    }

    if last < input.len() {
        writer.write_all(input[last..].as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> XmlNode {
        let child = XmlNode::new("circle")
            .with_attr("cx", "5")
            .with_attr("cy", "5")
            .with_attr("r", "1");
        let mut root = XmlNode::new("svg").with_attr("width", "10");
        root.children.push(child);
        root
    }

    #[test]
    fn test_serialize_simple_node() {
        let xml = xml_node_to_string(&sample_node());
        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<svg width=\"10\">"));
        assert!(xml.contains("<circle cx=\"5\" cy=\"5\" r=\"1\" />"));
        assert!(xml.contains("</svg>"));
    }

    #[test]
    fn test_escape_xml_chars() {
        let node = XmlNode::new("test").with_attr("attr", "a&b<c>d\"e'f");
        let xml = xml_node_to_string(&node);
        assert!(xml.contains("a&amp;b&lt;c&gt;d&quot;e&apos;f"));
    }

    #[test]
    fn test_roundtrip_preserves_structure() {
        let xml = xml_node_to_string(&sample_node());
        let reparsed = crate::parse_xml::parse_svg_str(&xml).expect("reparse failed");
        assert_eq!(reparsed.name, "svg");
        assert_eq!(reparsed.children.len(), 1);
        assert_eq!(reparsed.children[0].attributes.get("r"), Some(&"1".to_string()));
        // Serializing again yields identical text
        assert_eq!(xml, xml_node_to_string(&reparsed));
    }

    #[test]
    fn test_fmt_coord() {
        assert_eq!(fmt_coord(4.0), "4");
        assert_eq!(fmt_coord(0.4), "0.4");
        assert_eq!(fmt_coord(-2.5), "-2.5");
    }
}
