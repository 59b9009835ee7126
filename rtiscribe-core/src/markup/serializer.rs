use crate::types::{MarkupNode, NodeKind};
use quick_xml::escape::{escape, partial_escape};

/// Write a tree back out as canonical markup.
///
/// Void elements are written open (`<br>`), attributes in name order, text
/// with `&`, `<` and `>` escaped. The root element itself is not written.
pub fn serialize(node: &MarkupNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &MarkupNode, out: &mut String) {
    match node.kind {
        NodeKind::Text => out.push_str(&partial_escape(node.text.as_str())),
        NodeKind::Element if node.is_root() => {
            for child in &node.children {
                write_node(child, out);
            }
        }
        NodeKind::Element => {
            out.push('<');
            out.push_str(&node.tag_name);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
            out.push('>');
            if node.is_void() {
                return;
            }
            for child in &node.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&node.tag_name);
            out.push('>');
        }
    }
}
