//! Lenient markup parser
//!
//! Editor output is HTML, not XML: void elements are left open, end tags
//! can be missing or stray, and attributes may be unquoted. quick-xml does
//! the tokenizing with name checks switched off; the element stack lives
//! here so that every event is recovered into a tree.

use super::entities::{decode_entities, strip_tags};
use crate::types::MarkupNode;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Parse markup into a tree rooted at a synthetic `#root` element.
///
/// Never fails. Unknown end tags are ignored, unclosed elements are closed
/// at end of input, and a tokenizer error turns the rest of the input into
/// one text node with the tags stripped.
pub fn parse(markup: &str) -> MarkupNode {
    let mut reader = Reader::from_str(markup);
    reader.trim_text(false);
    reader.check_end_names(false);
    reader.check_comments(false);

    let mut stack: Vec<MarkupNode> = vec![MarkupNode::root(Vec::new())];

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let node = element_from(&e);
                if node.is_void() {
                    append(&mut stack, node);
                } else {
                    stack.push(node);
                }
            }
            Ok(Event::Empty(e)) => append(&mut stack, element_from(&e)),
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                close_element(&mut stack, &name);
            }
            Ok(Event::Text(t)) => {
                let raw = String::from_utf8_lossy(&t);
                append_text(&mut stack, &decode_entities(&raw));
            }
            Ok(Event::CData(t)) => {
                append_text(&mut stack, &String::from_utf8_lossy(&t));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                debug!("⚠️  Markup tokenizer stopped at byte {}: {}", position, err);
                let rest = markup.get(position..).unwrap_or_default();
                append_text(&mut stack, &strip_tags(rest));
                break;
            }
        }
    }

    close_all(stack)
}

fn element_from(start: &BytesStart) -> MarkupNode {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut node = MarkupNode::element(&name, Vec::new());
    for attr in start.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = String::from_utf8_lossy(&attr.value);
        node.attributes
            .insert(key, decode_entities(&value).into_owned());
    }
    node
}

fn append(stack: &mut [MarkupNode], node: MarkupNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn append_text(stack: &mut [MarkupNode], text: &str) {
    if text.is_empty() {
        return;
    }
    append(stack, MarkupNode::text(text));
}

/// Pop up to and including the nearest open element called `name`.
/// End tags with no matching open element are dropped.
fn close_element(stack: &mut Vec<MarkupNode>, name: &str) {
    let Some(index) = stack.iter().rposition(|n| n.tag_name == name) else {
        return;
    };
    if index == 0 {
        return;
    }
    while stack.len() > index {
        let Some(node) = stack.pop() else { break };
        append(stack, node);
    }
}

fn close_all(mut stack: Vec<MarkupNode>) -> MarkupNode {
    while stack.len() > 1 {
        if let Some(node) = stack.pop() {
            append(&mut stack, node);
        }
    }
    stack
        .pop()
        .unwrap_or_else(|| MarkupNode::root(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_elements_need_no_close() {
        let root = parse("<p>To,<br>PIO<br>Water Board</p>");
        assert_eq!(root.children.len(), 1);
        let p = &root.children[0];
        assert_eq!(p.tag_name, "p");
        assert_eq!(p.children.len(), 5);
        assert!(p.children[1].is_line_break());
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let root = parse("<p>one</span></p><p>two");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].text_content(), "two");
    }

    #[test]
    fn unclosed_inline_closes_with_parent() {
        let root = parse("<p><b>bold text</p><p>next</p>");
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].children[0].is_tag("b"));
    }

    #[test]
    fn attributes_are_lowercased_and_decoded() {
        let root = parse(r#"<div DATA-Signature="yes" title=a&amp;b>x</div>"#);
        let div = &root.children[0];
        assert_eq!(div.attribute("data-signature"), Some("yes"));
        assert_eq!(div.attribute("title"), Some("a&b"));
    }

    #[test]
    fn text_is_entity_decoded() {
        let root = parse("<p>Fee&nbsp;of &#8377;10</p>");
        assert_eq!(root.text_content(), "Fee of ₹10");
    }

    #[test]
    fn plain_text_input_is_one_text_node() {
        let root = parse("Just a sentence.");
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].is_text());
    }
}
