//! Markup normalization
//!
//! Turns the raw parse tree into the canonical form every later stage
//! relies on:
//! - whitespace runs collapsed to one space, edge whitespace trimmed at
//!   block boundaries
//! - empty elements removed (except `img`/`hr`; `br` survives between content)
//! - two or more consecutive `<br>` treated as a paragraph boundary
//!
//! Node order is never changed. Normalizing serialized output again yields
//! the same tree.

use super::parser;
use crate::types::MarkupNode;

/// Elements whose content is never document text
const DROPPED_TAGS: &[&str] = &["head", "script", "style", "title", "template", "noscript"];

/// Containers split into sibling paragraphs at a `<br>` run
const SPLITTABLE_TAGS: &[&str] = &["p", "div"];

/// Parse and normalize in one step
pub fn normalize(markup: &str) -> MarkupNode {
    normalize_tree(parser::parse(markup))
}

/// Normalize an already parsed tree rooted at `#root`
pub fn normalize_tree(root: MarkupNode) -> MarkupNode {
    let MarkupNode {
        kind,
        tag_name,
        text,
        children,
        attributes,
    } = root;
    let children = normalize_children(children, true);
    let children = if has_break_run(&children) {
        split_loose_content(children)
    } else {
        children
    };
    MarkupNode {
        kind,
        tag_name,
        text,
        children,
        attributes,
    }
}

fn normalize_node(node: MarkupNode) -> Vec<MarkupNode> {
    if node.is_text() {
        return vec![MarkupNode::text(collapse_runs(&node.text))];
    }
    if DROPPED_TAGS.contains(&node.tag_name.as_str()) {
        return Vec::new();
    }
    if node.is_void() {
        let mut node = node;
        node.children.clear();
        return vec![node];
    }

    let block_context = !node.is_inline();
    let MarkupNode {
        kind,
        tag_name,
        text,
        children,
        attributes,
    } = node;
    let children = normalize_children(children, block_context);
    let element = MarkupNode {
        kind,
        tag_name,
        text,
        children,
        attributes,
    };

    if !has_content(&element) {
        return Vec::new();
    }

    if SPLITTABLE_TAGS.contains(&element.tag_name.as_str()) && has_break_run(&element.children) {
        return split_element(element);
    }

    let mut element = element;
    element.children = collapse_break_runs(std::mem::take(&mut element.children));
    vec![element]
}

fn normalize_children(children: Vec<MarkupNode>, block_context: bool) -> Vec<MarkupNode> {
    let flattened: Vec<MarkupNode> = children.into_iter().flat_map(normalize_node).collect();
    let merged = merge_adjacent_text(flattened);
    let spaced = fix_edge_whitespace(merged, block_context);
    if block_context {
        trim_edge_breaks(spaced)
    } else {
        spaced
    }
}

/// Replace every whitespace run with one space, keeping a single edge space
fn collapse_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

fn merge_adjacent_text(nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
    let mut out: Vec<MarkupNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.is_text() {
            if let Some(last) = out.last_mut().filter(|n| n.is_text()) {
                last.text.push_str(&node.text);
                last.text = collapse_runs(&last.text);
                continue;
            }
        }
        out.push(node);
    }
    out
}

/// Inline content that text can flow into without a visual break
fn flows(node: &MarkupNode) -> bool {
    node.is_inline() && !node.is_line_break()
}

fn fix_edge_whitespace(nodes: Vec<MarkupNode>, block_context: bool) -> Vec<MarkupNode> {
    let len = nodes.len();
    let flow: Vec<bool> = nodes.iter().map(flows).collect();
    let mut out = Vec::with_capacity(len);

    for (i, mut node) in nodes.into_iter().enumerate() {
        if !node.is_text() {
            out.push(node);
            continue;
        }
        let prev_flows = i > 0 && flow[i - 1];
        let next_flows = i + 1 < len && flow[i + 1];

        if node.text.trim().is_empty() {
            if prev_flows && next_flows {
                node.text = " ".to_string();
                out.push(node);
            }
            continue;
        }

        // Inside inline elements the edge space belongs to the sentence
        // around the element and is kept.
        let keep_leading = prev_flows || (!block_context && i == 0);
        let keep_trailing = next_flows || (!block_context && i + 1 == len);
        let mut text = node.text.as_str();
        if !keep_leading {
            text = text.trim_start();
        }
        if !keep_trailing {
            text = text.trim_end();
        }
        node.text = text.to_string();
        out.push(node);
    }
    out
}

fn trim_edge_breaks(mut nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
    while nodes.first().is_some_and(MarkupNode::is_line_break) {
        nodes.remove(0);
    }
    while nodes.last().is_some_and(MarkupNode::is_line_break) {
        nodes.pop();
    }
    nodes
}

fn has_break_run(nodes: &[MarkupNode]) -> bool {
    nodes
        .windows(2)
        .any(|pair| pair[0].is_line_break() && pair[1].is_line_break())
}

fn collapse_break_runs(nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
    let mut out: Vec<MarkupNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.is_line_break() && out.last().is_some_and(MarkupNode::is_line_break) {
            continue;
        }
        out.push(node);
    }
    out
}

/// Content is non-blank text, an embedded object such as an image, or a
/// signature anchor
fn has_content(node: &MarkupNode) -> bool {
    if node.is_text() {
        return !node.text.trim().is_empty();
    }
    if node.attribute("data-signature").is_some() {
        return true;
    }
    if node.is_void() {
        return !node.is_line_break();
    }
    node.children.iter().any(has_content)
}

/// Split a node list at every run of two or more `<br>`
fn split_segments(nodes: Vec<MarkupNode>) -> Vec<Vec<MarkupNode>> {
    let mut segments = vec![Vec::new()];
    let mut pending_break: Option<MarkupNode> = None;

    for node in nodes {
        if node.is_line_break() {
            match pending_break.take() {
                Some(_) => {
                    // second break in a row: paragraph boundary
                    segments.push(Vec::new());
                }
                None => {
                    if segments.last().is_some_and(|s| s.is_empty()) {
                        continue;
                    }
                    pending_break = Some(node);
                }
            }
            continue;
        }
        if let Some(br) = pending_break.take() {
            if let Some(segment) = segments.last_mut() {
                segment.push(br);
            }
        }
        if let Some(segment) = segments.last_mut() {
            segment.push(node);
        }
    }

    segments
        .into_iter()
        .map(|segment| fix_edge_whitespace(trim_edge_breaks(segment), true))
        .filter(|segment| segment.iter().any(has_content))
        .collect()
}

fn split_element(element: MarkupNode) -> Vec<MarkupNode> {
    let MarkupNode {
        tag_name,
        children,
        attributes,
        ..
    } = element;
    split_segments(children)
        .into_iter()
        .map(|segment| {
            let mut part = MarkupNode::element(&tag_name, segment);
            part.attributes = attributes.clone();
            part
        })
        .collect()
}

/// At the root, inline runs between `<br>` runs become paragraphs; block
/// elements pass through untouched.
fn split_loose_content(children: Vec<MarkupNode>) -> Vec<MarkupNode> {
    let mut out = Vec::new();
    for segment in split_segments(children) {
        let mut inline_run: Vec<MarkupNode> = Vec::new();
        for node in segment {
            if node.is_inline() {
                inline_run.push(node);
                continue;
            }
            flush_paragraph(&mut inline_run, &mut out);
            out.push(node);
        }
        flush_paragraph(&mut inline_run, &mut out);
    }
    out
}

fn flush_paragraph(run: &mut Vec<MarkupNode>, out: &mut Vec<MarkupNode>) {
    if run.is_empty() {
        return;
    }
    let content = fix_edge_whitespace(trim_edge_breaks(std::mem::take(run)), true);
    if content.iter().any(has_content) {
        out.push(MarkupNode::element("p", content));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::serialize;

    fn round(markup: &str) -> String {
        serialize(&normalize(markup))
    }

    #[test]
    fn collapses_whitespace_and_trims_blocks() {
        assert_eq!(
            round("<p>  Fee   of\n Rs.  10 </p>"),
            "<p>Fee of Rs. 10</p>"
        );
    }

    #[test]
    fn keeps_space_between_inline_siblings() {
        assert_eq!(
            round("<p><b>Subject:</b> <i>water</i></p>"),
            "<p><b>Subject:</b> <i>water</i></p>"
        );
        assert_eq!(round("<p><b>Hello </b>world</p>"), "<p><b>Hello </b>world</p>");
    }

    #[test]
    fn decodes_accented_name_entities() {
        let root = normalize("<p>Ren&eacute;e &rarr; &Uuml;ber&nbsp;&rsquo;ok</p>");
        assert_eq!(root.text_content(), "Renée → Über ’ok");
    }

    #[test]
    fn removes_empty_elements() {
        assert_eq!(round("<p> </p><p><b></b>text</p><div><span> </span></div>"), "<p>text</p>");
    }

    #[test]
    fn keeps_images_and_rules() {
        assert_eq!(round(r#"<p><img src="sig.png"></p><hr>"#), r#"<p><img src="sig.png"></p><hr>"#);
    }

    #[test]
    fn break_run_splits_paragraph() {
        assert_eq!(
            round("<p>First part<br><br>Second part<br>line two</p>"),
            "<p>First part</p><p>Second part<br>line two</p>"
        );
    }

    #[test]
    fn break_run_collapses_inside_other_elements() {
        assert_eq!(
            round("<li>one<br><br><br>two</li>"),
            "<li>one<br>two</li>"
        );
    }

    #[test]
    fn break_run_at_root_wraps_loose_text() {
        assert_eq!(
            round("Dear Sir<br><br>Please find<br>attached"),
            "<p>Dear Sir</p><p>Please find<br>attached</p>"
        );
    }

    #[test]
    fn edge_breaks_are_trimmed() {
        assert_eq!(round("<p><br>Text<br></p>"), "<p>Text</p>");
    }

    #[test]
    fn drops_style_and_script_content() {
        assert_eq!(
            round("<style>p { color: red }</style><p>Body</p><script>x()</script>"),
            "<p>Body</p>"
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "<div>To,<br>The PIO<br><br><b>Subject:</b>  RTI   request</div>",
            "<p> a <b> b </b> c </p>\n\n<ul><li> x </li><li></li></ul>",
            "loose <i>inline</i> text<br><br><h3>Declaration</h3>",
        ];
        for input in inputs {
            let once = round(input);
            assert_eq!(round(&once), once, "input: {input}");
        }
    }
}
