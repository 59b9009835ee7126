use crate::types::{collapse_whitespace, MarkupNode};

/// Derive plain text from a normalized tree.
///
/// Block elements start their own line and paragraphs are separated by a
/// blank line. `<br>` is a newline, list items get `1.` (ordered) or `•`
/// prefixes. Blank-line runs collapse to one and a line repeating the
/// previous non-blank line is dropped.
pub fn to_plain_text(root: &MarkupNode) -> String {
    let mut writer = PlainTextWriter::default();
    writer.walk(root);
    writer.finish()
}

#[derive(Default)]
struct PlainTextWriter {
    lines: Vec<String>,
    current: String,
    /// One counter per open list container; `None` for unordered lists
    lists: Vec<Option<u32>>,
}

impl PlainTextWriter {
    fn walk(&mut self, node: &MarkupNode) {
        if node.is_text() {
            self.current.push_str(&node.text);
            return;
        }
        if node.is_line_break() {
            self.end_line();
            return;
        }
        if node.is_inline() {
            for child in &node.children {
                self.walk(child);
            }
            return;
        }

        match node.tag_name.as_str() {
            "ul" | "ol" => {
                self.end_line();
                self.lists
                    .push((node.tag_name == "ol").then_some(0));
                for child in &node.children {
                    self.walk(child);
                }
                self.lists.pop();
                self.blank_line();
            }
            "li" => {
                self.end_line();
                let marker = self.next_marker();
                self.current.push_str(&marker);
                self.current.push(' ');
                for child in &node.children {
                    self.walk(child);
                }
                self.end_line();
            }
            _ => {
                self.end_line();
                for child in &node.children {
                    self.walk(child);
                }
                self.blank_line();
            }
        }
    }

    fn next_marker(&mut self) -> String {
        match self.lists.last_mut() {
            Some(Some(counter)) => {
                *counter += 1;
                format!("{}.", counter)
            }
            _ => "•".to_string(),
        }
    }

    fn end_line(&mut self) {
        let line = collapse_whitespace(&self.current);
        self.current.clear();
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    fn blank_line(&mut self) {
        self.end_line();
        self.lines.push(String::new());
    }

    fn finish(mut self) -> String {
        self.end_line();
        let mut out: Vec<&str> = Vec::with_capacity(self.lines.len());
        let mut last_content: Option<&str> = None;
        for line in &self.lines {
            if line.is_empty() {
                if out.last().is_some_and(|l| !l.is_empty()) {
                    out.push("");
                }
                continue;
            }
            if last_content == Some(line.as_str()) {
                continue;
            }
            last_content = Some(line.as_str());
            out.push(line);
        }
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::normalize;

    #[test]
    fn blocks_and_breaks_become_lines() {
        let root = normalize("<h3>To,<br>The PIO</h3><p>Subject: RTI</p>");
        assert_eq!(to_plain_text(&root), "To,\nThe PIO\n\nSubject: RTI");
    }

    #[test]
    fn list_items_are_prefixed() {
        let root = normalize("<ol><li>first</li><li>second</li></ol><ul><li>x</li></ul>");
        assert_eq!(to_plain_text(&root), "1. first\n2. second\n\n• x");
    }

    #[test]
    fn duplicate_lines_are_dropped() {
        let root = normalize("<p>Yours faithfully,</p><p>Yours faithfully,</p><p>Priya</p>");
        assert_eq!(to_plain_text(&root), "Yours faithfully,\n\nPriya");
    }

    #[test]
    fn inline_text_stays_on_one_line() {
        let root = normalize("<p>Please <b>provide</b> copies</p>");
        assert_eq!(to_plain_text(&root), "Please provide copies");
    }
}
