//! Editor markup handling: lenient parsing, normalization, canonical
//! serialization and plain-text derivation.

pub mod entities;
pub mod normalizer;
pub mod parser;
pub mod plain_text;
pub mod serializer;

pub use entities::{decode_entities, strip_tags};
pub use normalizer::{normalize, normalize_tree};
pub use parser::parse;
pub use plain_text::to_plain_text;
pub use serializer::serialize;

/// Normalize markup and return its canonical serialization
pub fn canonicalize(markup: &str) -> String {
    serialize(&normalize(markup))
}

/// Plain text of arbitrary markup (plain text input passes through)
pub fn markup_to_text(markup: &str) -> String {
    to_plain_text(&normalize(markup))
}

/// Whether input looks like editor markup rather than plain text
pub fn looks_like_markup(input: &str) -> bool {
    input.contains('<') && input.contains('>')
}

/// Wrap plain text as markup: blank lines separate paragraphs and single
/// newlines become `<br>`
pub fn text_to_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut paragraph: Vec<&str> = Vec::new();
    for line in text.lines().chain(std::iter::once("")) {
        let line = line.trim();
        if !line.is_empty() {
            paragraph.push(line);
            continue;
        }
        if paragraph.is_empty() {
            continue;
        }
        let escaped: Vec<String> = paragraph
            .drain(..)
            .map(|l| quick_xml::escape::partial_escape(l).into_owned())
            .collect();
        out.push_str("<p>");
        out.push_str(&escaped.join("<br>"));
        out.push_str("</p>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_becomes_paragraphs() {
        assert_eq!(
            text_to_markup("To,\nThe PIO\n\n  Fee < Rs. 20 \n"),
            "<p>To,<br>The PIO</p><p>Fee &lt; Rs. 20</p>"
        );
        assert_eq!(text_to_markup("\n\n"), "");
    }

    #[test]
    fn detects_markup() {
        assert!(looks_like_markup("<p>x</p>"));
        assert!(!looks_like_markup("Fee < Rs. 20"));
    }
}
