use quick_xml::escape::unescape;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap()
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());

/// Decode one `&...;` reference through quick-xml's HTML5 entity table.
/// Non-breaking and typographic spaces come back as a plain space.
fn decode_reference(reference: &str) -> Option<String> {
    let reference = match reference.strip_prefix("&#X") {
        Some(hex) => Cow::Owned(format!("&#x{hex}")),
        None => Cow::Borrowed(reference),
    };
    let decoded = unescape(&reference).ok()?;
    let value = match decoded.as_ref() {
        "\u{a0}" | "\u{2002}" | "\u{2003}" | "\u{2009}" | "\u{202f}" => " ",
        "\u{ad}" | "\u{200c}" | "\u{200d}" => "",
        other => other,
    };
    Some(value.to_string())
}

/// Decode HTML entity references. Unknown or invalid references are kept
/// literally, so decoding never fails.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_REGEX.replace_all(text, |caps: &Captures| {
        decode_reference(&caps[0]).unwrap_or_else(|| caps[0].to_string())
    })
}

/// Remove anything that looks like a tag and decode what is left
pub fn strip_tags(markup: &str) -> String {
    let stripped = TAG_REGEX.replace_all(markup, " ");
    decode_entities(&stripped).into_owned()
}
