use crate::markup::{normalize, serialize};
use crate::types::{ApplicantContext, MarkupNode};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[\s*(your\s+name|applicant\s+name|name|your\s+address|address|your\s+contact(?:\s+number)?|contact(?:\s+number)?|your\s+phone|phone|your\s+email|email|department(?:\s+name)?|place|date)\s*\]",
    )
    .unwrap()
});

/// Values available for `[YOUR NAME]`-style tokens
pub struct PlaceholderValues<'a> {
    pub ctx: &'a ApplicantContext,
    pub date: Option<NaiveDate>,
    pub date_format: &'a str,
}

impl PlaceholderValues<'_> {
    fn lookup(&self, token: &str) -> Option<String> {
        let token = token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let value = match token.as_str() {
            "your name" | "applicant name" | "name" => self.ctx.name(),
            "your address" | "address" => self.ctx.address(),
            "your contact" | "your contact number" | "contact" | "contact number"
            | "your phone" | "phone" => self.ctx.contact(),
            "your email" | "email" => self.ctx.email(),
            "department" | "department name" => self.ctx.department(),
            "place" => self.ctx.place_name(),
            "date" => {
                return self
                    .date
                    .map(|d| d.format(self.date_format).to_string())
            }
            _ => None,
        };
        value.map(str::to_string)
    }

    /// Replace known tokens in plain text; unknown ones stay visible
    pub fn fill_text(&self, text: &str) -> String {
        PLACEHOLDER_REGEX
            .replace_all(text, |caps: &Captures| {
                self.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Replace tokens inside markup text nodes, leaving tags untouched
    pub fn fill_markup(&self, markup: &str) -> String {
        let mut root = normalize(markup);
        self.fill_node(&mut root);
        serialize(&root)
    }

    fn fill_node(&self, node: &mut MarkupNode) {
        if node.is_text() {
            if PLACEHOLDER_REGEX.is_match(&node.text) {
                node.text = self.fill_text(&node.text);
            }
            return;
        }
        for child in &mut node.children {
            self.fill_node(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_known_values_only() {
        let ctx = ApplicantContext {
            applicant_name: Some("Priya Sharma".into()),
            place: Some("Pune".into()),
            ..Default::default()
        };
        let values = PlaceholderValues {
            ctx: &ctx,
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            date_format: "%d/%m/%Y",
        };
        assert_eq!(
            values.fill_text("[YOUR NAME], [Place], [DATE], [EMAIL]"),
            "Priya Sharma, Pune, 05/03/2024, [EMAIL]"
        );
    }

    #[test]
    fn markup_values_are_escaped() {
        let ctx = ApplicantContext {
            applicant_name: Some("A & B <Trust>".into()),
            ..Default::default()
        };
        let values = PlaceholderValues {
            ctx: &ctx,
            date: None,
            date_format: "%d/%m/%Y",
        };
        assert_eq!(
            values.fill_markup("<p>By [NAME] on [DATE]</p>"),
            "<p>By A &amp; B &lt;Trust&gt; on [DATE]</p>"
        );
    }
}
