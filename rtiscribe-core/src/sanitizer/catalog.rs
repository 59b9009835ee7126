//! Standard boilerplate phrases
//!
//! The composer emits exactly these strings, and the sanitizer recognizes
//! them again, so a composed document can be sanitized back to its body.

use crate::types::IdentityFields;
use serde::{Deserialize, Serialize};

pub const ADDRESS_OPENER: &str = "To,";
pub const PIO_DESIGNATION: &str = "The Public Information Officer,";
pub const STANDARD_SUBJECT: &str =
    "Subject: Application for information under Section 6(1) of the Right to Information Act, 2005";
pub const SALUTATION: &str = "Respected Sir/Madam,";
pub const CITIZEN_CLAUSE_TAIL: &str =
    "a citizen of India, hereby request the following information under Section 6(1) of the Right to Information Act, 2005:";
pub const FEE_SENTENCE: &str =
    "I have paid the application fee of Rs. 10/- as prescribed under the Right to Information Act, 2005.";
pub const TIMELINE_SENTENCE: &str =
    "The information may be furnished within 30 days as stipulated under Section 7(1) of the Right to Information Act, 2005.";
pub const CLOSING: &str = "Yours faithfully,";
pub const SIGNATURE_MARKER: &str = "[SIGNATURE]";
pub const DECLARATION_BANNER: &str = "DECLARATION";
pub const DECLARATION_SENTENCE: &str =
    "I hereby declare that I am a citizen of India and the information sought does not fall within the restrictions contained in Section 8 and 9 of the Right to Information Act, 2005.";

/// Phrases removed when they make up a whole element, and (from three
/// words up) wherever they occur in text
const STANDARD_PHRASES: &[&str] = &[
    STANDARD_SUBJECT,
    SALUTATION,
    "Respected Sir,",
    "Respected Madam,",
    "Dear Sir/Madam,",
    "Dear Sir,",
    "Dear Madam,",
    "Sir/Madam,",
    FEE_SENTENCE,
    "I have paid the application fee of Rs. 10/-.",
    "The application fee of Rs. 10/- has been paid.",
    "Application fee of Rs. 10/- is enclosed.",
    TIMELINE_SENTENCE,
    "Please provide the information within 30 days as per the RTI Act.",
    "Kindly provide the information within the stipulated time of 30 days.",
    CLOSING,
    "Yours sincerely,",
    "Yours truly,",
    "Thanking you,",
    "Thanking you in anticipation,",
    "Thank you,",
    SIGNATURE_MARKER,
    DECLARATION_BANNER,
    "Declaration:",
    DECLARATION_SENTENCE,
    "I hereby declare that I am a citizen of India.",
    "Application under the Right to Information Act, 2005",
    "Application under Section 6(1) of the Right to Information Act, 2005",
    "Request for information under the Right to Information Act, 2005",
    "RTI Application",
];

/// Address lines: only removed as whole elements, never inside text, so the
/// author's own address header keeps its designation line
const STRUCTURAL_ONLY: &[&str] = &[ADDRESS_OPENER, PIO_DESIGNATION, "The PIO,"];

/// Standard phrases shorter than this many words are only removed
/// structurally. Caller-supplied phrases are removed anywhere.
pub const RESIDUAL_MIN_WORDS: usize = 3;

/// Read-only phrase table injected into the sanitizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseCatalog {
    phrases: Vec<String>,
    /// Supplied by the caller or configuration
    caller_phrases: Vec<String>,
    structural_only: Vec<String>,
}

impl Default for PhraseCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl PhraseCatalog {
    pub fn standard() -> Self {
        Self {
            phrases: STANDARD_PHRASES.iter().map(|p| p.to_string()).collect(),
            caller_phrases: Vec::new(),
            structural_only: STRUCTURAL_ONLY.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Catalog made of caller-supplied phrases only
    pub fn from_phrases<S: AsRef<str>>(phrases: &[S]) -> Self {
        Self {
            phrases: Vec::new(),
            caller_phrases: phrases.iter().map(|p| p.as_ref().to_string()).collect(),
            structural_only: Vec::new(),
        }
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.caller_phrases.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Every non-blank phrase, for whole-element matching
    pub fn structural_phrases(&self) -> impl Iterator<Item = &str> {
        self.phrases
            .iter()
            .chain(self.caller_phrases.iter())
            .chain(self.structural_only.iter())
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
    }

    /// Phrases removed anywhere in text: long standard phrases and every
    /// caller phrase
    pub fn residual_phrases(&self) -> impl Iterator<Item = &str> {
        let standard = self
            .phrases
            .iter()
            .map(String::as_str)
            .filter(|p| p.split_whitespace().count() >= RESIDUAL_MIN_WORDS);
        let caller = self
            .caller_phrases
            .iter()
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty());
        standard.chain(caller)
    }

    pub fn len(&self) -> usize {
        self.phrases.len() + self.caller_phrases.len() + self.structural_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identity phrases formatted with the current values. Recomputed on every
/// call; nothing is cached between documents.
pub fn identity_phrases(identity: &IdentityFields) -> Vec<String> {
    let mut phrases = Vec::new();
    if let Some(name) = &identity.name {
        phrases.push(format!("Name: {name}"));
        phrases.push(format!("Applicant: {name}"));
        phrases.push(format!("Applicant Name: {name}"));
        phrases.push(name.clone());
    }
    if let Some(address) = &identity.address {
        phrases.push(format!("Address: {address}"));
        phrases.push(address.clone());
    }
    if let Some(contact) = &identity.contact {
        phrases.push(format!("Contact: {contact}"));
        phrases.push(format!("Phone: {contact}"));
        phrases.push(format!("Mobile: {contact}"));
        phrases.push(contact.clone());
    }
    if let Some(email) = &identity.email {
        phrases.push(format!("Email: {email}"));
        phrases.push(format!("E-mail: {email}"));
        phrases.push(email.clone());
    }
    phrases.retain(|p| !p.trim().is_empty());
    phrases
}

/// Comparison key: lowercase, single spaces, trailing `,.:;` ignored
pub fn phrase_key(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| matches!(c, ',' | '.' | ':' | ';') || c.is_whitespace())
        .to_lowercase()
}
