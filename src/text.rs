//! Bag-of-words tokenization for email bodies.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A document reduced to the set of distinct lowercase tokens it contains.
pub type Document = BTreeSet<String>;

static NON_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9!?]").expect("Token pattern should compile"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([!?])").expect("Punctuation pattern should compile"));

/// Cleans `text` and returns its distinct tokens.
///
/// Everything other than ASCII letters, digits, `!` and `?` becomes whitespace,
/// `!` and `?` are split off as tokens of their own, and the result is lowercased.
///
/// # Example
/// ```rust
/// use bayesnet_rs::text::clean_str;
///
/// let doc = clean_str("Subject: WIN a FREE prize!!! Don't wait");
/// assert!(doc.contains("free"));
/// assert!(doc.contains("!"));
/// assert!(doc.contains("don"));
/// assert!(!doc.contains("subject:"));
/// ```
#[must_use]
pub fn clean_str(text: &str) -> Document {
    let spaced = NON_TOKEN.replace_all(text, " ");
    let spaced = PUNCTUATION.replace_all(&spaced, " $1 ");
    spaced
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// Applies [`clean_str`] to every email.
#[must_use]
pub fn clean_documents<S: AsRef<str>>(emails: &[S]) -> Vec<Document> {
    emails.iter().map(|e| clean_str(e.as_ref())).collect()
}
