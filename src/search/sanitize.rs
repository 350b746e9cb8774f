//! Free-text query sanitization for FTS5 `MATCH`.
//!
//! Turns whatever a visitor typed into a query FTS5 always accepts:
//!
//! - complete `"..."` pairs with something searchable inside survive
//!   verbatim as phrase queries
//! - every other word gets its syntax characters stripped and a trailing `*`
//!   so it matches as a prefix
//! - words that are left with nothing searchable are dropped
//!
//! A word that still contains characters FTS5 refuses in a bareword (`c++`,
//! `node.js`, `title:x`) is emitted as a quoted prefix string (`"c++"*`), so
//! the tokenizer splits it exactly like the indexed text.

use std::sync::LazyLock;

use regex::Regex;

static PHRASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*""#).expect("phrase pattern compiles"));

/// Words FTS5 parses as operators when written in upper case.
const OPERATORS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

/// Per-corpus sanitizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeRules {
    /// Remove `'` from free words instead of keeping it inside a quoted term.
    pub strip_apostrophes: bool,
}

impl SanitizeRules {
    /// Content entries: apostrophes carry no meaning in titles or tags.
    pub const CONTENT: Self = Self {
        strip_apostrophes: true,
    };

    /// Author profiles: names like O'Brien keep their apostrophe.
    pub const PROFILES: Self = Self {
        strip_apostrophes: false,
    };

    fn strips(self, c: char) -> bool {
        matches!(c, '(' | ')' | '-' | '"') || (self.strip_apostrophes && c == '\'')
    }
}

impl Default for SanitizeRules {
    fn default() -> Self {
        Self::CONTENT
    }
}

/// Sanitize with the content-entry rules.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    sanitize_with(raw, SanitizeRules::default())
}

/// Sanitize a raw search string into an FTS5 query. Blank input yields `""`.
#[must_use]
pub fn sanitize_with(raw: &str, rules: SanitizeRules) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let text = cleaned.trim();
    if text.is_empty() {
        return String::new();
    }

    let mut terms = Vec::new();
    let mut cursor = 0;
    for phrase in PHRASE_REGEX.find_iter(text) {
        push_words(&text[cursor..phrase.start()], rules, &mut terms);
        let inner = &phrase.as_str()[1..phrase.as_str().len() - 1];
        if inner.chars().any(char::is_alphanumeric) {
            terms.push(phrase.as_str().to_string());
        }
        cursor = phrase.end();
    }
    push_words(&text[cursor..], rules, &mut terms);

    terms.join(" ")
}

fn push_words(text: &str, rules: SanitizeRules, terms: &mut Vec<String>) {
    terms.extend(
        text.split_whitespace()
            .filter_map(|word| prefix_term(word, rules)),
    );
}

fn prefix_term(word: &str, rules: SanitizeRules) -> Option<String> {
    let stripped: String = word.chars().filter(|c| !rules.strips(*c)).collect();
    let stem = stripped.trim_end_matches('*');
    if !stem.chars().any(char::is_alphanumeric) {
        return None;
    }

    if !stem.chars().all(is_bareword_char) {
        return Some(format!("\"{stem}\"*"));
    }
    if OPERATORS.contains(&stem) {
        return Some(format!("{}*", stem.to_ascii_lowercase()));
    }
    Some(format!("{stem}*"))
}

/// Characters FTS5 accepts in an unquoted term.
fn is_bareword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}
