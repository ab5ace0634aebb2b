//! Identifier sanitizing and string escaping for generated code.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn non_word() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static regex"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lowerize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a display label into a camel-cased identifier.
///
/// `"basic support (strict mode)"` becomes `basicSupportStrictMode`,
/// `"2015 features"` becomes `_2015Features`. Only the first character of
/// each fragment changes case.
pub fn to_identifier(label: &str) -> Result<String> {
    let mut parts = non_word().split(label).filter(|part| !part.is_empty());
    let Some(initial) = parts.next() else {
        return Err(Error::EmptyIdentifier(label.to_string()));
    };
    let mut ident = if initial.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", initial)
    } else {
        lowerize(initial)
    };
    for part in parts {
        ident.push_str(&capitalize(part));
    }
    Ok(ident)
}

/// Escape `text` for use between double quotes in generated JavaScript.
///
/// Uses JSON string escaping (quotes, backslashes, control characters) and
/// strips the surrounding quotes.
pub fn js_escape(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
