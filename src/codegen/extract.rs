//! Function-body extraction from callable source text.

use regex::Regex;
use std::sync::OnceLock;

fn commented_body() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A.*/\*(.*)\*/\}\z").expect("static regex"))
}

fn explicit_body() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*function\s*\(([^)]*)\)\s*\{(.*)\}\s*\z").expect("static regex")
    })
}

fn async_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"asyncTestPassed\(\)").expect("static regex"))
}

/// Extract the executable body from the source text of a callable.
///
/// A source whose last characters are a block comment followed by the closing
/// brace yields the comment text, so
/// `function () {/* return typeof Symbol === "function"; */}` generates
/// `return typeof Symbol === "function";`. Otherwise the source must be an
/// anonymous `function (...) { ... }` literal and the text between its outer
/// braces is returned. Both results are trimmed.
pub fn extract_body(source: &str) -> Option<String> {
    if let Some(caps) = commented_body().captures(source) {
        return Some(caps[1].trim().to_string());
    }
    explicit_body()
        .captures(source)
        .map(|caps| caps[2].trim().to_string())
}

/// Returns true if the body signals completion through `asyncTestPassed()`.
pub fn is_async_test(body: &str) -> bool {
    async_marker().is_match(body)
}
