//! Test body minification on top of the `oxc` parser and printer.

use crate::error::SourceLocation;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::fmt;

const ENVELOPE_NAME: &str = "function x()";
const ENVELOPE_PREFIX: &str = "function x(){";
const ENVELOPE_SUFFIX: &str = "}";

/// Why a body could not be minified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyFailure {
    /// Parser or printer message
    pub message: String,
    /// Position of the failure inside the wrapped source
    pub location: SourceLocation,
}

impl fmt::Display for MinifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.location)
    }
}

/// Wrap `body` in a throwaway function, the shape that gets parsed.
pub fn wrap(body: &str) -> String {
    format!("{}{}{}", ENVELOPE_PREFIX, body, ENVELOPE_SUFFIX)
}

/// Whitespace-only printing, used when minified output would switch string
/// quotes to backticks.
fn compact_options() -> CodegenOptions {
    CodegenOptions {
        comments: CommentOptions::disabled(),
        indent_width: 0,
        ..CodegenOptions::default()
    }
}

fn backticks(text: &str) -> usize {
    text.matches('`').count()
}

/// Minify a single wrapped source; the envelope is kept.
///
/// The minified printer may quote strings with backticks, which is template
/// literal syntax. Output that gained backticks is reprinted with
/// [`compact_options`] so a body never picks up syntax it did not have.
fn minify_wrapped(wrapped: &str) -> Result<String, MinifyFailure> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, wrapped, SourceType::cjs()).parse();
    if let Some(error) = ret.errors.first() {
        let offset = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map(|label| label.offset())
            .unwrap_or(0);
        return Err(MinifyFailure {
            message: error.to_string(),
            location: SourceLocation::from_offset(wrapped, offset),
        });
    }
    let code = Codegen::new()
        .with_options(CodegenOptions::minify())
        .build(&ret.program)
        .code;
    if backticks(&code) <= backticks(wrapped) {
        return Ok(code.trim_end().to_string());
    }
    tracing::debug!("minified output introduced template literals, printing compact");
    let code = Codegen::new()
        .with_options(compact_options())
        .build(&ret.program)
        .code;
    Ok(code.trim_end().to_string())
}

/// Body of a printed `function x() { ... }` envelope.
fn strip_envelope(code: &str) -> Option<&str> {
    code.strip_prefix(ENVELOPE_NAME)?
        .trim_start()
        .strip_prefix('{')?
        .strip_suffix(ENVELOPE_SUFFIX)
        .map(str::trim)
}

/// Minify a test body.
///
/// On failure `on_error` receives the test path, the wrapped source that was
/// parsed, and the failure; the original body is then returned unchanged.
pub fn minify<F>(path: &[String], body: &str, mut on_error: F) -> String
where
    F: FnMut(&[String], &str, &MinifyFailure),
{
    let wrapped = wrap(body);
    let result = minify_wrapped(&wrapped).and_then(|code| {
        strip_envelope(&code)
            .map(str::to_string)
            .ok_or_else(|| MinifyFailure {
                message: "minified output lost the function envelope".to_string(),
                location: SourceLocation::default(),
            })
    });
    match result {
        Ok(minified) => minified,
        Err(failure) => {
            on_error(path, &wrapped, &failure);
            body.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<String> {
        vec!["es6".to_string(), "let".to_string()]
    }

    #[test]
    fn test_minify_strips_whitespace_and_comments() {
        let body = "\n  // scratch\n  var   foo = 123;\n\n  return (foo === 123);\n";
        let mut failures = 0;
        let out = minify(&path(), body, |_, _, _| failures += 1);
        assert_eq!(failures, 0);
        assert!(out.len() < body.len());
        assert!(!out.contains("scratch"));
        assert!(!out.contains('\n'));
        assert!(out.contains("123"));
    }

    #[test]
    fn test_minify_failure_falls_back() {
        let body = "return 1 +;";
        let mut seen = Vec::new();
        let out = minify(&path(), body, |p, wrapped, failure| {
            seen.push((p.join("/"), wrapped.to_string(), failure.clone()));
        });
        assert_eq!(out, body);
        assert_eq!(seen.len(), 1);
        let (p, wrapped, failure) = &seen[0];
        assert_eq!(p, "es6/let");
        assert_eq!(wrapped, "function x(){return 1 +;}");
        assert_eq!(failure.location.line, 1);
        assert!(!failure.message.is_empty());
    }

    #[test]
    fn test_minify_keeps_plain_string_quotes() {
        let body = "return \"a\" + 'b' === \"ab\";";
        let mut failures = 0;
        let out = minify(&path(), body, |_, _, _| failures += 1);
        assert_eq!(failures, 0);
        assert!(!out.contains('`'), "{}", out);
        assert!(out.contains("\"ab\"") || out.contains("'ab'"), "{}", out);
    }

    #[test]
    fn test_minify_keeps_existing_template_literals() {
        let body = "var a = 1;\n  return `a${a}` === 'a1';";
        let out = minify(&path(), body, |_, _, f| panic!("unexpected failure: {}", f));
        assert!(out.contains("`a${a}`"), "{}", out);
        assert!(!out.contains("var a = 1;\n  "), "{}", out);
    }

    #[test]
    fn test_strip_envelope_accepts_both_layouts() {
        assert_eq!(strip_envelope("function x(){return 1}"), Some("return 1"));
        assert_eq!(strip_envelope("function x() {\nreturn 1;\n}"), Some("return 1;"));
        assert_eq!(strip_envelope("function y(){}"), None);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("return 1;"), "function x(){return 1;}");
    }
}
