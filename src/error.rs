//! Error types for escheck

use std::fmt;
use thiserror::Error;

/// Source location inside a piece of JavaScript text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (0-indexed, counted in characters)
    pub column: u32,
    /// Byte offset in source
    pub offset: usize,
}

impl SourceLocation {
    /// Compute the line/column of a byte offset in `source`.
    ///
    /// Offsets past the end (or inside a multi-byte character) are clamped to
    /// the closest preceding character boundary.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() as u32;
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Format the source line holding `location`, marking the failing column with
/// `<!` and closing the line with `>`.
///
/// Returns an empty string when the line does not exist.
pub fn format_error_line(source: &str, location: &SourceLocation) -> String {
    let line_idx = location.line.saturating_sub(1) as usize;
    let Some(text) = source.split('\n').nth(line_idx) else {
        return String::new();
    };
    let split = text
        .char_indices()
        .nth(location.column as usize)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    format!("{}<!{}>", &text[..split], &text[split..])
}

/// Main error type for escheck
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IOError: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed JSON (definition files or host output)
    #[error("JSONError: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// A test definition that cannot be turned into a leaf or a group
    #[error("ValidationError: {path}: {message}")]
    Validation { path: String, message: String },

    /// A filter segment that is not a valid regular expression
    #[error("InvalidFilter: '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// A preset name that is not in the preset table
    #[error("UnknownPreset: '{0}'")]
    UnknownPreset(String),

    /// A label without a single word character
    #[error("EmptyIdentifier: '{0}' has no word characters")]
    EmptyIdentifier(String),

    /// The script host could not be started or produced unreadable output
    #[error("HostError: {0}")]
    Host(String),

    /// The generated module could not be loaded by the host
    #[error("ModuleError: {message}{}", stack_suffix(.stack))]
    ModuleLoad { message: String, stack: String },
}

impl Error {
    /// Create a validation error for the definition at `path`
    pub fn validation(path: &[String], message: impl Into<String>) -> Self {
        Error::Validation {
            path: path.join("/"),
            message: message.into(),
        }
    }

    /// Create a host error
    pub fn host(message: impl Into<String>) -> Self {
        Error::Host(message.into())
    }
}

fn stack_suffix(stack: &str) -> String {
    if stack.is_empty() {
        String::new()
    } else {
        format!("\n{}", stack)
    }
}

/// Result type alias for escheck
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let src = "function x(){\n  return 1 +;\n}";
        let offset = src.find(';').unwrap();
        let loc = SourceLocation::from_offset(src, offset);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 12);
        assert_eq!(loc.to_string(), "2:12");
    }

    #[test]
    fn test_location_clamps_past_end() {
        let loc = SourceLocation::from_offset("ab\ncd", 99);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn test_format_error_line() {
        let src = "a\nreturn 1 +;\nb";
        let loc = SourceLocation {
            line: 2,
            column: 10,
            offset: 0,
        };
        assert_eq!(format_error_line(src, &loc), "return 1 +<!;>");
    }

    #[test]
    fn test_format_error_line_missing_line() {
        let loc = SourceLocation {
            line: 7,
            column: 0,
            offset: 0,
        };
        assert_eq!(format_error_line("one line", &loc), "");
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation(&["es6".into(), "let".into()], "both exec and subtests");
        assert_eq!(err.to_string(), "ValidationError: es6/let: both exec and subtests");
    }
}
