//! Console colors for report lines.

use colored::{ColoredString, Colorize};

/// Semantic style of a piece of report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Passing test, fully passing group
    Pass,
    /// Failing test, group with no passing test
    Fail,
    /// Group with some passing tests
    Partial,
    /// Test that passes only in strict mode
    StrictOnly,
    /// Test that could not be run
    Unable,
    /// Emphasized text (paths in log lines)
    Emphasis,
}

/// Wrap `text` in the colors of `style`.
pub fn paint(style: Style, text: &str) -> ColoredString {
    match style {
        Style::Pass => text.green(),
        Style::Fail => text.red(),
        Style::Partial => text.yellow(),
        Style::StrictOnly => text.cyan(),
        Style::Unable => text.blue(),
        Style::Emphasis => text.underline(),
    }
}
