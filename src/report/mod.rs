//! Result trees and the console report
//!
//! A host run produces a [`RunReport`]: the host environment plus a tree of
//! [`ResultNode`]s mirroring the exported object of the generated module.
//! [`Reporter`] renders that tree, one line per leaf and one summary line per
//! group:
//!
//! ```text
//! 1  tests have been excluded
//! 	 g  1/2
//! ✔	 t1
//! ✘	 t2
//! ```

mod style;

pub use style::{paint, Style};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};

const INDENTS: [&str; 7] = ["", " ", "  ", "   ", "    ", "     ", "      "];
const ERROR_CLIP: usize = 70;
const SEPARATOR: &str = "------------------------";

/// Names with this prefix are metadata, not tests.
pub const RESERVED_PREFIX: &str = "__";

// ---------------------------------------------------------------------------
// Result tree
// ---------------------------------------------------------------------------

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The check returned `true`.
    Pass,
    /// The check only passes in strict mode.
    Strict,
    /// The check could not be run (async or unsupported source).
    Unable,
    /// The check threw or returned an error.
    Error,
    /// The check returned something other than `true`.
    Fail,
}

impl Outcome {
    /// Counted as a success in group summaries.
    pub fn is_success(self) -> bool {
        self == Outcome::Pass
    }

    /// Display style for a leaf with this outcome.
    pub fn style(self) -> Style {
        match self {
            Outcome::Pass => Style::Pass,
            Outcome::Strict => Style::StrictOnly,
            Outcome::Unable => Style::Unable,
            Outcome::Error | Outcome::Fail => Style::Fail,
        }
    }

    /// Check mark for the leaf line.
    pub fn glyph(self) -> &'static str {
        if self.is_success() {
            "\u{2714}"
        } else {
            "\u{2718}"
        }
    }
}

/// A node of the result tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultNode {
    /// A group of results.
    Group {
        name: String,
        children: Vec<ResultNode>,
    },
    /// The result of one check.
    Leaf {
        name: String,
        outcome: Outcome,
        /// Error text or the returned value, for anything but a pass
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
        /// Source of the check, when requested from the host
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

impl ResultNode {
    /// Create a leaf without detail or source.
    pub fn leaf(name: impl Into<String>, outcome: Outcome) -> Self {
        ResultNode::Leaf {
            name: name.into(),
            outcome,
            detail: None,
            source: None,
        }
    }

    /// Create a group.
    pub fn group(name: impl Into<String>, children: Vec<ResultNode>) -> Self {
        ResultNode::Group {
            name: name.into(),
            children,
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            ResultNode::Group { name, .. } | ResultNode::Leaf { name, .. } => name,
        }
    }

    /// Whether this node is metadata rather than a test.
    pub fn is_reserved(&self) -> bool {
        self.name().starts_with(RESERVED_PREFIX)
    }

    /// Success and total counts over every non-reserved leaf at or below.
    pub fn summary(&self) -> Summary {
        match self {
            ResultNode::Leaf { outcome, .. } => Summary {
                success: usize::from(outcome.is_success()),
                total: 1,
            },
            ResultNode::Group { children, .. } => summarize(children),
        }
    }
}

/// Aggregate counts for a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Leaves that passed
    pub success: usize,
    /// All leaves
    pub total: usize,
}

impl Summary {
    /// Every leaf passed.
    pub fn is_full(&self) -> bool {
        self.success == self.total
    }

    /// No leaf passed.
    pub fn is_none(&self) -> bool {
        self.success == 0
    }

    /// Style for the `success/total` fraction.
    pub fn style(&self) -> Style {
        if self.is_full() {
            Style::Pass
        } else if self.is_none() {
            Style::Fail
        } else {
            Style::Partial
        }
    }
}

/// Summarize a list of sibling nodes, skipping reserved names.
pub fn summarize(nodes: &[ResultNode]) -> Summary {
    nodes
        .iter()
        .filter(|node| !node.is_reserved())
        .map(ResultNode::summary)
        .fold(Summary::default(), |acc, s| Summary {
            success: acc.success + s.success,
            total: acc.total + s.total,
        })
}

/// Everything a host run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Host environment description (`node.version`, `node.platform`, ...)
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Top-level result nodes
    pub results: Vec<ResultNode>,
}

impl RunReport {
    /// Summary over the whole tree.
    pub fn summary(&self) -> Summary {
        summarize(&self.results)
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// What the console report shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Only group summary lines
    pub summary: bool,
    /// Hide passing tests and fully passing groups
    pub fail: bool,
    /// Print error text under failing tests
    pub errors: bool,
    /// Indent lines by depth
    pub indent: bool,
    /// Print the source of every displayed test
    pub src: bool,
    /// List excluded tests and the host environment
    pub verbose: bool,
}

/// Writes the console report.
pub struct Reporter<W: Write> {
    options: ReportOptions,
    out: W,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter writing to `out`.
    pub fn new(options: ReportOptions, out: W) -> Self {
        Self { options, out }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render the excluded-test header followed by the result tree.
    pub fn render(&mut self, report: &RunReport, excluded: &[String]) -> io::Result<()> {
        if !excluded.is_empty() {
            writeln!(self.out, "{}  tests have been excluded", excluded.len())?;
            if self.options.verbose {
                writeln!(self.out, "\tThe following tests have been excluded")?;
                for path in excluded {
                    writeln!(self.out, "\t*  {}", path)?;
                }
            }
        }
        if self.options.verbose {
            for (key, value) in &report.env {
                writeln!(self.out, "{}: {}", key, value)?;
            }
        }
        self.render_nodes(&report.results, 0)
    }

    fn render_nodes(&mut self, nodes: &[ResultNode], depth: usize) -> io::Result<()> {
        for node in nodes.iter().filter(|node| !node.is_reserved()) {
            match node {
                ResultNode::Leaf { .. } => self.render_leaf(node, depth + 1)?,
                ResultNode::Group { name, children } => {
                    let summary = node.summary();
                    if self.options.fail && summary.is_full() {
                        continue;
                    }
                    let fraction = format!("{}/{}", summary.success, summary.total);
                    writeln!(
                        self.out,
                        "\t {}{}  {}",
                        self.indent(depth),
                        name,
                        paint(summary.style(), &fraction)
                    )?;
                    self.render_nodes(children, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn render_leaf(&mut self, node: &ResultNode, depth: usize) -> io::Result<()> {
        let ResultNode::Leaf {
            name,
            outcome,
            detail,
            source,
        } = node
        else {
            return Ok(());
        };
        if self.options.summary || (self.options.fail && outcome.is_success()) {
            return Ok(());
        }
        let line = format!("{}\t {}{}", outcome.glyph(), self.indent(depth), name);
        writeln!(self.out, "{}", paint(outcome.style(), &line))?;
        if self.options.errors && matches!(outcome, Outcome::Error | Outcome::Unable) {
            if let Some(detail) = detail {
                writeln!(self.out, "\t\t {}", clip(ERROR_CLIP, detail))?;
            }
        }
        if self.options.src {
            if let Some(source) = source {
                writeln!(self.out, "{}", SEPARATOR)?;
                writeln!(self.out, "{}{}", INDENTS[4], indent_code(4, source))?;
                writeln!(self.out, "{}", SEPARATOR)?;
            }
        }
        Ok(())
    }

    fn indent(&self, depth: usize) -> &'static str {
        if self.options.indent {
            indent(depth)
        } else {
            ""
        }
    }
}

/// Indentation for `depth`, capped at six spaces.
pub fn indent(depth: usize) -> &'static str {
    INDENTS[depth.min(INDENTS.len() - 1)]
}

/// Indent every continuation line of `src` by `depth`.
pub fn indent_code(depth: usize, src: &str) -> String {
    src.split('\n')
        .collect::<Vec<_>>()
        .join(&format!("\n{}", indent(depth)))
}

/// Clip `text` to `len` characters, ending clipped text with `...`.
pub fn clip(len: usize, text: &str) -> String {
    if text.chars().count() < len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
