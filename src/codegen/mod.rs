//! Check module generator
//!
//! Walks a [`TestSuite`], filters every leaf path through a [`PathFilter`],
//! and emits a self-contained CommonJS module:
//!
//! ```javascript
//! // ES6 compatibility checks
//! // -------------------------
//! var unableMsg = 'Unable to run this test';
//! function wrapStrict(f) { ... }
//! function f(b){ ... }
//! function a(b){ ... }
//! module.exports = {
//!   es6: {
//!     bindings: {
//!       const: {
//!         basicSupport: f("const foo = 123;\n return (foo === 123);")
//!       }
//!     }
//!   }
//! };
//! ```
//!
//! `f` turns a body into a callable, retrying in strict mode and marking a
//! strict-only pass with `'strict'`; when neither compiles the callable
//! returns the compile error. `a` stands in for async tests and for tests
//! whose source could not be extracted: its callable always returns the
//! "unable to run" error.

pub mod extract;
pub mod ident;
pub mod minify;

use crate::data::{TestNode, TestSuite};
use crate::error::{format_error_line, Result};
use crate::filter::{PathFilter, Rejection};
use crate::report::{paint, Style, RESERVED_PREFIX};
use extract::{extract_body, is_async_test};
use ident::{js_escape, to_identifier};
use minify::MinifyFailure;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Message of the error returned by tests that cannot be run.
pub const UNABLE_MSG: &str = "Unable to run this test";

const INDENT: &str = "  ";

/// Runtime support emitted ahead of the exported checks.
pub fn preamble() -> String {
    let mut out = String::new();
    out.push_str("// ES6 compatibility checks\n");
    out.push_str("// -------------------------\n");
    out.push_str(&format!("var unableMsg = '{}';\n", UNABLE_MSG));
    out.push_str(
        "function wrapStrict(f) { return function() { var v = f(); return v === true ? 'strict' : v; } }\n",
    );
    out.push_str(
        "function f(b){try{return new Function('global',b)} catch(e){\
         try { return wrapStrict(new Function('global','\"use strict\";'+b)); } \
         catch (ee) { return function(){return ee;}}}}\n",
    );
    out.push_str("function a(b){return function() { return new Error(unableMsg)}}\n");
    out
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How object keys are written in the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStyle {
    /// Camel-cased identifiers (`basicSupport`)
    #[default]
    Identifier,
    /// Quoted display names (`"basic support"`)
    Quoted,
}

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Include/exclude filters applied to every leaf path
    pub filter: PathFilter,
    /// Minify test bodies
    pub minify: bool,
    /// Log every rejected path
    pub verbose: bool,
    /// Key style for generated objects
    pub key_style: KeyStyle,
}

// ---------------------------------------------------------------------------
// GenerationReport
// ---------------------------------------------------------------------------

/// A body the minifier rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinifyError {
    /// Path of the test
    pub test: Vec<String>,
    /// Minifier message
    pub error: String,
    /// Failing source line with the column marked by `<!`
    pub src: String,
}

/// What happened to each test during a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Paths of generated tests, joined with `/`
    pub included: Vec<String>,
    /// Paths rejected by the filters
    pub excluded: Vec<String>,
    /// Included paths whose source had no extractable body
    pub unsupported: Vec<String>,
    /// Minification failures
    pub minify_errors: Vec<MinifyError>,
}

impl GenerationReport {
    /// `test count: N ( excluded M tests)`
    pub fn summary_line(&self) -> String {
        format!(
            "test count: {} ( excluded {} tests)",
            self.included.len(),
            self.excluded.len()
        )
    }

    /// Record (and log) a minification failure.
    pub fn add_minify_error(&mut self, path: &[String], wrapped: &str, failure: &MinifyFailure) {
        let src = format_error_line(wrapped, &failure.location);
        tracing::warn!(
            "Failed to minify {}\n{}\n   {}",
            paint(Style::Emphasis, &path.join(" / ")),
            src,
            failure.message
        );
        self.minify_errors.push(MinifyError {
            test: path.to_vec(),
            error: failure.message.clone(),
            src,
        });
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary_line())?;
        write!(f, "  {} minification errors", self.minify_errors.len())
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Generates the check module for one run.
#[derive(Debug)]
pub struct Generator<'a> {
    options: &'a GenerateOptions,
    report: GenerationReport,
}

impl<'a> Generator<'a> {
    /// Create a generator with the given options.
    pub fn new(options: &'a GenerateOptions) -> Self {
        Self {
            options,
            report: GenerationReport::default(),
        }
    }

    /// Generate the module text for `suite`.
    pub fn generate(mut self, suite: &TestSuite) -> (GenerationReport, String) {
        let mut entries = Vec::new();
        for root in &suite.roots {
            if let Some(value) = self.emit_root(root) {
                entries.push((root.name().to_string(), value));
            }
        }
        let mut out = preamble();
        out.push_str("module.exports = ");
        out.push_str(&self.emit_object(entries, 0).unwrap_or_else(|| "{}".to_string()));
        out.push_str(";\n");
        (self.report, out)
    }

    /// Roots partition their direct children by category when any carries one.
    fn emit_root(&mut self, node: &TestNode) -> Option<String> {
        let TestNode::Group { name, children, .. } = node else {
            return self.emit_node(&[], node, 1);
        };
        if children.iter().all(|child| child.category().is_none()) {
            return self.emit_node(&[], node, 1);
        }

        let path = vec![name.clone()];
        let mut categories: Vec<&str> = Vec::new();
        for category in children.iter().filter_map(TestNode::category) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        let mut entries = Vec::new();
        for category in categories {
            let mut category_path = path.clone();
            category_path.push(category.to_string());
            let mut members = Vec::new();
            for child in children.iter().filter(|c| c.category() == Some(category)) {
                if let Some(value) = self.emit_node(&category_path, child, 3) {
                    members.push((child.name().to_string(), value));
                }
            }
            if let Some(value) = self.emit_object(members, 2) {
                entries.push((category.to_string(), value));
            }
        }
        for child in children.iter().filter(|c| c.category().is_none()) {
            if let Some(value) = self.emit_node(&path, child, 2) {
                entries.push((child.name().to_string(), value));
            }
        }
        self.emit_object(entries, 1)
    }

    /// Render `node` as the value of an object entry at `depth`.
    fn emit_node(&mut self, parent: &[String], node: &TestNode, depth: usize) -> Option<String> {
        let mut path = parent.to_vec();
        path.push(node.name().to_string());
        match node {
            TestNode::Leaf { exec, .. } => self.emit_leaf(path, exec),
            TestNode::Group { children, .. } => {
                let mut entries = Vec::new();
                for child in children {
                    if let Some(value) = self.emit_node(&path, child, depth + 1) {
                        entries.push((child.name().to_string(), value));
                    }
                }
                self.emit_object(entries, depth)
            }
        }
    }

    fn emit_leaf(&mut self, path: Vec<String>, exec: &str) -> Option<String> {
        let joined = path.join("/");
        if let Err(rejection) = self.options.filter.check(&path) {
            if self.options.verbose {
                match rejection {
                    Rejection::Excluded => tracing::info!("{} excluded", joined),
                    Rejection::NotIncluded => tracing::info!("{} not included", joined),
                }
            }
            self.report.excluded.push(joined);
            return None;
        }
        self.report.included.push(joined.clone());

        let Some(body) = extract_body(exec) else {
            tracing::warn!(test = %joined, "unsupported test function, emitting placeholder");
            self.report.unsupported.push(joined);
            return Some("a(\"\")".to_string());
        };
        let wrapper = if is_async_test(&body) { "a" } else { "f" };
        let body = if self.options.minify {
            minify::minify(&path, &body, |p, wrapped, failure| {
                self.report.add_minify_error(p, wrapped, failure)
            })
        } else {
            body
        };
        Some(format!("{}(\"{}\")", wrapper, js_escape(&body)))
    }

    /// Render `{ key: value, ... }` closing at `depth`; `None` when empty.
    fn emit_object(&self, entries: Vec<(String, String)>, depth: usize) -> Option<String> {
        if entries.is_empty() {
            return None;
        }
        let inner = INDENT.repeat(depth + 1);
        let mut used = FxHashSet::default();
        let lines: Vec<String> = entries
            .into_iter()
            .map(|(label, value)| format!("{}{}: {}", inner, self.object_key(&label, &mut used), value))
            .collect();
        Some(format!("{{\n{}\n{}}}", lines.join(",\n"), INDENT.repeat(depth)))
    }

    /// Key for `label`, unique among the keys already in `used`.
    fn object_key(&self, label: &str, used: &mut FxHashSet<String>) -> String {
        let style = match self.options.key_style {
            KeyStyle::Identifier if to_identifier(label).is_err() => {
                tracing::warn!(label, "label has no identifier characters, quoting it");
                KeyStyle::Quoted
            }
            style => style,
        };
        let reserved = match style {
            KeyStyle::Identifier => to_identifier(label)
                .map(|key| key.starts_with(RESERVED_PREFIX))
                .unwrap_or(false),
            KeyStyle::Quoted => label.starts_with(RESERVED_PREFIX),
        };
        if reserved {
            tracing::warn!(label, "label starts with the reserved '__' prefix, renaming key");
        }
        let render = |suffix: Option<usize>| -> Result<String> {
            Ok(match (style, suffix) {
                (KeyStyle::Identifier, None) => unreserved(to_identifier(label)?),
                (KeyStyle::Identifier, Some(n)) => {
                    format!("{}_{}", unreserved(to_identifier(label)?), n)
                }
                (KeyStyle::Quoted, None) => {
                    format!("\"{}\"", js_escape(&unreserved(label.to_string())))
                }
                (KeyStyle::Quoted, Some(n)) => {
                    format!("\"{} ({})\"", js_escape(&unreserved(label.to_string())), n)
                }
            })
        };
        let mut key = render(None).unwrap_or_default();
        let mut n = 2;
        while used.contains(&key) {
            key = render(Some(n)).unwrap_or_default();
            n += 1;
        }
        if n > 2 {
            tracing::warn!(label, key = %key, "duplicate key renamed");
        }
        used.insert(key.clone());
        key
    }
}

/// Collapse leading underscores of a key that would read as reserved
/// metadata (`__`) to a single `_`.
fn unreserved(key: String) -> String {
    if key.starts_with(RESERVED_PREFIX) {
        format!("_{}", key.trim_start_matches('_'))
    } else {
        key
    }
}

/// Generate the module text for `suite`.
pub fn generate(suite: &TestSuite, options: &GenerateOptions) -> (GenerationReport, String) {
    Generator::new(options).generate(suite)
}

/// Generate the module for `suite` and write it to `path`.
///
/// A write failure is logged with the target file; the report is returned
/// either way.
pub fn write_checks(
    path: impl AsRef<Path>,
    suite: &TestSuite,
    options: &GenerateOptions,
) -> GenerationReport {
    let path = path.as_ref();
    let (report, text) = generate(suite, options);
    match std::fs::write(path, text) {
        Ok(()) => tracing::info!(
            file = %path.display(),
            included = report.included.len(),
            excluded = report.excluded.len(),
            "wrote checks"
        ),
        Err(e) => tracing::error!("Unable to generate '{}' ({})", path.display(), e),
    }
    report
}
