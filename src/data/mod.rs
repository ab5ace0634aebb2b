//! Test definitions
//!
//! Definition files are JSON objects mapping a bucket name (`es5`, `es6`,
//! `es7`, ...) to a list of definitions:
//!
//! ```json
//! {
//!   "es6": [
//!     {
//!       "name": "const",
//!       "category": "bindings",
//!       "subtests": [
//!         { "name": "basic support", "exec": "function () { const foo = 123; return foo === 123; }" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Every definition is either a leaf (`exec` holds the source text of a
//! callable) or a group (`subtests`). Loading validates this once and turns
//! the raw definitions into [`TestNode`] values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Raw definitions
// ---------------------------------------------------------------------------

/// A definition as stored in a data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Display name, also the path segment for this node
    pub name: String,
    /// Source text of the test callable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,
    /// Category used to partition the direct children of a bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Child definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtests: Option<Vec<TestDefinition>>,
}

impl TestDefinition {
    /// Create a leaf definition.
    pub fn leaf(name: impl Into<String>, exec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exec: Some(exec.into()),
            ..Default::default()
        }
    }

    /// Create a group definition.
    pub fn group(name: impl Into<String>, subtests: Vec<TestDefinition>) -> Self {
        Self {
            name: name.into(),
            subtests: Some(subtests),
            ..Default::default()
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Validated tree
// ---------------------------------------------------------------------------

/// A validated node of the test tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestNode {
    /// A runnable test.
    Leaf {
        /// Display name, one path segment
        name: String,
        /// Feature category, used to partition root groups
        category: Option<String>,
        /// Source of the test callable
        exec: String,
    },
    /// A named collection of tests.
    Group {
        /// Display name, one path segment
        name: String,
        /// Feature category, used to partition root groups
        category: Option<String>,
        /// Subtests in definition order
        children: Vec<TestNode>,
    },
}

impl TestNode {
    /// Validate a definition and everything below it.
    ///
    /// `parent` is the path of the enclosing group, used in error messages.
    pub fn from_definition(def: TestDefinition, parent: &[String]) -> Result<Self> {
        let mut path = parent.to_vec();
        path.push(def.name.clone());
        if def.name.is_empty() {
            return Err(Error::validation(&path, "definition has an empty name"));
        }
        match (def.exec, def.subtests) {
            (Some(_), Some(_)) => Err(Error::validation(
                &path,
                "definition declares both `exec` and `subtests`",
            )),
            (None, None) => Err(Error::validation(
                &path,
                "definition declares neither `exec` nor `subtests`",
            )),
            (Some(exec), None) => Ok(TestNode::Leaf {
                name: def.name,
                category: def.category,
                exec,
            }),
            (None, Some(subtests)) => {
                let children = subtests
                    .into_iter()
                    .map(|sub| TestNode::from_definition(sub, &path))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TestNode::Group {
                    name: def.name,
                    category: def.category,
                    children,
                })
            }
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            TestNode::Leaf { name, .. } | TestNode::Group { name, .. } => name,
        }
    }

    /// Node category, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            TestNode::Leaf { category, .. } | TestNode::Group { category, .. } => {
                category.as_deref()
            }
        }
    }

    /// Number of leaves at or below this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            TestNode::Leaf { .. } => 1,
            TestNode::Group { children, .. } => children.iter().map(TestNode::leaf_count).sum(),
        }
    }
}

// ---------------------------------------------------------------------------
// TestSuite
// ---------------------------------------------------------------------------

/// The full set of root nodes handed to the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSuite {
    /// Root nodes, in output order
    pub roots: Vec<TestNode>,
}

impl TestSuite {
    /// Build a suite from explicit root definitions.
    pub fn from_roots(defs: Vec<TestDefinition>) -> Result<Self> {
        let roots = defs
            .into_iter()
            .map(|def| TestNode::from_definition(def, &[]))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { roots })
    }

    /// Build a suite where each bucket becomes a root group.
    pub fn from_buckets(buckets: BTreeMap<String, Vec<TestDefinition>>) -> Result<Self> {
        let defs = buckets
            .into_iter()
            .map(|(name, tests)| TestDefinition::group(name, tests))
            .collect();
        Self::from_roots(defs)
    }

    /// Parse a JSON definition document.
    pub fn from_json(text: &str) -> Result<Self> {
        let buckets: BTreeMap<String, Vec<TestDefinition>> = serde_json::from_str(text)?;
        Self::from_buckets(buckets)
    }

    /// Read and parse a JSON definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let suite = Self::from_json(&text)?;
        tracing::debug!(
            file = %path.as_ref().display(),
            roots = suite.roots.len(),
            tests = suite.leaf_count(),
            "loaded test definitions"
        );
        Ok(suite)
    }

    /// Number of leaves in the suite.
    pub fn leaf_count(&self) -> usize {
        self.roots.iter().map(TestNode::leaf_count).sum()
    }
}
