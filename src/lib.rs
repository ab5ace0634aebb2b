//! escheck: ECMAScript feature-compatibility checks
//!
//! escheck turns a tree of feature tests (nested by edition and category, e.g.
//! `es6/bindings/const/basic support`) into a standalone JavaScript module that
//! can run those checks in any host, then runs that module in a host and
//! prints a colored pass/fail report.
//!
//! # Quick Start
//!
//! ```no_run
//! use escheck::codegen::{self, GenerateOptions};
//! use escheck::data::TestSuite;
//! use escheck::host::{HostOptions, NodeHost, ScriptHost};
//! use escheck::report::{ReportOptions, Reporter};
//!
//! fn main() -> escheck::Result<()> {
//!     let suite = TestSuite::load("tests.json")?;
//!     let generation = codegen::write_checks("escheck.js", &suite, &GenerateOptions::default());
//!     let run = NodeHost::default().run_module("escheck.js".as_ref(), &HostOptions::default())?;
//!     Reporter::new(ReportOptions::default(), std::io::stdout()).render(&run, &generation.excluded)?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! The pipeline flows: definitions → [`data`] → [`codegen`] (using [`filter`])
//! → generated file → [`host`] → [`report`].
//!
//! | Module | Role |
//! |--------|------|
//! | [`data`] | Definition files and the validated test tree |
//! | [`filter`] | Include/exclude path filters and presets |
//! | [`codegen`] | Body extraction, minification, module generation |
//! | [`host`] | Running generated modules in a JavaScript host |
//! | [`report`] | Result trees, summaries, console report |

pub mod codegen;
pub mod data;
pub mod filter;
pub mod host;
pub mod report;

mod error;

pub use error::{Error, Result, SourceLocation};

/// escheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
