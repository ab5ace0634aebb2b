//! Script hosts
//!
//! A [`ScriptHost`] loads a generated check module into a JavaScript
//! environment, runs every check and hands back a [`RunReport`]. The shipped
//! host, [`NodeHost`], spawns an external `node` (or compatible) process with
//! an embedded driver script. The driver writes its results as one JSON
//! document to a file named by `ESCHECK_RESULT`, so whatever the checks print
//! on stdout never mixes with the results.

use crate::codegen::UNABLE_MSG;
use crate::error::{Error, Result};
use crate::report::{ResultNode, RunReport};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

/// Driver script evaluated by [`NodeHost`].
pub const DRIVER: &str = include_str!("driver.js");

/// Name of the result file inside the run's scratch directory.
const RESULT_FILE: &str = "result.json";

/// Options passed to a host for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOptions {
    /// Capture the source text of every check
    pub sources: bool,
}

/// Something that can execute a generated check module.
pub trait ScriptHost {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Load `module`, run all checks, and return the results.
    fn run_module(&self, module: &Path, options: &HostOptions) -> Result<RunReport> {
        tracing::debug!(host = %self.program, module = %module.display(), "running checks");
        let scratch = tempfile::Builder::new().prefix("escheck-").tempdir()?;
        let result_path = scratch.path().join(RESULT_FILE);
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(DRIVER)
            .env("ESCHECK_MODULE", module)
            .env("ESCHECK_RESULT", &result_path)
            .env("ESCHECK_SOURCES", if options.sources { "1" } else { "0" })
            .env("ESCHECK_UNABLE_MSG", UNABLE_MSG)
            .output()
            .map_err(|e| Error::host(format!("unable to start '{}': {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(host = %self.program, "check output:\n{}", stdout.trim_end());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(host = %self.program, "host stderr:\n{}", stderr.trim_end());
        }
        let payload = match std::fs::read_to_string(&result_path) {
            Ok(payload) => payload,
            Err(e) => {
                return Err(Error::host(format!(
                    "host produced no result ({}, {}): {}",
                    e,
                    output.status,
                    stderr.trim()
                )))
            }
        };
        parse_driver_output(&payload)
    }
}

// ---------------------------------------------------------------------------
// Driver output
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LoadError {
    message: String,
    #[serde(default)]
    stack: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriverOutput {
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    results: Option<Vec<ResultNode>>,
    #[serde(default)]
    load_error: Option<LoadError>,
}

/// Decode the driver's result document into a run report.
///
/// A module that failed to load is logged (message and stack) and returned
/// as [`Error::ModuleLoad`]. An empty document is [`Error::Host`].
pub fn parse_driver_output(payload: &str) -> Result<RunReport> {
    if payload.trim().is_empty() {
        return Err(Error::host("host wrote an empty result"));
    }
    let output: DriverOutput = serde_json::from_str(payload)?;

    if let Some(load_error) = output.load_error {
        tracing::error!(
            "unable to load checks: {}\n{}",
            load_error.message,
            load_error.stack
        );
        return Err(Error::ModuleLoad {
            message: load_error.message,
            stack: load_error.stack,
        });
    }
    Ok(RunReport {
        env: output.env,
        results: output.results.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Outcome, Summary};

    #[test]
    fn test_parse_group_results() {
        let payload = r#"{"env":{"node.version":"v20.1.0"},"results":[{"kind":"group","name":"g","children":[{"kind":"leaf","name":"t1","outcome":"pass"},{"kind":"leaf","name":"t2","outcome":"fail","detail":"false"}]}]}"#;
        let report = parse_driver_output(payload).unwrap();
        assert_eq!(report.env["node.version"], "v20.1.0");
        assert_eq!(report.summary(), Summary { success: 1, total: 2 });
    }

    #[test]
    fn test_parse_load_error() {
        let payload = r#"{"env":{},"loadError":{"message":"Unexpected token","stack":"SyntaxError: Unexpected token\n    at x.js:3"}}"#;
        match parse_driver_output(payload) {
            Err(Error::ModuleLoad { message, stack }) => {
                assert_eq!(message, "Unexpected token");
                assert!(stack.contains("x.js:3"));
            }
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_payload() {
        assert!(matches!(parse_driver_output("  \n"), Err(Error::Host(_))));
    }

    #[test]
    fn test_parse_truncated_payload() {
        let err = parse_driver_output(r#"{"env":{},"results":[{"kind":"leaf","na"#).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_parse_empty_results() {
        let report = parse_driver_output(r#"{"env":{},"results":[]}"#).unwrap();
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_parse_leaf_with_source() {
        let payload = r#"{"results":[{"kind":"leaf","name":"t","outcome":"strict","source":"function anonymous(global\n) {\n}"}]}"#;
        let report = parse_driver_output(payload).unwrap();
        match &report.results[0] {
            ResultNode::Leaf { outcome, source, .. } => {
                assert_eq!(*outcome, Outcome::Strict);
                assert!(source.as_deref().unwrap().starts_with("function anonymous"));
            }
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_host_error() {
        let host = NodeHost::new("escheck-no-such-host-program");
        assert!(!host.is_available());
        let err = host
            .run_module(Path::new("checks.js"), &HostOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Host(_)));
    }

    #[test]
    fn test_driver_writes_result_file() {
        assert!(DRIVER.contains("ESCHECK_RESULT"));
        assert!(DRIVER.contains("ESCHECK_MODULE"));
        assert!(!DRIVER.contains("fs.writeSync(1"));
    }
}
