//! Shared test helpers for integration tests

use escheck::codegen::{self, GenerateOptions};
use escheck::data::{TestDefinition, TestSuite};
use escheck::host::{HostOptions, NodeHost, ScriptHost};
use escheck::report::RunReport;
use std::path::{Path, PathBuf};

/// Group `g` with a passing `t1` and a failing `t2`
pub fn sample_suite() -> TestSuite {
    TestSuite::from_roots(vec![TestDefinition::group(
        "g",
        vec![
            TestDefinition::leaf("t1", "function () { return true; }"),
            TestDefinition::leaf("t2", "function () { return false; }"),
        ],
    )])
    .unwrap()
}

/// The definition file shipped in `data/`
pub fn shipped_data() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("tests.json")
}

/// A Node.js host, or `None` when `node` is not installed
pub fn node_host() -> Option<NodeHost> {
    let host = NodeHost::default();
    if host.is_available() {
        Some(host)
    } else {
        eprintln!("node not found, skipping");
        None
    }
}

/// Generate `suite` into `dir` and run it with `host`
#[allow(dead_code)]
pub fn generate_and_run(
    host: &NodeHost,
    dir: &Path,
    suite: &TestSuite,
    options: &GenerateOptions,
) -> escheck::Result<RunReport> {
    let file = dir.join("escheck.js");
    codegen::write_checks(&file, suite, options);
    host.run_module(&file, &HostOptions { sources: true })
}
