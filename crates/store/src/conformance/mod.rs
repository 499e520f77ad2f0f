//! Conformance suite for `PersistencePort` implementations.
//!
//! Any port can be checked by handing [`run_conformance_suite`] a factory
//! that yields a fresh, empty port per test. The suite covers:
//!
//! - **Port semantics**: get/set/remove/overwrite, key independence
//! - **Store round-trips**: a store writes its persisted subset and a new
//!   store hydrates from it; generated data and snapshots stay out
//!
//! ```ignore
//! use packgen_store::conformance::run_conformance_suite;
//! use packgen_store::MemoryPort;
//!
//! let report = run_conformance_suite(MemoryPort::new);
//! assert!(report.failed == 0, "{report}");
//! ```

mod port;
mod roundtrip;

use std::fmt;

use crate::persist::PersistencePort;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category ("port" or "roundtrip").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run every conformance test against ports built by `factory`.
pub fn run_conformance_suite<P, F>(factory: F) -> ConformanceReport
where
    P: PersistencePort + 'static,
    F: Fn() -> P,
{
    let mut results = Vec::new();

    results.extend(port::run_port_tests(&factory));
    results.extend(roundtrip::run_roundtrip_tests(&factory));

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

fn check(condition: bool, msg: impl FnOnce() -> String) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(msg())
    }
}
