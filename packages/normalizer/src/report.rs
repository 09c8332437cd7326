use serde::{Deserialize, Serialize};

/// One rewrite recorded by a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub original: String,
    pub replacement: String,
    pub reason: String,
}

impl Violation {
    pub fn new(
        original: impl Into<String>,
        replacement: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
            reason: reason.into(),
        }
    }
}

/// Everything one pass rewrote in one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    pub pass: String,
    pub violations: Vec<Violation>,
}

impl PassReport {
    pub fn new(pass: impl Into<String>) -> Self {
        Self {
            pass: pass.into(),
            violations: Vec::new(),
        }
    }
}

/// Pipeline summary for one file. Passes that rewrote nothing are not
/// listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationReport {
    pub passes: Vec<PassReport>,
    pub had_changes: bool,
}

impl NormalizationReport {
    pub fn total_violations(&self) -> usize {
        self.passes.iter().map(|p| p.violations.len()).sum()
    }

    /// Violations recorded by a named pass, if it ran and rewrote
    /// anything
    pub fn pass(&self, name: &str) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.pass == name)
    }
}

/// Pipeline output: the (possibly rewritten) code plus the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCode {
    pub code: String,
    pub report: NormalizationReport,
}
