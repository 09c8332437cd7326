use graft_parser::ParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a pattern match could not produce a safe edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternClass {
    /// A matching site exists but the needed change would touch dynamic
    /// code, so only part of the edit space is available
    LimitedEdit,
    /// Nothing matched at all
    ReadOnly,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Location {line}:{column} in {file} no longer resolves")]
    StaleLocation { file: String, line: u32, column: u32 },

    #[error("No safe match for the edit ({classification:?})")]
    PatternNotFound { classification: PatternClass },

    #[error("Target not found: {0}")]
    NotFound(String),

    #[error("Unsafe edit: {0}")]
    UnsafeEdit(String),

    #[error("Edit would leave the file unparseable: {0}")]
    Verify(ParseError),
}

impl EditError {
    pub fn pattern_not_found(classification: PatternClass) -> Self {
        Self::PatternNotFound { classification }
    }

    pub fn unsafe_edit(message: impl Into<String>) -> Self {
        Self::UnsafeEdit(message.into())
    }
}
