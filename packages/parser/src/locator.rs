//! Resolve a line/column anchor to the markup node that starts there.
//!
//! Anchors come from outside the engine (an inspector, a previous parse)
//! and may be stale after the file changes. Staleness is a recoverable
//! condition the caller handles, never a panic.

use crate::ast::{Node, Tree};
use crate::line_index::LineIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Durable anchor into a source file. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocateError {
    #[error("No markup node starts at {line}:{column}")]
    Stale { line: u32, column: u32 },
}

/// Find the node a location anchors. The anchor must sit at the node's
/// first byte, or anywhere on an element's tag name. Ties go to the
/// innermost node.
pub fn locate<'t>(
    tree: &'t Tree,
    source: &str,
    location: &SourceLocation,
) -> Result<&'t Node, LocateError> {
    let stale = LocateError::Stale {
        line: location.line,
        column: location.column,
    };
    let index = LineIndex::new(source);
    let offset = match index.offset(source, location.line, location.column) {
        Some(offset) => offset,
        None => return Err(stale),
    };
    find_in(&tree.roots, offset).ok_or(stale)
}

fn find_in(nodes: &[Node], offset: usize) -> Option<&Node> {
    for node in nodes {
        let span = node.span();
        if offset < span.start || offset >= span.end {
            continue;
        }
        if let Some(children) = node.children() {
            if let Some(inner) = find_in(children, offset) {
                return Some(inner);
            }
        }
        if node_matches(node, offset) {
            return Some(node);
        }
    }
    None
}

fn node_matches(node: &Node, offset: usize) -> bool {
    if node.span().start == offset {
        return true;
    }
    match node {
        Node::Element(el) => el.name_span.contains(offset),
        _ => false,
    }
}
