//! # Source Editor
//!
//! Applies [`EditIntent`]s to component source files while keeping
//! everything outside the edited range byte-identical.
//!
//! ## Resolution stages
//!
//! Each intent resolves its target in up to two stages:
//!
//! 1. **AST-exact**: the intent's location anchor is resolved against a
//!    fresh parse and the edit uses exact node spans
//! 2. **Pattern**: when the anchor is missing or stale, intents that
//!    allow it fall back to matching by content (class set for style
//!    edits, text run for text edits)
//!
//! Structural intents (delete, insert, attributes) never use stage 2:
//! a stale anchor rejects the edit instead of guessing.
//!
//! ## Verification
//!
//! Every successful edit reparses the produced text before returning
//! it. An edit that would leave the file unparseable is reported as
//! [`EditError::Verify`] and the original text stands.

pub mod apply;
pub mod classes;
pub mod errors;
pub mod intent;
mod structural;

pub use apply::{apply_edit_intent, apply_edit_intents};
pub use classes::{
    diff_classes, find_pattern, normalize_classes, parse_classes, pattern_at, rewrite_classes,
    same_class_set, ClassDiff, ClassMatchOptions, ClassPattern,
};
pub use errors::{EditError, PatternClass};
pub use intent::{AppliedEdit, AttributeValue, EditIntent, InsertPosition, MatchStage};
