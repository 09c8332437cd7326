//! # Edit Intents
//!
//! Structured edit operations on component source files.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each intent says what the user meant, not
//!    which bytes to change
//! 2. **Closed set**: A new intent kind is a new variant; every dispatch
//!    site is forced to handle it
//! 3. **Anchored, with fallback**: Intents that can survive source drift
//!    carry an optional location and fall back to pattern matching
//! 4. **Typed values**: Attribute writes carry typed values, never
//!    preformatted source fragments

use graft_parser::SourceLocation;
use serde::{Deserialize, Serialize};

/// Semantic edit operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditIntent {
    /// Replace an element's class list. `selector` is the class set that
    /// identifies the element when the location is missing or stale.
    #[serde(rename_all = "camelCase")]
    UpdateStyleClasses {
        selector: String,
        original_classes: String,
        new_classes: String,
        location: Option<SourceLocation>,
    },

    /// Replace a text run. The optional class context narrows the
    /// pattern fallback to text under an element with those classes.
    #[serde(rename_all = "camelCase")]
    UpdateText {
        original_text: String,
        new_text: String,
        context_classes: Option<String>,
        location: Option<SourceLocation>,
    },

    /// Remove a node and its contents. AST-exact only.
    #[serde(rename_all = "camelCase")]
    DeleteNode { location: SourceLocation },

    /// Insert markup as a new child of an element. AST-exact only.
    #[serde(rename_all = "camelCase")]
    InsertChild {
        location: SourceLocation,
        code: String,
        position: InsertPosition,
    },

    /// Set or add an attribute with a typed value. AST-exact only.
    #[serde(rename_all = "camelCase")]
    UpdateAttribute {
        location: SourceLocation,
        name: String,
        value: AttributeValue,
    },

    /// Remove an attribute. AST-exact only.
    #[serde(rename_all = "camelCase")]
    RemoveAttribute {
        location: SourceLocation,
        name: String,
    },
}

/// Where an inserted child lands among the element's significant
/// children (whitespace-only text runs don't count)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InsertPosition {
    Append,
    Prepend,
    At { index: usize },
}

/// Typed attribute value.
///
/// `Bool(true)` writes a bare attribute, `Bool(false)` removes it.
/// `Keyword` is validated against the attribute's enumerated values
/// before being written as a quoted string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Str(String),
    Bool(bool),
    Keyword(String),
}

/// Stage that produced a successful edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStage {
    /// The location anchor resolved and the edit used exact spans
    Ast,
    /// The anchor was missing or stale and a pattern match was used
    Pattern,
}

/// Outcome of a successful edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedEdit {
    pub file: String,
    pub new_text: String,
    pub stage: MatchStage,
}

impl AppliedEdit {
    /// True when the edit actually changed the file
    pub fn changed_from(&self, original: &str) -> bool {
        self.new_text != original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_round_trip_through_json() {
        let intent = EditIntent::UpdateStyleClasses {
            selector: "flex gap-2".to_string(),
            original_classes: "flex gap-2".to_string(),
            new_classes: "flex gap-4".to_string(),
            location: Some(SourceLocation::new("src/App.tsx", 12, 5)),
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"type\":\"updateStyleClasses\""));
        assert!(json.contains("\"originalClasses\""));
        let back: EditIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn attribute_values_tag_their_kind() {
        let value = AttributeValue::Keyword("submit".to_string());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "{\"type\":\"keyword\",\"value\":\"submit\"}");

        let bare: AttributeValue = serde_json::from_str("{\"type\":\"bool\",\"value\":true}").unwrap();
        assert_eq!(bare, AttributeValue::Bool(true));
    }
}
