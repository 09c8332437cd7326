//! Class-list matching and minimal rewriting.
//!
//! A class list is an unordered set of whitespace-separated tokens.
//! Matching never depends on token order; rewriting touches the fewest
//! bytes that express the change:
//!
//! - a 1-for-1 swap replaces the old token's bytes in place
//! - anything else removes tokens where they sit and appends additions
//!   to the end of the literal (the first direct literal argument, for
//!   class-join calls)

use crate::errors::{EditError, PatternClass};
use graft_common::EngineOptions;
use graft_parser::class_join::{scan_class_join, ClassJoinCall};
use graft_parser::{AttrValue, Element, Tree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Knobs for pattern matching against class-join calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassMatchOptions {
    /// How many selector tokens may be unexplained by a call's literal
    /// arguments before the call stops matching. Unexplained tokens are
    /// assumed to come from dynamic arguments.
    pub max_unexplained_tokens: usize,
    /// Function names treated as class-join calls
    pub class_join_callees: Vec<String>,
}

impl Default for ClassMatchOptions {
    fn default() -> Self {
        Self {
            max_unexplained_tokens: 3,
            class_join_callees: vec![
                "cn".to_string(),
                "clsx".to_string(),
                "classNames".to_string(),
                "cx".to_string(),
            ],
        }
    }
}

impl From<&EngineOptions> for ClassMatchOptions {
    fn from(options: &EngineOptions) -> Self {
        Self {
            max_unexplained_tokens: options.max_unexplained_tokens,
            class_join_callees: options.class_join_callees.clone(),
        }
    }
}

/// Split a class value into tokens
pub fn parse_classes(value: &str) -> Vec<&str> {
    value.split_whitespace().collect()
}

/// Collapse whitespace and drop duplicate tokens, keeping first
/// occurrence order
pub fn normalize_classes(value: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for tok in value.split_whitespace() {
        if !out.contains(&tok) {
            out.push(tok);
        }
    }
    out.join(" ")
}

/// Token-set equality, ignoring order and duplicates
pub fn same_class_set(a: &str, b: &str) -> bool {
    let a: BTreeSet<&str> = a.split_whitespace().collect();
    let b: BTreeSet<&str> = b.split_whitespace().collect();
    a == b
}

/// Set difference between two class lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDiff {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

pub fn diff_classes(original: &str, new: &str) -> ClassDiff {
    let original_tokens = parse_classes(original);
    let new_tokens = parse_classes(new);
    let original_set: BTreeSet<&str> = original_tokens.iter().copied().collect();
    let new_set: BTreeSet<&str> = new_tokens.iter().copied().collect();

    let mut removed = Vec::new();
    for tok in &original_tokens {
        if !new_set.contains(tok) && !removed.iter().any(|r: &String| r == tok) {
            removed.push((*tok).to_string());
        }
    }
    let mut added = Vec::new();
    for tok in &new_tokens {
        if !original_set.contains(tok) && !added.iter().any(|a: &String| a == tok) {
            added.push((*tok).to_string());
        }
    }
    ClassDiff { removed, added }
}

impl ClassDiff {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    pub fn is_single_swap(&self) -> bool {
        self.removed.len() == 1 && self.added.len() == 1
    }
}

/// A rewritable site for a class-list edit
#[derive(Debug, Clone, PartialEq)]
pub enum ClassPattern {
    /// Quoted class attribute; the range covers the bytes between the
    /// quotes
    LiteralAttribute { value_start: usize, value_end: usize },
    /// Class-join call with literal segments
    ClassJoin(ClassJoinCall),
}

/// Find the first site whose classes match the selector.
///
/// Literal attributes are checked first and must equal the selector's
/// token set exactly. Class-join calls match when their literal tokens
/// explain all but at most `max_unexplained_tokens` of the selector.
pub fn find_pattern(
    tree: &Tree,
    selector: &str,
    options: &ClassMatchOptions,
) -> Option<ClassPattern> {
    let mut literal: Option<ClassPattern> = None;
    tree.visit_elements(&mut |el| {
        if literal.is_some() {
            return;
        }
        if let Some(attr) = el.class_attribute() {
            if let Some((value, span)) = attr.value.as_ref().and_then(|v| v.as_literal()) {
                if same_class_set(value, selector) {
                    literal = Some(ClassPattern::LiteralAttribute {
                        value_start: span.start,
                        value_end: span.end,
                    });
                }
            }
        }
    });
    if literal.is_some() {
        return literal;
    }

    let selector_tokens: Vec<&str> = {
        let mut toks = parse_classes(selector);
        toks.dedup();
        toks
    };
    if selector_tokens.is_empty() {
        return None;
    }

    let mut found: Option<ClassPattern> = None;
    tree.visit_elements(&mut |el| {
        if found.is_some() {
            return;
        }
        let Some(attr) = el.class_attribute() else {
            return;
        };
        let Some(AttrValue::Expression {
            text, inner_span, ..
        }) = &attr.value
        else {
            return;
        };
        let Some(call) = scan_class_join(text, inner_span.start, &options.class_join_callees)
        else {
            return;
        };
        if join_explains(&call, &selector_tokens, options.max_unexplained_tokens) {
            found = Some(ClassPattern::ClassJoin(call));
        }
    });
    found
}

/// Match one element's class attribute against a class set. Used by the
/// anchored stage, where the element is already known.
pub fn pattern_at(
    el: &Element,
    classes: &str,
    options: &ClassMatchOptions,
) -> Option<ClassPattern> {
    let attr = el.class_attribute()?;
    match attr.value.as_ref()? {
        value @ AttrValue::Literal { .. } => {
            let (text, span) = value.as_literal()?;
            if same_class_set(text, classes) {
                Some(ClassPattern::LiteralAttribute {
                    value_start: span.start,
                    value_end: span.end,
                })
            } else {
                None
            }
        }
        AttrValue::Expression {
            text, inner_span, ..
        } => {
            let call = scan_class_join(text, inner_span.start, &options.class_join_callees)?;
            let mut tokens = parse_classes(classes);
            tokens.dedup();
            if !tokens.is_empty()
                && join_explains(&call, &tokens, options.max_unexplained_tokens)
            {
                Some(ClassPattern::ClassJoin(call))
            } else {
                None
            }
        }
    }
}

fn join_explains(call: &ClassJoinCall, selector_tokens: &[&str], max_unexplained: usize) -> bool {
    let literal_tokens: BTreeSet<&str> = call
        .segments
        .iter()
        .flat_map(|s| s.text.split_whitespace())
        .collect();
    let explained = selector_tokens
        .iter()
        .filter(|t| literal_tokens.contains(**t))
        .count();
    // a match with nothing explained would accept any call
    explained > 0 && selector_tokens.len() - explained <= max_unexplained
}

/// Apply a class diff at a matched site, touching the fewest bytes that
/// express it
pub fn rewrite_classes(
    source: &str,
    pattern: &ClassPattern,
    diff: &ClassDiff,
) -> Result<String, EditError> {
    match pattern {
        ClassPattern::LiteralAttribute {
            value_start,
            value_end,
        } => Ok(rewrite_literal(source, *value_start, *value_end, diff)),
        ClassPattern::ClassJoin(call) => rewrite_join(source, call, diff),
    }
}

fn rewrite_literal(source: &str, start: usize, end: usize, diff: &ClassDiff) -> String {
    let value = &source[start..end];

    if diff.is_single_swap() {
        if let Some((tok_start, tok_end)) = token_range(value, &diff.removed[0]) {
            return splice(source, start + tok_start, start + tok_end, &diff.added[0]);
        }
    }

    let mut tokens: Vec<&str> = Vec::new();
    for tok in value.split_whitespace() {
        if !diff.removed.iter().any(|r| r == tok) && !tokens.contains(&tok) {
            tokens.push(tok);
        }
    }
    for add in &diff.added {
        if !tokens.iter().any(|t| t == add) {
            tokens.push(add);
        }
    }
    splice(source, start, end, &tokens.join(" "))
}

fn rewrite_join(
    source: &str,
    call: &ClassJoinCall,
    diff: &ClassDiff,
) -> Result<String, EditError> {
    // a 1-for-1 swap is safe in any literal segment, conditional ones
    // included: the token means the same thing wherever it renders
    if diff.is_single_swap() {
        for seg in &call.segments {
            if let Some((s, e)) = token_range(&seg.text, &diff.removed[0]) {
                return Ok(splice(source, seg.start + s, seg.start + e, &diff.added[0]));
            }
        }
        return Err(EditError::pattern_not_found(PatternClass::LimitedEdit));
    }

    let mut seg_tokens: Vec<Vec<String>> = call
        .segments
        .iter()
        .map(|s| s.text.split_whitespace().map(str::to_string).collect())
        .collect();
    let mut changed = vec![false; call.segments.len()];

    for removed in &diff.removed {
        let mut hit = false;
        for (i, seg) in call.segments.iter().enumerate() {
            if seg_tokens[i].iter().any(|t| t == removed) {
                if !seg.top_level {
                    // the token only renders under a condition; dropping
                    // it from there is not what the edit asked for
                    return Err(EditError::pattern_not_found(PatternClass::LimitedEdit));
                }
                seg_tokens[i].retain(|t| t != removed);
                changed[i] = true;
                hit = true;
            }
        }
        if !hit {
            return Err(EditError::pattern_not_found(PatternClass::LimitedEdit));
        }
    }

    if !diff.added.is_empty() {
        let Some(first_top) = call.segments.iter().position(|s| s.top_level) else {
            return Err(EditError::pattern_not_found(PatternClass::LimitedEdit));
        };
        for add in &diff.added {
            if !seg_tokens.iter().flatten().any(|t| t == add) {
                seg_tokens[first_top].push(add.clone());
                changed[first_top] = true;
            }
        }
    }

    let mut edits: Vec<(usize, usize, String)> = call
        .segments
        .iter()
        .enumerate()
        .filter(|(i, _)| changed[*i])
        .map(|(i, seg)| (seg.start, seg.end, seg_tokens[i].join(" ")))
        .collect();
    edits.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = source.to_string();
    for (s, e, replacement) in edits {
        out.replace_range(s..e, &replacement);
    }
    Ok(out)
}

/// Byte range of a token within a class value
fn token_range(value: &str, token: &str) -> Option<(usize, usize)> {
    for (start, tok) in tokens_with_pos(value) {
        if tok == token {
            return Some((start, start + tok.len()));
        }
    }
    None
}

fn tokens_with_pos(value: &str) -> Vec<(usize, &str)> {
    let b = value.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < b.len() {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        let start = i;
        while i < b.len() && !b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i > start {
            out.push((start, &value[start..i]));
        }
    }
    out
}

pub(crate) fn splice(source: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() - (end - start) + replacement.len());
    out.push_str(&source[..start]);
    out.push_str(replacement);
    out.push_str(&source[end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_parser::parse;

    #[test]
    fn normalize_dedups_and_collapses() {
        assert_eq!(normalize_classes("  flex  gap-2 flex "), "flex gap-2");
        assert!(same_class_set("gap-2 flex", "flex gap-2 flex"));
        assert!(!same_class_set("flex", "flex gap-2"));
    }

    #[test]
    fn diff_is_order_insensitive() {
        let diff = diff_classes("flex gap-2 p-4", "p-4 gap-4 flex");
        assert_eq!(diff.removed, vec!["gap-2"]);
        assert_eq!(diff.added, vec!["gap-4"]);
        assert!(diff.is_single_swap());
        assert!(diff_classes("a b", "b a").is_noop());
    }

    #[test]
    fn single_swap_touches_only_the_token() {
        let source = r#"const v = <div className="flex gap-2" id="x" />;"#;
        let tree = parse(source).unwrap();
        let pattern = find_pattern(&tree, "gap-2 flex", &ClassMatchOptions::default()).unwrap();
        let diff = diff_classes("flex gap-2", "flex gap-4");
        let out = rewrite_classes(source, &pattern, &diff).unwrap();
        assert_eq!(out, source.replace("gap-2", "gap-4"));
    }

    #[test]
    fn multi_token_edit_rebuilds_the_literal() {
        let source = r#"const v = <div className="flex gap-2 p-4" />;"#;
        let tree = parse(source).unwrap();
        let pattern = find_pattern(&tree, "flex gap-2 p-4", &ClassMatchOptions::default()).unwrap();
        let diff = diff_classes("flex gap-2 p-4", "flex items-center justify-between");
        let out = rewrite_classes(source, &pattern, &diff).unwrap();
        assert!(out.contains(r#"className="flex items-center justify-between""#));
    }

    #[test]
    fn join_call_matches_with_unexplained_tokens() {
        let source = r#"const v = <div className={cn("flex gap-2", active && "ring-2", dynamicCls)} />;"#;
        let tree = parse(source).unwrap();
        // "shadow" is unexplained but under the threshold
        let pattern = find_pattern(&tree, "flex gap-2 shadow", &ClassMatchOptions::default());
        assert!(matches!(pattern, Some(ClassPattern::ClassJoin(_))));

        // four unexplained tokens is past the default threshold
        let miss = find_pattern(&tree, "flex a b c d", &ClassMatchOptions::default());
        assert!(miss.is_none());
    }

    #[test]
    fn swap_reaches_into_conditional_literals() {
        let source = r#"const v = <div className={cn("base", active && "bg-blue-600")} />;"#;
        let tree = parse(source).unwrap();
        let pattern = find_pattern(&tree, "base bg-blue-600", &ClassMatchOptions::default()).unwrap();
        let diff = diff_classes("base bg-blue-600", "base bg-primary");
        let out = rewrite_classes(source, &pattern, &diff).unwrap();
        assert!(out.contains(r#"active && "bg-primary""#));
        assert!(out.contains(r#""base""#));
    }

    #[test]
    fn removal_from_conditional_literal_is_limited() {
        let source = r#"const v = <div className={cn("base", active && "ring-2 ring-offset-1")} />;"#;
        let tree = parse(source).unwrap();
        let pattern = find_pattern(&tree, "base ring-2", &ClassMatchOptions::default()).unwrap();
        let diff = diff_classes("base ring-2", "base shadow-sm p-2");
        let err = rewrite_classes(source, &pattern, &diff).unwrap_err();
        assert_eq!(
            err,
            EditError::PatternNotFound {
                classification: PatternClass::LimitedEdit
            }
        );
    }

    #[test]
    fn additions_land_in_first_direct_literal() {
        let source = r#"const v = <div className={cn("flex", extra, "p-2")} />;"#;
        let tree = parse(source).unwrap();
        let pattern = find_pattern(&tree, "flex p-2", &ClassMatchOptions::default()).unwrap();
        let diff = diff_classes("flex p-2", "flex p-2 gap-4 items-start");
        let out = rewrite_classes(source, &pattern, &diff).unwrap();
        assert!(out.contains(r#""flex gap-4 items-start""#));
        assert!(out.contains(r#""p-2""#));
    }

    #[test]
    fn literal_attribute_wins_over_join_calls() {
        let source = r#"
const a = <div className={cn("flex gap-2")} />;
const b = <div className="flex gap-2" />;
"#;
        let tree = parse(source).unwrap();
        let pattern = find_pattern(&tree, "flex gap-2", &ClassMatchOptions::default()).unwrap();
        assert!(matches!(pattern, ClassPattern::LiteralAttribute { .. }));
    }
}
