//! Intent dispatch.
//!
//! Every intent runs through the same shape: parse the file, resolve a
//! target, mutate the smallest byte range that expresses the intent,
//! then reparse to prove the file still parses. Anchored intents try
//! the location first and fall back to pattern matching only where the
//! intent kind allows it.

use crate::classes::{
    diff_classes, find_pattern, pattern_at, rewrite_classes, ClassMatchOptions,
};
use crate::errors::{EditError, PatternClass};
use crate::intent::{AppliedEdit, EditIntent, MatchStage};
use crate::structural;
use graft_parser::{locate, parse_with_path, Element, LocateError, Node, SourceLocation, Tree};

/// Apply one intent to a source file
pub fn apply_edit_intent(
    source: &str,
    file: &str,
    intent: &EditIntent,
    options: &ClassMatchOptions,
) -> Result<AppliedEdit, EditError> {
    let tree = parse_with_path(source, file)?;

    match intent {
        EditIntent::UpdateStyleClasses {
            selector,
            original_classes,
            new_classes,
            location,
        } => {
            let anchored = location
                .as_ref()
                .and_then(|loc| locate(&tree, source, loc).ok())
                .and_then(|node| node.as_element())
                .and_then(|el| pattern_at(el, original_classes, options));

            let (pattern, stage) = match anchored {
                Some(pattern) => (pattern, MatchStage::Ast),
                None => match find_pattern(&tree, selector, options) {
                    Some(pattern) => (pattern, MatchStage::Pattern),
                    None => return Err(EditError::pattern_not_found(PatternClass::ReadOnly)),
                },
            };

            let diff = diff_classes(original_classes, new_classes);
            if diff.is_noop() {
                return Ok(AppliedEdit {
                    file: file.to_string(),
                    new_text: source.to_string(),
                    stage,
                });
            }
            let new_text = rewrite_classes(source, &pattern, &diff)?;
            finish(file, new_text, stage)
        }

        EditIntent::UpdateText {
            original_text,
            new_text,
            context_classes,
            location,
        } => {
            if let Some(loc) = location {
                if let Ok(node) = locate(&tree, source, loc) {
                    match structural::update_text_at(source, node, original_text, new_text) {
                        Ok(text) => return finish(file, text, MatchStage::Ast),
                        // the anchor resolved to something else; let the
                        // pattern stage look for the text
                        Err(EditError::NotFound(_)) => {}
                        Err(err) => return Err(err),
                    }
                }
            }
            let text = structural::update_text_by_pattern(
                source,
                &tree,
                original_text,
                new_text,
                context_classes.as_deref(),
            )?;
            finish(file, text, MatchStage::Pattern)
        }

        EditIntent::DeleteNode { location } => {
            let node = locate_node(&tree, source, location)?;
            finish(file, structural::delete_node(source, node)?, MatchStage::Ast)
        }

        EditIntent::InsertChild {
            location,
            code,
            position,
        } => {
            let el = locate_element(&tree, source, location)?;
            finish(
                file,
                structural::insert_child(source, el, code, *position)?,
                MatchStage::Ast,
            )
        }

        EditIntent::UpdateAttribute {
            location,
            name,
            value,
        } => {
            let el = locate_element(&tree, source, location)?;
            finish(
                file,
                structural::update_attribute(source, el, name, value)?,
                MatchStage::Ast,
            )
        }

        EditIntent::RemoveAttribute { location, name } => {
            let el = locate_element(&tree, source, location)?;
            finish(
                file,
                structural::remove_attribute(source, el, name)?,
                MatchStage::Ast,
            )
        }
    }
}

/// Apply intents in order against the same file. The reported stage is
/// the weakest one any intent needed.
pub fn apply_edit_intents(
    source: &str,
    file: &str,
    intents: &[EditIntent],
    options: &ClassMatchOptions,
) -> Result<AppliedEdit, EditError> {
    let mut text = source.to_string();
    let mut stage = MatchStage::Ast;
    for intent in intents {
        let applied = apply_edit_intent(&text, file, intent, options)?;
        if applied.stage == MatchStage::Pattern {
            stage = MatchStage::Pattern;
        }
        text = applied.new_text;
    }
    Ok(AppliedEdit {
        file: file.to_string(),
        new_text: text,
        stage,
    })
}

fn locate_node<'t>(
    tree: &'t Tree,
    source: &str,
    location: &SourceLocation,
) -> Result<&'t Node, EditError> {
    locate(tree, source, location).map_err(|err| match err {
        LocateError::Stale { line, column } => EditError::StaleLocation {
            file: location.file.clone(),
            line,
            column,
        },
    })
}

fn locate_element<'t>(
    tree: &'t Tree,
    source: &str,
    location: &SourceLocation,
) -> Result<&'t Element, EditError> {
    locate_node(tree, source, location)?
        .as_element()
        .ok_or_else(|| EditError::unsafe_edit("target is not an element"))
}

fn finish(file: &str, new_text: String, stage: MatchStage) -> Result<AppliedEdit, EditError> {
    parse_with_path(&new_text, file).map_err(EditError::Verify)?;
    Ok(AppliedEdit {
        file: file.to_string(),
        new_text,
        stage,
    })
}
