use graft_editor::{
    apply_edit_intent, apply_edit_intents, AttributeValue, ClassMatchOptions, EditError,
    EditIntent, InsertPosition, MatchStage, PatternClass,
};
use graft_parser::SourceLocation;

const FILE: &str = "src/App.tsx";

const APP: &str = r#"import React from "react";
import { Button } from "./ui/button";

export default function App() {
  return (
    <div className="flex flex-col gap-2 p-4">
      <h1 className="text-3xl font-bold">Dashboard</h1>
      <p className="text-sm text-muted">Welcome back</p>
      <Button type="button" disabled>Save</Button>
    </div>
  );
}
"#;

fn opts() -> ClassMatchOptions {
    ClassMatchOptions::default()
}

fn loc(line: u32, column: u32) -> SourceLocation {
    SourceLocation::new(FILE, line, column)
}

#[test]
fn anchored_class_swap_is_minimal() {
    let intent = EditIntent::UpdateStyleClasses {
        selector: "flex flex-col gap-2 p-4".into(),
        original_classes: "flex flex-col gap-2 p-4".into(),
        new_classes: "flex flex-col gap-4 p-4".into(),
        location: Some(loc(6, 5)),
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert_eq!(applied.stage, MatchStage::Ast);
    assert_eq!(applied.new_text, APP.replace("gap-2", "gap-4"));
    assert!(applied.changed_from(APP));
}

#[test]
fn stale_anchor_falls_back_to_class_pattern() {
    let intent = EditIntent::UpdateStyleClasses {
        selector: "flex flex-col gap-2 p-4".into(),
        original_classes: "flex flex-col gap-2 p-4".into(),
        new_classes: "flex flex-col gap-4 p-4".into(),
        location: Some(loc(42, 1)),
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert_eq!(applied.stage, MatchStage::Pattern);
    assert_eq!(applied.new_text, APP.replace("gap-2", "gap-4"));
}

#[test]
fn missing_selector_is_read_only() {
    let intent = EditIntent::UpdateStyleClasses {
        selector: "no-such-class".into(),
        original_classes: "no-such-class".into(),
        new_classes: "other".into(),
        location: None,
    };
    let err = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap_err();
    assert_eq!(
        err,
        EditError::PatternNotFound {
            classification: PatternClass::ReadOnly
        }
    );
}

#[test]
fn noop_class_edit_returns_source_unchanged() {
    let intent = EditIntent::UpdateStyleClasses {
        selector: "flex flex-col gap-2 p-4".into(),
        original_classes: "flex flex-col gap-2 p-4".into(),
        new_classes: "p-4 gap-2 flex-col flex".into(),
        location: Some(loc(6, 5)),
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert_eq!(applied.new_text, APP);
    assert!(!applied.changed_from(APP));
}

#[test]
fn anchored_text_update() {
    let intent = EditIntent::UpdateText {
        original_text: "Dashboard".into(),
        new_text: "Overview".into(),
        context_classes: None,
        location: Some(loc(7, 7)),
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert_eq!(applied.stage, MatchStage::Ast);
    assert!(applied.new_text.contains(">Overview</h1>"));
    assert!(!applied.new_text.contains("Dashboard"));
}

#[test]
fn text_pattern_uses_class_context() {
    let intent = EditIntent::UpdateText {
        original_text: "Welcome back".into(),
        new_text: "Good morning".into(),
        context_classes: Some("text-muted".into()),
        location: None,
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert_eq!(applied.stage, MatchStage::Pattern);
    assert!(applied.new_text.contains(">Good morning</p>"));

    let mismatched = EditIntent::UpdateText {
        original_text: "Welcome back".into(),
        new_text: "Good morning".into(),
        context_classes: Some("text-primary".into()),
        location: None,
    };
    let err = apply_edit_intent(APP, FILE, &mismatched, &opts()).unwrap_err();
    assert_eq!(
        err,
        EditError::PatternNotFound {
            classification: PatternClass::ReadOnly
        }
    );
}

#[test]
fn delete_node_removes_the_whole_line() {
    let intent = EditIntent::DeleteNode { location: loc(8, 7) };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert!(!applied.new_text.contains("Welcome back"));
    assert!(applied.new_text.contains("Dashboard"));
    assert_eq!(applied.new_text.lines().count(), APP.lines().count() - 1);
}

#[test]
fn delete_with_stale_anchor_is_rejected() {
    let intent = EditIntent::DeleteNode { location: loc(8, 9) };
    let err = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap_err();
    assert!(matches!(err, EditError::StaleLocation { line: 8, column: 9, .. }));
}

#[test]
fn insert_child_appends_with_indentation() {
    let intent = EditIntent::InsertChild {
        location: loc(6, 5),
        code: r#"<footer className="mt-4">Done</footer>"#.into(),
        position: InsertPosition::Append,
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert!(applied.new_text.contains(
        "</Button>\n      <footer className=\"mt-4\">Done</footer>\n    </div>"
    ));
}

#[test]
fn insert_child_prepend_lands_before_first_child() {
    let intent = EditIntent::InsertChild {
        location: loc(6, 5),
        code: "<Banner />".into(),
        position: InsertPosition::Prepend,
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert!(applied.new_text.contains("      <Banner />\n      <h1"));
}

#[test]
fn insert_child_at_index_counts_significant_children() {
    let intent = EditIntent::InsertChild {
        location: loc(6, 5),
        code: "<Divider />".into(),
        position: InsertPosition::At { index: 1 },
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert!(applied.new_text.contains("</h1>\n      <Divider />\n      <p"));

    // past the end degrades to append
    let tail = EditIntent::InsertChild {
        location: loc(6, 5),
        code: "<Divider />".into(),
        position: InsertPosition::At { index: 99 },
    };
    let applied = apply_edit_intent(APP, FILE, &tail, &opts()).unwrap();
    assert!(applied.new_text.contains("</Button>\n      <Divider />\n    </div>"));
}

#[test]
fn insert_expands_self_closing_elements() {
    let row = "const v = (\n  <div className=\"row\">\n    <Spacer className=\"w-2\" />\n  </div>\n);\n";
    let intent = EditIntent::InsertChild {
        location: loc(3, 5),
        code: "<i />".into(),
        position: InsertPosition::Append,
    };
    let applied = apply_edit_intent(row, FILE, &intent, &opts()).unwrap();
    assert!(applied
        .new_text
        .contains("<Spacer className=\"w-2\">\n      <i />\n    </Spacer>"));
}

#[test]
fn keyword_attribute_is_validated() {
    let intent = EditIntent::UpdateAttribute {
        location: loc(9, 7),
        name: "type".into(),
        value: AttributeValue::Keyword("submit".into()),
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert!(applied.new_text.contains("type=\"submit\""));

    let bad = EditIntent::UpdateAttribute {
        location: loc(9, 7),
        name: "type".into(),
        value: AttributeValue::Keyword("launch".into()),
    };
    let err = apply_edit_intent(APP, FILE, &bad, &opts()).unwrap_err();
    assert!(matches!(err, EditError::UnsafeEdit(_)));
}

#[test]
fn boolean_attribute_semantics() {
    let off = EditIntent::UpdateAttribute {
        location: loc(9, 7),
        name: "disabled".into(),
        value: AttributeValue::Bool(false),
    };
    let applied = apply_edit_intent(APP, FILE, &off, &opts()).unwrap();
    assert!(applied.new_text.contains("<Button type=\"button\">Save</Button>"));

    let on = EditIntent::UpdateAttribute {
        location: loc(9, 7),
        name: "autoFocus".into(),
        value: AttributeValue::Bool(true),
    };
    let applied = apply_edit_intent(APP, FILE, &on, &opts()).unwrap();
    assert!(applied
        .new_text
        .contains("<Button type=\"button\" disabled autoFocus>"));
}

#[test]
fn string_attribute_added_when_missing() {
    let intent = EditIntent::UpdateAttribute {
        location: loc(8, 7),
        name: "id".into(),
        value: AttributeValue::Str("welcome".into()),
    };
    let applied = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap();
    assert!(applied
        .new_text
        .contains("<p className=\"text-sm text-muted\" id=\"welcome\">"));
}

#[test]
fn expression_attribute_is_protected() {
    let src = "const v = <div style={{ color }} className=\"x\" />;\n";
    let intent = EditIntent::UpdateAttribute {
        location: loc(1, 11),
        name: "style".into(),
        value: AttributeValue::Str("color: red".into()),
    };
    let err = apply_edit_intent(src, FILE, &intent, &opts()).unwrap_err();
    assert!(matches!(err, EditError::UnsafeEdit(_)));
}

#[test]
fn remove_attribute_requires_presence() {
    let missing = EditIntent::RemoveAttribute {
        location: loc(9, 7),
        name: "data-x".into(),
    };
    let err = apply_edit_intent(APP, FILE, &missing, &opts()).unwrap_err();
    assert!(matches!(err, EditError::NotFound(_)));

    let present = EditIntent::RemoveAttribute {
        location: loc(9, 7),
        name: "type".into(),
    };
    let applied = apply_edit_intent(APP, FILE, &present, &opts()).unwrap();
    assert!(applied.new_text.contains("<Button disabled>Save</Button>"));
}

#[test]
fn unparseable_markup_is_rejected_up_front() {
    let intent = EditIntent::InsertChild {
        location: loc(6, 5),
        code: "<broken".into(),
        position: InsertPosition::Append,
    };
    let err = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap_err();
    assert!(matches!(err, EditError::UnsafeEdit(_)));
}

#[test]
fn edit_that_breaks_the_file_fails_verification() {
    let intent = EditIntent::InsertChild {
        location: loc(6, 5),
        code: "</oops>".into(),
        position: InsertPosition::Append,
    };
    let err = apply_edit_intent(APP, FILE, &intent, &opts()).unwrap_err();
    assert!(matches!(err, EditError::Verify(_)));
}

#[test]
fn intents_apply_in_sequence_and_report_the_weakest_stage() {
    let intents = vec![
        EditIntent::UpdateStyleClasses {
            selector: "flex flex-col gap-2 p-4".into(),
            original_classes: "flex flex-col gap-2 p-4".into(),
            new_classes: "flex flex-col gap-4 p-4".into(),
            location: Some(loc(6, 5)),
        },
        EditIntent::UpdateText {
            original_text: "Dashboard".into(),
            new_text: "Overview".into(),
            context_classes: None,
            location: None,
        },
    ];
    let applied = apply_edit_intents(APP, FILE, &intents, &opts()).unwrap();
    assert_eq!(applied.stage, MatchStage::Pattern);
    assert!(applied.new_text.contains("gap-4"));
    assert!(applied.new_text.contains(">Overview</h1>"));
}
