//! Live draft state for one editable target.
//!
//! A session exists exactly while a target is in its drafting window:
//! created on the first edit, gone after commit, cancel, or discard.
//! `original_value` is frozen at the value observed before the first
//! edit so the eventual commit diffs against the true baseline, no
//! matter how many keystrokes land in between.

use crate::preview::PreviewMessage;
use graft_editor::EditIntent;
use graft_parser::SourceLocation;
use tokio::task::JoinHandle;

/// What the draft rewrites when it commits
#[derive(Debug, Clone, PartialEq)]
pub enum DraftTarget {
    /// A class-list edit; `selector` identifies the element when the
    /// anchor is missing or stale
    Classes { selector: String },
    /// A text-run edit
    Text,
}

#[derive(Debug)]
pub struct DraftSession {
    pub target_id: String,
    pub file: String,
    /// Value before the first edit of the session. Never updated.
    pub original_value: String,
    /// Latest edited value
    pub draft_value: String,
    /// Bumped on every edit; the commit guard compares against it
    pub revision: u64,
    pub target: DraftTarget,
    pub location: Option<SourceLocation>,
    /// Pending debounce timer, aborted wholesale when superseded
    pub(crate) debounce: Option<JoinHandle<()>>,
}

impl DraftSession {
    pub fn open(
        target_id: &str,
        file: &str,
        target: DraftTarget,
        original_value: String,
        draft_value: String,
        location: Option<SourceLocation>,
        revision: u64,
    ) -> Self {
        Self {
            target_id: target_id.to_string(),
            file: file.to_string(),
            original_value,
            draft_value,
            revision,
            target,
            location,
            debounce: None,
        }
    }

    /// Fold a newer edit into the session. The original value stays
    /// frozen; a fresher anchor replaces the stored one.
    pub fn amend(&mut self, draft_value: String, location: Option<SourceLocation>) {
        self.draft_value = draft_value;
        self.revision += 1;
        if location.is_some() {
            self.location = location;
        }
    }

    /// The commit intent for the session as it stands
    pub fn intent(&self) -> EditIntent {
        match &self.target {
            DraftTarget::Classes { selector } => EditIntent::UpdateStyleClasses {
                selector: selector.clone(),
                original_classes: self.original_value.clone(),
                new_classes: self.draft_value.clone(),
                location: self.location.clone(),
            },
            DraftTarget::Text => EditIntent::UpdateText {
                original_text: self.original_value.clone(),
                new_text: self.draft_value.clone(),
                context_classes: None,
                location: self.location.clone(),
            },
        }
    }

    /// Optimistic preview carrying the draft value
    pub fn preview_update(&self) -> PreviewMessage {
        match &self.target {
            DraftTarget::Classes { .. } => {
                PreviewMessage::update_classes(&self.target_id, &self.draft_value)
            }
            DraftTarget::Text => PreviewMessage::update_text(&self.target_id, &self.draft_value),
        }
    }

    /// Rollback preview restoring the pre-draft value
    pub fn preview_rollback(&self) -> PreviewMessage {
        match &self.target {
            DraftTarget::Classes { .. } => {
                PreviewMessage::rollback_classes(&self.target_id, &self.original_value)
            }
            DraftTarget::Text => {
                PreviewMessage::rollback_text(&self.target_id, &self.original_value)
            }
        }
    }

    pub(crate) fn cancel_debounce(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes_session() -> DraftSession {
        DraftSession::open(
            "card",
            "src/App.tsx",
            DraftTarget::Classes {
                selector: "flex gap-2 p-4".to_string(),
            },
            "flex gap-2 p-4".to_string(),
            "flex gap-3 p-4".to_string(),
            None,
            1,
        )
    }

    #[test]
    fn original_value_stays_frozen_across_amends() {
        let mut session = classes_session();
        session.amend("flex gap-4 p-4".to_string(), None);
        session.amend("flex gap-6 p-4".to_string(), None);

        assert_eq!(session.original_value, "flex gap-2 p-4");
        assert_eq!(session.draft_value, "flex gap-6 p-4");
        assert_eq!(session.revision, 3);
    }

    #[test]
    fn a_fresher_anchor_replaces_the_stored_one() {
        let mut session = classes_session();
        let anchor = SourceLocation::new("src/App.tsx", 6, 5);
        session.amend("flex gap-4 p-4".to_string(), Some(anchor.clone()));
        assert_eq!(session.location, Some(anchor.clone()));

        // an anchorless edit keeps the last known anchor
        session.amend("flex gap-6 p-4".to_string(), None);
        assert_eq!(session.location, Some(anchor));
    }

    #[test]
    fn class_sessions_build_class_intents() {
        let session = classes_session();
        match session.intent() {
            EditIntent::UpdateStyleClasses {
                selector,
                original_classes,
                new_classes,
                location,
            } => {
                assert_eq!(selector, "flex gap-2 p-4");
                assert_eq!(original_classes, "flex gap-2 p-4");
                assert_eq!(new_classes, "flex gap-3 p-4");
                assert_eq!(location, None);
            }
            other => panic!("unexpected intent: {:?}", other),
        }
    }

    #[test]
    fn text_sessions_build_text_intents_and_previews() {
        let session = DraftSession::open(
            "hero",
            "src/App.tsx",
            DraftTarget::Text,
            "Dashboard".to_string(),
            "Analytics".to_string(),
            None,
            1,
        );
        match session.intent() {
            EditIntent::UpdateText {
                original_text,
                new_text,
                ..
            } => {
                assert_eq!(original_text, "Dashboard");
                assert_eq!(new_text, "Analytics");
            }
            other => panic!("unexpected intent: {:?}", other),
        }

        assert!(matches!(
            session.preview_update(),
            PreviewMessage::UpdateText { text, .. } if text == "Analytics"
        ));
        assert!(matches!(
            session.preview_rollback(),
            PreviewMessage::RollbackText { text, .. } if text == "Dashboard"
        ));
    }
}
