//! Optimistic preview messages.
//!
//! Previews mirror the draft value ahead of the commit so the canvas
//! tracks the user's drag without waiting for the file write. Rollbacks
//! carry the pre-draft value and replace any staged update for the same
//! target.

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PreviewMessage {
    #[serde(rename_all = "camelCase")]
    UpdateClasses {
        target_id: String,
        classes: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    RollbackClasses {
        target_id: String,
        classes: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    UpdateText {
        target_id: String,
        text: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    RollbackText {
        target_id: String,
        text: String,
        timestamp: i64,
    },
}

impl PreviewMessage {
    pub fn update_classes(target_id: impl Into<String>, classes: impl Into<String>) -> Self {
        Self::UpdateClasses {
            target_id: target_id.into(),
            classes: classes.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn rollback_classes(target_id: impl Into<String>, classes: impl Into<String>) -> Self {
        Self::RollbackClasses {
            target_id: target_id.into(),
            classes: classes.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn update_text(target_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::UpdateText {
            target_id: target_id.into(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn rollback_text(target_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::RollbackText {
            target_id: target_id.into(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            Self::UpdateClasses { target_id, .. } => target_id,
            Self::RollbackClasses { target_id, .. } => target_id,
            Self::UpdateText { target_id, .. } => target_id,
            Self::RollbackText { target_id, .. } => target_id,
        }
    }

    pub fn is_rollback(&self) -> bool {
        matches!(
            self,
            Self::RollbackClasses { .. } | Self::RollbackText { .. }
        )
    }
}
