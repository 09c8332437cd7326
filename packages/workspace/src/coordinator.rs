//! The draft/commit actor.
//!
//! One task owns every session, so per-target ordering is simply
//! arrival order through the command queue and commits can never
//! overlap. Debounce timers re-enter the queue as `CommitDue` carrying
//! the revision they were armed for; the commit proceeds only if that
//! revision is still the session's latest. Previews are staged in a
//! per-target slot and broadcast on a frame tick, so a burst of edits
//! costs one message per frame.

use crate::draft::{DraftSession, DraftTarget};
use crate::error::CoordinatorError;
use crate::preview::PreviewMessage;
use chrono::Utc;
use graft_common::{DocumentStore, EngineOptions, SourceDialect};
use graft_editor::{apply_edit_intent, ClassMatchOptions, EditError, MatchStage};
use graft_parser::SourceLocation;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::BroadcastStream;

/// Commit lifecycle notifications
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CommitEvent {
    #[serde(rename_all = "camelCase")]
    Committed {
        target_id: String,
        file: String,
        revision: u64,
        stage: MatchStage,
        timestamp: i64,
    },
    /// The commit found no safe match; the draft was dropped without a
    /// rollback (the preview re-syncs on the next recompile)
    #[serde(rename_all = "camelCase")]
    Discarded {
        target_id: String,
        file: String,
        revision: u64,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        target_id: String,
        file: String,
        revision: u64,
        error: String,
        timestamp: i64,
    },
}

enum Command {
    UpdateClasses {
        file: String,
        target_id: String,
        selector: String,
        classes: String,
        location: Option<SourceLocation>,
    },
    UpdateText {
        file: String,
        target_id: String,
        original: String,
        text: String,
        location: Option<SourceLocation>,
    },
    CommitDue {
        target_id: String,
        revision: u64,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
    FlushTarget {
        target_id: String,
        done: oneshot::Sender<()>,
    },
    Cancel {
        target_id: String,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Cloneable front door to a running coordinator
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<Command>,
    previews: broadcast::Sender<PreviewMessage>,
    events: broadcast::Sender<CommitEvent>,
}

impl CoordinatorHandle {
    /// Stage a class-list edit. `selector` is the element's class set
    /// before the drag started; it freezes as the session baseline.
    pub async fn update_classes(
        &self,
        file: &str,
        target_id: &str,
        selector: &str,
        classes: &str,
        location: Option<SourceLocation>,
    ) -> Result<(), CoordinatorError> {
        check_dialect(file)?;
        self.send(Command::UpdateClasses {
            file: file.to_string(),
            target_id: target_id.to_string(),
            selector: selector.to_string(),
            classes: classes.to_string(),
            location,
        })
        .await
    }

    /// Stage a text edit. `original` is the text before the first
    /// keystroke; it freezes as the session baseline.
    pub async fn update_text(
        &self,
        file: &str,
        target_id: &str,
        original: &str,
        text: &str,
        location: Option<SourceLocation>,
    ) -> Result<(), CoordinatorError> {
        check_dialect(file)?;
        self.send(Command::UpdateText {
            file: file.to_string(),
            target_id: target_id.to_string(),
            original: original.to_string(),
            text: text.to_string(),
            location,
        })
        .await
    }

    /// Commit every live draft now and wait for the writes to land
    pub async fn flush(&self) -> Result<(), CoordinatorError> {
        let (done, ack) = oneshot::channel();
        self.send(Command::Flush { done }).await?;
        ack.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Commit one target's draft now
    pub async fn flush_target(&self, target_id: &str) -> Result<(), CoordinatorError> {
        let (done, ack) = oneshot::channel();
        self.send(Command::FlushTarget {
            target_id: target_id.to_string(),
            done,
        })
        .await?;
        ack.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Drop a draft without committing; the preview rolls back to the
    /// session's original value
    pub async fn cancel(&self, target_id: &str) -> Result<(), CoordinatorError> {
        self.send(Command::Cancel {
            target_id: target_id.to_string(),
        })
        .await
    }

    /// Best-effort final commit of every live draft, once, then stop
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        let (done, ack) = oneshot::channel();
        self.send(Command::Shutdown { done }).await?;
        ack.await.map_err(|_| CoordinatorError::Closed)
    }

    pub fn subscribe_previews(&self) -> broadcast::Receiver<PreviewMessage> {
        self.previews.subscribe()
    }

    /// The preview feed as a `Stream`, for callers that pipe it onward
    pub fn preview_stream(&self) -> BroadcastStream<PreviewMessage> {
        BroadcastStream::new(self.previews.subscribe())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CommitEvent> {
        self.events.subscribe()
    }

    async fn send(&self, command: Command) -> Result<(), CoordinatorError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoordinatorError::Closed)
    }
}

fn check_dialect(file: &str) -> Result<(), CoordinatorError> {
    SourceDialect::from_path(file)
        .map(|_| ())
        .ok_or_else(|| CoordinatorError::UnsupportedFile(file.to_string()))
}

/// Actor state. Constructed through [`DraftCoordinator::spawn`], which
/// hands back a [`CoordinatorHandle`] and runs the actor on the current
/// tokio runtime.
pub struct DraftCoordinator {
    store: Arc<dyn DocumentStore>,
    class_options: ClassMatchOptions,
    debounce: Duration,
    frame: Duration,
    /// Cloned into debounce timers so expiry re-enters the queue
    commands: mpsc::Sender<Command>,
    previews: broadcast::Sender<PreviewMessage>,
    events: broadcast::Sender<CommitEvent>,
    sessions: HashMap<String, DraftSession>,
    /// Last resolved revision per target. Seeds new sessions so
    /// revisions stay monotonic per target, and absorbs a duplicate
    /// `CommitDue` when a flush already resolved that revision.
    committed: HashMap<String, u64>,
    /// One staged preview per target, replaced in place until the next
    /// frame tick broadcasts it
    staged: HashMap<String, PreviewMessage>,
}

impl DraftCoordinator {
    pub fn spawn(store: Arc<dyn DocumentStore>, options: EngineOptions) -> CoordinatorHandle {
        let (commands, rx) = mpsc::channel(64);
        let (previews, _) = broadcast::channel(256);
        let (events, _) = broadcast::channel(64);

        let handle = CoordinatorHandle {
            commands: commands.clone(),
            previews: previews.clone(),
            events: events.clone(),
        };
        let actor = DraftCoordinator {
            store,
            class_options: ClassMatchOptions::from(&options),
            debounce: Duration::from_millis(options.commit_debounce_ms),
            frame: Duration::from_millis(options.frame_ms.max(1)),
            commands,
            previews,
            events,
            sessions: HashMap::new(),
            committed: HashMap::new(),
            staged: HashMap::new(),
        };
        tokio::spawn(actor.run(rx));
        handle
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut frame = tokio::time::interval(self.frame);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown { done }) => {
                        self.final_commit();
                        self.broadcast_staged();
                        let _ = done.send(());
                        break;
                    }
                    Some(command) => self.handle(command),
                    // every handle dropped: same best-effort teardown
                    None => {
                        self.final_commit();
                        break;
                    }
                },
                _ = frame.tick() => self.broadcast_staged(),
            }
        }
        tracing::debug!("coordinator stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::UpdateClasses {
                file,
                target_id,
                selector,
                classes,
                location,
            } => {
                let target = DraftTarget::Classes {
                    selector: selector.clone(),
                };
                self.edit(file, target_id, target, selector, classes, location);
            }
            Command::UpdateText {
                file,
                target_id,
                original,
                text,
                location,
            } => self.edit(file, target_id, DraftTarget::Text, original, text, location),
            Command::CommitDue {
                target_id,
                revision,
            } => self.commit_due(&target_id, revision),
            Command::Flush { done } => {
                let targets: Vec<String> = self.sessions.keys().cloned().collect();
                for target_id in targets {
                    self.commit(&target_id);
                }
                let _ = done.send(());
            }
            Command::FlushTarget { target_id, done } => {
                self.commit(&target_id);
                let _ = done.send(());
            }
            Command::Cancel { target_id } => self.cancel(&target_id),
            // intercepted in `run` before dispatch
            Command::Shutdown { .. } => unreachable!("shutdown is handled in the run loop"),
        }
    }

    fn edit(
        &mut self,
        file: String,
        target_id: String,
        target: DraftTarget,
        original: String,
        draft: String,
        location: Option<SourceLocation>,
    ) {
        if let Some(session) = self.sessions.get_mut(&target_id) {
            if session.file != file {
                tracing::warn!(
                    target = %target_id,
                    kept = %session.file,
                    ignored = %file,
                    "draft addressed a different file; keeping the open session"
                );
            }
            session.amend(draft, location);
        } else {
            let revision = self.committed.get(&target_id).copied().unwrap_or(0) + 1;
            tracing::debug!(target = %target_id, file = %file, revision, "draft opened");
            self.sessions.insert(
                target_id.clone(),
                DraftSession::open(&target_id, &file, target, original, draft, location, revision),
            );
        }

        if let Some(session) = self.sessions.get(&target_id) {
            self.staged
                .insert(target_id.clone(), session.preview_update());
        }
        self.arm_debounce(&target_id);
    }

    fn arm_debounce(&mut self, target_id: &str) {
        let Some(session) = self.sessions.get_mut(target_id) else {
            return;
        };
        session.cancel_debounce();

        let commands = self.commands.clone();
        let target_id = target_id.to_string();
        let revision = session.revision;
        let debounce = self.debounce;
        session.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let _ = commands
                .send(Command::CommitDue {
                    target_id,
                    revision,
                })
                .await;
        }));
    }

    /// Debounce expiry. Commits only when the armed revision is still
    /// the session's latest and a flush has not already resolved it.
    fn commit_due(&mut self, target_id: &str, revision: u64) {
        if self.committed.get(target_id).copied().unwrap_or(0) >= revision {
            return;
        }
        let Some(session) = self.sessions.get(target_id) else {
            return;
        };
        if session.revision != revision {
            tracing::debug!(
                target = %target_id,
                due = revision,
                current = session.revision,
                "superseded commit skipped"
            );
            return;
        }
        self.commit(target_id);
    }

    fn commit(&mut self, target_id: &str) {
        let Some(mut session) = self.sessions.remove(target_id) else {
            return;
        };
        session.cancel_debounce();
        let revision = session.revision;
        self.committed.insert(target_id.to_string(), revision);

        let path = PathBuf::from(&session.file);
        let source = match self.store.read(&path) {
            Ok(source) => source,
            Err(err) => {
                self.fail(&session, revision, err.to_string());
                return;
            }
        };

        let intent = session.intent();
        match apply_edit_intent(&source, &session.file, &intent, &self.class_options) {
            Ok(applied) => {
                if applied.changed_from(&source) {
                    if let Err(err) = self.store.write(&path, &applied.new_text) {
                        self.fail(&session, revision, err.to_string());
                        return;
                    }
                }
                tracing::info!(
                    target = %session.target_id,
                    file = %session.file,
                    revision,
                    stage = ?applied.stage,
                    "draft committed"
                );
                let _ = self.events.send(CommitEvent::Committed {
                    target_id: session.target_id.clone(),
                    file: session.file.clone(),
                    revision,
                    stage: applied.stage,
                    timestamp: Utc::now().timestamp_millis(),
                });
            }
            Err(EditError::PatternNotFound { classification }) => {
                tracing::debug!(
                    target = %session.target_id,
                    file = %session.file,
                    ?classification,
                    "draft discarded, no safe match"
                );
                let _ = self.events.send(CommitEvent::Discarded {
                    target_id: session.target_id.clone(),
                    file: session.file.clone(),
                    revision,
                    timestamp: Utc::now().timestamp_millis(),
                });
            }
            Err(err) => self.fail(&session, revision, err.to_string()),
        }
    }

    fn fail(&mut self, session: &DraftSession, revision: u64, error: String) {
        tracing::warn!(
            target = %session.target_id,
            file = %session.file,
            %error,
            "draft rolled back"
        );
        self.staged
            .insert(session.target_id.clone(), session.preview_rollback());
        let _ = self.events.send(CommitEvent::Failed {
            target_id: session.target_id.clone(),
            file: session.file.clone(),
            revision,
            error,
            timestamp: Utc::now().timestamp_millis(),
        });
    }

    fn cancel(&mut self, target_id: &str) {
        let Some(mut session) = self.sessions.remove(target_id) else {
            return;
        };
        session.cancel_debounce();
        self.committed.insert(target_id.to_string(), session.revision);
        self.staged
            .insert(target_id.to_string(), session.preview_rollback());
        tracing::debug!(target = %target_id, "draft cancelled");
    }

    fn final_commit(&mut self) {
        let targets: Vec<String> = self.sessions.keys().cloned().collect();
        for target_id in targets {
            self.commit(&target_id);
        }
    }

    fn broadcast_staged(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        for (_, message) in self.staged.drain() {
            // no subscribers is fine
            let _ = self.previews.send(message);
        }
    }
}
