//! End-to-end coordinator behavior on paused time: debounce windows,
//! frame coalescing, flush/cancel/shutdown, and commit outcomes.

use graft_common::{DocumentStore, EngineOptions, FsDocumentStore, MemoryDocumentStore};
use graft_editor::MatchStage;
use graft_parser::SourceLocation;
use graft_workspace::{
    CommitEvent, CoordinatorError, CoordinatorHandle, DraftCoordinator, PreviewMessage,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_stream::StreamExt;

const FILE: &str = "src/Card.tsx";

const CARD: &str = r#"import React from "react";

export function Card() {
  return <div className="flex gap-2 p-4">Body</div>;
}
"#;

fn engine(source: &str) -> (Arc<MemoryDocumentStore>, CoordinatorHandle) {
    let store = Arc::new(MemoryDocumentStore::new().with_document(FILE, source));
    let handle = DraftCoordinator::spawn(store.clone(), EngineOptions::default());
    (store, handle)
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_commit_once_with_the_full_diff() {
    let (store, handle) = engine(CARD);
    let mut events = handle.subscribe_events();

    for classes in ["flex gap-3 p-4", "flex gap-4 p-4", "flex gap-6 p-4"] {
        handle
            .update_classes(FILE, "card", "flex gap-2 p-4", classes, None)
            .await
            .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    match events.try_recv().unwrap() {
        CommitEvent::Committed {
            target_id,
            file,
            revision,
            stage,
            ..
        } => {
            assert_eq!(target_id, "card");
            assert_eq!(file, FILE);
            assert_eq!(revision, 3);
            assert_eq!(stage, MatchStage::Pattern);
        }
        other => panic!("expected a commit, got {other:?}"),
    }
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(
        store.read(Path::new(FILE)).unwrap(),
        CARD.replace("gap-2", "gap-6")
    );
}

#[tokio::test(start_paused = true)]
async fn commits_wait_for_the_debounce_window() {
    let (store, handle) = engine(CARD);
    let mut events = handle.subscribe_events();

    handle
        .update_classes(FILE, "card", "flex gap-2 p-4", "flex gap-8 p-4", None)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(store.read(Path::new(FILE)).unwrap(), CARD);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(
        events.try_recv(),
        Ok(CommitEvent::Committed { .. })
    ));
    assert_eq!(
        store.read(Path::new(FILE)).unwrap(),
        CARD.replace("gap-2", "gap-8")
    );
}

#[tokio::test(start_paused = true)]
async fn preview_updates_are_coalesced_per_frame() {
    let (_store, handle) = engine(CARD);
    let mut previews = handle.subscribe_previews();
    let mut stream = handle.preview_stream();

    for gap in 3..8 {
        handle
            .update_classes(
                FILE,
                "card",
                "flex gap-2 p-4",
                &format!("flex gap-{gap} p-4"),
                None,
            )
            .await
            .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    let message = previews.try_recv().unwrap();
    match &message {
        PreviewMessage::UpdateClasses {
            target_id, classes, ..
        } => {
            assert_eq!(target_id, "card");
            assert_eq!(classes, "flex gap-7 p-4");
        }
        other => panic!("expected an update, got {other:?}"),
    }
    assert!(matches!(previews.try_recv(), Err(TryRecvError::Empty)));

    // a second subscriber sees the same single frame
    assert_eq!(stream.next().await.unwrap().unwrap(), message);
}

#[tokio::test(start_paused = true)]
async fn flush_commits_immediately_and_the_timer_no_ops() {
    let (store, handle) = engine(CARD);
    let mut events = handle.subscribe_events();

    handle
        .update_classes(FILE, "card", "flex gap-2 p-4", "flex gap-6 p-4", None)
        .await
        .unwrap();
    handle.flush().await.unwrap();

    let expected = CARD.replace("gap-2", "gap-6");
    assert_eq!(store.read(Path::new(FILE)).unwrap(), expected);
    assert!(matches!(
        events.try_recv(),
        Ok(CommitEvent::Committed { revision: 1, .. })
    ));

    // the debounce window expiring later must not commit a second time
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(store.read(Path::new(FILE)).unwrap(), expected);
}

#[tokio::test(start_paused = true)]
async fn flush_target_leaves_other_drafts_pending() {
    const NAV: &str = r#"import React from "react";

export function Nav() {
  return <nav className="flex items-center">Menu</nav>;
}
"#;
    let store = Arc::new(
        MemoryDocumentStore::new()
            .with_document(FILE, CARD)
            .with_document("src/Nav.tsx", NAV),
    );
    let handle = DraftCoordinator::spawn(store.clone(), EngineOptions::default());
    let mut events = handle.subscribe_events();

    handle
        .update_classes(FILE, "card", "flex gap-2 p-4", "flex gap-6 p-4", None)
        .await
        .unwrap();
    handle
        .update_classes(
            "src/Nav.tsx",
            "nav",
            "flex items-center",
            "flex items-center gap-2",
            None,
        )
        .await
        .unwrap();

    handle.flush_target("card").await.unwrap();
    assert_eq!(
        store.read(Path::new(FILE)).unwrap(),
        CARD.replace("gap-2", "gap-6")
    );
    assert_eq!(store.read(Path::new("src/Nav.tsx")).unwrap(), NAV);
    match events.try_recv().unwrap() {
        CommitEvent::Committed { target_id, .. } => assert_eq!(target_id, "card"),
        other => panic!("expected a commit, got {other:?}"),
    }

    // the nav draft still commits on its own debounce
    tokio::time::sleep(Duration::from_millis(300)).await;
    match events.try_recv().unwrap() {
        CommitEvent::Committed { target_id, .. } => assert_eq!(target_id, "nav"),
        other => panic!("expected a commit, got {other:?}"),
    }
    assert_eq!(
        store.read(Path::new("src/Nav.tsx")).unwrap(),
        NAV.replace("items-center", "items-center gap-2")
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_rolls_back_the_preview() {
    let (store, handle) = engine(CARD);
    let mut previews = handle.subscribe_previews();
    let mut events = handle.subscribe_events();

    handle
        .update_classes(FILE, "card", "flex gap-2 p-4", "flex gap-10 p-4", None)
        .await
        .unwrap();
    match previews.recv().await.unwrap() {
        PreviewMessage::UpdateClasses { classes, .. } => assert_eq!(classes, "flex gap-10 p-4"),
        other => panic!("expected an update, got {other:?}"),
    }

    handle.cancel("card").await.unwrap();
    match previews.recv().await.unwrap() {
        PreviewMessage::RollbackClasses {
            target_id, classes, ..
        } => {
            assert_eq!(target_id, "card");
            assert_eq!(classes, "flex gap-2 p-4");
        }
        other => panic!("expected a rollback, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(store.read(Path::new(FILE)).unwrap(), CARD);
}

#[tokio::test(start_paused = true)]
async fn commits_without_a_safe_match_discard_silently() {
    let (store, handle) = engine(CARD);
    let mut previews = handle.subscribe_previews();
    let mut events = handle.subscribe_events();

    handle
        .update_classes(FILE, "ghost", "bg-missing-42", "bg-missing-43", None)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    match events.try_recv().unwrap() {
        CommitEvent::Discarded {
            target_id,
            revision,
            ..
        } => {
            assert_eq!(target_id, "ghost");
            assert_eq!(revision, 1);
        }
        other => panic!("expected a discard, got {other:?}"),
    }
    // the optimistic preview goes out; a discard sends no rollback
    assert!(matches!(
        previews.try_recv(),
        Ok(PreviewMessage::UpdateClasses { .. })
    ));
    assert!(matches!(previews.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(store.read(Path::new(FILE)).unwrap(), CARD);
}

#[tokio::test(start_paused = true)]
async fn failing_commits_roll_back_and_notify() {
    let (_store, handle) = engine(CARD);
    let mut previews = handle.subscribe_previews();
    let mut events = handle.subscribe_events();

    handle
        .update_classes("src/Ghost.tsx", "ghost", "flex", "flex gap-2", None)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    match events.try_recv().unwrap() {
        CommitEvent::Failed {
            target_id, error, ..
        } => {
            assert_eq!(target_id, "ghost");
            assert!(error.contains("Ghost.tsx"), "unexpected error: {error}");
        }
        other => panic!("expected a failure, got {other:?}"),
    }
    assert!(matches!(
        previews.try_recv(),
        Ok(PreviewMessage::UpdateClasses { .. })
    ));
    match previews.try_recv().unwrap() {
        PreviewMessage::RollbackClasses { classes, .. } => assert_eq!(classes, "flex"),
        other => panic!("expected a rollback, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_commits_live_drafts_and_closes_the_handle() {
    let (store, handle) = engine(CARD);
    let mut events = handle.subscribe_events();

    handle
        .update_classes(FILE, "card", "flex gap-2 p-4", "flex gap-6 p-4", None)
        .await
        .unwrap();
    handle.shutdown().await.unwrap();

    assert_eq!(
        store.read(Path::new(FILE)).unwrap(),
        CARD.replace("gap-2", "gap-6")
    );
    assert!(matches!(
        events.try_recv(),
        Ok(CommitEvent::Committed { .. })
    ));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    let err = handle
        .update_classes(FILE, "card", "flex gap-6 p-4", "flex gap-8 p-4", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Closed));
}

#[tokio::test]
async fn unsupported_files_are_rejected_up_front() {
    let (_store, handle) = engine(CARD);

    let err = handle
        .update_classes("styles.css", "s", "a", "b", None)
        .await
        .unwrap_err();
    match err {
        CoordinatorError::UnsupportedFile(file) => assert_eq!(file, "styles.css"),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = handle
        .update_text("README", "t", "Hello", "Hi", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::UnsupportedFile(_)));
}

#[tokio::test(start_paused = true)]
async fn text_drafts_commit_and_preview() {
    const HEADER: &str = r#"import React from "react";

export function Header() {
  return <h1 className="text-h1">Dashboard</h1>;
}
"#;
    let store = Arc::new(MemoryDocumentStore::new().with_document("src/Header.tsx", HEADER));
    let handle = DraftCoordinator::spawn(store.clone(), EngineOptions::default());
    let mut previews = handle.subscribe_previews();
    let mut events = handle.subscribe_events();

    handle
        .update_text("src/Header.tsx", "title", "Dashboard", "Dash", None)
        .await
        .unwrap();
    handle
        .update_text("src/Header.tsx", "title", "Dashboard", "Analytics", None)
        .await
        .unwrap();

    match previews.recv().await.unwrap() {
        PreviewMessage::UpdateText {
            target_id, text, ..
        } => {
            assert_eq!(target_id, "title");
            assert_eq!(text, "Analytics");
        }
        other => panic!("expected a text update, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(300)).await;
    match events.try_recv().unwrap() {
        CommitEvent::Committed {
            revision, stage, ..
        } => {
            assert_eq!(revision, 2);
            assert_eq!(stage, MatchStage::Pattern);
        }
        other => panic!("expected a commit, got {other:?}"),
    }
    assert!(store
        .read(Path::new("src/Header.tsx"))
        .unwrap()
        .contains(">Analytics<"));
}

#[tokio::test(start_paused = true)]
async fn anchored_commits_report_the_ast_stage() {
    let (store, handle) = engine(CARD);
    let mut events = handle.subscribe_events();

    // line 4, column 11 sits on the div's tag name
    let anchor = SourceLocation::new(FILE, 4, 11);
    handle
        .update_classes(FILE, "card", "flex gap-2 p-4", "flex gap-6 p-4", Some(anchor))
        .await
        .unwrap();
    handle.flush().await.unwrap();

    match events.try_recv().unwrap() {
        CommitEvent::Committed { stage, .. } => assert_eq!(stage, MatchStage::Ast),
        other => panic!("expected a commit, got {other:?}"),
    }
    assert_eq!(
        store.read(Path::new(FILE)).unwrap(),
        CARD.replace("gap-2", "gap-6")
    );
}

#[tokio::test(start_paused = true)]
async fn commits_write_through_the_fs_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Card.tsx");
    std::fs::write(&path, CARD).unwrap();

    let handle = DraftCoordinator::spawn(Arc::new(FsDocumentStore), EngineOptions::default());
    handle
        .update_classes(
            path.to_str().unwrap(),
            "card",
            "flex gap-2 p-4",
            "flex gap-6 p-4",
            None,
        )
        .await
        .unwrap();
    handle.flush().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        CARD.replace("gap-2", "gap-6")
    );
}
