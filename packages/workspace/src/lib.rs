//! # Workspace
//!
//! Draft/commit coordination between a live preview and source files.
//! Visual edits stream in as drafts; each target gets one open session
//! whose original value is frozen at the first edit. Previews mirror
//! the draft within a frame, and the source write happens once, after
//! a debounce window of quiet, through the editor's intent pipeline.
//!
//! The whole thing is a single actor task. Callers talk to it through
//! a cloneable [`CoordinatorHandle`] and listen on broadcast channels
//! for preview traffic and commit outcomes.

pub mod coordinator;
pub mod draft;
pub mod error;
pub mod preview;

pub use coordinator::{CommitEvent, CoordinatorHandle, DraftCoordinator};
pub use draft::{DraftSession, DraftTarget};
pub use error::CoordinatorError;
pub use preview::PreviewMessage;
