use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The actor task has stopped; no further commands can be delivered.
    #[error("coordinator is no longer running")]
    Closed,

    /// The target file is not a dialect the engine may rewrite.
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
}
