pub mod edit;
pub mod init;
pub mod normalize;

pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, NormalizeArgs};
