pub mod dialect;
pub mod options;
pub mod store;

pub use dialect::*;
pub use options::*;
pub use store::*;
