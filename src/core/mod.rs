pub mod errors;
pub mod types;

pub use errors::{Error, Prerequisite, Result, ResultExt};
pub use types::*;
