//! Database abstraction for the hub's rollapp pipeline state.

mod errors;
pub mod traits;

#[cfg(feature = "stubs")]
pub mod stubs;

pub use errors::{DbError, DbResult};
