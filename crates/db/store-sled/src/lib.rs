//! Sled store for the rollhub codebase.

mod config;
pub mod hub_state;
mod init;
pub mod macros;

pub use config::SledDbConfig;
pub use hub_state::HubStateDBSled;
pub use init::{open_hub_state_db, open_sled_database};

pub const SLED_NAME: &str = "rollhub";
