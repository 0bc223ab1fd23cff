//! Hub state database implementation for Sled.
//!
//! Keeps, per hub height:
//! - the toplevel state snapshot after the block
//! - the block's write batch

mod db;
mod schemas;

pub use db::HubStateDBSled;
