//! In-memory database implementations, for tests and throwaway runs.

mod hub_state;

pub use hub_state::StubHubStateDb;
