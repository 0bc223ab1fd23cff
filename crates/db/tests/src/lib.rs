//! Behavioural tests shared by every database backend.
//!
//! Each module exposes plain test functions taking a database, plus a macro
//! generating `#[test]` wrappers around them from a setup expression.

pub mod hub_state_tests;

#[cfg(test)]
mod stub_tests {
    use rollhub_db_types::stubs::StubHubStateDb;

    crate::hub_state_db_tests!(StubHubStateDb::new());
}
