// Library root — exposes internals for integration tests.
// The binary entry point is src/main.rs.

pub mod comms;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logger;
