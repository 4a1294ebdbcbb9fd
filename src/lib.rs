// Library root: re-exports all modules so integration tests and the host
// application can access the crate's public API.

pub mod cache;
pub mod config;
pub mod data;
pub mod engine;
pub mod provider;
