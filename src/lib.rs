// Library module for digest-tool
// Re-exports modules for use in integration tests and the binary

pub mod config;
pub mod hash;
