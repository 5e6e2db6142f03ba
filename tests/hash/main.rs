// Test entry point for the digest ledger
// All integration tests organized here

mod digest_tests;
mod run_tests;
