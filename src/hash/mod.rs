// Digest ledger library
// Batch digesting, collision detection, and reconciliation against a stored ledger

pub mod batch;
pub mod collision;
pub mod digest;
pub mod error;
pub mod ledger;
pub mod path_utils;
pub mod reconcile;
pub mod report;
pub mod run;
pub mod store;

// Re-export commonly used types for convenience
pub use batch::{Batch, BatchBuilder, FileDigest};
pub use collision::{CollisionDetector, CollisionOutcome, CollisionResult};
pub use digest::{Algorithm, AlgorithmInfo, DigestEngine, Hasher};
pub use error::DigestToolError;
pub use ledger::{DigestPair, Ledger, LedgerCodec, LedgerEntry};
pub use reconcile::{FileStatus, LedgerReconciler, PairScope, Status};
pub use report::{LedgerContent, Report, ReportFormat, ReportStyle, Summary};
pub use run::{run, run_with_store, RunOutcome};
pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};
