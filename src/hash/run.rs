// Run pipeline module
// digest batch -> filter collisions -> reconcile with ledger -> persist if changed

use tracing::info;

use crate::config::RunConfig;

use super::batch::BatchBuilder;
use super::collision::CollisionDetector;
use super::digest::DigestEngine;
use super::error::{DigestToolError, Result};
use super::ledger::LedgerCodec;
use super::reconcile::{FileStatus, LedgerReconciler, Status};
use super::report::Report;
use super::store::{FileLedgerStore, LedgerStore};

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    /// Ledger text as loaded
    pub ledger_before: String,
    /// Ledger text after reconciliation; equals `ledger_before` when unchanged
    pub ledger_after: String,
}

/// Run against the ledger file named in the config
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    let store = FileLedgerStore::new(&config.ledger_path);
    run_with_store(config, &store)
}

/// Run against any ledger backend
///
/// Every fallible step happens before the ledger is replaced, so an error
/// leaves the stored ledger as it was.
pub fn run_with_store(config: &RunConfig, store: &dyn LedgerStore) -> Result<RunOutcome> {
    let algorithm = config.algorithm;
    let options = &config.options;

    let ledger_before = match store.load()? {
        Some(text) => text,
        None if options.create_missing => String::new(),
        None => {
            return Err(DigestToolError::FileNotFound {
                path: config.ledger_path.clone(),
            })
        }
    };
    let mut ledger = LedgerCodec::decode(&ledger_before)?;

    let engine = DigestEngine::with_buffer_size(algorithm, options.buffer_size);
    let batch = BatchBuilder::new(engine)
        .with_parallel(options.parallel)
        .with_progress(options.progress)
        .build(&config.files)?;

    let outcome = CollisionDetector::detect(&batch, algorithm);
    let mut results: Vec<FileStatus> = outcome
        .collisions
        .into_iter()
        .map(|c| FileStatus {
            name: c.name,
            algorithm: c.algorithm,
            digest_hex: c.digest_hex,
            status: Status::Collision,
        })
        .collect();

    results.extend(
        LedgerReconciler::new(algorithm)
            .with_scope(options.pair_scope)
            .reconcile(&outcome.survivors, &mut ledger),
    );

    let ledger_written = ledger.is_dirty();
    let ledger_after = if ledger_written {
        let text = LedgerCodec::encode(&ledger);
        store.replace(&text)?;
        text
    } else {
        info!(ledger = %store.location(), "ledger unchanged, not rewritten");
        ledger_before.clone()
    };

    Ok(RunOutcome {
        report: Report::new(results, ledger_written),
        ledger_before,
        ledger_after,
    })
}
