// Reconciliation module
// Classifies surviving batch files against the ledger and records new digests

use std::fmt;

use tracing::debug;

use super::batch::Batch;
use super::digest::Algorithm;
use super::ledger::{DigestPair, Ledger, LedgerEntry};

/// Outcome of checking one file against the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Digest was not recorded before; it is now
    NotFound,
    /// Digest matches the recorded one
    Ok,
    /// Algorithm was recorded with a different digest
    NotOk,
    /// Digest equals another file's digest
    Collision,
}

impl Status {
    /// Report token for this status
    pub fn label(self, legacy_collision_label: bool) -> &'static str {
        match self {
            Status::NotFound => "NOT FOUND",
            Status::Ok => "OK",
            Status::NotOk => "NOT OK",
            Status::Collision if legacy_collision_label => "COLISION",
            Status::Collision => "COLLISION",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(false))
    }
}

/// Status of one file, as reported
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileStatus {
    pub name: String,
    pub algorithm: Algorithm,
    pub digest_hex: String,
    pub status: Status,
}

/// How many pairs of each entry the reconciler looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairScope {
    /// Every recorded pair
    #[default]
    All,
    /// Only the first two pairs, as older ledgers were checked
    FirstTwo,
}

impl PairScope {
    fn limit(self) -> usize {
        match self {
            PairScope::All => usize::MAX,
            PairScope::FirstTwo => 2,
        }
    }
}

/// Matches a batch against the ledger, mutating the ledger in place
pub struct LedgerReconciler {
    algorithm: Algorithm,
    scope: PairScope,
}

enum Lookup {
    /// Another file already carries this digest
    Collision,
    /// Index of the last entry recorded under this name
    Found(usize),
    Missing,
}

impl LedgerReconciler {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            scope: PairScope::All,
        }
    }

    pub fn with_scope(mut self, scope: PairScope) -> Self {
        self.scope = scope;
        self
    }

    /// Classify every batch file, in batch order
    ///
    /// Only the entries present before this call are scanned, in ledger
    /// order; entries created for earlier batch files are never matched. A
    /// different file carrying the same algorithm and digest ends the scan
    /// with `Collision`, whether or not an entry for the file's own name was
    /// already passed. Otherwise the last entry with the same name decides
    /// between `Ok`, `NotOk` and recording the new algorithm; a name with no
    /// entry gets a new one.
    pub fn reconcile(&self, batch: &Batch, ledger: &mut Ledger) -> Vec<FileStatus> {
        let loaded = ledger.len();
        batch
            .iter()
            .map(|file| {
                let digest_hex = file.hex();
                let status = self.classify(&file.name, &digest_hex, ledger, loaded);
                debug!(name = %file.name, %status, "reconciled");
                FileStatus {
                    name: file.name.clone(),
                    algorithm: self.algorithm,
                    digest_hex,
                    status,
                }
            })
            .collect()
    }

    fn classify(&self, name: &str, digest_hex: &str, ledger: &mut Ledger, loaded: usize) -> Status {
        match self.lookup(name, digest_hex, &ledger.entries()[..loaded]) {
            Lookup::Collision => Status::Collision,
            Lookup::Found(index) => {
                let entry = &ledger.entries()[index];
                if self.consulted(entry).any(|p| self.same_digest(p, digest_hex)) {
                    Status::Ok
                } else if self.consulted(entry).any(|p| self.same_algorithm(p)) {
                    Status::NotOk
                } else {
                    ledger.append_pair(index, self.pair(digest_hex));
                    Status::NotFound
                }
            }
            Lookup::Missing => {
                ledger.push_entry(name, self.pair(digest_hex));
                Status::NotFound
            }
        }
    }

    fn lookup(&self, name: &str, digest_hex: &str, entries: &[LedgerEntry]) -> Lookup {
        let mut found = None;
        for (index, entry) in entries.iter().enumerate() {
            if entry.name == name {
                found = Some(index);
            } else if self.consulted(entry).any(|p| self.same_digest(p, digest_hex)) {
                return Lookup::Collision;
            }
        }
        found.map_or(Lookup::Missing, Lookup::Found)
    }

    fn consulted<'a>(&self, entry: &'a LedgerEntry) -> impl Iterator<Item = &'a DigestPair> {
        entry.pairs.iter().take(self.scope.limit())
    }

    fn same_algorithm(&self, pair: &DigestPair) -> bool {
        self.algorithm.matches_label(&pair.algorithm)
    }

    fn same_digest(&self, pair: &DigestPair, digest_hex: &str) -> bool {
        self.same_algorithm(pair) && pair.digest_hex.eq_ignore_ascii_case(digest_hex)
    }

    fn pair(&self, digest_hex: &str) -> DigestPair {
        DigestPair::new(self.algorithm.label(), digest_hex)
    }
}
