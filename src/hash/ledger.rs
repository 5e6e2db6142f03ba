// Ledger format module
// Reads and writes the plain text digest ledger

use std::fmt::Write as _;

use tracing::debug;

use super::error::{DigestToolError, Result};

/// One recorded `(algorithm, digest)` observation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DigestPair {
    pub algorithm: String,
    pub digest_hex: String,
}

impl DigestPair {
    pub fn new(algorithm: impl Into<String>, digest_hex: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            digest_hex: digest_hex.into(),
        }
    }
}

/// Every digest recorded for one file name
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LedgerEntry {
    pub name: String,
    pub pairs: Vec<DigestPair>,
}

/// In-memory ledger with change tracking
///
/// Entry order is preserved for serialization. `dirty` is set by every
/// mutation and tells the caller whether the stored file must be replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    dirty: bool,
}

impl Ledger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries,
            dirty: false,
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a file that has no entry yet
    pub fn push_entry(&mut self, name: impl Into<String>, pair: DigestPair) {
        self.entries.push(LedgerEntry {
            name: name.into(),
            pairs: vec![pair],
        });
        self.dirty = true;
    }

    /// Record a new algorithm for an existing entry
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn append_pair(&mut self, index: usize, pair: DigestPair) {
        self.entries[index].pairs.push(pair);
        self.dirty = true;
    }
}

/// Parser and serializer for the ledger text format
///
/// Format: `<name> <algorithm> <HEX> [<algorithm> <HEX> ...]`, one record per
/// line, single spaces between tokens, every line terminated by `\n`.
pub struct LedgerCodec;

impl LedgerCodec {
    /// Parse ledger text into entries
    ///
    /// Blank lines are skipped. Any other line that is not a name followed
    /// by complete algorithm/hex pairs fails the whole parse.
    pub fn decode(text: &str) -> Result<Ledger> {
        let mut entries = Vec::new();

        for (line_num, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                debug!(line = line_num + 1, "skipping blank ledger line");
                continue;
            }
            entries.push(Self::parse_line(line).map_err(|reason| {
                DigestToolError::MalformedLedgerRecord {
                    line: line_num + 1,
                    reason,
                    content: line.to_string(),
                }
            })?);
        }

        Ok(Ledger::new(entries))
    }

    /// Parse a single ledger record
    pub fn parse_line(line: &str) -> std::result::Result<LedgerEntry, String> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or_else(|| "empty record".to_string())?;
        let rest: Vec<&str> = tokens.collect();

        if rest.is_empty() {
            return Err(format!("no digest recorded for '{}'", name));
        }
        if rest.len() % 2 != 0 {
            return Err(format!(
                "algorithm '{}' has no digest",
                rest[rest.len() - 1]
            ));
        }

        let pairs = rest
            .chunks_exact(2)
            .map(|pair| {
                let (algorithm, digest_hex) = (pair[0], pair[1]);
                if !digest_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(format!(
                        "digest '{}' for {} is not hexadecimal",
                        digest_hex, algorithm
                    ));
                }
                Ok(DigestPair::new(algorithm, digest_hex))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        Ok(LedgerEntry {
            name: name.to_string(),
            pairs,
        })
    }

    /// Serialize a single record, without the line terminator
    pub fn format_entry(entry: &LedgerEntry) -> String {
        let mut line = entry.name.clone();
        for pair in &entry.pairs {
            let _ = write!(line, " {} {}", pair.algorithm, pair.digest_hex);
        }
        line
    }

    /// Serialize the whole ledger
    pub fn encode(ledger: &Ledger) -> String {
        let mut text = String::new();
        for entry in ledger.entries() {
            text.push_str(&Self::format_entry(entry));
            text.push('\n');
        }
        text
    }
}
