// Ledger persistence module
// Loads the ledger text once per run and replaces it whole when it changed

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info};

use super::error::{DigestToolError, Result};

/// Storage backend for the ledger text
///
/// `replace` must be all-or-nothing: after a failure the previous content
/// is still what `load` returns.
pub trait LedgerStore {
    /// Current ledger text. `None` when no ledger exists yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored ledger with `content`
    fn replace(&self, content: &str) -> Result<()>;

    /// Human-readable location, for messages
    fn location(&self) -> String;
}

/// Ledger kept in a plain text file
///
/// Writes are atomic: the new content goes to a temporary file next to the
/// ledger, which is then renamed over it.
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomically(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        let result = (|| {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                DigestToolError::LedgerEncoding {
                    path: self.path.clone(),
                }
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DigestToolError::from_io_error(e, "reading", &self.path)),
        }
    }

    fn replace(&self, content: &str) -> Result<()> {
        self.write_atomically(content)
            .map_err(|source| DigestToolError::LedgerWrite {
                path: self.path.clone(),
                source,
            })?;
        info!(path = %self.path.display(), bytes = content.len(), "ledger rewritten");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory ledger, for tests and dry runs
///
/// Counts writes so callers can check that an unchanged ledger was left alone.
#[derive(Default)]
pub struct MemoryLedgerStore {
    content: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemoryLedgerStore {
    pub fn new(content: Option<&str>) -> Self {
        Self {
            content: Mutex::new(content.map(str::to_string)),
            writes: Mutex::new(0),
        }
    }

    pub fn content(&self) -> Option<String> {
        self.content.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.content())
    }

    fn replace(&self, content: &str) -> Result<()> {
        *self.content.lock().unwrap_or_else(|e| e.into_inner()) = Some(content.to_string());
        *self.writes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        debug!(bytes = content.len(), "in-memory ledger replaced");
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
