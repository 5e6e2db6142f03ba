//! Configuration for a digest-tool run.
//!
//! Settings come from an optional TOML file; command-line flags are merged on
//! top of them into a single [`RunConfig`] that the pipeline receives.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::hash::digest::{Algorithm, DEFAULT_BUFFER_SIZE};
use crate::hash::error::{DigestToolError, Result};
use crate::hash::reconcile::PairScope;
use crate::hash::report::ReportFormat;

/// Top-level settings file, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Report output.
    pub report: ReportSection,
    /// Ledger handling.
    pub ledger: LedgerSection,
    /// Digest computation.
    pub digest: DigestSection,
    /// Logging.
    pub log: LogSection,
}

/// `[report]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    /// Spell the collision status `COLISION`, as older reports did.
    pub legacy_collision_label: bool,
    /// `"text"` (default) or `"json"`.
    pub format: ReportFormat,
    /// Color status tokens when stdout is a terminal.
    pub color: bool,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            legacy_collision_label: false,
            format: ReportFormat::Text,
            color: true,
        }
    }
}

/// `[ledger]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerSection {
    /// Only consult the first two digests of each record.
    pub two_slot_compat: bool,
    /// Treat a missing ledger file as empty instead of failing.
    pub create_missing: bool,
}

/// `[digest]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DigestSection {
    /// Digest batch files on the rayon thread pool.
    pub parallel: bool,
    /// Read buffer size in bytes.
    pub buffer_size: usize,
}

impl Default for DigestSection {
    fn default() -> Self {
        Self {
            parallel: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Default settings file location: `<config dir>/digest-tool/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("digest-tool").join("config.toml"))
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| DigestToolError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if a file is there, and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path).map_err(|e| DigestToolError::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text, &path)
    }
}

/// Knobs of the pipeline that do not name inputs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pair_scope: PairScope,
    pub create_missing: bool,
    pub parallel: bool,
    pub progress: bool,
    pub buffer_size: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pair_scope: PairScope::All,
            create_missing: false,
            parallel: true,
            progress: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl RunOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            pair_scope: if settings.ledger.two_slot_compat {
                PairScope::FirstTwo
            } else {
                PairScope::All
            },
            create_missing: settings.ledger.create_missing,
            parallel: settings.digest.parallel,
            progress: false,
            buffer_size: settings.digest.buffer_size,
        }
    }
}

/// Everything one run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub ledger_path: PathBuf,
    pub files: Vec<PathBuf>,
    pub options: RunOptions,
}

impl RunConfig {
    /// Build a config, resolving the algorithm name.
    ///
    /// Fails with `UnsupportedAlgorithm` before any file is touched.
    pub fn new(
        algorithm: &str,
        ledger_path: impl Into<PathBuf>,
        files: Vec<PathBuf>,
        options: RunOptions,
    ) -> Result<Self> {
        if files.is_empty() {
            return Err(DigestToolError::InvalidArguments {
                message: "at least one file to digest is required".to_string(),
            });
        }
        Ok(Self {
            algorithm: algorithm.parse()?,
            ledger_path: ledger_path.into(),
            files,
            options,
        })
    }
}
