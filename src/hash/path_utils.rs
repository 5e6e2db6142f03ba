// Path utilities for batch file names
// Ledger records are keyed by basename, whichever separator the path used

use std::path::Path;

use super::error::{DigestToolError, Result};

/// Normalize a path string by handling both forward and backward slashes
/// Converts all path separators to `/`
pub fn normalize_path_string(path_str: &str) -> String {
    path_str.replace('\\', "/")
}

/// Basename of a batch path, as recorded in the ledger
///
/// Both `/` and `\` count as separators, so a Windows-style path yields the
/// same name on every platform. Names that the whitespace-delimited ledger
/// format cannot hold are rejected.
pub fn ledger_name(path: &Path) -> Result<String> {
    let raw = path.to_string_lossy();
    let normalized = normalize_path_string(&raw);
    let name = normalized
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .ok_or_else(|| DigestToolError::InvalidArguments {
            message: format!("'{}' does not name a file", raw),
        })?;

    if name.chars().any(char::is_whitespace) {
        return Err(DigestToolError::InvalidArguments {
            message: format!(
                "file name '{}' contains whitespace, which the ledger format cannot record",
                name
            ),
        });
    }

    Ok(name.to_string())
}

/// Display name of a ledger file, without directory and `.txt` extension
pub fn ledger_display_name(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let normalized = normalize_path_string(&raw);
    let name = normalized.rsplit('/').next().unwrap_or_default();
    name.strip_suffix(".txt").unwrap_or(name).to_string()
}
