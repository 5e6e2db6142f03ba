// Batch digest module
// Computes one digest per input path, in input order

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use super::digest::{to_hex, DigestEngine};
use super::error::Result;
use super::path_utils;

/// Digest of one batch member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Position of the file in the original input list
    pub index: usize,
    /// Basename the ledger records the file under
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileDigest {
    pub fn hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

/// Ordered set of file digests for one run
///
/// Filtering produces a new batch; members keep their original `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    files: Vec<FileDigest>,
}

impl Batch {
    pub fn new(files: Vec<FileDigest>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[FileDigest] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileDigest> {
        self.files.iter()
    }

    /// A new batch holding only the members `keep` accepts
    pub fn retain(&self, mut keep: impl FnMut(&FileDigest) -> bool) -> Batch {
        Batch {
            files: self.files.iter().filter(|f| keep(f)).cloned().collect(),
        }
    }
}

/// Builds a [`Batch`] from file paths
pub struct BatchBuilder {
    engine: DigestEngine,
    parallel: bool,
    progress: bool,
}

impl BatchBuilder {
    pub fn new(engine: DigestEngine) -> Self {
        Self {
            engine,
            parallel: true,
            progress: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Digest every path; the first unreadable file aborts the whole batch
    ///
    /// Every name is validated before any file is read. Parallel digesting
    /// still yields the batch in input order.
    pub fn build(&self, paths: &[PathBuf]) -> Result<Batch> {
        let names = paths
            .iter()
            .map(|p| path_utils::ledger_name(p))
            .collect::<Result<Vec<_>>>()?;

        let pb = if self.progress {
            let pb = ProgressBar::new(paths.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files | {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let digest_one = |(index, (path, name)): (usize, (&PathBuf, String))| -> Result<FileDigest> {
            pb.set_message(name.clone());
            let bytes = self.engine.digest_file(path)?;
            pb.inc(1);
            Ok(FileDigest { index, name, bytes })
        };

        let pairs = paths.iter().zip(names);
        let files: Result<Vec<FileDigest>> = if self.parallel {
            pairs
                .enumerate()
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(digest_one)
                .collect()
        } else {
            pairs.enumerate().map(digest_one).collect()
        };

        pb.finish_and_clear();
        Ok(Batch::new(files?))
    }
}
