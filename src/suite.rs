//! # Test runner adapter.
//!
//! [`Suite`] is a thin adapter with one contract: a list of test files in,
//! a failure count out. Each file is executed as its own child process, in
//! the order given; a nonzero exit status counts as one failure. Output
//! streams are inherited so the tests' own reporting stays visible.
//!
//! Duplicate paths are not deduplicated: the same file loaded twice runs
//! twice and each run contributes to the count.

use std::path::PathBuf;

use tokio::process::Command;

use crate::error::RigError;

/// An ordered collection of test files to execute.
#[derive(Debug, Default)]
pub struct Suite {
    files: Vec<PathBuf>,
}

impl Suite {
    /// Creates an empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a test file. Order is preserved; duplicates are kept.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    /// Number of loaded test files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true when no files are loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Executes every loaded file and returns the failure count.
    ///
    /// A test that *fails* (nonzero exit) is counted, not raised; a test
    /// file that cannot be launched at all is a [`RigError::Suite`].
    pub async fn run(&self) -> Result<u32, RigError> {
        let mut failures: u32 = 0;
        for file in &self.files {
            let status = Command::new(file)
                .status()
                .await
                .map_err(|source| RigError::Suite {
                    file: file.clone(),
                    source,
                })?;
            if !status.success() {
                failures += 1;
            }
        }
        Ok(failures)
    }
}
