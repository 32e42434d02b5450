//! Mod discovery and startup loading

use super::host::ScriptHost;
use crate::runtime::pool::Dispatch;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Finds mod files in one directory and hands each to the worker pool
pub struct ModLoader {
    directory: PathBuf,
    extension: String,
}

impl ModLoader {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        ModLoader {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the mods directory if it does not exist yet
    pub fn ensure_directory(&self) -> io::Result<()> {
        if !self.directory.is_dir() {
            fs::create_dir_all(&self.directory)?;
            info!("Created mods directory {}", self.directory.display());
        }
        Ok(())
    }

    /// Mod files with the configured extension, sorted by file name
    pub fn discover(&self) -> io::Result<Vec<PathBuf>> {
        let mut mods = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.as_str()));
            if matches && path.is_file() {
                mods.push(path);
            }
        }
        mods.sort();
        Ok(mods)
    }

    /// Submit every discovered mod to `dispatcher` without waiting for any
    /// of them. Returns the number of mods submitted.
    ///
    /// A missing or empty directory is only a notice.
    pub fn load_all(&self, host: &ScriptHost, dispatcher: &dyn Dispatch) -> usize {
        if let Err(e) = self.ensure_directory() {
            warn!(
                "Cannot create mods directory {}: {}",
                self.directory.display(),
                e
            );
            return 0;
        }

        let mods = match self.discover() {
            Ok(mods) => mods,
            Err(e) => {
                warn!("Cannot list mods in {}: {}", self.directory.display(), e);
                return 0;
            }
        };

        if mods.is_empty() {
            info!(
                "No .{} mods found in {}",
                self.extension,
                self.directory.display()
            );
            return 0;
        }

        for path in &mods {
            let host = host.clone();
            let label = format!("load {}", path.display());
            let path = path.clone();
            dispatcher.submit(
                &label,
                Box::new(move || host.run_file(&path).map_err(anyhow::Error::from)),
            );
        }

        info!("Loading {} mod(s) from {}", mods.len(), self.directory.display());
        mods.len()
    }
}
