//! Temporary output directories.
//!
//! Results are assembled in `<output>.tmp.<secs>` next to the final output and
//! only moved into place once the whole run succeeded. An existing output is
//! moved aside to `<output>.bck.<secs>` first.

use crate::error::XfmError;
use crate::services::storage::unix_secs;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub struct Workspace {
    output: PathBuf,
    tmp: PathBuf,
    keep: bool,
    finalized: bool,
}

impl Workspace {
    pub fn create(output: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let stamp = unix_secs();
        let mut n = 0u32;
        let tmp = loop {
            let candidate = sibling(output, "tmp", stamp, n);
            match std::fs::create_dir(&candidate) {
                Ok(()) => break candidate,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        };
        tracing::info!("using temporary directory {}", tmp.display());
        Ok(Self {
            output: output.to_path_buf(),
            tmp,
            keep: false,
            finalized: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.tmp
    }

    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.tmp.join(rel)
    }

    pub fn mkdir(&self, rel: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let dir = self.tmp.join(rel);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Leave the directory on disk if the run does not finish.
    pub fn keep(&mut self) {
        self.keep = true;
    }

    /// Removes the directory now, for runs whose results live elsewhere.
    pub fn discard(mut self) -> anyhow::Result<()> {
        std::fs::remove_dir_all(&self.tmp)?;
        self.finalized = true;
        Ok(())
    }

    /// Moves the assembled directory to the output path. Returns where a
    /// previous output was backed up to, if any.
    pub fn finalize(mut self, backup: bool) -> anyhow::Result<Option<PathBuf>> {
        let mut backed_up = None;
        if self.output.exists() {
            if backup {
                let stamp = unix_secs();
                let mut n = 0u32;
                let mut target = sibling(&self.output, "bck", stamp, n);
                while target.exists() {
                    n += 1;
                    target = sibling(&self.output, "bck", stamp, n);
                }
                tracing::info!("backing up existing output to {}", target.display());
                std::fs::rename(&self.output, &target)?;
                backed_up = Some(target);
            } else if self.output.is_dir() {
                std::fs::remove_dir_all(&self.output)?;
            } else {
                std::fs::remove_file(&self.output)?;
            }
        }
        std::fs::rename(&self.tmp, &self.output)?;
        self.finalized = true;
        Ok(backed_up)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        if self.keep {
            tracing::warn!("leaving temporary directory {}", self.tmp.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.tmp) {
            tracing::debug!("could not remove {}: {}", self.tmp.display(), e);
        }
    }
}

fn sibling(output: &Path, kind: &str, stamp: u64, n: u32) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(format!(".{kind}.{stamp}"));
    if n > 0 {
        name.push(format!(".{n}"));
    }
    PathBuf::from(name)
}

/// Fails on the first path that does not exist.
pub fn require_inputs(paths: &[&Path]) -> Result<(), XfmError> {
    match paths.iter().find(|p| !p.exists()) {
        Some(missing) => Err(XfmError::MissingInput(missing.to_path_buf())),
        None => Ok(()),
    }
}
