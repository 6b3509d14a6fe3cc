//! Port storage backends.
//!
//! A backend only knows how to hand over the whole collection and take the
//! whole collection back. Sequencing the read-modify-write cycle is the
//! [`PortService`](crate::PortService)'s job.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::error::StoreError;
use crate::port::Port;

/// The storage contract: load everything, save everything.
pub trait PortStorage: Send + Sync {
    fn load(&self) -> Result<Vec<Port>, StoreError>;
    fn save(&self, ports: &[Port]) -> Result<(), StoreError>;
}

// ── JSON file ─────────────────────────────────────────────────────────────────

/// The collection as a pretty-printed JSON array in one file.
///
/// Saves write a sibling `.tmp` file and rename it over the target, so a
/// reader sees either the old array or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and seeds `[]` if the file is missing.
    pub fn ensure_exists(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, "[]")?;
        info!(path = %self.path.display(), "seeded empty port file");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_owned();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PortStorage for JsonFileStore {
    fn load(&self) -> Result<Vec<Port>, StoreError> {
        let content = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn save(&self, ports: &[Port]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(ports)?;
        let tmp = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// An in-process collection behind the same contract. Nothing survives a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ports: Mutex<Vec<Port>>,
}

impl MemoryStore {
    pub fn new(ports: Vec<Port>) -> Self {
        Self { ports: Mutex::new(ports) }
    }
}

impl PortStorage for MemoryStore {
    fn load(&self) -> Result<Vec<Port>, StoreError> {
        Ok(self.ports.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, ports: &[Port]) -> Result<(), StoreError> {
        *self.ports.lock().unwrap_or_else(|e| e.into_inner()) = ports.to_vec();
        Ok(())
    }
}
