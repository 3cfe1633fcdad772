//! Named configuration snapshots persisted to disk.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::MetronomeConfig;

/// Most presets the store will hold.
pub const MAX_PRESETS: usize = 10;

/// Errors raised by preset persistence.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("preset limit of {MAX_PRESETS} reached")]
    LimitReached,

    #[error("no preset with id {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A named configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub config: MetronomeConfig,
}

/// On-disk preset collection, written back on every mutation.
pub struct PresetStore {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetStore {
    /// Load the store at `path`.
    ///
    /// A missing file is an empty store; an unreadable or corrupt one is
    /// treated the same way so a bad file never blocks startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let presets = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(presets) => presets,
                Err(err) => {
                    log::warn!("ignoring corrupt preset file {}: {err}", path.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, presets }
    }

    /// Store location under the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tactus").join("presets.json"))
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    /// Snapshot `config` under `name`, returning the new preset's id.
    pub fn save(&mut self, name: &str, config: MetronomeConfig) -> Result<String, PresetError> {
        if self.presets.len() >= MAX_PRESETS {
            return Err(PresetError::LimitReached);
        }
        let id = next_id();
        self.presets.push(Preset {
            id: id.clone(),
            name: name.to_string(),
            config,
        });
        self.persist()?;
        Ok(id)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), PresetError> {
        let preset = self
            .presets
            .iter_mut()
            .find(|preset| preset.id == id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;
        preset.name = name.to_string();
        self.persist()
    }

    pub fn delete(&mut self, id: &str) -> Result<(), PresetError> {
        let before = self.presets.len();
        self.presets.retain(|preset| preset.id != id);
        if self.presets.len() == before {
            return Err(PresetError::NotFound(id.to_string()));
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), PresetError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.presets)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Millisecond timestamp plus a process-local counter, so back-to-back
/// saves still get distinct ids.
fn next_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{millis:x}-{count:x}")
}
