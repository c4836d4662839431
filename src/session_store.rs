use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key/value slots that live for one browsing session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()>;

    fn remove(&mut self, key: &str) -> anyhow::Result<()>;

    /// Read a slot and clear it in one step
    fn take(&mut self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        if let Err(e) = self.remove(key) {
            log::error!("Failed to clear session slot {key}: {e}");
        }
        Some(value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    slots: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        self.slots.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Session slots kept in a JSON file so consecutive runs of the sidebar in
/// one terminal session can hand state to each other.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileSessionStore {
    slots: HashMap<String, String>,

    #[serde(skip)]
    file_path: Option<String>,
}

pub fn default_session_path() -> PathBuf {
    std::env::temp_dir().join("tocbar-session.json")
}

impl FileSessionStore {
    pub fn ephemeral() -> Self {
        Self {
            slots: HashMap::new(),
            file_path: None,
        }
    }

    pub fn with_file(file_path: &str) -> Self {
        Self {
            slots: HashMap::new(),
            file_path: Some(file_path.to_string()),
        }
    }

    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load session state from {path}: {e}");
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if path.exists() {
            let content = fs::read_to_string(path)?;

            match serde_json::from_str::<Self>(&content) {
                Ok(mut store) => {
                    store.file_path = Some(file_path.to_string());
                    Ok(store)
                }
                Err(e) => {
                    log::error!("Failed to parse session file: {e}");
                    Err(anyhow::anyhow!("Failed to parse session state: {}", e))
                }
            }
        } else {
            Ok(Self::with_file(file_path))
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        match &self.file_path {
            Some(path) => {
                let content = serde_json::to_string_pretty(self)?;
                fs::write(path, content)?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    /// Memory and file agree afterwards: a failed write takes the new value back out.
    fn set(&mut self, key: &str, value: String) -> anyhow::Result<()> {
        let previous = self.slots.insert(key.to_string(), value);
        if let Err(e) = self.save() {
            match previous {
                Some(previous) => self.slots.insert(key.to_string(), previous),
                None => self.slots.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// The slot is gone from memory even when the file cannot be rewritten.
    /// In that case the file itself is deleted so a stale slot is never read
    /// back by the next run.
    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        if self.slots.remove(key).is_none() {
            return Ok(());
        }
        let Err(e) = self.save() else {
            return Ok(());
        };
        if let Some(path) = &self.file_path {
            if Path::new(path).exists() {
                match fs::remove_file(path) {
                    Ok(()) => log::warn!("Dropped session file {path} after failed rewrite: {e}"),
                    Err(remove_err) => {
                        log::error!("Session file {path} still holds {key}: {remove_err}")
                    }
                }
            }
        }
        Err(e)
    }
}
