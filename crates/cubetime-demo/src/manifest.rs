use serde::Deserialize;
use std::path::Path;

use cubetime_data::{SessionScript, TimerConfig};

use crate::error::DemoError;

/// Top-level manifest listing all scripted sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionManifest {
    pub title: String,
    pub description: String,
    /// Config file relative to the sessions directory. When absent a
    /// `timer.*` file in that directory is used, or the defaults.
    #[serde(default)]
    pub config: Option<String>,
    pub sessions: Vec<SessionEntry>,
}

/// An entry in the manifest pointing to a script file.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Script path relative to the sessions directory.
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SessionManifest {
    pub fn entry(&self, id: &str) -> Result<&SessionEntry, DemoError> {
        self.sessions
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| DemoError::SessionNotFound { id: id.to_string() })
    }

    pub fn load_config(&self, sessions_dir: &Path) -> Result<TimerConfig, DemoError> {
        match &self.config {
            Some(file) => Ok(TimerConfig::load(&sessions_dir.join(file))?),
            None => Ok(TimerConfig::discover(sessions_dir)?),
        }
    }

    pub fn load_script(&self, sessions_dir: &Path, id: &str) -> Result<SessionScript, DemoError> {
        let entry = self.entry(id)?;
        Ok(SessionScript::load(&sessions_dir.join(&entry.path))?)
    }
}

/// Load the session manifest from a `manifest.ron` file.
pub fn load_manifest(sessions_dir: &Path) -> Result<SessionManifest, DemoError> {
    let path = sessions_dir.join("manifest.ron");
    let content = std::fs::read_to_string(&path)?;
    ron::from_str(&content).map_err(|e| DemoError::Parse {
        file: path,
        detail: e.to_string(),
    })
}
