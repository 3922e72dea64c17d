//! Reading data files in any of the supported formats.
//!
//! The format follows the extension: `.ron`, `.toml` or `.json`. A file
//! looked up by stem (`timer` for `timer.ron` and friends) must exist in at
//! most one format.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("{file}: extension is not one of ron, toml, json")]
    UnknownExtension { file: PathBuf },

    #[error("'{stem}' exists in more than one format: {found:?}")]
    Ambiguous { stem: String, found: Vec<PathBuf> },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Parsed, but a value is out of range.
    #[error("invalid value in {file}: {detail}")]
    Invalid { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    pub fn of(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|format| Some(format.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnknownExtension {
                file: path.to_path_buf(),
            })
    }

    /// Deserialize `text`. `file` only labels errors.
    pub fn parse<T: DeserializeOwned>(self, text: &str, file: &Path) -> Result<T, DataLoadError> {
        let detail = match self {
            Format::Ron => ron::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        detail.map_err(|detail| DataLoadError::Parse {
            file: file.to_path_buf(),
            detail,
        })
    }
}

/// The file in `dir` named `stem` with a supported extension, if any.
pub fn locate(dir: &Path, stem: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let found: Vec<PathBuf> = Format::ALL
        .into_iter()
        .map(|format| dir.join(format!("{stem}.{}", format.extension())))
        .filter(|candidate| candidate.is_file())
        .collect();
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.into_iter().next()),
        _ => Err(DataLoadError::Ambiguous {
            stem: stem.to_string(),
            found,
        }),
    }
}

/// Read `path` and deserialize it in the format its extension names.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::of(path)?;
    let text = std::fs::read_to_string(path)?;
    debug!(file = %path.display(), ?format, "data file read");
    format.parse(&text, path)
}
