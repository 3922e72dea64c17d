use std::path::PathBuf;

/// Errors that can occur in the headless demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// The requested session was not found in the manifest.
    #[error("session '{id}' not found in manifest")]
    SessionNotFound { id: String },

    /// Failed to parse the manifest.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Failed to load a config or script file.
    #[error("data load error: {0}")]
    DataLoad(#[from] cubetime_data::DataLoadError),

    /// The solve log could not be opened or read back.
    #[error("solve log error: {0}")]
    SolveLog(#[from] cubetime_data::SolveLogError),

    /// The session refused to start.
    #[error(transparent)]
    Orchestrator(#[from] cubetime_core::orchestrator::OrchestratorError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
