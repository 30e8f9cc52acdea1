//! Error type shared by every Dolly operation.

use std::path::PathBuf;

use thiserror::Error;


pub type Result<T> = std::result::Result<T, DollyError>;


#[derive(Debug, Error)]
pub enum DollyError {
    // -----------------------------------------------------------------
    // Validation (raised before tmux is touched)
    // -----------------------------------------------------------------

    #[error("duplicate pane id '{id}' in window '{window}'")]
    DuplicatePaneId { window: String, id: String },

    #[error("pane '{pane}' in window '{window}' splits from '{split_from}': {reason}")]
    UnresolvedSplit {
        window: String,
        pane: String,
        split_from: String,
        reason: String,
    },

    #[error("duplicate window name '{0}'")]
    DuplicateWindow(String),

    #[error("no windows defined in config")]
    NoWindows,

    #[error("no commands provided")]
    NoCommands,

    #[error("session name cannot be empty")]
    EmptySessionName,

    // -----------------------------------------------------------------
    // External process
    // -----------------------------------------------------------------

    #[error("failed to run tmux: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("tmux {command} failed: {stderr}")]
    Tmux { command: String, stderr: String },

    #[error("tmux returned no pane handle for {target}")]
    MissingHandle { target: String },

    #[error("pane '{pane}' in window '{window}': {source}")]
    Pane {
        window: String,
        pane: String,
        #[source]
        source: Box<DollyError>,
    },

    #[error("window '{window}': {source}")]
    Window {
        window: String,
        #[source]
        source: Box<DollyError>,
    },

    #[error("no panes found to stream from")]
    NothingToStream,

    // -----------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("RC file not found: {0}. Please create it first")]
    RcFileMissing(PathBuf),

    #[error("invalid alias pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to get current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(String),
}


impl DollyError {
    /// Attach the failing pane to an error raised while provisioning it.
    pub fn in_pane(self, window: &str, pane: &str) -> DollyError {
        DollyError::Pane {
            window: window.to_string(),
            pane: pane.to_string(),
            source: Box::new(self),
        }
    }

    /// Attach the window being built to an error.
    pub fn in_window(self, window: &str) -> DollyError {
        DollyError::Window {
            window: window.to_string(),
            source: Box::new(self),
        }
    }

    /// True for errors detected from the configuration alone.
    pub fn is_validation(&self) -> bool {
        match self {
            DollyError::DuplicatePaneId { .. }
            | DollyError::UnresolvedSplit { .. }
            | DollyError::DuplicateWindow(_)
            | DollyError::NoWindows
            | DollyError::NoCommands
            | DollyError::EmptySessionName => true,
            DollyError::Pane { source, .. } | DollyError::Window { source, .. } => {
                source.is_validation()
            }
            _ => false,
        }
    }
}
