//! Reading and writing session configs as YAML.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DollyError, Result};
use crate::types::config::{SessionConfig, DEFAULT_TERMINAL};


/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };
    let home = dirs::home_dir().ok_or(DollyError::NoHomeDir)?;
    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}


/// Parse a config document. `source` only labels errors.
pub fn parse_config(text: &str, source: &Path) -> Result<SessionConfig> {
    let mut config: SessionConfig = serde_yaml::from_str(text).map_err(|e| DollyError::Parse {
        path: source.to_path_buf(),
        source: e,
    })?;
    if config.terminal.trim().is_empty() {
        config.terminal = DEFAULT_TERMINAL.to_string();
    }
    Ok(config)
}


pub fn load_config(path: impl AsRef<Path>) -> Result<SessionConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DollyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text, path)?;
    debug!(path = %path.display(), session = %config.session_name, "loaded config");
    Ok(config)
}


/// Write `config` as YAML, creating parent directories as needed. Returns
/// the path actually written.
pub fn save_config(config: &SessionConfig, path: &str) -> Result<PathBuf> {
    let path = expand_tilde(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DollyError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = serde_yaml::to_string(config).map_err(DollyError::Serialize)?;
    std::fs::write(&path, text).map_err(|source| DollyError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "saved config");
    Ok(path)
}
