//! Interactive questions asked in `--exec` mode.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use dolly_core::{DollyError, Result};


fn prompt_error(e: dialoguer::Error) -> DollyError {
    DollyError::Prompt(e.to_string())
}


/// Ask for a session name. Blank answers are rejected.
pub fn session_name() -> Result<String> {
    let name: String = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter session name")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DollyError::EmptySessionName);
    }
    Ok(name)
}


pub fn confirm_save() -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Save session configuration to YAML file?")
        .default(false)
        .interact()
        .map_err(prompt_error)
}


/// Ask where to save the config; an empty answer takes `default_path`.
pub fn config_path(default_path: &str) -> Result<String> {
    let path: String = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter config file path")
        .default(default_path.to_string())
        .interact_text()
        .map_err(prompt_error)?;
    let path = path.trim();
    Ok(if path.is_empty() { default_path.to_string() } else { path.to_string() })
}
