//! Quick-build: a session config synthesized from a list of shell commands.

use std::collections::HashSet;

use crate::error::{DollyError, Result};
use crate::types::config::{Pane, SessionConfig, SplitDirection, Window, DEFAULT_TERMINAL};


/// Window every quick-build pane lives in.
pub const EXEC_WINDOW: &str = "exec";

const ID_PREFIX_LEN: usize = 4;
const ID_SUFFIX_LEN: usize = 4;


/// Split a comma-separated `--exec` argument into trimmed, non-empty commands.
pub fn parse_commands(exec: &str) -> Vec<String> {
    exec.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}


/// Short, readable pane id for `command`, unique among `used`.
///
/// Keeps ASCII letters, digits, `-` and `_`. Ids longer than nine characters
/// become `first4..last4`. Collisions get `-2`, `-3`, ... appended.
pub fn generate_pane_id(command: &str, used: &mut HashSet<String>) -> String {
    let mut sanitized: String = command
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if sanitized.is_empty() {
        sanitized = "pane".to_string();
    }

    let base = if sanitized.len() <= ID_PREFIX_LEN + ID_SUFFIX_LEN + 1 {
        sanitized
    } else {
        format!(
            "{}..{}",
            &sanitized[..ID_PREFIX_LEN],
            &sanitized[sanitized.len() - ID_SUFFIX_LEN..]
        )
    };

    let mut id = base.clone();
    let mut counter = 1;
    while used.contains(&id) {
        counter += 1;
        id = format!("{}-{}", base, counter);
    }
    used.insert(id.clone());
    id
}


/// One `exec` window with a pane per command, each split to the right of the
/// one before it.
pub fn build_command_list_config(
    session_name: &str,
    commands: &[String],
    working_dir: Option<&str>,
) -> Result<SessionConfig> {
    if commands.is_empty() {
        return Err(DollyError::NoCommands);
    }
    let working_dir = match working_dir.filter(|d| !d.is_empty()) {
        Some(d) => d.to_string(),
        None => std::env::current_dir()
            .map_err(DollyError::CurrentDir)?
            .to_string_lossy()
            .into_owned(),
    };

    let mut used = HashSet::new();
    let ids: Vec<String> = commands
        .iter()
        .map(|c| generate_pane_id(c, &mut used))
        .collect();

    let panes = commands
        .iter()
        .enumerate()
        .map(|(i, command)| {
            let (split, split_from) = if i == 0 {
                (SplitDirection::None, String::new())
            } else {
                (SplitDirection::Vertical, ids[i - 1].clone())
            };
            Pane {
                id: ids[i].clone(),
                command: command.clone(),
                split: Some(split),
                split_from,
                working_directory: working_dir.clone(),
                ..Pane::default()
            }
        })
        .collect();

    Ok(SessionConfig {
        session_name: session_name.to_string(),
        working_directory: working_dir,
        terminal: DEFAULT_TERMINAL.to_string(),
        windows: vec![Window {
            name: EXEC_WINDOW.to_string(),
            color: None,
            panes,
        }],
        ..SessionConfig::default()
    })
}
