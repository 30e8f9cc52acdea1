//! Shell alias management in an RC file.
//!
//! Every alias Dolly writes carries a trailing `# dolly-managed: <session>`
//! marker. Only marked lines are ever rewritten or removed; a user's own
//! alias of the same name is left alone and Dolly picks a suffixed name.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::data::loader::expand_tilde;
use crate::error::{DollyError, Result};


const MANAGED_MARKER: &str = "dolly-managed:";
const MAX_SUFFIX: u32 = 99;


pub fn attach_command(session: &str) -> String {
    format!("tmux attach -t {}", session)
}


fn alias_line(name: &str, session: &str) -> String {
    format!(
        "alias {}='{}' # {} {}",
        name,
        attach_command(session),
        MANAGED_MARKER,
        session
    )
}


fn managed_pattern(session: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"^\s*alias\s+([^=\s]+)=.*#\s*{}\s*{}\s*$",
        regex::escape(MANAGED_MARKER),
        regex::escape(session)
    ))?)
}


fn defines_alias(content: &str, name: &str) -> Result<bool> {
    let pattern = Regex::new(&format!(r"^\s*alias\s+{}=", regex::escape(name)))?;
    Ok(content.lines().any(|line| pattern.is_match(line)))
}


/// Name of the alias already managed for `session`, if any.
fn managed_alias_name(content: &str, session: &str) -> Result<Option<String>> {
    let pattern = managed_pattern(session)?;
    Ok(content
        .lines()
        .find_map(|line| pattern.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}


/// First of `<base>-dolly`, `<base>-dolly-1` .. `<base>-dolly-99` not yet
/// defined in `content`. Falls back to `<base>-dolly-99`.
fn next_available_alias(content: &str, base: &str) -> Result<String> {
    let first = format!("{}-dolly", base);
    if !defines_alias(content, &first)? {
        return Ok(first);
    }
    for n in 1..MAX_SUFFIX {
        let candidate = format!("{}-dolly-{}", base, n);
        if !defines_alias(content, &candidate)? {
            return Ok(candidate);
        }
    }
    Ok(format!("{}-dolly-{}", base, MAX_SUFFIX))
}


/// `content` without the managed lines for `session`, or `None` if it has
/// none.
fn strip_managed(content: &str, session: &str) -> Result<Option<String>> {
    let pattern = managed_pattern(session)?;
    let lines: Vec<&str> = content.split('\n').collect();
    let kept: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| !pattern.is_match(line))
        .collect();
    if kept.len() == lines.len() {
        return Ok(None);
    }
    Ok(Some(kept.join("\n")))
}


fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| DollyError::Read {
        path: path.to_path_buf(),
        source,
    })
}


fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| DollyError::Write {
        path: path.to_path_buf(),
        source,
    })
}


/// Append an attach alias for `session` to the RC file and return the alias
/// name used. Re-adding replaces the previous managed line for the session.
pub fn add_alias(rc_path: &str, session: &str) -> Result<String> {
    let path = expand_tilde(rc_path)?;
    if !path.exists() {
        return Err(DollyError::RcFileMissing(path));
    }
    let mut content = read(&path)?;

    let name = match managed_alias_name(&content, session)? {
        Some(existing) => {
            if let Some(stripped) = strip_managed(&content, session)? {
                content = stripped;
            }
            debug!(alias = %existing, session, "replacing managed alias");
            existing
        }
        None if defines_alias(&content, session)? => next_available_alias(&content, session)?,
        None => session.to_string(),
    };

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&alias_line(&name, session));
    content.push('\n');
    write(&path, &content)?;
    Ok(name)
}


/// Drop the managed alias lines for `session`. A missing RC file is not an
/// error, and the file is not rewritten when nothing matches.
pub fn remove_alias(rc_path: &str, session: &str) -> Result<()> {
    let path = expand_tilde(rc_path)?;
    if !path.exists() {
        return Ok(());
    }
    let content = read(&path)?;
    match strip_managed(&content, session)? {
        Some(stripped) => write(&path, &stripped),
        None => Ok(()),
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
