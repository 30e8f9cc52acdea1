//! Log streaming: a `logs` window that tails selected panes.
//!
//! Dolly only picks the panes and launches the monitoring helper; merging,
//! tailing and filtering happen inside the helper, which is invoked as
//!
//! ```text
//! <monitor> <session> [--grep <keyword>... --] <pane handle>...
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;

use tracing::{debug, info, warn};

use crate::error::{DollyError, Result};
use crate::infrastructure::tmux::{query, type_line, Multiplexer, TmuxCommandBuilder};
use crate::layout::panes::{pane_id, PaneHandles, SettleDelays};
use crate::layout::targeting::{is_pane_handle, pane_target, window_target};
use crate::types::config::SessionConfig;


/// Name of the window the helper runs in.
pub const STREAM_WINDOW: &str = "logs";

const WILDCARD: &str = "*";


/// Pane handles recorded while building a session, keyed by window name.
pub type WindowHandles = HashMap<String, PaneHandles>;


fn matches(filter: &[String], name: &str) -> bool {
    filter.iter().any(|f| f == WILDCARD || f == name)
}


/// Handles of every pane selected by the `log_stream` window and pane filters.
///
/// When `known` holds the handles recorded at creation time they are used
/// directly; otherwise each pane is looked up by its declared position.
/// Panes that cannot be resolved are skipped with a warning.
pub fn select_stream_targets(
    mux: &dyn Multiplexer,
    config: &SessionConfig,
    known: Option<&WindowHandles>,
) -> Result<Vec<String>> {
    let filter = &config.log_stream;
    let builder = TmuxCommandBuilder::new();
    let session = config.session_name.as_str();
    let mut targets = Vec::new();

    for window in &config.windows {
        if !matches(&filter.windows, &window.name) {
            continue;
        }
        let recorded = known.and_then(|k| k.get(&window.name));
        for (position, pane) in window.panes.iter().enumerate() {
            let id = pane_id(pane, position);
            if !matches(&filter.panes, &id) {
                continue;
            }
            let handle = match recorded {
                Some(handles) => handles.get(&id).map(str::to_string),
                None => {
                    let target = pane_target(session, &window.name, position as u32);
                    match query(mux, &builder.pane_handle(&target)) {
                        Ok(reply) => reply.filter(|h| is_pane_handle(h)),
                        Err(e) => {
                            debug!(target = %target, error = %e, "pane handle lookup failed");
                            None
                        }
                    }
                }
            };
            match handle {
                Some(h) => targets.push(h),
                None => warn!(window = %window.name, pane = %id, "could not resolve pane; not streaming it"),
            }
        }
    }

    if targets.is_empty() {
        return Err(DollyError::NothingToStream);
    }
    Ok(targets)
}


/// Command line that starts the monitoring helper.
pub fn build_streaming_command(monitor: &str, session: &str, targets: &[String], keywords: &[String]) -> String {
    let mut args: Vec<String> = vec![shell_quote(monitor), shell_quote(session)];
    if !keywords.is_empty() {
        args.push("--grep".into());
        args.extend(keywords.iter().map(|k| shell_quote(k)));
        args.push("--".into());
    }
    args.extend(targets.iter().map(|t| shell_quote(t)));
    args.join(" ")
}


/// Quote `s` for a POSIX shell unless it is made only of safe characters.
/// A leading `~/` stays bare so the shell still expands it.
fn shell_quote(s: &str) -> String {
    if let Some(rest) = s.strip_prefix("~/") {
        return format!("~/{}", shell_quote(rest));
    }
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "%+-./:=@_".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}


/// Create the `logs` window in front of the user's first window.
///
/// The window is inserted with `new-window -b`, so it lands first whatever
/// index the session's windows start from.
pub fn create_streaming_window(
    mux: &dyn Multiplexer,
    config: &SessionConfig,
    shell: &str,
    delays: SettleDelays,
) -> Result<()> {
    let first = config.windows.first().ok_or(DollyError::NoWindows)?;
    let request = TmuxCommandBuilder::new().new_window_before(
        &config.session_name,
        &first.name,
        STREAM_WINDOW,
        &config.working_directory,
        shell,
    );
    mux.run(&request).map_err(|e| e.in_window(STREAM_WINDOW))?;
    if !delays.window.is_zero() {
        thread::sleep(delays.window);
    }
    Ok(())
}


/// Pick the panes to stream and start the helper in the `logs` window.
pub fn start_log_streaming(
    mux: &dyn Multiplexer,
    config: &SessionConfig,
    known: Option<&WindowHandles>,
) -> Result<()> {
    let targets = select_stream_targets(mux, config, known)?;
    let command = build_streaming_command(
        config.log_stream.monitor_path(),
        &config.session_name,
        &targets,
        &config.log_stream.grep,
    );
    info!(session = %config.session_name, panes = targets.len(), "starting log stream");
    let target = window_target(&config.session_name, STREAM_WINDOW);
    type_line(mux, &target, &command).map_err(|e| e.in_window(STREAM_WINDOW))?;
    Ok(())
}


/// Scratch directory the helper keeps its per-pane pipes in.
pub fn stream_artifacts_dir(session: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dolly-stream-{}", session))
}


/// Remove the helper's scratch directory. Returns whether anything was removed.
pub fn cleanup_stream_artifacts(session: &str) -> bool {
    let dir = stream_artifacts_dir(session);
    if !dir.exists() {
        return false;
    }
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => {
            debug!(dir = %dir.display(), "removed stream artifacts");
            true
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "could not remove stream artifacts");
            false
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
