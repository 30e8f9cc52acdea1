//! Session orchestration: build a whole tmux session from a `SessionConfig`.
//!
//! Windows are created in declared order. Each one is populated by
//! [`provision_panes`], then labelled and colored. Log streaming and the
//! shell alias come last. Every step waits for tmux before the next starts,
//! since later steps read state (pane handles, positions) that earlier ones
//! produced.

pub mod style;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{DollyError, Result};
use crate::infrastructure::shell::shell_start_command;
use crate::infrastructure::tmux::{Multiplexer, TmuxCommandBuilder};
use crate::layout::panes::{provision_panes, validate_panes, PaneHandles, SettleDelays};
use crate::layout::targeting::window_target;
use crate::rcfile;
use crate::streaming::{self, WindowHandles, STREAM_WINDOW};
use crate::types::config::{SessionConfig, Window};


/// What `create_session` built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub session: String,
    pub windows: usize,
    pub panes: usize,
    /// Alias written to the RC file, when one was configured and written.
    pub alias: Option<String>,
    pub streaming: bool,
}


/// Check everything that can be checked without tmux.
pub fn validate_config(config: &SessionConfig) -> Result<()> {
    if config.session_name.trim().is_empty() {
        return Err(DollyError::EmptySessionName);
    }
    if config.windows.is_empty() {
        return Err(DollyError::NoWindows);
    }
    let mut names: HashSet<&str> = HashSet::new();
    if config.log_stream.enabled {
        names.insert(STREAM_WINDOW);
    }
    for window in &config.windows {
        if !names.insert(window.name.as_str()) {
            return Err(DollyError::DuplicateWindow(window.name.clone()));
        }
        validate_panes(&window.name, &window.panes)?;
    }
    Ok(())
}


/// Kill `session` if it exists. Errors are discarded on purpose: a missing
/// session is the usual case. Returns whether tmux reported a kill.
pub fn kill_session_if_exists(mux: &dyn Multiplexer, session: &str) -> bool {
    match mux.run(&TmuxCommandBuilder::new().kill_session(session)) {
        Ok(_) => {
            info!(session, "killed existing session");
            true
        }
        Err(e) => {
            debug!(session, error = %e, "no existing session to kill");
            false
        }
    }
}


/// Build the session described by `config`, replacing any session of the
/// same name.
pub fn create_session(
    mux: &dyn Multiplexer,
    config: &SessionConfig,
    delays: SettleDelays,
) -> Result<SessionReport> {
    let builder = TmuxCommandBuilder::new();
    let session = config.session_name.as_str();

    kill_session_if_exists(mux, session);

    validate_config(config)?;

    let shell = shell_start_command(config.terminal());
    let mut built = WindowHandles::new();

    let first = &config.windows[0];
    mux.run(&builder.new_session(
        session,
        &first.name,
        first.working_dir(&config.working_directory),
        &shell,
    ))
    .map_err(|e| e.in_window(&first.name))?;
    info!(session, window = %first.name, "created session");
    let handles = build_window(mux, config, first, 0, &shell, delays)?;
    built.insert(first.name.clone(), handles);

    for (index, window) in config.windows.iter().enumerate().skip(1) {
        mux.run(&builder.new_window(
            session,
            &window.name,
            window.working_dir(&config.working_directory),
            &shell,
        ))
        .map_err(|e| e.in_window(&window.name))?;
        let handles = build_window(mux, config, window, index, &shell, delays)?;
        if let Some(root) = handles.root() {
            if let Err(e) = mux.run(&builder.select_pane(root)) {
                debug!(window = %window.name, error = %e, "could not select first pane");
            }
        }
        built.insert(window.name.clone(), handles);
    }
    let panes: usize = built.values().map(PaneHandles::len).sum();

    let streaming = config.log_stream.enabled;
    if streaming {
        streaming::create_streaming_window(mux, config, &shell, delays)?;
        streaming::start_log_streaming(mux, config, Some(&built))?;
        mux.run(&builder.select_window(&window_target(session, STREAM_WINDOW)))?;
    } else {
        mux.run(&builder.select_window(&window_target(session, &first.name)))?;
    }

    let alias = config.rc_file().and_then(|rc| match rcfile::add_alias(rc, session) {
        Ok(name) => {
            if name != session {
                info!(alias = %name, session, "alias name taken; created a disambiguated alias");
            }
            Some(name)
        }
        Err(e) => {
            warn!(rc_file = rc, error = %e, "failed to add shell alias");
            None
        }
    });

    info!(session, windows = config.windows.len(), panes, "session ready");
    Ok(SessionReport {
        session: session.to_string(),
        windows: config.windows.len(),
        panes,
        alias,
        streaming,
    })
}


/// Populate, label and color a window that tmux has just created.
fn build_window(
    mux: &dyn Multiplexer,
    config: &SessionConfig,
    window: &Window,
    index: usize,
    shell: &str,
    delays: SettleDelays,
) -> Result<PaneHandles> {
    let session = config.session_name.as_str();
    let handles = provision_panes(
        mux,
        session,
        &window.name,
        &window.panes,
        &config.working_directory,
        shell,
        delays,
    )?;

    if config.show_pane_labels() {
        style::apply_pane_labels(mux, session, config, window, &handles)
            .map_err(|e| e.in_window(&window.name))?;
    }
    if let Some(color) = style::window_color(config, window, index) {
        style::apply_window_color(mux, session, &window.name, &color)
            .map_err(|e| e.in_window(&window.name))?;
    }
    Ok(handles)
}


/// Tear down a session: drop its alias, its streaming scratch files, then
/// the tmux session itself. Only the kill can fail the call. Returns whether
/// an alias cleanup ran without error.
pub fn terminate_session(mux: &dyn Multiplexer, session: &str, rc_file: Option<&str>) -> Result<bool> {
    let alias_removed = match rc_file {
        Some(rc) => match rcfile::remove_alias(rc, session) {
            Ok(()) => {
                info!(rc_file = rc, session, "shell alias removed");
                true
            }
            Err(e) => {
                warn!(rc_file = rc, error = %e, "failed to remove shell alias");
                false
            }
        },
        None => false,
    };
    streaming::cleanup_stream_artifacts(session);
    mux.run(&TmuxCommandBuilder::new().kill_session(session))?;
    info!(session, "session terminated");
    Ok(alias_removed)
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
