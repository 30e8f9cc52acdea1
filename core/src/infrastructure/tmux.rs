//! tmux process access.
//!
//! Everything Dolly asks of tmux goes through the [`Multiplexer`] trait: one
//! call is one `tmux` invocation, blocking until it exits. [`TmuxCli`] is the
//! real implementation; [`TmuxCommandBuilder`] produces the argument vector of
//! every request so the call sites read as a list of tmux operations.

use std::process::Command;

use tracing::debug;

use crate::error::{DollyError, Result};


/// A sink for tmux requests. Returns the process's stdout on success.
pub trait Multiplexer {
    fn run(&self, args: &[String]) -> Result<String>;
}


/// Runs the `tmux` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct TmuxCli {
    program: String,
    socket: Option<String>,
}

impl TmuxCli {
    pub fn new() -> Self {
        TmuxCli::with_program("tmux")
    }

    /// Use a different binary (e.g. a wrapper script).
    pub fn with_program(program: impl Into<String>) -> Self {
        TmuxCli {
            program: program.into(),
            socket: None,
        }
    }

    /// Talk to the server on the named socket (`tmux -L <name>`) instead of
    /// the default one.
    pub fn on_socket(mut self, name: impl Into<String>) -> Self {
        self.socket = Some(name.into());
        self
    }
}

impl Default for TmuxCli {
    fn default() -> Self {
        TmuxCli::new()
    }
}

impl Multiplexer for TmuxCli {
    fn run(&self, args: &[String]) -> Result<String> {
        debug!(args = ?args, "{}", self.program);
        let mut cmd = Command::new(&self.program);
        if let Some(socket) = &self.socket {
            cmd.args(["-L", socket.as_str()]);
        }
        let output = cmd
            .args(args)
            .output()
            .map_err(DollyError::Spawn)?;
        if !output.status.success() {
            return Err(DollyError::Tmux {
                command: args.first().cloned().unwrap_or_default(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}


/// Builds tmux argument vectors. Holds no state; exists so every tmux verb
/// Dolly uses is spelled out in one place.
#[derive(Debug, Clone, Copy, Default)]
pub struct TmuxCommandBuilder;

impl TmuxCommandBuilder {
    pub fn new() -> Self {
        TmuxCommandBuilder
    }

    pub fn kill_session(&self, session: &str) -> Vec<String> {
        args(&["kill-session", "-t", session])
    }

    pub fn new_session(&self, session: &str, window: &str, dir: &str, shell: &str) -> Vec<String> {
        let mut v = args(&["new-session", "-d", "-s", session, "-n", window]);
        push_dir(&mut v, dir);
        v.push(shell.to_string());
        v
    }

    /// `session:` (trailing colon) keeps tmux from reading the session name
    /// as a window name when the two collide.
    pub fn new_window(&self, session: &str, window: &str, dir: &str, shell: &str) -> Vec<String> {
        let mut v = args(&["new-window", "-t", &format!("{}:", session), "-n", window]);
        push_dir(&mut v, dir);
        v.push(shell.to_string());
        v
    }

    /// Create a window directly in front of `before`, shifting it and every
    /// later window up one index.
    pub fn new_window_before(&self, session: &str, before: &str, window: &str, dir: &str, shell: &str) -> Vec<String> {
        let mut v = args(&["new-window", "-b", "-t", &format!("{}:{}", session, before), "-n", window]);
        push_dir(&mut v, dir);
        v.push(shell.to_string());
        v
    }

    /// Split `source` (a stable pane handle) and print the new pane's handle.
    pub fn split_window(&self, source: &str, flag: &str, dir: &str, shell: &str) -> Vec<String> {
        let mut v = args(&["split-window", "-t", source, flag, "-P", "-F", "#{pane_id}"]);
        push_dir(&mut v, dir);
        v.push(shell.to_string());
        v
    }

    pub fn pane_handle(&self, target: &str) -> Vec<String> {
        args(&["display-message", "-p", "-t", target, "#{pane_id}"])
    }

    pub fn pane_index(&self, handle: &str) -> Vec<String> {
        args(&["display-message", "-p", "-t", handle, "#{pane_index}"])
    }

    /// Type `text` into `target` as literal characters; key names such as
    /// `Enter` or `C-c` are not interpreted.
    pub fn send_literal(&self, target: &str, text: &str) -> Vec<String> {
        args(&["send-keys", "-t", target, "-l", text])
    }

    pub fn press_enter(&self, target: &str) -> Vec<String> {
        args(&["send-keys", "-t", target, "Enter"])
    }

    pub fn set_window_option(&self, target: &str, option: &str, value: &str) -> Vec<String> {
        args(&["set-window-option", "-t", target, option, value])
    }

    pub fn set_pane_option(&self, handle: &str, option: &str, value: &str) -> Vec<String> {
        args(&["set-option", "-p", "-t", handle, option, value])
    }

    pub fn set_pane_title(&self, handle: &str, title: &str) -> Vec<String> {
        args(&["select-pane", "-t", handle, "-T", title])
    }

    pub fn select_pane(&self, target: &str) -> Vec<String> {
        args(&["select-pane", "-t", target])
    }

    pub fn select_window(&self, target: &str) -> Vec<String> {
        args(&["select-window", "-t", target])
    }

}


fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn push_dir(v: &mut Vec<String>, dir: &str) {
    if !dir.is_empty() {
        v.push("-c".into());
        v.push(dir.to_string());
    }
}


/// First non-empty line of a tmux reply, trimmed.
pub fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|l| !l.is_empty())
}


/// Type a line of text into `target` and submit it.
pub fn type_line(mux: &dyn Multiplexer, target: &str, text: &str) -> Result<()> {
    let builder = TmuxCommandBuilder::new();
    mux.run(&builder.send_literal(target, text))?;
    mux.run(&builder.press_enter(target))?;
    Ok(())
}


/// Run a query whose reply is a single value and return it.
pub fn query(mux: &dyn Multiplexer, request: &[String]) -> Result<Option<String>> {
    let out = mux.run(request)?;
    Ok(first_line(&out).map(str::to_string))
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
