use crate::command::{Command, Response};
use crate::data::builder::build_command_list_config;
use crate::data::loader::load_config;
use crate::error::{DollyError, Result};
use crate::infrastructure::tmux::{Multiplexer, TmuxCli};
use crate::layout::panes::SettleDelays;
use crate::session::{create_session, terminate_session, SessionReport};
use crate::types::config::SessionConfig;


/// Central runtime for Dolly. Dispatches session commands to a multiplexer.
pub struct Sys<M: Multiplexer = TmuxCli> {
    mux: M,
    delays: SettleDelays,
    built: Option<SessionConfig>,
}


impl Sys<TmuxCli> {
    pub fn new() -> Sys<TmuxCli> {
        Sys::with_multiplexer(TmuxCli::new(), SettleDelays::standard())
    }
}

impl Default for Sys<TmuxCli> {
    fn default() -> Self {
        Sys::new()
    }
}


impl<M: Multiplexer> Sys<M> {
    pub fn with_multiplexer(mux: M, delays: SettleDelays) -> Sys<M> {
        Sys {
            mux,
            delays,
            built: None,
        }
    }

    pub fn multiplexer(&self) -> &M {
        &self.mux
    }

    /// The single dispatch method.
    pub fn execute(&mut self, cmd: Command) -> Response {
        let result = match cmd {
            Command::SessionCreate { config } => self.cmd_create(&config),
            Command::SessionExec { name, commands, cwd } => self.cmd_exec(&name, &commands, cwd.as_deref()),
            Command::SessionTerminate { config } => self.cmd_terminate(&config),
            Command::SessionKill { name } => self.cmd_kill(&name),
        };
        match result {
            Ok(output) => Response::Ok { output },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    /// Take the config synthesized by the last successful `SessionExec`.
    pub fn take_built_config(&mut self) -> Option<SessionConfig> {
        self.built.take()
    }

    // -----------------------------------------------------------------------
    // Session commands
    // -----------------------------------------------------------------------

    fn cmd_create(&mut self, path: &str) -> Result<String> {
        let config = load_config(path)?;
        let report = create_session(&self.mux, &config, self.delays)?;
        let mut lines = vec![format!(
            "Tmux session '{}' created successfully with terminal '{}'!",
            report.session,
            config.terminal()
        )];
        lines.extend(alias_notes(&config, &report));
        Ok(lines.join("\n"))
    }

    fn cmd_exec(&mut self, name: &str, commands: &[String], cwd: Option<&str>) -> Result<String> {
        if name.trim().is_empty() {
            return Err(DollyError::EmptySessionName);
        }
        let config = build_command_list_config(name.trim(), commands, cwd)?;
        let report = create_session(&self.mux, &config, self.delays)?;
        self.built = Some(config);
        Ok(format!("Tmux session '{}' created successfully!", report.session))
    }

    fn cmd_terminate(&mut self, path: &str) -> Result<String> {
        let config = load_config(path)?;
        let rc = config.rc_file();
        let alias_removed = terminate_session(&self.mux, &config.session_name, rc)?;
        let mut lines = Vec::new();
        if let (true, Some(rc)) = (alias_removed, rc) {
            lines.push(format!("Shell alias removed from {}", rc));
            lines.push(format!("Run 'source {}' or restart your shell to refresh", rc));
        }
        lines.push(format!("Tmux session '{}' terminated successfully!", config.session_name));
        Ok(lines.join("\n"))
    }

    fn cmd_kill(&mut self, name: &str) -> Result<String> {
        terminate_session(&self.mux, name, None)?;
        Ok(format!("Tmux session '{}' terminated successfully!", name))
    }
}


fn alias_notes(config: &SessionConfig, report: &SessionReport) -> Vec<String> {
    let (Some(alias), Some(rc)) = (report.alias.as_deref(), config.rc_file()) else {
        return Vec::new();
    };
    let mut notes = Vec::new();
    if alias != report.session {
        notes.push(format!(
            "Note: Created alias '{}' (conflict with existing '{}')",
            alias, report.session
        ));
    }
    notes.push(format!("Shell alias '{}' added to {}", alias, rc));
    notes.push(format!("Run 'source {}' or restart your shell to use it", rc));
    notes
}
