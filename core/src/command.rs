//! Command: the typed interface for every Dolly operation.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    /// Build the session described by a YAML config file.
    #[serde(rename = "session.create")]
    SessionCreate {
        config: String,
    },

    /// Build a one-window session with a pane per shell command.
    #[serde(rename = "session.exec")]
    SessionExec {
        name: String,
        commands: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },

    /// Kill the session named in a config file, dropping its shell alias.
    #[serde(rename = "session.terminate")]
    SessionTerminate {
        config: String,
    },

    /// Kill a session by name. No RC file is touched.
    #[serde(rename = "session.kill")]
    SessionKill {
        name: String,
    },
}


/// Outcome of one command: text for stdout, or an error message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok { output: String },
    Error { message: String },
}

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}
