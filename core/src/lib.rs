//! Dolly builds tmux sessions from declarative layout documents.
//!
//! A [`types::config::SessionConfig`] describes windows and panes. The
//! [`session`] module validates it and drives tmux through the
//! [`infrastructure::tmux::Multiplexer`] seam; [`sys::Sys`] dispatches the
//! typed [`command::Command`]s the CLI produces.

pub mod command;
pub mod data;
pub mod error;
pub mod infrastructure;
pub mod layout;
pub mod rcfile;
pub mod session;
pub mod streaming;
pub mod sys;
pub mod types;

pub use error::{DollyError, Result};
