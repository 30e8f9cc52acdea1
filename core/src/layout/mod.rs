//! Window layout: pane targeting and pane provisioning.
//!
//! The `targeting` module formats tmux target strings and validates the
//! stable pane handles tmux reports. The `panes` module validates a window's
//! declared panes and issues the splits, hooks and commands that build it.

pub mod panes;
pub mod targeting;
