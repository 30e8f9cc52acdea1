//! External collaborators: the tmux process and the user's login shell.

#[cfg(test)]
pub mod fake;
pub mod shell;
pub mod tmux;
