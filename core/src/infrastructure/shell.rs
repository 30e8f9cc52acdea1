//! Login-shell invocation for new panes.


/// The command tmux runs in a new pane so the user's profile is loaded.
///
/// Known shells are normalised to lower case; anything else is passed through
/// unchanged. Either way the login flag `-l` is appended.
pub fn shell_start_command(terminal: &str) -> String {
    let lower = terminal.to_lowercase();
    match lower.as_str() {
        "bash" | "zsh" | "fish" => format!("{} -l", lower),
        _ => format!("{} -l", terminal),
    }
}
