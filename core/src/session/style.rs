//! Window tab colors and pane border labels.

use tracing::{debug, warn};

use crate::error::Result;
use crate::infrastructure::tmux::{Multiplexer, TmuxCommandBuilder};
use crate::layout::panes::PaneHandles;
use crate::layout::targeting::window_target;
use crate::types::config::{SessionConfig, Window};


/// Tab colors handed out to windows that declare none, in order.
pub const COLOR_PALETTE: [&str; 15] = [
    "green",
    "blue",
    "red",
    "yellow",
    "cyan",
    "magenta",
    "white",
    "black",
    "brightgreen",
    "brightblue",
    "brightred",
    "brightyellow",
    "brightcyan",
    "brightmagenta",
    "brightwhite",
];

/// Pane option holding the label background for that pane.
pub const LABEL_COLOR_OPTION: &str = "@dolly_label_color";


pub fn auto_color(window_index: usize) -> &'static str {
    COLOR_PALETTE[window_index % COLOR_PALETTE.len()]
}


/// Tab color for the `window_index`-th window of the session, if any.
pub fn window_color(config: &SessionConfig, window: &Window, window_index: usize) -> Option<String> {
    match window.color.as_deref() {
        Some(c) if !c.trim().is_empty() => Some(c.trim().to_string()),
        _ if config.auto_color() => Some(auto_color(window_index).to_string()),
        _ => None,
    }
}


/// Color the window's status-bar tab. The active tab gets the bright variant
/// of the color, or a bold plain one if tmux rejects the bright name.
pub fn apply_window_color(mux: &dyn Multiplexer, session: &str, window: &str, color: &str) -> Result<()> {
    let builder = TmuxCommandBuilder::new();
    let target = window_target(session, window);
    mux.run(&builder.set_window_option(
        &target,
        "window-status-style",
        &format!("bg={},fg=black", color),
    ))?;

    let bright = builder.set_window_option(
        &target,
        "window-status-current-style",
        &format!("bg=bright{},fg=black,bold", color),
    );
    if let Err(e) = mux.run(&bright) {
        debug!(window, color, error = %e, "bright tab color rejected; using plain bold");
        let plain = builder.set_window_option(
            &target,
            "window-status-current-style",
            &format!("bg={},fg=white,bold", color),
        );
        if let Err(e) = mux.run(&plain) {
            warn!(window, color, error = %e, "could not set active tab style");
        }
    }
    Ok(())
}


/// Border format shown above each pane. The background comes from the pane's
/// own label color option so panes in one window can differ.
pub fn border_format(default_color: &str) -> String {
    format!(
        "#[bg=#{{?#{{{opt}}},#{{{opt}}},{default}}},fg=white,bold] #{{pane_title}} #[default]",
        opt = LABEL_COLOR_OPTION,
        default = default_color,
    )
}


/// Turn on pane border titles for a window and label each created pane with
/// its identifier.
pub fn apply_pane_labels(
    mux: &dyn Multiplexer,
    session: &str,
    config: &SessionConfig,
    window: &Window,
    handles: &PaneHandles,
) -> Result<()> {
    let builder = TmuxCommandBuilder::new();
    let target = window_target(session, &window.name);
    let default_color = config.default_label_color();

    mux.run(&builder.set_window_option(&target, "pane-border-status", "top"))?;
    mux.run(&builder.set_window_option(&target, "pane-border-format", &border_format(default_color)))?;

    for provisioned in handles.iter() {
        let Some(pane) = window.panes.get(provisioned.position) else {
            continue;
        };
        let visible = pane.show_label.unwrap_or(true);
        let title = if visible { provisioned.id.as_str() } else { "" };
        mux.run(&builder.set_pane_title(&provisioned.handle, title))?;
        let color = pane.label_color.as_deref().unwrap_or(default_color);
        mux.run(&builder.set_pane_option(&provisioned.handle, LABEL_COLOR_OPTION, color))?;
    }
    Ok(())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
