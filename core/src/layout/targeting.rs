//! Target strings for tmux requests.
//!
//! Dolly addresses tmux objects three ways:
//!
//! - **Window:** `session:window`, by name. Window names are unique within a
//!   session so this never needs an index.
//! - **Positional pane:** `session:window.index`. Indices shift whenever a
//!   sibling pane is created or destroyed, so they are resolved immediately
//!   before use and never stored.
//! - **Stable handle:** `%<n>`, assigned by tmux when the pane is created and
//!   valid until it is destroyed. Structural operations always use handles.

use crate::error::{DollyError, Result};


/// `session:window`
pub fn window_target(session: &str, window: &str) -> String {
    format!("{}:{}", session, window)
}

/// `session:window.index`
pub fn pane_target(session: &str, window: &str, index: u32) -> String {
    format!("{}:{}.{}", session, window, index)
}

/// Check if a string is a tmux stable pane handle (`%` followed by digits).
pub fn is_pane_handle(s: &str) -> bool {
    match s.strip_prefix('%') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Validate a handle reported by tmux for `target`.
pub fn parse_pane_handle(reply: Option<String>, target: &str) -> Result<String> {
    match reply {
        Some(h) if is_pane_handle(&h) => Ok(h),
        _ => Err(DollyError::MissingHandle {
            target: target.to_string(),
        }),
    }
}

/// Parse a `#{pane_index}` reply.
pub fn parse_pane_index(reply: Option<String>, handle: &str) -> Result<u32> {
    reply
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| DollyError::MissingHandle {
            target: handle.to_string(),
        })
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
