//! Pane provisioning: turn one window's declared panes into tmux splits.
//!
//! The window must already exist with exactly one pane (the root). Each
//! further pane is split off a *stable handle* (`%<n>`) looked up by the
//! identifier of its `split_from` pane, never off a positional index, because
//! every split renumbers the panes after it. Positions are resolved only at
//! the moment keystrokes are delivered.
//!
//! Validation runs before the first tmux request, so a bad window leaves tmux
//! untouched. A tmux failure part-way through aborts the window; panes
//! already created are left in place.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{DollyError, Result};
use crate::infrastructure::tmux::{query, type_line, Multiplexer, TmuxCommandBuilder};
use crate::layout::targeting::{parse_pane_handle, parse_pane_index, pane_target, window_target};
use crate::types::config::{Pane, SplitDirection};


/// Fixed pauses that give the shell in a pane time to catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// After each pre-hook is sent.
    pub hook: Duration,
    /// After a window is created or moved.
    pub window: Duration,
}

impl SettleDelays {
    pub fn standard() -> Self {
        SettleDelays {
            hook: Duration::from_millis(100),
            window: Duration::from_millis(100),
        }
    }

    pub fn none() -> Self {
        SettleDelays {
            hook: Duration::ZERO,
            window: Duration::ZERO,
        }
    }
}

impl Default for SettleDelays {
    fn default() -> Self {
        SettleDelays::standard()
    }
}


/// One validated pane, in declaration order.
#[derive(Debug, Clone)]
pub struct PanePlan<'a> {
    pub id: String,
    pub pane: &'a Pane,
    pub split: SplitDirection,
    /// Identifier to split from. `None` means the root pane.
    pub split_from: Option<String>,
    /// A non-root pane that declared `split: none`; it is never created.
    pub skip: bool,
}


/// A pane tmux created for us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedPane {
    pub id: String,
    pub handle: String,
    /// Position of the pane in the window's declared list.
    pub position: usize,
}


/// Identifier -> stable handle for the panes of one window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneHandles {
    entries: Vec<ProvisionedPane>,
}

impl PaneHandles {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.handle.as_str())
    }

    /// Handle of the window's first pane.
    pub fn root(&self) -> Option<&str> {
        self.entries.first().map(|p| p.handle.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProvisionedPane> {
        self.entries.iter()
    }

    fn insert(&mut self, id: &str, handle: String, position: usize) {
        self.entries.push(ProvisionedPane {
            id: id.to_string(),
            handle,
            position,
        });
    }
}


/// Identifier for the pane at `position`: its own id, or `pane<position+1>`.
pub fn pane_id(pane: &Pane, position: usize) -> String {
    if pane.id.is_empty() {
        format!("pane{}", position + 1)
    } else {
        pane.id.clone()
    }
}


/// Check a window's panes without touching tmux.
///
/// Assigns default identifiers, rejects duplicate identifiers, and rejects
/// any `split_from` that does not name a pane declared earlier in the window
/// and actually created.
pub fn validate_panes<'a>(window: &str, panes: &'a [Pane]) -> Result<Vec<PanePlan<'a>>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut plan: Vec<PanePlan<'a>> = Vec::with_capacity(panes.len());

    for (position, pane) in panes.iter().enumerate() {
        let id = pane_id(pane, position);
        if !seen.insert(id.clone()) {
            return Err(DollyError::DuplicatePaneId {
                window: window.to_string(),
                id,
            });
        }
        let split = if position == 0 {
            SplitDirection::None
        } else {
            pane.split_at(position)
        };
        plan.push(PanePlan {
            id,
            pane,
            split,
            split_from: None,
            skip: position > 0 && split == SplitDirection::None,
        });
    }

    let unresolved = |plan: &PanePlan, reason: &str| DollyError::UnresolvedSplit {
        window: window.to_string(),
        pane: plan.id.clone(),
        split_from: plan.pane.split_from.clone(),
        reason: reason.to_string(),
    };

    for position in 0..plan.len() {
        let pane: &'a Pane = plan[position].pane;
        let source = pane.split_from.trim();
        if source.is_empty() {
            continue;
        }
        if position == 0 {
            return Err(unresolved(&plan[0], "the first pane of a window is never split"));
        }
        let found = plan.iter().position(|p| p.id == source);
        match found {
            None => return Err(unresolved(&plan[position], "no pane with that id in this window")),
            Some(i) if i >= position => {
                return Err(unresolved(
                    &plan[position],
                    "the source pane must be declared before the pane split from it",
                ))
            }
            Some(i) if plan[i].skip => {
                return Err(unresolved(
                    &plan[position],
                    "the source pane declares split 'none' and is never created",
                ))
            }
            Some(_) => plan[position].split_from = Some(source.to_string()),
        }
    }

    Ok(plan)
}


/// Create and populate every pane of `window` beyond its root pane.
///
/// `fallback_dir` is used for panes with no `working_directory`; `shell_cmd`
/// is what tmux runs in each new pane.
pub fn provision_panes(
    mux: &dyn Multiplexer,
    session: &str,
    window: &str,
    panes: &[Pane],
    fallback_dir: &str,
    shell_cmd: &str,
    delays: SettleDelays,
) -> Result<PaneHandles> {
    let plan = validate_panes(window, panes)?;
    let builder = TmuxCommandBuilder::new();
    let mut handles = PaneHandles::default();

    let Some(root) = plan.first() else {
        return Ok(handles);
    };
    if root.pane.split.is_some_and(|s| s != SplitDirection::None) {
        warn!(window, pane = %root.id, "first pane declares a split; treating it as the root pane");
    }

    let window_tgt = window_target(session, window);
    let root_handle = query(mux, &builder.pane_handle(&window_tgt))
        .and_then(|reply| parse_pane_handle(reply, &window_tgt))
        .map_err(|e| e.in_pane(window, &root.id))?;
    handles.insert(&root.id, root_handle.clone(), 0);
    run_pane_commands(mux, session, window, &root_handle, root.pane, delays)
        .map_err(|e| e.in_pane(window, &root.id))?;

    for (position, step) in plan.iter().enumerate().skip(1) {
        if step.skip {
            warn!(window, pane = %step.id, "pane declares split 'none' but is not the first pane; skipping");
            continue;
        }
        let source = match &step.split_from {
            Some(id) => handles.get(id).map(str::to_string).ok_or_else(|| {
                DollyError::UnresolvedSplit {
                    window: window.to_string(),
                    pane: step.id.clone(),
                    split_from: id.clone(),
                    reason: "source pane was not created".into(),
                }
            })?,
            None => root_handle.clone(),
        };
        let dir = step.pane.working_dir_or(fallback_dir);
        debug!(window, pane = %step.id, source = %source, split = %step.split, "splitting pane");

        let request = builder.split_window(&source, step.split.tmux_flag(), dir, shell_cmd);
        let handle = query(mux, &request)
            .and_then(|reply| parse_pane_handle(reply, &source))
            .map_err(|e| e.in_pane(window, &step.id))?;
        handles.insert(&step.id, handle.clone(), position);

        run_pane_commands(mux, session, window, &handle, step.pane, delays)
            .map_err(|e| e.in_pane(window, &step.id))?;
    }

    Ok(handles)
}


/// Send a pane's pre-hooks, then its command, to wherever the pane sits now.
fn run_pane_commands(
    mux: &dyn Multiplexer,
    session: &str,
    window: &str,
    handle: &str,
    pane: &Pane,
    delays: SettleDelays,
) -> Result<()> {
    let hooks: Vec<&String> = pane.pre_hooks.iter().filter(|h| !h.trim().is_empty()).collect();
    if hooks.is_empty() && pane.command.is_empty() {
        return Ok(());
    }
    let builder = TmuxCommandBuilder::new();
    let index = query(mux, &builder.pane_index(handle))
        .and_then(|reply| parse_pane_index(reply, handle))?;
    let target = pane_target(session, window, index);

    for hook in hooks {
        type_line(mux, &target, hook)?;
        if !delays.hook.is_zero() {
            thread::sleep(delays.hook);
        }
    }
    if !pane.command.is_empty() {
        type_line(mux, &target, &pane.command)?;
    }
    Ok(())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
