//! In-memory tmux stand-in for tests.
//!
//! Keeps just enough of the session/window/pane tree to answer the queries
//! Dolly makes (pane handles, pane indices, split output) and records every
//! request in order. Windows carry tmux indices: new sessions start at the
//! global `base-index`, `new-window -b` shifts later windows up, and
//! `move-window` refuses an occupied index the way tmux does.

use std::cell::RefCell;

use crate::error::{DollyError, Result};
use crate::infrastructure::tmux::Multiplexer;


#[derive(Debug, Default)]
struct FakeWindow {
    index: u32,
    name: String,
    panes: Vec<String>,
}

#[derive(Debug, Default)]
struct FakeSession {
    name: String,
    windows: Vec<FakeWindow>,
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<Vec<String>>,
    sessions: Vec<FakeSession>,
    next_pane: u32,
    base_index: u32,
    failures: Vec<String>,
}


#[derive(Debug, Default)]
pub struct FakeTmux {
    state: RefCell<FakeState>,
}


impl FakeTmux {
    pub fn new() -> Self {
        FakeTmux::default()
    }

    /// Fail every request whose space-joined arguments contain `pattern`.
    pub fn fail_on(&self, pattern: &str) {
        self.state.borrow_mut().failures.push(pattern.to_string());
    }

    /// Pre-create a session with one window holding one pane.
    pub fn seed_window(&self, session: &str, window: &str) -> String {
        let mut st = self.state.borrow_mut();
        let handle = st.alloc();
        let base = st.base_index;
        let si = match st.sessions.iter().position(|s| s.name == session) {
            Some(si) => si,
            None => {
                st.sessions.push(FakeSession {
                    name: session.into(),
                    windows: Vec::new(),
                });
                st.sessions.len() - 1
            }
        };
        let s = &mut st.sessions[si];
        let index = s.next_index(base);
        s.windows.push(FakeWindow {
            index,
            name: window.into(),
            panes: vec![handle.clone()],
        });
        handle
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().calls.clone()
    }

    /// Requests whose first argument is `verb`.
    pub fn calls_of(&self, verb: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.first().map(String::as_str) == Some(verb))
            .collect()
    }

    /// `(target, text)` for every literal send-keys request.
    pub fn sent_keys(&self) -> Vec<(String, String)> {
        self.calls_of("send-keys")
            .into_iter()
            .filter(|c| c.get(3).map(String::as_str) == Some("-l"))
            .map(|c| (c[2].clone(), c[4].clone()))
            .collect()
    }

    pub fn panes_in(&self, session: &str, window: &str) -> Vec<String> {
        let st = self.state.borrow();
        st.session(session)
            .and_then(|s| s.windows.iter().find(|w| w.name == window))
            .map(|w| w.panes.clone())
            .unwrap_or_default()
    }

    pub fn window_names(&self, session: &str) -> Vec<String> {
        let st = self.state.borrow();
        st.session(session)
            .map(|s| s.windows.iter().map(|w| w.name.clone()).collect())
            .unwrap_or_default()
    }

    /// `(index, name)` of every window in `session`, in index order.
    pub fn window_indices(&self, session: &str) -> Vec<(u32, String)> {
        let st = self.state.borrow();
        st.session(session)
            .map(|s| s.windows.iter().map(|w| (w.index, w.name.clone())).collect())
            .unwrap_or_default()
    }

    pub fn has_session(&self, session: &str) -> bool {
        self.state.borrow().session(session).is_some()
    }
}


impl Multiplexer for FakeTmux {
    fn run(&self, args: &[String]) -> Result<String> {
        let mut st = self.state.borrow_mut();
        st.calls.push(args.to_vec());
        let joined = args.join(" ");
        if st.failures.iter().any(|p| joined.contains(p.as_str())) {
            return Err(fail(args, "injected failure"));
        }
        let verb = args.first().map(String::as_str).unwrap_or_default();
        match verb {
            "kill-session" => {
                let name = flag(args, "-t").unwrap_or_default();
                let before = st.sessions.len();
                st.sessions.retain(|s| s.name != name);
                if st.sessions.len() == before {
                    return Err(fail(args, &format!("can't find session: {}", name)));
                }
                Ok(String::new())
            }
            "new-session" => {
                let name = flag(args, "-s").unwrap_or_default();
                let window = flag(args, "-n").unwrap_or_default();
                if st.session(&name).is_some() {
                    return Err(fail(args, &format!("duplicate session: {}", name)));
                }
                let handle = st.alloc();
                let index = st.base_index;
                st.sessions.push(FakeSession {
                    name,
                    windows: vec![FakeWindow {
                        index,
                        name: window,
                        panes: vec![handle],
                    }],
                });
                Ok(String::new())
            }
            "new-window" => {
                let target = flag(args, "-t").unwrap_or_default();
                let window = flag(args, "-n").unwrap_or_default();
                let before = args.iter().any(|a| a == "-b");
                let handle = st.alloc();
                let base = st.base_index;
                let (session, anchor) = target.split_once(':').unwrap_or((target.as_str(), ""));
                let si = st
                    .sessions
                    .iter()
                    .position(|s| s.name == session)
                    .ok_or_else(|| fail(args, &format!("can't find session: {}", session)))?;
                let s = &mut st.sessions[si];
                let index = if before {
                    let at = s
                        .find_window(anchor)
                        .map(|wi| s.windows[wi].index)
                        .ok_or_else(|| fail(args, &format!("can't find window: {}", anchor)))?;
                    for w in s.windows.iter_mut().filter(|w| w.index >= at) {
                        w.index += 1;
                    }
                    at
                } else if anchor.is_empty() {
                    s.next_index(base)
                } else {
                    let at: u32 = anchor
                        .parse()
                        .map_err(|_| fail(args, &format!("can't find window: {}", anchor)))?;
                    if s.windows.iter().any(|w| w.index == at) {
                        return Err(fail(args, &format!("index in use: {}", at)));
                    }
                    at
                };
                s.windows.push(FakeWindow {
                    index,
                    name: window,
                    panes: vec![handle],
                });
                s.windows.sort_by_key(|w| w.index);
                Ok(String::new())
            }
            "set-option" if args.iter().any(|a| a == "-g") => {
                if st.sessions.is_empty() {
                    return Err(fail(args, "no server running on /tmp/tmux-0/default"));
                }
                if let Some(value) = flag(args, "base-index") {
                    st.base_index = value.parse().map_err(|_| fail(args, "bad base-index"))?;
                }
                Ok(String::new())
            }
            "split-window" => {
                let source = flag(args, "-t").unwrap_or_default();
                let handle = st.alloc();
                let (si, wi, pi) = st
                    .locate_handle(&source)
                    .ok_or_else(|| fail(args, &format!("can't find pane: {}", source)))?;
                st.sessions[si].windows[wi].panes.insert(pi + 1, handle.clone());
                if args.iter().any(|a| a == "-P") {
                    Ok(format!("{}\n", handle))
                } else {
                    Ok(String::new())
                }
            }
            "display-message" => {
                let target = flag(args, "-t").unwrap_or_default();
                let format = args.last().cloned().unwrap_or_default();
                let (si, wi, pi) = st
                    .locate(&target)
                    .ok_or_else(|| fail(args, &format!("can't find pane: {}", target)))?;
                if format.contains("pane_index") {
                    Ok(format!("{}\n", pi))
                } else {
                    Ok(format!("{}\n", st.sessions[si].windows[wi].panes[pi]))
                }
            }
            "move-window" => {
                let source = flag(args, "-s").unwrap_or_default();
                let dest = flag(args, "-t").unwrap_or_default();
                let (si, wi, _) = st
                    .locate(&source)
                    .ok_or_else(|| fail(args, &format!("can't find window: {}", source)))?;
                let at: u32 = dest
                    .rsplit_once(':')
                    .and_then(|(_, i)| i.parse().ok())
                    .ok_or_else(|| fail(args, &format!("bad destination: {}", dest)))?;
                let s = &mut st.sessions[si];
                if s.windows.iter().enumerate().any(|(i, w)| i != wi && w.index == at) {
                    return Err(fail(args, &format!("index in use: {}", at)));
                }
                s.windows[wi].index = at;
                s.windows.sort_by_key(|w| w.index);
                Ok(String::new())
            }
            "send-keys" | "select-pane" | "select-window" => {
                let target = flag(args, "-t").unwrap_or_default();
                if st.locate(&target).is_none() {
                    return Err(fail(args, &format!("can't find target: {}", target)));
                }
                Ok(String::new())
            }
            _ => Ok(String::new()),
        }
    }
}


impl FakeState {
    fn alloc(&mut self) -> String {
        let handle = format!("%{}", self.next_pane);
        self.next_pane += 1;
        handle
    }

    fn session(&self, name: &str) -> Option<&FakeSession> {
        self.sessions.iter().find(|s| s.name == name)
    }

    fn locate_handle(&self, handle: &str) -> Option<(usize, usize, usize)> {
        for (si, s) in self.sessions.iter().enumerate() {
            for (wi, w) in s.windows.iter().enumerate() {
                if let Some(pi) = w.panes.iter().position(|p| p == handle) {
                    return Some((si, wi, pi));
                }
            }
        }
        None
    }

    /// Resolve `%h`, `session:window`, or `session:window.index`.
    fn locate(&self, target: &str) -> Option<(usize, usize, usize)> {
        if target.starts_with('%') {
            return self.locate_handle(target);
        }
        let (session, rest) = target.split_once(':').unwrap_or((target, ""));
        let si = self.sessions.iter().position(|s| s.name == session)?;
        if rest.is_empty() {
            return Some((si, 0, 0));
        }
        let (window, index) = match rest.rsplit_once('.') {
            Some((w, i)) => (w, i.parse::<usize>().ok()?),
            None => (rest, 0),
        };
        let wi = self.sessions[si].find_window(window)?;
        if index >= self.sessions[si].windows[wi].panes.len() {
            return None;
        }
        Some((si, wi, index))
    }
}


impl FakeSession {
    /// Window matching `target` by name, or by index when numeric.
    fn find_window(&self, target: &str) -> Option<usize> {
        self.windows.iter().position(|w| w.name == target).or_else(|| {
            let index: u32 = target.parse().ok()?;
            self.windows.iter().position(|w| w.index == index)
        })
    }

    /// First free index at or above `base`.
    fn next_index(&self, base: u32) -> u32 {
        let mut index = base;
        while self.windows.iter().any(|w| w.index == index) {
            index += 1;
        }
        index
    }
}


fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn fail(args: &[String], stderr: &str) -> DollyError {
    DollyError::Tmux {
        command: args.first().cloned().unwrap_or_default(),
        stderr: stderr.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn global_options_need_a_running_server() {
        let mux = FakeTmux::new();
        let err = mux.run(&strings(&["set-option", "-g", "base-index", "1"])).unwrap_err();
        assert!(err.to_string().contains("no server running"));

        mux.seed_window("other", "main");
        mux.run(&strings(&["set-option", "-g", "base-index", "1"])).unwrap();
        mux.run(&strings(&["new-session", "-d", "-s", "proj", "-n", "app"])).unwrap();
        assert_eq!(mux.window_indices("proj"), vec![(1, "app".to_string())]);
    }

    #[test]
    fn move_window_refuses_an_occupied_index() {
        let mux = FakeTmux::new();
        mux.run(&strings(&["new-session", "-d", "-s", "proj", "-n", "app"])).unwrap();
        mux.run(&strings(&["new-window", "-t", "proj:", "-n", "logs"])).unwrap();
        let err = mux
            .run(&strings(&["move-window", "-s", "proj:logs", "-t", "proj:0"]))
            .unwrap_err();
        assert!(err.to_string().contains("index in use: 0"));

        mux.run(&strings(&["move-window", "-s", "proj:logs", "-t", "proj:5"])).unwrap();
        assert_eq!(
            mux.window_indices("proj"),
            vec![(0, "app".to_string()), (5, "logs".to_string())]
        );
    }

    #[test]
    fn insert_before_shifts_later_windows() {
        let mux = FakeTmux::new();
        mux.run(&strings(&["new-session", "-d", "-s", "proj", "-n", "app"])).unwrap();
        mux.run(&strings(&["new-window", "-t", "proj:", "-n", "db"])).unwrap();
        mux.run(&strings(&["new-window", "-b", "-t", "proj:app", "-n", "logs"])).unwrap();
        assert_eq!(
            mux.window_indices("proj"),
            vec![(0, "logs".to_string()), (1, "app".to_string()), (2, "db".to_string())]
        );
    }

    #[test]
    fn sent_keys_lists_literal_text_only() {
        let mux = FakeTmux::new();
        mux.seed_window("proj", "dev");
        mux.run(&strings(&["send-keys", "-t", "proj:dev", "-l", "ls"])).unwrap();
        mux.run(&strings(&["send-keys", "-t", "proj:dev", "Enter"])).unwrap();
        assert_eq!(mux.sent_keys(), vec![("proj:dev".to_string(), "ls".to_string())]);
    }
}
