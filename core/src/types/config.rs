use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};


/// How a pane is created relative to its split source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SplitDirection {
    /// Root pane of a window; never split.
    None,
    /// Side by side (`tmux split-window -h`).
    Horizontal,
    /// Stacked (`tmux split-window -v`).
    Vertical,
}

impl SplitDirection {
    /// The tmux flag for this orientation. tmux names them the other way round.
    pub fn tmux_flag(self) -> &'static str {
        match self {
            SplitDirection::Horizontal => "-h",
            SplitDirection::Vertical | SplitDirection::None => "-v",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplitDirection::None => "none",
            SplitDirection::Horizontal => "horizontal",
            SplitDirection::Vertical => "vertical",
        }
    }
}

impl From<String> for SplitDirection {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "none" => SplitDirection::None,
            "horizontal" | "h" => SplitDirection::Horizontal,
            // unknown values fall back to a stacked split
            _ => SplitDirection::Vertical,
        }
    }
}

impl From<SplitDirection> for String {
    fn from(s: SplitDirection) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub command: String,
    #[serde(
        default,
        deserialize_with = "split_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub split: Option<SplitDirection>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub split_from: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_directory: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hooks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
}

/// A blank `split:` reads as no split at all.
fn split_or_absent<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SplitDirection>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(SplitDirection::from))
}

impl Pane {
    /// Effective orientation for the pane at `position` within its window.
    ///
    /// An absent split means `none` for the root pane and `vertical` for every
    /// other pane.
    pub fn split_at(&self, position: usize) -> SplitDirection {
        match (self.split, position) {
            (Some(split), _) => split,
            (None, 0) => SplitDirection::None,
            (None, _) => SplitDirection::Vertical,
        }
    }

    /// Working directory for this pane, or `fallback` when none is declared.
    pub fn working_dir_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.working_directory.is_empty() {
            fallback
        } else {
            &self.working_directory
        }
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub panes: Vec<Pane>,
}

impl Window {
    /// Directory the window is created in: the root pane's override, else
    /// `session_dir`.
    pub fn working_dir<'a>(&'a self, session_dir: &'a str) -> &'a str {
        match self.panes.first() {
            Some(root) => root.working_dir_or(session_dir),
            None => session_dir,
        }
    }
}


/// Which panes feed the aggregated log window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStreamConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grep: Vec<String>,
    /// Path of the monitoring helper. Default: `dolly-stream-monitor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
}

impl LogStreamConfig {
    pub fn monitor_path(&self) -> &str {
        self.monitor.as_deref().unwrap_or(DEFAULT_STREAM_MONITOR)
    }

    fn is_default(&self) -> bool {
        self == &LogStreamConfig::default()
    }
}


pub const DEFAULT_TERMINAL: &str = "bash";
pub const DEFAULT_LABEL_COLOR: &str = "blue";
pub const DEFAULT_STREAM_MONITOR: &str = "dolly-stream-monitor";


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub session_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_directory: String,
    #[serde(default = "default_terminal", skip_serializing_if = "String::is_empty")]
    pub terminal: String,
    /// Color windows from the built-in palette when they declare none. Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_color: Option<bool>,
    /// Show pane identifiers in the pane borders. Default: true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_pane_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_label_color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rc_file: String,
    #[serde(default, skip_serializing_if = "LogStreamConfig::is_default")]
    pub log_stream: LogStreamConfig,
    #[serde(default)]
    pub windows: Vec<Window>,
}

fn default_terminal() -> String {
    DEFAULT_TERMINAL.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            session_name: String::new(),
            working_directory: String::new(),
            terminal: default_terminal(),
            auto_color: None,
            show_pane_labels: None,
            default_label_color: String::new(),
            rc_file: String::new(),
            log_stream: LogStreamConfig::default(),
            windows: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn auto_color(&self) -> bool {
        self.auto_color.unwrap_or(true)
    }

    pub fn show_pane_labels(&self) -> bool {
        self.show_pane_labels.unwrap_or(true)
    }

    pub fn default_label_color(&self) -> &str {
        if self.default_label_color.is_empty() {
            DEFAULT_LABEL_COLOR
        } else {
            &self.default_label_color
        }
    }

    pub fn terminal(&self) -> &str {
        if self.terminal.is_empty() {
            DEFAULT_TERMINAL
        } else {
            &self.terminal
        }
    }

    pub fn rc_file(&self) -> Option<&str> {
        if self.rc_file.is_empty() {
            None
        } else {
            Some(&self.rc_file)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_parses_aliases_case_insensitively() {
        assert_eq!(SplitDirection::from("Horizontal".to_string()), SplitDirection::Horizontal);
        assert_eq!(SplitDirection::from("h".to_string()), SplitDirection::Horizontal);
        assert_eq!(SplitDirection::from("V".to_string()), SplitDirection::Vertical);
        assert_eq!(SplitDirection::from("NONE".to_string()), SplitDirection::None);
        assert_eq!(SplitDirection::from("diagonal".to_string()), SplitDirection::Vertical);
    }

    #[test]
    fn tmux_flags_are_inverted_relative_to_names() {
        assert_eq!(SplitDirection::Horizontal.tmux_flag(), "-h");
        assert_eq!(SplitDirection::Vertical.tmux_flag(), "-v");
    }

    #[test]
    fn absent_split_depends_on_position() {
        let pane = Pane::default();
        assert_eq!(pane.split_at(0), SplitDirection::None);
        assert_eq!(pane.split_at(3), SplitDirection::Vertical);
    }

    #[test]
    fn blank_or_null_split_is_absent() {
        let panes: Vec<Pane> =
            serde_yaml::from_str("- split: \"\"\n- split: ~\n- split: none\n- split: h\n").unwrap();
        let splits: Vec<Option<SplitDirection>> = panes.iter().map(|p| p.split).collect();
        assert_eq!(splits, vec![None, None, Some(SplitDirection::None), Some(SplitDirection::Horizontal)]);
        assert_eq!(panes[0].split_at(0), SplitDirection::None);
        assert_eq!(panes[1].split_at(1), SplitDirection::Vertical);
    }

    #[test]
    fn window_dir_prefers_root_pane_override() {
        let mut window = Window {
            name: "dev".into(),
            ..Window::default()
        };
        assert_eq!(window.working_dir("/srv"), "/srv");
        window.panes.push(Pane {
            working_directory: "/tmp/app".into(),
            ..Pane::default()
        });
        assert_eq!(window.working_dir("/srv"), "/tmp/app");
    }

    #[test]
    fn session_defaults() {
        let cfg = SessionConfig::default();
        assert!(cfg.auto_color());
        assert!(cfg.show_pane_labels());
        assert_eq!(cfg.default_label_color(), "blue");
        assert_eq!(cfg.terminal(), "bash");
        assert_eq!(cfg.rc_file(), None);
        assert_eq!(cfg.log_stream.monitor_path(), DEFAULT_STREAM_MONITOR);
    }
}
