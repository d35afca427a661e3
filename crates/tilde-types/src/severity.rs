//! Severity tags for console transcript lines.

/// Severity of a single scrollback line.
///
/// `Normal` lines are plain command echo and output; the other severities
/// come from forwarded host log messages and dispatch errors and get a
/// color marker in the decorated transcript rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Ordinary command echo and output.
    Normal,
    /// A line forwarded from the host's own logging facility.
    HostLog,
    /// A warning.
    Warning,
    /// An error.
    Error,
}

impl Severity {
    /// Tag name used by the remote transcript rendering: `[Tag]...[/Tag]`.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::HostLog => "HostLog",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }

    /// Inline color marker for the decorated rendering.
    ///
    /// `Normal` lines are not decorated.
    pub fn color(self) -> Option<&'static str> {
        match self {
            Severity::Normal => None,
            Severity::HostLog => Some("#586ED7"),
            Severity::Warning => Some("#B58900"),
            Severity::Error => Some("#DC322F"),
        }
    }
}
