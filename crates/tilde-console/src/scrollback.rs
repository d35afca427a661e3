//! Append-only console transcript.
//!
//! The scrollback holds the full ordered sequence of output lines tagged by
//! severity and derives two cached renderings from it: a decorated form for
//! the local display (inline color markers) and a tagged form for remote
//! transport. Both caches are invalidated on append and rebuilt on demand.

use tilde_types::Severity;

/// Default character budget shared by both renderings.
pub const DEFAULT_MAX_CHARS: usize = 15_000;

/// One transcript line: raw message text plus its severity tag.
#[derive(Debug, Clone)]
struct Entry {
    message: String,
    severity: Severity,
}

impl Entry {
    /// Length this entry contributes to the decorated rendering.
    fn decorated_len(&self) -> usize {
        // "\n" + optional "<color=#RRGGBB>" ... "</color>"
        let markup = match self.severity.color() {
            Some(color) => "<color=>".len() + color.len() + "</color>".len(),
            None => 0,
        };
        1 + self.message.len() + markup
    }

    /// Length this entry contributes to the remote rendering.
    fn remote_len(&self) -> usize {
        // "[Tag]" ... "[/Tag]"
        self.message.len() + 2 * self.severity.tag().len() + 5
    }
}

/// Append-only transcript with cached decorated and remote renderings.
///
/// Entries are never reordered or mutated after append. Once either
/// rendering would exceed the character budget, the oldest whole entries
/// are dropped; trimming at entry boundaries keeps every color marker and
/// bracket tag intact.
pub struct Scrollback {
    entries: Vec<Entry>,
    max_chars: usize,
    decorated_total: usize,
    remote_total: usize,
    decorated_cache: String,
    decorated_dirty: bool,
    remote_cache: String,
    remote_dirty: bool,
}

impl Scrollback {
    /// Create a scrollback with the default character budget.
    pub fn new() -> Self {
        Self::with_max_chars(DEFAULT_MAX_CHARS)
    }

    /// Create a scrollback with a custom character budget.
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_chars,
            decorated_total: 0,
            remote_total: 0,
            decorated_cache: String::new(),
            decorated_dirty: false,
            remote_cache: String::new(),
            remote_dirty: false,
        }
    }

    /// Append a message with the given severity.
    pub fn append(&mut self, message: &str, severity: Severity) {
        let entry = Entry {
            message: message.to_string(),
            severity,
        };
        self.decorated_total += entry.decorated_len();
        self.remote_total += entry.remote_len();
        self.entries.push(entry);
        self.decorated_dirty = true;
        self.remote_dirty = true;
        self.trim();
    }

    /// Number of entries currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The decorated rendering: each line prefixed with a newline, non-Normal
    /// lines wrapped in an inline color marker keyed by severity.
    pub fn decorated(&mut self) -> &str {
        if self.decorated_dirty {
            let mut out = String::with_capacity(self.decorated_total);
            for entry in &self.entries {
                out.push('\n');
                match entry.severity.color() {
                    Some(color) => {
                        out.push_str("<color=");
                        out.push_str(color);
                        out.push('>');
                        out.push_str(&entry.message);
                        out.push_str("</color>");
                    },
                    None => out.push_str(&entry.message),
                }
            }
            self.decorated_cache = out;
            self.decorated_dirty = false;
        }
        &self.decorated_cache
    }

    /// The remote rendering: every entry wrapped in a severity-named bracket
    /// tag, concatenated with no separator. Stripping the tags reproduces
    /// the exact concatenation of the raw messages.
    pub fn remote(&mut self) -> &str {
        if self.remote_dirty {
            let mut out = String::with_capacity(self.remote_total);
            for entry in &self.entries {
                let tag = entry.severity.tag();
                out.push('[');
                out.push_str(tag);
                out.push(']');
                out.push_str(&entry.message);
                out.push_str("[/");
                out.push_str(tag);
                out.push(']');
            }
            self.remote_cache = out;
            self.remote_dirty = false;
        }
        &self.remote_cache
    }

    /// The raw messages with all markup stripped, one line per entry.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&entry.message);
        }
        out
    }

    /// Drop the oldest entries until both renderings fit the budget.
    ///
    /// The most recent entry is always retained even if it alone exceeds
    /// the budget.
    fn trim(&mut self) {
        let mut removed = 0;
        while self.entries.len() > removed + 1
            && (self.decorated_total > self.max_chars || self.remote_total > self.max_chars)
        {
            let entry = &self.entries[removed];
            self.decorated_total -= entry.decorated_len();
            self.remote_total -= entry.remote_len();
            removed += 1;
        }
        if removed > 0 {
            self.entries.drain(..removed);
            self.decorated_dirty = true;
            self.remote_dirty = true;
        }
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new()
    }
}
