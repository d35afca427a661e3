//! Command recall history.
//!
//! An append-only list of previously run command strings with two access
//! paths: offset-based lookup (`get_at`, used by the remote history route)
//! and a navigation cursor (`previous`/`next`, used by the input surface for
//! up/down recall). The two are independent of the autocompleter's state.

/// Ordered history of executed command strings. Unbounded for the session.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
    /// Navigation cursor, counted back from the end. 0 = not navigating.
    cursor: usize,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command unconditionally and reset the navigation cursor.
    pub fn add(&mut self, command: &str) {
        self.entries.push(command.to_string());
        self.cursor = 0;
    }

    /// The entry `offset` positions back from the most recent (1 = most
    /// recent). Returns `None` for offset 0 or past the oldest entry.
    pub fn get_at(&self, offset: usize) -> Option<&str> {
        if offset == 0 || offset > self.entries.len() {
            return None;
        }
        Some(&self.entries[self.entries.len() - offset])
    }

    /// Step the cursor one entry further into the past, if possible.
    pub fn previous(&mut self) -> Option<&str> {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
            return Some(&self.entries[self.entries.len() - self.cursor]);
        }
        None
    }

    /// Step the cursor one entry back toward the present.
    ///
    /// Returns `None` once the cursor leaves history (the caller should
    /// restore whatever the user was typing).
    pub fn next(&mut self) -> Option<&str> {
        if self.cursor > 0 {
            self.cursor -= 1;
            if self.cursor != 0 {
                return Some(&self.entries[self.entries.len() - self.cursor]);
            }
        }
        None
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any commands have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> History {
        let mut h = History::new();
        h.add("a");
        h.add("b");
        h.add("c");
        h
    }

    #[test]
    fn get_at_counts_back_from_end() {
        let h = abc();
        assert_eq!(h.get_at(1), Some("c"));
        assert_eq!(h.get_at(2), Some("b"));
        assert_eq!(h.get_at(3), Some("a"));
    }

    #[test]
    fn get_at_out_of_range_is_none() {
        let h = abc();
        assert_eq!(h.get_at(0), None);
        assert_eq!(h.get_at(4), None);
    }

    #[test]
    fn get_at_on_empty_is_none() {
        let h = History::new();
        assert_eq!(h.get_at(1), None);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut h = History::new();
        h.add("same");
        h.add("same");
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn previous_walks_into_the_past() {
        let mut h = abc();
        assert_eq!(h.previous(), Some("c"));
        assert_eq!(h.previous(), Some("b"));
        assert_eq!(h.previous(), Some("a"));
        assert_eq!(h.previous(), None);
    }

    #[test]
    fn next_walks_back_and_exits() {
        let mut h = abc();
        h.previous();
        h.previous();
        assert_eq!(h.next(), Some("c"));
        // Cursor leaves history; the caller restores the edited text.
        assert_eq!(h.next(), None);
        assert_eq!(h.next(), None);
    }

    #[test]
    fn add_resets_navigation() {
        let mut h = abc();
        h.previous();
        h.previous();
        h.add("d");
        assert_eq!(h.previous(), Some("d"));
    }
}
