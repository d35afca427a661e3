//! Stateful cyclic prefix completion.
//!
//! Repeated calls with the same partial text advance through every candidate
//! sharing that prefix and then return the literal typed text itself before
//! wrapping around. The candidate set is supplied per call and may change
//! between calls; the completer only remembers its cycle position.

/// A live source of completion candidates.
///
/// Implementations must be consistent between calls for an unchanged set,
/// but membership is allowed to change; the completer re-queries on every
/// call and clamps its offset to whatever it finds.
pub trait CandidateSource {
    /// The current candidate names.
    fn candidates(&self) -> Vec<String>;
}

impl CandidateSource for Vec<String> {
    fn candidates(&self) -> Vec<String> {
        self.clone()
    }
}

impl CandidateSource for [String] {
    fn candidates(&self) -> Vec<String> {
        self.to_vec()
    }
}

/// Cyclic completion state: the remembered partial and the cycle offset.
#[derive(Debug, Default)]
pub struct Autocompleter {
    /// The original text being completed.
    partial: String,
    offset: usize,
}

impl Autocompleter {
    /// Create a completer with no active cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next completion for `text`.
    ///
    /// If `text` extends the remembered partial while a cycle is underway,
    /// the cycle continues from the remembered partial (the caller has
    /// accepted a previous completion and pressed tab again). Otherwise the
    /// cycle restarts from `text`. One extra cyclic slot always returns the
    /// literal partial, so cycling eventually comes back to what the user
    /// typed.
    pub fn complete(&mut self, text: &str, source: &dyn CandidateSource) -> String {
        let effective = if text.starts_with(&self.partial) && self.offset > 0 {
            self.partial.clone()
        } else {
            self.partial = text.to_string();
            self.offset = 0;
            text.to_string()
        };

        let mut matches: Vec<String> = source
            .candidates()
            .into_iter()
            .filter(|c| c.starts_with(&effective))
            .collect();
        matches.sort();
        matches.dedup();

        let mut count = matches.len();
        if !matches.iter().any(|m| *m == effective) {
            // Reserve a slot for the literal partial itself.
            count += 1;
        }
        self.offset %= count;

        let result = matches
            .get(self.offset)
            .cloned()
            .unwrap_or_else(|| effective.clone());
        self.offset += 1;
        result
    }

    /// Abandon the current cycle.
    ///
    /// Called whenever the edited text diverges from the completion being
    /// cycled (the user typed something other than accepting a completion).
    pub fn reset(&mut self) {
        self.partial.clear();
        self.offset = 0;
    }
}
