//! Scalar leaf of the staged tree.

use crate::entry::ReloadMode;
use crate::parse::ParseResult;
use crate::structure::SimpleType;
use crate::suggest::{collect_suggestions, Suggestion};

use super::NodeSeed;

/// A staged scalar: current text, default text, and a history stack.
///
/// `set` performs no validation; the caller gates commits through
/// [`StagedValue::is_valid`], which delegates to the owning entry.
pub struct StagedValue {
    simple: SimpleType,
    seed: NodeSeed,
    current: String,
    default: String,
    history: Vec<String>,
}

impl StagedValue {
    pub(crate) fn new(simple: SimpleType, current: &str, default: &str, seed: NodeSeed) -> Self {
        Self {
            simple,
            seed,
            current: current.to_string(),
            default: default.to_string(),
            history: vec![current.to_string()],
        }
    }

    /// The current text.
    pub fn get(&self) -> &str {
        &self.current
    }

    /// Replace the current text, unvalidated.
    pub fn set(&mut self, text: &str) {
        self.current = text.to_string();
    }

    /// Ask the owning validator about a candidate.
    pub fn is_valid(&self, candidate: &str) -> ParseResult<bool> {
        (*self.seed.validator)(candidate)
    }

    /// Whether the current text differs from the top history snapshot.
    pub fn is_changed(&self) -> bool {
        self.history.last().map(String::as_str) != Some(self.current.as_str())
    }

    /// Whether the current text equals the default.
    pub fn is_default(&self) -> bool {
        self.current == self.default
    }

    /// Reset to the default text.
    pub fn set_default(&mut self) {
        self.current = self.default.clone();
    }

    /// Restore the top snapshot and consume one checkpoint level.
    ///
    /// At the floor (depth 1) the base snapshot is restored and kept.
    pub fn set_previous(&mut self) {
        if let Some(top) = self.history.last() {
            self.current = top.clone();
        }
        if self.history.len() > 1 {
            self.history.pop();
        }
    }

    /// Push a checkpoint for a new editing session.
    pub fn create_temp(&mut self) {
        self.history.push(self.current.clone());
    }

    /// Commit edits up one checkpoint level, keeping the current text.
    pub fn apply(&mut self) {
        if self.history.len() > 1 {
            self.history.pop();
        }
    }

    /// Emit the current text into an external sink.
    pub fn flush(&self, sink: &mut dyn FnMut(&str)) {
        sink(&self.current);
    }

    /// Collect suggestions for this leaf.
    pub fn suggestions(&self, filter: &dyn Fn(&Suggestion) -> bool) -> Vec<Suggestion> {
        collect_suggestions(&self.seed.suggestions, filter)
    }

    /// Whether the suggestion set is the exhaustive set of legal values.
    pub fn is_forcing_suggestions(&self) -> bool {
        self.seed.forced
    }

    /// When the owning entry takes effect after an edit.
    pub fn reload_mode(&self) -> ReloadMode {
        self.seed.reload
    }

    /// The scalar shape this leaf was built from.
    pub fn simple(&self) -> &SimpleType {
        &self.simple
    }

    /// Current checkpoint depth, including the floor.
    pub fn history_depth(&self) -> usize {
        self.history.len()
    }
}
