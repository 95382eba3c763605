//! Record node of the staged tree.

use std::sync::Arc;

use crate::codec;
use crate::entry::ReloadMode;
use crate::parse::{ParseError, ParseResult};
use crate::structure::CompoundType;
use crate::suggest::{collect_suggestions, Suggestion};

use super::{NodeSeed, StagedNode, Validator};

/// A staged fixed-schema record.
///
/// Field payloads are stored in declaration order, aligned with the
/// schema; short decode input is padded with empty fields rather than
/// failing the record. Fields are addressed by declared key only; there
/// is no dynamic field insertion.
pub struct StagedCompound {
    data: CompoundType,
    seed: NodeSeed,
    current: Vec<String>,
    defaults: Vec<String>,
    history: Vec<Vec<String>>,
    children: Vec<StagedNode>,
}

impl StagedCompound {
    pub(crate) fn new(data: CompoundType, current: &str, default: &str, seed: NodeSeed) -> Self {
        let current = codec::split_fields(current, data.len());
        let defaults = codec::split_fields(default, data.len());
        let mut compound = Self {
            data,
            seed,
            history: vec![current.clone()],
            current,
            defaults,
            children: Vec::new(),
        };
        compound.reload();
        compound
    }

    // Field validation substitutes the candidate into a snapshot of the
    // record and asks the owning validator about the merged whole, so
    // field-level errors surface without committing anything.
    fn field_validator(&self, index: usize) -> Validator {
        let parent = self.seed.validator.clone();
        let snapshot = self.current.clone();
        Arc::new(move |candidate: &str| {
            let mut trial = snapshot.clone();
            trial[index] = candidate.to_string();
            (*parent)(&codec::merge_layered(&trial))
        })
    }

    /// Rebuild child nodes from the current field payloads.
    pub fn reload(&mut self) {
        let mut children = Vec::with_capacity(self.data.len());
        for (index, field) in self.data.fields().iter().enumerate() {
            let seed = NodeSeed {
                validator: self.field_validator(index),
                suggestions: field.suggestions().to_vec(),
                forced: field.forced_suggestions(),
                reload: self.seed.reload,
                registry: self.seed.registry.clone(),
            };
            children.push(StagedNode::build(
                field.structure(),
                &self.current[index],
                &self.defaults[index],
                seed,
            ));
        }
        self.children = children;
    }

    /// The whole record, serialized.
    pub fn get(&self) -> String {
        codec::merge_layered(&self.current)
    }

    /// Replace every field payload from serialized record text.
    pub fn set(&mut self, text: &str) {
        self.current = codec::split_fields(text, self.data.len());
    }

    /// Validate the whole record as it currently stands.
    pub fn is_valid(&self) -> ParseResult<bool> {
        (*self.seed.validator)(&self.get())
    }

    /// Validate candidate record text against the owning validator.
    pub fn is_valid_text(&self, candidate: &str) -> ParseResult<bool> {
        (*self.seed.validator)(candidate)
    }

    /// Validate one field candidate against the whole record.
    ///
    /// The candidate is substituted into a trial copy of the record and
    /// the merged result is handed to the owning validator.
    pub fn is_valid_field(&self, key: &str, candidate: &str) -> ParseResult<bool> {
        let Some(index) = self.data.position(key) else {
            return ParseResult::failure(ParseError::validation(
                candidate,
                format!("unknown field `{key}`"),
            ));
        };
        let mut trial = self.current.clone();
        trial[index] = candidate.to_string();
        (*self.seed.validator)(&codec::merge_layered(&trial))
    }

    /// Whether the field payloads differ from the top snapshot.
    pub fn is_changed(&self) -> bool {
        self.history.last() != Some(&self.current)
    }

    /// Whether the field payloads equal the declared defaults.
    pub fn is_default(&self) -> bool {
        self.current == self.defaults
    }

    /// Reset every field to its default and rebuild.
    pub fn set_default(&mut self) {
        self.current = self.defaults.clone();
        self.reload();
    }

    /// Restore the top snapshot, consume one checkpoint, and rebuild.
    pub fn set_previous(&mut self) {
        if let Some(top) = self.history.last() {
            self.current = top.clone();
        }
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.reload();
    }

    /// Push a checkpoint for a new editing session and rebuild.
    pub fn create_temp(&mut self) {
        self.history.push(self.current.clone());
        self.reload();
    }

    /// Commit one checkpoint level and pull child edits into the
    /// field payloads.
    pub fn apply(&mut self) {
        if self.history.len() > 1 {
            self.history.pop();
        }
        for (slot, child) in self.current.iter_mut().zip(&self.children) {
            *slot = child.get();
        }
    }

    /// Emit the serialized record into an external sink.
    pub fn flush(&self, sink: &mut dyn FnMut(&str)) {
        sink(&self.get());
    }

    /// The child nodes in field declaration order.
    pub fn values(&self) -> &[StagedNode] {
        &self.children
    }

    /// The child node for a declared field.
    pub fn field(&self, key: &str) -> Option<&StagedNode> {
        self.data.position(key).map(|index| &self.children[index])
    }

    /// Mutable child access for a declared field.
    pub fn field_mut(&mut self, key: &str) -> Option<&mut StagedNode> {
        let index = self.data.position(key)?;
        Some(&mut self.children[index])
    }

    /// The record schema this node was built from.
    pub fn data(&self) -> &CompoundType {
        &self.data
    }

    /// Collect suggestions for this record.
    pub fn suggestions(&self, filter: &dyn Fn(&Suggestion) -> bool) -> Vec<Suggestion> {
        collect_suggestions(&self.seed.suggestions, filter)
    }

    /// When the owning entry takes effect after an edit.
    pub fn reload_mode(&self) -> ReloadMode {
        self.seed.reload
    }

    /// Current checkpoint depth, including the floor.
    pub fn history_depth(&self) -> usize {
        self.history.len()
    }
}
