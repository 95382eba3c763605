//! Staged value tree
//!
//! A [`StagedNode`] mirrors one [`StructuredType`] instance at runtime
//! and layers editable state over it: a current value, the declared
//! default, and a history stack of prior states. The stack always holds
//! at least the base snapshot taken at construction; `create_temp`
//! pushes a checkpoint when an editing session opens, `apply` commits
//! one level, `set_previous` discards one level. Popping at the floor is
//! a no-op, so revert and apply are always safe to call at the root.
//!
//! Node kinds are a closed enum and every operation matches
//! exhaustively; there are no runtime kind probes.

mod array;
mod compound;
mod value;

pub use array::StagedArray;
pub use compound::StagedCompound;
pub use value::StagedValue;

use std::sync::Arc;

use crate::entry::ReloadMode;
use crate::parse::ParseResult;
use crate::registry::VariantRegistry;
use crate::structure::{StructureKind, StructuredType};
use crate::suggest::{Suggestion, SuggestionProvider};

/// Validation callback supplied by the owning entry.
///
/// Staged nodes surface validation outcomes; they never enforce them.
pub type Validator = Arc<dyn Fn(&str) -> ParseResult<bool> + Send + Sync>;

/// Everything a node needs from its owner at construction time.
#[derive(Clone)]
pub(crate) struct NodeSeed {
    pub validator: Validator,
    pub suggestions: Vec<Arc<dyn SuggestionProvider>>,
    pub forced: bool,
    pub reload: ReloadMode,
    pub registry: Arc<VariantRegistry>,
}

/// A node of the staged value tree.
pub enum StagedNode {
    /// A scalar leaf.
    Value(StagedValue),
    /// A homogeneous list.
    Array(StagedArray),
    /// A fixed-schema record.
    Compound(StagedCompound),
}

impl StagedNode {
    pub(crate) fn build(
        structure: &StructuredType,
        current: &str,
        default: &str,
        seed: NodeSeed,
    ) -> Self {
        match structure {
            StructuredType::Simple(simple) => {
                Self::Value(StagedValue::new(simple.clone(), current, default, seed))
            }
            StructuredType::List(list) => {
                Self::Array(StagedArray::new(list.clone(), current, default, seed))
            }
            StructuredType::Compound(compound) => {
                Self::Compound(StagedCompound::new(compound.clone(), current, default, seed))
            }
        }
    }

    /// This node's structural discriminant.
    pub fn kind(&self) -> StructureKind {
        match self {
            Self::Value(_) => StructureKind::Simple,
            Self::Array(_) => StructureKind::List,
            Self::Compound(_) => StructureKind::Compound,
        }
    }

    /// The node's current state, serialized.
    pub fn get(&self) -> String {
        match self {
            Self::Value(value) => value.get().to_string(),
            Self::Array(array) => array.get(),
            Self::Compound(compound) => compound.get(),
        }
    }

    /// Replace the node's current state from serialized text.
    ///
    /// No validation happens here; gate edits through [`Self::is_valid`].
    pub fn set(&mut self, text: &str) {
        match self {
            Self::Value(value) => value.set(text),
            Self::Array(array) => array.set(text),
            Self::Compound(compound) => compound.set(text),
        }
    }

    /// Ask the owning validator whether a candidate is currently legal.
    pub fn is_valid(&self, candidate: &str) -> ParseResult<bool> {
        match self {
            Self::Value(value) => value.is_valid(candidate),
            Self::Array(array) => array.is_valid(candidate),
            Self::Compound(compound) => compound.is_valid_text(candidate),
        }
    }

    /// Whether the current state differs from the top history snapshot.
    pub fn is_changed(&self) -> bool {
        match self {
            Self::Value(value) => value.is_changed(),
            Self::Array(array) => array.is_changed(),
            Self::Compound(compound) => compound.is_changed(),
        }
    }

    /// Whether the current state equals the declared default.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Value(value) => value.is_default(),
            Self::Array(array) => array.is_default(),
            Self::Compound(compound) => compound.is_default(),
        }
    }

    /// Reset the current state to the declared default.
    pub fn set_default(&mut self) {
        match self {
            Self::Value(value) => value.set_default(),
            Self::Array(array) => array.set_default(),
            Self::Compound(compound) => compound.set_default(),
        }
    }

    /// Discard edits back to the top history snapshot, consuming one
    /// checkpoint (never the floor).
    pub fn set_previous(&mut self) {
        match self {
            Self::Value(value) => value.set_previous(),
            Self::Array(array) => array.set_previous(),
            Self::Compound(compound) => compound.set_previous(),
        }
    }

    /// Push a checkpoint for a new editing session.
    pub fn create_temp(&mut self) {
        match self {
            Self::Value(value) => value.create_temp(),
            Self::Array(array) => array.create_temp(),
            Self::Compound(compound) => compound.create_temp(),
        }
    }

    /// Commit edits up one checkpoint level (never past the floor).
    pub fn apply(&mut self) {
        match self {
            Self::Value(value) => value.apply(),
            Self::Array(array) => array.apply(),
            Self::Compound(compound) => compound.apply(),
        }
    }

    /// Emit the serialized current state into an external sink.
    pub fn flush(&self, sink: &mut dyn FnMut(&str)) {
        match self {
            Self::Value(value) => value.flush(sink),
            Self::Array(array) => array.flush(sink),
            Self::Compound(compound) => compound.flush(sink),
        }
    }

    /// Collect suggestions for this node.
    pub fn suggestions(&self, filter: &dyn Fn(&Suggestion) -> bool) -> Vec<Suggestion> {
        match self {
            Self::Value(value) => value.suggestions(filter),
            Self::Array(array) => array.suggestions(filter),
            Self::Compound(compound) => compound.suggestions(filter),
        }
    }

    /// When the owning entry takes effect after an edit.
    pub fn reload_mode(&self) -> ReloadMode {
        match self {
            Self::Value(value) => value.reload_mode(),
            Self::Array(array) => array.reload_mode(),
            Self::Compound(compound) => compound.reload_mode(),
        }
    }

    /// The scalar leaf, when this is a leaf node.
    pub fn as_value(&self) -> Option<&StagedValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Mutable scalar leaf access.
    pub fn as_value_mut(&mut self) -> Option<&mut StagedValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The list node, when this is a list.
    pub fn as_array(&self) -> Option<&StagedArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Mutable list access.
    pub fn as_array_mut(&mut self) -> Option<&mut StagedArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The record node, when this is a compound.
    pub fn as_compound(&self) -> Option<&StagedCompound> {
        match self {
            Self::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    /// Mutable record access.
    pub fn as_compound_mut(&mut self) -> Option<&mut StagedCompound> {
        match self {
            Self::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}
