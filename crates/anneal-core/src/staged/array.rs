//! List node of the staged tree.

use tracing::debug;

use crate::codec;
use crate::entry::ReloadMode;
use crate::parse::ParseResult;
use crate::structure::{ListType, StructureKind};
use crate::suggest::{collect_suggestions, Suggestion};

use super::{NodeSeed, StagedNode};

/// A staged homogeneous list.
///
/// The element payloads are the unit of state: history snapshots,
/// change detection, and reordering all operate on the raw payload
/// string sequence. Child nodes are a rebuildable view over those
/// payloads; [`StagedArray::reload`] must run after any structural or
/// bulk mutation because children are rebuilt, not patched.
pub struct StagedArray {
    list: ListType,
    seed: NodeSeed,
    current: Vec<String>,
    defaults: Vec<String>,
    history: Vec<Vec<String>>,
    children: Vec<StagedNode>,
}

impl StagedArray {
    pub(crate) fn new(list: ListType, current: &str, default: &str, seed: NodeSeed) -> Self {
        let current = codec::split_layered(current);
        let defaults = codec::split_layered(default);
        let mut array = Self {
            list,
            seed,
            history: vec![current.clone()],
            current,
            defaults,
            children: Vec::new(),
        };
        array.reload();
        array
    }

    fn child_seed(&self) -> NodeSeed {
        NodeSeed {
            validator: self.seed.validator.clone(),
            suggestions: self.list.suggestions().to_vec(),
            forced: false,
            reload: self.seed.reload,
            registry: self.seed.registry.clone(),
        }
    }

    fn build_child(&self, payload: &str, default: &str) -> StagedNode {
        StagedNode::build(self.list.element(), payload, default, self.child_seed())
    }

    /// Rebuild child nodes from the current payload sequence.
    pub fn reload(&mut self) {
        let mut children = Vec::with_capacity(self.current.len());
        for (index, payload) in self.current.iter().enumerate() {
            let default = self.defaults.get(index).map(String::as_str).unwrap_or("");
            children.push(self.build_child(payload, default));
        }
        self.children = children;
    }

    /// The whole list, serialized.
    pub fn get(&self) -> String {
        codec::merge_layered(&self.current)
    }

    /// Replace the payload sequence from serialized text.
    ///
    /// Call [`Self::reload`] afterwards to rebuild the child view.
    pub fn set(&mut self, text: &str) {
        self.current = codec::split_layered(text);
    }

    /// Ask the owning validator about one element candidate.
    pub fn is_valid(&self, candidate: &str) -> ParseResult<bool> {
        (*self.seed.validator)(candidate)
    }

    /// Whether the payload sequence differs from the top snapshot.
    ///
    /// Literal string-sequence equality: two encodings of the same
    /// logical value still count as a change.
    pub fn is_changed(&self) -> bool {
        self.history.last() != Some(&self.current)
    }

    /// Whether the payload sequence equals the declared defaults.
    pub fn is_default(&self) -> bool {
        self.current == self.defaults
    }

    /// Reset every element to the declared defaults and rebuild.
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
    /// payload sequence.
    pub fn apply(&mut self) {
        if self.history.len() > 1 {
            self.history.pop();
        }
        for (slot, child) in self.current.iter_mut().zip(&self.children) {
            *slot = child.get();
        }
    }

    /// Emit the serialized list into an external sink.
    pub fn flush(&self, sink: &mut dyn FnMut(&str)) {
        sink(&self.get());
    }

    /// Append a new element and return its index.
    ///
    /// The element is seeded from the next unused explicit default, or
    /// the element type's generated default once those run out.
    pub fn create_node(&mut self) -> usize {
        let payload = self
            .defaults
            .get(self.current.len())
            .cloned()
            .unwrap_or_else(|| self.seed.registry.generate_default(self.list.element()));
        let index = self.current.len();
        debug!(index, "appending list element");
        let child = self.build_child(&payload, "");
        self.children.push(child);
        self.current.push(payload);
        index
    }

    /// Delete the element at `index`, shifting later elements down.
    pub fn remove_node(&mut self, index: usize) {
        debug!(index, "removing list element");
        self.children.remove(index);
        self.current.remove(index);
    }

    /// Swap the element at `index` with its predecessor. No-op at index 0.
    pub fn move_up(&mut self, index: usize) {
        if index == 0 {
            return;
        }
        self.swap_contents(index, index - 1);
    }

    /// Swap the element at `index` with its successor. No-op at the end.
    pub fn move_down(&mut self, index: usize) {
        self.swap_contents(index, index + 1);
    }

    // Swaps string content between positions, not node identity.
    fn swap_contents(&mut self, from: usize, to: usize) {
        if from >= self.current.len() || to >= self.current.len() {
            return;
        }
        self.current.swap(from, to);
        let payload = self.current[from].clone();
        self.children[from].set(&payload);
        let payload = self.current[to].clone();
        self.children[to].set(&payload);
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The child node at `index`.
    pub fn node(&self, index: usize) -> Option<&StagedNode> {
        self.children.get(index)
    }

    /// Mutable child node access.
    pub fn node_mut(&mut self, index: usize) -> Option<&mut StagedNode> {
        self.children.get_mut(index)
    }

    /// Structural discriminant of the element shape.
    pub fn inner_kind(&self) -> StructureKind {
        self.list.element().kind()
    }

    /// Collect suggestions for elements of this list.
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
