//! Declarative config entries
//!
//! A [`ConfigEntry`] binds a key to a shape, a default, and editing
//! metadata: comment lines, reload requirement, an optional value
//! filter, and suggestion providers. The staged node tree is built
//! lazily on first structural access and cached until the entry is
//! restored from storage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::parse::ParseResult;
use crate::registry::VariantRegistry;
use crate::staged::{NodeSeed, StagedNode, Validator};
use crate::store::ValueStore;
use crate::structure::{
    CompoundType, ListType, SimpleType, StructuredType,
};
use crate::suggest::{collect_suggestions, StaticSuggestions, Suggestion, SuggestionProvider};

/// When an edited entry takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReloadMode {
    /// Takes effect immediately.
    #[default]
    None,
    /// Takes effect after the world (session scope) reloads.
    World,
    /// Takes effect after a full restart.
    Game,
}

impl ReloadMode {
    /// The tag used in persisted text.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::World => "WORLD",
            Self::Game => "GAME",
        }
    }

    /// Parse a persisted tag; unknown tags read as `None`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            t if t.eq_ignore_ascii_case("WORLD") => Self::World,
            t if t.eq_ignore_ascii_case("GAME") => Self::Game,
            _ => Self::None,
        }
    }

    /// Whether a full restart is required.
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::Game)
    }

    /// Whether a world reload is required.
    pub fn requires_reload(&self) -> bool {
        matches!(self, Self::World)
    }
}

impl fmt::Display for ReloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One declared configuration value and its storage binding.
pub struct ConfigEntry {
    key: String,
    comments: Vec<String>,
    structure: StructuredType,
    default_text: String,
    current_text: String,
    reload: ReloadMode,
    hidden: bool,
    forced: bool,
    filter: Option<Validator>,
    suggestions: Vec<Arc<dyn SuggestionProvider>>,
    limitations: Option<String>,
    node: Option<StagedNode>,
}

impl ConfigEntry {
    /// Declare an entry of an arbitrary shape with a serialized default.
    pub fn new(
        key: impl Into<String>,
        structure: StructuredType,
        default_text: impl Into<String>,
    ) -> Self {
        let default_text = default_text.into();
        Self {
            key: key.into(),
            comments: Vec::new(),
            structure,
            current_text: default_text.clone(),
            default_text,
            reload: ReloadMode::None,
            hidden: false,
            forced: false,
            filter: None,
            suggestions: Vec::new(),
            limitations: None,
            node: None,
        }
    }

    /// Declare a boolean entry.
    pub fn bool_value(key: impl Into<String>, default: bool) -> Self {
        Self::new(
            key,
            StructuredType::Simple(SimpleType::boolean()),
            default.to_string(),
        )
    }

    /// Declare an integer entry.
    pub fn int_value(key: impl Into<String>, default: i64) -> Self {
        Self::new(
            key,
            StructuredType::Simple(SimpleType::integer()),
            default.to_string(),
        )
    }

    /// Declare a decimal entry.
    pub fn double_value(key: impl Into<String>, default: f64) -> Self {
        Self::new(
            key,
            StructuredType::Simple(SimpleType::double()),
            default.to_string(),
        )
    }

    /// Declare a string entry.
    pub fn string_value(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(key, StructuredType::Simple(SimpleType::string()), default)
    }

    /// Declare an enum entry; its constants are auto-suggested.
    pub fn enum_value<S: Into<String> + Clone>(
        key: impl Into<String>,
        default: impl Into<String>,
        constants: &[S],
    ) -> Self {
        let simple = SimpleType::enumeration(constants.iter().cloned());
        let mut entry = Self::new(key, StructuredType::Simple(simple), default);
        entry
            .suggestions
            .push(Arc::new(StaticSuggestions::of_values(
                constants.iter().cloned(),
            )));
        entry
    }

    /// Declare a list-of-strings entry.
    pub fn array_value<S: AsRef<str>>(key: impl Into<String>, defaults: &[S]) -> Self {
        Self::new(
            key,
            StructuredType::List(ListType::new(StructuredType::Simple(SimpleType::string()))),
            codec::merge_layered(defaults.iter().map(AsRef::as_ref)),
        )
    }

    /// Declare a list-of-enums entry; its constants are auto-suggested.
    pub fn enum_list_value<S: Into<String> + Clone, D: AsRef<str>>(
        key: impl Into<String>,
        defaults: &[D],
        constants: &[S],
    ) -> Self {
        let element = StructuredType::Simple(SimpleType::enumeration(constants.iter().cloned()));
        let list = ListType::new(element).with_suggestions(Arc::new(
            StaticSuggestions::of_values(constants.iter().cloned()),
        ));
        let mut entry = Self::new(
            key,
            StructuredType::List(list),
            codec::merge_layered(defaults.iter().map(AsRef::as_ref)),
        );
        entry
            .suggestions
            .push(Arc::new(StaticSuggestions::of_values(
                constants.iter().cloned(),
            )));
        entry
    }

    /// Declare a list entry of an arbitrary element shape.
    ///
    /// `defaults` are already-encoded element payloads.
    pub fn list_value<S: AsRef<str>>(
        key: impl Into<String>,
        element: StructuredType,
        defaults: &[S],
    ) -> Self {
        Self::new(
            key,
            StructuredType::List(ListType::new(element)),
            codec::merge_layered(defaults.iter().map(AsRef::as_ref)),
        )
    }

    /// Declare a compound entry with per-field default payloads.
    pub fn compound_value<S: AsRef<str>>(
        key: impl Into<String>,
        compound: CompoundType,
        field_defaults: &[S],
    ) -> Self {
        let default = codec::merge_layered(field_defaults.iter().map(AsRef::as_ref));
        Self::new(key, StructuredType::Compound(compound), default)
    }

    /// Declare a custom-variant scalar entry.
    pub fn variant_value(
        key: impl Into<String>,
        simple: SimpleType,
        default: impl Into<String>,
    ) -> Self {
        Self::new(key, StructuredType::Simple(simple), default)
    }

    /// Attach comment lines.
    pub fn comment<S: Into<String>>(&mut self, lines: impl IntoIterator<Item = S>) -> &mut Self {
        self.comments.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Exclude this entry from enumeration.
    pub fn set_hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    /// Set the reload requirement.
    pub fn set_reload(&mut self, reload: ReloadMode) -> &mut Self {
        self.reload = reload;
        self
    }

    /// Attach a suggestion provider.
    pub fn add_suggestions(&mut self, provider: Arc<dyn SuggestionProvider>) -> &mut Self {
        self.suggestions.push(provider);
        self
    }

    /// Mark the suggestion set as the exhaustive set of legal values.
    pub fn force_suggestions(&mut self, forced: bool) -> &mut Self {
        self.forced = forced;
        self
    }

    /// Attach a value filter composed into [`Self::can_set_value`].
    pub fn with_filter(
        &mut self,
        filter: impl Fn(&str) -> ParseResult<bool> + Send + Sync + 'static,
    ) -> &mut Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Constrain an integer entry to an inclusive range.
    pub fn int_range(&mut self, min: i64, max: i64) -> &mut Self {
        self.limitations = Some(format!("Range: {min} ~ {max}"));
        self.filter = Some(Arc::new(move |text: &str| {
            codec::parse_int(text).map(|value| value >= min && value <= max)
        }));
        self
    }

    /// Constrain a decimal entry to an inclusive range.
    pub fn double_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.limitations = Some(format!("Range: {min} ~ {max}"));
        self.filter = Some(Arc::new(move |text: &str| {
            codec::parse_double(text).map(|value| value >= min && value <= max)
        }));
        self
    }

    /// The entry key (unique within its section).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Comment lines attached to the entry.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// The declared shape.
    pub fn structure(&self) -> &StructuredType {
        &self.structure
    }

    /// The reload requirement.
    pub fn reload_mode(&self) -> ReloadMode {
        self.reload
    }

    /// Whether the entry is excluded from enumeration.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether suggestions are the exhaustive set of legal values.
    pub fn forces_suggestions(&self) -> bool {
        self.forced
    }

    /// Human-readable constraint summary, when one exists.
    pub fn limitations(&self) -> Option<&str> {
        self.limitations.as_deref()
    }

    /// The current persisted text.
    pub fn serialized(&self) -> &str {
        &self.current_text
    }

    /// The default persisted text.
    pub fn serialized_default(&self) -> &str {
        &self.default_text
    }

    /// Collect suggestions from every attached provider.
    pub fn get_suggestions(&self, filter: &dyn Fn(&Suggestion) -> bool) -> Vec<Suggestion> {
        collect_suggestions(&self.suggestions, filter)
    }

    /// Whether a candidate is currently legal for this entry.
    ///
    /// Composes structural validity (per-kind parse; for lists, the
    /// candidate is a single element payload) with the entry filter.
    pub fn can_set_value(&self, registry: &VariantRegistry, candidate: &str) -> ParseResult<bool> {
        check_candidate(&self.structure, self.filter.as_ref(), registry, candidate)
    }

    /// The staged node tree, built lazily from the current text.
    pub fn node(&mut self, registry: &Arc<VariantRegistry>) -> &mut StagedNode {
        if self.node.is_none() {
            debug!(key = %self.key, "building staged node");
            let seed = NodeSeed {
                validator: self.validator(registry),
                suggestions: self.suggestions.clone(),
                forced: self.forced,
                reload: self.reload,
                registry: registry.clone(),
            };
            self.node = Some(StagedNode::build(
                &self.structure,
                &self.current_text,
                &self.default_text,
                seed,
            ));
        }
        self.node.as_mut().expect("node built above")
    }

    /// The staged node tree, when it has been built.
    pub fn node_if_built(&self) -> Option<&StagedNode> {
        self.node.as_ref()
    }

    /// Flush the staged tree (if built) and write through the store.
    pub fn save(&mut self, store: &mut dyn ValueStore, full_key: &str) {
        if let Some(node) = &self.node {
            let mut text = String::new();
            node.flush(&mut |s| text = s.to_string());
            self.current_text = text;
        }
        debug!(key = full_key, "saving entry");
        store.write(full_key, &self.current_text);
    }

    /// Replace the persisted text and drop any staged tree.
    pub fn restore(&mut self, text: impl Into<String>) {
        self.current_text = text.into();
        self.node = None;
    }

    fn validator(&self, registry: &Arc<VariantRegistry>) -> Validator {
        let structure = self.structure.clone();
        let filter = self.filter.clone();
        let registry = registry.clone();
        Arc::new(move |candidate: &str| {
            check_candidate(&structure, filter.as_ref(), &registry, candidate)
        })
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("key", &self.key)
            .field("structure", &self.structure)
            .field("current", &self.current_text)
            .field("default", &self.default_text)
            .field("reload", &self.reload)
            .field("hidden", &self.hidden)
            .finish()
    }
}

fn check_candidate(
    structure: &StructuredType,
    filter: Option<&Validator>,
    registry: &VariantRegistry,
    candidate: &str,
) -> ParseResult<bool> {
    let structural = match structure {
        StructuredType::List(list) => registry.check_text(list.element(), candidate),
        other => registry.check_text(other, candidate),
    };
    if structural.has_error() {
        return structural;
    }
    match filter {
        Some(filter) => (**filter)(candidate),
        None => ParseResult::success(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<VariantRegistry> {
        Arc::new(VariantRegistry::new())
    }

    #[test]
    fn test_int_entry_rejects_malformed_text() {
        let entry = ConfigEntry::int_value("Simple Number", 0);
        let registry = registry();
        assert!(entry.can_set_value(&registry, "5").is_accepted());
        let result = entry.can_set_value(&registry, "abc");
        assert!(result.has_error());
        assert!(!result.is_accepted());
    }

    #[test]
    fn test_range_filter_composes() {
        let mut entry = ConfigEntry::int_value("Simple Number Range", 50);
        entry.int_range(0, 100);
        let registry = registry();
        assert!(entry.can_set_value(&registry, "100").is_accepted());
        assert!(!entry.can_set_value(&registry, "101").is_accepted());
        assert_eq!(entry.limitations(), Some("Range: 0 ~ 100"));
    }

    #[test]
    fn test_string_filter() {
        let mut entry = ConfigEntry::string_value("Filtered String", "Requires a . in here");
        entry.with_filter(|text| ParseResult::success(text.contains('.')));
        let registry = registry();
        assert!(entry.can_set_value(&registry, "with. dot").is_accepted());
        assert!(!entry.can_set_value(&registry, "no dot").is_accepted());
    }

    #[test]
    fn test_array_entry_validates_single_elements() {
        let entry = ConfigEntry::enum_list_value::<_, &str>(
            "Simple Enum List",
            &[],
            &["BLACK", "WHITE"],
        );
        let registry = registry();
        assert!(entry.can_set_value(&registry, "black").is_accepted());
        assert!(!entry.can_set_value(&registry, "purple").is_accepted());
    }

    #[test]
    fn test_lazy_node_and_save() {
        let mut entry = ConfigEntry::string_value("Simple String", "Testing");
        let registry = registry();
        assert!(entry.node_if_built().is_none());
        entry.node(&registry).set("Edited");
        entry.node(&registry).apply();

        let mut store = crate::store::MemoryStore::new();
        entry.save(&mut store, "section.Simple String");
        assert_eq!(store.read("section.Simple String").as_deref(), Some("Edited"));
        assert_eq!(entry.serialized(), "Edited");
    }

    #[test]
    fn test_restore_drops_node() {
        let mut entry = ConfigEntry::string_value("Simple String", "Testing");
        let registry = registry();
        entry.node(&registry);
        assert!(entry.node_if_built().is_some());
        entry.restore("Reloaded");
        assert!(entry.node_if_built().is_none());
        assert_eq!(entry.serialized(), "Reloaded");
    }

    #[test]
    fn test_enum_entry_suggests_constants() {
        let entry = ConfigEntry::enum_value("Simple Enum", "BLACK", &["BLACK", "WHITE"]);
        let values: Vec<_> = entry
            .get_suggestions(&|_| true)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, ["BLACK", "WHITE"]);
    }

    #[test]
    fn test_reload_mode_tags() {
        assert_eq!(ReloadMode::from_tag("world"), ReloadMode::World);
        assert_eq!(ReloadMode::from_tag("GAME"), ReloadMode::Game);
        assert_eq!(ReloadMode::from_tag("other"), ReloadMode::None);
        assert!(ReloadMode::Game.requires_restart());
        assert!(ReloadMode::World.requires_reload());
    }
}
