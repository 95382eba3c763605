//! Section tree
//!
//! A [`Config`] owns named sections; sections own entries and child
//! sections. Entry addresses are dotted paths (`section.sub.Key`).
//! Enumeration skips hidden entries; persistence and sync include them.

use tracing::debug;

use crate::entry::ConfigEntry;
use crate::snapshot::{self, SnapshotRecord};
use crate::store::ValueStore;
use crate::structure::{CompoundType, SimpleType, StructuredType};

/// A named group of entries and child sections.
#[derive(Debug, Default)]
pub struct ConfigSection {
    name: String,
    sections: Vec<ConfigSection>,
    entries: Vec<ConfigEntry>,
}

impl ConfigSection {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// The section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get or create a child section.
    pub fn section(&mut self, name: &str) -> &mut ConfigSection {
        if let Some(index) = self.sections.iter().position(|s| s.name == name) {
            return &mut self.sections[index];
        }
        self.sections.push(ConfigSection::new(name));
        self.sections.last_mut().expect("just pushed")
    }

    /// Add a pre-built entry and return it for further configuration.
    pub fn add(&mut self, entry: ConfigEntry) -> &mut ConfigEntry {
        self.entries.push(entry);
        self.entries.last_mut().expect("just pushed")
    }

    /// Add a boolean entry.
    pub fn add_bool(&mut self, key: impl Into<String>, default: bool) -> &mut ConfigEntry {
        self.add(ConfigEntry::bool_value(key, default))
    }

    /// Add an integer entry.
    pub fn add_int(&mut self, key: impl Into<String>, default: i64) -> &mut ConfigEntry {
        self.add(ConfigEntry::int_value(key, default))
    }

    /// Add a decimal entry.
    pub fn add_double(&mut self, key: impl Into<String>, default: f64) -> &mut ConfigEntry {
        self.add(ConfigEntry::double_value(key, default))
    }

    /// Add a string entry.
    pub fn add_string(
        &mut self,
        key: impl Into<String>,
        default: impl Into<String>,
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::string_value(key, default))
    }

    /// Add an enum entry.
    pub fn add_enum<S: Into<String> + Clone>(
        &mut self,
        key: impl Into<String>,
        default: impl Into<String>,
        constants: &[S],
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::enum_value(key, default, constants))
    }

    /// Add a list-of-strings entry.
    pub fn add_array<S: AsRef<str>>(
        &mut self,
        key: impl Into<String>,
        defaults: &[S],
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::array_value(key, defaults))
    }

    /// Add a list-of-enums entry.
    pub fn add_enum_list<S: Into<String> + Clone, D: AsRef<str>>(
        &mut self,
        key: impl Into<String>,
        defaults: &[D],
        constants: &[S],
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::enum_list_value(key, defaults, constants))
    }

    /// Add a list entry of an arbitrary element shape.
    pub fn add_list<S: AsRef<str>>(
        &mut self,
        key: impl Into<String>,
        element: StructuredType,
        defaults: &[S],
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::list_value(key, element, defaults))
    }

    /// Add a compound entry.
    pub fn add_compound<S: AsRef<str>>(
        &mut self,
        key: impl Into<String>,
        compound: CompoundType,
        field_defaults: &[S],
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::compound_value(key, compound, field_defaults))
    }

    /// Add a custom-variant scalar entry.
    pub fn add_variant(
        &mut self,
        key: impl Into<String>,
        simple: SimpleType,
        default: impl Into<String>,
    ) -> &mut ConfigEntry {
        self.add(ConfigEntry::variant_value(key, simple, default))
    }

    /// Child sections, in declaration order.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    /// Entries declared in this section, hidden ones included.
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Mutable access to this section's entries.
    pub fn entries_mut(&mut self) -> &mut [ConfigEntry] {
        &mut self.entries
    }

    /// Entries visible to enumeration (hidden ones skipped).
    pub fn visible_entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.iter().filter(|entry| !entry.is_hidden())
    }

    /// Look up an entry declared directly in this section.
    pub fn entry(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.iter().find(|entry| entry.key() == key)
    }

    /// Mutable entry lookup.
    pub fn entry_mut(&mut self, key: &str) -> Option<&mut ConfigEntry> {
        self.entries.iter_mut().find(|entry| entry.key() == key)
    }

    fn walk(&self, prefix: &str, visit: &mut dyn FnMut(String, &ConfigEntry)) {
        for entry in &self.entries {
            visit(join_path(prefix, entry.key()), entry);
        }
        for section in &self.sections {
            section.walk(&join_path(prefix, &section.name), visit);
        }
    }

    fn walk_mut(&mut self, prefix: &str, visit: &mut dyn FnMut(String, &mut ConfigEntry)) {
        for entry in &mut self.entries {
            let path = join_path(prefix, entry.key());
            visit(path, entry);
        }
        for section in &mut self.sections {
            let path = join_path(prefix, &section.name);
            section.walk_mut(&path, visit);
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn lookup_mut<'a>(
    sections: &'a mut [ConfigSection],
    segments: &[&str],
    key: &str,
) -> Option<&'a mut ConfigEntry> {
    let (first, rest) = segments.split_first()?;
    let section = sections.iter_mut().find(|s| s.name() == *first)?;
    if rest.is_empty() {
        section.entry_mut(key)
    } else {
        lookup_mut(&mut section.sections, rest, key)
    }
}

/// The root of a declared configuration.
#[derive(Debug, Default)]
pub struct Config {
    name: String,
    sections: Vec<ConfigSection>,
}

impl Config {
    /// Create an empty config.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    /// The config identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get or create a top-level section.
    pub fn add(&mut self, name: &str) -> &mut ConfigSection {
        if let Some(index) = self.sections.iter().position(|s| s.name() == name) {
            return &mut self.sections[index];
        }
        self.sections.push(ConfigSection::new(name));
        self.sections.last_mut().expect("just pushed")
    }

    /// Top-level sections, in declaration order.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    /// Visit every entry with its dotted path, hidden ones included.
    pub fn for_each_entry(&self, mut visit: impl FnMut(String, &ConfigEntry)) {
        for section in &self.sections {
            section.walk(section.name(), &mut visit);
        }
    }

    /// Visit every entry mutably with its dotted path.
    pub fn for_each_entry_mut(&mut self, mut visit: impl FnMut(String, &mut ConfigEntry)) {
        for section in &mut self.sections {
            let prefix = section.name().to_string();
            section.walk_mut(&prefix, &mut visit);
        }
    }

    /// Dotted paths of every entry visible to enumeration.
    pub fn visible_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.for_each_entry(|path, entry| {
            if !entry.is_hidden() {
                paths.push(path);
            }
        });
        paths
    }

    /// Look up an entry by dotted path.
    ///
    /// Path segments are split on `.`; section and entry names containing
    /// a dot are not addressable this way.
    pub fn entry(&self, path: &str) -> Option<&ConfigEntry> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let key = segments.pop()?;
        let mut sections = &self.sections;
        let mut target: Option<&ConfigSection> = None;
        for segment in segments {
            let next = sections.iter().find(|s| s.name() == segment)?;
            sections = &next.sections;
            target = Some(next);
        }
        target?.entry(key)
    }

    /// Mutable entry lookup by dotted path.
    pub fn entry_mut(&mut self, path: &str) -> Option<&mut ConfigEntry> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let key = segments.pop()?;
        lookup_mut(&mut self.sections, &segments, key)
    }

    /// Write every entry through the store, flushing staged trees.
    pub fn save(&mut self, store: &mut dyn ValueStore) {
        debug!(config = %self.name, "saving config");
        self.for_each_entry_mut(|path, entry| entry.save(store, &path));
    }

    /// Restore every entry present in the store, dropping staged trees.
    pub fn load(&mut self, store: &dyn ValueStore) {
        debug!(config = %self.name, "loading config");
        self.for_each_entry_mut(|path, entry| {
            if let Some(text) = store.read(&path) {
                entry.restore(text);
            }
        });
    }

    /// Serialize the whole config into the snapshot text format.
    pub fn snapshot(&self) -> String {
        let mut records = Vec::new();
        self.for_each_entry(|path, entry| {
            records.push(SnapshotRecord {
                key: path,
                value: entry.serialized().to_string(),
                comments: entry.comments().to_vec(),
                reload: entry.reload_mode(),
                hidden: entry.is_hidden(),
                forced: entry.forces_suggestions(),
            });
        });
        snapshot::write_snapshot(records)
    }

    /// Apply values from snapshot text; unknown keys are skipped.
    ///
    /// Only values are applied: the declared schema stays authoritative
    /// for comments, reload requirements, and flags.
    pub fn apply_snapshot(&mut self, text: &str) {
        let records = snapshot::parse_snapshot(text);
        for record in records {
            let mut applied = false;
            self.for_each_entry_mut(|path, entry| {
                if !applied && path == record.key {
                    entry.restore(record.value.clone());
                    applied = true;
                }
            });
            if !applied {
                debug!(key = %record.key, "snapshot key not declared, skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VariantRegistry;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn sample_config() -> Config {
        let mut config = Config::new("unittest");
        let simple = config.add("simple-entries");
        simple.add_bool("Flag", false);
        simple
            .add_int("Simple Number Range", 50)
            .int_range(0, 100)
            .comment(["Multi", "Comment", "Example"]);
        simple.add_bool("Hidden Flag", false).set_hidden();
        let nested = simple.section("nested");
        nested.add_string("Inner", "value");
        config
    }

    #[test]
    fn test_dotted_path_lookup() {
        let config = sample_config();
        assert!(config.entry("simple-entries.Flag").is_some());
        assert!(config.entry("simple-entries.nested.Inner").is_some());
        assert!(config.entry("simple-entries.Missing").is_none());
        assert!(config.entry("other.Flag").is_none());
    }

    #[test]
    fn test_hidden_entries_skip_enumeration() {
        let config = sample_config();
        let paths = config.visible_paths();
        assert!(paths.contains(&"simple-entries.Flag".to_string()));
        assert!(!paths.contains(&"simple-entries.Hidden Flag".to_string()));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let registry = Arc::new(VariantRegistry::new());
        let mut config = sample_config();
        let mut store = MemoryStore::new();

        let entry = config.entry_mut("simple-entries.Flag").unwrap();
        entry.node(&registry).set("true");
        entry.node(&registry).apply();
        config.save(&mut store);
        assert_eq!(store.read("simple-entries.Flag").as_deref(), Some("true"));

        let mut fresh = sample_config();
        fresh.load(&store);
        assert_eq!(
            fresh.entry("simple-entries.Flag").unwrap().serialized(),
            "true"
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut config = sample_config();
        let snapshot = config.snapshot();
        assert!(snapshot.contains("simple-entries.Flag = false"));

        let mut other = sample_config();
        other
            .entry_mut("simple-entries.Flag")
            .unwrap()
            .restore("true");
        other.apply_snapshot(&snapshot);
        assert_eq!(
            other.entry("simple-entries.Flag").unwrap().serialized(),
            "false"
        );
        // Snapshot values do not invent new entries.
        config.apply_snapshot("phantom.Key = 1\n");
        assert!(config.entry("phantom.Key").is_none());
    }
}
