//! # Anneal Core
//!
//! A transactional configuration engine: typed structured values, a
//! staged-edit tree with an undo stack, and a layered-escaping text
//! codec that flattens arbitrarily nested values into single persisted
//! strings.
//!
//! ## Architecture
//!
//! - [`structure`]: shape descriptions (scalar / list / compound) that
//!   drive parsing, validation, and default synthesis
//! - [`codec`]: the flattening text format and per-kind scalar codecs
//! - [`staged`]: the mutable runtime tree with temp/apply/revert
//!   transitions over every node
//! - [`entry`] / [`section`]: the declarative schema and storage binding
//! - [`registry`]: explicit variant-kind registry, passed down through
//!   resolution
//! - [`store`] / [`snapshot`]: the persistence and sync boundaries
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use anneal_core::{Config, MemoryStore, VariantRegistry};
//!
//! let registry = Arc::new(VariantRegistry::new());
//! let mut config = Config::new("example");
//! config.add("general").add_int("Retries", 3).int_range(0, 10);
//!
//! let node = config.entry_mut("general.Retries").unwrap().node(&registry);
//! node.create_temp();
//! node.set("5");
//! assert!(node.is_valid("5").is_accepted());
//! node.apply();
//!
//! let mut store = MemoryStore::new();
//! config.save(&mut store);
//! assert_eq!(store.read("general.Retries").as_deref(), Some("5"));
//! # use anneal_core::ValueStore;
//! ```

pub mod codec;
pub mod entry;
pub mod parse;
pub mod registry;
pub mod section;
pub mod snapshot;
pub mod staged;
pub mod store;
pub mod structure;
pub mod suggest;

pub use entry::{ConfigEntry, ReloadMode};
pub use parse::{ParseError, ParseResult};
pub use registry::{DataKind, VariantParser, VariantRegistry};
pub use section::{Config, ConfigSection};
pub use snapshot::SnapshotRecord;
pub use staged::{StagedArray, StagedCompound, StagedNode, StagedValue, Validator};
pub use store::{MemoryStore, ValueStore};
pub use structure::{
    CompoundBuilder, CompoundField, CompoundType, ListType, ScalarKind, SimpleType, StructureKind,
    StructuredType, VariantTag,
};
pub use suggest::{collect_suggestions, StaticSuggestions, Suggestion, SuggestionProvider};
