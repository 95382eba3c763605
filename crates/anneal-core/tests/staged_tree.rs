//! End-to-end tests for the staged value tree: checkpoint stacking,
//! revert/apply semantics, list editing, and nested record round-trips.

use std::sync::Arc;

use anneal_core::codec;
use anneal_core::{
    CompoundBuilder, CompoundType, Config, ConfigEntry, SimpleType, StructuredType,
    VariantRegistry,
};

fn registry() -> Arc<VariantRegistry> {
    Arc::new(VariantRegistry::new())
}

fn name_year() -> CompoundType {
    let mut builder = CompoundBuilder::new();
    builder
        .simple("Name", SimpleType::string())
        .comments(["Testing my ", "New Line Comment"])
        .finish();
    builder.simple("Year", SimpleType::integer()).finish();
    builder.build()
}

fn person(name: &str, year: &str) -> String {
    codec::merge_layered([name, year])
}

#[test]
fn test_compound_encode_decode_round_trip() {
    let registry = registry();
    let mut entry = ConfigEntry::compound_value("Single Example", name_year(), &["Testing", "2000"]);
    let node = entry.node(&registry);

    let compound = node.as_compound().expect("compound node");
    assert_eq!(compound.values()[0].get(), "Testing");
    assert_eq!(compound.values()[1].get(), "2000");

    // Re-decoding the encoded record yields the same two field strings.
    let encoded = compound.get();
    assert_eq!(codec::split_layered(&encoded), vec!["Testing", "2000"]);

    let mut reparsed = ConfigEntry::compound_value("Copy", name_year(), &["", ""]);
    reparsed.restore(encoded);
    let copy = reparsed.node(&registry);
    let copy = copy.as_compound().expect("compound node");
    assert_eq!(copy.values()[0].get(), "Testing");
    assert_eq!(copy.values()[1].get(), "2000");
}

#[test]
fn test_array_remove_keeps_remaining_order() {
    let registry = registry();
    let defaults = [
        person("Zero", "0"),
        person("One", "1"),
        person("Two", "2"),
    ];
    let mut entry = ConfigEntry::list_value(
        "Array Example",
        StructuredType::Compound(name_year()),
        &defaults,
    );
    let array = entry.node(&registry).as_array_mut().expect("array node");
    assert_eq!(array.len(), 3);

    array.remove_node(1);
    assert_eq!(array.len(), 2);
    let first = array.node(0).unwrap().as_compound().unwrap();
    let second = array.node(1).unwrap().as_compound().unwrap();
    assert_eq!(first.values()[0].get(), "Zero");
    assert_eq!(second.values()[0].get(), "Two");
}

#[test]
fn test_reset_to_default_keeps_history_mark() {
    let registry = registry();
    let mut entry = ConfigEntry::int_value("Counter", 0);
    entry.restore("5");
    let node = entry.node(&registry);

    assert!(!node.is_default());
    node.set_default();
    assert!(node.is_default());
    // Still changed: the history top is the original "5".
    assert!(node.is_changed());
    assert_eq!(node.get(), "0");
}

#[test]
fn test_invalid_candidate_leaves_current_untouched() {
    let registry = registry();
    let mut entry = ConfigEntry::int_value("Counter", 0);
    let node = entry.node(&registry);

    let verdict = node.is_valid("abc");
    assert!(verdict.has_error());
    assert!(!verdict.is_accepted());
    // The apply gate refuses the edit, so current stays as it was.
    if verdict.is_accepted() {
        node.set("abc");
    }
    assert_eq!(node.get(), "0");
}

#[test]
fn test_nested_revert_restores_presession_state() {
    let registry = registry();
    let mut entry = ConfigEntry::string_value("Greeting", "hello");
    let node = entry.node(&registry);

    for _ in 0..3 {
        node.create_temp();
        node.set("edited");
    }
    for _ in 0..3 {
        node.set_previous();
    }
    assert_eq!(node.get(), "hello");
    assert!(!node.is_changed());
    assert_eq!(node.as_value().unwrap().history_depth(), 1);
}

#[test]
fn test_nested_apply_keeps_edits_and_unwinds_history() {
    let registry = registry();
    let mut entry = ConfigEntry::string_value("Greeting", "hello");
    let node = entry.node(&registry);

    for _ in 0..3 {
        node.create_temp();
    }
    node.set("edited");
    for _ in 0..3 {
        node.apply();
    }
    assert_eq!(node.get(), "edited");
    assert_eq!(node.as_value().unwrap().history_depth(), 1);
}

#[test]
fn test_revert_at_floor_is_a_noop() {
    let registry = registry();
    let mut entry = ConfigEntry::string_value("Greeting", "hello");
    let node = entry.node(&registry);

    node.set("edited");
    node.set_previous();
    assert_eq!(node.get(), "hello");
    // The floor snapshot survives any number of further reverts.
    node.set_previous();
    node.set_previous();
    assert_eq!(node.get(), "hello");
    assert_eq!(node.as_value().unwrap().history_depth(), 1);
}

#[test]
fn test_set_default_is_idempotent() {
    let registry = registry();
    let mut entry = ConfigEntry::string_value("Greeting", "hello");
    entry.restore("changed");
    let node = entry.node(&registry);

    node.set_default();
    let after_one = node.get();
    node.set_default();
    assert_eq!(node.get(), after_one);
    assert!(node.is_default());
}

#[test]
fn test_reorder_is_noop_at_boundaries() {
    let registry = registry();
    let mut entry = ConfigEntry::array_value("Words", &["One", "Two", "Three"]);
    let array = entry.node(&registry).as_array_mut().expect("array node");

    array.move_up(0);
    array.move_down(2);
    let words: Vec<_> = (0..3).map(|i| array.node(i).unwrap().get()).collect();
    assert_eq!(words, ["One", "Two", "Three"]);

    array.move_down(0);
    let words: Vec<_> = (0..3).map(|i| array.node(i).unwrap().get()).collect();
    assert_eq!(words, ["Two", "One", "Three"]);
}

#[test]
fn test_create_node_seeds_from_unused_defaults() {
    let registry = registry();
    let mut entry = ConfigEntry::array_value("Words", &["One", "Two"]);
    entry.restore(codec::merge_layered(["One"]));
    let array = entry.node(&registry).as_array_mut().expect("array node");
    assert_eq!(array.len(), 1);

    // Next unused declared default first, then the generated default.
    let index = array.create_node();
    assert_eq!(index, 1);
    assert_eq!(array.node(1).unwrap().get(), "Two");

    let index = array.create_node();
    assert_eq!(index, 2);
    assert_eq!(array.node(2).unwrap().get(), " ");
}

#[test]
fn test_array_apply_pulls_child_edits() {
    let registry = registry();
    let mut entry = ConfigEntry::array_value("Words", &["One", "Two"]);
    let array = entry.node(&registry).as_array_mut().expect("array node");

    array.create_temp();
    array.node_mut(0).unwrap().set("Edited");
    assert!(!array.is_changed());
    array.apply();
    assert_eq!(array.get(), codec::merge_layered(["Edited", "Two"]));
}

#[test]
fn test_array_revert_rebuilds_children() {
    let registry = registry();
    let mut entry = ConfigEntry::array_value("Words", &["One", "Two"]);
    let array = entry.node(&registry).as_array_mut().expect("array node");

    array.create_temp();
    array.remove_node(0);
    array.create_node();
    array.set_previous();
    assert_eq!(array.len(), 2);
    assert_eq!(array.node(0).unwrap().get(), "One");
    assert_eq!(array.node(1).unwrap().get(), "Two");
}

#[test]
fn test_compound_field_validation_does_not_commit() {
    let registry = registry();
    let mut entry = ConfigEntry::compound_value("Single Example", name_year(), &["Testing", "2000"]);
    let compound = entry.node(&registry).as_compound().expect("compound node");

    let verdict = compound.is_valid_field("Year", "abc");
    assert!(verdict.has_error());
    assert_eq!(compound.field("Year").unwrap().get(), "2000");

    assert!(compound.is_valid_field("Year", "2024").is_accepted());
    assert!(compound
        .is_valid_field("Missing", "anything")
        .has_error());
}

#[test]
fn test_depth_three_round_trip() {
    // Compound { People: List<Compound { Name, Year }>, Title: String }
    let mut builder = CompoundBuilder::new();
    builder
        .list("People", StructuredType::Compound(name_year()))
        .finish();
    builder.simple("Title", SimpleType::string()).finish();
    let outer = builder.build();

    let people = codec::merge_layered([person("Ada", "1815"), person("Alan", "1912")]);
    let default = codec::merge_layered([people.as_str(), "Pioneers [escaped]"]);

    let registry = registry();
    let mut entry = ConfigEntry::compound_value(
        "Deep",
        outer.clone(),
        &[people.as_str(), "Pioneers [escaped]"],
    );
    let node = entry.node(&registry);
    assert_eq!(node.get(), default);

    let compound = node.as_compound().expect("compound node");
    let list = compound.field("People").unwrap().as_array().expect("array field");
    assert_eq!(list.len(), 2);
    let alan = list.node(1).unwrap().as_compound().unwrap();
    assert_eq!(alan.values()[0].get(), "Alan");
    assert_eq!(alan.values()[1].get(), "1912");
    assert_eq!(compound.field("Title").unwrap().get(), "Pioneers [escaped]");

    // Decode of the encode is the value we started from.
    let mut copy = ConfigEntry::compound_value("Copy", outer, &["", ""]);
    copy.restore(node.get());
    assert_eq!(copy.node(&registry).get(), default);
}

#[test]
fn test_empty_list_is_distinct_from_empty_element() {
    let registry = registry();
    let mut none = ConfigEntry::array_value::<&str>("Empty", &[]);
    assert_eq!(none.node(&registry).as_array().unwrap().len(), 0);
    assert_eq!(none.node(&registry).get(), "");

    let mut one = ConfigEntry::array_value("One Blank", &[""]);
    assert_eq!(one.node(&registry).as_array().unwrap().len(), 1);
    assert_eq!(one.node(&registry).get(), "[]");
}

#[test]
fn test_short_compound_input_pads_fields() {
    let registry = registry();
    let mut entry = ConfigEntry::compound_value("Padded", name_year(), &["Testing", "2000"]);
    entry.restore(codec::merge_layered(["OnlyName"]));
    let compound = entry.node(&registry).as_compound().expect("compound node");
    assert_eq!(compound.values()[0].get(), "OnlyName");
    assert_eq!(compound.values()[1].get(), "");
}

#[test]
fn test_config_level_editing_session() {
    let registry = registry();
    let mut config = Config::new("unittest");
    let section = config.add("simple-entries");
    section.add_string("Simple String", "Testing");
    section
        .add_int("Simple Number Range", 50)
        .int_range(0, 100);

    let entry = config.entry_mut("simple-entries.Simple Number Range").unwrap();
    let node = entry.node(&registry);
    node.create_temp();
    assert!(!node.is_valid("250").is_accepted());
    assert!(node.is_valid("75").is_accepted());
    node.set("75");
    node.apply();

    let mut store = anneal_core::MemoryStore::new();
    config.save(&mut store);
    assert_eq!(
        anneal_core::ValueStore::read(&store, "simple-entries.Simple Number Range").as_deref(),
        Some("75")
    );
}
