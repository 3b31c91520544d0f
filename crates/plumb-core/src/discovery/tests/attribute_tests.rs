use std::collections::BTreeMap;

use crate::definition::Value;
use crate::discovery::attribute::{AttributeCatalog, AttributeType};
use crate::discovery::error::DiscoveryError;
use crate::kernel::constants::PLUGIN_ATTRIBUTE;

fn runner_catalog() -> AttributeCatalog {
    let mut catalog = AttributeCatalog::new();
    catalog
        .register(
            AttributeType::new("runner::Runner")
                .default_value("weight", 0i64)
                .default_value("tags", Value::from(vec![Value::from("base")])),
        )
        .expect("register runner");
    catalog
        .register(
            AttributeType::new("runner::FastRunner")
                .extends("runner::Runner")
                .default_value("weight", 10i64)
                .default_value("fast", true),
        )
        .expect("register fast runner");
    catalog
}

#[test]
fn test_new_catalog_knows_root_attribute() {
    let catalog = AttributeCatalog::new();
    assert!(catalog.contains(PLUGIN_ATTRIBUTE));
    assert!(catalog.is_plugin_attribute(PLUGIN_ATTRIBUTE));
}

#[test]
fn test_register_defaults_parent_to_root() {
    let catalog = runner_catalog();
    let runner = catalog.get("runner::Runner").expect("runner registered");
    assert_eq!(runner.parent(), Some(PLUGIN_ATTRIBUTE));
}

#[test]
fn test_register_rejects_root_and_empty_names() {
    let mut catalog = AttributeCatalog::new();
    assert!(matches!(
        catalog.register(AttributeType::new(PLUGIN_ATTRIBUTE)),
        Err(DiscoveryError::Catalog(_))
    ));
    assert!(matches!(
        catalog.register(AttributeType::new("  ")),
        Err(DiscoveryError::Catalog(_))
    ));
}

#[test]
fn test_chain_is_most_derived_first() {
    let catalog = runner_catalog();
    let names: Vec<&str> = catalog
        .chain("runner::FastRunner")
        .iter()
        .map(|attribute| attribute.name())
        .collect();
    assert_eq!(names, vec!["runner::FastRunner", "runner::Runner", PLUGIN_ATTRIBUTE]);
}

#[test]
fn test_subtype_checks() {
    let catalog = runner_catalog();
    assert!(catalog.is_subtype_of("runner::FastRunner", "runner::Runner"));
    assert!(catalog.is_subtype_of("runner::Runner", "runner::Runner"));
    assert!(!catalog.is_subtype_of("runner::Runner", "runner::FastRunner"));
    assert!(!catalog.is_plugin_attribute("unknown::Attribute"));
}

#[test]
fn test_unrooted_type_is_not_a_plugin_attribute() {
    let mut catalog = AttributeCatalog::new();
    catalog
        .register(AttributeType::new("orphan::Child").extends("orphan::Missing"))
        .expect("register orphan");
    assert!(catalog.contains("orphan::Child"));
    assert!(!catalog.is_plugin_attribute("orphan::Child"));
}

#[test]
fn test_cyclic_parents_terminate() {
    let mut catalog = AttributeCatalog::new();
    catalog
        .register(AttributeType::new("cycle::A").extends("cycle::B"))
        .expect("register A");
    catalog
        .register(AttributeType::new("cycle::B").extends("cycle::A"))
        .expect("register B");
    assert_eq!(catalog.chain("cycle::A").len(), 2);
    assert!(!catalog.is_plugin_attribute("cycle::A"));
}

#[test]
fn test_defaults_most_derived_type_wins() {
    let catalog = runner_catalog();
    let defaults = catalog.defaults_for("runner::FastRunner");

    let mut expected = BTreeMap::new();
    expected.insert("weight".to_string(), Value::Integer(10));
    expected.insert("fast".to_string(), Value::Bool(true));
    expected.insert("tags".to_string(), Value::from(vec![Value::from("base")]));
    assert_eq!(defaults, expected);
}

#[test]
fn test_null_defaults_are_dropped() {
    let mut catalog = AttributeCatalog::new();
    catalog
        .register(
            AttributeType::new("runner::Runner")
                .default_value("description", Value::Null)
                .default_value("weight", 1i64),
        )
        .expect("register runner");

    let defaults = catalog.defaults_for("runner::Runner");
    assert!(!defaults.contains_key("description"));
    assert_eq!(defaults.get("weight"), Some(&Value::Integer(1)));
}
