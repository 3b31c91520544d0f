use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;

use crate::definition::{TranslatableMarkup, Value};
use crate::discovery::attribute::{AttributeCatalog, AttributeType};
use crate::discovery::error::DiscoveryError;
use crate::discovery::normalizer::{deep_merge, provider_from_namespace, MetadataNormalizer};
use crate::discovery::reader::{AttributeInstance, ClassRef, TranslatableSpec};

fn instance(values: serde_json::Value) -> AttributeInstance {
    let serde_json::Value::Object(values) = values else {
        panic!("attribute values must be an object");
    };
    AttributeInstance {
        attribute_type: "runner::Runner".to_string(),
        values,
    }
}

fn class() -> ClassRef {
    ClassRef::resolve(
        "app::runner::Plugin::Runner",
        Path::new(""),
        Path::new("/src/Plugin/Runner/Foo.toml"),
    )
    .expect("valid class")
}

fn catalog_with_defaults() -> AttributeCatalog {
    let mut catalog = AttributeCatalog::new();
    let mut options = BTreeMap::new();
    options.insert("retries".to_string(), Value::Integer(3));
    options.insert("verbose".to_string(), Value::Bool(false));
    catalog
        .register(
            AttributeType::new("runner::Runner")
                .default_value("weight", 0i64)
                .default_value("options", Value::Map(options)),
        )
        .expect("register runner");
    catalog
}

fn normalize(values: serde_json::Value, translatable: Option<&TranslatableSpec>) -> Result<crate::definition::PluginDefinition, DiscoveryError> {
    MetadataNormalizer::new("app").normalize(
        &catalog_with_defaults(),
        &instance(values),
        translatable,
        &class(),
        Path::new("/src/Plugin/Runner/Foo.toml"),
    )
}

#[test]
fn test_declared_values_override_defaults_at_every_level() {
    let definition = normalize(
        json!({"id": "foo", "weight": 5, "options": {"verbose": true}}),
        None,
    )
    .expect("normalize");

    assert_eq!(definition.get("weight"), Some(&Value::Integer(5)));
    let options = definition.get("options").and_then(Value::as_map).expect("options map");
    assert_eq!(options.get("verbose"), Some(&Value::Bool(true)));
    assert_eq!(options.get("retries"), Some(&Value::Integer(3)));
}

#[test]
fn test_declared_null_overrides_default() {
    let definition = normalize(json!({"id": "foo", "weight": null}), None).expect("normalize");
    assert_eq!(definition.get("weight"), Some(&Value::Null));
}

#[test]
fn test_derived_fields_cannot_be_declared() {
    let definition = normalize(
        json!({"id": "foo", "class": "evil::Class", "provider": "evil"}),
        None,
    )
    .expect("normalize");

    assert_eq!(definition.class(), Some("app::runner::Plugin::Runner::Foo"));
    assert_eq!(definition.provider(), Some("runner"));
}

#[test]
fn test_provider_absent_when_vendor_does_not_match() {
    let definition = MetadataNormalizer::new("acme")
        .normalize(
            &catalog_with_defaults(),
            &instance(json!({"id": "foo", "provider": "declared"})),
            None,
            &class(),
            Path::new("/src/Plugin/Runner/Foo.toml"),
        )
        .expect("normalize");

    assert_eq!(definition.provider(), None);
    assert_eq!(definition.class(), Some("app::runner::Plugin::Runner::Foo"));
}

#[test]
fn test_missing_or_invalid_id_is_malformed() {
    for values in [json!({"label": "Foo"}), json!({"id": 7}), json!({"id": "  "})] {
        let err = normalize(values, None).expect_err("id is required");
        assert!(matches!(err, DiscoveryError::MalformedDefinition { .. }));
    }
}

#[test]
fn test_id_with_derivative_separator_is_malformed() {
    let err = normalize(json!({"id": "a:b"}), None).expect_err("separator is reserved");
    assert!(matches!(
        err,
        DiscoveryError::MalformedDefinition { ref message, .. } if message.contains("a:b")
    ));
}

#[test]
fn test_translatable_fields_become_markup() {
    let mut spec = TranslatableSpec::new();
    spec.insert("label".to_string(), BTreeMap::new());
    let mut arguments = BTreeMap::new();
    arguments.insert("@count".to_string(), "2".to_string());
    spec.insert("description".to_string(), arguments.clone());
    spec.insert("missing".to_string(), BTreeMap::new());

    let definition = normalize(
        json!({"id": "foo", "label": "Foo", "description": "Runs @count times"}),
        Some(&spec),
    )
    .expect("normalize");

    assert_eq!(
        definition.label(),
        Some(&Value::Markup(TranslatableMarkup::new("Foo")))
    );
    assert_eq!(
        definition.get("description"),
        Some(&Value::Markup(TranslatableMarkup::with_arguments("Runs @count times", arguments)))
    );
    assert!(!definition.contains_key("missing"));
}

#[test]
fn test_translatable_non_string_is_malformed() {
    let mut spec = TranslatableSpec::new();
    spec.insert("weight".to_string(), BTreeMap::new());

    let err = normalize(json!({"id": "foo", "weight": 3}), Some(&spec)).expect_err("number is not text");
    assert!(matches!(err, DiscoveryError::MalformedDefinition { .. }));
}

#[test]
fn test_deep_merge_lists_by_index() {
    let mut base = BTreeMap::new();
    base.insert(
        "steps".to_string(),
        Value::from(vec![Value::from("a"), Value::from("b"), Value::from("c")]),
    );
    let mut overlay = BTreeMap::new();
    overlay.insert("steps".to_string(), Value::from(vec![Value::from("x")]));

    deep_merge(&mut base, overlay);

    assert_eq!(
        base.get("steps"),
        Some(&Value::from(vec![Value::from("x"), Value::from("b"), Value::from("c")]))
    );
}

#[test]
fn test_deep_merge_scalar_replaces_map() {
    let mut nested = BTreeMap::new();
    nested.insert("a".to_string(), Value::Integer(1));
    let mut base = BTreeMap::new();
    base.insert("options".to_string(), Value::Map(nested));
    let mut overlay = BTreeMap::new();
    overlay.insert("options".to_string(), Value::from("none"));

    deep_merge(&mut base, overlay);
    assert_eq!(base.get("options"), Some(&Value::from("none")));
}

#[test]
fn test_provider_from_namespace() {
    assert_eq!(
        provider_from_namespace("app::Runner::Plugin::Runner::Foo", "app"),
        Some("runner".to_string())
    );
    assert_eq!(provider_from_namespace("app::runner", "app"), None);
    assert_eq!(provider_from_namespace("application::runner::Foo", "app"), None);
    assert_eq!(provider_from_namespace("other::runner::Foo", "app"), None);
}
