use std::collections::BTreeMap;

use serde_json::json;

use crate::definition::{FormatTranslator, PluginDefinition, TranslatableMarkup, Value};

#[test]
fn test_from_json_copies_nested_structures() {
    let value = Value::from(json!({
        "id": "foo",
        "weight": 3,
        "ratio": 0.5,
        "tags": ["a", "b"],
        "nested": { "enabled": true, "none": null },
    }));

    let map = value.as_map().expect("map");
    assert_eq!(map["id"], Value::String("foo".into()));
    assert_eq!(map["weight"], Value::Integer(3));
    assert_eq!(map["ratio"], Value::Float(0.5));
    assert_eq!(
        map["tags"],
        Value::List(vec![Value::from("a"), Value::from("b")])
    );
    let nested = map["nested"].as_map().expect("nested map");
    assert_eq!(nested["enabled"], Value::Bool(true));
    assert!(nested["none"].is_null());
}

#[test]
fn test_markup_survives_serialization() {
    let mut definition = PluginDefinition::new();
    definition.insert("id", "foo");
    definition.insert("label", TranslatableMarkup::new("Foo @x").argument("@x", "1"));
    definition.insert("weight", 0i64);
    definition.insert("settings", Value::Map(BTreeMap::new()));

    let encoded = serde_json::to_string(&definition).unwrap();
    let decoded: PluginDefinition = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, definition);
    assert!(decoded.label().unwrap().as_markup().is_some());
    assert_eq!(decoded.get("settings"), Some(&Value::Map(BTreeMap::new())));
}

#[test]
fn test_definition_serializes_as_plain_json() {
    let definition: PluginDefinition = [("id", Value::from("foo")), ("weight", Value::from(2i64))]
        .into_iter()
        .collect();
    let encoded = serde_json::to_value(&definition).unwrap();
    assert_eq!(encoded, json!({ "id": "foo", "weight": 2 }));
}

#[test]
fn test_render_only_text_values() {
    let translator = FormatTranslator;
    assert_eq!(Value::from("Foo").render(&translator), Some("Foo".to_string()));
    assert_eq!(
        Value::from(TranslatableMarkup::new("Bar")).render(&translator),
        Some("Bar".to_string())
    );
    assert_eq!(Value::Integer(1).render(&translator), None);
}

#[test]
fn test_accessors_ignore_non_string_ids() {
    let mut definition = PluginDefinition::new();
    definition.insert("id", 5i64);
    assert_eq!(definition.id(), None);
    definition.insert("id", "five");
    assert_eq!(definition.id(), Some("five"));
    assert_eq!(definition.class(), None);
}
