use std::collections::BTreeMap;

use crate::definition::markup::{format_placeholders, FormatTranslator, TranslatableMarkup, Translator};

fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_format_without_arguments_returns_template() {
    assert_eq!(format_placeholders("Foo", &BTreeMap::new()), "Foo");
}

#[test]
fn test_format_replaces_all_prefix_styles() {
    let rendered = format_placeholders(
        "@name has %count items in :place",
        &args(&[("@name", "Foo"), ("%count", "3"), (":place", "box")]),
    );
    assert_eq!(rendered, "Foo has 3 items in box");
}

#[test]
fn test_format_prefers_longest_placeholder() {
    let rendered = format_placeholders("@key/@keys", &args(&[("@key", "1"), ("@keys", "many")]));
    assert_eq!(rendered, "1/many");
}

#[test]
fn test_format_does_not_rescan_replacements() {
    let rendered = format_placeholders("@a", &args(&[("@a", "@b"), ("@b", "x")]));
    assert_eq!(rendered, "@b");
}

#[test]
fn test_format_handles_multibyte_text() {
    let rendered = format_placeholders("Größe @n é", &args(&[("@n", "2")]));
    assert_eq!(rendered, "Größe 2 é");
}

#[test]
fn test_format_translator_renders_markup() {
    let markup = TranslatableMarkup::new("Foo @key").argument("@key", "1");
    assert_eq!(FormatTranslator.render(&markup), "Foo 1");
    assert_eq!(markup.untranslated(), "Foo @key");
}
