use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Text whose rendering is deferred to a [`Translator`].
///
/// The markup never stringifies itself; callers must go through
/// [`Translator::render`] at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatableMarkup {
    /// Source template, possibly containing `@name`, `%name` or `:name` placeholders
    #[serde(rename = "$markup")]
    pub string: String,

    /// Placeholder replacements keyed by the full placeholder (e.g. `@key`)
    #[serde(rename = "$arguments", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, String>,
}

impl TranslatableMarkup {
    /// Create markup without arguments
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// Create markup with placeholder arguments
    pub fn with_arguments(string: impl Into<String>, arguments: BTreeMap<String, String>) -> Self {
        Self {
            string: string.into(),
            arguments,
        }
    }

    /// Add or replace a placeholder argument
    pub fn argument(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(placeholder.into(), value.into());
        self
    }

    /// The untranslated source template
    pub fn untranslated(&self) -> &str {
        &self.string
    }
}

/// Renders deferred text into a concrete string.
///
/// Localization lives in the host; the core only calls into this trait.
pub trait Translator: Send + Sync + Debug {
    /// Render the given markup into display text
    fn render(&self, markup: &TranslatableMarkup) -> String;
}

/// Translator that performs placeholder substitution without translating.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatTranslator;

impl Translator for FormatTranslator {
    fn render(&self, markup: &TranslatableMarkup) -> String {
        format_placeholders(&markup.string, &markup.arguments)
    }
}

/// Replace placeholders in `template` with their argument values.
///
/// Longer placeholders are matched first and replaced text is never scanned
/// again, so `@key` and `@keys` can coexist.
pub fn format_placeholders(template: &str, arguments: &BTreeMap<String, String>) -> String {
    if arguments.is_empty() {
        return template.to_string();
    }

    let mut placeholders: Vec<(&String, &String)> = arguments
        .iter()
        .filter(|(placeholder, _)| !placeholder.is_empty())
        .collect();
    placeholders.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    'outer: while !rest.is_empty() {
        for (placeholder, value) in &placeholders {
            if rest.starts_with(placeholder.as_str()) {
                output.push_str(value);
                rest = &rest[placeholder.len()..];
                continue 'outer;
            }
        }
        // Advance by one full character
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            output.push(c);
        }
        rest = chars.as_str();
    }
    output
}
