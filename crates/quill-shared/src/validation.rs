//! Validation helpers shared by every schema.
//!
//! Validation is full-pass: a schema always reports the complete set of
//! field errors in one response rather than failing on the first.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use validator::{ValidationErrors, ValidationErrorsKind};

/// Flatten `ValidationErrors` into a deterministic, field-ordered list of
/// human-readable messages.
pub fn collect_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    collect_into(None, errors, &mut out);
    out
}

fn collect_into(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<String>) {
    let mut fields: Vec<(String, &ValidationErrorsKind)> = errors
        .errors()
        .iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    for (field, kind) in fields {
        let name = match prefix {
            Some(p) => format!("{p}.{field}"),
            None => field,
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    match &error.message {
                        Some(message) => out.push(message.to_string()),
                        None => out.push(format!("{name} is invalid")),
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_into(Some(&name), nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_into(Some(&format!("{name}[{index}]")), nested, out);
                }
            }
        }
    }
}

/// Trim, drop empties and deduplicate while preserving first-seen order.
pub fn normalize_tags<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_string()) {
            out.push(tag.to_string());
        }
    }
    out
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagInput {
    Many(Vec<String>),
    One(String),
}

/// Tag input accepts either a list of strings or a single comma-separated
/// string; both normalize to the same trimmed, deduplicated list.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TagInput>::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(TagInput::One(s)) => normalize_tags(s.split(',')),
        Some(TagInput::Many(list)) => normalize_tags(list.iter().map(String::as_str)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "deserialize_tags")]
        tags: Vec<String>,
    }

    #[test]
    fn comma_separated_string() {
        let p: Payload = serde_json::from_str(r#"{"tags": "rust, web,  , rust, async"}"#).unwrap();
        assert_eq!(p.tags, vec!["rust", "web", "async"]);
    }

    #[test]
    fn list_of_strings() {
        let p: Payload = serde_json::from_str(r#"{"tags": [" rust ", "", "web", "rust"]}"#).unwrap();
        assert_eq!(p.tags, vec!["rust", "web"]);
    }

    #[test]
    fn missing_and_null_are_empty() {
        let p: Payload = serde_json::from_str(r#"{}"#).unwrap();
        assert!(p.tags.is_empty());
        let p: Payload = serde_json::from_str(r#"{"tags": null}"#).unwrap();
        assert!(p.tags.is_empty());
    }
}
