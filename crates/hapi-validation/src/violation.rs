//! # Violations
//!
//! One failure of a document to satisfy one schema constraint, with the
//! location expressed both as a JSON Pointer (`/items/0/name`) and as a
//! property path (`items[0].name`).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Property path of the violating value; empty for the document root.
    pub property: String,
    /// JSON Pointer to the violating value.
    pub pointer: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// Name of the violated keyword (`required`, `type`, `pattern`, ...).
    pub constraint: String,
    /// The regular expression, for `pattern` violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property.is_empty() {
            write!(f, "(root) [{}]: {}", self.constraint, self.message)
        } else {
            write!(f, "{} [{}]: {}", self.property, self.constraint, self.message)
        }
    }
}

/// Split a JSON Pointer into unescaped reference tokens.
pub(crate) fn pointer_segments(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Escape one reference token for inclusion in a JSON Pointer.
pub(crate) fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Render pointer segments as a property path, using the document to tell
/// array indices (`[0]`) from object keys (`.key`).
pub(crate) fn property_path(document: &Value, segments: &[String]) -> String {
    let mut path = String::new();
    let mut current = Some(document);

    for segment in segments {
        match current {
            Some(Value::Array(items)) => {
                path.push('[');
                path.push_str(segment);
                path.push(']');
                current = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            other => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(segment);
                current = other
                    .and_then(Value::as_object)
                    .and_then(|map| map.get(segment));
            }
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segments(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_and_unescapes_pointers() {
        assert!(pointer_segments("").is_empty());
        assert_eq!(pointer_segments("/name"), segments(&["name"]));
        assert_eq!(pointer_segments("/a~1b/c~0d/0"), segments(&["a/b", "c~d", "0"]));
    }

    #[test]
    fn escape_is_inverse_of_split() {
        let raw = "a/b~c";
        let pointer = format!("/{}", escape_segment(raw));
        assert_eq!(pointer_segments(&pointer), segments(&[raw]));
    }

    #[test]
    fn property_path_distinguishes_indices() {
        let doc = json!({ "items": [{ "name": 1 }], "0": { "x": true } });
        assert_eq!(
            property_path(&doc, &segments(&["items", "0", "name"])),
            "items[0].name"
        );
        // A numeric object key stays a key.
        assert_eq!(property_path(&doc, &segments(&["0", "x"])), "0.x");
    }

    #[test]
    fn property_path_of_missing_property() {
        let doc = json!({});
        assert_eq!(property_path(&doc, &segments(&["name"])), "name");
        assert_eq!(property_path(&doc, &segments(&["a", "b"])), "a.b");
        assert_eq!(property_path(&doc, &[]), "");
    }

    #[test]
    fn display_marks_root() {
        let v = Violation {
            property: String::new(),
            pointer: String::new(),
            message: "null is not of type \"object\"".into(),
            constraint: "type".into(),
            pattern: None,
        };
        assert!(v.to_string().starts_with("(root) [type]"));
    }

    #[test]
    fn pattern_is_skipped_when_absent() {
        let v = Violation {
            property: "name".into(),
            pointer: "/name".into(),
            message: "m".into(),
            constraint: "required".into(),
            pattern: None,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert!(json.get("pattern").is_none());
    }
}
