//! # Document Preparation
//!
//! Schema-guided, in-place rewriting of a document before validation:
//! default insertion (`APPLY_DEFAULTS`) and scalar type coercion
//! (`COERCE_TYPES`).
//!
//! The walk follows `properties`, `additionalProperties`, `items`,
//! `prefixItems`, `allOf`, and local `$ref`s. Conditional keywords
//! (`anyOf`, `oneOf`, `if`) are not followed: which branch applies is only
//! known after validation.
//!
//! Each subschema is applied at most once per document node, so `$ref`
//! cycles and `allOf` branches pointing back at the root stay linear.

use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Number, Value};

use crate::mode::CheckMode;

/// Upper bound on document nesting followed by the walk.
const MAX_DEPTH: usize = 128;

/// Subschemas already applied to the current document node, by address.
type Applied = HashSet<*const Value>;

/// Rewrite `document` in place according to `mode`.
pub(crate) fn prepare(document: &mut Value, schema: &Value, mode: CheckMode) {
    if !mode.rewrites_document() {
        return;
    }
    let walker = Walker { root: schema, mode };
    walker.visit(document, schema, &mut Applied::new(), 0);
}

struct Walker<'s> {
    root: &'s Value,
    mode: CheckMode,
}

impl<'s> Walker<'s> {
    fn visit(&self, value: &mut Value, schema: &'s Value, applied: &mut Applied, depth: usize) {
        if depth > MAX_DEPTH || !applied.insert(schema as *const Value) {
            return;
        }
        let Some(keywords) = schema.as_object() else {
            return;
        };

        // `$ref` and `allOf` apply to the same node.
        if let Some(target) = self.resolve_ref(keywords) {
            self.visit(value, target, applied, depth);
        }
        if let Some(all_of) = keywords.get("allOf").and_then(Value::as_array) {
            for branch in all_of {
                self.visit(value, branch, applied, depth);
            }
        }

        if self.mode.contains(CheckMode::APPLY_DEFAULTS) {
            self.apply_defaults(value, keywords);
        }
        if self.mode.contains(CheckMode::COERCE_TYPES) {
            if let Some(types) = keywords.get("type") {
                coerce_scalar(value, types);
            }
        }

        match value {
            Value::Object(map) => self.visit_properties(map, keywords, depth),
            Value::Array(items) => self.visit_items(items, keywords, depth),
            _ => {}
        }
    }

    fn visit_properties(
        &self,
        map: &mut Map<String, Value>,
        keywords: &'s Map<String, Value>,
        depth: usize,
    ) {
        let properties = keywords.get("properties").and_then(Value::as_object);
        let additional = keywords
            .get("additionalProperties")
            .filter(|schema| schema.is_object());

        for (name, child) in map.iter_mut() {
            match properties.and_then(|p| p.get(name)) {
                Some(schema) => self.visit(child, schema, &mut Applied::new(), depth + 1),
                None => {
                    if let Some(schema) = additional {
                        self.visit(child, schema, &mut Applied::new(), depth + 1);
                    }
                }
            }
        }
    }

    fn visit_items(&self, items: &mut [Value], keywords: &'s Map<String, Value>, depth: usize) {
        let prefix = keywords
            .get("prefixItems")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        // Draft 4-7 tuple form: `items` is an array of schemas.
        let (tuple, rest) = match keywords.get("items") {
            Some(Value::Array(schemas)) => (schemas.as_slice(), keywords.get("additionalItems")),
            other => (prefix, other),
        };

        for (index, item) in items.iter_mut().enumerate() {
            if let Some(schema) = tuple.get(index).or(rest) {
                self.visit(item, schema, &mut Applied::new(), depth + 1);
            }
        }
    }

    fn apply_defaults(&self, value: &mut Value, keywords: &'s Map<String, Value>) {
        let (Value::Object(map), Some(properties)) =
            (value, keywords.get("properties").and_then(Value::as_object))
        else {
            return;
        };

        let required: Vec<&str> = keywords
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let only_required = self.mode.contains(CheckMode::ONLY_REQUIRED_DEFAULTS);

        for (name, schema) in properties {
            if map.contains_key(name) || (only_required && !required.contains(&name.as_str())) {
                continue;
            }
            let schema = schema
                .as_object()
                .and_then(|k| self.resolve_ref(k))
                .unwrap_or(schema);
            if let Some(default) = schema.get("default") {
                map.insert(name.clone(), default.clone());
            }
        }
    }

    /// Resolve a document-local `$ref` (`#` or `#/json/pointer`). The
    /// fragment is percent-decoded before the pointer is applied.
    fn resolve_ref(&self, keywords: &Map<String, Value>) -> Option<&'s Value> {
        let reference = keywords.get("$ref")?.as_str()?;
        let fragment = reference.strip_prefix('#')?;
        let pointer = percent_decode_str(fragment).decode_utf8().ok()?;
        self.root.pointer(&pointer)
    }
}

/// Convert `value` to the first declared type it can be losslessly
/// converted to. Values that already match a declared type are untouched.
fn coerce_scalar(value: &mut Value, types: &Value) {
    let declared: Vec<&str> = match types {
        Value::String(single) => vec![single.as_str()],
        Value::Array(many) => many.iter().filter_map(Value::as_str).collect(),
        _ => return,
    };

    if declared.iter().any(|t| matches_type(value, t)) {
        return;
    }

    for target in declared {
        if let Some(converted) = convert(value, target) {
            *value = converted;
            return;
        }
    }
}

fn matches_type(value: &Value, json_type: &str) -> bool {
    match (json_type, value) {
        ("integer", Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        ("number", Value::Number(_)) => true,
        ("string", Value::String(_)) => true,
        ("boolean", Value::Bool(_)) => true,
        ("null", Value::Null) => true,
        ("object", Value::Object(_)) => true,
        ("array", Value::Array(_)) => true,
        _ => false,
    }
}

fn convert(value: &Value, target: &str) -> Option<Value> {
    match (target, value) {
        ("integer", Value::String(s)) => s.parse::<i64>().ok().map(Value::from),
        ("integer" | "number", Value::Bool(b)) => Some(Value::from(i64::from(*b))),
        ("number", Value::String(s)) => match s.parse::<i64>() {
            Ok(i) => Some(Value::from(i)),
            Err(_) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
        },
        ("string", Value::Number(n)) => Some(Value::String(n.to_string())),
        ("string", Value::Bool(b)) => Some(Value::String(b.to_string())),
        ("boolean", Value::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ("boolean", Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        ("null", Value::String(s)) if s.is_empty() => Some(Value::Null),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" },
                "score": { "type": "number" },
                "active": { "type": "boolean", "default": true },
                "nickname": { "type": ["null", "string"] },
                "tags": { "type": "array", "items": { "type": "string" } },
            },
            "required": ["name"],
        })
    }

    #[test]
    fn normal_mode_leaves_document_untouched() {
        let mut doc = json!({ "age": "42" });
        prepare(&mut doc, &person_schema(), CheckMode::NORMAL);
        assert_eq!(doc, json!({ "age": "42" }));
    }

    #[test]
    fn coerces_nested_scalars() {
        let mut doc = json!({
            "name": 7,
            "age": "42",
            "score": "1.5",
            "active": "false",
            "tags": [1, true],
        });
        prepare(&mut doc, &person_schema(), CheckMode::COERCE_TYPES);
        assert_eq!(
            doc,
            json!({
                "name": "7",
                "age": 42,
                "score": 1.5,
                "active": false,
                "tags": ["1", "true"],
            })
        );
    }

    #[test]
    fn leaves_unconvertible_values() {
        let mut doc = json!({ "age": "forty-two", "active": "yes" });
        prepare(&mut doc, &person_schema(), CheckMode::COERCE_TYPES);
        assert_eq!(doc, json!({ "age": "forty-two", "active": "yes" }));
    }

    #[test]
    fn union_types_use_first_convertible() {
        let mut doc = json!({ "nickname": 5 });
        prepare(&mut doc, &person_schema(), CheckMode::COERCE_TYPES);
        assert_eq!(doc["nickname"], "5");

        // Already a declared type: untouched.
        let mut doc = json!({ "nickname": "" });
        prepare(&mut doc, &person_schema(), CheckMode::COERCE_TYPES);
        assert_eq!(doc["nickname"], "");

        let schema = json!({ "type": ["null", "integer"] });
        let mut doc = json!("");
        prepare(&mut doc, &schema, CheckMode::COERCE_TYPES);
        assert_eq!(doc, Value::Null);

        let mut doc = json!("7");
        prepare(&mut doc, &schema, CheckMode::COERCE_TYPES);
        assert_eq!(doc, json!(7));
    }

    #[test]
    fn integral_float_counts_as_integer() {
        let mut doc = json!({ "age": 42.0 });
        prepare(&mut doc, &person_schema(), CheckMode::COERCE_TYPES);
        assert_eq!(doc["age"], json!(42.0));
    }

    #[test]
    fn applies_defaults() {
        let mut doc = json!({ "name": "Max" });
        prepare(&mut doc, &person_schema(), CheckMode::APPLY_DEFAULTS);
        assert_eq!(doc, json!({ "name": "Max", "active": true }));
    }

    #[test]
    fn only_required_defaults() {
        let schema = json!({
            "type": "object",
            "properties": {
                "kind": { "type": "string", "default": "person" },
                "active": { "type": "boolean", "default": true },
            },
            "required": ["kind"],
        });
        let mut doc = json!({});
        prepare(
            &mut doc,
            &schema,
            CheckMode::APPLY_DEFAULTS | CheckMode::ONLY_REQUIRED_DEFAULTS,
        );
        assert_eq!(doc, json!({ "kind": "person" }));
    }

    #[test]
    fn follows_local_refs_and_all_of() {
        let schema = json!({
            "$defs": { "count": { "type": "integer", "default": 0 } },
            "allOf": [{
                "type": "object",
                "properties": {
                    "total": { "$ref": "#/$defs/count" },
                    "pending": { "$ref": "#/$defs/count" },
                },
            }],
        });
        let mut doc = json!({ "total": "3" });
        prepare(
            &mut doc,
            &schema,
            CheckMode::COERCE_TYPES | CheckMode::APPLY_DEFAULTS,
        );
        assert_eq!(doc, json!({ "total": 3, "pending": 0 }));
    }

    #[test]
    fn tuple_items_and_additional_properties() {
        let schema = json!({
            "type": "object",
            "additionalProperties": {
                "type": "array",
                "prefixItems": [{ "type": "integer" }],
                "items": { "type": "boolean" },
            },
        });
        let mut doc = json!({ "pair": ["1", 1, 0] });
        prepare(&mut doc, &schema, CheckMode::COERCE_TYPES);
        assert_eq!(doc, json!({ "pair": [1, true, false] }));
    }

    #[test]
    fn resolves_percent_encoded_refs() {
        let schema = json!({
            "$defs": { "a b": { "type": "integer" } },
            "properties": { "count": { "$ref": "#/$defs/a%20b" } },
        });
        let mut doc = json!({ "count": "5" });
        prepare(&mut doc, &schema, CheckMode::COERCE_TYPES);
        assert_eq!(doc, json!({ "count": 5 }));
    }

    #[test]
    fn all_of_cycles_through_root_stay_linear() {
        // Every branch points back at the root. Without per-node tracking
        // this fans out 4^depth times before giving up.
        let schema = json!({
            "allOf": [{ "$ref": "#" }, { "$ref": "#" }, { "$ref": "#" }, { "$ref": "#" }],
            "properties": { "n": { "type": "integer" }, "child": { "$ref": "#" } },
        });
        let mut doc = json!({ "n": "1", "child": { "n": "2", "child": { "n": "3" } } });
        prepare(&mut doc, &schema, CheckMode::COERCE_TYPES);
        assert_eq!(
            doc,
            json!({ "n": 1, "child": { "n": 2, "child": { "n": 3 } } })
        );
    }

    #[test]
    fn self_referencing_schema_terminates() {
        let schema = json!({ "$ref": "#" });
        let mut doc = json!({ "a": 1 });
        prepare(&mut doc, &schema, CheckMode::COERCE_TYPES);
        assert_eq!(doc, json!({ "a": 1 }));
    }
}
