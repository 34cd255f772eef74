// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `${name}` interpolation against a `vars:` map.
//!
//! The original Python implementation resolves `vars` through OmegaConf,
//! which supports chained and recursive references. This reimplementation
//! does a single substitution pass: `vars` entries may not reference each
//! other. That covers every use the workspace config format actually
//! needs (naming a region or bucket once, referencing it elsewhere) and
//! avoids pulling in a general expression evaluator for it.

use std::collections::BTreeMap;

use regex::Regex;
use serde_yaml::Value;

fn var_pattern() -> Regex {
    // unwrap is safe: this pattern is a compile-time constant, verified by tests.
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap()
}

/// Substitute every `${name}` occurrence in string values anywhere in
/// `value` using `vars`. References to undefined names are left intact.
pub fn interpolate(value: &Value, vars: &BTreeMap<String, String>) -> Value {
    let pattern = var_pattern();
    interpolate_value(value, vars, &pattern)
}

fn interpolate_value(value: &Value, vars: &BTreeMap<String, String>, pattern: &Regex) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate_str(s, vars, pattern)),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| interpolate_value(item, vars, pattern))
                .collect(),
        ),
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::new();
            for (k, v) in map {
                out.insert(k.clone(), interpolate_value(v, vars, pattern));
            }
            Value::Mapping(out)
        }
        other => other.clone(),
    }
}

fn interpolate_str(input: &str, vars: &BTreeMap<String, String>, pattern: &Regex) -> String {
    pattern
        .replace_all(input, |caps: &regex::Captures| {
            let name = &caps[1];
            vars.get(name).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Flatten a `vars:` mapping into a plain string table. Non-scalar
/// values are stringified via their YAML/JSON-ish display form.
pub fn flatten_vars(vars: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let Value::Mapping(map) = vars {
        for (k, v) in map {
            let Value::String(key) = k else { continue };
            let rendered = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
            };
            out.insert(key.clone(), rendered);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_variable_in_nested_string() {
        let mut vars = BTreeMap::new();
        vars.insert("region".to_string(), "us-east-1".to_string());
        let value = Value::String("bucket-${region}-logs".to_string());
        let out = interpolate(&value, &vars);
        assert_eq!(out, Value::String("bucket-us-east-1-logs".to_string()));
    }

    #[test]
    fn leaves_unknown_reference_untouched() {
        let vars = BTreeMap::new();
        let value = Value::String("${missing}".to_string());
        let out = interpolate(&value, &vars);
        assert_eq!(out, Value::String("${missing}".to_string()));
    }

    #[test]
    fn recurses_through_sequences_and_mappings() {
        let mut vars = BTreeMap::new();
        vars.insert("env".to_string(), "staging".to_string());
        let mut map = serde_yaml::Mapping::new();
        map.insert(
            Value::String("tags".into()),
            Value::Sequence(vec![Value::String("env-${env}".into())]),
        );
        let out = interpolate(&Value::Mapping(map), &vars);
        let Value::Mapping(out_map) = out else {
            panic!("expected mapping");
        };
        let Value::Sequence(tags) = &out_map[&Value::String("tags".into())] else {
            panic!("expected sequence");
        };
        assert_eq!(tags[0], Value::String("env-staging".into()));
    }

    #[test]
    fn flatten_vars_stringifies_scalars() {
        let mut map = serde_yaml::Mapping::new();
        map.insert(Value::String("port".into()), Value::Number(8080.into()));
        map.insert(Value::String("name".into()), Value::String("dev".into()));
        let flat = flatten_vars(&Value::Mapping(map));
        assert_eq!(flat.get("port").map(String::as_str), Some("8080"));
        assert_eq!(flat.get("name").map(String::as_str), Some("dev"));
    }
}
