// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Layered mapping merge: built-in defaults → file defaults → named
//! profile → CLI overrides, last-writer-wins per key.
//!
//! Two keys get non-default treatment, per §3/§4.L1:
//! - list-valued keys (`ignore`, `ports`, `env_filter`, `sync_paths`) are
//!   replaced wholesale by an overlay, never appended to;
//! - `playbooks` is deep-merged key by key, since profiles are expected
//!   to add playbooks without having to restate the ones defined higher up.

use serde_yaml::{Mapping, Value};

const DEEP_MERGE_KEYS: &[&str] = &["playbooks"];

/// Merge `overlay` onto `base` in place, per the rule above.
pub fn merge_layer(base: &mut Mapping, overlay: Mapping) {
    for (key, overlay_value) in overlay {
        let key_name = key.as_str().unwrap_or_default();
        if DEEP_MERGE_KEYS.contains(&key_name) {
            if let (Some(Value::Mapping(base_map)), Value::Mapping(overlay_map)) =
                (base.get_mut(&key), &overlay_value)
            {
                merge_layer(base_map, overlay_map.clone());
                continue;
            }
        }
        base.insert(key, overlay_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert(Value::String((*k).to_string()), v.clone());
        }
        m
    }

    #[test]
    fn scalar_keys_are_last_writer_wins() {
        let mut base = mapping(&[("region", Value::String("us-east-1".into()))]);
        let overlay = mapping(&[("region", Value::String("us-west-2".into()))]);
        merge_layer(&mut base, overlay);
        assert_eq!(
            base.get("region"),
            Some(&Value::String("us-west-2".into()))
        );
    }

    #[test]
    fn list_keys_are_replaced_not_appended() {
        let mut base = mapping(&[(
            "ports",
            Value::Sequence(vec![Value::Number(22.into()), Value::Number(80.into())]),
        )]);
        let overlay = mapping(&[("ports", Value::Sequence(vec![Value::Number(8080.into())]))]);
        merge_layer(&mut base, overlay);
        let Some(Value::Sequence(ports)) = base.get("ports") else {
            panic!("expected sequence");
        };
        assert_eq!(ports, &vec![Value::Number(8080.into())]);
    }

    #[test]
    fn playbooks_are_deep_merged() {
        let mut base = mapping(&[(
            "playbooks",
            Value::Mapping(mapping(&[("setup", Value::String("a".into()))])),
        )]);
        let overlay = mapping(&[(
            "playbooks",
            Value::Mapping(mapping(&[("deploy", Value::String("b".into()))])),
        )]);
        merge_layer(&mut base, overlay);
        let Some(Value::Mapping(playbooks)) = base.get("playbooks") else {
            panic!("expected mapping");
        };
        assert_eq!(playbooks.len(), 2);
        assert_eq!(
            playbooks.get("setup"),
            Some(&Value::String("a".into()))
        );
        assert_eq!(
            playbooks.get("deploy"),
            Some(&Value::String("b".into()))
        );
    }
}
