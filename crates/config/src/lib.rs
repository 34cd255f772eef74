// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! Config Resolver (L1): turns a YAML config document plus an optional
//! profile name and CLI overrides into a validated, frozen `RunConfig`.

mod error;
mod interpolate;
mod merge;
mod validate;

pub use error::ConfigError;
pub use validate::validate;

use campers_core::RunConfig;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use interpolate::{flatten_vars, interpolate};
use merge::merge_layer;

/// Resolve a single `RunConfig` from a YAML document, an optional named
/// profile, and CLI overrides, in that precedence order (each layer wins
/// over the one before it).
pub fn resolve(
    file_contents: &str,
    profile_name: Option<&str>,
    cli_overrides: &Mapping,
) -> Result<RunConfig, ConfigError> {
    let raw: Value = serde_yaml::from_str(file_contents)?;
    let root = match raw {
        Value::Mapping(m) => m,
        Value::Null => Mapping::new(),
        _ => {
            return Err(ConfigError::WrongType {
                field: "<root>".into(),
                expected: "mapping".into(),
            })
        }
    };

    let vars = flatten_vars(root.get("vars").unwrap_or(&Value::Null));
    let Value::Mapping(root) = interpolate(&Value::Mapping(root), &vars) else {
        return Err(ConfigError::WrongType {
            field: "<root>".into(),
            expected: "mapping".into(),
        });
    };

    let file_defaults = as_mapping(root.get("defaults"));
    let camps = as_mapping(root.get("camps"));

    let mut merged = builtin_defaults();
    merge_layer(&mut merged, file_defaults);

    if let Some(name) = profile_name {
        let key = Value::String(name.to_string());
        match camps.get(&key) {
            Some(Value::Mapping(profile)) => {
                debug!(profile = name, "applying named profile");
                merge_layer(&mut merged, profile.clone());
            }
            Some(_) => {
                return Err(ConfigError::WrongType {
                    field: format!("camps.{name}"),
                    expected: "mapping".into(),
                })
            }
            None => {
                let available = camps
                    .keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect();
                return Err(ConfigError::UnknownProfile {
                    name: name.to_string(),
                    available,
                });
            }
        }
        merged.insert(
            Value::String("camp_name".into()),
            Value::String(name.to_string()),
        );
    }

    merge_layer(&mut merged, cli_overrides.clone());

    let config: RunConfig = serde_yaml::from_value(Value::Mapping(merged))?;
    validate(&config)?;
    Ok(config)
}

fn as_mapping(value: Option<&Value>) -> Mapping {
    match value {
        Some(Value::Mapping(m)) => m.clone(),
        _ => Mapping::new(),
    }
}

fn builtin_defaults() -> Mapping {
    let mut m = Mapping::new();
    m.insert(Value::String("disk_size".into()), Value::Number(50.into()));
    m.insert(Value::String("ports".into()), Value::Sequence(vec![]));
    m.insert(Value::String("include_vcs".into()), Value::Bool(false));
    m.insert(
        Value::String("ignore".into()),
        Value::Sequence(vec![
            Value::String("*.pyc".into()),
            Value::String("__pycache__".into()),
            Value::String("*.log".into()),
            Value::String(".DS_Store".into()),
        ]),
    );
    m.insert(
        Value::String("env_filter".into()),
        Value::Sequence(vec![Value::String("AWS_.*".into())]),
    );
    m.insert(Value::String("sync_paths".into()), Value::Sequence(vec![]));
    m.insert(
        Value::String("ssh_username".into()),
        Value::String("ubuntu".into()),
    );
    m.insert(
        Value::String("on_exit".into()),
        Value::String("stop".into()),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_minimal_ad_hoc_config() {
        let yaml = r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
"#;
        let config = resolve(yaml, None, &Mapping::new()).expect("resolve");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.disk_size, 50);
        assert_eq!(config.camp_name, "ad-hoc");
        assert_eq!(config.ssh_username, "ubuntu");
    }

    #[test]
    fn named_profile_overrides_defaults_and_sets_camp_name() {
        let yaml = r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
camps:
  gpu-box:
    instance_type: g5.xlarge
    ports: [8888]
"#;
        let config = resolve(yaml, Some("gpu-box"), &Mapping::new()).expect("resolve");
        assert_eq!(config.instance_type, "g5.xlarge");
        assert_eq!(config.ports, vec![8888]);
        assert_eq!(config.camp_name, "gpu-box");
    }

    #[test]
    fn unknown_profile_lists_available_names() {
        let yaml = r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
camps:
  gpu-box: {}
"#;
        let err = resolve(yaml, Some("missing"), &Mapping::new()).unwrap_err();
        match err {
            ConfigError::UnknownProfile { name, available } => {
                assert_eq!(name, "missing");
                assert_eq!(available, vec!["gpu-box".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cli_overrides_win_over_profile() {
        let yaml = r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
camps:
  gpu-box:
    instance_type: g5.xlarge
"#;
        let mut overrides = Mapping::new();
        overrides.insert(
            Value::String("instance_type".into()),
            Value::String("p3.2xlarge".into()),
        );
        let config = resolve(yaml, Some("gpu-box"), &overrides).expect("resolve");
        assert_eq!(config.instance_type, "p3.2xlarge");
    }

    #[test]
    fn vars_are_interpolated_before_merge() {
        let yaml = r#"
vars:
  region: us-west-2
defaults:
  region: ${region}
  instance_type: t3.medium
"#;
        let config = resolve(yaml, None, &Mapping::new()).expect("resolve");
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn missing_region_fails_validation() {
        let yaml = r#"
defaults:
  instance_type: t3.medium
"#;
        let err = resolve(yaml, None, &Mapping::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }
}
