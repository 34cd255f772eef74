// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shell quoting and environment-variable assembly for remote commands.
//!
//! This only needs to *produce* a correctly quoted POSIX command line,
//! not parse one — unlike `oj-shell`'s full DSL lexer/parser, a single
//! single-quote escaper covers every case the orchestrator needs.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::warn;

use crate::error::SshError;

const MAX_COMMAND_BYTES: usize = 10_000;
const SECRET_MARKERS: &[&str] = &["SECRET", "PASSWORD", "TOKEN", "KEY"];

/// Wrap `value` in POSIX single quotes, escaping any embedded single
/// quote as `'\''`.
pub fn shell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Wrap `command` as `cd ~ && bash -c <quoted command>`.
pub fn wrap_in_home_shell(command: &str) -> String {
    format!("cd ~ && bash -c {}", shell_quote(command))
}

/// Wrap `command` as `mkdir -p <dir> && cd <dir> && bash -c <quoted command>`,
/// where `<dir>` is shell-quoted but a leading `~` is preserved literally
/// (quoting it would prevent tilde expansion).
pub fn wrap_in_dir_shell(command: &str, dir: &str) -> String {
    let quoted_dir = quote_path_preserving_tilde(dir);
    format!(
        "mkdir -p {quoted_dir} && cd {quoted_dir} && bash -c {}",
        shell_quote(command)
    )
}

fn quote_path_preserving_tilde(dir: &str) -> String {
    if let Some(rest) = dir.strip_prefix('~') {
        if rest.is_empty() {
            "~".to_string()
        } else {
            format!("~{}", shell_quote(rest))
        }
    } else {
        shell_quote(dir)
    }
}

/// Validate a command is non-empty, non-whitespace-only, and within the
/// 10000-byte limit.
pub fn validate_command(command: &str) -> Result<(), SshError> {
    if command.trim().is_empty() {
        return Err(SshError::InvalidCommand("command is empty or whitespace".into()));
    }
    if command.len() > MAX_COMMAND_BYTES {
        return Err(SshError::InvalidCommand(format!(
            "command is {} bytes, exceeds the {MAX_COMMAND_BYTES}-byte limit",
            command.len()
        )));
    }
    Ok(())
}

/// Prepend `export K=<shell-quoted V> && ...` for each key in `env`, in
/// sorted (deterministic) key order.
pub fn build_command_with_env(command: &str, env: &BTreeMap<String, String>) -> Result<String, SshError> {
    let mut prefix = String::new();
    for (key, value) in env {
        prefix.push_str(&format!("export {key}={} && ", shell_quote(value)));
    }
    let result = format!("{prefix}{command}");
    if result.len() > MAX_COMMAND_BYTES {
        return Err(SshError::InvalidCommand(format!(
            "command with env prefix is {} bytes, exceeds the {MAX_COMMAND_BYTES}-byte limit",
            result.len()
        )));
    }
    Ok(result)
}

/// Snapshot the process environment, keeping only variables whose name
/// matches any of `patterns`. Logs (does not redact) names that look
/// like secret material.
pub fn filter_environment_variables(patterns: &[String]) -> Result<BTreeMap<String, String>, SshError> {
    let compiled: Vec<Regex> = patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| SshError::InvalidCommand(format!("bad env_filter pattern '{p}': {e}"))))
        .collect::<Result<_, _>>()?;

    let mut out = BTreeMap::new();
    for (name, value) in std::env::vars() {
        if compiled.iter().any(|re| re.is_match(&name)) {
            if looks_like_secret(&name) {
                warn!(variable = name, "forwarding an environment variable whose name suggests secret material");
            }
            out.insert(name, value);
        }
    }
    Ok(out)
}

fn looks_like_secret(name: &str) -> bool {
    let upper = name.to_uppercase();
    SECRET_MARKERS.iter().any(|marker| upper.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_escapes_embedded_single_quote() {
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn wrap_in_home_shell_produces_cd_and_bash_c() {
        assert_eq!(wrap_in_home_shell("echo hi"), "cd ~ && bash -c 'echo hi'");
    }

    #[test]
    fn wrap_in_dir_shell_preserves_leading_tilde() {
        let wrapped = wrap_in_dir_shell("npm test", "~/project");
        assert_eq!(wrapped, "mkdir -p ~'/project' && cd ~'/project' && bash -c 'npm test'");
    }

    #[test]
    fn validate_command_rejects_whitespace_only() {
        assert!(validate_command("   ").is_err());
    }

    #[test]
    fn validate_command_rejects_oversized_command() {
        let huge = "a".repeat(10_001);
        assert!(validate_command(&huge).is_err());
    }

    #[test]
    fn build_command_with_env_is_sorted_and_quoted() {
        let mut env = BTreeMap::new();
        env.insert("B".to_string(), "two".to_string());
        env.insert("A".to_string(), "it's one".to_string());
        let result = build_command_with_env("run.sh", &env).expect("build");
        assert_eq!(result, "export A='it'\\''s one' && export B='two' && run.sh");
    }

    #[test]
    fn filter_environment_variables_matches_any_pattern() {
        std::env::set_var("CAMPERS_TEST_AWS_REGION", "us-east-1");
        std::env::set_var("CAMPERS_TEST_UNRELATED", "nope");
        let patterns = vec!["CAMPERS_TEST_AWS_.*".to_string()];
        let filtered = filter_environment_variables(&patterns).expect("filter");
        assert_eq!(
            filtered.get("CAMPERS_TEST_AWS_REGION").map(String::as_str),
            Some("us-east-1")
        );
        assert!(!filtered.contains_key("CAMPERS_TEST_UNRELATED"));
        std::env::remove_var("CAMPERS_TEST_AWS_REGION");
        std::env::remove_var("CAMPERS_TEST_UNRELATED");
    }
}
