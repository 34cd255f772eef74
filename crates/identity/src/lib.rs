// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! Instance Identity (L2): derives a deterministic instance name from
//! the calling workspace's git context.

mod sanitize;
mod workspace;

pub use sanitize::sanitize;
pub use workspace::WorkspaceContext;

use campers_core::Clock;

/// Produce a deterministic instance name.
///
/// If the workspace has a repo with a remote origin and a named
/// (non-detached) branch: `campers-<repo>-<branch>`, sanitized.
/// Otherwise: `campers-<unix-seconds-now>`.
pub fn derive_instance_name(context: &WorkspaceContext, clock: &impl Clock) -> String {
    match (&context.repo_basename, &context.branch) {
        (Some(repo), Some(branch)) => {
            format!("campers-{}-{}", sanitize(repo), sanitize(branch))
        }
        _ => format!("campers-{}", clock.epoch_ms() / 1000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campers_core::FakeClock;

    #[test]
    fn names_from_repo_and_branch_when_both_present() {
        let ctx = WorkspaceContext {
            repo_basename: Some("widgets".into()),
            branch: Some("feature/foo".into()),
        };
        let clock = FakeClock::new();
        assert_eq!(
            derive_instance_name(&ctx, &clock),
            "campers-widgets-feature-foo"
        );
    }

    #[test]
    fn falls_back_to_timestamp_without_remote() {
        let ctx = WorkspaceContext {
            repo_basename: None,
            branch: Some("main".into()),
        };
        let clock = FakeClock::new();
        clock.set_epoch_ms(90_000);
        assert_eq!(derive_instance_name(&ctx, &clock), "campers-90");
    }

    #[test]
    fn falls_back_to_timestamp_on_detached_head() {
        let ctx = WorkspaceContext {
            repo_basename: Some("widgets".into()),
            branch: None,
        };
        let clock = FakeClock::new();
        clock.set_epoch_ms(5_000);
        assert_eq!(derive_instance_name(&ctx, &clock), "campers-5");
    }
}
