// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Discovering the git context a workspace is running in.

use std::path::Path;
use std::process::Command;

/// What we know about the local checkout, gathered by shelling to `git`.
/// `None` in either field means "not available" (not a repo, no remote,
/// detached HEAD) rather than an error: identity derivation always has
/// a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub repo_basename: Option<String>,
    pub branch: Option<String>,
}

impl WorkspaceContext {
    /// Discover git context rooted at `dir`. Never fails: any git
    /// invocation error just leaves the corresponding field `None`.
    pub fn discover(dir: &Path) -> Self {
        let remote_url = run_git(dir, &["remote", "get-url", "origin"]);
        let repo_basename = remote_url.as_deref().and_then(basename_from_remote);

        let branch = run_git(dir, &["symbolic-ref", "--short", "-q", "HEAD"])
            .filter(|b| !b.is_empty());

        Self {
            repo_basename,
            branch,
        }
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").arg("-C").arg(dir).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extract the repo basename (no `.git` suffix) from a remote URL, in
/// either `git@host:org/repo.git` or `https://host/org/repo.git` form.
fn basename_from_remote(url: &str) -> Option<String> {
    let without_suffix = url.strip_suffix(".git").unwrap_or(url);
    let last_segment = without_suffix.rsplit(['/', ':']).next()?;
    if last_segment.is_empty() {
        None
    } else {
        Some(last_segment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_from_ssh_style_remote() {
        assert_eq!(
            basename_from_remote("git@github.com:acme/widgets.git"),
            Some("widgets".to_string())
        );
    }

    #[test]
    fn basename_from_https_style_remote() {
        assert_eq!(
            basename_from_remote("https://github.com/acme/widgets.git"),
            Some("widgets".to_string())
        );
    }

    #[test]
    fn basename_without_git_suffix() {
        assert_eq!(
            basename_from_remote("https://github.com/acme/widgets"),
            Some("widgets".to_string())
        );
    }
}
