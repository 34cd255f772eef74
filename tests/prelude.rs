//! Shared test scaffolding for the `campers` binary specs.

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated working directory with its own `campers.yaml` and
/// `CAMPERS_DIR`, so specs never touch the real `~/.campers`.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent dirs.
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    /// A `campers` invocation rooted at this project, with a private
    /// `CAMPERS_DIR` and `CAMPERS_TEST_MODE=1` so SSH/tunnels never
    /// touch the network (§6 of `SPEC_FULL.md`).
    pub fn campers(&self) -> Command {
        let mut cmd = Command::cargo_bin("campers").expect("campers binary");
        cmd.current_dir(self.dir.path())
            .env("CAMPERS_DIR", self.dir.path().join(".campers-state"))
            .env("CAMPERS_TEST_MODE", "1")
            .env_remove("CAMPERS_CONFIG")
            .env_remove("CAMPERS_DEBUG")
            .env_remove("CAMPERS_DISABLE_MUTAGEN")
            .env_remove("CAMPERS_SKIP_SSH_CONNECTION")
            .env_remove("CAMPERS_HARNESS_MANAGED")
            .env_remove("CAMPERS_FORCE_SIGNAL_EXIT");
        cmd
    }
}

/// A bare `campers` invocation with no project context, for specs that
/// only care about argument parsing (`--help`, unknown subcommands).
pub fn cli() -> Command {
    Command::cargo_bin("campers").expect("campers binary")
}
