// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the `CAMPERS_*` environment variables (§6) once, at process
//! start, so nothing downstream of `main` reads `std::env` directly.

use std::path::PathBuf;
use std::time::Duration;

/// Snapshot of every environment-driven behavior switch.
#[derive(Debug, Clone)]
pub struct CampersEnv {
    pub config_path: Option<PathBuf>,
    pub campers_dir: PathBuf,
    pub debug: bool,
    pub test_mode: bool,
    pub disable_mutagen: bool,
    pub skip_ssh_connection: bool,
    pub harness_managed: bool,
    pub force_signal_exit: bool,
    pub ssh_timeout: Option<Duration>,
    pub ssh_max_retries: Option<usize>,
}

impl CampersEnv {
    pub fn load() -> Self {
        Self {
            config_path: std::env::var_os("CAMPERS_CONFIG").map(PathBuf::from),
            campers_dir: std::env::var_os("CAMPERS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_campers_dir),
            debug: flag("CAMPERS_DEBUG"),
            test_mode: flag("CAMPERS_TEST_MODE"),
            disable_mutagen: flag("CAMPERS_DISABLE_MUTAGEN"),
            skip_ssh_connection: flag("CAMPERS_SKIP_SSH_CONNECTION"),
            harness_managed: flag("CAMPERS_HARNESS_MANAGED"),
            force_signal_exit: flag("CAMPERS_FORCE_SIGNAL_EXIT"),
            ssh_timeout: std::env::var("CAMPERS_SSH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            ssh_max_retries: std::env::var("CAMPERS_SSH_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok()),
        }
    }
}

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn default_campers_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".campers")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_are_all_off_when_unset() {
        for var in [
            "CAMPERS_CONFIG",
            "CAMPERS_DIR",
            "CAMPERS_DEBUG",
            "CAMPERS_TEST_MODE",
            "CAMPERS_DISABLE_MUTAGEN",
            "CAMPERS_SKIP_SSH_CONNECTION",
            "CAMPERS_HARNESS_MANAGED",
            "CAMPERS_FORCE_SIGNAL_EXIT",
            "CAMPERS_SSH_TIMEOUT",
            "CAMPERS_SSH_MAX_RETRIES",
        ] {
            std::env::remove_var(var);
        }
        let env = CampersEnv::load();
        assert!(!env.debug);
        assert!(!env.test_mode);
        assert!(env.config_path.is_none());
        assert!(env.ssh_timeout.is_none());
    }

    #[test]
    #[serial]
    fn flag_accepts_one_and_true_case_insensitively() {
        std::env::set_var("CAMPERS_TEST_MODE", "TRUE");
        assert!(CampersEnv::load().test_mode);
        std::env::set_var("CAMPERS_TEST_MODE", "1");
        assert!(CampersEnv::load().test_mode);
        std::env::remove_var("CAMPERS_TEST_MODE");
    }
}
