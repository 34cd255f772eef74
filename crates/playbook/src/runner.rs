// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `PlaybookRunner` — materializes inline playbooks and an inventory
//! file to a scratch directory and streams an external
//! `ansible-playbook`-compatible runner over them.

use std::collections::BTreeMap;
use std::io::Write;
use std::process::Stdio;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::PlaybookError;

const RUNNER_BINARY: &str = "ansible-playbook";

pub struct PlaybookRunner;

impl PlaybookRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run each named playbook, in order. Halts on the first non-zero
    /// exit and skips the rest. Temp files are always removed, even on
    /// error, since `TempDir` cleans up on drop.
    pub async fn execute(
        &self,
        names: &[String],
        playbooks: &BTreeMap<String, String>,
        instance_ip: &str,
        key_file: &std::path::Path,
        user: &str,
        ssh_port: u16,
    ) -> Result<(), PlaybookError> {
        let scratch = TempDir::new()?;
        let inventory_path = scratch.path().join("inventory.ini");
        write_inventory(&inventory_path, instance_ip, key_file, user, ssh_port)?;

        for name in names {
            let body = playbooks.get(name).ok_or_else(|| PlaybookError::PlaybookFailed {
                name: name.clone(),
                code: -1,
            })?;
            let playbook_path = scratch.path().join(format!("{name}.yml"));
            std::fs::write(&playbook_path, body)?;

            info!(playbook = name, "running playbook");
            let code = self.run_one(&inventory_path, &playbook_path).await?;
            if code != 0 {
                return Err(PlaybookError::PlaybookFailed {
                    name: name.clone(),
                    code,
                });
            }
        }

        Ok(())
    }

    async fn run_one(
        &self,
        inventory_path: &std::path::Path,
        playbook_path: &std::path::Path,
    ) -> Result<i32, PlaybookError> {
        let mut child = Command::new(RUNNER_BINARY)
            .arg("-i")
            .arg(inventory_path)
            .arg(playbook_path)
            .arg("-v")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|_| PlaybookError::RunnerUnavailable)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        if let Some(stdout) = stdout {
            tokio::spawn(stream_lines(stdout, "stdout"));
        }
        if let Some(stderr) = stderr {
            tokio::spawn(stream_lines(stderr, "stderr"));
        }

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

impl Default for PlaybookRunner {
    fn default() -> Self {
        Self::new()
    }
}

async fn stream_lines<R: tokio::io::AsyncRead + Unpin>(reader: R, stream: &'static str) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "campers_playbook::remote", stream, "{line}");
    }
}

fn write_inventory(
    path: &std::path::Path,
    instance_ip: &str,
    key_file: &std::path::Path,
    user: &str,
    ssh_port: u16,
) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "{instance_ip} ansible_user={user} ansible_ssh_private_key_file={} ansible_port={ssh_port}",
        key_file.display()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_inventory_includes_connection_details() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = dir.path().join("inventory.ini");
        write_inventory(&inventory, "203.0.113.5", std::path::Path::new("/tmp/key.pem"), "ubuntu", 22)
            .expect("write inventory");
        let content = std::fs::read_to_string(&inventory).expect("read inventory");
        assert!(content.contains("203.0.113.5"));
        assert!(content.contains("ansible_user=ubuntu"));
        assert!(content.contains("ansible_port=22"));
    }
}
