// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator-facing seams over `campers-ssh`/`campers-sync`/
//! `campers-tunnel`/`campers-playbook`.
//!
//! `campers-compute` already exposes `ComputeAdapter` as an async trait
//! (§4.L3 names eight operations an implementation must satisfy); the
//! other four collaborators are concrete structs in their own crates
//! because they hold exactly one live resource (one SSH session, one
//! sync daemon, one forwarder set, one playbook scratch dir) rather
//! than switching between provider implementations. The orchestrator
//! still needs a seam to drive `CAMPERS_TEST_MODE` (§6) and to unit-test
//! the state machine without a reachable host, `mutagen`, or
//! `ansible-playbook` binary — so each gets a thin trait here plus a
//! `Real*` adapter wrapping the concrete type.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use campers_playbook::PlaybookError;
use campers_ssh::SshError;
use campers_sync::SyncError;
use campers_tunnel::TunnelError;

/// One held SSH session. Mirrors `campers_ssh::SshTransport`'s instance
/// methods (connection establishment is a separate `SshConnector` seam
/// since it is where `connect`'s retry/backoff and `CAMPERS_TEST_MODE`
/// branch live).
#[async_trait]
pub trait SshPort: Send + Sync {
    async fn execute(&self, command: &str) -> Result<i32, SshError>;
    async fn execute_raw(&self, command: &str) -> Result<i32, SshError>;
    fn build_command_with_env(&self, command: &str, env: &BTreeMap<String, String>) -> Result<String, SshError>;
    fn abort_active_command(&self);
    async fn close(&self);
}

/// Establishes a single `SshPort` for a run.
#[async_trait]
pub trait SshConnector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        username: &str,
        key_path: &Path,
    ) -> Result<Box<dyn SshPort>, SshError>;
}

#[async_trait]
impl SshPort for campers_ssh::SshTransport {
    async fn execute(&self, command: &str) -> Result<i32, SshError> {
        campers_ssh::SshTransport::execute(self, command).await
    }

    async fn execute_raw(&self, command: &str) -> Result<i32, SshError> {
        campers_ssh::SshTransport::execute_raw(self, command).await
    }

    fn build_command_with_env(&self, command: &str, env: &BTreeMap<String, String>) -> Result<String, SshError> {
        campers_ssh::SshTransport::build_command_with_env(self, command, env)
    }

    fn abort_active_command(&self) {
        campers_ssh::SshTransport::abort_active_command(self)
    }

    async fn close(&self) {
        campers_ssh::SshTransport::close(self).await
    }
}

/// Real connector backed by `campers_ssh::SshTransport::connect`.
pub struct RealSshConnector {
    pub max_attempts: Option<usize>,
    pub tcp_timeout: Option<std::time::Duration>,
}

#[async_trait]
impl SshConnector for RealSshConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        username: &str,
        key_path: &Path,
    ) -> Result<Box<dyn SshPort>, SshError> {
        let transport = campers_ssh::SshTransport::connect(
            host,
            port,
            username,
            key_path,
            self.max_attempts,
            self.tcp_timeout,
        )
        .await?;
        Ok(Box::new(transport))
    }
}

/// Sync Controller seam (L5).
#[async_trait]
pub trait SyncPort: Send + Sync {
    async fn preflight(&self) -> Result<(), SyncError>;
    async fn cleanup_orphaned(&self, session_name: &str);
    #[allow(clippy::too_many_arguments)]
    async fn create_session(
        &self,
        name: &str,
        local: &str,
        remote: &str,
        host: &str,
        key_path: &Path,
        user: &str,
        ignore_patterns: &[String],
        include_vcs: bool,
        ssh_port: u16,
    ) -> Result<(), SyncError>;
    async fn wait_steady(&self, session_name: &str, deadline: Option<std::time::Duration>) -> Result<(), SyncError>;
    async fn status(&self, session_name: &str) -> Result<String, SyncError>;
    async fn terminate(&self, session_name: &str);
}

#[async_trait]
impl SyncPort for campers_sync::SyncController {
    async fn preflight(&self) -> Result<(), SyncError> {
        campers_sync::SyncController::preflight(self).await
    }

    async fn cleanup_orphaned(&self, session_name: &str) {
        campers_sync::SyncController::cleanup_orphaned(self, session_name).await
    }

    async fn create_session(
        &self,
        name: &str,
        local: &str,
        remote: &str,
        host: &str,
        key_path: &Path,
        user: &str,
        ignore_patterns: &[String],
        include_vcs: bool,
        ssh_port: u16,
    ) -> Result<(), SyncError> {
        campers_sync::SyncController::create_session(
            self,
            name,
            local,
            remote,
            host,
            key_path,
            user,
            ignore_patterns,
            include_vcs,
            ssh_port,
        )
        .await
    }

    async fn wait_steady(&self, session_name: &str, deadline: Option<std::time::Duration>) -> Result<(), SyncError> {
        campers_sync::SyncController::wait_steady(self, session_name, deadline).await
    }

    async fn status(&self, session_name: &str) -> Result<String, SyncError> {
        campers_sync::SyncController::status(self, session_name).await
    }

    async fn terminate(&self, session_name: &str) {
        campers_sync::SyncController::terminate(self, session_name).await
    }
}

/// Tunnel Controller seam (L6).
#[async_trait]
pub trait TunnelPort: Send + Sync {
    async fn create_tunnels(&self, ports: &[u16]) -> Result<(), TunnelError>;
    async fn stop_all(&self);
}

#[async_trait]
impl TunnelPort for campers_tunnel::TunnelController {
    async fn create_tunnels(&self, ports: &[u16]) -> Result<(), TunnelError> {
        campers_tunnel::TunnelController::create_tunnels(self, ports).await
    }

    async fn stop_all(&self) {
        campers_tunnel::TunnelController::stop_all(self).await
    }
}

/// Establishes a `TunnelPort` for a run (separate SSH session from the
/// command transport, per `campers-tunnel`'s design).
#[async_trait]
pub trait TunnelConnector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        ssh_port: u16,
        username: &str,
        key_path: &Path,
    ) -> Result<Box<dyn TunnelPort>, TunnelError>;
}

pub struct RealTunnelConnector;

#[async_trait]
impl TunnelConnector for RealTunnelConnector {
    async fn connect(
        &self,
        host: &str,
        ssh_port: u16,
        username: &str,
        key_path: &Path,
    ) -> Result<Box<dyn TunnelPort>, TunnelError> {
        let controller = campers_tunnel::TunnelController::connect(host, ssh_port, username, key_path).await?;
        Ok(Box::new(controller))
    }
}

/// Playbook Runner seam (L7).
#[async_trait]
pub trait PlaybookPort: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn execute(
        &self,
        names: &[String],
        playbooks: &BTreeMap<String, String>,
        instance_ip: &str,
        key_file: &Path,
        user: &str,
        ssh_port: u16,
    ) -> Result<(), PlaybookError>;
}

#[async_trait]
impl PlaybookPort for campers_playbook::PlaybookRunner {
    async fn execute(
        &self,
        names: &[String],
        playbooks: &BTreeMap<String, String>,
        instance_ip: &str,
        key_file: &Path,
        user: &str,
        ssh_port: u16,
    ) -> Result<(), PlaybookError> {
        campers_playbook::PlaybookRunner::execute(self, names, playbooks, instance_ip, key_file, user, ssh_port).await
    }
}
