// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory implementations of the ports in [`crate::ports`], for
//! orchestrator state-machine tests that must not reach a real host,
//! `mutagen`, or `ansible-playbook` binary. Mirrors
//! `campers_compute::FakeComputeAdapter`'s call-recording shape.
//!
//! Gated the same way `campers-compute` gates `FakeComputeAdapter`: on
//! by default for `#[cfg(test)]`, or explicitly via the `test-support`
//! feature for `campers-cli`'s `CAMPERS_TEST_MODE` wiring.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use campers_playbook::PlaybookError;
use campers_ssh::SshError;
use campers_sync::SyncError;
use campers_tunnel::TunnelError;
use parking_lot::Mutex;

use crate::ports::{PlaybookPort, SshConnector, SshPort, SyncPort, TunnelConnector, TunnelPort};

/// Records every call against it; `execute`/`execute_raw` return a
/// scripted exit code.
#[derive(Default)]
pub struct FakeSshPort {
    pub calls: Mutex<Vec<String>>,
    pub exit_code: AtomicI32,
    pub closed: AtomicBool,
    pub aborted: AtomicBool,
}

impl FakeSshPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit_code(code: i32) -> Self {
        let fake = Self::new();
        fake.exit_code.store(code, Ordering::SeqCst);
        fake
    }
}

#[async_trait]
impl SshPort for FakeSshPort {
    async fn execute(&self, command: &str) -> Result<i32, SshError> {
        self.calls.lock().push(format!("execute:{command}"));
        Ok(self.exit_code.load(Ordering::SeqCst))
    }

    async fn execute_raw(&self, command: &str) -> Result<i32, SshError> {
        self.calls.lock().push(format!("execute_raw:{command}"));
        Ok(self.exit_code.load(Ordering::SeqCst))
    }

    fn build_command_with_env(&self, command: &str, env: &BTreeMap<String, String>) -> Result<String, SshError> {
        campers_ssh::build_command_with_env(command, env)
    }

    fn abort_active_command(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Hands back a pre-built `FakeSshPort`, or fails once if `fail_connect` is set.
pub struct FakeSshConnector {
    pub port: Arc<FakeSshPort>,
    pub fail_connect: bool,
}

impl FakeSshConnector {
    pub fn new() -> Self {
        Self {
            port: Arc::new(FakeSshPort::new()),
            fail_connect: false,
        }
    }
}

impl Default for FakeSshConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SshConnector for FakeSshConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        _username: &str,
        _key_path: &Path,
    ) -> Result<Box<dyn SshPort>, SshError> {
        if self.fail_connect {
            return Err(SshError::ConnectionError {
                host: host.to_string(),
                port,
                reason: "fake connector configured to fail".into(),
            });
        }
        Ok(Box::new(FakeSshPortHandle(self.port.clone())))
    }
}

/// `Box<dyn SshPort>` wrapper forwarding to the shared `Arc<FakeSshPort>`
/// so the test retains a handle to assert on calls after `connect`.
struct FakeSshPortHandle(Arc<FakeSshPort>);

#[async_trait]
impl SshPort for FakeSshPortHandle {
    async fn execute(&self, command: &str) -> Result<i32, SshError> {
        self.0.execute(command).await
    }
    async fn execute_raw(&self, command: &str) -> Result<i32, SshError> {
        self.0.execute_raw(command).await
    }
    fn build_command_with_env(&self, command: &str, env: &BTreeMap<String, String>) -> Result<String, SshError> {
        self.0.build_command_with_env(command, env)
    }
    fn abort_active_command(&self) {
        self.0.abort_active_command()
    }
    async fn close(&self) {
        self.0.close().await
    }
}

#[derive(Default)]
pub struct FakeSyncPort {
    pub calls: Mutex<Vec<String>>,
    pub fail_create: bool,
    pub fail_steady: bool,
}

impl FakeSyncPort {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SyncPort for FakeSyncPort {
    async fn preflight(&self) -> Result<(), SyncError> {
        self.calls.lock().push("preflight".into());
        Ok(())
    }

    async fn cleanup_orphaned(&self, session_name: &str) {
        self.calls.lock().push(format!("cleanup_orphaned:{session_name}"));
    }

    async fn create_session(
        &self,
        name: &str,
        _local: &str,
        _remote: &str,
        _host: &str,
        _key_path: &Path,
        _user: &str,
        _ignore_patterns: &[String],
        _include_vcs: bool,
        _ssh_port: u16,
    ) -> Result<(), SyncError> {
        self.calls.lock().push(format!("create_session:{name}"));
        if self.fail_create {
            return Err(SyncError::SyncCreateFailed {
                stderr: "fake sync create failure".into(),
            });
        }
        Ok(())
    }

    async fn wait_steady(&self, session_name: &str, _deadline: Option<std::time::Duration>) -> Result<(), SyncError> {
        self.calls.lock().push(format!("wait_steady:{session_name}"));
        if self.fail_steady {
            return Err(SyncError::SyncTimeout(session_name.to_string()));
        }
        Ok(())
    }

    async fn status(&self, _session_name: &str) -> Result<String, SyncError> {
        Ok("watching for changes".to_string())
    }

    async fn terminate(&self, session_name: &str) {
        self.calls.lock().push(format!("terminate:{session_name}"));
    }
}

#[derive(Default)]
pub struct FakeTunnelPort {
    pub calls: Mutex<Vec<String>>,
    pub fail_ports: Vec<u16>,
}

#[async_trait]
impl TunnelPort for FakeTunnelPort {
    async fn create_tunnels(&self, ports: &[u16]) -> Result<(), TunnelError> {
        for &port in ports {
            self.calls.lock().push(format!("create_tunnel:{port}"));
            if self.fail_ports.contains(&port) {
                return Err(TunnelError::BindFailed {
                    port,
                    reason: "fake bind failure".into(),
                });
            }
        }
        Ok(())
    }

    async fn stop_all(&self) {
        self.calls.lock().push("stop_all".into());
    }
}

pub struct FakeTunnelConnector {
    pub port: Arc<FakeTunnelPort>,
}

impl FakeTunnelConnector {
    pub fn new() -> Self {
        Self {
            port: Arc::new(FakeTunnelPort::default()),
        }
    }

    pub fn failing(ports: Vec<u16>) -> Self {
        Self {
            port: Arc::new(FakeTunnelPort {
                calls: Mutex::new(Vec::new()),
                fail_ports: ports,
            }),
        }
    }
}

impl Default for FakeTunnelConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TunnelConnector for FakeTunnelConnector {
    async fn connect(
        &self,
        _host: &str,
        _ssh_port: u16,
        _username: &str,
        _key_path: &Path,
    ) -> Result<Box<dyn TunnelPort>, TunnelError> {
        Ok(Box::new(SharedTunnelPort(self.port.clone())))
    }
}

struct SharedTunnelPort(Arc<FakeTunnelPort>);

#[async_trait]
impl TunnelPort for SharedTunnelPort {
    async fn create_tunnels(&self, ports: &[u16]) -> Result<(), TunnelError> {
        self.0.create_tunnels(ports).await
    }
    async fn stop_all(&self) {
        self.0.stop_all().await
    }
}

#[derive(Default)]
pub struct FakePlaybookPort {
    pub calls: Mutex<Vec<String>>,
    pub fail_on: Option<String>,
}

#[async_trait]
impl PlaybookPort for FakePlaybookPort {
    async fn execute(
        &self,
        names: &[String],
        _playbooks: &BTreeMap<String, String>,
        _instance_ip: &str,
        _key_file: &Path,
        _user: &str,
        _ssh_port: u16,
    ) -> Result<(), PlaybookError> {
        for name in names {
            self.calls.lock().push(name.clone());
            if self.fail_on.as_deref() == Some(name.as_str()) {
                return Err(PlaybookError::PlaybookFailed {
                    name: name.clone(),
                    code: 1,
                });
            }
        }
        Ok(())
    }
}

pub fn fake_key_file() -> PathBuf {
    PathBuf::from("/tmp/campers-fake.pem")
}
