// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `SshTransport` — one authenticated SSH session, held for the
//! duration of a run.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use tokio::io::AsyncWriteExt;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::error::SshError;
use crate::quote::{build_command_with_env, validate_command, wrap_in_home_shell};

/// Backoff schedule for `connect`, per §4.L4: exponential up to 16s then flat at 30s.
const CONNECT_BACKOFF_SECS: &[u64] = &[1, 2, 4, 8, 16, 30, 30, 30, 30, 30];
const DEFAULT_TCP_TIMEOUT: Duration = Duration::from_secs(30);

struct ClientHandler;

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // Host key pinning is out of scope for this seam: the instance was
        // just launched or reused by the orchestrator itself, so there is
        // no prior host key to compare against.
        Ok(true)
    }
}

/// Holds exactly one SSH session. Not `Clone`: the orchestrator owns a
/// single instance per run, matching the spec's "a single transport is
/// used serially for commands" concurrency note.
pub struct SshTransport {
    session: Handle<ClientHandler>,
    abort_signal: Arc<Notify>,
    closed: AtomicBool,
    active_command: Mutex<bool>,
}

impl SshTransport {
    /// Connect with bounded-attempt backoff. `max_attempts` and
    /// `tcp_timeout` default to the spec's schedule/30s but are
    /// overridable (see `campers_cli`'s environment handling).
    pub async fn connect(
        host: &str,
        port: u16,
        username: &str,
        key_path: &Path,
        max_attempts: Option<usize>,
        tcp_timeout: Option<Duration>,
    ) -> Result<Self, SshError> {
        let attempts = max_attempts.unwrap_or(CONNECT_BACKOFF_SECS.len());
        let timeout = tcp_timeout.unwrap_or(DEFAULT_TCP_TIMEOUT);
        let key_pair = russh_keys::load_secret_key(key_path, None)
            .map_err(|e| SshError::ConnectionError {
                host: host.to_string(),
                port,
                reason: format!("failed to load private key {}: {e}", key_path.display()),
            })?;
        let key_pair = Arc::new(key_pair);

        let config = Arc::new(client::Config {
            connection_timeout: Some(timeout),
            ..Default::default()
        });

        let mut last_err = String::new();
        for attempt in 0..attempts {
            let addr = (host, port);
            let connect_result =
                tokio::time::timeout(timeout, client::connect(config.clone(), addr, ClientHandler)).await;

            match connect_result {
                Ok(Ok(mut session)) => {
                    match session
                        .authenticate_publickey(username, key_pair.clone())
                        .await
                    {
                        Ok(true) => {
                            info!(host, port, attempt, "ssh session authenticated");
                            return Ok(Self {
                                session,
                                abort_signal: Arc::new(Notify::new()),
                                closed: AtomicBool::new(false),
                                active_command: Mutex::new(false),
                            });
                        }
                        Ok(false) => last_err = "authentication rejected".to_string(),
                        Err(e) => last_err = e.to_string(),
                    }
                }
                Ok(Err(e)) => last_err = e.to_string(),
                Err(_) => last_err = "connection attempt timed out".to_string(),
            }

            if attempt + 1 < attempts {
                let delay = CONNECT_BACKOFF_SECS
                    .get(attempt)
                    .copied()
                    .unwrap_or(30);
                warn!(host, port, attempt, delay, %last_err, "ssh connect attempt failed, retrying");
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        Err(SshError::ConnectionError {
            host: host.to_string(),
            port,
            reason: last_err,
        })
    }

    /// `cd ~ && bash -c <quoted command>`, streamed, blocking for exit.
    pub async fn execute(&self, command: &str) -> Result<i32, SshError> {
        validate_command(command)?;
        self.execute_raw(&wrap_in_home_shell(command)).await
    }

    /// Runs `command` exactly as given, with no cd/bash wrapping.
    pub async fn execute_raw(&self, command: &str) -> Result<i32, SshError> {
        *self.active_command.lock() = true;
        let result = self.run_and_stream(command).await;
        *self.active_command.lock() = false;
        result
    }

    async fn run_and_stream(&self, command: &str) -> Result<i32, SshError> {
        let mut channel = self
            .session
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;
        channel
            .request_pty(false, "xterm", 80, 24, 0, 0, &[])
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;
        channel
            .exec(true, command.as_bytes())
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;

        let mut exit_code = 0i32;
        loop {
            tokio::select! {
                biased;
                _ = self.abort_signal.notified() => {
                    let _ = channel.close().await;
                    return Err(SshError::ChannelError("command aborted".into()));
                }
                msg = channel.wait() => {
                    match msg {
                        Some(ChannelMsg::Data { data }) => {
                            log_remote_line(&data);
                        }
                        Some(ChannelMsg::ExtendedData { data, .. }) => {
                            log_remote_line(&data);
                        }
                        Some(ChannelMsg::ExitStatus { exit_status }) => {
                            exit_code = exit_status as i32;
                        }
                        Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) => break,
                        Some(_) => {}
                        None => break,
                    }
                }
            }
        }

        Ok(exit_code)
    }

    /// Build a command with an environment prefix, same quoting rules as `quote::build_command_with_env`.
    pub fn build_command_with_env(
        &self,
        command: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<String, SshError> {
        build_command_with_env(command, env)
    }

    /// Closes the active channel if present. Safe to call from any
    /// thread while `execute`/`execute_raw` is in flight.
    pub fn abort_active_command(&self) {
        if *self.active_command.lock() {
            self.abort_signal.notify_waiters();
        }
    }

    /// Idempotent; aborts the active command first.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.abort_active_command();
        let _ = self
            .session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await;
        debug!("ssh transport closed");
    }

    /// Allocates a PTY sized to the local terminal and proxies stdin/stdout
    /// bidirectionally, resizing the remote PTY on local window-change.
    pub async fn execute_interactive(&self, command: Option<&str>) -> Result<i32, SshError> {
        let (cols, rows) = terminal_size();
        let mut channel = self
            .session
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;
        channel
            .request_pty(true, "xterm", cols, rows, 0, 0, &[])
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;

        match command {
            Some(cmd) => channel.exec(true, cmd.as_bytes()).await,
            None => channel.request_shell(true).await,
        }
        .map_err(|e| SshError::ChannelError(e.to_string()))?;

        let mut winch = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::window_change())
            .map_err(|e| SshError::ChannelError(e.to_string()))?;

        let mut stdin = tokio::io::stdin();
        let mut exit_code = 0i32;
        let mut input_buf = [0u8; 1024];
        loop {
            tokio::select! {
                biased;
                _ = self.abort_signal.notified() => {
                    let _ = channel.close().await;
                    break;
                }
                _ = winch.recv() => {
                    let (cols, rows) = terminal_size();
                    let _ = channel.window_change(cols, rows, 0, 0).await;
                }
                read = tokio::io::AsyncReadExt::read(&mut stdin, &mut input_buf) => {
                    match read {
                        Ok(0) | Err(_) => { let _ = channel.eof().await; }
                        Ok(n) => { let _ = channel.data(&input_buf[..n]).await; }
                    }
                }
                msg = channel.wait() => {
                    match msg {
                        Some(ChannelMsg::Data { data }) => {
                            let mut stdout = tokio::io::stdout();
                            let _ = stdout.write_all(&data).await;
                            let _ = stdout.flush().await;
                        }
                        Some(ChannelMsg::ExitStatus { exit_status }) => {
                            exit_code = exit_status as i32;
                        }
                        Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) => break,
                        Some(_) => {}
                        None => break,
                    }
                }
            }
        }
        // The SIGWINCH listener above is dropped with the channel at the
        // end of this scope, restoring the previous default disposition.
        Ok(exit_code)
    }
}

fn log_remote_line(data: &[u8]) {
    for line in String::from_utf8_lossy(data).lines() {
        if !line.is_empty() {
            debug!(target: "campers_ssh::remote", "{line}");
        }
    }
}

/// Query the local terminal's column/row count via `TIOCGWINSZ`, falling
/// back to a conservative default when stdout isn't attached to a TTY
/// (e.g. running under CI or with redirected output).
#[cfg(unix)]
fn terminal_size() -> (u32, u32) {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if rc == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        (ws.ws_col as u32, ws.ws_row as u32)
    } else {
        (80, 24)
    }
}

#[cfg(not(unix))]
fn terminal_size() -> (u32, u32) {
    (80, 24)
}
