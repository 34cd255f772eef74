// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `TunnelController` — one `localhost:port` forwarder per configured port.

use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use russh::client::{self, Handle};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::TunnelError;

const PRIVILEGED_PORT_BOUND: u16 = 1024;

struct ForwardingHandler;

#[async_trait]
impl client::Handler for ForwardingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Maintains one `localhost`-only forwarder per port, each binding
/// `127.0.0.1:<port>` locally and `localhost:<port>` on the remote side
/// over its own SSH session (separate from the command transport, so
/// forwarding survives independently of whatever `SshTransport` is
/// streaming at the time).
pub struct TunnelController {
    session: Handle<ForwardingHandler>,
    forwarders: Mutex<Vec<JoinHandle<()>>>,
}

impl TunnelController {
    pub async fn connect(
        host: &str,
        ssh_port: u16,
        username: &str,
        key_path: &Path,
    ) -> Result<Self, TunnelError> {
        let key_pair = russh_keys::load_secret_key(key_path, None)
            .map_err(|e| TunnelError::ConnectionFailed(e.to_string()))?;
        let config = Arc::new(client::Config::default());
        let mut session = client::connect(config, (host, ssh_port), ForwardingHandler)
            .await
            .map_err(|e| TunnelError::ConnectionFailed(e.to_string()))?;
        session
            .authenticate_publickey(username, Arc::new(key_pair))
            .await
            .map_err(|e| TunnelError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            session,
            forwarders: Mutex::new(Vec::new()),
        })
    }

    /// Open a forwarder for each port. On partial failure, stops any
    /// forwarders already started before returning the error.
    pub async fn create_tunnels(&self, ports: &[u16]) -> Result<(), TunnelError> {
        for &port in ports {
            if port < PRIVILEGED_PORT_BOUND {
                warn!(port, "forwarding a privileged port; the local bind may require elevated permissions");
            }
            if let Err(err) = self.start_forwarder(port).await {
                self.stop_all().await;
                return Err(err);
            }
        }
        Ok(())
    }

    async fn start_forwarder(&self, port: u16) -> Result<(), TunnelError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(|e| TunnelError::BindFailed {
                port,
                reason: e.to_string(),
            })?;

        let session = self.session.clone();
        let handle = tokio::spawn(async move {
            loop {
                let (mut local_stream, peer) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(port, error = %e, "tunnel accept failed");
                        continue;
                    }
                };
                info!(port, %peer, "accepted local connection for forwarding");

                let session = session.clone();
                tokio::spawn(async move {
                    let channel = session
                        .channel_open_direct_tcpip("localhost", u32::from(port), "127.0.0.1", 0)
                        .await;
                    let Ok(channel) = channel else {
                        warn!(port, "failed to open direct-tcpip channel");
                        return;
                    };
                    let mut remote_stream = channel.into_stream();
                    let _ = tokio::io::copy_bidirectional(&mut local_stream, &mut remote_stream).await;
                });
            }
        });

        self.forwarders.lock().push(handle);
        Ok(())
    }

    /// Closes all forwarders. Idempotent; failures are logged, not raised.
    pub async fn stop_all(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut self.forwarders.lock());
        for handle in handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privileged_port_bound_matches_spec() {
        assert_eq!(PRIVILEGED_PORT_BOUND, 1024);
    }
}
