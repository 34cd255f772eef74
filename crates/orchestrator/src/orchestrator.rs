// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `RunOrchestrator` (H1) — the state machine driving a single run:
//! RESOLVE → PROVISION → CONNECT → SYNC → PLAYBOOKS → SETUP → TUNNELS →
//! STARTUP → COMMAND → DONE, with CLEANUP/ABORT reachable from every
//! state. RESOLVE itself (config merge + validation, §4.L1) happens one
//! layer up, in `campers_config::resolve`, before a `RunConfig` ever
//! reaches this type — see `DESIGN.md` for why that keeps this crate
//! free of a dependency on the raw config document shape.

use std::sync::Arc;
use std::time::Duration;

use campers_compute::ComputeAdapter;
use campers_core::{
    Clock, InstanceDescriptor, InstanceState, OnExit, ResourceKind, RunConfig, RunEventPayload, RunStatus,
};
use campers_ssh::{validate_command, wrap_in_dir_shell};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::cleanup::CleanupCoordinator;
use crate::error::OrchestratorError;
use crate::event_bus::EventBus;
use crate::ports::{PlaybookPort, SshConnector, SshPort, SyncPort, TunnelConnector, TunnelPort};
use crate::registry::ResourceRegistry;

/// Interval the orchestrator polls `cleanup_in_progress` while idling
/// for `CAMPERS_SKIP_SSH_CONNECTION` (§2 of `SPEC_FULL.md`).
const SKIP_SSH_IDLE_POLL: Duration = Duration::from_millis(100);

/// Data-dependent behavior switches resolved from environment variables
/// by the CLI boundary (§6) and passed in explicitly so the state
/// machine itself never reads the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// `CAMPERS_DISABLE_MUTAGEN=1` — skip the SYNC phase entirely.
    pub skip_sync: bool,
    /// `CAMPERS_SKIP_SSH_CONNECTION=1` — provision then idle for cleanup.
    pub skip_ssh_connection: bool,
    /// `CAMPERS_HARNESS_MANAGED=1` — suppress SSH/tunnel disposal; an
    /// external harness owns those resources instead.
    pub harness_managed: bool,
}

/// Outcome of a completed (non-aborted) run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub descriptor: InstanceDescriptor,
    pub command_exit_code: Option<i32>,
}

/// The collaborators a single run needs. Each is a trait object so
/// `campers-cli` can wire up `CAMPERS_TEST_MODE` stubs or real
/// implementations without the orchestrator knowing the difference.
pub struct RunOrchestrator<C: Clock> {
    pub compute: Arc<dyn ComputeAdapter>,
    pub ssh_connector: Arc<dyn SshConnector>,
    pub sync: Arc<dyn SyncPort>,
    pub tunnel_connector: Arc<dyn TunnelConnector>,
    pub playbook: Arc<dyn PlaybookPort>,
    pub events: EventBus<C>,
    pub registry: Arc<ResourceRegistry>,
    pub coordinator: Arc<CleanupCoordinator<C>>,
}

impl<C: Clock + 'static> RunOrchestrator<C> {
    /// Drive one run to completion. On error, the caller is expected to
    /// invoke `self.coordinator.cleanup(...)` — this method never tears
    /// resources down itself, so a caller can log/report the error
    /// before cleanup runs.
    pub async fn run(
        &self,
        config: &RunConfig,
        instance_name: &str,
        ssh_port: u16,
        options: RunOptions,
    ) -> Result<RunOutcome, OrchestratorError> {
        let descriptor = self.provision(config, instance_name).await?;
        self.events
            .publish(RunEventPayload::InstanceDetails(descriptor.clone()));

        if options.skip_ssh_connection {
            info!("CAMPERS_SKIP_SSH_CONNECTION set, idling for cleanup instead of connecting");
            while !self.coordinator.is_in_progress() {
                sleep(SKIP_SSH_IDLE_POLL).await;
            }
            return Ok(RunOutcome {
                descriptor,
                command_exit_code: None,
            });
        }

        let ssh = if config.needs_ssh() {
            self.check_not_cleaning_up()?;
            Some(self.connect(config, &descriptor, ssh_port, options).await?)
        } else {
            None
        };

        self.check_not_cleaning_up()?;
        self.sync_phase(config, &descriptor, ssh_port, options).await?;

        self.check_not_cleaning_up()?;
        self.playbooks_phase(config, &descriptor, ssh_port).await?;

        self.check_not_cleaning_up()?;
        if let Some(ssh) = &ssh {
            self.setup_phase(config, ssh.as_ref()).await?;
        }

        self.check_not_cleaning_up()?;
        self.tunnels_phase(config, &descriptor, ssh_port, options).await?;

        self.check_not_cleaning_up()?;
        if let Some(ssh) = &ssh {
            self.startup_phase(config, ssh.as_ref()).await?;
        }

        self.check_not_cleaning_up()?;
        let command_exit_code = match &ssh {
            Some(ssh) => self.command_phase(config, ssh.as_ref()).await?,
            None => None,
        };

        Ok(RunOutcome {
            descriptor,
            command_exit_code,
        })
    }

    fn check_not_cleaning_up(&self) -> Result<(), OrchestratorError> {
        if self.coordinator.is_in_progress() {
            return Err(OrchestratorError::Runtime(
                "cleanup already in progress, aborting remaining phases".into(),
            ));
        }
        Ok(())
    }

    // ---- PROVISION -----------------------------------------------------

    async fn provision(&self, config: &RunConfig, instance_name: &str) -> Result<InstanceDescriptor, OrchestratorError> {
        self.events.publish(RunEventPayload::StatusUpdate {
            status: RunStatus::Launching,
        });

        // Registered first and unconditionally: every provider call
        // that follows, including one that aborts on a region mismatch,
        // happens through this handle. Adapters in this workspace hold
        // no resource that needs an explicit close, so disposal is a
        // no-op; the entry exists so §8's "no partial resources beyond
        // the compute provider" property holds even on an early abort.
        self.registry.register(
            ResourceKind::ComputeProvider,
            "compute_provider",
            Box::new(|| Box::pin(async { Ok(()) })),
        );

        let mut matches = self
            .compute
            .find_instances_by_name_or_id(instance_name, Some(&config.region))
            .await?;
        let existing = matches.drain(..).find(|d| d.state != InstanceState::Terminated);

        let descriptor = match existing {
            Some(found) if found.region != config.region => {
                return Err(OrchestratorError::RegionMismatch {
                    instance_id: found.instance_id.to_string(),
                    found_region: found.region,
                    configured_region: config.region.clone(),
                });
            }
            Some(found) if found.state == InstanceState::Stopped => {
                info!(instance_id = %found.instance_id, "reusing stopped instance");
                self.compute.start(&found.instance_id).await?
            }
            Some(found) if found.state == InstanceState::Running => {
                return Err(OrchestratorError::AlreadyRunning {
                    name: instance_name.to_string(),
                });
            }
            Some(found) => {
                return Err(OrchestratorError::TransientState {
                    name: instance_name.to_string(),
                    state: state_label(found.state),
                });
            }
            None => {
                info!(instance_name, "no reusable instance found, launching");
                self.compute.launch(config, instance_name).await?
            }
        };

        // Only delete local key material when the instance itself is
        // going away on exit. A `stop`ped instance is reusable by a
        // later `start()`, which resolves its key file from the
        // `CampersSSHKeyFile` tag recorded at launch — deleting the
        // local PEM here would silently orphan that reuse path.
        if !descriptor.reused && config.on_exit == OnExit::Terminate {
            let key_file = descriptor.key_file.clone();
            self.registry.register(
                ResourceKind::KeyMaterial,
                key_file.display().to_string(),
                Box::new(move || {
                    Box::pin(async move {
                        if key_file.exists() {
                            std::fs::remove_file(&key_file)?;
                        }
                        Ok(())
                    })
                }),
            );
        }

        let instance_id = descriptor.instance_id.clone();
        let on_exit = config.on_exit;
        let compute = self.compute.clone();
        self.registry.register(
            ResourceKind::Instance,
            instance_id.to_string(),
            Box::new(move || {
                Box::pin(async move {
                    match on_exit {
                        OnExit::Stop => compute.stop(&instance_id).await.map_err(OrchestratorError::from),
                        OnExit::Terminate => compute.terminate(&instance_id).await.map_err(OrchestratorError::from),
                    }
                })
            }),
        );

        self.events.publish(RunEventPayload::StatusUpdate {
            status: RunStatus::Running,
        });
        Ok(descriptor)
    }

    // ---- CONNECT --------------------------------------------------------

    async fn connect(
        &self,
        config: &RunConfig,
        descriptor: &InstanceDescriptor,
        ssh_port: u16,
        options: RunOptions,
    ) -> Result<Arc<dyn SshPort>, OrchestratorError> {
        let host = descriptor
            .public_ip
            .clone()
            .ok_or_else(|| OrchestratorError::Runtime("instance has no public IP to connect to".into()))?;

        let ssh: Arc<dyn SshPort> = Arc::from(
            self.ssh_connector
                .connect(&host, ssh_port, &config.ssh_username, &descriptor.key_file)
                .await?,
        );

        if !options.harness_managed {
            let disposable = ssh.clone();
            self.registry.register(
                ResourceKind::Ssh,
                "ssh",
                Box::new(move || {
                    Box::pin(async move {
                        disposable.abort_active_command();
                        disposable.close().await;
                        Ok(())
                    })
                }),
            );
        }

        Ok(ssh)
    }

    // ---- SYNC -------------------------------------------------------------

    async fn sync_phase(
        &self,
        config: &RunConfig,
        descriptor: &InstanceDescriptor,
        ssh_port: u16,
        options: RunOptions,
    ) -> Result<(), OrchestratorError> {
        if config.sync_paths.is_empty() || options.skip_sync {
            return Ok(());
        }

        self.sync.preflight().await?;

        let session_name = format!("campers-{}", descriptor.unique_id);
        self.sync.cleanup_orphaned(&session_name).await;

        let host = descriptor
            .public_ip
            .clone()
            .ok_or_else(|| OrchestratorError::Runtime("instance has no public IP for sync".into()))?;
        let sync_path = &config.sync_paths[0];
        self.sync
            .create_session(
                &session_name,
                &sync_path.local,
                &sync_path.remote,
                &host,
                &descriptor.key_file,
                &config.ssh_username,
                &config.ignore,
                config.include_vcs,
                ssh_port,
            )
            .await?;

        self.sync.wait_steady(&session_name, None).await.inspect_err(|_| {
            warn!(session_name, "sync never reached steady state before deadline");
        })?;

        self.events.publish(RunEventPayload::MutagenStatus {
            state: "watching".into(),
            status_text: self.sync.status(&session_name).await.ok(),
            files_synced: None,
        });

        let sync = self.sync.clone();
        let label = session_name.clone();
        self.registry.register(
            ResourceKind::SyncSession,
            session_name,
            Box::new(move || {
                Box::pin(async move {
                    sync.terminate(&label).await;
                    Ok(())
                })
            }),
        );

        Ok(())
    }

    // ---- PLAYBOOKS --------------------------------------------------------

    async fn playbooks_phase(
        &self,
        config: &RunConfig,
        descriptor: &InstanceDescriptor,
        ssh_port: u16,
    ) -> Result<(), OrchestratorError> {
        let names = playbook_names(config);
        if names.is_empty() {
            return Ok(());
        }

        let host = descriptor
            .public_ip
            .clone()
            .ok_or_else(|| OrchestratorError::Runtime("instance has no public IP for playbooks".into()))?;
        self.playbook
            .execute(
                &names,
                &config.playbooks,
                &host,
                &descriptor.key_file,
                &config.ssh_username,
                ssh_port,
            )
            .await?;
        Ok(())
    }

    // ---- SETUP --------------------------------------------------------------

    async fn setup_phase(&self, config: &RunConfig, ssh: &dyn SshPort) -> Result<(), OrchestratorError> {
        let Some(script) = config.setup_script.as_deref() else {
            return Ok(());
        };
        if script.trim().is_empty() {
            return Ok(());
        }

        let env = campers_ssh::filter_environment_variables(&config.env_filter)?;
        let command = ssh.build_command_with_env(script, &env)?;
        let code = ssh.execute(&command).await?;
        if code != 0 {
            return Err(OrchestratorError::Runtime(format!(
                "setup_script exited with code {code}"
            )));
        }
        Ok(())
    }

    // ---- TUNNELS --------------------------------------------------------

    async fn tunnels_phase(
        &self,
        config: &RunConfig,
        descriptor: &InstanceDescriptor,
        ssh_port: u16,
        options: RunOptions,
    ) -> Result<(), OrchestratorError> {
        if config.ports.is_empty() {
            return Ok(());
        }

        let host = descriptor
            .public_ip
            .clone()
            .ok_or_else(|| OrchestratorError::Runtime("instance has no public IP for tunnels".into()))?;
        let tunnels: Arc<dyn TunnelPort> = Arc::from(
            self.tunnel_connector
                .connect(&host, ssh_port, &config.ssh_username, &descriptor.key_file)
                .await?,
        );
        tunnels.create_tunnels(&config.ports).await?;

        if !options.harness_managed {
            let disposable = tunnels.clone();
            self.registry.register(
                ResourceKind::Tunnels,
                config.ports.iter().map(u16::to_string).collect::<Vec<_>>().join(","),
                Box::new(move || {
                    Box::pin(async move {
                        disposable.stop_all().await;
                        Ok(())
                    })
                }),
            );
        }

        Ok(())
    }

    // ---- STARTUP --------------------------------------------------------

    async fn startup_phase(&self, config: &RunConfig, ssh: &dyn SshPort) -> Result<(), OrchestratorError> {
        let Some(script) = config.startup_script.as_deref() else {
            return Ok(());
        };
        if script.trim().is_empty() {
            return Ok(());
        }
        // Invariant (§3): startup_script non-empty implies sync_paths non-empty.
        let dir = &config.sync_paths[0].remote;
        let wrapped = wrap_in_dir_shell(script, dir);
        let code = ssh.execute_raw(&wrapped).await?;
        if code != 0 {
            return Err(OrchestratorError::Runtime(format!(
                "startup_script exited with code {code}"
            )));
        }
        Ok(())
    }

    // ---- COMMAND --------------------------------------------------------

    async fn command_phase(&self, config: &RunConfig, ssh: &dyn SshPort) -> Result<Option<i32>, OrchestratorError> {
        let Some(command) = config.command.as_deref() else {
            return Ok(None);
        };
        self.events.publish(RunEventPayload::StatusUpdate {
            status: RunStatus::Running,
        });

        validate_command(command)?;
        let code = if !config.sync_paths.is_empty() {
            let wrapped = wrap_in_dir_shell(command, &config.sync_paths[0].remote);
            ssh.execute_raw(&wrapped).await?
        } else {
            ssh.execute(command).await?
        };
        Ok(Some(code))
    }
}

fn playbook_names(config: &RunConfig) -> Vec<String> {
    if let Some(single) = &config.ansible_playbook {
        return vec![single.clone()];
    }
    config.ansible_playbooks.clone().unwrap_or_default()
}

fn state_label(state: InstanceState) -> String {
    match state {
        InstanceState::Pending => "pending",
        InstanceState::Running => "running",
        InstanceState::Stopping => "stopping",
        InstanceState::Stopped => "stopped",
        InstanceState::Terminated => "terminated",
    }
    .to_string()
}
