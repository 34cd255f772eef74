// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers run` — launch or reuse a camp and execute its command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use campers_compute::{AwsComputeAdapter, ComputeAdapter};
use campers_core::{RunEventPayload, SystemClock};
use campers_orchestrator::{
    clear_cleanup_target, install_signal_handlers, set_cleanup_target, CleanupCoordinator, EventBus,
    RealSshConnector, RealTunnelConnector, ResourceRegistry, RunOptions, RunOrchestrator, SshConnector,
    TunnelConnector,
};
use campers_playbook::PlaybookRunner;
use campers_sync::SyncController;
use clap::Args;
use serde_yaml::{Mapping, Value};

use crate::env::CampersEnv;
use crate::errors::{compute_exit_error, config_exit_error, orchestrator_exit_error};
use crate::events::print_events_until_closed;
use crate::exit_error::ExitError;

/// The fixed port `RunOrchestrator::run` connects SSH on. Not exposed
/// as a flag — `--port` names tunnel ports, not the SSH port itself.
const SSH_PORT: u16 = 22;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Named profile from the `camps` section of the config file.
    pub profile: Option<String>,

    #[arg(long)]
    pub command: Option<String>,

    #[arg(long = "instance-type")]
    pub instance_type: Option<String>,

    #[arg(long = "disk-size")]
    pub disk_size: Option<u32>,

    #[arg(long)]
    pub region: Option<String>,

    /// Tunnel port to forward; may be repeated.
    #[arg(long)]
    pub port: Vec<u16>,

    #[arg(long = "include-vcs")]
    pub include_vcs: bool,

    /// Additional sync ignore pattern; may be repeated.
    #[arg(long)]
    pub ignore: Vec<String>,

    #[arg(long = "json-output")]
    pub json_output: bool,

    /// No-op beyond forcing `NO_COLOR`: there is no TUI to suppress.
    #[arg(long)]
    pub plain: bool,

    #[arg(long)]
    pub verbose: bool,
}

fn build_overrides(args: &RunArgs) -> Mapping {
    let mut overrides = Mapping::new();
    let mut set = |key: &str, value: Value| {
        overrides.insert(Value::String(key.to_string()), value);
    };

    if let Some(command) = &args.command {
        set("command", Value::String(command.clone()));
    }
    if let Some(instance_type) = &args.instance_type {
        set("instance_type", Value::String(instance_type.clone()));
    }
    if let Some(disk_size) = args.disk_size {
        set("disk_size", Value::Number(disk_size.into()));
    }
    if let Some(region) = &args.region {
        set("region", Value::String(region.clone()));
    }
    if !args.port.is_empty() {
        set(
            "ports",
            Value::Sequence(args.port.iter().map(|p| Value::Number((*p).into())).collect()),
        );
    }
    if args.include_vcs {
        set("include_vcs", Value::Bool(true));
    }
    if !args.ignore.is_empty() {
        set(
            "ignore",
            Value::Sequence(args.ignore.iter().cloned().map(Value::String).collect()),
        );
    }

    overrides
}

pub async fn run(args: RunArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    if args.plain {
        std::env::set_var("NO_COLOR", "1");
    }

    let config_path = env
        .config_path
        .clone()
        .unwrap_or_else(|| Path::new("campers.yaml").to_path_buf());
    let file_contents = std::fs::read_to_string(&config_path).unwrap_or_default();

    let overrides = build_overrides(&args);
    let config = campers_config::resolve(&file_contents, args.profile.as_deref(), &overrides)
        .map_err(config_exit_error)?;

    let workspace_dir = std::env::current_dir().map_err(|e| ExitError::new(1, e.to_string()))?;
    let context = campers_identity::WorkspaceContext::discover(&workspace_dir);
    let clock = SystemClock;
    let instance_name = campers_identity::derive_instance_name(&context, &clock);

    let compute: Arc<dyn ComputeAdapter> = Arc::new(
        AwsComputeAdapter::new(&config.region, &env.campers_dir)
            .await
            .map_err(compute_exit_error)?,
    );
    compute
        .validate_region(&config.region)
        .await
        .map_err(compute_exit_error)?;

    let (ssh_connector, tunnel_connector): (Arc<dyn SshConnector>, Arc<dyn TunnelConnector>) = if env.test_mode
    {
        // CAMPERS_TEST_MODE stubs SSH and tunnels (per §6); the cli crate
        // always builds campers-orchestrator with its test-support feature
        // on, so these fakes are available in every build of this binary.
        (
            Arc::new(campers_orchestrator::FakeSshConnector::new()),
            Arc::new(campers_orchestrator::FakeTunnelConnector::new()),
        )
    } else {
        (
            Arc::new(RealSshConnector {
                max_attempts: env.ssh_max_retries,
                tcp_timeout: env.ssh_timeout.or(Some(Duration::from_secs(30))),
            }),
            Arc::new(RealTunnelConnector),
        )
    };

    let (events, rx) = EventBus::new(clock);
    let registry = Arc::new(ResourceRegistry::new());
    let coordinator = Arc::new(CleanupCoordinator::new(registry.clone(), events.clone()));

    let orchestrator = RunOrchestrator {
        compute,
        ssh_connector,
        sync: Arc::new(SyncController::new()),
        tunnel_connector,
        playbook: Arc::new(PlaybookRunner::new()),
        events: events.clone(),
        registry,
        coordinator: coordinator.clone(),
    };

    install_signal_handlers();
    set_cleanup_target(&coordinator);

    let render_task = tokio::spawn(print_events_until_closed(rx));
    events.publish(RunEventPayload::MergedConfig(config.clone()));

    let options = RunOptions {
        skip_sync: env.disable_mutagen,
        skip_ssh_connection: env.skip_ssh_connection,
        harness_managed: env.harness_managed,
    };

    let run_result = orchestrator.run(&config, &instance_name, SSH_PORT, options).await;
    let cleanup_report = coordinator.cleanup(None).await;
    clear_cleanup_target();

    drop(orchestrator);
    drop(coordinator);
    drop(events);
    let _ = render_task.await;

    if let Some(cleanup_err) = cleanup_report.first_error() {
        tracing::warn!(error = %cleanup_err, "cleanup reported an error after the run finished");
    }

    let outcome = run_result.map_err(orchestrator_exit_error)?;

    if args.json_output {
        let json =
            serde_json::to_string_pretty(&outcome.descriptor).map_err(|e| ExitError::new(1, e.to_string()))?;
        println!("{json}");
    }

    let exit_code = outcome.command_exit_code.unwrap_or(0);
    if env.force_signal_exit {
        std::process::exit(exit_code);
    }
    Ok(exit_code)
}
