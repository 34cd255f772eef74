// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers doctor` — read-only diagnostics, the non-interactive sibling
//! of `campers setup` (which offers to fix what it finds).

use clap::Args;

use crate::env::CampersEnv;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[arg(long)]
    pub region: Option<String>,
}

pub async fn run(args: DoctorArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let region = super::resolve_region(args.region.as_deref());
    println!("Running diagnostics for {region}...\n");

    let adapter = super::compute_adapter(&region, env).await?;

    match adapter.validate_region(&region).await {
        Ok(()) => println!("AWS credentials and region look good"),
        Err(err) => {
            println!("AWS credentials or region check failed: {err}\n");
            println!("Fix it:");
            println!("  campers setup");
            return Ok(1);
        }
    }

    match adapter.list_managed(Some(&region)).await {
        Ok(instances) => {
            println!("managed camps in {region}: {}", instances.len());
            for descriptor in &instances {
                println!("  {} ({:?})", descriptor.instance_id, descriptor.state);
            }
        }
        Err(err) => println!("warning: could not list managed instances: {err}"),
    }

    println!("\nDiagnostics complete.");
    Ok(0)
}
