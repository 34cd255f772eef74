// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers setup` — provider preflight: confirm credentials and the
//! region are usable before a user attempts `campers run`.
//!
//! Scoped to what `ComputeAdapter`'s provider-neutral seam can express:
//! region validation plus a managed-instance listing call, which
//! exercises credentials and read permissions the way `describe_vpcs`
//! and friends do in the original's AWS-specific setup checks.

use clap::Args;

use crate::env::CampersEnv;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct SetupArgs {
    #[arg(long)]
    pub region: Option<String>,
}

pub async fn run(args: SetupArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let region = super::resolve_region(args.region.as_deref());
    println!("Checking AWS prerequisites for {region}...\n");

    let adapter = super::compute_adapter(&region, env).await?;

    match adapter.validate_region(&region).await {
        Ok(()) => println!("AWS credentials and region look good"),
        Err(err) => {
            println!("AWS credentials or region check failed: {err}\n");
            println!("Fix it:");
            println!("  aws configure");
            return Ok(1);
        }
    }

    match adapter.list_managed(Some(&region)).await {
        Ok(instances) => println!("read access verified ({} managed camp(s) found)", instances.len()),
        Err(err) => println!("warning: could not list managed instances ({err}); some operations may fail"),
    }

    println!("\nSetup complete! Run: campers run");
    Ok(0)
}
