// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers list` — list every instance tagged `ManagedBy=campers`.

use clap::Args;

use crate::env::CampersEnv;
use crate::errors::compute_exit_error;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub region: Option<String>,
}

pub async fn run(args: ListArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let region = super::resolve_region(args.region.as_deref());
    let adapter = super::compute_adapter(&region, env).await?;

    let instances = adapter
        .list_managed(args.region.as_deref())
        .await
        .map_err(compute_exit_error)?;

    if instances.is_empty() {
        println!("no managed camps found in {region}");
        return Ok(0);
    }

    for descriptor in &instances {
        println!(
            "{}  {}  {}  {}",
            descriptor.instance_id,
            format!("{:?}", descriptor.state).to_lowercase(),
            descriptor.public_ip.as_deref().unwrap_or("-"),
            descriptor.instance_type,
        );
    }
    Ok(0)
}
