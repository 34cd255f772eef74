// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers start` — start a stopped managed instance.

use clap::Args;

use crate::env::CampersEnv;
use crate::errors::compute_exit_error;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct StartArgs {
    pub name_or_id: String,

    #[arg(long)]
    pub region: Option<String>,
}

pub async fn run(args: StartArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let region = super::resolve_region(args.region.as_deref());
    let adapter = super::compute_adapter(&region, env).await?;
    let descriptor = super::resolve_one(adapter.as_ref(), &args.name_or_id, args.region.as_deref()).await?;

    let started = adapter
        .start(&descriptor.instance_id)
        .await
        .map_err(compute_exit_error)?;

    println!(
        "started {} ({})",
        started.instance_id,
        started.public_ip.as_deref().unwrap_or("no public ip yet")
    );
    Ok(0)
}
