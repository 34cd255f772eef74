// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers stop` — stop a managed instance and report its ongoing
//! storage cost (§2 of `SPEC_FULL.md`).

use clap::Args;

use crate::env::CampersEnv;
use crate::errors::compute_exit_error;
use crate::exit_error::ExitError;
use crate::pricing::{PricingProvider, StaticPricingTable};

#[derive(Args, Debug)]
pub struct StopArgs {
    pub name_or_id: String,

    #[arg(long)]
    pub region: Option<String>,
}

pub async fn run(args: StopArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let region = super::resolve_region(args.region.as_deref());
    let adapter = super::compute_adapter(&region, env).await?;
    let descriptor = super::resolve_one(adapter.as_ref(), &args.name_or_id, args.region.as_deref()).await?;

    let volume_gb = adapter
        .get_volume_size(&descriptor.instance_id)
        .await
        .unwrap_or(0);

    adapter
        .stop(&descriptor.instance_id)
        .await
        .map_err(compute_exit_error)?;

    println!("stopped {}", descriptor.instance_id);

    let monthly_cost = StaticPricingTable.estimate_monthly_cost(&descriptor.region, volume_gb);
    if monthly_cost > 0.0 {
        println!("still accruing ~${monthly_cost:.2}/month in {} storage", descriptor.region);
    }
    println!("run `campers start {}` to resume it", descriptor.instance_id);

    Ok(0)
}
