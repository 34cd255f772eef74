// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers info` — show details of a managed instance.

use clap::Args;

use crate::env::CampersEnv;
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct InfoArgs {
    pub name_or_id: String,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long = "json-output")]
    pub json_output: bool,
}

pub async fn run(args: InfoArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let region = super::resolve_region(args.region.as_deref());
    let adapter = super::compute_adapter(&region, env).await?;
    let descriptor = super::resolve_one(adapter.as_ref(), &args.name_or_id, args.region.as_deref()).await?;

    if args.json_output {
        let json =
            serde_json::to_string_pretty(&descriptor).map_err(|e| ExitError::new(1, e.to_string()))?;
        println!("{json}");
        return Ok(0);
    }

    println!("instance id:    {}", descriptor.instance_id);
    println!("state:          {:?}", descriptor.state);
    println!("region:         {}", descriptor.region);
    println!("instance type:  {}", descriptor.instance_type);
    println!("public ip:      {}", descriptor.public_ip.as_deref().unwrap_or("-"));
    println!("private ip:     {}", descriptor.private_ip.as_deref().unwrap_or("-"));
    println!("key file:       {}", descriptor.key_file.display());
    Ok(0)
}
