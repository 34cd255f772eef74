// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `campers init` — write a starter config file.

use std::path::Path;

use clap::Args;

use crate::env::CampersEnv;
use crate::exit_error::ExitError;

const CONFIG_TEMPLATE: &str = r#"# campers.yaml - generated by `campers init`
#
# `vars` entries are available for ${interpolation} anywhere below them.
vars:
  region: us-east-1

defaults:
  region: ${region}
  instance_type: t3.medium
  disk_size: 50
  ssh_username: ubuntu
  on_exit: stop
  sync_paths:
    - local: .
      remote: ~/workspace
  ports: []
  include_vcs: false

camps: {}

playbooks: {}
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(long)]
    pub force: bool,
}

pub async fn run(args: InitArgs, env: &CampersEnv) -> Result<i32, ExitError> {
    let config_path = env
        .config_path
        .clone()
        .unwrap_or_else(|| Path::new("campers.yaml").to_path_buf());

    if config_path.exists() && !args.force {
        return Err(ExitError::new(
            1,
            format!("{} already exists. Use --force to overwrite.", config_path.display()),
        ));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ExitError::new(1, e.to_string()))?;
        }
    }

    std::fs::write(&config_path, CONFIG_TEMPLATE).map_err(|e| ExitError::new(1, e.to_string()))?;
    println!("Created {} configuration file.", config_path.display());
    Ok(0)
}
