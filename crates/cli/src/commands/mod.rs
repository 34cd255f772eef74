// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod destroy;
pub mod doctor;
pub mod info;
pub mod init;
pub mod list;
pub mod run;
pub mod setup;
pub mod start;
pub mod stop;

use std::sync::Arc;

use campers_compute::ComputeAdapter;

use crate::env::CampersEnv;
use crate::exit_error::ExitError;

/// Resolve the region a standalone (non-`run`) command operates in when
/// `--region` wasn't given, mirroring boto3's own env-var fallback chain
/// (the original CLI passes `region=None` straight through to boto3's
/// client constructor) so behavior matches the original when no region
/// flag is passed.
pub(crate) fn resolve_region(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var("AWS_REGION").ok())
        .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
        .unwrap_or_else(|| "us-east-1".to_string())
}

/// Build the provider a command operates on directly (outside the
/// orchestrator's state machine), shared by every command that resolves
/// an existing instance by name or id.
pub(crate) async fn compute_adapter(
    region: &str,
    env: &CampersEnv,
) -> Result<Arc<dyn ComputeAdapter>, ExitError> {
    let adapter = campers_compute::AwsComputeAdapter::new(region, &env.campers_dir)
        .await
        .map_err(crate::errors::compute_exit_error)?;
    Ok(Arc::new(adapter))
}

/// Resolve `name_or_id` to exactly one instance, erroring with a
/// remediation hint when it matches zero or more than one.
pub(crate) async fn resolve_one(
    adapter: &dyn ComputeAdapter,
    name_or_id: &str,
    region_filter: Option<&str>,
) -> Result<campers_core::InstanceDescriptor, ExitError> {
    let mut matches = adapter
        .find_instances_by_name_or_id(name_or_id, region_filter)
        .await
        .map_err(crate::errors::compute_exit_error)?;

    match matches.len() {
        0 => Err(ExitError::new(
            1,
            format!(
                "no camp named or with id '{name_or_id}' was found; check the name and try `campers list`"
            ),
        )),
        1 => Ok(matches.remove(0)),
        _ => Err(ExitError::new(
            1,
            format!("'{name_or_id}' matches more than one camp; pass the instance id to disambiguate"),
        )),
    }
}
