// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `ComputeAdapter` — the provider-neutral seam over a cloud compute API.

use async_trait::async_trait;
use campers_core::{InstanceDescriptor, InstanceId, RunConfig};

use crate::error::ComputeError;

/// Provider-neutral interface to a cloud's compute API. One
/// implementation ships (`AwsComputeAdapter`); the trait exists so the
/// orchestrator never depends on `aws-sdk-ec2` directly.
#[async_trait]
pub trait ComputeAdapter: Send + Sync {
    /// Validate that `region` is a region this provider serves. May
    /// degrade to a no-op (log and proceed) when the underlying catalog
    /// call itself is unauthorized — a denied IAM permission for the
    /// catalog API is not evidence the region is invalid.
    async fn validate_region(&self, region: &str) -> Result<(), ComputeError>;

    /// Find instances matching `needle` against either instance id
    /// (exact) or the `Name` tag (exact), optionally narrowed to
    /// `region_filter`. Ordered by launch time descending; among equal
    /// launch times non-terminated instances sort first.
    async fn find_instances_by_name_or_id(
        &self,
        needle: &str,
        region_filter: Option<&str>,
    ) -> Result<Vec<InstanceDescriptor>, ComputeError>;

    /// Launch a fresh instance for `config`, tagged `Name=instance_name`,
    /// `CampName=<config.camp_name>`, `ManagedBy=campers`. Creates or
    /// reuses a key pair and a security group permitting SSH (and each
    /// of `config.ports`) from `config.ssh_allowed_cidr` (or
    /// `0.0.0.0/0` if unset). Blocks until `running` and a public IP is
    /// assigned. Returns a descriptor with `reused=false`.
    async fn launch(
        &self,
        config: &RunConfig,
        instance_name: &str,
    ) -> Result<InstanceDescriptor, ComputeError>;

    /// Start a stopped instance. The returned descriptor's public IP
    /// may differ from the one it had before stopping.
    async fn start(&self, instance_id: &InstanceId) -> Result<InstanceDescriptor, ComputeError>;

    /// Stop a running instance. Idempotent from the caller's
    /// perspective: stopping an already-stopped instance is not an error.
    async fn stop(&self, instance_id: &InstanceId) -> Result<(), ComputeError>;

    /// Terminate an instance permanently.
    async fn terminate(&self, instance_id: &InstanceId) -> Result<(), ComputeError>;

    /// Re-fetch the current state of a known instance, used by the
    /// provisioning poll loop (2s interval, 120s bound).
    async fn describe(&self, instance_id: &InstanceId) -> Result<InstanceDescriptor, ComputeError>;

    /// Size, in GB, of the instance's root volume.
    async fn get_volume_size(&self, instance_id: &InstanceId) -> Result<u32, ComputeError>;

    /// List every instance tagged `ManagedBy=campers`, optionally
    /// narrowed to `region_filter`. Same ordering as
    /// [`ComputeAdapter::find_instances_by_name_or_id`]. Backs `campers
    /// list`, which has no name or id to narrow by — the `ManagedBy`
    /// tag is the sole source of truth for what campers manages.
    async fn list_managed(
        &self,
        region_filter: Option<&str>,
    ) -> Result<Vec<InstanceDescriptor>, ComputeError>;
}
