// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! AWS EC2 implementation of [`ComputeAdapter`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_ec2::error::SdkError;
use aws_sdk_ec2::types::{Filter, InstanceStateName, ResourceType, Tag, TagSpecification};
use aws_sdk_ec2::Client;
use campers_core::{InstanceDescriptor, InstanceId, InstanceState, RunConfig};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::adapter::ComputeAdapter;
use crate::error::ComputeError;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_BOUND: Duration = Duration::from_secs(120);
const SECURITY_GROUP_NAME: &str = "campers-sg";

/// Instance tag carrying the local path of the private key written for
/// this instance's key pair, read back by `instance_to_descriptor` so a
/// `start()`ed (reused) instance still resolves to the same PEM file a
/// prior `launch()` wrote to disk. AWS only returns key material at
/// `CreateKeyPair` time, so this tag is the only place that path
/// survives between runs.
const KEY_FILE_TAG: &str = "CampersSSHKeyFile";

/// EC2-backed [`ComputeAdapter`]. Holds a client bound to one region;
/// `region_filter` on `find_instances_by_name_or_id` only matters when
/// it names a different region than the one the adapter was built for,
/// in which case a throwaway client for that region is used.
pub struct AwsComputeAdapter {
    region: String,
    client: Client,
    key_dir: PathBuf,
}

impl AwsComputeAdapter {
    /// `key_dir` is where generated private key PEM files are written
    /// (`CAMPERS_DIR` at the CLI boundary).
    pub async fn new(region: &str, key_dir: &Path) -> Result<Self, ComputeError> {
        let shared_config = aws_config::from_env()
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        let client = Client::new(&shared_config);
        Ok(Self {
            region: region.to_string(),
            client,
            key_dir: key_dir.to_path_buf(),
        })
    }

    async fn client_for_region(&self, region_filter: Option<&str>) -> Client {
        match region_filter {
            Some(r) if r != self.region => {
                let shared_config = aws_config::from_env()
                    .region(aws_config::Region::new(r.to_string()))
                    .load()
                    .await;
                Client::new(&shared_config)
            }
            _ => self.client.clone(),
        }
    }

    /// Create a fresh, instance-scoped key pair and persist its private
    /// key material to `key_dir`. Only called from `launch()` — a
    /// reused (started) instance already has its key file recorded in
    /// the `CampersSSHKeyFile` tag, so there is never a stale-name
    /// collision to "ensure" around.
    async fn create_key_pair(&self, instance_name: &str) -> Result<(String, PathBuf), ComputeError> {
        let key_name = format!("campers-{instance_name}-{}", uuid::Uuid::new_v4());

        let created = self
            .client
            .create_key_pair()
            .key_name(&key_name)
            .send()
            .await
            .map_err(api_error)?;
        let material = created.key_material().ok_or_else(|| ComputeError::ProviderApiError {
            code: "MissingKeyMaterial".to_string(),
            message: "create_key_pair response contained no private key material".to_string(),
        })?;

        std::fs::create_dir_all(&self.key_dir).map_err(io_error)?;
        let key_path = self.key_dir.join(format!("{key_name}.pem"));
        std::fs::write(&key_path, material).map_err(io_error)?;
        set_owner_read_write(&key_path)?;

        Ok((key_name, key_path))
    }

    async fn ensure_security_group(
        &self,
        config: &RunConfig,
    ) -> Result<String, ComputeError> {
        let existing = self
            .client
            .describe_security_groups()
            .filters(Filter::builder().name("group-name").values(SECURITY_GROUP_NAME).build())
            .send()
            .await
            .map_err(api_error)?;

        let group_id = if let Some(group) = existing.security_groups().first() {
            group.group_id().unwrap_or_default().to_string()
        } else {
            let created = self
                .client
                .create_security_group()
                .group_name(SECURITY_GROUP_NAME)
                .description("campers-managed ingress")
                .send()
                .await
                .map_err(api_error)?;
            created.group_id().unwrap_or_default().to_string()
        };

        let cidr = config.ssh_allowed_cidr.clone().unwrap_or_else(|| "0.0.0.0/0".to_string());
        let mut ports = vec![22u16];
        ports.extend(config.ports.iter().copied());
        for port in ports {
            let _ = self
                .client
                .authorize_security_group_ingress()
                .group_id(&group_id)
                .ip_protocol("tcp")
                .from_port(i32::from(port))
                .to_port(i32::from(port))
                .cidr_ip(&cidr)
                .send()
                .await; // duplicate-rule errors are expected on reuse; ignore them
        }

        Ok(group_id)
    }

    async fn wait_for_running_with_ip(
        &self,
        instance_id: &str,
    ) -> Result<InstanceDescriptor, ComputeError> {
        let id = InstanceId::new(instance_id);
        let mut waited = Duration::ZERO;
        loop {
            let descriptor = self.describe(&id).await?;
            if descriptor.state == InstanceState::Running && descriptor.public_ip.is_some() {
                return Ok(descriptor);
            }
            if waited >= POLL_BOUND {
                return Err(ComputeError::ProviderTimeout(format!(
                    "instance {instance_id} did not reach running with a public IP within {POLL_BOUND:?}"
                )));
            }
            sleep(POLL_INTERVAL).await;
            waited += POLL_INTERVAL;
        }
    }
}

#[async_trait]
impl ComputeAdapter for AwsComputeAdapter {
    async fn validate_region(&self, region: &str) -> Result<(), ComputeError> {
        let result = self
            .client
            .describe_regions()
            .region_names(region)
            .send()
            .await;

        match result {
            Ok(resp) if resp.regions().is_empty() => Err(ComputeError::InvalidRegion(region.to_string())),
            Ok(_) => Ok(()),
            Err(err) if is_unauthorized(&err) => {
                warn!(region, "region catalog call unauthorized, proceeding without validation");
                Ok(())
            }
            Err(err) => Err(api_error(err)),
        }
    }

    async fn find_instances_by_name_or_id(
        &self,
        needle: &str,
        region_filter: Option<&str>,
    ) -> Result<Vec<InstanceDescriptor>, ComputeError> {
        let client = self.client_for_region(region_filter).await;

        let filter = if needle.starts_with("i-") {
            Filter::builder().name("instance-id").values(needle).build()
        } else {
            Filter::builder().name("tag:Name").values(needle).build()
        };

        let resp = client
            .describe_instances()
            .filters(filter)
            .send()
            .await
            .map_err(api_error)?;

        let mut descriptors: Vec<InstanceDescriptor> = resp
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(instance_to_descriptor)
            .collect();

        descriptors.sort_by(|a, b| {
            let terminated_a = a.state == InstanceState::Terminated;
            let terminated_b = b.state == InstanceState::Terminated;
            terminated_a
                .cmp(&terminated_b)
                .then(b.launch_time.cmp(&a.launch_time))
        });

        Ok(descriptors)
    }

    async fn launch(
        &self,
        config: &RunConfig,
        instance_name: &str,
    ) -> Result<InstanceDescriptor, ComputeError> {
        let (key_name, key_path) = self.create_key_pair(instance_name).await?;
        let security_group_id = self.ensure_security_group(config).await?;

        let tags = TagSpecification::builder()
            .resource_type(ResourceType::Instance)
            .tags(Tag::builder().key("Name").value(instance_name).build())
            .tags(Tag::builder().key("CampName").value(&config.camp_name).build())
            .tags(Tag::builder().key("ManagedBy").value("campers").build())
            .tags(Tag::builder().key(KEY_FILE_TAG).value(key_path.display().to_string()).build())
            .build();

        let resp = self
            .client
            .run_instances()
            .image_id(default_ami_for_region(&config.region))
            .instance_type(config.instance_type.clone().into())
            .key_name(key_name)
            .security_group_ids(security_group_id)
            .tag_specifications(tags)
            .min_count(1)
            .max_count(1)
            .send()
            .await
            .map_err(api_error)?;

        let instance_id = resp
            .instances()
            .first()
            .and_then(|i| i.instance_id())
            .ok_or_else(|| ComputeError::ProviderApiError {
                code: "MissingInstanceId".to_string(),
                message: "run_instances response contained no instance".to_string(),
            })?
            .to_string();

        info!(instance_id, instance_name, "launched instance");
        let mut descriptor = self.wait_for_running_with_ip(&instance_id).await?;
        descriptor.reused = false;
        descriptor.key_file = key_path;
        Ok(descriptor)
    }

    async fn start(&self, instance_id: &InstanceId) -> Result<InstanceDescriptor, ComputeError> {
        self.client
            .start_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(api_error)?;

        let mut descriptor = self.wait_for_running_with_ip(instance_id.as_str()).await?;
        descriptor.reused = true;
        Ok(descriptor)
    }

    async fn stop(&self, instance_id: &InstanceId) -> Result<(), ComputeError> {
        self.client
            .stop_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn terminate(&self, instance_id: &InstanceId) -> Result<(), ComputeError> {
        self.client
            .terminate_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn describe(&self, instance_id: &InstanceId) -> Result<InstanceDescriptor, ComputeError> {
        let resp = self
            .client
            .describe_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(api_error)?;

        resp.reservations()
            .iter()
            .flat_map(|r| r.instances())
            .find_map(instance_to_descriptor)
            .ok_or_else(|| ComputeError::ProviderApiError {
                code: "NotFound".to_string(),
                message: format!("instance {instance_id} not found"),
            })
    }

    async fn list_managed(
        &self,
        region_filter: Option<&str>,
    ) -> Result<Vec<InstanceDescriptor>, ComputeError> {
        let client = self.client_for_region(region_filter).await;

        let resp = client
            .describe_instances()
            .filters(Filter::builder().name("tag:ManagedBy").values("campers").build())
            .send()
            .await
            .map_err(api_error)?;

        let mut descriptors: Vec<InstanceDescriptor> = resp
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(instance_to_descriptor)
            .collect();

        descriptors.sort_by(|a, b| {
            let terminated_a = a.state == InstanceState::Terminated;
            let terminated_b = b.state == InstanceState::Terminated;
            terminated_a
                .cmp(&terminated_b)
                .then(b.launch_time.cmp(&a.launch_time))
        });

        Ok(descriptors)
    }

    async fn get_volume_size(&self, instance_id: &InstanceId) -> Result<u32, ComputeError> {
        let described = self
            .client
            .describe_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .map_err(api_error)?;

        let volume_id = described
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .flat_map(|i| i.block_device_mappings())
            .find_map(|m| m.ebs().and_then(|ebs| ebs.volume_id()))
            .ok_or_else(|| ComputeError::ProviderApiError {
                code: "NoVolume".to_string(),
                message: format!("instance {instance_id} has no EBS volume attached"),
            })?
            .to_string();

        let volumes = self
            .client
            .describe_volumes()
            .volume_ids(volume_id)
            .send()
            .await
            .map_err(api_error)?;

        volumes
            .volumes()
            .first()
            .and_then(|v| v.size())
            .map(|size| size as u32)
            .ok_or_else(|| ComputeError::ProviderApiError {
                code: "NoSize".to_string(),
                message: "volume had no reported size".to_string(),
            })
    }
}

fn instance_to_descriptor(instance: &aws_sdk_ec2::types::Instance) -> Option<InstanceDescriptor> {
    let instance_id = instance.instance_id()?.to_string();
    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(map_instance_state)
        .unwrap_or(InstanceState::Pending);
    let region = instance
        .placement()
        .and_then(|p| p.availability_zone())
        .map(|az| az.trim_end_matches(|c: char| c.is_ascii_lowercase()).to_string())
        .unwrap_or_default();
    let launch_time = instance
        .launch_time()
        .and_then(|t| t.secs().try_into().ok())
        .unwrap_or(0);
    let key_file = instance
        .tags()
        .iter()
        .find(|t| t.key() == Some(KEY_FILE_TAG))
        .and_then(|t| t.value())
        .map(PathBuf::from)
        .unwrap_or_default();

    Some(InstanceDescriptor {
        instance_id: InstanceId::new(instance_id),
        state,
        public_ip: instance.public_ip_address().map(str::to_string),
        private_ip: instance.private_ip_address().map(str::to_string),
        region,
        instance_type: instance
            .instance_type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        launch_time,
        key_file,
        unique_id: uuid::Uuid::new_v4().to_string(),
        reused: false,
    })
}

fn io_error(err: std::io::Error) -> ComputeError {
    ComputeError::ProviderApiError {
        code: "LocalKeyFileError".to_string(),
        message: err.to_string(),
    }
}

#[cfg(unix)]
fn set_owner_read_write(path: &Path) -> Result<(), ComputeError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(io_error)
}

#[cfg(not(unix))]
fn set_owner_read_write(_path: &Path) -> Result<(), ComputeError> {
    Ok(())
}

fn map_instance_state(name: &InstanceStateName) -> InstanceState {
    match name {
        InstanceStateName::Pending => InstanceState::Pending,
        InstanceStateName::Running => InstanceState::Running,
        InstanceStateName::Stopping => InstanceState::Stopping,
        InstanceStateName::Stopped => InstanceState::Stopped,
        InstanceStateName::ShuttingDown | InstanceStateName::Terminated => InstanceState::Terminated,
        _ => InstanceState::Pending,
    }
}

fn default_ami_for_region(_region: &str) -> String {
    // Resolved at launch time against the latest Ubuntu LTS AMI for the
    // region via SSM parameter lookup in a full deployment; a fixed
    // placeholder keeps this seam simple for now.
    "ami-0000000000000000".to_string()
}

fn is_unauthorized<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(e) if e.raw().status().as_u16() == 403)
}

fn api_error<E: std::fmt::Display>(err: SdkError<E>) -> ComputeError {
    ComputeError::ProviderApiError {
        code: "AwsApiError".to_string(),
        message: err.to_string(),
    }
}
