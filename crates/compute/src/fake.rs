// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory `ComputeAdapter` for orchestrator tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use campers_core::{InstanceDescriptor, InstanceId, InstanceState, RunConfig};
use parking_lot::Mutex;

use crate::adapter::ComputeAdapter;
use crate::error::ComputeError;

/// Records every call made against it, alongside a scripted reply table,
/// so orchestrator tests can assert on call order without a real AWS account.
pub struct FakeComputeAdapter {
    instances: Mutex<BTreeMap<String, InstanceDescriptor>>,
    pub calls: Mutex<Vec<String>>,
    pub volume_size_gb: u32,
}

impl FakeComputeAdapter {
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            volume_size_gb: 50,
        }
    }

    /// Seed a pre-existing instance so `find_instances_by_name_or_id` can find it.
    pub fn seed(&self, descriptor: InstanceDescriptor) {
        self.instances
            .lock()
            .insert(descriptor.instance_id.as_str().to_string(), descriptor);
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

impl Default for FakeComputeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComputeAdapter for FakeComputeAdapter {
    async fn validate_region(&self, _region: &str) -> Result<(), ComputeError> {
        self.record("validate_region");
        Ok(())
    }

    async fn find_instances_by_name_or_id(
        &self,
        needle: &str,
        _region_filter: Option<&str>,
    ) -> Result<Vec<InstanceDescriptor>, ComputeError> {
        self.record("find_instances_by_name_or_id");
        let instances = self.instances.lock();
        let matches: Vec<InstanceDescriptor> = instances
            .values()
            .filter(|d| d.instance_id.as_str() == needle || d.unique_id == needle)
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn launch(
        &self,
        config: &RunConfig,
        instance_name: &str,
    ) -> Result<InstanceDescriptor, ComputeError> {
        self.record("launch");
        let descriptor = InstanceDescriptor {
            instance_id: InstanceId::new(format!("i-fake-{instance_name}")),
            state: InstanceState::Running,
            public_ip: Some("203.0.113.10".to_string()),
            private_ip: Some("10.0.0.10".to_string()),
            region: config.region.clone(),
            instance_type: config.instance_type.clone(),
            launch_time: 0,
            key_file: PathBuf::from("/tmp/campers-fake.pem"),
            unique_id: instance_name.to_string(),
            reused: false,
        };
        self.instances
            .lock()
            .insert(descriptor.instance_id.as_str().to_string(), descriptor.clone());
        Ok(descriptor)
    }

    async fn start(&self, instance_id: &InstanceId) -> Result<InstanceDescriptor, ComputeError> {
        self.record("start");
        let mut instances = self.instances.lock();
        let descriptor = instances
            .get_mut(instance_id.as_str())
            .ok_or_else(|| ComputeError::ProviderApiError {
                code: "NotFound".into(),
                message: instance_id.to_string(),
            })?;
        descriptor.state = InstanceState::Running;
        descriptor.reused = true;
        Ok(descriptor.clone())
    }

    async fn stop(&self, instance_id: &InstanceId) -> Result<(), ComputeError> {
        self.record("stop");
        if let Some(descriptor) = self.instances.lock().get_mut(instance_id.as_str()) {
            descriptor.state = InstanceState::Stopped;
        }
        Ok(())
    }

    async fn terminate(&self, instance_id: &InstanceId) -> Result<(), ComputeError> {
        self.record("terminate");
        if let Some(descriptor) = self.instances.lock().get_mut(instance_id.as_str()) {
            descriptor.state = InstanceState::Terminated;
        }
        Ok(())
    }

    async fn describe(&self, instance_id: &InstanceId) -> Result<InstanceDescriptor, ComputeError> {
        self.record("describe");
        self.instances
            .lock()
            .get(instance_id.as_str())
            .cloned()
            .ok_or_else(|| ComputeError::ProviderApiError {
                code: "NotFound".into(),
                message: instance_id.to_string(),
            })
    }

    async fn get_volume_size(&self, _instance_id: &InstanceId) -> Result<u32, ComputeError> {
        self.record("get_volume_size");
        Ok(self.volume_size_gb)
    }

    async fn list_managed(
        &self,
        _region_filter: Option<&str>,
    ) -> Result<Vec<InstanceDescriptor>, ComputeError> {
        self.record("list_managed");
        Ok(self.instances.lock().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campers_core::{OnExit, Provider};
    use std::collections::BTreeMap as Map;

    fn config() -> RunConfig {
        RunConfig {
            region: "us-east-1".into(),
            instance_type: "t3.medium".into(),
            disk_size: 50,
            provider: Provider::Aws,
            camp_name: "ad-hoc".into(),
            command: None,
            setup_script: None,
            startup_script: None,
            sync_paths: vec![],
            ports: vec![],
            include_vcs: false,
            ignore: vec![],
            env_filter: vec![],
            ssh_username: "ubuntu".into(),
            ssh_allowed_cidr: None,
            on_exit: OnExit::Stop,
            ansible_playbook: None,
            ansible_playbooks: None,
            playbooks: Map::new(),
        }
    }

    #[tokio::test]
    async fn launch_then_stop_records_call_order() {
        let adapter = FakeComputeAdapter::new();
        let descriptor = adapter.launch(&config(), "campers-test").await.expect("launch");
        adapter.stop(&descriptor.instance_id).await.expect("stop");
        assert_eq!(*adapter.calls.lock(), vec!["launch", "stop"]);
    }

    #[tokio::test]
    async fn start_marks_reused_true() {
        let adapter = FakeComputeAdapter::new();
        let descriptor = adapter.launch(&config(), "campers-test").await.expect("launch");
        adapter.stop(&descriptor.instance_id).await.expect("stop");
        let restarted = adapter.start(&descriptor.instance_id).await.expect("start");
        assert!(restarted.reused);
        assert_eq!(restarted.state, InstanceState::Running);
    }
}
