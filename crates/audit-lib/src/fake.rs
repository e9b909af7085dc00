//! In-memory fake of the three control-plane APIs
//!
//! Serves fixture data and records every call, so tests can assert on call
//! counts and batch shapes without network access.

use crate::collector::operations::*;
use crate::collector::{async_trait, ClusterApi, HostGroupApi, ScalingApi, DESCRIBE_BATCH_SIZE};
use crate::error::{AuditError, AuditResult};
use crate::models::{
    ContainerHost, HostGroup, HostGroupMembership, LaunchType, ScalableTarget, Service,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One recorded upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: &'static str,
    pub args: Vec<String>,
}

/// Fake cloud serving a single cluster's fixtures
#[derive(Debug, Default)]
pub struct FakeCloud {
    region: String,
    active_hosts: Vec<ContainerHost>,
    memberships: Vec<HostGroupMembership>,
    host_groups: Vec<HostGroup>,
    services: Vec<Service>,
    fargate_services: Vec<String>,
    targets: Vec<ScalableTarget>,
    deleted: HashSet<String>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self {
            region: "us-east-1".to_string(),
            ..Self::default()
        }
    }

    /// A cluster with one ACTIVE host inside one auto-scaling group
    pub fn with_standard_host_group(host_group: HostGroup) -> Self {
        let group_name = host_group.name.clone();
        Self::new()
            .with_active_host("c0ffee01", "i-0123456789abcdef0")
            .with_membership("i-0123456789abcdef0", &group_name)
            .with_host_group(host_group)
    }

    pub fn with_active_host(mut self, host_id: &str, instance_id: &str) -> Self {
        self.active_hosts.push(ContainerHost {
            host_id: host_id.to_string(),
            compute_instance_id: instance_id.to_string(),
        });
        self
    }

    pub fn with_membership(mut self, instance_id: &str, group_name: &str) -> Self {
        self.memberships.push(HostGroupMembership {
            instance_id: instance_id.to_string(),
            host_group_name: group_name.to_string(),
        });
        self
    }

    pub fn with_host_group(mut self, host_group: HostGroup) -> Self {
        self.host_groups.push(host_group);
        self
    }

    pub fn with_service(mut self, name: &str, desired_count: u32, running_count: u32) -> Self {
        self.services.push(Service {
            name: name.to_string(),
            desired_count,
            running_count,
        });
        self
    }

    /// A service with a non-EC2 launch type, never returned for EC2 listings
    pub fn with_fargate_service(mut self, name: &str) -> Self {
        self.fargate_services.push(name.to_string());
        self
    }

    pub fn with_scalable_target(mut self, resource_id: &str, max_capacity: u32) -> Self {
        self.targets.push(ScalableTarget {
            resource_id: resource_id.to_string(),
            max_capacity,
        });
        self
    }

    /// Make every call of `operation` fail with a transport error
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// A service that is still listed but no longer describable
    pub fn with_deleted_service(mut self, name: &str) -> Self {
        self = self.with_service(name, 0, 0);
        self.deleted.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .collect()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls_to(operation).len()
    }

    fn record(&self, operation: &'static str, args: Vec<String>) -> AuditResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall { operation, args });
        }
        if self.failing.contains(operation) {
            return Err(AuditError::upstream(operation, "simulated throttling"));
        }
        Ok(())
    }

    fn service_arn(&self, cluster: &str, name: &str) -> String {
        format!(
            "arn:aws:ecs:{}:000000000000:service/{}/{}",
            self.region, cluster, name
        )
    }
}

#[async_trait]
impl ClusterApi for FakeCloud {
    async fn list_active_hosts(&self, cluster: &str, max_results: u32) -> AuditResult<Vec<String>> {
        self.record(LIST_CONTAINER_INSTANCES, vec![cluster.to_string()])?;
        Ok(self
            .active_hosts
            .iter()
            .take(max_results as usize)
            .map(|h| h.host_id.clone())
            .collect())
    }

    async fn describe_hosts(&self, _cluster: &str, host_ids: &[String]) -> AuditResult<Vec<ContainerHost>> {
        self.record(DESCRIBE_CONTAINER_INSTANCES, host_ids.to_vec())?;
        Ok(self
            .active_hosts
            .iter()
            .filter(|h| host_ids.contains(&h.host_id))
            .cloned()
            .collect())
    }

    async fn list_services(
        &self,
        cluster: &str,
        launch_type: LaunchType,
        max_results: u32,
    ) -> AuditResult<Vec<String>> {
        self.record(LIST_SERVICES, vec![cluster.to_string(), launch_type.to_string()])?;
        let names: Vec<&String> = match launch_type {
            LaunchType::Ec2 => self.services.iter().map(|s| &s.name).collect(),
            _ => self.fargate_services.iter().collect(),
        };
        Ok(names
            .into_iter()
            .take(max_results as usize)
            .map(|name| self.service_arn(cluster, name))
            .collect())
    }

    async fn describe_services(&self, _cluster: &str, names: &[String]) -> AuditResult<Vec<Service>> {
        self.record(DESCRIBE_SERVICES, names.to_vec())?;
        if names.len() > DESCRIBE_BATCH_SIZE {
            return Err(AuditError::upstream(
                DESCRIBE_SERVICES,
                format!("at most {} services per call", DESCRIBE_BATCH_SIZE),
            ));
        }

        let by_name: HashMap<&str, &Service> = self
            .services
            .iter()
            .filter(|s| !self.deleted.contains(&s.name))
            .map(|s| (s.name.as_str(), s))
            .collect();
        names
            .iter()
            .map(|name| {
                by_name
                    .get(name.as_str())
                    .map(|s| (*s).clone())
                    .ok_or_else(|| AuditError::upstream(DESCRIBE_SERVICES, format!("MISSING: {}", name)))
            })
            .collect()
    }
}

#[async_trait]
impl HostGroupApi for FakeCloud {
    async fn describe_host_group_membership(
        &self,
        instance_ids: &[String],
    ) -> AuditResult<Vec<HostGroupMembership>> {
        self.record(DESCRIBE_AUTO_SCALING_INSTANCES, instance_ids.to_vec())?;
        Ok(self
            .memberships
            .iter()
            .filter(|m| instance_ids.contains(&m.instance_id))
            .cloned()
            .collect())
    }

    async fn describe_host_groups(&self, names: &[String]) -> AuditResult<Vec<HostGroup>> {
        self.record(DESCRIBE_AUTO_SCALING_GROUPS, names.to_vec())?;
        Ok(self
            .host_groups
            .iter()
            .filter(|g| names.contains(&g.name))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScalingApi for FakeCloud {
    async fn describe_scalable_targets(
        &self,
        namespace: &str,
        resource_ids: &[String],
    ) -> AuditResult<Vec<ScalableTarget>> {
        let mut args = vec![namespace.to_string()];
        args.extend(resource_ids.iter().cloned());
        self.record(DESCRIBE_SCALABLE_TARGETS, args)?;

        // Empty filter returns the whole namespace, like the real API
        Ok(self
            .targets
            .iter()
            .filter(|t| resource_ids.is_empty() || resource_ids.contains(&t.resource_id))
            .cloned()
            .collect())
    }
}
