//! Capacity data collection from the cluster control planes
//!
//! This module defines one capability trait per upstream API (cluster
//! membership, host groups, application scaling) and the collectors that
//! drive them: the resource locator, the service inventory, the scaling
//! limits collector and the host group inspector.

mod host_group;
mod inventory;
mod locator;
mod scaling;


pub use host_group::describe_host_group;
pub use inventory::{describe_services, list_service_names, DESCRIBE_BATCH_SIZE, SERVICE_PAGE_SIZE};
pub use locator::{find_sample_host, resolve_compute_instance, resolve_host_group_name};
pub use scaling::{total_max_capacity, ECS_SERVICE_NAMESPACE};

use crate::error::AuditResult;
use crate::models::{ContainerHost, HostGroup, HostGroupMembership, LaunchType, ScalableTarget, Service};
use crate::observability::AuditMetrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub use async_trait::async_trait;

/// Upstream operation names, used for metric labels and error context
pub mod operations {
    pub const LIST_CONTAINER_INSTANCES: &str = "ListContainerInstances";
    pub const DESCRIBE_CONTAINER_INSTANCES: &str = "DescribeContainerInstances";
    pub const LIST_SERVICES: &str = "ListServices";
    pub const DESCRIBE_SERVICES: &str = "DescribeServices";
    pub const DESCRIBE_AUTO_SCALING_INSTANCES: &str = "DescribeAutoScalingInstances";
    pub const DESCRIBE_AUTO_SCALING_GROUPS: &str = "DescribeAutoScalingGroups";
    pub const DESCRIBE_SCALABLE_TARGETS: &str = "DescribeScalableTargets";
}

/// Container scheduling control plane (cluster membership and services)
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List ids of ACTIVE container instances, at most `max_results`
    async fn list_active_hosts(&self, cluster: &str, max_results: u32) -> AuditResult<Vec<String>>;

    /// Describe container instances by id
    async fn describe_hosts(&self, cluster: &str, host_ids: &[String]) -> AuditResult<Vec<ContainerHost>>;

    /// List service ARNs of one launch type, at most `max_results`
    async fn list_services(
        &self,
        cluster: &str,
        launch_type: LaunchType,
        max_results: u32,
    ) -> AuditResult<Vec<String>>;

    /// Describe services by name
    async fn describe_services(&self, cluster: &str, names: &[String]) -> AuditResult<Vec<Service>>;
}

/// Auto-scaling group control plane
#[async_trait]
pub trait HostGroupApi: Send + Sync {
    async fn describe_host_group_membership(
        &self,
        instance_ids: &[String],
    ) -> AuditResult<Vec<HostGroupMembership>>;

    async fn describe_host_groups(&self, names: &[String]) -> AuditResult<Vec<HostGroup>>;
}

/// Application-scaling control plane
#[async_trait]
pub trait ScalingApi: Send + Sync {
    async fn describe_scalable_targets(
        &self,
        namespace: &str,
        resource_ids: &[String],
    ) -> AuditResult<Vec<ScalableTarget>>;
}

/// The three collaborator APIs an audit run depends on
#[derive(Clone)]
pub struct AuditClients {
    pub cluster: Arc<dyn ClusterApi>,
    pub host_groups: Arc<dyn HostGroupApi>,
    pub scaling: Arc<dyn ScalingApi>,
    metrics: AuditMetrics,
}

impl AuditClients {
    pub fn new(
        cluster: Arc<dyn ClusterApi>,
        host_groups: Arc<dyn HostGroupApi>,
        scaling: Arc<dyn ScalingApi>,
    ) -> Self {
        Self {
            cluster,
            host_groups,
            scaling,
            metrics: AuditMetrics::new(),
        }
    }

    /// Use one value that implements all three APIs
    pub fn from_shared<T>(api: Arc<T>) -> Self
    where
        T: ClusterApi + HostGroupApi + ScalingApi + 'static,
    {
        Self::new(api.clone(), api.clone(), api)
    }

    pub fn metrics(&self) -> &AuditMetrics {
        &self.metrics
    }

    /// Run one upstream call, recording its latency and outcome
    pub async fn track<T, F>(&self, operation: &'static str, call: F) -> AuditResult<T>
    where
        F: Future<Output = AuditResult<T>>,
    {
        let start = Instant::now();
        let result = call.await;
        let elapsed = start.elapsed().as_secs_f64();

        self.metrics.observe_api_call(operation, elapsed, result.is_ok());
        debug!(
            operation = operation,
            latency_ms = elapsed * 1000.0,
            success = result.is_ok(),
            "Upstream call finished"
        );

        result
    }
}
