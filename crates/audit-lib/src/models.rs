//! Core data models for the capacity audit

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster under audit, fixed for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub region: String,
}

impl Cluster {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }
}

/// Launch type filter for service listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LaunchType {
    Ec2,
    Fargate,
    External,
}

impl fmt::Display for LaunchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchType::Ec2 => write!(f, "EC2"),
            LaunchType::Fargate => write!(f, "FARGATE"),
            LaunchType::External => write!(f, "EXTERNAL"),
        }
    }
}

/// A compute instance registered to the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHost {
    pub host_id: String,
    pub compute_instance_id: String,
}

/// Host-group membership record for one compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroupMembership {
    pub instance_id: String,
    pub host_group_name: String,
}

/// Auto-scaling group owning the cluster's hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    pub name: String,
    pub min_size: u32,
    pub desired_capacity: u32,
    pub max_size: u32,
}

/// A long-running workload definition inside the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub desired_count: u32,
    pub running_count: u32,
}

/// Application-scaling registration for a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalableTarget {
    pub resource_id: String,
    pub max_capacity: u32,
}

/// Capacity Engine output
///
/// Computed once per run and discarded after rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub service_count: u64,
    pub tasks_per_host: u32,
    pub total_min_desired_tasks: u64,
    pub total_running_tasks: u64,
    pub total_max_tasks: u64,
    pub host_group: HostGroup,
    pub hosts_for_min: u64,
    pub hosts_for_running: u64,
    pub hosts_for_max: u64,
    pub slack: u64,
    pub recommended_min: u64,
    pub recommended_current: u64,
    pub recommended_max: u64,
}

/// Returns the short identifier at the end of an ARN.
///
/// Handles both `service/<name>` and `service/<cluster>/<name>` resource shapes.
pub fn arn_resource_name(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

/// Scalable-target resource id for a service in the ECS namespace
pub fn service_resource_id(cluster: &str, service: &str) -> String {
    format!("service/{}/{}", cluster, service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_resource_name_new_format() {
        let arn = "arn:aws:ecs:eu-west-1:123456789012:service/prod/web";
        assert_eq!(arn_resource_name(arn), "web");
    }

    #[test]
    fn test_arn_resource_name_legacy_format() {
        let arn = "arn:aws:ecs:eu-west-1:123456789012:container-instance/4f2c9a1e";
        assert_eq!(arn_resource_name(arn), "4f2c9a1e");
    }

    #[test]
    fn test_arn_resource_name_plain_id() {
        assert_eq!(arn_resource_name("web"), "web");
    }

    #[test]
    fn test_service_resource_id() {
        assert_eq!(service_resource_id("prod", "web"), "service/prod/web");
    }

    #[test]
    fn test_launch_type_display() {
        assert_eq!(LaunchType::Ec2.to_string(), "EC2");
        assert_eq!(
            serde_json::to_string(&LaunchType::Fargate).unwrap(),
            "\"FARGATE\""
        );
    }
}
