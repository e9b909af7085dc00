//! Resource locator
//!
//! Resolves the handles needed to cross-reference the control planes:
//! one ACTIVE container instance, its EC2 instance id, and the auto-scaling
//! group that owns it. Host-group membership is assumed uniform across the
//! cluster, so a single sampled host is enough.

use super::operations::{
    DESCRIBE_AUTO_SCALING_INSTANCES, DESCRIBE_CONTAINER_INSTANCES, LIST_CONTAINER_INSTANCES,
};
use super::AuditClients;
use crate::error::{AuditError, AuditResult};
use tracing::debug;

/// Pick the first ACTIVE container instance of the cluster
pub async fn find_sample_host(clients: &AuditClients, cluster: &str) -> AuditResult<String> {
    let hosts = clients
        .track(
            LIST_CONTAINER_INSTANCES,
            clients.cluster.list_active_hosts(cluster, 1),
        )
        .await?;

    let host = hosts.into_iter().next().ok_or_else(|| {
        AuditError::not_found(
            "active container instance",
            format!("cluster {} has no ACTIVE container instances", cluster),
        )
    })?;

    debug!(cluster = %cluster, host_id = %host, "Sampled container instance");
    Ok(host)
}

/// Resolve the compute instance backing a container instance
pub async fn resolve_compute_instance(
    clients: &AuditClients,
    cluster: &str,
    host_id: &str,
) -> AuditResult<String> {
    let hosts = clients
        .track(
            DESCRIBE_CONTAINER_INSTANCES,
            clients
                .cluster
                .describe_hosts(cluster, &[host_id.to_string()]),
        )
        .await?;

    hosts
        .into_iter()
        .next()
        .map(|host| host.compute_instance_id)
        .ok_or_else(|| {
            AuditError::not_found(
                "container instance",
                format!("{} is not registered to cluster {}", host_id, cluster),
            )
        })
}

/// Resolve the auto-scaling group that owns a compute instance
pub async fn resolve_host_group_name(
    clients: &AuditClients,
    instance_id: &str,
) -> AuditResult<String> {
    let memberships = clients
        .track(
            DESCRIBE_AUTO_SCALING_INSTANCES,
            clients
                .host_groups
                .describe_host_group_membership(&[instance_id.to_string()]),
        )
        .await?;

    memberships
        .into_iter()
        .find(|m| m.instance_id == instance_id)
        .map(|m| m.host_group_name)
        .ok_or_else(|| {
            AuditError::not_found(
                "auto scaling group",
                format!("instance {} is not a member of any auto scaling group", instance_id),
            )
        })
}
