//! Scaling limits collector

use super::operations::DESCRIBE_SCALABLE_TARGETS;
use super::AuditClients;
use crate::error::AuditResult;
use crate::models::service_resource_id;
use tracing::debug;

/// Application-scaling namespace for ECS services
pub const ECS_SERVICE_NAMESPACE: &str = "ecs";

/// Sum the registered maximum capacity over the given services
///
/// Issues a single describe call for all services. Unregistered services
/// simply contribute nothing.
pub async fn total_max_capacity(
    clients: &AuditClients,
    cluster: &str,
    service_names: &[String],
) -> AuditResult<u64> {
    // An empty resource-id filter means "every target in the namespace" upstream
    if service_names.is_empty() {
        return Ok(0);
    }

    let resource_ids: Vec<String> = service_names
        .iter()
        .map(|name| service_resource_id(cluster, name))
        .collect();

    let targets = clients
        .track(
            DESCRIBE_SCALABLE_TARGETS,
            clients
                .scaling
                .describe_scalable_targets(ECS_SERVICE_NAMESPACE, &resource_ids),
        )
        .await?;

    let total: u64 = targets.iter().map(|t| u64::from(t.max_capacity)).sum();
    debug!(
        cluster = %cluster,
        services = service_names.len(),
        registered = targets.len(),
        total_max_capacity = total,
        "Summed scalable target limits"
    );

    Ok(total)
}
