//! Host group inspector

use super::operations::DESCRIBE_AUTO_SCALING_GROUPS;
use super::AuditClients;
use crate::error::{AuditError, AuditResult};
use crate::models::HostGroup;

/// Fetch the configured min/desired/max size of an auto-scaling group
pub async fn describe_host_group(clients: &AuditClients, name: &str) -> AuditResult<HostGroup> {
    let groups = clients
        .track(
            DESCRIBE_AUTO_SCALING_GROUPS,
            clients.host_groups.describe_host_groups(&[name.to_string()]),
        )
        .await?;

    groups
        .into_iter()
        .find(|group| group.name == name)
        .ok_or_else(|| AuditError::not_found("auto scaling group", name.to_string()))
}
