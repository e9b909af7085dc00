//! Service inventory
//!
//! Lists the EC2 services of a cluster and fetches their descriptions in
//! batches sized to the per-call limit of the scheduling control plane.

use super::operations::{DESCRIBE_SERVICES, LIST_SERVICES};
use super::AuditClients;
use crate::error::AuditResult;
use crate::models::{arn_resource_name, LaunchType, Service};
use futures::future::try_join_all;
use tracing::{debug, warn};

/// Maximum number of services listed (single page, no pagination)
pub const SERVICE_PAGE_SIZE: u32 = 100;

/// Maximum number of services described per call
pub const DESCRIBE_BATCH_SIZE: usize = 3;

/// List the names of the cluster's EC2 services
pub async fn list_service_names(clients: &AuditClients, cluster: &str) -> AuditResult<Vec<String>> {
    let arns = clients
        .track(
            LIST_SERVICES,
            clients
                .cluster
                .list_services(cluster, LaunchType::Ec2, SERVICE_PAGE_SIZE),
        )
        .await?;

    if page_is_full(arns.len()) {
        warn!(
            cluster = %cluster,
            page_size = SERVICE_PAGE_SIZE,
            "Service listing hit the page limit, totals may be undercounted"
        );
    }

    Ok(arns
        .iter()
        .map(|arn| arn_resource_name(arn).to_string())
        .collect())
}

/// Whether a listing filled the single page we request
fn page_is_full(listed: usize) -> bool {
    u32::try_from(listed).map_or(true, |listed| listed >= SERVICE_PAGE_SIZE)
}

/// Describe services in batches of [`DESCRIBE_BATCH_SIZE`]
///
/// Results are concatenated in batch order. With `concurrent` set, all
/// batches are in flight at once and the first failure drops the rest.
pub async fn describe_services(
    clients: &AuditClients,
    cluster: &str,
    names: &[String],
    concurrent: bool,
) -> AuditResult<Vec<Service>> {
    let batches: Vec<&[String]> = names.chunks(DESCRIBE_BATCH_SIZE).collect();
    debug!(
        cluster = %cluster,
        services = names.len(),
        batches = batches.len(),
        concurrent = concurrent,
        "Describing services"
    );

    let described = if concurrent {
        try_join_all(
            batches
                .iter()
                .enumerate()
                .map(|(index, batch)| describe_batch(clients, cluster, index, batch)),
        )
        .await?
    } else {
        let mut described = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            described.push(describe_batch(clients, cluster, index, batch).await?);
        }
        described
    };

    Ok(described.into_iter().flatten().collect())
}

async fn describe_batch(
    clients: &AuditClients,
    cluster: &str,
    index: usize,
    batch: &[String],
) -> AuditResult<Vec<Service>> {
    let services = clients
        .track(
            DESCRIBE_SERVICES,
            clients.cluster.describe_services(cluster, batch),
        )
        .await?;

    debug!(batch = index, described = services.len(), "Service batch described");
    Ok(services)
}
