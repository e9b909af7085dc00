//! Audit runner
//!
//! Wires the collectors together in dependency order, memoizing each
//! result for the run, and hands the collected data to the capacity engine.

use crate::cache::{Collector, RunCache};
use crate::capacity::{compute_report, TASKS_PER_HOST};
use crate::collector::{self, AuditClients};
use crate::error::AuditResult;
use crate::models::{CapacityReport, Cluster, HostGroup, Service};
use crate::observability::StructuredLogger;
use anyhow::Result;

/// Options for a single audit run
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Issue service description batches concurrently (default: true)
    pub concurrent_batches: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            concurrent_batches: true,
        }
    }
}

/// One audit invocation against one cluster
pub struct Auditor {
    cluster: Cluster,
    clients: AuditClients,
    options: AuditOptions,
    cache: RunCache,
    logger: StructuredLogger,
}

impl Auditor {
    pub fn new(cluster: Cluster, clients: AuditClients, options: AuditOptions) -> Self {
        let logger = StructuredLogger::new(&cluster);
        Self {
            cluster,
            clients,
            options,
            cache: RunCache::new(),
            logger,
        }
    }

    pub fn builder() -> AuditorBuilder {
        AuditorBuilder::new()
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    pub fn cache(&self) -> &RunCache {
        &self.cache
    }

    /// First ACTIVE container instance of the cluster
    pub async fn sample_host(&self) -> AuditResult<&str> {
        let host = self
            .cache
            .sample_host
            .get_or_try_init(|| collector::find_sample_host(&self.clients, &self.cluster.name))
            .await?;
        Ok(host.as_str())
    }

    /// EC2 instance id behind the sampled container instance
    pub async fn compute_instance(&self) -> AuditResult<&str> {
        let instance = self
            .cache
            .compute_instance
            .get_or_try_init(|| async {
                let host = self.sample_host().await?;
                collector::resolve_compute_instance(&self.clients, &self.cluster.name, host).await
            })
            .await?;
        Ok(instance.as_str())
    }

    /// Auto-scaling group owning the sampled instance
    pub async fn host_group_name(&self) -> AuditResult<&str> {
        let name = self
            .cache
            .host_group_name
            .get_or_try_init(|| async {
                let instance = self.compute_instance().await?;
                collector::resolve_host_group_name(&self.clients, instance).await
            })
            .await?;
        Ok(name.as_str())
    }

    pub async fn host_group(&self) -> AuditResult<&HostGroup> {
        self.cache
            .host_group
            .get_or_try_init(|| async {
                let name = self.host_group_name().await?;
                collector::describe_host_group(&self.clients, name).await
            })
            .await
    }

    pub async fn service_names(&self) -> AuditResult<&[String]> {
        let names = self
            .cache
            .service_names
            .get_or_try_init(|| collector::list_service_names(&self.clients, &self.cluster.name))
            .await?;
        Ok(names.as_slice())
    }

    pub async fn services(&self) -> AuditResult<&[Service]> {
        let services = self
            .cache
            .services
            .get_or_try_init(|| async {
                let names = self.service_names().await?;
                collector::describe_services(
                    &self.clients,
                    &self.cluster.name,
                    names,
                    self.options.concurrent_batches,
                )
                .await
            })
            .await?;
        Ok(services.as_slice())
    }

    pub async fn total_max_capacity(&self) -> AuditResult<u64> {
        let total = self
            .cache
            .total_max_capacity
            .get_or_try_init(|| async {
                let names = self.service_names().await?;
                collector::total_max_capacity(&self.clients, &self.cluster.name, names).await
            })
            .await?;
        Ok(*total)
    }

    /// Run every collector and compute the capacity report
    pub async fn run(&self) -> AuditResult<CapacityReport> {
        self.logger.log_audit_started();

        match self.collect_and_compute().await {
            Ok(report) => {
                self.clients
                    .metrics()
                    .record_report(&self.cluster.name, &report);
                self.logger.log_audit_completed(&report);
                Ok(report)
            }
            Err(e) => {
                self.logger.log_audit_failed(&e.to_string());
                Err(e)
            }
        }
    }

    async fn collect_and_compute(&self) -> AuditResult<CapacityReport> {
        let host_group = self.host_group().await?.clone();
        self.logger
            .log_collector_resolved(Collector::HostGroup.as_str(), &host_group.name);

        let services = self.services().await?;
        self.logger.log_collector_resolved(
            Collector::Services.as_str(),
            &format!("{} services", services.len()),
        );

        let total_max_capacity = self.total_max_capacity().await?;
        self.logger.log_collector_resolved(
            Collector::TotalMaxCapacity.as_str(),
            &total_max_capacity.to_string(),
        );

        Ok(compute_report(
            services,
            total_max_capacity,
            host_group,
            TASKS_PER_HOST,
        ))
    }
}

/// Builder for creating an auditor
pub struct AuditorBuilder {
    cluster: Option<Cluster>,
    clients: Option<AuditClients>,
    options: AuditOptions,
}

impl AuditorBuilder {
    pub fn new() -> Self {
        Self {
            cluster: None,
            clients: None,
            options: AuditOptions::default(),
        }
    }

    pub fn cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn clients(mut self, clients: AuditClients) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn concurrent_batches(mut self, enabled: bool) -> Self {
        self.options.concurrent_batches = enabled;
        self
    }

    pub fn build(self) -> Result<Auditor> {
        let cluster = self
            .cluster
            .ok_or_else(|| anyhow::anyhow!("Cluster is required"))?;
        let clients = self
            .clients
            .ok_or_else(|| anyhow::anyhow!("API clients are required"))?;

        if cluster.name.trim().is_empty() {
            anyhow::bail!("Cluster name must not be empty");
        }
        if cluster.region.trim().is_empty() {
            anyhow::bail!("Region must not be empty");
        }

        Ok(Auditor::new(cluster, clients, self.options))
    }
}

impl Default for AuditorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit one cluster with default options
pub async fn run_audit(
    region: &str,
    cluster_name: &str,
    clients: AuditClients,
) -> AuditResult<CapacityReport> {
    let auditor = Auditor::new(
        Cluster::new(cluster_name, region),
        clients,
        AuditOptions::default(),
    );
    auditor.run().await
}
