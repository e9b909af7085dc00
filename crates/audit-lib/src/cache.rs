//! One-shot result cache for a single audit run
//!
//! Every collector result is computed at most once per run and never
//! invalidated. The cache is owned by one `Auditor`; nothing is shared
//! between runs.

use crate::models::{HostGroup, Service};
use std::fmt;
use tokio::sync::OnceCell;

/// Names of the cached collector results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collector {
    SampleHost,
    ComputeInstance,
    HostGroupName,
    HostGroup,
    ServiceNames,
    Services,
    TotalMaxCapacity,
}

impl Collector {
    pub const ALL: [Collector; 7] = [
        Collector::SampleHost,
        Collector::ComputeInstance,
        Collector::HostGroupName,
        Collector::HostGroup,
        Collector::ServiceNames,
        Collector::Services,
        Collector::TotalMaxCapacity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collector::SampleHost => "sample_host",
            Collector::ComputeInstance => "compute_instance",
            Collector::HostGroupName => "host_group_name",
            Collector::HostGroup => "host_group",
            Collector::ServiceNames => "service_names",
            Collector::Services => "services",
            Collector::TotalMaxCapacity => "total_max_capacity",
        }
    }
}

impl fmt::Display for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memoized collector results
#[derive(Debug, Default)]
pub struct RunCache {
    pub(crate) sample_host: OnceCell<String>,
    pub(crate) compute_instance: OnceCell<String>,
    pub(crate) host_group_name: OnceCell<String>,
    pub(crate) host_group: OnceCell<HostGroup>,
    pub(crate) service_names: OnceCell<Vec<String>>,
    pub(crate) services: OnceCell<Vec<Service>>,
    pub(crate) total_max_capacity: OnceCell<u64>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a collector result has been populated
    pub fn is_resolved(&self, collector: Collector) -> bool {
        match collector {
            Collector::SampleHost => self.sample_host.initialized(),
            Collector::ComputeInstance => self.compute_instance.initialized(),
            Collector::HostGroupName => self.host_group_name.initialized(),
            Collector::HostGroup => self.host_group.initialized(),
            Collector::ServiceNames => self.service_names.initialized(),
            Collector::Services => self.services.initialized(),
            Collector::TotalMaxCapacity => self.total_max_capacity.initialized(),
        }
    }

    /// Collectors populated so far, in resolution-chain order
    pub fn resolved(&self) -> Vec<Collector> {
        Collector::ALL
            .into_iter()
            .filter(|c| self.is_resolved(*c))
            .collect()
    }
}
