//! Capacity audit library for ECS clusters
//!
//! This crate provides the core functionality for:
//! - Locating the host group behind a cluster
//! - Collecting service task counts and scaling limits
//! - Converting task totals into host-count recommendations
//! - Structured logging and metrics for audit runs

pub mod audit;
pub mod cache;
pub mod capacity;
pub mod collector;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod models;
pub mod observability;

pub use audit::{run_audit, AuditOptions, Auditor, AuditorBuilder};
pub use capacity::{compute_report, TASKS_PER_HOST};
pub use collector::{AuditClients, ClusterApi, HostGroupApi, ScalingApi};
pub use error::{AuditError, AuditResult};
pub use models::*;
pub use observability::{AuditMetrics, StructuredLogger};
