//! Integration tests for full audit runs against the fake cloud

use audit_lib::{
    cache::Collector,
    collector::operations::*,
    fake::FakeCloud,
    run_audit, AuditClients, Auditor, Cluster, HostGroup,
};
use std::sync::Arc;

fn asg() -> HostGroup {
    HostGroup {
        name: "ecs-prod-asg".to_string(),
        min_size: 3,
        desired_capacity: 4,
        max_size: 12,
    }
}

fn setup(fake: FakeCloud) -> (Arc<FakeCloud>, AuditClients) {
    let fake = Arc::new(fake);
    let clients = AuditClients::from_shared(fake.clone());
    (fake, clients)
}

/// Five services at 8 desired / 4 running, each scalable to 16 tasks
fn five_services() -> FakeCloud {
    (0..5).fold(FakeCloud::with_standard_host_group(asg()), |fake, i| {
        let name = format!("api-{}", i);
        fake.with_service(&name, 8, 4)
            .with_scalable_target(&format!("service/prod/{}", name), 16)
    })
}

#[tokio::test]
async fn test_run_audit_five_services() {
    let (_fake, clients) = setup(five_services());

    let report = run_audit("eu-west-1", "prod", clients).await.unwrap();

    assert_eq!(report.service_count, 5);
    assert_eq!(report.tasks_per_host, 8);
    assert_eq!(report.total_min_desired_tasks, 40);
    assert_eq!(report.total_running_tasks, 20);
    assert_eq!(report.total_max_tasks, 80);
    assert_eq!(report.hosts_for_min, 5);
    assert_eq!(report.hosts_for_running, 2);
    assert_eq!(report.hosts_for_max, 10);
    assert_eq!(report.slack, 0);
    assert_eq!(report.recommended_min, 5);
    assert_eq!(report.recommended_current, 2);
    assert_eq!(report.recommended_max, 10);
    assert_eq!(report.host_group, asg());
}

#[tokio::test]
async fn test_run_audit_empty_cluster_services() {
    let (fake, clients) = setup(FakeCloud::with_standard_host_group(asg()));

    let report = run_audit("eu-west-1", "prod", clients).await.unwrap();

    assert_eq!(report.service_count, 0);
    assert_eq!(report.total_min_desired_tasks, 0);
    assert_eq!(report.total_running_tasks, 0);
    assert_eq!(report.total_max_tasks, 0);
    assert_eq!(report.recommended_min, 0);
    assert_eq!(report.recommended_current, 0);
    assert_eq!(report.recommended_max, 0);
    assert_eq!(report.slack, 0);
    assert_eq!(fake.call_count(DESCRIBE_SERVICES), 0);
    assert_eq!(fake.call_count(DESCRIBE_SCALABLE_TARGETS), 0);
}

#[tokio::test]
async fn test_no_active_hosts_aborts_before_other_collectors() {
    let fake = FakeCloud::new()
        .with_host_group(asg())
        .with_service("api", 2, 2);
    let (fake, clients) = setup(fake);
    let auditor = Auditor::builder()
        .cluster(Cluster::new("prod", "eu-west-1"))
        .clients(clients)
        .build()
        .unwrap();

    let err = auditor.run().await.unwrap_err();

    assert!(err.is_not_found());
    let operations: Vec<&str> = fake.calls().iter().map(|c| c.operation).collect();
    assert_eq!(operations, vec![LIST_CONTAINER_INSTANCES]);
    assert!(auditor.cache().resolved().is_empty());
}

#[tokio::test]
async fn test_scalable_targets_queried_once_for_ten_services() {
    let fake = (0..10).fold(FakeCloud::with_standard_host_group(asg()), |fake, i| {
        let name = format!("worker-{}", i);
        fake.with_service(&name, 1, 1)
            .with_scalable_target(&format!("service/prod/{}", name), 3)
    });
    let (fake, clients) = setup(fake);

    let report = run_audit("eu-west-1", "prod", clients).await.unwrap();

    assert_eq!(report.total_max_tasks, 30);
    assert_eq!(fake.call_count(DESCRIBE_SCALABLE_TARGETS), 1);
    assert_eq!(fake.call_count(DESCRIBE_SERVICES), 4);
    assert_eq!(report.slack, 1);
}

#[tokio::test]
async fn test_collectors_run_in_dependency_order() {
    let (fake, clients) = setup(five_services());

    run_audit("eu-west-1", "prod", clients).await.unwrap();

    let mut operations: Vec<&str> = fake.calls().iter().map(|c| c.operation).collect();
    operations.dedup();
    assert_eq!(
        operations,
        vec![
            LIST_CONTAINER_INSTANCES,
            DESCRIBE_CONTAINER_INSTANCES,
            DESCRIBE_AUTO_SCALING_INSTANCES,
            DESCRIBE_AUTO_SCALING_GROUPS,
            LIST_SERVICES,
            DESCRIBE_SERVICES,
            DESCRIBE_SCALABLE_TARGETS,
        ]
    );
}

#[tokio::test]
async fn test_collector_results_are_memoized() {
    let (fake, clients) = setup(five_services());
    let auditor = Auditor::builder()
        .cluster(Cluster::new("prod", "eu-west-1"))
        .clients(clients)
        .build()
        .unwrap();

    let first = auditor.run().await.unwrap();
    let second = auditor.run().await.unwrap();
    assert_eq!(first, second);

    // Each collector hit its API exactly once across both runs
    assert_eq!(fake.call_count(LIST_CONTAINER_INSTANCES), 1);
    assert_eq!(fake.call_count(DESCRIBE_CONTAINER_INSTANCES), 1);
    assert_eq!(fake.call_count(DESCRIBE_AUTO_SCALING_INSTANCES), 1);
    assert_eq!(fake.call_count(DESCRIBE_AUTO_SCALING_GROUPS), 1);
    assert_eq!(fake.call_count(LIST_SERVICES), 1);
    assert_eq!(fake.call_count(DESCRIBE_SERVICES), 2);
    assert_eq!(fake.call_count(DESCRIBE_SCALABLE_TARGETS), 1);
    assert_eq!(auditor.cache().resolved(), Collector::ALL.to_vec());
}

#[tokio::test]
async fn test_accessors_share_the_cache() {
    let (fake, clients) = setup(five_services());
    let auditor = Auditor::builder()
        .cluster(Cluster::new("prod", "eu-west-1"))
        .clients(clients)
        .build()
        .unwrap();

    let names = auditor.service_names().await.unwrap().to_vec();
    let total = auditor.total_max_capacity().await.unwrap();
    let services = auditor.services().await.unwrap();

    assert_eq!(names.len(), 5);
    assert_eq!(total, 80);
    assert_eq!(services.len(), 5);
    assert_eq!(fake.call_count(LIST_SERVICES), 1);
    assert!(!auditor.cache().is_resolved(Collector::SampleHost));
}

#[tokio::test]
async fn test_host_outside_any_group_is_not_found() {
    let fake = FakeCloud::new()
        .with_active_host("c0ffee01", "i-unmanaged")
        .with_service("api", 2, 2);
    let (fake, clients) = setup(fake);

    let err = run_audit("eu-west-1", "prod", clients).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("i-unmanaged"));
    assert_eq!(fake.call_count(LIST_SERVICES), 0);
}

#[tokio::test]
async fn test_host_group_vanishing_mid_run_is_not_found() {
    let fake = FakeCloud::new()
        .with_active_host("c0ffee01", "i-0123")
        .with_membership("i-0123", "deleted-asg");
    let (_fake, clients) = setup(fake);

    let err = run_audit("eu-west-1", "prod", clients).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("deleted-asg"));
}

#[tokio::test]
async fn test_service_deleted_mid_run_aborts_audit() {
    let (_fake, clients) = setup(five_services().with_deleted_service("legacy"));

    let err = run_audit("eu-west-1", "prod", clients).await.unwrap_err();
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_scaling_api_failure_aborts_audit() {
    let (_fake, clients) = setup(five_services().failing(DESCRIBE_SCALABLE_TARGETS));

    let err = run_audit("eu-west-1", "prod", clients).await.unwrap_err();
    assert!(err.is_upstream());
    assert!(err.to_string().contains(DESCRIBE_SCALABLE_TARGETS));
}

#[tokio::test]
async fn test_sequential_batches_match_concurrent() {
    let (_fake, clients) = setup(five_services());
    let sequential = Auditor::builder()
        .cluster(Cluster::new("prod", "eu-west-1"))
        .clients(clients)
        .concurrent_batches(false)
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    let (_fake, clients) = setup(five_services());
    let concurrent = run_audit("eu-west-1", "prod", clients).await.unwrap();

    assert_eq!(sequential, concurrent);
}

#[test]
fn test_builder_requires_cluster_and_clients() {
    assert!(Auditor::builder().build().is_err());
    assert!(Auditor::builder()
        .cluster(Cluster::new("prod", "eu-west-1"))
        .build()
        .is_err());

    let (_fake, clients) = setup(FakeCloud::new());
    let err = Auditor::builder()
        .cluster(Cluster::new("", "eu-west-1"))
        .clients(clients)
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("Cluster name"));
}
