//! Capacity engine
//!
//! Converts collected task totals into host-count recommendations using a
//! fixed task density per host. Pure and deterministic: no I/O happens here.
//!
//! ```text
//! hosts_for_min        = total_min_desired / density
//! hosts_for_running    = total_running     / density
//! hosts_for_max        = total_max         / density
//! slack                = service_count     / density
//!
//! recommended_min      = hosts_for_min     + slack
//! recommended_current  = hosts_for_running + slack
//! recommended_max      = hosts_for_max
//! ```
//!
//! All divisions are integer floor divisions.

use crate::models::{CapacityReport, HostGroup, Service};

/// Assumed number of schedulable task slots per EC2 instance
pub const TASKS_PER_HOST: u32 = 8;

/// Hosts needed to cover `tasks` at `density` tasks per host (floor)
pub fn hosts_for(tasks: u64, density: u32) -> u64 {
    assert!(density > 0, "task density must be positive");
    tasks / u64::from(density)
}

/// Build the capacity report from already-collected data
///
/// # Panics
///
/// Panics if `density` is zero.
pub fn compute_report(
    services: &[Service],
    total_max_capacity: u64,
    host_group: HostGroup,
    density: u32,
) -> CapacityReport {
    assert!(density > 0, "task density must be positive");

    let total_min_desired_tasks: u64 = services.iter().map(|s| u64::from(s.desired_count)).sum();
    let total_running_tasks: u64 = services.iter().map(|s| u64::from(s.running_count)).sum();
    let service_count = services.len() as u64;

    let hosts_for_min = hosts_for(total_min_desired_tasks, density);
    let hosts_for_max = hosts_for(total_max_capacity, density);
    let hosts_for_running = hosts_for(total_running_tasks, density);

    // One extra host per `density` services
    let slack = hosts_for(service_count, density);

    CapacityReport {
        service_count,
        tasks_per_host: density,
        total_min_desired_tasks,
        total_running_tasks,
        total_max_tasks: total_max_capacity,
        host_group,
        hosts_for_min,
        hosts_for_running,
        hosts_for_max,
        slack,
        recommended_min: hosts_for_min + slack,
        recommended_current: hosts_for_running + slack,
        recommended_max: hosts_for_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_group() -> HostGroup {
        HostGroup {
            name: "ecs-prod-asg".to_string(),
            min_size: 2,
            desired_capacity: 4,
            max_size: 10,
        }
    }

    fn services(counts: &[(u32, u32)]) -> Vec<Service> {
        counts
            .iter()
            .enumerate()
            .map(|(i, (desired, running))| Service {
                name: format!("svc-{}", i),
                desired_count: *desired,
                running_count: *running,
            })
            .collect()
    }

    #[test]
    fn test_five_uniform_services() {
        let services = services(&[(8, 4); 5]);
        let report = compute_report(&services, 80, host_group(), TASKS_PER_HOST);

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
    }

    #[test]
    fn test_empty_service_list() {
        let report = compute_report(&[], 0, host_group(), TASKS_PER_HOST);

        assert_eq!(report.service_count, 0);
        assert_eq!(report.total_min_desired_tasks, 0);
        assert_eq!(report.total_running_tasks, 0);
        assert_eq!(report.total_max_tasks, 0);
        assert_eq!(report.hosts_for_min, 0);
        assert_eq!(report.hosts_for_running, 0);
        assert_eq!(report.hosts_for_max, 0);
        assert_eq!(report.slack, 0);
        assert_eq!(report.recommended_min, 0);
        assert_eq!(report.recommended_current, 0);
        assert_eq!(report.recommended_max, 0);
        assert_eq!(report.host_group, host_group());
    }

    #[test]
    fn test_slack_added_per_density_services() {
        // 17 services with one task each: slack = 17 / 8 = 2
        let services = services(&[(1, 1); 17]);
        let report = compute_report(&services, 34, host_group(), TASKS_PER_HOST);

        assert_eq!(report.slack, 2);
        assert_eq!(report.hosts_for_min, 2);
        assert_eq!(report.recommended_min, 4);
        assert_eq!(report.recommended_current, 4);
        // Max bound carries no slack
        assert_eq!(report.recommended_max, 4);
    }

    #[test]
    fn test_floor_division_drops_remainder() {
        let services = services(&[(41, 0)]);
        let report = compute_report(&services, 0, host_group(), TASKS_PER_HOST);
        assert_eq!(report.hosts_for_min, 5);
    }

    #[test]
    fn test_floor_division_bounds() {
        for total in 0u64..500 {
            let hosts = hosts_for(total, TASKS_PER_HOST);
            let d = u64::from(TASKS_PER_HOST);
            assert!(hosts * d <= total, "lower bound failed for {}", total);
            assert!(total < (hosts + 1) * d, "upper bound failed for {}", total);
        }
    }

    #[test]
    fn test_totals_independent_of_order() {
        let counts: Vec<(u32, u32)> = (0..23u32).map(|i| ((i * 7) % 13, (i * 5) % 11)).collect();
        let expected_desired: u64 = counts.iter().map(|(d, _)| u64::from(*d)).sum();
        let expected_running: u64 = counts.iter().map(|(_, r)| u64::from(*r)).sum();

        let forward = compute_report(&services(&counts), 0, host_group(), TASKS_PER_HOST);

        let mut reversed = counts.clone();
        reversed.reverse();
        let backward = compute_report(&services(&reversed), 0, host_group(), TASKS_PER_HOST);

        let mut rotated = counts.clone();
        rotated.rotate_left(9);
        let shifted = compute_report(&services(&rotated), 0, host_group(), TASKS_PER_HOST);

        for report in [&forward, &backward, &shifted] {
            assert_eq!(report.total_min_desired_tasks, expected_desired);
            assert_eq!(report.total_running_tasks, expected_running);
        }
    }

    #[test]
    fn test_compute_report_is_deterministic() {
        let services = services(&[(3, 2), (10, 9), (0, 0), (6, 6)]);
        let first = compute_report(&services, 45, host_group(), TASKS_PER_HOST);
        let second = compute_report(&services, 45, host_group(), TASKS_PER_HOST);
        assert_eq!(first, second);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let services = services(&[(u32::MAX, u32::MAX); 4]);
        let report = compute_report(&services, u64::from(u32::MAX) * 4, host_group(), TASKS_PER_HOST);
        assert_eq!(report.total_min_desired_tasks, u64::from(u32::MAX) * 4);
        assert_eq!(report.hosts_for_max, u64::from(u32::MAX) * 4 / 8);
    }

    #[test]
    fn test_service_count_tracks_every_service() {
        for count in [0usize, 1, 7, 8, 100, 1_000] {
            let services = services(&vec![(0, 0); count]);
            let report = compute_report(&services, 0, host_group(), TASKS_PER_HOST);
            assert_eq!(report.service_count, count as u64);
            assert_eq!(report.slack, count as u64 / 8);
        }
    }

    #[test]
    #[should_panic(expected = "task density must be positive")]
    fn test_zero_density_is_rejected() {
        compute_report(&[], 0, host_group(), 0);
    }
}
