//! Capacity report command and renderers

use anyhow::{Context, Result};
use audit_lib::{AuditClients, Auditor, CapacityReport, Cluster};
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::config::AuditSettings;
use crate::output::{color_recommendation, section, OutputFormat};

/// Row for the task totals table
#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "Tasks")]
    kind: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Instances Needed")]
    hosts: u64,
}

/// Row for the host bounds table
#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Instances")]
    bound: String,
    #[tabled(rename = "Configured")]
    configured: u32,
    #[tabled(rename = "Recommended")]
    recommended: String,
}

/// JSON document emitted for `--format json`
#[derive(Serialize)]
struct ReportDocument<'a> {
    cluster: &'a str,
    region: &'a str,
    generated_at: String,
    report: &'a CapacityReport,
}

/// Run one audit and print the report
pub async fn run_report(
    settings: &AuditSettings,
    clients: AuditClients,
    concurrent_batches: bool,
    metrics_file: Option<&Path>,
) -> Result<()> {
    let cluster = Cluster::new(&settings.cluster_name, &settings.region);
    let auditor = Auditor::builder()
        .cluster(cluster.clone())
        .clients(clients.clone())
        .concurrent_batches(concurrent_batches)
        .build()?;

    let report = auditor
        .run()
        .await
        .with_context(|| format!("Capacity audit of cluster {} failed", cluster.name))?;

    println!("{}", render(&cluster, &report, settings.format, Utc::now())?);

    if let Some(path) = metrics_file {
        let exposition = clients.metrics().encode_text()?;
        std::fs::write(path, exposition)
            .with_context(|| format!("Failed to write metrics file {}", path.display()))?;
    }

    Ok(())
}

/// Render a report in the requested format
pub fn render(
    cluster: &Cluster,
    report: &CapacityReport,
    format: OutputFormat,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(cluster, report)),
        OutputFormat::Table => Ok(render_table(cluster, report)),
        OutputFormat::Json => {
            let document = ReportDocument {
                cluster: &cluster.name,
                region: &cluster.region,
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                report,
            };
            Ok(serde_json::to_string_pretty(&document)?)
        }
    }
}

/// Fixed-section plain-text report
pub fn render_text(cluster: &Cluster, report: &CapacityReport) -> String {
    let group = &report.host_group;
    let lines = [
        section("Basic ECS Info"),
        format!("ECS Cluster Region: {}", cluster.region),
        format!("ECS Cluster Name: {}", cluster.name),
        String::new(),
        section("Gathered Metrics"),
        format!("Available number of ECS Services: {}", report.service_count),
        format!("Number of tasks per EC2 Instance: {}", report.tasks_per_host),
        String::new(),
        format!("Minimum tasks required: {}", report.total_min_desired_tasks),
        format!("Number of running tasks: {}", report.total_running_tasks),
        format!("Maximum tasks allowable: {}", report.total_max_tasks),
        String::new(),
        format!("Auto Scaling Group: {}", group.name),
        format!("Minimum number of EC2 Instances: {}", group.min_size),
        format!("Running number of EC2 Instances: {}", group.desired_capacity),
        format!("Maximum number of EC2 Instances: {}", group.max_size),
        String::new(),
        section("Calculated Metrics"),
        format!(
            "Number of instances needed for minimum tasks required: {}",
            report.hosts_for_min
        ),
        format!(
            "Number of instances needed for maximum tasks required: {}",
            report.hosts_for_max
        ),
        format!(
            "Number of instances needed for number of running tasks: {}",
            report.hosts_for_running
        ),
        String::new(),
        section("Recommendations"),
        format!("Recommended minimum number of EC2 Instances: {}", report.recommended_min),
        format!("Recommended running number of EC2 Instances: {}", report.recommended_current),
        format!("Recommended maximum number of EC2 Instances: {}", report.recommended_max),
    ];
    lines.join("\n")
}

/// Tabular report with recommended bounds colored against the configuration
pub fn render_table(cluster: &Cluster, report: &CapacityReport) -> String {
    let tasks = vec![
        TaskRow {
            kind: "Minimum desired".to_string(),
            count: report.total_min_desired_tasks,
            hosts: report.hosts_for_min,
        },
        TaskRow {
            kind: "Running".to_string(),
            count: report.total_running_tasks,
            hosts: report.hosts_for_running,
        },
        TaskRow {
            kind: "Maximum allowed".to_string(),
            count: report.total_max_tasks,
            hosts: report.hosts_for_max,
        },
    ];

    let group = &report.host_group;
    let hosts = vec![
        HostRow {
            bound: "Minimum".to_string(),
            configured: group.min_size,
            recommended: color_recommendation(group.min_size, report.recommended_min),
        },
        HostRow {
            bound: "Running".to_string(),
            configured: group.desired_capacity,
            recommended: color_recommendation(group.desired_capacity, report.recommended_current),
        },
        HostRow {
            bound: "Maximum".to_string(),
            configured: group.max_size,
            recommended: color_recommendation(group.max_size, report.recommended_max),
        },
    ];

    let mut out = Vec::new();
    out.push(format!("{}", "ECS Capacity Audit".bold()));
    out.push("=".repeat(50));
    out.push(format!("Cluster:            {}", cluster.name.cyan()));
    out.push(format!("Region:             {}", cluster.region));
    out.push(format!("Auto Scaling Group: {}", group.name));
    out.push(format!("Services:           {}", report.service_count));
    out.push(format!("Tasks per Instance: {}", report.tasks_per_host));
    out.push(String::new());
    out.push(
        tabled::Table::new(tasks)
            .with(tabled::settings::Style::rounded())
            .to_string(),
    );
    out.push(String::new());
    out.push(
        tabled::Table::new(hosts)
            .with(tabled::settings::Style::rounded())
            .to_string(),
    );
    out.join("\n")
}
