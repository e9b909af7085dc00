//! AWS adapters for the audit's control-plane APIs
//!
//! Implements the library's capability traits on top of the ECS, EC2 Auto
//! Scaling and Application Auto Scaling SDK clients. No retries are added
//! here beyond the SDK's own retry policy.

use async_trait::async_trait;
use audit_lib::collector::operations::*;
use audit_lib::{
    arn_resource_name, AuditClients, AuditError, AuditResult, ClusterApi, ContainerHost, HostGroup,
    HostGroupApi, HostGroupMembership, LaunchType, ScalableTarget, ScalingApi, Service,
};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_applicationautoscaling::types::ServiceNamespace;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::ContainerInstanceStatus;
use std::sync::Arc;
use tracing::debug;

/// SDK clients for one region
pub struct AwsClients {
    ecs: aws_sdk_ecs::Client,
    autoscaling: aws_sdk_autoscaling::Client,
    app_autoscaling: aws_sdk_applicationautoscaling::Client,
}

impl AwsClients {
    /// Build clients for `region` using the default credential chain
    pub async fn connect(region: &str) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        debug!(region = %region, "AWS clients configured");

        Self {
            ecs: aws_sdk_ecs::Client::new(&sdk_config),
            autoscaling: aws_sdk_autoscaling::Client::new(&sdk_config),
            app_autoscaling: aws_sdk_applicationautoscaling::Client::new(&sdk_config),
        }
    }

    pub fn into_audit_clients(self) -> AuditClients {
        AuditClients::from_shared(Arc::new(self))
    }
}

fn upstream<E: std::error::Error>(operation: &'static str, err: E) -> AuditError {
    AuditError::upstream(operation, DisplayErrorContext(err).to_string())
}

/// Convert an SDK count field, rejecting missing or negative values
fn count(operation: &'static str, field: &str, value: impl Into<Option<i32>>) -> AuditResult<u32> {
    let value = value
        .into()
        .ok_or_else(|| AuditError::malformed(operation, format!("{} is missing", field)))?;
    u32::try_from(value)
        .map_err(|_| AuditError::malformed(operation, format!("{} is negative: {}", field, value)))
}

/// Convert an SDK identifier field, rejecting missing values
fn text<'a>(operation: &'static str, field: &str, value: impl Into<Option<&'a str>>) -> AuditResult<String> {
    value
        .into()
        .map(str::to_string)
        .ok_or_else(|| AuditError::malformed(operation, format!("{} is missing", field)))
}

fn ecs_launch_type(launch_type: LaunchType) -> aws_sdk_ecs::types::LaunchType {
    match launch_type {
        LaunchType::Ec2 => aws_sdk_ecs::types::LaunchType::Ec2,
        LaunchType::Fargate => aws_sdk_ecs::types::LaunchType::Fargate,
        LaunchType::External => aws_sdk_ecs::types::LaunchType::External,
    }
}

#[async_trait]
impl ClusterApi for AwsClients {
    async fn list_active_hosts(&self, cluster: &str, max_results: u32) -> AuditResult<Vec<String>> {
        let output = self
            .ecs
            .list_container_instances()
            .cluster(cluster)
            .status(ContainerInstanceStatus::Active)
            .max_results(max_results as i32)
            .send()
            .await
            .map_err(|e| upstream(LIST_CONTAINER_INSTANCES, e))?;

        Ok(output
            .container_instance_arns()
            .iter()
            .map(|arn| arn_resource_name(arn).to_string())
            .collect())
    }

    async fn describe_hosts(&self, cluster: &str, host_ids: &[String]) -> AuditResult<Vec<ContainerHost>> {
        let output = self
            .ecs
            .describe_container_instances()
            .cluster(cluster)
            .set_container_instances(Some(host_ids.to_vec()))
            .send()
            .await
            .map_err(|e| upstream(DESCRIBE_CONTAINER_INSTANCES, e))?;

        output
            .container_instances()
            .iter()
            .map(|instance| -> AuditResult<ContainerHost> {
                let arn = text(
                    DESCRIBE_CONTAINER_INSTANCES,
                    "containerInstanceArn",
                    instance.container_instance_arn(),
                )?;
                Ok(ContainerHost {
                    host_id: arn_resource_name(&arn).to_string(),
                    compute_instance_id: text(
                        DESCRIBE_CONTAINER_INSTANCES,
                        "ec2InstanceId",
                        instance.ec2_instance_id(),
                    )?,
                })
            })
            .collect()
    }

    async fn list_services(
        &self,
        cluster: &str,
        launch_type: LaunchType,
        max_results: u32,
    ) -> AuditResult<Vec<String>> {
        let output = self
            .ecs
            .list_services()
            .cluster(cluster)
            .launch_type(ecs_launch_type(launch_type))
            .max_results(max_results as i32)
            .send()
            .await
            .map_err(|e| upstream(LIST_SERVICES, e))?;

        Ok(output.service_arns().to_vec())
    }

    async fn describe_services(&self, cluster: &str, names: &[String]) -> AuditResult<Vec<Service>> {
        let output = self
            .ecs
            .describe_services()
            .cluster(cluster)
            .set_services(Some(names.to_vec()))
            .send()
            .await
            .map_err(|e| upstream(DESCRIBE_SERVICES, e))?;

        // Missing services come back as failures, not as a transport error
        if let Some(failure) = output.failures().first() {
            return Err(AuditError::upstream(
                DESCRIBE_SERVICES,
                format!(
                    "{}: {}",
                    failure.reason().unwrap_or("UNKNOWN"),
                    failure.arn().unwrap_or("unknown service")
                ),
            ));
        }

        output
            .services()
            .iter()
            .map(|service| -> AuditResult<Service> {
                Ok(Service {
                    name: text(DESCRIBE_SERVICES, "serviceName", service.service_name())?,
                    desired_count: count(DESCRIBE_SERVICES, "desiredCount", service.desired_count())?,
                    running_count: count(DESCRIBE_SERVICES, "runningCount", service.running_count())?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl HostGroupApi for AwsClients {
    async fn describe_host_group_membership(
        &self,
        instance_ids: &[String],
    ) -> AuditResult<Vec<HostGroupMembership>> {
        let output = self
            .autoscaling
            .describe_auto_scaling_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(|e| upstream(DESCRIBE_AUTO_SCALING_INSTANCES, e))?;

        output
            .auto_scaling_instances()
            .iter()
            .map(|instance| -> AuditResult<HostGroupMembership> {
                Ok(HostGroupMembership {
                    instance_id: text(
                        DESCRIBE_AUTO_SCALING_INSTANCES,
                        "InstanceId",
                        instance.instance_id(),
                    )?,
                    host_group_name: text(
                        DESCRIBE_AUTO_SCALING_INSTANCES,
                        "AutoScalingGroupName",
                        instance.auto_scaling_group_name(),
                    )?,
                })
            })
            .collect()
    }

    async fn describe_host_groups(&self, names: &[String]) -> AuditResult<Vec<HostGroup>> {
        let output = self
            .autoscaling
            .describe_auto_scaling_groups()
            .set_auto_scaling_group_names(Some(names.to_vec()))
            .max_records(names.len().max(1) as i32)
            .send()
            .await
            .map_err(|e| upstream(DESCRIBE_AUTO_SCALING_GROUPS, e))?;

        output
            .auto_scaling_groups()
            .iter()
            .map(|group| -> AuditResult<HostGroup> {
                Ok(HostGroup {
                    name: text(
                        DESCRIBE_AUTO_SCALING_GROUPS,
                        "AutoScalingGroupName",
                        group.auto_scaling_group_name(),
                    )?,
                    min_size: count(DESCRIBE_AUTO_SCALING_GROUPS, "MinSize", group.min_size())?,
                    desired_capacity: count(
                        DESCRIBE_AUTO_SCALING_GROUPS,
                        "DesiredCapacity",
                        group.desired_capacity(),
                    )?,
                    max_size: count(DESCRIBE_AUTO_SCALING_GROUPS, "MaxSize", group.max_size())?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ScalingApi for AwsClients {
    async fn describe_scalable_targets(
        &self,
        namespace: &str,
        resource_ids: &[String],
    ) -> AuditResult<Vec<ScalableTarget>> {
        let output = self
            .app_autoscaling
            .describe_scalable_targets()
            .service_namespace(ServiceNamespace::from(namespace))
            .set_resource_ids(Some(resource_ids.to_vec()))
            .send()
            .await
            .map_err(|e| upstream(DESCRIBE_SCALABLE_TARGETS, e))?;

        output
            .scalable_targets()
            .iter()
            .map(|target| -> AuditResult<ScalableTarget> {
                Ok(ScalableTarget {
                    resource_id: text(DESCRIBE_SCALABLE_TARGETS, "ResourceId", target.resource_id())?,
                    max_capacity: count(DESCRIBE_SCALABLE_TARGETS, "MaxCapacity", target.max_capacity())?,
                })
            })
            .collect()
    }
}
