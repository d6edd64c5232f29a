//! Deployment units and provisioning plans
//!
//! A deployment unit is an independently provisioned bundle of network,
//! cluster, and public service resources. Plans are rendered per unit at
//! deploy time with the single image reference built earlier in the run,
//! so every unit in a run deploys the same revision by construction.

use serde::{Deserialize, Serialize};

use crate::domain::artifact::ImageReference;
use crate::domain::config::PipelineConfig;

/// Port the service container listens on
pub const CONTAINER_PORT: u16 = 8080;

/// Path the load balancer probes before routing traffic to an instance
pub const HEALTH_CHECK_PATH: &str = "/_health";

/// Time a fresh instance has to pass its first health check
pub const HEALTH_CHECK_GRACE_SECS: u64 = 10;

/// Grace period in-flight connections get when an instance leaves rotation
pub const DEREGISTRATION_DELAY_SECS: u64 = 30;

/// Upper bound for horizontal scaling
pub const MAX_TASK_COUNT: u32 = 10;

/// CPU utilization that triggers a scale-out
pub const CPU_TARGET_PERCENT: u32 = 60;

const NETWORK_CIDR: &str = "192.168.0.0/22";
const SUBNET_CIDR_MASK: u8 = 26;
const MAX_AVAILABILITY_ZONES: u8 = 2;
const TASK_CPU: u32 = 256;
const TASK_MEMORY_MIB: u32 = 512;

/// A named, independently provisioned deploy target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentUnit {
    pub name: String,
}

impl DeploymentUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Subnet tier within the unit's network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetTier {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetPlan {
    pub tier: SubnetTier,
    pub cidr_mask: u8,
}

/// Network with public and private ranges across multiple availability zones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPlan {
    pub cidr: String,
    pub max_azs: u8,
    pub subnets: Vec<SubnetPlan>,
}

impl Default for NetworkPlan {
    fn default() -> Self {
        Self {
            cidr: NETWORK_CIDR.to_string(),
            max_azs: MAX_AVAILABILITY_ZONES,
            subnets: vec![
                SubnetPlan {
                    tier: SubnetTier::Public,
                    cidr_mask: SUBNET_CIDR_MASK,
                },
                SubnetPlan {
                    tier: SubnetTier::Private,
                    cidr_mask: SUBNET_CIDR_MASK,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterPlan {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckPlan {
    pub path: String,
    /// No production traffic reaches an instance until the check passes;
    /// after this period with no success the instance never receives any.
    pub grace_period_secs: u64,
}

/// Public-facing load-balanced service running the built image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub container_name: String,
    pub container_port: u16,
    pub cpu: u32,
    pub memory_mib: u32,
    pub image: ImageReference,
    pub public_load_balancer: bool,
    pub health_check: HealthCheckPlan,
    /// Bounded drain window during scale-down or redeploy: removed
    /// instances stop receiving new connections immediately but keep
    /// existing ones for this long.
    pub deregistration_delay_secs: u64,
}

/// Horizontal autoscaling bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalingPlan {
    pub max_capacity: u32,
    pub cpu_target_percent: u32,
}

impl Default for AutoscalingPlan {
    fn default() -> Self {
        Self {
            max_capacity: MAX_TASK_COUNT,
            cpu_target_percent: CPU_TARGET_PERCENT,
        }
    }
}

/// Fully rendered plan for one deployment unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningPlan {
    pub unit: String,
    pub network: NetworkPlan,
    pub cluster: ClusterPlan,
    pub service: ServicePlan,
    pub autoscaling: AutoscalingPlan,
}

impl ProvisioningPlan {
    /// Renders the plan for a unit with the image built in this run
    pub fn render(config: &PipelineConfig, unit: &DeploymentUnit, image: &ImageReference) -> Self {
        let qualifier = format!("{}-{}", config.prefix, config.stage_name);
        Self {
            unit: unit.name.clone(),
            network: NetworkPlan::default(),
            cluster: ClusterPlan {
                name: format!("{qualifier}-cluster"),
            },
            service: ServicePlan {
                container_name: format!("{qualifier}-container"),
                container_port: CONTAINER_PORT,
                cpu: TASK_CPU,
                memory_mib: TASK_MEMORY_MIB,
                image: image.clone(),
                public_load_balancer: true,
                health_check: HealthCheckPlan {
                    path: HEALTH_CHECK_PATH.to_string(),
                    grace_period_secs: HEALTH_CHECK_GRACE_SECS,
                },
                deregistration_delay_secs: DEREGISTRATION_DELAY_SECS,
            },
            autoscaling: AutoscalingPlan::default(),
        }
    }
}
