//! ScaledJob Custom Resource Definition.
//!
//! Mirrors the `keda.sh/v1alpha1` ScaledJob schema closely enough for the
//! webhook to decode admission payloads and compare specs field by field.
//! Fields this crate never inspects are still modelled so that a spec
//! comparison sees every change a user can make.

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::JobSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ScaledJob runs Kubernetes Jobs in response to external event sources.
///
/// Example:
/// ```yaml
/// apiVersion: keda.sh/v1alpha1
/// kind: ScaledJob
/// metadata:
///   name: queue-consumer
/// spec:
///   jobTargetRef:
///     template:
///       spec:
///         containers:
///           - name: consumer
///             image: consumer:latest
///         restartPolicy: Never
///   maxReplicaCount: 10
///   triggers:
///     - type: rabbitmq
///       metadata:
///         queueName: jobs
///         mode: QueueLength
///         value: "5"
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "keda.sh",
    version = "v1alpha1",
    kind = "ScaledJob",
    plural = "scaledjobs",
    shortname = "sj",
    status = "ScaledJobStatus",
    namespaced,
    printcolumn = r#"{"name":"Min", "type":"integer", "jsonPath":".spec.minReplicaCount"}"#,
    printcolumn = r#"{"name":"Max", "type":"integer", "jsonPath":".spec.maxReplicaCount"}"#,
    printcolumn = r#"{"name":"Triggers", "type":"string", "jsonPath":".status.triggersTypes"}"#,
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ScaledJobSpec {
    /// Template for the Jobs created by the scaler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_target_ref: Option<JobSpec>,

    /// Interval in seconds between trigger checks (default: 30).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<i32>,

    /// How many completed jobs to keep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_jobs_history_limit: Option<i32>,

    /// How many failed jobs to keep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_jobs_history_limit: Option<i32>,

    /// Container whose environment is exposed to the scalers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_source_container_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_replica_count: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replica_count: Option<i32>,

    /// Deprecated in favour of `rollout.strategy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout_strategy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout: Option<Rollout>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_strategy: Option<ScalingStrategy>,

    /// Event sources that drive scaling, evaluated in order.
    #[serde(default)]
    pub triggers: Vec<ScaleTriggers>,
}

/// How running jobs are treated when the ScaledJob is updated.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rollout {
    /// `default` or `gradual`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub strategy: String,

    /// `foreground` or `background` deletion of old jobs.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub propagation_policy: String,
}

/// Controls how the number of jobs to create is computed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScalingStrategy {
    /// `default`, `custom`, `accurate` or `eager`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub strategy: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_scaling_queue_length_deduction: Option<i32>,

    /// Decimal string, e.g. "0.5".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_scaling_running_job_percentage: Option<String>,

    /// Pod conditions that mark a job as pending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_pod_conditions: Vec<String>,

    /// `max`, `min`, `avg` or `sum`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub multiple_scalers_calculation: String,
}

/// A single trigger definition. Scaler-specific settings live in `metadata`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTriggers {
    /// Scaler type, e.g. `rabbitmq`, `kafka`, `cron`.
    #[serde(default)]
    pub r#type: String,

    /// Optional trigger name, unique within the resource when set.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_cached_metrics: bool,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_ref: Option<AuthenticationRef>,

    /// `AverageValue`, `Value` or `Utilization`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
}

/// Reference to a TriggerAuthentication or ClusterTriggerAuthentication.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRef {
    #[serde(default)]
    pub name: String,

    /// Defaults to TriggerAuthentication when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Status of a ScaledJob, written by the KEDA operator.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaledJobStatus {
    /// Last time a trigger reported activity (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_time: Option<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<String>,

    /// Comma separated authentication kinds in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentications_types: Option<String>,

    /// Comma separated trigger types in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggers_types: Option<String>,
}

/// Condition reported on a ScaledJob (`Ready`, `Active`, `Fallback`, `Paused`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub r#type: String,
    /// "True", "False" or "Unknown".
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ScaledJob {
    /// Number of finalizers currently set on the resource.
    pub fn finalizer_count(&self) -> usize {
        self.metadata.finalizers.as_ref().map_or(0, Vec::len)
    }
}
