//! Test fixtures and builder patterns for ScaledJob.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::DynamicObject;
use scaledjob_webhook::crd::{ScaleTriggers, ScaledJob, ScaledJobSpec};
use scaledjob_webhook::webhooks::{TriggerOperation, TriggerValidationError, TriggerValidator};

/// Builder for creating ScaledJob test fixtures.
///
/// # Example
/// ```
/// let job = ScaledJobBuilder::new("consumer")
///     .namespace("jobs")
///     .finalizer("finalizer.keda.sh")
///     .trigger("cron", "", &[("start", "0 * * * *")])
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ScaledJobBuilder {
    name: String,
    namespace: Option<String>,
    finalizers: Option<Vec<String>>,
    labels: BTreeMap<String, String>,
    max_replica_count: Option<i32>,
    polling_interval: Option<i32>,
    triggers: Vec<ScaleTriggers>,
}

impl ScaledJobBuilder {
    /// Create a new builder with the given resource name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some("default".to_string()),
            finalizers: None,
            labels: BTreeMap::new(),
            max_replica_count: None,
            polling_interval: None,
            triggers: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a finalizer.
    pub fn finalizer(mut self, finalizer: impl Into<String>) -> Self {
        self.finalizers
            .get_or_insert_with(Vec::new)
            .push(finalizer.into());
        self
    }

    /// Set an explicit, possibly empty, finalizer list.
    pub fn finalizers(mut self, finalizers: &[&str]) -> Self {
        self.finalizers = Some(finalizers.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn max_replica_count(mut self, count: i32) -> Self {
        self.max_replica_count = Some(count);
        self
    }

    pub fn polling_interval(mut self, seconds: i32) -> Self {
        self.polling_interval = Some(seconds);
        self
    }

    /// Add a trigger. An empty name leaves the trigger unnamed.
    pub fn trigger(mut self, kind: &str, name: &str, metadata: &[(&str, &str)]) -> Self {
        self.triggers.push(ScaleTriggers {
            r#type: kind.to_string(),
            name: name.to_string(),
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        });
        self
    }

    /// Build the ScaledJob.
    pub fn build(self) -> ScaledJob {
        ScaledJob {
            metadata: ObjectMeta {
                name: Some(self.name),
                namespace: self.namespace,
                finalizers: self.finalizers,
                labels: if self.labels.is_empty() {
                    None
                } else {
                    Some(self.labels)
                },
                ..Default::default()
            },
            spec: ScaledJobSpec {
                max_replica_count: self.max_replica_count,
                polling_interval: self.polling_interval,
                triggers: self.triggers,
                ..Default::default()
            },
            status: None,
        }
    }
}

impl Default for ScaledJobBuilder {
    fn default() -> Self {
        Self::new("test-scaledjob")
    }
}

/// A ScaledJob with a single valid cron trigger.
pub fn cron_job(name: &str) -> ScaledJob {
    ScaledJobBuilder::new(name)
        .max_replica_count(5)
        .trigger(
            "cron",
            "",
            &[("timezone", "Etc/UTC"), ("start", "0 * * * *"), ("end", "30 * * * *")],
        )
        .build()
}

/// Convert a ScaledJob into the opaque form the admission layer receives.
#[allow(clippy::unwrap_used)]
pub fn to_dynamic(job: &ScaledJob) -> DynamicObject {
    serde_json::from_value(serde_json::to_value(job).unwrap()).unwrap()
}

/// Trigger validator stub that records calls and returns a fixed outcome.
#[derive(Default)]
pub struct RecordingTriggerValidator {
    calls: Mutex<Vec<(TriggerOperation, bool)>>,
    rejection: Option<String>,
}

impl RecordingTriggerValidator {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rejection: Some(message.to_string()),
        }
    }

    #[allow(clippy::unwrap_used)]
    pub fn calls(&self) -> Vec<(TriggerOperation, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TriggerValidator for RecordingTriggerValidator {
    #[allow(clippy::unwrap_used)]
    fn validate(
        &self,
        _job: &ScaledJob,
        operation: TriggerOperation,
        dry_run: bool,
    ) -> Result<(), TriggerValidationError> {
        self.calls.lock().unwrap().push((operation, dry_run));
        match &self.rejection {
            Some(message) => Err(TriggerValidationError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}
