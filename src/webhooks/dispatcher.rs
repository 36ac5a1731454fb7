//! Admission dispatch for ScaledJob.
//!
//! The HTTP layer hands over an [`AdmissionOperation`] holding opaque
//! objects plus a [`RequestContext`]. [`ScaledJobCustomValidator`] decodes
//! the objects, logs a snapshot of the candidate and routes to the policies.

use std::sync::Arc;

use kube::ResourceExt;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, Operation};
use tracing::{Level, debug, info, warn};

use crate::crd::ScaledJob;
use crate::webhooks::AdmissionError;
use crate::webhooks::policies::{self, ValidationContext, Warnings};
use crate::webhooks::trigger_validator::{
    StructuralTriggerValidator, TriggerOperation, TriggerValidator,
};

/// Request-scoped facts the validator needs besides the objects.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub uid: String,
    pub namespace: Option<String>,
    dry_run: Option<bool>,
}

impl RequestContext {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Build the context from a decoded admission request.
    pub fn from_request<K: kube::Resource>(request: &AdmissionRequest<K>) -> Self {
        Self {
            uid: request.uid.clone(),
            namespace: request.namespace.clone(),
            dry_run: Some(request.dry_run),
        }
    }

    /// The dry-run flag. Its absence means the caller broke the admission contract.
    pub fn dry_run(&self) -> Result<bool, AdmissionError> {
        self.dry_run.ok_or(AdmissionError::MissingDryRun)
    }
}

/// A typed admission operation over opaque objects.
#[derive(Debug, Clone, Copy)]
pub enum AdmissionOperation<'a> {
    Create {
        object: &'a DynamicObject,
    },
    Update {
        old_object: Option<&'a DynamicObject>,
        object: &'a DynamicObject,
    },
    Delete {
        old_object: Option<&'a DynamicObject>,
    },
}

impl<'a> AdmissionOperation<'a> {
    /// Extract the operation from a request.
    ///
    /// Returns `Ok(None)` for CONNECT, which this webhook does not handle.
    pub fn from_request(
        request: &'a AdmissionRequest<DynamicObject>,
    ) -> Result<Option<Self>, AdmissionError> {
        let object = || {
            request
                .object
                .as_ref()
                .ok_or(AdmissionError::MissingObject("object"))
        };

        let operation = match request.operation {
            Operation::Create => Self::Create { object: object()? },
            Operation::Update => Self::Update {
                old_object: request.old_object.as_ref(),
                object: object()?,
            },
            Operation::Delete => Self::Delete {
                old_object: request.old_object.as_ref(),
            },
            Operation::Connect => return Ok(None),
        };
        Ok(Some(operation))
    }

    /// Lowercase operation name, used for log fields and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Capability a type needs to be served by the admission endpoint.
///
/// `Ok` admits the request with the given warnings; `Err` rejects it.
pub trait CustomValidator: Send + Sync {
    fn validate_create(
        &self,
        ctx: &RequestContext,
        obj: &DynamicObject,
    ) -> Result<Warnings, AdmissionError>;

    fn validate_update(
        &self,
        ctx: &RequestContext,
        old_obj: Option<&DynamicObject>,
        new_obj: &DynamicObject,
    ) -> Result<Warnings, AdmissionError>;

    fn validate_delete(
        &self,
        ctx: &RequestContext,
        obj: Option<&DynamicObject>,
    ) -> Result<Warnings, AdmissionError>;

    /// Route an operation to the matching method.
    fn dispatch(
        &self,
        ctx: &RequestContext,
        operation: AdmissionOperation<'_>,
    ) -> Result<Warnings, AdmissionError> {
        match operation {
            AdmissionOperation::Create { object } => self.validate_create(ctx, object),
            AdmissionOperation::Update { old_object, object } => {
                self.validate_update(ctx, old_object, object)
            }
            AdmissionOperation::Delete { old_object } => self.validate_delete(ctx, old_object),
        }
    }
}

/// Validator for ScaledJob admission requests.
#[derive(Clone)]
pub struct ScaledJobCustomValidator {
    triggers: Arc<dyn TriggerValidator>,
}

impl Default for ScaledJobCustomValidator {
    fn default() -> Self {
        Self::new(Arc::new(StructuralTriggerValidator::new()))
    }
}

impl ScaledJobCustomValidator {
    pub fn new(triggers: Arc<dyn TriggerValidator>) -> Self {
        Self { triggers }
    }
}

impl CustomValidator for ScaledJobCustomValidator {
    fn validate_create(
        &self,
        ctx: &RequestContext,
        obj: &DynamicObject,
    ) -> Result<Warnings, AdmissionError> {
        let dry_run = ctx.dry_run()?;
        let job = decode(obj, "object")?;
        log_snapshot(&job, TriggerOperation::Create);

        let vctx = ValidationContext::new(&job, dry_run);
        policies::validate_create(&vctx, self.triggers.as_ref()).into_result()
    }

    fn validate_update(
        &self,
        ctx: &RequestContext,
        old_obj: Option<&DynamicObject>,
        new_obj: &DynamicObject,
    ) -> Result<Warnings, AdmissionError> {
        let dry_run = ctx.dry_run()?;
        let job = decode(new_obj, "object")?;
        log_snapshot(&job, TriggerOperation::Update);

        // Without a readable previous version the finalizer exemption cannot
        // apply, so fall through to full validation.
        let old = old_obj.and_then(|obj| match decode(obj, "oldObject") {
            Ok(old) => Some(old),
            Err(e) => {
                warn!(uid = %ctx.uid, error = %e, "Ignoring undecodable previous ScaledJob");
                None
            }
        });

        let vctx = ValidationContext::new(&job, dry_run).with_old(old.as_ref());
        policies::validate_update(&vctx, self.triggers.as_ref()).into_result()
    }

    fn validate_delete(
        &self,
        _ctx: &RequestContext,
        _obj: Option<&DynamicObject>,
    ) -> Result<Warnings, AdmissionError> {
        policies::validate_delete().into_result()
    }
}

fn decode(obj: &DynamicObject, which: &'static str) -> Result<ScaledJob, AdmissionError> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value::<ScaledJob>)
        .map_err(|e| AdmissionError::Decode {
            which,
            message: e.to_string(),
        })
}

/// Best-effort JSON snapshot of the candidate for audit logs.
fn log_snapshot(job: &ScaledJob, operation: TriggerOperation) {
    let enabled = match operation {
        TriggerOperation::Create => tracing::enabled!(Level::INFO),
        TriggerOperation::Update => tracing::enabled!(Level::DEBUG),
    };
    if !enabled {
        return;
    }

    let snapshot = match serde_json::to_string_pretty(job) {
        Ok(s) => s,
        Err(e) => {
            debug!(error = %e, "Skipping ScaledJob snapshot");
            return;
        }
    };

    let name = job.name_any();
    match operation {
        TriggerOperation::Create => {
            info!(name = %name, "validating scaledjob creation for {}", snapshot)
        }
        TriggerOperation::Update => {
            debug!(name = %name, "validating scaledjob update for {}", snapshot)
        }
    }
}
