//! Admission policies for ScaledJob resources.
//!
//! Each admission phase has its own entry point:
//! - CREATE: triggers must pass validation
//! - UPDATE: triggers must pass validation, unless the update only removes
//!   the last finalizer (see [`finalizer::is_removing_finalizer`])
//! - DELETE: always allowed
//!
//! The functions here are pure over their inputs; the trigger validator is
//! the only collaborator.

pub mod finalizer;

use tracing::debug;

use crate::crd::ScaledJob;
use crate::webhooks::AdmissionError;
use crate::webhooks::trigger_validator::{TriggerOperation, TriggerValidator};

/// Non-blocking advisories returned alongside an allowed request.
pub type Warnings = Vec<String>;

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Denied with the reason shown to the requester.
    Deny(String),
}

/// Result of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub warnings: Warnings,
}

impl Decision {
    /// Create an allowed decision with no warnings
    pub fn allow() -> Self {
        Self {
            verdict: Verdict::Allow,
            warnings: Vec::new(),
        }
    }

    /// Create a denied decision
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Deny(reason.into()),
            warnings: Vec::new(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allow
    }

    /// Reason for denial (if not allowed)
    pub fn reason(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Allow => None,
            Verdict::Deny(reason) => Some(reason),
        }
    }

    /// Convert into the `(warnings, error)` shape the admission layer expects.
    pub fn into_result(self) -> Result<Warnings, AdmissionError> {
        match self.verdict {
            Verdict::Allow => Ok(self.warnings),
            Verdict::Deny(reason) => Err(AdmissionError::Denied(reason)),
        }
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The resource being validated
    pub resource: &'a ScaledJob,
    /// The previous resource (for UPDATE operations)
    pub old_resource: Option<&'a ScaledJob>,
    /// Whether this is a dry-run request
    pub dry_run: bool,
}

impl<'a> ValidationContext<'a> {
    pub fn new(resource: &'a ScaledJob, dry_run: bool) -> Self {
        Self {
            resource,
            old_resource: None,
            dry_run,
        }
    }

    /// Attach the previous version of the resource.
    pub fn with_old(mut self, old_resource: Option<&'a ScaledJob>) -> Self {
        self.old_resource = old_resource;
        self
    }

    /// Check if this is an UPDATE operation
    pub fn is_update(&self) -> bool {
        self.old_resource.is_some()
    }
}

/// Validate a ScaledJob on CREATE.
pub fn validate_create(ctx: &ValidationContext<'_>, triggers: &dyn TriggerValidator) -> Decision {
    verify_triggers(ctx, triggers, TriggerOperation::Create)
}

/// Validate a ScaledJob on UPDATE.
///
/// A missing `old_resource` is not an error; the update is then validated
/// like any other.
pub fn validate_update(ctx: &ValidationContext<'_>, triggers: &dyn TriggerValidator) -> Decision {
    if finalizer::is_removing_finalizer(ctx) {
        debug!("finalizer removal, skipping validation");
        return Decision::allow();
    }
    verify_triggers(ctx, triggers, TriggerOperation::Update)
}

/// Validate a ScaledJob on DELETE. Deletion is never blocked.
pub fn validate_delete() -> Decision {
    Decision::allow()
}

fn verify_triggers(
    ctx: &ValidationContext<'_>,
    triggers: &dyn TriggerValidator,
    operation: TriggerOperation,
) -> Decision {
    match triggers.validate(ctx.resource, operation, ctx.dry_run) {
        Ok(()) => Decision::allow(),
        Err(e) => Decision::deny(e.to_string()),
    }
}
