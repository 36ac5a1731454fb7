//! Trigger validation collaborator.
//!
//! The admission policies treat trigger validation as an opaque check behind
//! the [`TriggerValidator`] trait. [`StructuralTriggerValidator`] is the
//! default implementation: it only enforces rules that hold for every scaler
//! type and leaves scaler-specific metadata alone.

use std::collections::HashSet;
use std::fmt;

use kube::ResourceExt;
use thiserror::Error;
use tracing::warn;

use crate::crd::ScaledJob;

/// The admission phase a trigger check runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerOperation {
    Create,
    Update,
}

impl TriggerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerOperation::Create => "create",
            TriggerOperation::Update => "update",
        }
    }
}

impl fmt::Display for TriggerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a trigger configuration is rejected.
///
/// The `Display` text is surfaced verbatim to the requester.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TriggerValidationError {
    #[error("no triggers defined in the ScaledObject/ScaledJob")]
    NoTriggers,

    #[error("trigger at index {index} has no type")]
    MissingType { index: usize },

    #[error(
        "triggerName {name:?} is defined multiple times in the ScaledObject/ScaledJob, but it must be unique"
    )]
    DuplicateName { name: String },

    /// Free-form rejection from an external validator.
    #[error("{0}")]
    Rejected(String),
}

/// Validates the triggers of a ScaledJob.
///
/// Implementations must be safe to call concurrently. `dry_run` tells the
/// implementation to avoid side effects it would otherwise persist.
pub trait TriggerValidator: Send + Sync {
    fn validate(
        &self,
        job: &ScaledJob,
        operation: TriggerOperation,
        dry_run: bool,
    ) -> Result<(), TriggerValidationError>;
}

/// Scaler-agnostic trigger checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralTriggerValidator;

impl StructuralTriggerValidator {
    pub fn new() -> Self {
        Self
    }

    fn check(job: &ScaledJob) -> Result<(), TriggerValidationError> {
        let triggers = &job.spec.triggers;
        if triggers.is_empty() {
            return Err(TriggerValidationError::NoTriggers);
        }

        let mut names = HashSet::with_capacity(triggers.len());
        for (index, trigger) in triggers.iter().enumerate() {
            if trigger.r#type.trim().is_empty() {
                return Err(TriggerValidationError::MissingType { index });
            }
            if !trigger.name.is_empty() && !names.insert(trigger.name.as_str()) {
                return Err(TriggerValidationError::DuplicateName {
                    name: trigger.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl TriggerValidator for StructuralTriggerValidator {
    fn validate(
        &self,
        job: &ScaledJob,
        operation: TriggerOperation,
        _dry_run: bool,
    ) -> Result<(), TriggerValidationError> {
        let result = Self::check(job);
        if let Err(ref e) = result {
            warn!(
                name = %job.name_any(),
                namespace = ?job.namespace(),
                operation = %operation,
                error = %e,
                "Trigger validation error"
            );
        }
        result
    }
}
