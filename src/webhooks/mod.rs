//! Webhook module for validating ScaledJob admission requests.
//!
//! Layers, outermost first:
//! - `server`: HTTPS endpoint speaking `admission.k8s.io/v1` AdmissionReview
//! - `dispatcher`: decodes objects and routes CREATE/UPDATE/DELETE
//! - `policies`: the admission decisions
//! - `trigger_validator`: trigger checks the policies delegate to

pub mod dispatcher;
mod error;
pub mod policies;
mod server;
pub mod trigger_validator;

pub use dispatcher::{
    AdmissionOperation, CustomValidator, RequestContext, ScaledJobCustomValidator,
};
pub use error::{AdmissionError, WebhookError};
pub use policies::{Decision, ValidationContext, Verdict, Warnings};
pub use server::{VALIDATE_SCALEDJOB_PATH, WebhookState, create_webhook_router, run_webhook_server};
pub use trigger_validator::{
    StructuralTriggerValidator, TriggerOperation, TriggerValidationError, TriggerValidator,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
