//! scaledjob-webhook library crate
//!
//! Exports the ScaledJob CRD types, the admission validators and the
//! servers that expose them.

pub mod config;
pub mod crd;
pub mod health;
pub mod webhooks;

pub use config::{Config, LogFormat};
pub use health::HealthState;
pub use webhooks::{
    AdmissionError, CustomValidator, ScaledJobCustomValidator, TriggerValidator, WebhookError,
    run_webhook_server,
};
