//! Custom Resource Definitions handled by the webhook.
//!
//! - `ScaledJob`: run Kubernetes Jobs in response to external event sources

mod scaled_job;

pub use scaled_job::*;
