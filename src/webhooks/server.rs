//! Admission webhook server.
//!
//! Serves the ScaledJob validating webhook over HTTPS.
//!
//! To enable the webhook:
//! 1. Issue a serving certificate (e.g. with cert-manager)
//! 2. Mount the TLS secret to the pod at /etc/webhook/certs/
//! 3. Register a ValidatingWebhookConfiguration pointing at
//!    `/validate-keda-sh-v1alpha1-scaledjob` with `failurePolicy: Ignore`

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_server::tls_rustls::RustlsConfig;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use tracing::{debug, error, info, warn};

use crate::health::HealthState;
use crate::webhooks::dispatcher::{AdmissionOperation, CustomValidator, RequestContext};
use crate::webhooks::{AdmissionError, WebhookError};

/// Path the ValidatingWebhookConfiguration points at
pub const VALIDATE_SCALEDJOB_PATH: &str = "/validate-keda-sh-v1alpha1-scaledjob";

/// Metric reason for trigger validation failures
const REASON_INCORRECT_TRIGGERS: &str = "incorrect-triggers";
/// Metric reason for malformed admission requests
const REASON_INVALID_REQUEST: &str = "invalid-request";
/// Operation label when the request could not be classified
const UNKNOWN_OPERATION: &str = "unknown";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub validator: Arc<dyn CustomValidator>,
    /// Optional health state for metrics
    pub health_state: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(validator: Arc<dyn CustomValidator>, health_state: Option<Arc<HealthState>>) -> Self {
        Self {
            validator,
            health_state,
        }
    }

    fn record(&self, operation: &str, allowed: bool, started: Instant) {
        if let Some(ref health) = self.health_state {
            health
                .metrics
                .record_admission(operation, allowed, started.elapsed().as_secs_f64());
        }
    }

    fn record_error(&self, namespace: Option<&str>, operation: &str, reason: &str) {
        if let Some(ref health) = self.health_state {
            health
                .metrics
                .record_validation_error(namespace.unwrap_or_default(), operation, reason);
        }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(VALIDATE_SCALEDJOB_PATH, post(validate_scaledjob))
        .with_state(state)
}

/// Reject a request whose context could not be extracted.
///
/// Answered with 200 and the request uid so the API server treats it as a
/// denial rather than a failed webhook call.
fn reject_request(
    request: &AdmissionRequest<DynamicObject>,
    message: String,
) -> (StatusCode, Json<AdmissionReview<DynamicObject>>) {
    (
        StatusCode::OK,
        Json(AdmissionResponse::from(request).deny(message).into_review()),
    )
}

/// ScaledJob admission webhook handler
async fn validate_scaledjob(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let started = Instant::now();

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return (
                StatusCode::BAD_REQUEST,
                Json(AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e)).into_review()),
            );
        }
    };

    let uid = &request.uid;
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        dry_run = request.dry_run,
        "Processing admission request"
    );

    let operation = match AdmissionOperation::from_request(&request) {
        Ok(Some(op)) => op,
        Ok(None) => {
            debug!(uid = %uid, operation = ?request.operation, "Operation not handled, allowing");
            return (
                StatusCode::OK,
                Json(AdmissionResponse::from(&request).into_review()),
            );
        }
        Err(e) => {
            error!(uid = %uid, error = %e, "Malformed admission request");
            state.record(UNKNOWN_OPERATION, false, started);
            state.record_error(request.namespace.as_deref(), UNKNOWN_OPERATION, REASON_INVALID_REQUEST);
            return reject_request(&request, e.to_string());
        }
    };
    let op_name = operation.name();

    let ctx = RequestContext::from_request(&request);
    match state.validator.dispatch(&ctx, operation) {
        Ok(warnings) => {
            info!(uid = %uid, operation = op_name, warnings = warnings.len(), "Admission request allowed");
            state.record(op_name, true, started);

            let mut response = AdmissionResponse::from(&request);
            if !warnings.is_empty() {
                response.warnings = Some(warnings);
            }
            (StatusCode::OK, Json(response.into_review()))
        }
        Err(AdmissionError::Denied(reason)) => {
            warn!(uid = %uid, operation = op_name, reason = %reason, "Admission request denied");
            state.record(op_name, false, started);
            state.record_error(
                request.namespace.as_deref(),
                op_name,
                REASON_INCORRECT_TRIGGERS,
            );
            (
                StatusCode::OK,
                Json(AdmissionResponse::from(&request).deny(reason).into_review()),
            )
        }
        Err(e) => {
            error!(uid = %uid, operation = op_name, error = %e, "Failed to evaluate admission request");
            state.record(op_name, false, started);
            state.record_error(request.namespace.as_deref(), op_name, REASON_INVALID_REQUEST);
            reject_request(&request, e.to_string())
        }
    }
}

/// Run the webhook server with TLS
///
/// Binds to `addr` and serves the ScaledJob validation endpoint. TLS
/// certificates are loaded from the paths given. The health state, when
/// present, is marked ready once the certificates are loaded.
pub async fn run_webhook_server(
    addr: SocketAddr,
    cert_path: &Path,
    key_path: &Path,
    validator: Arc<dyn CustomValidator>,
    health_state: Option<Arc<HealthState>>,
) -> Result<(), WebhookError> {
    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    if let Some(ref health) = health_state {
        health.set_ready(true).await;
    }

    let state = Arc::new(WebhookState::new(validator, health_state));
    let app = create_webhook_router(state);

    info!(%addr, path = VALIDATE_SCALEDJOB_PATH, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
