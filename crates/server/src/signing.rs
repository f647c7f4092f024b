use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use pollbot_core::errors::ApplicationError;
use pollbot_slack::signature::{verify_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::error::{new_correlation_id, ApiError};

/// Slack caps interactive payloads well below this.
const MAX_SIGNED_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct SigningState {
    secret: Option<Arc<SecretString>>,
}

impl SigningState {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret: secret.map(Arc::new) }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }
}

/// Rejects requests whose `X-Slack-Signature` does not match the raw body.
/// Passes everything through when no signing secret is configured.
pub async fn verify_slack_signature(
    State(state): State<SigningState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(secret) = state.secret.as_ref() else {
        return Ok(next.run(request).await);
    };

    let correlation_id = new_correlation_id();
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_SIGNED_BODY_BYTES).await.map_err(|error| {
        ApiError::new(ApplicationError::InvalidPayload(error.to_string()), &correlation_id)
    })?;

    let header = |name: &str| parts.headers.get(name).and_then(|value| value.to_str().ok());
    verify_signature(
        secret.expose_secret().as_bytes(),
        header(TIMESTAMP_HEADER),
        header(SIGNATURE_HEADER),
        &bytes,
        Utc::now().timestamp(),
    )
    .map_err(|error| {
        warn!(
            event_name = "slack.signature.rejected",
            correlation_id = %correlation_id,
            path = %parts.uri.path(),
            error = %error,
            "rejected unsigned or mis-signed slack request"
        );
        ApiError::new(ApplicationError::Unauthenticated(error.to_string()), &correlation_id)
    })?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
