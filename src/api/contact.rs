//! Contact form endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::ContactResponse;
use crate::notify::contact_notification;
use crate::AppState;

/// Extract a required string field, or `None` when absent or mistyped.
fn string_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Whether the hidden honeypot field was filled in. Humans never see it, so
/// any content marks the request as bot traffic.
fn honeypot_tripped(body: &Value) -> bool {
    match body.get("honeypot") {
        None | Some(Value::Null) => false,
        Some(Value::String(content)) => !content.trim().is_empty(),
        Some(_) => true,
    }
}

/// POST /api/contact - Relay a contact form message to staff.
///
/// The body is inspected untyped because the contract requires a 400 for any
/// field that is present but not a string. Honeypot submissions are dropped
/// while still reporting success, so bots learn nothing.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected contact body: {}", rejection.body_text());
        AppError::BadRequest("Bad request".to_string())
    })?;

    if honeypot_tripped(&body) {
        tracing::info!("Contact honeypot tripped; dropping message");
        return Ok(Json(ContactResponse { ok: true }));
    }

    let (Some(name), Some(email), Some(subject), Some(message)) = (
        string_field(&body, "name"),
        string_field(&body, "email"),
        string_field(&body, "subject"),
        string_field(&body, "message"),
    ) else {
        return Err(AppError::Validation("Invalid payload".to_string()));
    };

    let content = contact_notification(name, email, subject, message);
    state.notifier.dispatch_contact(&content).await.map_err(|err| {
        tracing::error!("Failed to deliver contact notification: {}", err);
        AppError::Mail("Unable to send message. Please try again.".to_string())
    })?;

    Ok(Json(ContactResponse { ok: true }))
}
