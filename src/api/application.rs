//! Application submission endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::{SubmissionRequest, SubmitResponse};
use crate::notify::{applicant_confirmation, generate_application_number, staff_notification};
use crate::AppState;

/// POST /api/application/submit - Accept a completed application and send the
/// staff and applicant notifications.
///
/// The client already gated each step, but the contact identity is
/// re-validated here: a submission without first name, last name and email is
/// rejected even if the client-side gate was bypassed.
pub async fn submit_application(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Rejected submission body: {}", rejection.body_text());
        AppError::BadRequest("Invalid request body.".to_string())
    })?;

    let first_name = request.applicant_info.first_name.trim();
    let last_name = request.applicant_info.last_name.trim();
    let email = request.applicant_info.email.trim();

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
        return Err(AppError::Validation(
            "Missing applicant contact details.".to_string(),
        ));
    }

    let application_number = generate_application_number();
    tracing::info!(
        "Processing application #{} from {} {}",
        application_number,
        first_name,
        last_name
    );

    let staff_content = staff_notification(&request, &application_number);
    let confirmation_content = applicant_confirmation(&request, &application_number);

    state
        .notifier
        .dispatch_application(&staff_content, &confirmation_content, email)
        .await
        .map_err(|err| {
            tracing::error!("Failed to deliver application notifications: {}", err);
            AppError::Mail("Unable to process application.".to_string())
        })?;

    Ok(Json(SubmitResponse {
        ok: true,
        application_number,
    }))
}
