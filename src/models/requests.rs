//! Request and response bodies for the public endpoints.

use serde::{Deserialize, Serialize};

use super::{AddressForm, ApplicantInfoForm, Draft, EligibilityForm, EmploymentForm, HouseholdForm};

/// Payload of `POST /api/application/submit`.
///
/// Every field is defaulted so partial client payloads still deserialize; the
/// handler re-validates the contact identity itself. Demographics answers are
/// deliberately not part of the submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionRequest {
    pub applicant_info: ApplicantInfoForm,
    pub eligibility: EligibilityForm,
    pub address: AddressForm,
    pub household: HouseholdForm,
    pub employment: EmploymentForm,
}

impl From<Draft> for SubmissionRequest {
    fn from(draft: Draft) -> Self {
        Self {
            applicant_info: draft.applicant_info,
            eligibility: draft.eligibility,
            address: draft.address,
            household: draft.household,
            employment: draft.employment,
        }
    }
}

/// Success body of the submit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    pub application_number: String,
}

/// Success body of the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub ok: bool,
}

/// Query parameters of the location endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    /// Explicit address override, for local testing.
    pub ip: Option<String>,
}
