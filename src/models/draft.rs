//! The in-progress application draft and its six step records.
//!
//! Answers that come from free-form inputs stay as strings and are only
//! interpreted by the step validators. Choice answers are closed enums so the
//! validators and label mappings can match exhaustively.

use serde::{Deserialize, Serialize};

/// A yes/no answer. Questions that have not been answered yet are `Option<YesNo>` = `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

/// Kind of assistance the applicant is requesting.
///
/// `PastDue` is a known category but is policy-blocked: the eligibility
/// validator never lets it proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssistanceType {
    PastDue,
    Moving,
}

/// How the applicant heard about the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferralSource {
    Friend,
    Community,
    Online,
    Other,
}

impl ReferralSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferralSource::Friend => "friend",
            ReferralSource::Community => "community",
            ReferralSource::Online => "online",
            ReferralSource::Other => "other",
        }
    }
}

/// Employment arrangement for currently-employed applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Gig,
    SelfEmployed,
    BusinessOwner,
}

impl EmploymentType {
    /// Human-readable label used in notification summaries.
    pub fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Gig => "Gig / contract",
            EmploymentType::SelfEmployed => "Self-employed",
            EmploymentType::BusinessOwner => "Business owner",
        }
    }

    /// Self-employed and business-owner applicants must describe the business.
    pub fn requires_business_description(self) -> bool {
        matches!(
            self,
            EmploymentType::SelfEmployed | EmploymentType::BusinessOwner
        )
    }
}

/// Step 1: residency, household income and the kind of assistance requested.
///
/// The `detected_*` fields are machine-filled from geolocation and are only
/// written while blank; `actual_city` is the applicant's manual override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityForm {
    #[serde(rename = "livesInSF")]
    pub lives_in_sf: Option<YesNo>,
    pub household_size: String,
    pub monthly_income: String,
    pub assistance_type: Option<AssistanceType>,
    pub detected_city: String,
    pub detected_region: String,
    pub detected_region_code: String,
    pub actual_city: String,
    pub new_apartment_street: String,
    pub new_apartment_unit: String,
    pub new_apartment_city: String,
    pub new_apartment_state: String,
    pub new_apartment_zip: String,
    pub new_apartment_address_confirmation: Option<YesNo>,
}

impl EligibilityForm {
    /// True once any geolocation field has been filled for this session.
    pub fn has_detected_location(&self) -> bool {
        !self.detected_city.is_empty()
            || !self.detected_region.is_empty()
            || !self.detected_region_code.is_empty()
    }
}

/// Step 2: identity and contact details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantInfoForm {
    pub referral_source: Option<ReferralSource>,
    pub referral_note: String,
    pub assistance_since_2020: Option<YesNo>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub pronouns: String,
    pub phone: String,
    pub email: String,
}

/// Step 3: optional race/ethnicity selections.
///
/// `decline` and a non-empty `races` list are mutually exclusive; the form
/// machine clears the selections whenever decline is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemographicsForm {
    pub races: Vec<String>,
    pub decline: bool,
}

/// Step 4: current residence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressForm {
    pub address_line1: String,
    pub unit: String,
    pub city: String,
    pub zip_code: String,
}

/// A person living with the applicant. Free text, not strictly validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseholdMember {
    pub name: String,
    pub age: String,
    pub relationship: String,
}

/// Step 5: household composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseholdForm {
    pub living_situation: String,
    pub members: Vec<HouseholdMember>,
    pub has_changes: Option<YesNo>,
    pub expecting_child: Option<YesNo>,
    pub infants: String,
    pub children: String,
    pub teens: String,
    pub adults: String,
}

/// Step 6: current or previous employment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmploymentForm {
    pub employed: Option<YesNo>,
    pub employment_type: Option<EmploymentType>,
    pub occupation: String,
    pub employer_name: String,
    pub self_employment_description: String,
    pub previous_occupation: String,
    pub previous_employer: String,
}

/// The full in-progress answer set across all six steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub eligibility: EligibilityForm,
    pub applicant_info: ApplicantInfoForm,
    pub demographics: DemographicsForm,
    pub address: AddressForm,
    pub household: HouseholdForm,
    pub employment: EmploymentForm,
}
