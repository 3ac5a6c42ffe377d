//! Step completion predicates.
//!
//! One pure function per step, each deciding whether the accumulated answers
//! permit forward navigation. Validators never mutate and never error; an
//! incomplete step simply reads as `false`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{
    AddressForm, ApplicantInfoForm, AssistanceType, DemographicsForm, Draft, EligibilityForm,
    EmploymentForm, HouseholdForm, ReferralSource, YesNo,
};

use super::machine::StepId;

static ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid zip pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email pattern"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?1?\d{10,15}$").expect("valid phone pattern"));

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// A count field is valid when blank or a non-negative integer.
fn count_ok(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.parse::<u32>().is_ok()
}

/// Whether a user-entered city line is consistent with the detected state:
/// it must contain the region name, or the region code as a whole word,
/// case-insensitively.
fn city_matches_region(actual: &str, region: &str, region_code: &str) -> bool {
    let haystack = actual.to_lowercase();

    if !region.is_empty() && haystack.contains(&region.to_lowercase()) {
        return true;
    }

    if !region_code.is_empty() {
        let code = region_code.to_lowercase();
        return haystack
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token == code);
    }

    false
}

/// Eligibility gate. Only explicit residents may continue, past-due rent is
/// policy-blocked, and moving assistance requires the complete new-apartment
/// address.
pub fn eligibility_valid(values: &EligibilityForm) -> bool {
    if values.lives_in_sf != Some(YesNo::Yes) {
        return false;
    }

    let size_ok = values
        .household_size
        .trim()
        .parse::<u32>()
        .map_or(false, |n| n > 0);
    let income_ok = values
        .monthly_income
        .trim()
        .parse::<f64>()
        .map_or(false, |n| n >= 0.0);
    if !size_ok || !income_ok {
        return false;
    }

    match values.assistance_type {
        None | Some(AssistanceType::PastDue) => return false,
        Some(AssistanceType::Moving) => {
            let address_fields = [
                &values.new_apartment_street,
                &values.new_apartment_unit,
                &values.new_apartment_city,
                &values.new_apartment_state,
                &values.new_apartment_zip,
            ];
            if address_fields.iter().any(|field| blank(field)) {
                return false;
            }
            if !ZIP_RE.is_match(values.new_apartment_zip.trim()) {
                return false;
            }
            if values.new_apartment_address_confirmation.is_none() {
                return false;
            }
        }
    }

    let actual = values.actual_city.trim();
    let region = values.detected_region.trim();
    let region_code = values.detected_region_code.trim();
    if !actual.is_empty()
        && (!region.is_empty() || !region_code.is_empty())
        && !city_matches_region(actual, region, region_code)
    {
        return false;
    }

    true
}

/// Applicant info gate: referral, history flag, identity and contact details.
pub fn applicant_info_valid(values: &ApplicantInfoForm) -> bool {
    let Some(source) = values.referral_source else {
        return false;
    };
    if source == ReferralSource::Other && blank(&values.referral_note) {
        return false;
    }
    if values.assistance_since_2020.is_none() {
        return false;
    }
    if blank(&values.first_name) || blank(&values.last_name) {
        return false;
    }
    if blank(&values.date_of_birth) {
        return false;
    }
    if blank(&values.phone) || blank(&values.email) {
        return false;
    }

    let digits: String = values
        .phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    EMAIL_RE.is_match(values.email.trim()) && PHONE_RE.is_match(&digits)
}

/// Demographics is fully optional and never blocks progress.
pub fn demographics_valid(_values: &DemographicsForm) -> bool {
    true
}

/// Address gate.
pub fn address_valid(values: &AddressForm) -> bool {
    !blank(&values.address_line1)
        && !blank(&values.city)
        && ZIP_RE.is_match(values.zip_code.trim())
}

/// Household gate: situation and the two flags are required, age-bracket
/// counts are optional but must parse when present.
pub fn household_valid(values: &HouseholdForm) -> bool {
    !blank(&values.living_situation)
        && values.has_changes.is_some()
        && values.expecting_child.is_some()
        && count_ok(&values.infants)
        && count_ok(&values.children)
        && count_ok(&values.teens)
        && count_ok(&values.adults)
}

/// Employment gate: branches on the employed flag.
pub fn employment_valid(values: &EmploymentForm) -> bool {
    match values.employed {
        None => false,
        Some(YesNo::Yes) => {
            let Some(kind) = values.employment_type else {
                return false;
            };
            if blank(&values.occupation) || blank(&values.employer_name) {
                return false;
            }
            !kind.requires_business_description() || !blank(&values.self_employment_description)
        }
        Some(YesNo::No) => {
            !blank(&values.previous_occupation) && !blank(&values.previous_employer)
        }
    }
}

/// Dispatch to the validator for `step`.
pub fn step_valid(draft: &Draft, step: StepId) -> bool {
    match step {
        StepId::Eligibility => eligibility_valid(&draft.eligibility),
        StepId::ApplicantInfo => applicant_info_valid(&draft.applicant_info),
        StepId::Demographics => demographics_valid(&draft.demographics),
        StepId::Address => address_valid(&draft.address),
        StepId::Household => household_valid(&draft.household),
        StepId::Employment => employment_valid(&draft.employment),
    }
}
