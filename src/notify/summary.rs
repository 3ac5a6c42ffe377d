//! Builds the notification messages for a submitted application.
//!
//! Everything user-facing is derived from one label/value list so the HTML
//! and plain-text renderings can never diverge in content. All user-supplied
//! text is HTML-escaped before interpolation.

use rand::Rng;

use crate::models::{
    AssistanceType, HouseholdMember, SubmissionRequest, YesNo,
};

const NOT_PROVIDED: &str = "Not provided";

/// One row of the application summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub label: &'static str,
    pub value: String,
}

/// Subject and parallel bodies of a notification, not yet addressed.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl MessageContent {
    /// Address this content to a concrete recipient.
    pub fn addressed_to(&self, recipient: &str) -> super::OutboundMessage {
        super::OutboundMessage {
            to: recipient.to_string(),
            subject: self.subject.clone(),
            html: self.html.clone(),
            text: self.text.clone(),
        }
    }
}

/// Escape the five HTML special characters.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for character in input.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn value_or_default(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        trimmed.to_string()
    }
}

fn yes_no_label(value: Option<YesNo>) -> &'static str {
    match value {
        Some(YesNo::Yes) => "Yes",
        Some(YesNo::No) => "No",
        None => NOT_PROVIDED,
    }
}

fn join_nonblank(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn members_display(members: &[HouseholdMember]) -> String {
    if members.is_empty() {
        return "None".to_string();
    }

    members
        .iter()
        .map(|member| {
            let mut display = value_or_default(&member.name);
            let detail = join_nonblank(&[&member.age, &member.relationship], ", ");
            if !detail.is_empty() {
                display.push_str(&format!(" ({})", detail));
            }
            display
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Generate the human-facing 8-digit application reference. Display-only:
/// collisions are possible and tolerated.
pub fn generate_application_number() -> String {
    rand::thread_rng().gen_range(10_000_000u32..=99_999_999).to_string()
}

/// Produce the label/value summary of one submission.
///
/// Blank answers fall back to "Not provided"; entries that only apply to a
/// particular employment situation are appended conditionally.
pub fn build_summary(request: &SubmissionRequest) -> Vec<SummaryEntry> {
    let applicant = &request.applicant_info;
    let eligibility = &request.eligibility;
    let address = &request.address;
    let household = &request.household;
    let employment = &request.employment;

    let full_name = join_nonblank(&[&applicant.first_name, &applicant.last_name], " ");

    let assistance_label = match eligibility.assistance_type {
        Some(AssistanceType::Moving) => "New apartment".to_string(),
        Some(AssistanceType::PastDue) => "Past-due rent (unsupported)".to_string(),
        None => NOT_PROVIDED.to_string(),
    };

    let detected = join_nonblank(
        &[
            &eligibility.detected_city,
            &eligibility.detected_region,
            &eligibility.detected_region_code,
        ],
        " ",
    );

    let current_city = if eligibility.actual_city.trim().is_empty() {
        value_or_default(&eligibility.detected_city)
    } else {
        value_or_default(&eligibility.actual_city)
    };

    let new_apartment_address = match eligibility.assistance_type {
        Some(AssistanceType::Moving) => {
            let joined = join_nonblank(
                &[
                    &eligibility.new_apartment_street,
                    &eligibility.new_apartment_unit,
                    &eligibility.new_apartment_city,
                    &eligibility.new_apartment_state,
                    &eligibility.new_apartment_zip,
                ],
                ", ",
            );
            if joined.is_empty() {
                "Pending applicant".to_string()
            } else {
                joined
            }
        }
        _ => "Not requested".to_string(),
    };

    let new_apartment_confirmation = match eligibility.assistance_type {
        Some(AssistanceType::Moving) => {
            yes_no_label(eligibility.new_apartment_address_confirmation).to_string()
        }
        _ => "Not requested".to_string(),
    };

    let counts = format!(
        "{}/{}/{}/{}",
        value_or_default(&household.infants),
        value_or_default(&household.children),
        value_or_default(&household.teens),
        value_or_default(&household.adults),
    );

    let employment_status = match employment.employed {
        Some(YesNo::Yes) => "Employed",
        Some(YesNo::No) => "Not employed",
        None => NOT_PROVIDED,
    };

    let employment_type = employment
        .employment_type
        .map(|kind| kind.label().to_string())
        .unwrap_or_else(|| NOT_PROVIDED.to_string());

    let current_address = {
        let joined = join_nonblank(
            &[
                &address.address_line1,
                &address.unit,
                &address.city,
                &address.zip_code,
            ],
            ", ",
        );
        if joined.is_empty() {
            NOT_PROVIDED.to_string()
        } else {
            joined
        }
    };

    let mut entries = vec![
        SummaryEntry {
            label: "Applicant name",
            value: value_or_default(&full_name),
        },
        SummaryEntry {
            label: "Applicant email",
            value: value_or_default(&applicant.email),
        },
        SummaryEntry {
            label: "Phone",
            value: value_or_default(&applicant.phone),
        },
        SummaryEntry {
            label: "Date of birth",
            value: value_or_default(&applicant.date_of_birth),
        },
        SummaryEntry {
            label: "Gender",
            value: value_or_default(&applicant.gender),
        },
        SummaryEntry {
            label: "Pronouns",
            value: value_or_default(&applicant.pronouns),
        },
        SummaryEntry {
            label: "Referral source",
            value: applicant
                .referral_source
                .map(|source| source.as_str().to_string())
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        },
        SummaryEntry {
            label: "Referral note",
            value: value_or_default(&applicant.referral_note),
        },
        SummaryEntry {
            label: "Assistance since 2020",
            value: yes_no_label(applicant.assistance_since_2020).to_string(),
        },
        SummaryEntry {
            label: "Current address",
            value: current_address,
        },
        SummaryEntry {
            label: "Household size",
            value: value_or_default(&eligibility.household_size),
        },
        SummaryEntry {
            label: "Monthly income",
            value: value_or_default(&eligibility.monthly_income),
        },
        SummaryEntry {
            label: "Assistance type",
            value: assistance_label,
        },
        SummaryEntry {
            label: "Detected city/region",
            value: value_or_default(&detected),
        },
        SummaryEntry {
            label: "Current city",
            value: current_city,
        },
        SummaryEntry {
            label: "Lives in San Francisco",
            value: yes_no_label(eligibility.lives_in_sf).to_string(),
        },
        SummaryEntry {
            label: "New apartment address",
            value: new_apartment_address,
        },
        SummaryEntry {
            label: "Address confirmed",
            value: new_apartment_confirmation,
        },
        SummaryEntry {
            label: "Household living situation",
            value: value_or_default(&household.living_situation),
        },
        SummaryEntry {
            label: "Household members (list)",
            value: members_display(&household.members),
        },
        SummaryEntry {
            label: "Household counts (infants/children/teens/adults)",
            value: counts,
        },
        SummaryEntry {
            label: "Employment status",
            value: employment_status.to_string(),
        },
        SummaryEntry {
            label: "Employment type",
            value: employment_type,
        },
        SummaryEntry {
            label: "Occupation / role",
            value: value_or_default(&employment.occupation),
        },
        SummaryEntry {
            label: "Employer",
            value: value_or_default(&employment.employer_name),
        },
    ];

    if employment
        .employment_type
        .map_or(false, |kind| kind.requires_business_description())
    {
        entries.push(SummaryEntry {
            label: "Business details",
            value: value_or_default(&employment.self_employment_description),
        });
    }

    if employment.employed == Some(YesNo::No) {
        entries.push(SummaryEntry {
            label: "Previous occupation",
            value: value_or_default(&employment.previous_occupation),
        });
        entries.push(SummaryEntry {
            label: "Previous employer",
            value: value_or_default(&employment.previous_employer),
        });
    }

    entries
}

fn summary_table_rows(entries: &[SummaryEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let background = if index % 2 == 0 { "#ffffff" } else { "#f8fafc" };
            let label = escape_html(entry.label);
            let value = escape_html(&entry.value).replace('\n', "<br/>");
            format!(
                "<tr style=\"background:{background};\">\
                 <td style=\"padding:12px 16px;font-weight:600;color:#0f172a;border-bottom:1px solid #e2e8f0;width:40%;\">{label}</td>\
                 <td style=\"padding:12px 16px;color:#334155;border-bottom:1px solid #e2e8f0;\">{value}</td>\
                 </tr>"
            )
        })
        .collect()
}

fn summary_lines(entries: &[SummaryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| format!("{}: {}", entry.label, entry.value))
        .collect()
}

/// The staff-facing summary of a new application.
pub fn staff_notification(request: &SubmissionRequest, application_number: &str) -> MessageContent {
    let entries = build_summary(request);
    let applicant_name = entries[0].value.clone();
    let applicant_email = entries[1].value.clone();

    let subject = format!("New rental assistance application #{}", application_number);

    let html = format!(
        "<div style=\"margin:0;padding:32px;background:#f8fafc;font-family:'Segoe UI',Arial,sans-serif;color:#0f172a;\">\
         <table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" style=\"width:100%;max-width:640px;margin:0 auto;background:#ffffff;border:1px solid #e2e8f0;border-radius:18px;overflow:hidden;\">\
         <tr><td style=\"padding:28px 32px;background:#1d4ed8;color:#ffffff;\">\
         <p style=\"margin:0;font-size:24px;font-weight:600;\">New application received</p>\
         <p style=\"margin:12px 0 0;font-size:14px;\">Application number <strong>#{number}</strong></p>\
         <p style=\"margin:4px 0 0;font-size:14px;\">Submitted by {name} ({email})</p>\
         </td></tr>\
         <tr><td style=\"padding:28px 32px;\">\
         <p style=\"margin:0 0 16px;font-size:16px;font-weight:600;\">Quick summary</p>\
         <table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" style=\"width:100%;border-collapse:collapse;\">{rows}</table>\
         <p style=\"margin:24px 0 0;font-size:13px;color:#64748b;\">Reply to this email to reach the applicant or request more documentation.</p>\
         </td></tr></table></div>",
        number = escape_html(application_number),
        name = escape_html(&applicant_name),
        email = escape_html(&applicant_email),
        rows = summary_table_rows(&entries),
    );

    let mut text_lines = vec![
        format!("Application number: #{}", application_number),
        format!("Applicant: {} ({})", applicant_name, applicant_email),
        String::new(),
    ];
    text_lines.extend(summary_lines(&entries));

    MessageContent {
        subject,
        html,
        text: text_lines.join("\n"),
    }
}

/// The applicant-facing confirmation, including the document checklist and the
/// reply subject line that routes their documents to the right application.
pub fn applicant_confirmation(
    request: &SubmissionRequest,
    application_number: &str,
) -> MessageContent {
    let first_name = request.applicant_info.first_name.trim();
    let greeting_name = if first_name.is_empty() {
        "there".to_string()
    } else {
        first_name.to_string()
    };
    let full_name = join_nonblank(
        &[
            &request.applicant_info.first_name,
            &request.applicant_info.last_name,
        ],
        " ",
    );
    let documents_subject = format!("Application #{} - {}", application_number, full_name);

    let subject = format!(
        "We received your rental assistance application (#{})",
        application_number
    );

    let html = format!(
        "<div style=\"margin:0;padding:32px;background:#f1f5f9;font-family:'Segoe UI',Arial,sans-serif;color:#0f172a;\">\
         <table role=\"presentation\" cellpadding=\"0\" cellspacing=\"0\" style=\"width:100%;max-width:640px;margin:0 auto;background:#ffffff;border:1px solid #e2e8f0;border-radius:18px;overflow:hidden;\">\
         <tr><td style=\"padding:32px;\">\
         <p style=\"margin:0;font-size:14px;color:#64748b;\">Hi {greeting},</p>\
         <p style=\"margin:8px 0 16px;font-size:26px;font-weight:600;\">We received your rental assistance application.</p>\
         <p style=\"margin:0 0 20px;font-size:15px;color:#334155;\">Application <strong>#{number}</strong>. Our team is reviewing your answers now. Expect an update within five business days.</p>\
         <div style=\"margin:0 0 20px;padding:20px;background:#f8fafc;border:1px solid #e2e8f0;border-radius:16px;\">\
         <p style=\"margin:0 0 8px;font-size:13px;font-weight:700;\">What happens next</p>\
         <ul style=\"margin:0;padding:0 0 0 18px;font-size:14px;color:#334155;\">\
         <li>Watch your inbox (and spam folder) for our confirmation within 5 business days.</li>\
         <li>Reply to that email with the documents listed below so we can move faster.</li>\
         <li>Let us know in the reply if anything about your situation changes.</li>\
         </ul></div>\
         <div style=\"margin:0 0 20px;padding:20px;background:#eff6ff;border:1px solid #bfdbfe;border-radius:16px;\">\
         <p style=\"margin:0 0 8px;font-size:13px;font-weight:700;color:#1d4ed8;\">Documents to send</p>\
         <ul style=\"margin:0;padding:0 0 0 18px;font-size:14px;color:#1e3a8a;\">\
         <li>Any valid government ID (front &amp; back clear pictures).</li>\
         <li>Three months of recent bank statements.</li>\
         <li>Most recent W2.</li>\
         </ul>\
         <p style=\"margin:12px 0 0;font-size:13px;color:#1d4ed8;\">Use the subject line <strong>{documents_subject}</strong> so we can match your documents right away.</p>\
         </div>\
         <p style=\"margin:24px 0 0;font-size:14px;color:#334155;\">Warmly,<br/>Rental Assistance Team</p>\
         </td></tr></table></div>",
        greeting = escape_html(&greeting_name),
        number = escape_html(application_number),
        documents_subject = escape_html(&documents_subject),
    );

    let text = [
        format!("Hi {},", greeting_name),
        String::new(),
        "We received your rental assistance application.".to_string(),
        format!("Application number: #{}", application_number),
        String::new(),
        "What happens next:".to_string(),
        "- Watch your inbox (including spam) for our email within 5 business days.".to_string(),
        "- Reply with a valid government ID (front & back), three months of bank statements, and your most recent W2.".to_string(),
        format!(
            "- Use the subject line \"{}\" when you send those documents.",
            documents_subject
        ),
        "- Add any updates about your situation directly in that reply.".to_string(),
        String::new(),
        "We will reach out if we need anything else.".to_string(),
        String::new(),
        "Thanks,".to_string(),
        "Rental Assistance Team".to_string(),
    ]
    .join("\n");

    MessageContent {
        subject,
        html,
        text,
    }
}

/// A staff notification for a contact-form message.
pub fn contact_notification(
    name: &str,
    email: &str,
    subject: &str,
    message: &str,
) -> MessageContent {
    let mail_subject = format!("New contact form message: {}", value_or_default(subject));

    let html = format!(
        "<div style=\"padding:24px;font-family:'Segoe UI',Arial,sans-serif;color:#0f172a;\">\
         <p style=\"margin:0 0 12px;font-size:18px;font-weight:600;\">New contact form message</p>\
         <p style=\"margin:0 0 4px;\"><strong>From:</strong> {name} ({email})</p>\
         <p style=\"margin:0 0 16px;\"><strong>Subject:</strong> {subject}</p>\
         <p style=\"margin:0;white-space:pre-wrap;\">{message}</p>\
         </div>",
        name = escape_html(&value_or_default(name)),
        email = escape_html(&value_or_default(email)),
        subject = escape_html(&value_or_default(subject)),
        message = escape_html(message),
    );

    let text = format!(
        "New contact form message\nFrom: {} ({})\nSubject: {}\n\n{}",
        value_or_default(name),
        value_or_default(email),
        value_or_default(subject),
        message,
    );

    MessageContent {
        subject: mail_subject,
        html,
        text,
    }
}
