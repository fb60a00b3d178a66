//! Display text for each screen.

use chrono::{DateTime, NaiveDateTime};
use medkiosk_client::{Assessment, Patient, Provider};

/// The two display lines of one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lines {
    pub top: String,
    pub bottom: String,
}

impl Lines {
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
        }
    }
}

pub fn scan_prompt() -> Lines {
    Lines::new("Please scan your", "employee badge")
}

pub fn welcome(provider: &Provider) -> Lines {
    let name = short_name(&provider.last_name, &provider.first_name);
    if provider.title.is_empty() {
        return Lines::new("Welcome!", name);
    }
    Lines::new("Welcome!", format!("{}, {}", name, provider.title))
}

pub fn access_denied() -> Lines {
    Lines::new("Access Denied:", "User not found!")
}

pub fn patient(patient: &Patient) -> Lines {
    Lines::new(
        format!("Patient ID: {}", patient.patient_id),
        short_name(&patient.last_name, &patient.first_name),
    )
}

pub fn no_patients() -> Lines {
    Lines::new("No new", "patients found!")
}

pub fn assessment(assessment: &Assessment) -> Lines {
    Lines::new(
        assessment.result.as_str(),
        format_timestamp(&assessment.timestamp),
    )
}

pub fn no_assessments() -> Lines {
    Lines::new("No new", "assessments!")
}

/// `Last, F.`
fn short_name(last: &str, first: &str) -> String {
    match first.chars().next() {
        Some(initial) => format!("{}, {}.", last, initial),
        None => last.to_string(),
    }
}

/// Renders an ISO 8601 timestamp as `MM/DD/YY H:MMAM`.
///
/// The wall-clock time is shown as sent, without zone conversion. Anything
/// that does not parse is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%m/%d/%y %-I:%M%p";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_local().format(DISPLAY).to_string();
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map(|parsed| parsed.format(DISPLAY).to_string())
        .unwrap_or_else(|| raw.to_string())
}
