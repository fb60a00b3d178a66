//! Records returned by the data service.
//!
//! Field names follow the service's JSON exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A badge registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfidTag {
    /// Owning provider. Null for an unassigned card.
    pub provider_id: Option<u64>,
    pub card_code: String,
    #[serde(default)]
    pub card_status: Option<String>,
}

/// A care provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// A patient assigned to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
}

/// Outcome of a health assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentResult {
    Healthy,
    Unhealthy,
    #[serde(other)]
    Unknown,
}

impl AssessmentResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentResult::Healthy => "HEALTHY",
            AssessmentResult::Unhealthy => "UNHEALTHY",
            AssessmentResult::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AssessmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a provider has acknowledged an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReviewFlag {
    #[serde(rename = "Y")]
    Reviewed,
    #[default]
    #[serde(rename = "N")]
    Pending,
}

/// A health assessment awaiting review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: u64,
    pub patient_id: u64,
    /// Timestamp as sent by the service, usually ISO 8601.
    #[serde(rename = "assessment_dt")]
    pub timestamp: String,
    #[serde(rename = "assessment_result")]
    pub result: AssessmentResult,
    #[serde(default)]
    pub provider_id: Option<u64>,
    #[serde(rename = "provider_reviewed", default)]
    pub reviewed: ReviewFlag,
}

impl Assessment {
    pub fn is_unhealthy(&self) -> bool {
        self.result == AssessmentResult::Unhealthy
    }
}

/// Collection envelope used by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_parse_assessment() {
        let a: Assessment = serde_json::from_value(json!({
            "assessment_id": 11,
            "patient_id": 4,
            "assessment_dt": "2025-03-07T14:05:00Z",
            "assessment_result": "UNHEALTHY",
            "provider_id": 1,
            "provider_reviewed": "N"
        }))
        .unwrap();

        assert_eq!(a.assessment_id, 11);
        assert!(a.is_unhealthy());
        assert_eq!(a.reviewed, ReviewFlag::Pending);
        assert_eq!(a.timestamp, "2025-03-07T14:05:00Z");
    }

    #[test]
    fn test_unknown_result_is_tolerated() {
        let result: AssessmentResult = serde_json::from_value(json!("INCONCLUSIVE")).unwrap();
        assert_eq!(result, AssessmentResult::Unknown);
        assert_eq!(AssessmentResult::Healthy.to_string(), "HEALTHY");
    }

    #[test]
    fn test_unassigned_card() {
        let tag: RfidTag = serde_json::from_value(json!({
            "provider_id": null,
            "card_code": "c908e41134",
            "card_status": "INACTIVE"
        }))
        .unwrap();
        assert_eq!(tag.provider_id, None);
    }

    #[test]
    fn test_patient_list_envelope() {
        let list: ItemList<Patient> = serde_json::from_value(json!({
            "items": [
                {"patient_id": 1, "first_name": "Ada", "last_name": "Lovelace", "birth_date": "1815-12-10"},
                {"patient_id": 2, "first_name": "Alan", "last_name": "Turing", "birth_date": null}
            ]
        }))
        .unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].birth_date, None);
    }

    proptest! {
        #[test]
        fn prop_result_names_match_wire(name in "[A-Z]{1,12}") {
            let result: AssessmentResult = serde_json::from_value(json!(name.clone())).unwrap();
            match name.as_str() {
                "HEALTHY" | "UNHEALTHY" => prop_assert_eq!(result.as_str(), name.as_str()),
                _ => prop_assert_eq!(result, AssessmentResult::Unknown),
            }
        }

        #[test]
        fn prop_card_code_preserved(code in "[a-f0-9]{1,16}", provider in prop::option::of(1u64..10_000)) {
            let tag: RfidTag = serde_json::from_value(json!({
                "provider_id": provider,
                "card_code": code.clone(),
            }))
            .unwrap();
            prop_assert_eq!(tag.card_code, code);
            prop_assert_eq!(tag.provider_id, provider);
            prop_assert_eq!(tag.card_status, None);
        }
    }
}
