//! Partial service updates shared by the bulk and single-record forms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::date::parse_date;
use crate::models::{Category, RemediationPlan, Risk, Score, Service};

/// Errors surfaced by update submissions.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("An update is already in progress")]
    Busy,

    #[error("No services selected")]
    NothingSelected,

    #[error("Unknown service ids: {}", .0.join(", "))]
    NotFound(Vec<String>),

    #[error("Invalid date for {field}: {value} (expected DD/MM/YYYY)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Failed to persist dataset: {0}")]
    Persist(String),
}

/// Fields to change on each target record.
///
/// `None` means "keep the current value"; only touched fields are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    #[serde(default, rename = "businessRisk", skip_serializing_if = "Option::is_none")]
    pub risk: Option<Risk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ras_score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_score: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_plan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_selection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_cyber_review_status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_address_date: Option<String>,
    #[serde(default, rename = "riskFY", skip_serializing_if = "Option::is_none")]
    pub risk_fy: Option<RemediationPlan>,
    #[serde(default, rename = "riskFYPlus1", skip_serializing_if = "Option::is_none")]
    pub risk_fy_plus1: Option<RemediationPlan>,
    #[serde(default, rename = "riskFYPlus2", skip_serializing_if = "Option::is_none")]
    pub risk_fy_plus2: Option<RemediationPlan>,
    #[serde(default, rename = "riskFYPlus3", skip_serializing_if = "Option::is_none")]
    pub risk_fy_plus3: Option<RemediationPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_treatment_commentary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_acceptance_rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eos_conditions_for_non_onboarded_assets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_if_compromised: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_steward_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfrc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}

impl ServiceUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the fields this update touches.
    pub fn touched_fields(&self) -> Vec<String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Reject touched date fields that are not valid DD/MM/YYYY dates.
    pub fn validate(&self) -> Result<(), UpdateError> {
        let dates = [
            ("plannedAddressDate", &self.planned_address_date),
            ("reviewDate", &self.review_date),
        ];
        for (field, value) in dates {
            if let Some(value) = value {
                if parse_date(value).is_none() {
                    return Err(UpdateError::InvalidDate {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Write touched fields onto a record, leaving everything else alone.
    pub fn apply(&self, service: &mut Service) {
        set(&mut service.risk, &self.risk);
        set(&mut service.category, &self.category);
        set_opt(&mut service.ras_score, &self.ras_score);
        set_opt(&mut service.residual_score, &self.residual_score);
        set(&mut service.plan, &self.plan);
        set(&mut service.incomplete_plan, &self.incomplete_plan);
        set(&mut service.remediation_expired, &self.remediation_expired);
        set(&mut service.invalid_selection, &self.invalid_selection);
        set(&mut service.tech_cyber_review_status, &self.tech_cyber_review_status);

        let details = &mut service.remediation;
        set_opt(&mut details.planned_address_date, &self.planned_address_date);
        set_opt(&mut details.risk_fy, &self.risk_fy);
        set_opt(&mut details.risk_fy_plus1, &self.risk_fy_plus1);
        set_opt(&mut details.risk_fy_plus2, &self.risk_fy_plus2);
        set_opt(&mut details.risk_fy_plus3, &self.risk_fy_plus3);
        set_opt(
            &mut details.additional_treatment_commentary,
            &self.additional_treatment_commentary,
        );
        set_opt(&mut details.risk_acceptance_rationale, &self.risk_acceptance_rationale);
        set_opt(
            &mut details.eos_conditions_for_non_onboarded_assets,
            &self.eos_conditions_for_non_onboarded_assets,
        );
        set_opt(&mut details.impact_if_compromised, &self.impact_if_compromised);
        set_opt(&mut details.review_date, &self.review_date);
        set_opt(&mut details.suggested_action, &self.suggested_action);
        set_opt(&mut details.risk_steward_comments, &self.risk_steward_comments);
        set_opt(&mut details.nfrc, &self.nfrc);
        set_opt(&mut details.evidence_url, &self.evidence_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_touches_set_fields() {
        let mut service = Service::new("CI1", "Payroll", Category::Critical, Risk::Low);
        service.plan = "Upgrade".to_string();
        service.incomplete_plan = true;
        let before = service.clone();

        let update = ServiceUpdate {
            risk: Some(Risk::High),
            ..Default::default()
        };
        update.apply(&mut service);

        assert_eq!(service.risk, Risk::High);
        let mut expected = before;
        expected.risk = Risk::High;
        assert_eq!(service, expected);
    }

    #[test]
    fn test_business_risk_key() {
        let update: ServiceUpdate = serde_json::from_str(r#"{"businessRisk": "High"}"#).unwrap();
        assert_eq!(update.risk, Some(Risk::High));
        assert_eq!(update.touched_fields(), ["businessRisk"]);
    }

    #[test]
    fn test_validate_dates() {
        let ok: ServiceUpdate = serde_json::from_str(r#"{"reviewDate": "29/02/2024"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let bad: ServiceUpdate =
            serde_json::from_str(r#"{"plannedAddressDate": "31/02/2024"}"#).unwrap();
        assert!(matches!(
            bad.validate(),
            Err(UpdateError::InvalidDate { field: "plannedAddressDate", .. })
        ));
    }

    #[test]
    fn test_empty_update() {
        assert!(ServiceUpdate::default().is_empty());
        assert!(ServiceUpdate::default().touched_fields().is_empty());
    }
}
