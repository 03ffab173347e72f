//! Service inventory records.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Service criticality category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Critical,
    #[serde(rename = "Non-critical")]
    NonCritical,
    SaaS,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Critical, Self::NonCritical, Self::SaaS];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::NonCritical => "Non-critical",
            Self::SaaS => "SaaS",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    pub const ALL: [Risk; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RAS / residual risk rating.
///
/// Ordered by severity: `Extreme` is the greatest value and `SaasCompliant`
/// the least, so an ascending sort lists the least severe services first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Score {
    Extreme,
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Insignificant,
    Compliant,
    #[serde(rename = "SaaS-Compliant")]
    SaasCompliant,
}

impl Score {
    /// Every score, most severe first (heat map order).
    pub const BY_SEVERITY: [Score; 7] = [
        Self::Extreme,
        Self::VeryHigh,
        Self::High,
        Self::Medium,
        Self::Insignificant,
        Self::Compliant,
        Self::SaasCompliant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extreme => "Extreme",
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Insignificant => "Insignificant",
            Self::Compliant => "Compliant",
            Self::SaasCompliant => "SaaS-Compliant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::BY_SEVERITY
            .into_iter()
            .find(|score| score.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Severity rank, 0 for `SaasCompliant` up to 6 for `Extreme`.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Extreme => 6,
            Self::VeryHigh => 5,
            Self::High => 4,
            Self::Medium => 3,
            Self::Insignificant => 2,
            Self::Compliant => 1,
            Self::SaasCompliant => 0,
        }
    }

    /// CSS class for heat map cells.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Extreme => "score-extreme",
            Self::VeryHigh => "score-very-high",
            Self::High => "score-high",
            Self::Medium => "score-medium",
            Self::Insignificant => "score-insignificant",
            Self::Compliant => "score-compliant",
            Self::SaasCompliant => "score-saas-compliant",
        }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fiscal-year remediation treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemediationPlan {
    Managed,
    Retired,
    Corrective,
    Decommissioned,
    Preventive,
    #[serde(rename = "Risk Accepted")]
    RiskAccepted,
}

impl RemediationPlan {
    pub const ALL: [RemediationPlan; 6] = [
        Self::Managed,
        Self::Retired,
        Self::Corrective,
        Self::Decommissioned,
        Self::Preventive,
        Self::RiskAccepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "Managed",
            Self::Retired => "Retired",
            Self::Corrective => "Corrective",
            Self::Decommissioned => "Decommissioned",
            Self::Preventive => "Preventive",
            Self::RiskAccepted => "Risk Accepted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for RemediationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remediation and review details captured by the bulk update dialog.
///
/// None of these are table columns; they travel with the record and are
/// written back by updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationDetails {
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

impl RemediationDetails {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A service in the EoS inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service CI; unique across the dataset.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub service_owner: String,
    #[serde(default)]
    pub service_manager: String,
    pub category: Category,
    pub risk: Risk,
    #[serde(default)]
    pub eos_date: String,
    #[serde(default)]
    pub ras_score: Option<Score>,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub residual_score: Option<Score>,
    #[serde(default)]
    pub sensitivity_tier: String,
    #[serde(default)]
    pub tech_cyber_review_status: bool,
    #[serde(default)]
    pub incomplete_plan: bool,
    #[serde(default)]
    pub remediation_expired: bool,
    #[serde(default)]
    pub invalid_selection: bool,
    #[serde(default, skip_serializing_if = "RemediationDetails::is_empty")]
    pub remediation: RemediationDetails,
}

impl Service {
    /// Create a service with the required fields; everything else defaults.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: Category, risk: Risk) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            division: String::new(),
            service_owner: String::new(),
            service_manager: String::new(),
            category,
            risk,
            eos_date: String::new(),
            ras_score: None,
            plan: String::new(),
            residual_score: None,
            sensitivity_tier: String::new(),
            tech_cyber_review_status: false,
            incomplete_plan: false,
            remediation_expired: false,
            invalid_selection: false,
            remediation: RemediationDetails::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults_missing_flags() {
        let json = r#"{
            "id": "CI001",
            "name": "Payroll",
            "category": "Non-critical",
            "risk": "High",
            "rasScore": "Very High"
        }"#;
        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.category, Category::NonCritical);
        assert_eq!(service.ras_score, Some(Score::VeryHigh));
        assert_eq!(service.residual_score, None);
        assert!(!service.incomplete_plan);
        assert!(!service.tech_cyber_review_status);
        assert!(service.remediation.is_empty());
    }

    #[test]
    fn test_score_ordering_follows_severity() {
        assert!(Score::Extreme > Score::VeryHigh);
        assert!(Score::Compliant > Score::SaasCompliant);
        let mut scores = Score::BY_SEVERITY.to_vec();
        scores.sort();
        assert_eq!(scores.first(), Some(&Score::SaasCompliant));
        assert_eq!(scores.last(), Some(&Score::Extreme));
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(Score::from_str("very high"), Some(Score::VeryHigh));
        assert_eq!(Category::from_str("saas"), Some(Category::SaaS));
        assert_eq!(RemediationPlan::from_str("Risk Accepted"), Some(RemediationPlan::RiskAccepted));
        assert_eq!(Risk::from_str("unknown"), None);
    }

    #[test]
    fn test_remediation_details_round_trip_keys() {
        let mut service = Service::new("CI1", "A", Category::Critical, Risk::Low);
        service.remediation.risk_fy = Some(RemediationPlan::Managed);
        let value = serde_json::to_value(&service).unwrap();
        assert_eq!(value["remediation"]["riskFY"], "Managed");
        assert_eq!(value["rasScore"], serde_json::Value::Null);
    }
}
