//! Closed set of table columns with a lookup table from column to accessor.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;

use super::service::Service;
use crate::forms::parse_date;

/// A flat, column-addressable field of [`Service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceField {
    Id,
    Name,
    Division,
    ServiceOwner,
    ServiceManager,
    Category,
    Risk,
    EosDate,
    RasScore,
    Plan,
    ResidualScore,
    SensitivityTier,
    TechCyberReviewStatus,
    IncompletePlan,
    RemediationExpired,
    InvalidSelection,
}

/// Typed sort key for a single field value.
///
/// Every field maps to exactly one variant, so comparisons never mix variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Text(&'a str),
    Flag(bool),
    Rank(Option<u8>),
    /// DD/MM/YYYY value; unparseable dates sort first.
    Date(Option<NaiveDate>),
}

struct FieldSpec {
    field: ServiceField,
    key: &'static str,
    label: &'static str,
    is_flag: bool,
}

const FIELDS: [FieldSpec; 16] = [
    FieldSpec { field: ServiceField::Id, key: "id", label: "Service CI", is_flag: false },
    FieldSpec { field: ServiceField::Name, key: "name", label: "Service Name", is_flag: false },
    FieldSpec { field: ServiceField::Division, key: "division", label: "Division", is_flag: false },
    FieldSpec { field: ServiceField::ServiceOwner, key: "serviceOwner", label: "Service Owner", is_flag: false },
    FieldSpec { field: ServiceField::ServiceManager, key: "serviceManager", label: "Service Manager", is_flag: false },
    FieldSpec { field: ServiceField::Category, key: "category", label: "Category", is_flag: false },
    FieldSpec { field: ServiceField::Risk, key: "risk", label: "Business Risk", is_flag: false },
    FieldSpec { field: ServiceField::EosDate, key: "eosDate", label: "EoS Date", is_flag: false },
    FieldSpec { field: ServiceField::RasScore, key: "rasScore", label: "RAS Score", is_flag: false },
    FieldSpec { field: ServiceField::Plan, key: "plan", label: "Remediation Plan", is_flag: false },
    FieldSpec { field: ServiceField::ResidualScore, key: "residualScore", label: "Residual Score", is_flag: false },
    FieldSpec { field: ServiceField::SensitivityTier, key: "sensitivityTier", label: "Sensitivity Tier", is_flag: false },
    FieldSpec { field: ServiceField::TechCyberReviewStatus, key: "techCyberReviewStatus", label: "Tech & Cyber Review", is_flag: true },
    FieldSpec { field: ServiceField::IncompletePlan, key: "incompletePlan", label: "Incomplete Plan", is_flag: true },
    FieldSpec { field: ServiceField::RemediationExpired, key: "remediationExpired", label: "Remediation Expired", is_flag: true },
    FieldSpec { field: ServiceField::InvalidSelection, key: "invalidSelection", label: "Invalid Selection", is_flag: true },
];

impl ServiceField {
    /// All fields in canonical (record key) order.
    pub const ALL: [ServiceField; 16] = [
        Self::Id,
        Self::Name,
        Self::Division,
        Self::ServiceOwner,
        Self::ServiceManager,
        Self::Category,
        Self::Risk,
        Self::EosDate,
        Self::RasScore,
        Self::Plan,
        Self::ResidualScore,
        Self::SensitivityTier,
        Self::TechCyberReviewStatus,
        Self::IncompletePlan,
        Self::RemediationExpired,
        Self::InvalidSelection,
    ];

    /// The boolean flag fields.
    pub const FLAGS: [ServiceField; 4] = [
        Self::TechCyberReviewStatus,
        Self::IncompletePlan,
        Self::RemediationExpired,
        Self::InvalidSelection,
    ];

    fn spec(&self) -> &'static FieldSpec {
        &FIELDS[*self as usize]
    }

    /// JSON / query-string key, e.g. `serviceOwner`.
    pub fn key(&self) -> &'static str {
        self.spec().key
    }

    /// Column header label.
    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    pub fn is_flag(&self) -> bool {
        self.spec().is_flag
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FIELDS.iter().find(|spec| spec.key == key).map(|spec| spec.field)
    }

    /// Boolean value of a flag field; `None` for non-flag fields.
    pub fn flag(&self, service: &Service) -> Option<bool> {
        match self {
            Self::TechCyberReviewStatus => Some(service.tech_cyber_review_status),
            Self::IncompletePlan => Some(service.incomplete_plan),
            Self::RemediationExpired => Some(service.remediation_expired),
            Self::InvalidSelection => Some(service.invalid_selection),
            _ => None,
        }
    }

    /// Stringified value used for substring matching and CSV output.
    ///
    /// Flags render as `true`/`false`; a missing score renders empty.
    pub fn value<'a>(&self, service: &'a Service) -> Cow<'a, str> {
        match self {
            Self::Id => Cow::Borrowed(&service.id),
            Self::Name => Cow::Borrowed(&service.name),
            Self::Division => Cow::Borrowed(&service.division),
            Self::ServiceOwner => Cow::Borrowed(&service.service_owner),
            Self::ServiceManager => Cow::Borrowed(&service.service_manager),
            Self::Category => Cow::Borrowed(service.category.as_str()),
            Self::Risk => Cow::Borrowed(service.risk.as_str()),
            Self::EosDate => Cow::Borrowed(&service.eos_date),
            Self::RasScore => Cow::Borrowed(service.ras_score.map(|s| s.as_str()).unwrap_or("")),
            Self::Plan => Cow::Borrowed(&service.plan),
            Self::ResidualScore => {
                Cow::Borrowed(service.residual_score.map(|s| s.as_str()).unwrap_or(""))
            }
            Self::SensitivityTier => Cow::Borrowed(&service.sensitivity_tier),
            Self::TechCyberReviewStatus
            | Self::IncompletePlan
            | Self::RemediationExpired
            | Self::InvalidSelection => {
                let flag = self.flag(service).unwrap_or(false);
                Cow::Borrowed(if flag { "true" } else { "false" })
            }
        }
    }

    /// Value as shown in a table cell (flags as Yes/No).
    pub fn display<'a>(&self, service: &'a Service) -> Cow<'a, str> {
        match self.flag(service) {
            Some(true) => Cow::Borrowed("Yes"),
            Some(false) => Cow::Borrowed("No"),
            None => self.value(service),
        }
    }

    /// Typed key for ordering records by this field.
    pub fn sort_key<'a>(&self, service: &'a Service) -> SortKey<'a> {
        match self {
            Self::Category => SortKey::Text(service.category.as_str()),
            Self::Risk => SortKey::Rank(Some(service.risk as u8)),
            Self::RasScore => SortKey::Rank(service.ras_score.map(|s| s.severity())),
            Self::ResidualScore => SortKey::Rank(service.residual_score.map(|s| s.severity())),
            Self::TechCyberReviewStatus
            | Self::IncompletePlan
            | Self::RemediationExpired
            | Self::InvalidSelection => SortKey::Flag(self.flag(service).unwrap_or(false)),
            Self::Id => SortKey::Text(&service.id),
            Self::Name => SortKey::Text(&service.name),
            Self::Division => SortKey::Text(&service.division),
            Self::ServiceOwner => SortKey::Text(&service.service_owner),
            Self::ServiceManager => SortKey::Text(&service.service_manager),
            Self::EosDate => SortKey::Date(parse_date(&service.eos_date)),
            Self::Plan => SortKey::Text(&service.plan),
            Self::SensitivityTier => SortKey::Text(&service.sensitivity_tier),
        }
    }
}

impl fmt::Display for ServiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk, Score};

    #[test]
    fn test_lookup_table_matches_enum_order() {
        for (i, field) in ServiceField::ALL.iter().enumerate() {
            assert_eq!(FIELDS[i].field, *field);
            assert_eq!(ServiceField::from_key(field.key()), Some(*field));
        }
        assert_eq!(ServiceField::from_key("businessRisk"), None);
    }

    #[test]
    fn test_keys_match_serialized_record() {
        let service = Service::new("CI1", "Payroll", Category::Critical, Risk::Medium);
        let value = serde_json::to_value(&service).unwrap();
        let object = value.as_object().unwrap();
        for field in ServiceField::ALL {
            assert!(object.contains_key(field.key()), "missing key {}", field.key());
        }
    }

    #[test]
    fn test_value_and_display() {
        let mut service = Service::new("CI1", "Payroll", Category::NonCritical, Risk::High);
        service.incomplete_plan = true;
        service.ras_score = Some(Score::VeryHigh);

        assert_eq!(ServiceField::Category.value(&service), "Non-critical");
        assert_eq!(ServiceField::IncompletePlan.value(&service), "true");
        assert_eq!(ServiceField::IncompletePlan.display(&service), "Yes");
        assert_eq!(ServiceField::RemediationExpired.display(&service), "No");
        assert_eq!(ServiceField::RasScore.value(&service), "Very High");
        assert_eq!(ServiceField::ResidualScore.value(&service), "");
    }

    #[test]
    fn test_risk_sort_key_orders_by_level() {
        let low = Service::new("a", "a", Category::Critical, Risk::Low);
        let high = Service::new("b", "b", Category::Critical, Risk::High);
        assert!(ServiceField::Risk.sort_key(&low) < ServiceField::Risk.sort_key(&high));
    }

    #[test]
    fn test_eos_date_sorts_chronologically() {
        let mut earlier = Service::new("a", "a", Category::Critical, Risk::Low);
        earlier.eos_date = "31/01/2024".to_string();
        let mut later = Service::new("b", "b", Category::Critical, Risk::Low);
        later.eos_date = "01/12/2025".to_string();
        let mut unknown = Service::new("c", "c", Category::Critical, Risk::Low);
        unknown.eos_date = "TBC".to_string();

        let field = ServiceField::EosDate;
        assert!(field.sort_key(&earlier) < field.sort_key(&later));
        assert!(field.sort_key(&unknown) < field.sort_key(&earlier));
    }
}
