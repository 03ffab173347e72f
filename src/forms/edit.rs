//! Single-record edit page.

use serde::{Deserialize, Deserializer};

use super::update::{ServiceUpdate, UpdateError};
use crate::models::{Category, Risk, Score, Service};

fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(value.as_deref(), Some("on" | "true" | "1")))
}

/// Editable fields of one service. id, name and eosDate are read-only and
/// not part of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditForm {
    pub category: String,
    pub business_risk: String,
    pub ras_score: String,
    pub plan: String,
    pub residual_score: String,
    #[serde(deserialize_with = "checkbox")]
    pub incomplete_plan: bool,
    #[serde(deserialize_with = "checkbox")]
    pub remediation_expired: bool,
    #[serde(deserialize_with = "checkbox")]
    pub invalid_selection: bool,
}

impl EditForm {
    pub fn from_service(service: &Service) -> Self {
        Self {
            category: service.category.as_str().to_string(),
            business_risk: service.risk.as_str().to_string(),
            ras_score: service.ras_score.map(|s| s.as_str().to_string()).unwrap_or_default(),
            plan: service.plan.clone(),
            residual_score: service
                .residual_score
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            incomplete_plan: service.incomplete_plan,
            remediation_expired: service.remediation_expired,
            invalid_selection: service.invalid_selection,
        }
    }

    /// Update holding only the fields that differ from `original`.
    ///
    /// A blank score leaves the stored score as it is.
    pub fn to_update(&self, original: &Service) -> Result<ServiceUpdate, UpdateError> {
        let category = Category::from_str(self.category.trim()).ok_or_else(|| {
            UpdateError::InvalidValue {
                field: "category",
                value: self.category.clone(),
            }
        })?;
        let risk = Risk::from_str(self.business_risk.trim()).ok_or_else(|| {
            UpdateError::InvalidValue {
                field: "businessRisk",
                value: self.business_risk.clone(),
            }
        })?;
        let ras_score = parse_score(&self.ras_score, "rasScore")?;
        let residual_score = parse_score(&self.residual_score, "residualScore")?;

        Ok(ServiceUpdate {
            category: changed(category, original.category),
            risk: changed(risk, original.risk),
            ras_score: ras_score.filter(|s| original.ras_score != Some(*s)),
            residual_score: residual_score.filter(|s| original.residual_score != Some(*s)),
            plan: changed(self.plan.trim().to_string(), original.plan.clone()),
            incomplete_plan: changed(self.incomplete_plan, original.incomplete_plan),
            remediation_expired: changed(self.remediation_expired, original.remediation_expired),
            invalid_selection: changed(self.invalid_selection, original.invalid_selection),
            ..Default::default()
        })
    }
}

fn changed<T: PartialEq>(value: T, current: T) -> Option<T> {
    (value != current).then_some(value)
}

fn parse_score(raw: &str, field: &'static str) -> Result<Option<Score>, UpdateError> {
    let v = raw.trim();
    if v.is_empty() {
        return Ok(None);
    }
    Score::from_str(v)
        .map(Some)
        .ok_or_else(|| UpdateError::InvalidValue {
            field,
            value: v.to_string(),
        })
}

/// Outcome of resolving `/edit/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPage {
    Found { service: Service, form: EditForm },
    NotFound { id: String },
}

impl EditPage {
    pub fn resolve(id: &str, found: Option<Service>) -> Self {
        match found {
            Some(service) => {
                let form = EditForm::from_service(&service);
                Self::Found { service, form }
            }
            None => {
                tracing::debug!("Edit requested for unknown service {}", id);
                Self::NotFound { id: id.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Service {
        let mut s = Service::new("CI1", "Payroll", Category::Critical, Risk::Low);
        s.ras_score = Some(Score::High);
        s.plan = "Upgrade".to_string();
        s
    }

    #[test]
    fn test_unchanged_form_yields_empty_update() {
        let original = service();
        let form = EditForm::from_service(&original);
        assert!(form.to_update(&original).unwrap().is_empty());
    }

    #[test]
    fn test_only_changed_fields_are_sent() {
        let original = service();
        let mut form = EditForm::from_service(&original);
        form.business_risk = "High".to_string();
        form.remediation_expired = true;

        let update = form.to_update(&original).unwrap();
        let mut fields = update.touched_fields();
        fields.sort();
        assert_eq!(fields, ["businessRisk", "remediationExpired"]);
    }

    #[test]
    fn test_unknown_score_rejected() {
        let original = service();
        let mut form = EditForm::from_service(&original);
        form.residual_score = "Severe".to_string();
        let err = form.to_update(&original).unwrap_err();
        assert!(matches!(err, UpdateError::InvalidValue { field: "residualScore", .. }));
    }

    #[test]
    fn test_checkbox_deserialization() {
        let form: EditForm = serde_json::from_str(
            r#"{"category": "SaaS", "business_risk": "Low", "incomplete_plan": "on"}"#,
        )
        .unwrap();
        assert!(form.incomplete_plan);
        assert!(!form.invalid_selection);
    }

    #[test]
    fn test_resolve_missing_id() {
        assert_eq!(
            EditPage::resolve("CI404", None),
            EditPage::NotFound { id: "CI404".to_string() }
        );
    }
}
