//! Bulk update dialog: raw form input, validation and submission.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::date::{parse_date, DATE_FORMAT_HINT};
use super::update::{ServiceUpdate, UpdateError};
use crate::models::{RemediationPlan, Risk};
use crate::repository::ServiceStore;
use crate::utils::BusyFlag;

/// Select option meaning "keep the current value".
pub const NO_CHANGE: &str = "no_change";

/// Date inputs validated per field: (form field, update key).
const DATE_FIELDS: [(&str, &str); 2] = [
    ("planned_address_date", "plannedAddressDate"),
    ("review_date", "reviewDate"),
];

/// Raw dialog input as posted by the browser.
///
/// Every field is a string; an empty value or [`NO_CHANGE`] leaves the
/// target field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BulkUpdateForm {
    pub business_risk: String,
    pub planned_address_date: String,
    pub risk_fy: String,
    pub risk_fy_plus1: String,
    pub risk_fy_plus2: String,
    pub risk_fy_plus3: String,
    pub additional_treatment_commentary: String,
    pub risk_acceptance_rationale: String,
    pub eos_conditions_for_non_onboarded_assets: String,
    pub impact_if_compromised: String,
    pub tech_cyber_review_status: String,
    pub review_date: String,
    pub suggested_action: String,
    pub risk_steward_comments: String,
    pub nfrc: String,
    pub evidence_url: String,
}

fn touched(raw: &str) -> Option<&str> {
    let v = raw.trim();
    if v.is_empty() || v == NO_CHANGE {
        None
    } else {
        Some(v)
    }
}

fn text(raw: &str) -> Option<String> {
    touched(raw).map(str::to_string)
}

fn plan(raw: &str, field: &'static str) -> Result<Option<RemediationPlan>, UpdateError> {
    touched(raw)
        .map(|v| {
            RemediationPlan::from_str(v).ok_or_else(|| UpdateError::InvalidValue {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

fn date(raw: &str, field: &'static str) -> Result<Option<String>, UpdateError> {
    match touched(raw) {
        None => Ok(None),
        Some(v) if parse_date(v).is_some() => Ok(Some(v.to_string())),
        Some(v) => Err(UpdateError::InvalidDate {
            field,
            value: v.to_string(),
        }),
    }
}

impl BulkUpdateForm {
    fn raw(&self, name: &str) -> Option<&String> {
        match name {
            "planned_address_date" => Some(&self.planned_address_date),
            "review_date" => Some(&self.review_date),
            _ => None,
        }
    }

    /// Inline messages for date fields holding an invalid value, keyed by
    /// form field name.
    pub fn date_errors(&self) -> BTreeMap<&'static str, &'static str> {
        DATE_FIELDS
            .iter()
            .filter_map(|(name, _)| {
                let value = touched(self.raw(name)?)?;
                parse_date(value).is_none().then_some((*name, DATE_FORMAT_HINT))
            })
            .collect()
    }

    /// Convert touched inputs into a partial update.
    pub fn to_update(&self) -> Result<ServiceUpdate, UpdateError> {
        let risk = touched(&self.business_risk)
            .map(|v| {
                Risk::from_str(v).ok_or_else(|| UpdateError::InvalidValue {
                    field: "businessRisk",
                    value: v.to_string(),
                })
            })
            .transpose()?;

        let tech_cyber_review_status = match touched(&self.tech_cyber_review_status) {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
            Some(v) => {
                return Err(UpdateError::InvalidValue {
                    field: "techCyberReviewStatus",
                    value: v.to_string(),
                })
            }
        };

        Ok(ServiceUpdate {
            risk,
            tech_cyber_review_status,
            planned_address_date: date(&self.planned_address_date, DATE_FIELDS[0].1)?,
            review_date: date(&self.review_date, DATE_FIELDS[1].1)?,
            risk_fy: plan(&self.risk_fy, "riskFY")?,
            risk_fy_plus1: plan(&self.risk_fy_plus1, "riskFYPlus1")?,
            risk_fy_plus2: plan(&self.risk_fy_plus2, "riskFYPlus2")?,
            risk_fy_plus3: plan(&self.risk_fy_plus3, "riskFYPlus3")?,
            additional_treatment_commentary: text(&self.additional_treatment_commentary),
            risk_acceptance_rationale: text(&self.risk_acceptance_rationale),
            eos_conditions_for_non_onboarded_assets: text(
                &self.eos_conditions_for_non_onboarded_assets,
            ),
            impact_if_compromised: text(&self.impact_if_compromised),
            suggested_action: text(&self.suggested_action),
            risk_steward_comments: text(&self.risk_steward_comments),
            nfrc: text(&self.nfrc),
            evidence_url: text(&self.evidence_url),
            ..Default::default()
        })
    }
}

/// Dialog state for applying one partial update to the selected services.
#[derive(Debug, Default)]
pub struct BulkUpdateDialog {
    open: bool,
    form: BulkUpdateForm,
    busy: BusyFlag,
    last_error: Option<String>,
}

impl BulkUpdateDialog {
    /// Dialog sharing `busy` with every other submitter of the same store.
    pub fn new(busy: BusyFlag) -> Self {
        Self {
            busy,
            ..Default::default()
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_updating(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn form(&self) -> &BulkUpdateForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BulkUpdateForm {
        &mut self.form
    }

    pub fn set_form(&mut self, form: BulkUpdateForm) {
        self.form = form;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Submit the current form for `ids`.
    ///
    /// On success the dialog closes and the form resets. On failure the
    /// dialog stays open with its input intact.
    pub async fn submit(
        &mut self,
        ids: &[String],
        store: &dyn ServiceStore,
    ) -> Result<usize, UpdateError> {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::warn!("Bulk update rejected: another update is in flight");
            return Err(UpdateError::Busy);
        };

        let result = match self.form.to_update() {
            Ok(update) => store.apply_update(ids, &update).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(updated) => {
                self.open = false;
                self.form = BulkUpdateForm::default();
                self.last_error = None;
                Ok(updated)
            }
            Err(e) => {
                if matches!(e, UpdateError::InvalidDate { .. }) {
                    tracing::debug!("Bulk update blocked: {}", e);
                } else {
                    tracing::error!("Error updating services: {}", e);
                }
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Service};
    use crate::repository::{DatasetStore, ServiceDataset};

    fn store() -> DatasetStore {
        DatasetStore::new(
            ServiceDataset::from_services(vec![
                Service::new("CI1", "Payroll", Category::Critical, Risk::Low),
                Service::new("CI2", "Portal", Category::SaaS, Risk::Medium),
            ])
            .unwrap(),
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_change_fields_are_untouched() {
        let form = BulkUpdateForm {
            business_risk: NO_CHANGE.to_string(),
            risk_fy: NO_CHANGE.to_string(),
            nfrc: "  ".to_string(),
            ..Default::default()
        };
        assert!(form.to_update().unwrap().is_empty());
    }

    #[test]
    fn test_touched_fields_are_parsed() {
        let form = BulkUpdateForm {
            business_risk: "High".to_string(),
            risk_fy_plus2: "Risk Accepted".to_string(),
            tech_cyber_review_status: "true".to_string(),
            review_date: "29/02/2024".to_string(),
            ..Default::default()
        };
        let update = form.to_update().unwrap();
        assert_eq!(update.risk, Some(Risk::High));
        assert_eq!(update.risk_fy_plus2, Some(RemediationPlan::RiskAccepted));
        assert_eq!(update.tech_cyber_review_status, Some(true));
        assert_eq!(update.review_date.as_deref(), Some("29/02/2024"));
    }

    #[test]
    fn test_date_errors_are_field_level() {
        let form = BulkUpdateForm {
            planned_address_date: "31/02/2024".to_string(),
            review_date: "01/01/2024".to_string(),
            ..Default::default()
        };
        let errors = form.date_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("planned_address_date"), Some(&DATE_FORMAT_HINT));
    }

    #[tokio::test]
    async fn test_success_closes_and_resets() {
        let store = store();
        let mut dialog = BulkUpdateDialog::new(BusyFlag::new());
        dialog.open();
        dialog.form_mut().business_risk = "High".to_string();

        let updated = dialog.submit(&ids(&["CI1", "CI2"]), &store).await.unwrap();

        assert_eq!(updated, 2);
        assert!(!dialog.is_open());
        assert_eq!(dialog.form(), &BulkUpdateForm::default());
        assert!(!dialog.is_updating());
        assert_eq!(store.get("CI2").await.unwrap().risk, Risk::High);
    }

    #[tokio::test]
    async fn test_invalid_date_keeps_dialog_open() {
        let store = store();
        let mut dialog = BulkUpdateDialog::new(BusyFlag::new());
        dialog.open();
        dialog.form_mut().review_date = "15/13/2024".to_string();
        dialog.form_mut().nfrc = "NFRC-7".to_string();

        let err = dialog.submit(&ids(&["CI1"]), &store).await.unwrap_err();

        assert!(matches!(err, UpdateError::InvalidDate { field: "reviewDate", .. }));
        assert!(dialog.is_open());
        assert_eq!(dialog.form().nfrc, "NFRC-7");
        assert!(dialog.last_error().is_some());
        assert!(store.get("CI1").await.unwrap().remediation.nfrc.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_input() {
        let store = store();
        let mut dialog = BulkUpdateDialog::new(BusyFlag::new());
        dialog.open();
        dialog.form_mut().business_risk = "High".to_string();

        let err = dialog.submit(&ids(&["GONE"]), &store).await.unwrap_err();

        assert!(matches!(err, UpdateError::NotFound(_)));
        assert!(dialog.is_open());
        assert_eq!(dialog.form().business_risk, "High");
    }

    #[tokio::test]
    async fn test_rejected_while_busy() {
        let store = store();
        let busy = BusyFlag::new();
        let _held = busy.try_acquire().unwrap();
        let mut dialog = BulkUpdateDialog::new(busy.clone());
        dialog.form_mut().business_risk = "High".to_string();

        let err = dialog.submit(&ids(&["CI1"]), &store).await.unwrap_err();

        assert!(matches!(err, UpdateError::Busy));
        assert_eq!(store.get("CI1").await.unwrap().risk, Risk::Low);
    }
}
