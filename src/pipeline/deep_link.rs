//! Deep-link query parameters that seed coarse filters at first load.

use serde::Deserialize;

use crate::models::ServiceField;

use super::filter::CoarseFilters;

/// Deep-link parameters recognised on the AOP page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeepLinkParams {
    pub ras_score: Option<String>,
    pub residual_score: Option<String>,
    pub incomplete_plan: Option<String>,
    pub remediation_expired: Option<String>,
    pub invalid_selection: Option<String>,
    pub tech_cyber_review_status: Option<String>,
    pub sensitivity_tier: Option<String>,
}

impl DeepLinkParams {
    /// Collect recognised parameters from raw query pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                "rasScore" => &mut params.ras_score,
                "residualScore" => &mut params.residual_score,
                "incompletePlan" => &mut params.incomplete_plan,
                "remediationExpired" => &mut params.remediation_expired,
                "invalidSelection" => &mut params.invalid_selection,
                "techCyberReviewStatus" => &mut params.tech_cyber_review_status,
                "sensitivityTier" => &mut params.sensitivity_tier,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        params
    }

    /// Seed coarse filters. Returns true when anything was seeded, which
    /// calls for one automatic coarse application.
    pub fn seed(&self, filters: &mut CoarseFilters) -> bool {
        let mut seeded = false;

        let literals = [
            (ServiceField::RasScore, &self.ras_score),
            (ServiceField::ResidualScore, &self.residual_score),
            (ServiceField::SensitivityTier, &self.sensitivity_tier),
        ];
        for (field, value) in literals {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                filters.set(field, [value]);
                seeded = true;
            }
        }

        let flags = [
            (ServiceField::IncompletePlan, &self.incomplete_plan),
            (ServiceField::RemediationExpired, &self.remediation_expired),
            (ServiceField::InvalidSelection, &self.invalid_selection),
            (ServiceField::TechCyberReviewStatus, &self.tech_cyber_review_status),
        ];
        for (field, value) in flags {
            if value.as_deref() == Some("true") {
                filters.set(field, ["true"]);
                seeded = true;
            }
        }

        seeded
    }
}

/// Build an AOP page link that deep-links a single filter.
pub fn aop_link(field: ServiceField, value: &str) -> String {
    format!("/aop?{}={}", field.key(), urlencoding::encode(value))
}
