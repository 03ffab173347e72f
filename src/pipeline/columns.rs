//! Visible column set.

use crate::models::ServiceField;

/// Columns hidden until the user asks for them.
const HIDDEN_BY_DEFAULT: [ServiceField; 5] = [
    ServiceField::SensitivityTier,
    ServiceField::TechCyberReviewStatus,
    ServiceField::IncompletePlan,
    ServiceField::RemediationExpired,
    ServiceField::InvalidSelection,
];

/// Ordered, never-empty set of rendered columns.
///
/// Columns are always kept in canonical field order regardless of the order
/// they were toggled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    visible: Vec<ServiceField>,
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        Self {
            visible: ServiceField::ALL
                .into_iter()
                .filter(|f| !HIDDEN_BY_DEFAULT.contains(f))
                .collect(),
        }
    }
}

impl ColumnVisibility {
    /// Build from an explicit list; falls back to the defaults when empty.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = ServiceField>,
    {
        let mut visible: Vec<ServiceField> = fields.into_iter().collect();
        visible.sort();
        visible.dedup();
        if visible.is_empty() {
            Self::default()
        } else {
            Self { visible }
        }
    }

    /// Show or hide a column. Hiding the last visible column is ignored.
    pub fn toggle_column(&mut self, field: ServiceField) {
        match self.visible.binary_search(&field) {
            Ok(pos) => {
                if self.visible.len() > 1 {
                    self.visible.remove(pos);
                } else {
                    tracing::debug!("Refusing to hide last visible column {}", field);
                }
            }
            Err(pos) => self.visible.insert(pos, field),
        }
    }

    pub fn is_visible(&self, field: ServiceField) -> bool {
        self.visible.binary_search(&field).is_ok()
    }

    pub fn fields(&self) -> &[ServiceField] {
        &self.visible
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}
