//! AOP page state carried in the query string.
//!
//! Every request rebuilds an [`AopController`] from the query, applies at
//! most one [`PageAction`], and renders links that encode the resulting
//! state. Keys:
//!
//! - `f_<column>`: applied coarse filter value (repeatable)
//! - `q_<column>`: live substring filter
//! - `sort`, `dir`: sort column key and `asc`/`desc`
//! - `sel`: selected service id (repeatable)
//! - `cols`: comma-separated visible column keys
//! - `action`: one of `sort:<key>`, `toggle_item:<id>`, `toggle_all`,
//!   `toggle_column:<key>`
//! - `dialog=bulk`: show the bulk update dialog
//!
//! Deep-link keys (`rasScore`, `incompletePlan`, ...) are honored on the
//! request that carries them and never re-emitted; once applied they show up
//! as `f_` filters.

use std::collections::BTreeMap;

use crate::controller::{AopController, PageEvent};
use crate::models::{Service, ServiceField};
use crate::pipeline::{ColumnVisibility, DeepLinkParams, Selection, SortDirection};

pub const COARSE_PREFIX: &str = "f_";
pub const FINE_PREFIX: &str = "q_";

/// One-shot page interaction encoded in a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Sort(ServiceField),
    ToggleItem(String),
    ToggleAll,
    ToggleColumn(ServiceField),
}

impl PageAction {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "toggle_all" {
            return Some(Self::ToggleAll);
        }
        let (kind, arg) = s.split_once(':')?;
        match kind {
            "sort" => ServiceField::from_key(arg).map(Self::Sort),
            "toggle_item" if !arg.is_empty() => Some(Self::ToggleItem(arg.to_string())),
            "toggle_column" => ServiceField::from_key(arg).map(Self::ToggleColumn),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Sort(field) => format!("sort:{}", field.key()),
            Self::ToggleItem(id) => format!("toggle_item:{}", id),
            Self::ToggleAll => "toggle_all".to_string(),
            Self::ToggleColumn(field) => format!("toggle_column:{}", field.key()),
        }
    }

    fn into_event(self) -> PageEvent {
        match self {
            Self::Sort(field) => PageEvent::SortBy(field),
            Self::ToggleItem(id) => PageEvent::ToggleItem(id),
            Self::ToggleAll => PageEvent::ToggleAll,
            Self::ToggleColumn(field) => PageEvent::ToggleColumn(field),
        }
    }
}

/// Parsed AOP page query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    deep_link: DeepLinkParams,
    coarse: BTreeMap<ServiceField, Vec<String>>,
    fine: Vec<(ServiceField, String)>,
    sort: Option<(ServiceField, SortDirection)>,
    selection: Vec<String>,
    columns: Option<Vec<ServiceField>>,
    action: Option<PageAction>,
    pub dialog: bool,
}

impl PageQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut query = Self {
            deep_link: DeepLinkParams::from_pairs(
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ),
            ..Default::default()
        };

        let mut sort_key = None;
        let mut direction = SortDirection::Asc;

        for (key, value) in pairs {
            if let Some(field) = key.strip_prefix(COARSE_PREFIX).and_then(ServiceField::from_key) {
                query.coarse.entry(field).or_default().push(value.clone());
            } else if let Some(field) = key.strip_prefix(FINE_PREFIX).and_then(ServiceField::from_key) {
                query.fine.push((field, value.clone()));
            } else {
                match key.as_str() {
                    "sort" => sort_key = ServiceField::from_key(value),
                    "dir" => direction = SortDirection::from_str(value).unwrap_or_default(),
                    "sel" if !value.is_empty() => query.selection.push(value.clone()),
                    "cols" => {
                        query.columns = Some(
                            value
                                .split(',')
                                .filter_map(|k| ServiceField::from_key(k.trim()))
                                .collect(),
                        )
                    }
                    "action" => query.action = PageAction::parse(value),
                    "dialog" => query.dialog = value == "bulk",
                    _ => {}
                }
            }
        }

        query.sort = sort_key.map(|field| (field, direction));
        query
    }

    /// True when the query carries a one-shot `action`.
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Rebuild page state and apply the pending action, if any.
    pub fn controller(&self, source: Vec<Service>, default_columns: &ColumnVisibility) -> AopController {
        let columns = match self.columns {
            Some(ref fields) => ColumnVisibility::from_fields(fields.iter().copied()),
            None => default_columns.clone(),
        };
        let mut page = AopController::from_deep_link(source, &self.deep_link)
            .with_columns(columns)
            .with_selection(Selection::from_ids(&self.selection));

        for (field, values) in &self.coarse {
            page.dispatch(PageEvent::SetCoarse {
                field: *field,
                values: values.clone(),
            });
        }
        if !self.coarse.is_empty() {
            page.dispatch(PageEvent::Retrieve);
        }

        for (field, pattern) in &self.fine {
            page.dispatch(PageEvent::SetFine {
                field: *field,
                pattern: pattern.clone(),
            });
        }

        if let Some((field, direction)) = self.sort {
            page.dispatch(PageEvent::SortBy(field));
            if direction == SortDirection::Desc {
                page.dispatch(PageEvent::SortBy(field));
            }
        }

        if let Some(action) = self.action.clone() {
            page.dispatch(action.into_event());
        }
        page
    }
}

/// Query pairs that reproduce `page`'s state.
pub fn state_pairs(page: &AopController) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (field, values) in page.applied_filters().active() {
        for value in values {
            pairs.push((format!("{}{}", COARSE_PREFIX, field.key()), value.clone()));
        }
    }
    for (field, pattern) in page.fine_filters().active() {
        pairs.push((format!("{}{}", FINE_PREFIX, field.key()), pattern.to_string()));
    }
    let sort = page.sort();
    if let Some(column) = sort.column {
        pairs.push(("sort".to_string(), column.key().to_string()));
        pairs.push(("dir".to_string(), sort.direction.as_str().to_string()));
    }
    for id in page.selection().ids() {
        pairs.push(("sel".to_string(), id.to_string()));
    }
    let cols: Vec<&str> = page.columns().fields().iter().map(|f| f.key()).collect();
    pairs.push(("cols".to_string(), cols.join(",")));
    pairs
}

/// Encode pairs as a query string (without the leading `?`).
pub fn encode_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a query string produced by [`encode_pairs`]. Malformed escapes are
/// kept verbatim.
pub fn decode_query(query: &str) -> Vec<(String, String)> {
    let decode = |s: &str| {
        let s = s.replace('+', " ");
        urlencoding::decode(&s)
            .map(|d| d.into_owned())
            .unwrap_or(s)
    };
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (decode(k), decode(v)),
            None => (decode(part), String::new()),
        })
        .collect()
}

/// `/aop` link for the current state plus one action.
pub fn action_link(state: &[(String, String)], action: &PageAction) -> String {
    let mut pairs = state.to_vec();
    pairs.push(("action".to_string(), action.encode()));
    format!("/aop?{}", encode_pairs(&pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk};

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn source() -> Vec<Service> {
        let mut a = Service::new("CI1", "Payroll", Category::Critical, Risk::High);
        a.incomplete_plan = true;
        vec![
            a,
            Service::new("CI2", "Portal", Category::SaaS, Risk::Low),
            Service::new("CI3", "Ledger", Category::Critical, Risk::Low),
        ]
    }

    fn ids(page: &AopController) -> Vec<&str> {
        page.rows().iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(PageAction::parse("toggle_all"), Some(PageAction::ToggleAll));
        assert_eq!(
            PageAction::parse("toggle_item:CI:7"),
            Some(PageAction::ToggleItem("CI:7".to_string()))
        );
        assert_eq!(
            PageAction::parse("sort:rasScore"),
            Some(PageAction::Sort(ServiceField::RasScore))
        );
        assert_eq!(PageAction::parse("sort:nope"), None);
    }

    #[test]
    fn test_state_survives_round_trip() {
        let query = PageQuery::from_pairs(&pairs(&[
            ("f_category", "Critical"),
            ("q_name", "l"),
            ("sort", "name"),
            ("dir", "desc"),
            ("sel", "CI3"),
        ]));
        let page = query.controller(source(), &ColumnVisibility::default());
        assert_eq!(ids(&page), ["CI1", "CI3"]);

        let again = PageQuery::from_pairs(&state_pairs(&page))
            .controller(source(), &ColumnVisibility::default());
        assert_eq!(ids(&again), ids(&page));
        assert_eq!(again.selection(), page.selection());
        assert_eq!(again.sort(), page.sort());
    }

    #[test]
    fn test_deep_link_becomes_coarse_filter() {
        let page = PageQuery::from_pairs(&pairs(&[("incompletePlan", "true")]))
            .controller(source(), &ColumnVisibility::default());
        assert_eq!(ids(&page), ["CI1"]);

        let state = state_pairs(&page);
        assert!(state.contains(&("f_incompletePlan".to_string(), "true".to_string())));
        assert!(!state.iter().any(|(k, _)| k == "incompletePlan"));
    }

    #[test]
    fn test_toggle_all_action() {
        let page = PageQuery::from_pairs(&pairs(&[("f_risk", "Low"), ("action", "toggle_all")]))
            .controller(source(), &ColumnVisibility::default());
        assert_eq!(page.selection().len(), 2);
        assert!(page.all_selected());
    }

    #[test]
    fn test_state_pairs_drop_the_applied_action() {
        let query = PageQuery::from_pairs(&pairs(&[("action", "toggle_item:CI2")]));
        assert!(query.has_action());

        let page = query.controller(source(), &ColumnVisibility::default());
        let state = state_pairs(&page);
        assert!(state.contains(&("sel".to_string(), "CI2".to_string())));
        assert!(!state.iter().any(|(k, _)| k == "action"));
        assert!(!PageQuery::from_pairs(&state).has_action());
    }

    #[test]
    fn test_encode_pairs() {
        let encoded = encode_pairs(&[("f_rasScore", "Very High"), ("sel", "a&b")]);
        assert_eq!(encoded, "f_rasScore=Very%20High&sel=a%26b");
        assert_eq!(
            decode_query(&encoded),
            pairs(&[("f_rasScore", "Very High"), ("sel", "a&b")])
        );
    }
}
