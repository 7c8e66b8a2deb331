// ── Filter chain ──
//
// Categorical (establishment) filter first, then case-insensitive text
// search OR-ed across each view's fixed field list. Pure: no state is
// kept between calls.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::EntityId;

/// Single-select establishment filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EntityId),
}

impl From<Option<EntityId>> for CategoryFilter {
    fn from(id: Option<EntityId>) -> Self {
        id.map_or(Self::All, Self::Only)
    }
}

/// Active filter criteria for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub query: String,
}

impl FilterState {
    pub fn new(category: impl Into<CategoryFilter>, query: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            query: query.into(),
        }
    }

    /// Query with surrounding whitespace removed; `None` when blank.
    pub fn effective_query(&self) -> Option<&str> {
        Some(self.query.trim()).filter(|q| !q.is_empty())
    }

    pub fn matches<V: Searchable>(&self, view: &V) -> bool {
        if let CategoryFilter::Only(id) = self.category {
            if !view.in_establishment(id) {
                return false;
            }
        }

        match self.effective_query() {
            None => true,
            Some(query) => {
                let needle = query.to_lowercase();
                view.search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// What the filter chain needs from an enriched view.
pub trait Searchable {
    /// Exact-match test for the categorical filter.
    fn in_establishment(&self, id: EntityId) -> bool;

    /// Fields the text query is matched against, resolved names included.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

/// Apply the chain, keeping the input order.
pub fn apply<V: Searchable>(items: &[Arc<V>], filter: &FilterState) -> Vec<Arc<V>> {
    items
        .iter()
        .filter(|v| filter.matches(v.as_ref()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        est: Option<EntityId>,
        name: &'static str,
    }

    impl Searchable for Row {
        fn in_establishment(&self, id: EntityId) -> bool {
            self.est == Some(id)
        }

        fn search_fields(&self) -> Vec<Cow<'_, str>> {
            vec![Cow::Borrowed(self.name)]
        }
    }

    fn rows() -> Vec<Arc<Row>> {
        vec![
            Arc::new(Row {
                est: Some(EntityId::new(1)),
                name: "Alpha",
            }),
            Arc::new(Row {
                est: Some(EntityId::new(2)),
                name: "Alphonse",
            }),
            Arc::new(Row {
                est: None,
                name: "Beta",
            }),
        ]
    }

    #[test]
    fn blank_query_passes_everything_through() {
        let out = apply(&rows(), &FilterState::new(None, "   "));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn category_is_a_strict_prefilter() {
        // "alph" matches both rows textually; only establishment 1 survives.
        let filter = FilterState::new(Some(EntityId::new(1)), "ALPH");
        let out = apply(&rows(), &filter);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Alpha");
    }

    #[test]
    fn filtering_is_repeatable() {
        let items = rows();
        let filter = FilterState::new(None, "a");
        let first: Vec<&str> = apply(&items, &filter).iter().map(|r| r.name).collect();
        let second: Vec<&str> = apply(&items, &filter).iter().map(|r| r.name).collect();
        assert_eq!(first, second);
    }
}
