// ── Wire envelope types ──

use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    /// Not every backend version sends this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// One page of a list response: `{ data, pagination }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Query parameters for list endpoints.
///
/// `extra` carries resource-specific filters (e.g. `establishmentId`)
/// that are forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl ListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        if !search.trim().is_empty() {
            self.search = Some(search);
        }
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.extra.push((key.into(), value.to_string()));
        self
    }

    /// Flatten into `reqwest` query pairs, skipping unset fields.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(3 + self.extra.len());
        if let Some(page) = self.page {
            query.push(("page".to_owned(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_owned(), limit.to_string()));
        }
        if let Some(ref search) = self.search {
            query.push(("search".to_owned(), search.clone()));
        }
        query.extend(self.extra.iter().cloned());
        query
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_not_forwarded() {
        let params = ListParams::new(1, 10).with_search("   ");
        assert_eq!(
            params.to_query(),
            vec![("page".into(), "1".into()), ("limit".into(), "10".into())]
        );
    }

    #[test]
    fn extra_params_follow_paging() {
        let params = ListParams::new(2, 5)
            .with_search("elo")
            .with_param("establishmentId", 3);
        let query = params.to_query();
        assert_eq!(query.len(), 4);
        assert_eq!(query[2], ("search".into(), "elo".into()));
        assert_eq!(query[3], ("establishmentId".into(), "3".into()));
    }

    #[test]
    fn pagination_reads_camel_case() {
        let p: Pagination =
            serde_json::from_str(r#"{"page":2,"limit":10,"totalPages":4}"#).unwrap();
        assert_eq!(p.total_pages, 4);
        assert_eq!(p.total_count, None);
    }
}
