// ── Source loaders ──
//
// One interface for both kinds of page: the local snapshot (full
// collection, client-side filtering and paging) and the remote backend
// (server-side filtering and paging, requests forwarded upstream).

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use schoolbus_api::{ApiClient, ListParams};
use tracing::debug;

use crate::error::CoreError;
use crate::model::Record;
use crate::store::DataStore;
use crate::view::{CategoryFilter, FilterState};

/// Query parameter carrying the categorical filter upstream.
pub const ESTABLISHMENT_PARAM: &str = "establishmentId";

/// One page request: position plus the active filter criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: NonZeroUsize,
    pub filter: FilterState,
}

/// Size of the full (filtered) result set, as the source reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    Count(usize),
    Pages(usize),
}

#[derive(Debug, Clone)]
pub struct LoadedPage<T> {
    pub items: Vec<T>,
    pub total: Total,
}

impl<T> LoadedPage<T> {
    pub fn total_pages(&self, per_page: NonZeroUsize) -> usize {
        match self.total {
            Total::Count(n) => n.div_ceil(per_page.get()),
            Total::Pages(n) => n,
        }
    }

    pub fn total_count(&self) -> Option<usize> {
        match self.total {
            Total::Count(n) => Some(n),
            Total::Pages(_) => None,
        }
    }
}

pub trait SourceLoader<T: Record>: Send + Sync {
    /// `true` when the source pages and filters itself; the local
    /// paginator is then bypassed.
    fn server_paginated(&self) -> bool;

    fn load(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<LoadedPage<T>, CoreError>> + Send;
}

// ── Local ────────────────────────────────────────────────────────────

/// Reads the full active collection from the current snapshot.
pub struct LocalSource {
    store: Arc<DataStore>,
}

impl LocalSource {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }
}

impl<T: Record> SourceLoader<T> for LocalSource {
    fn server_paginated(&self) -> bool {
        false
    }

    async fn load(&self, _request: &PageRequest) -> Result<LoadedPage<T>, CoreError> {
        let snapshot = self.store.snapshot();
        let items: Vec<T> = snapshot.active::<T>().cloned().collect();
        Ok(LoadedPage {
            total: Total::Count(items.len()),
            items,
        })
    }
}

// ── Remote ───────────────────────────────────────────────────────────

/// Forwards page requests to the backend's list endpoint.
pub struct RemoteSource {
    client: Arc<ApiClient>,
}

impl RemoteSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) fn list_params(request: &PageRequest) -> ListParams {
        let page = u32::try_from(request.page).unwrap_or(u32::MAX);
        let limit = u32::try_from(request.per_page.get()).unwrap_or(u32::MAX);
        let mut params =
            ListParams::new(page, limit).with_search(request.filter.query.trim().to_owned());
        if let CategoryFilter::Only(id) = request.filter.category {
            params = params.with_param(ESTABLISHMENT_PARAM, id);
        }
        params
    }
}

impl<T: Record> SourceLoader<T> for RemoteSource {
    fn server_paginated(&self) -> bool {
        true
    }

    async fn load(&self, request: &PageRequest) -> Result<LoadedPage<T>, CoreError> {
        let params = Self::list_params(request);
        let page = self
            .client
            .list::<T>(T::KIND.resource(), &params)
            .await?;
        debug!(
            kind = %T::KIND,
            page = page.pagination.page,
            total_pages = page.pagination.total_pages,
            items = page.data.len(),
            "loaded remote page"
        );

        let total = match page.pagination.total_count {
            Some(n) => Total::Count(usize::try_from(n).unwrap_or(usize::MAX)),
            None => {
                Total::Pages(usize::try_from(page.pagination.total_pages).unwrap_or(usize::MAX))
            }
        };
        Ok(LoadedPage {
            items: page.data,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityId;

    #[test]
    fn remote_params_forward_filter_criteria() {
        let request = PageRequest {
            page: 2,
            per_page: NonZeroUsize::new(5).unwrap(),
            filter: FilterState::new(Some(EntityId::new(3)), "  nord "),
        };

        let query = RemoteSource::list_params(&request).to_query();

        assert!(query.contains(&("page".into(), "2".into())));
        assert!(query.contains(&("limit".into(), "5".into())));
        assert!(query.contains(&("search".into(), "nord".into())));
        assert!(query.contains(&("establishmentId".into(), "3".into())));
    }

    #[test]
    fn total_pages_from_count() {
        let loaded = LoadedPage::<()> {
            items: vec![],
            total: Total::Count(7),
        };
        assert_eq!(loaded.total_pages(NonZeroUsize::new(3).unwrap()), 3);
        assert_eq!(loaded.total_count(), Some(7));
    }
}
