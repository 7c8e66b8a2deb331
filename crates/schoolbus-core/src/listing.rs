// ── Listing: one admin page over one entity type ──
//
// Holds the page's filter and page state, and re-derives the visible
// page whenever either changes or the caller asks for a refresh (e.g.
// after a mutation).

use std::sync::Arc;

use crate::controller::Controller;
use crate::error::CoreError;
use crate::view::{CategoryFilter, Derived, Enrich, FilterState, PageState};

/// The visible page of a listing.
#[derive(Debug, Clone)]
pub struct ListView<V> {
    pub items: Vec<Arc<V>>,
    /// Current page after clamping (1-based).
    pub page: usize,
    /// 0 when nothing matched.
    pub total_pages: usize,
    /// Matching records across all pages, when the source reports it.
    pub total_count: Option<usize>,
}

impl<V> ListView<V> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 0,
            total_count: Some(0),
        }
    }

    pub fn display_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V> From<Derived<V>> for ListView<V> {
    fn from(derived: Derived<V>) -> Self {
        Self {
            page: derived.page.current(),
            total_pages: derived.total_pages,
            total_count: Some(derived.filtered.len()),
            items: derived.paged,
        }
    }
}

/// Stateful page controller for entity type `T`.
pub struct Listing<T: Enrich> {
    controller: Controller,
    filter: FilterState,
    page: PageState,
    view: ListView<T::View>,
}

impl<T: Enrich> Listing<T> {
    /// Page 1, no filter, page size from the controller's configuration.
    pub fn new(controller: Controller) -> Self {
        let per_page = controller.config().items_per_page;
        Self {
            controller,
            filter: FilterState::default(),
            page: PageState::new(per_page),
            view: ListView::empty(),
        }
    }

    /// Preset the filter without loading anything.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn view(&self) -> &ListView<T::View> {
        &self.view
    }

    pub async fn set_category(
        &mut self,
        category: CategoryFilter,
    ) -> Result<&ListView<T::View>, CoreError> {
        self.filter.category = category;
        self.refresh().await
    }

    pub async fn set_query(
        &mut self,
        query: impl Into<String>,
    ) -> Result<&ListView<T::View>, CoreError> {
        self.filter.query = query.into();
        self.refresh().await
    }

    pub async fn goto_page(&mut self, page: usize) -> Result<&ListView<T::View>, CoreError> {
        self.page = self.page.at(page);
        self.refresh().await
    }

    /// Re-derive the visible page. A failed load empties the page and
    /// notifies the failure; nothing from the previous view is kept.
    pub async fn refresh(&mut self) -> Result<&ListView<T::View>, CoreError> {
        match self.controller.list::<T>(&self.filter, self.page).await {
            Ok(view) => {
                self.page = self.page.at(view.page);
                self.view = view;
                Ok(&self.view)
            }
            Err(e) => {
                self.controller.notify_failure(&e.to_string());
                self.page = self.page.at(1);
                self.view = ListView::empty();
                Err(e)
            }
        }
    }
}
