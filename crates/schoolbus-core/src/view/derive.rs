// ── Pure derivation: snapshot + criteria → page ──

use std::sync::Arc;

use super::enrich::Enrich;
use super::filter::{self, FilterState};
use super::paginate::{self, PageState};
use crate::store::Snapshot;

/// Everything one page of a collection shows, derived from one snapshot.
#[derive(Debug, Clone)]
pub struct Derived<V> {
    pub enriched: Vec<Arc<V>>,
    pub filtered: Vec<Arc<V>>,
    pub paged: Vec<Arc<V>>,
    /// The requested page after clamping.
    pub page: PageState,
    /// `ceil(filtered / per_page)`, 0 when nothing matched.
    pub total_pages: usize,
}

impl<V> Derived<V> {
    pub fn display_total_pages(&self) -> usize {
        self.total_pages.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Enrich the active records of `T`, filter, clamp the page and slice it.
pub fn derive<T: Enrich>(
    snapshot: &Snapshot,
    filter: &FilterState,
    page: PageState,
) -> Derived<T::View> {
    derive_records(snapshot.active::<T>(), snapshot, filter, page)
}

/// Same as [`derive`], over an explicit record set (e.g. one loaded from a
/// source) enriched against `snapshot`.
pub fn derive_records<'a, T: Enrich>(
    records: impl IntoIterator<Item = &'a T>,
    snapshot: &Snapshot,
    filter: &FilterState,
    page: PageState,
) -> Derived<T::View> {
    let enriched: Vec<Arc<T::View>> = records
        .into_iter()
        .filter(|r| r.is_active())
        .map(|r| Arc::new(r.enrich(snapshot)))
        .collect();
    let filtered = filter::apply(&enriched, filter);
    let page = page.clamped(filtered.len());
    let paged = paginate::page_slice(&filtered, page).to_vec();
    let total_pages = paginate::total_pages(filtered.len(), page.per_page());

    tracing::debug!(
        kind = %T::KIND,
        enriched = enriched.len(),
        filtered = filtered.len(),
        page = page.current(),
        total_pages,
        "derived page"
    );

    Derived {
        enriched,
        filtered,
        paged,
        page,
        total_pages,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::model::{Bus, EntityId};
    use crate::store::demo;
    use crate::view::CategoryFilter;

    fn three_per_page() -> PageState {
        PageState::new(NonZeroUsize::new(3).unwrap())
    }

    #[test]
    fn search_reaches_resolved_establishment_name() {
        let snap = demo::snapshot();
        let filter = FilterState::new(None, "elo");

        let derived = derive::<Bus>(&snap, &filter, three_per_page());

        let plates: Vec<&str> = derived
            .filtered
            .iter()
            .map(|v| v.bus.plate_number.as_str())
            .collect();
        assert_eq!(plates, ["1234-A-6", "5678-B-6", "9012-A-1", "3456-D-1"]);
        assert!(derived.filtered.iter().all(|v| {
            !v.bus.plate_number.to_lowercase().contains("elo")
                && !v.bus.make.to_lowercase().contains("elo")
        }));
    }

    #[test]
    fn empty_category_resets_to_first_page() {
        let snap = demo::snapshot();
        let filter = FilterState {
            category: CategoryFilter::Only(EntityId::new(2)),
            query: String::new(),
        };

        let derived = derive::<Bus>(&snap, &filter, three_per_page().at(3));

        assert!(derived.is_empty());
        assert!(derived.paged.is_empty());
        assert_eq!(derived.page.current(), 1);
        assert_eq!(derived.total_pages, 0);
        assert_eq!(derived.display_total_pages(), 1);
    }

    #[test]
    fn derived_views_do_not_alias_later_snapshots() {
        let snap = demo::snapshot();
        let before = derive::<Bus>(&snap, &FilterState::default(), three_per_page());

        let mut next = snap.clone();
        next.modify::<Bus>(EntityId::new(1), |b| b.make = "Changed".into())
            .unwrap();
        let after = derive::<Bus>(&next, &FilterState::default(), three_per_page());

        assert_eq!(before.paged[0].bus.make, "Mercedes");
        assert_eq!(after.paged[0].bus.make, "Changed");
    }

    #[test]
    fn demo_bus_page_snapshot() {
        let snap = demo::snapshot();
        let derived = derive::<Bus>(&snap, &FilterState::default(), three_per_page().at(3));
        insta::assert_json_snapshot!(derived.paged, @r###"
        [
          {
            "id": 7,
            "plateNumber": "1357-W-6",
            "make": "Hyundai",
            "capacity": 40,
            "establishmentId": 3,
            "driverId": null,
            "establishmentName": "École Al Amal",
            "driverName": "Non attribué"
          }
        ]
        "###);
    }
}
