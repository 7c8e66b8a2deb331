// ── Controller: the collection pipeline behind every admin page ──
//
// Owns the snapshot store and the mutation gateway. Reads go through a
// source loader and the pure derivation; writes are validated, serialized
// through one async lock, applied to a copy of the snapshot (locally or
// via the backend) and published wholesale on success.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use schoolbus_api::transport::{TlsMode, TransportConfig};
use schoolbus_api::{ApiClient, ListParams};

use crate::command::{
    Command, CommandResult, CreateParentRequest, CreateRequest, UpdateParentRequest,
    UpdateRequest,
};
use crate::config::{Backend, ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::listing::ListView;
use crate::model::{
    Bus, DeletePolicy, Driver, EntityId, EntityKind, Establishment, PARENT_STUDENT_RESOURCE,
    Parent, ParentStudentLink, Record, Route, Student, Trip,
};
use crate::notify::{Confirm, Notifier, TracingNotifier};
use crate::source::{LocalSource, PageRequest, RemoteSource, SourceLoader};
use crate::store::{DataStore, Snapshot, demo};
use crate::stream::SnapshotStream;
use crate::view::{Enrich, FilterState, PageState, derive_records};

/// Page size used when pulling whole collections from the backend.
const FETCH_PAGE_SIZE: u32 = 100;

// ── MutationState ────────────────────────────────────────────────────

/// `Idle → Mutating → (Committed | RolledBack) → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Mutating,
    Committed,
    RolledBack,
}

// ── Controller ───────────────────────────────────────────────────────

/// Entry point for consumers. Cheaply cloneable.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    client: Option<Arc<ApiClient>>,
    notifier: Arc<dyn Notifier>,
    mutation_state: watch::Sender<MutationState>,
    mutation_lock: Mutex<()>,
}

impl Controller {
    /// Build a controller that reports through `tracing`. Does not load
    /// anything; call [`load`](Self::load) first.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(
        config: ControllerConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let client = match &config.backend {
            Backend::Local { .. } => None,
            Backend::Remote {
                url,
                token,
                tls,
                timeout,
            } => {
                let transport = TransportConfig {
                    tls: tls_to_transport(tls),
                    timeout: *timeout,
                };
                Some(Arc::new(ApiClient::new(
                    url.as_str(),
                    token.as_ref(),
                    &transport,
                )?))
            }
        };
        let (mutation_state, _) = watch::channel(MutationState::Idle);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DataStore::new()),
                client,
                notifier,
                mutation_state,
                mutation_lock: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn mutation_state(&self) -> watch::Receiver<MutationState> {
        self.inner.mutation_state.subscribe()
    }

    /// Whether list pages are paged and filtered by the backend.
    pub fn server_paginated(&self) -> bool {
        self.inner.client.is_some()
    }

    pub(crate) fn notify_failure(&self, message: &str) {
        self.inner.notifier.notify_failure(message);
    }

    fn dataset_path(&self) -> Option<&Path> {
        match &self.inner.config.backend {
            Backend::Local { dataset } => dataset.as_deref(),
            Backend::Remote { .. } => None,
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Populate the store: the dataset file (or demo data) locally, every
    /// collection across all pages remotely.
    ///
    /// On failure the store is left as it was and a failure is notified.
    pub async fn load(&self) -> Result<(), CoreError> {
        let loaded = match &self.inner.client {
            Some(client) => fetch_everything(client).await,
            None => self.load_local(),
        };

        match loaded {
            Ok(snapshot) => {
                self.inner.store.replace_loaded(snapshot);
                let snap = self.inner.store.snapshot();
                debug!(
                    establishments = snap.count::<Establishment>(),
                    buses = snap.count::<Bus>(),
                    students = snap.count::<Student>(),
                    "collections loaded"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                self.notify_failure(&e.to_string());
                Err(e)
            }
        }
    }

    fn load_local(&self) -> Result<Snapshot, CoreError> {
        match self.dataset_path() {
            Some(path) if path.exists() => Snapshot::load(path),
            Some(path) => {
                info!(path = %path.display(), "dataset not found; starting from demo data");
                Ok(demo::snapshot())
            }
            None => Ok(demo::snapshot()),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// One page of `T`, filtered and enriched.
    pub async fn list<T: Enrich>(
        &self,
        filter: &FilterState,
        page: PageState,
    ) -> Result<ListView<T::View>, CoreError> {
        match &self.inner.client {
            Some(client) => {
                let source = RemoteSource::new(Arc::clone(client));
                self.list_from::<T, _>(&source, filter, page).await
            }
            None => {
                let source = LocalSource::new(Arc::clone(&self.inner.store));
                self.list_from::<T, _>(&source, filter, page).await
            }
        }
    }

    async fn list_from<T: Enrich, S: SourceLoader<T>>(
        &self,
        source: &S,
        filter: &FilterState,
        page: PageState,
    ) -> Result<ListView<T::View>, CoreError> {
        let request = PageRequest {
            page: page.current(),
            per_page: page.per_page(),
            filter: filter.clone(),
        };
        let mut loaded = source.load(&request).await?;
        let snapshot = self.inner.store.snapshot();

        if !source.server_paginated() {
            let derived = derive_records(&loaded.items, &snapshot, filter, page);
            return Ok(ListView::from(derived));
        }

        // Server-side paging: clamp against the server's count and re-ask.
        let mut current = request.page;
        let total_pages = loaded.total_pages(request.per_page);
        if total_pages == 0 {
            current = 1;
        } else if current > total_pages {
            debug!(requested = current, total_pages, "page out of range; refetching last page");
            current = total_pages;
            loaded = source
                .load(&PageRequest {
                    page: current,
                    ..request.clone()
                })
                .await?;
        }

        Ok(ListView {
            items: loaded
                .items
                .iter()
                .filter(|r| r.is_active())
                .map(|r| Arc::new(r.enrich(&snapshot)))
                .collect(),
            page: current,
            total_pages: loaded.total_pages(request.per_page),
            total_count: loaded.total_count(),
        })
    }

    /// One record of `T`, enriched.
    pub async fn get<T: Enrich>(&self, id: EntityId) -> Result<T::View, CoreError> {
        let snapshot = self.inner.store.snapshot();
        let not_found = || CoreError::NotFound { kind: T::KIND, id };

        if let Some(client) = &self.inner.client {
            let record: T = client
                .get(T::KIND.resource(), id.get())
                .await
                .map_err(|e| if e.is_not_found() { not_found() } else { e.into() })?;
            return if record.is_active() {
                Ok(record.enrich(&snapshot))
            } else {
                Err(not_found())
            };
        }

        snapshot
            .find::<T>(id)
            .map(|r| r.enrich(&snapshot))
            .ok_or_else(not_found)
    }

    // ── Mutation gateway ─────────────────────────────────────────────

    /// Validate, apply, and publish one command.
    ///
    /// Validation failures never reach the state machine. Every other
    /// outcome is reported through the notifier and returned.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if let Err(e) = cmd.validate() {
            self.notify_failure(&e.to_string());
            return Err(e);
        }

        let _guard = self.inner.mutation_lock.lock().await;
        let kind = cmd.kind();
        self.set_state(MutationState::Mutating);

        let outcome = match &self.inner.client {
            Some(client) => apply_remote(client, self.snapshot().as_ref().clone(), cmd).await,
            None => apply_local(self.snapshot().as_ref().clone(), cmd),
        }
        .and_then(|(next, result)| {
            self.commit(next)?;
            Ok(result)
        });

        match &outcome {
            Ok(result) => {
                self.set_state(MutationState::Committed);
                info!(%kind, id = %result.id(), "mutation committed");
                self.inner.notifier.notify_success(&result.to_string());
            }
            Err(e) => {
                self.set_state(MutationState::RolledBack);
                warn!(%kind, error = %e, "mutation rolled back");
                self.notify_failure(&e.to_string());
            }
        }
        self.set_state(MutationState::Idle);
        outcome
    }

    /// Delete behind an explicit confirmation. A declined prompt is a
    /// no-op and yields `Ok(None)`.
    pub async fn delete_confirmed<C: Confirm + ?Sized>(
        &self,
        kind: EntityKind,
        id: EntityId,
        confirm: &C,
    ) -> Result<Option<CommandResult>, CoreError> {
        if !self.snapshot().contains(kind, id) {
            let err = CoreError::NotFound { kind, id };
            self.notify_failure(&err.to_string());
            return Err(err);
        }

        let prompt = match kind.delete_policy() {
            DeletePolicy::Hard => format!("Delete {} {id}? This cannot be undone.", kind.label()),
            DeletePolicy::Soft => format!("Delete {} {id}?", kind.label()),
        };
        if !confirm.confirm(&prompt) {
            debug!(%kind, %id, "deletion declined");
            return Ok(None);
        }

        self.execute(Command::Delete { kind, id }).await.map(Some)
    }

    /// Persist (local dataset only) then publish. A failed save keeps the
    /// previous snapshot.
    fn commit(&self, next: Snapshot) -> Result<(), CoreError> {
        if let Some(path) = self.dataset_path() {
            next.save(path)?;
        }
        self.inner.store.publish(next);
        Ok(())
    }

    fn set_state(&self, state: MutationState) {
        self.inner.mutation_state.send_replace(state);
    }
}

// ── Local gateway ────────────────────────────────────────────────────

fn apply_local(mut next: Snapshot, cmd: Command) -> Result<(Snapshot, CommandResult), CoreError> {
    let result = match cmd {
        Command::CreateEstablishment(req) => create_local(&mut next, req),
        Command::UpdateEstablishment { id, update } => update_local(&mut next, id, &update)?,
        Command::CreateBus(req) => create_local(&mut next, req),
        Command::UpdateBus { id, update } => update_local(&mut next, id, &update)?,
        Command::CreateDriver(req) => create_local(&mut next, req),
        Command::UpdateDriver { id, update } => update_local(&mut next, id, &update)?,
        Command::CreateParent(req) => {
            // Parent and link rows land in the same snapshot swap.
            let student_ids = req.student_ids.clone();
            let result = create_local(&mut next, req);
            next.set_parent_links(result.id(), &student_ids);
            result
        }
        Command::UpdateParent { id, update } => {
            let result = update_local(&mut next, id, &update)?;
            if let Some(student_ids) = &update.student_ids {
                next.set_parent_links(id, student_ids);
            }
            result
        }
        Command::CreateStudent(req) => create_local(&mut next, req),
        Command::UpdateStudent { id, update } => update_local(&mut next, id, &update)?,
        Command::CreateRoute(req) => create_local(&mut next, req),
        Command::UpdateRoute { id, update } => update_local(&mut next, id, &update)?,
        Command::CreateTrip(req) => create_local(&mut next, req),
        Command::UpdateTrip { id, update } => update_local(&mut next, id, &update)?,
        Command::Delete { kind, id } => {
            let policy = next.remove(kind, id, Utc::now())?;
            CommandResult::Deleted { kind, id, policy }
        }
    };
    Ok((next, result))
}

fn create_local<R: CreateRequest>(next: &mut Snapshot, req: R) -> CommandResult {
    let id = next.next_id::<R::Record>();
    next.insert(req.into_record(id));
    CommandResult::Created {
        kind: <R::Record as Record>::KIND,
        id,
    }
}

fn update_local<U: UpdateRequest>(
    next: &mut Snapshot,
    id: EntityId,
    update: &U,
) -> Result<CommandResult, CoreError> {
    next.modify::<U::Record>(id, |record| update.apply(record))?;
    Ok(CommandResult::Updated {
        kind: <U::Record as Record>::KIND,
        id,
    })
}

// ── Remote gateway ───────────────────────────────────────────────────

async fn apply_remote(
    client: &ApiClient,
    mut next: Snapshot,
    cmd: Command,
) -> Result<(Snapshot, CommandResult), CoreError> {
    let result = match cmd {
        Command::CreateEstablishment(req) => create_remote(client, &mut next, &req).await?,
        Command::UpdateEstablishment { id, update } => {
            update_remote(client, &mut next, id, &update).await?
        }
        Command::CreateBus(req) => create_remote(client, &mut next, &req).await?,
        Command::UpdateBus { id, update } => update_remote(client, &mut next, id, &update).await?,
        Command::CreateDriver(req) => create_remote(client, &mut next, &req).await?,
        Command::UpdateDriver { id, update } => {
            update_remote(client, &mut next, id, &update).await?
        }
        Command::CreateParent(req) => create_parent_remote(client, &mut next, &req).await?,
        Command::UpdateParent { id, update } => {
            update_parent_remote(client, &mut next, id, &update).await?
        }
        Command::CreateStudent(req) => create_remote(client, &mut next, &req).await?,
        Command::UpdateStudent { id, update } => {
            update_remote(client, &mut next, id, &update).await?
        }
        Command::CreateRoute(req) => create_remote(client, &mut next, &req).await?,
        Command::UpdateRoute { id, update } => {
            update_remote(client, &mut next, id, &update).await?
        }
        Command::CreateTrip(req) => create_remote(client, &mut next, &req).await?,
        Command::UpdateTrip { id, update } => update_remote(client, &mut next, id, &update).await?,
        Command::Delete { kind, id } => {
            if !next.contains(kind, id) {
                return Err(CoreError::NotFound { kind, id });
            }
            client.delete(kind.resource(), id.get()).await?;
            // Mirror the backend's cascade locally.
            let policy = next.remove(kind, id, Utc::now())?;
            CommandResult::Deleted { kind, id, policy }
        }
    };
    Ok((next, result))
}

async fn create_remote<R: CreateRequest>(
    client: &ApiClient,
    next: &mut Snapshot,
    req: &R,
) -> Result<CommandResult, CoreError> {
    let kind = <R::Record as Record>::KIND;
    let record: R::Record = client.create(kind.resource(), req).await?;
    let id = record.id();
    next.upsert(record);
    Ok(CommandResult::Created { kind, id })
}

async fn update_remote<U: UpdateRequest>(
    client: &ApiClient,
    next: &mut Snapshot,
    id: EntityId,
    update: &U,
) -> Result<CommandResult, CoreError> {
    let kind = <U::Record as Record>::KIND;
    if next.find::<U::Record>(id).is_none() {
        return Err(CoreError::NotFound { kind, id });
    }
    let mut record: U::Record = client.update(kind.resource(), id.get(), update).await?;
    record.set_id(id);
    next.upsert(record);
    Ok(CommandResult::Updated { kind, id })
}

/// Parent first, then one link row per student. Any failure undoes the
/// steps already applied on the backend.
async fn create_parent_remote(
    client: &ApiClient,
    next: &mut Snapshot,
    req: &CreateParentRequest,
) -> Result<CommandResult, CoreError> {
    let parent: Parent = client.create(EntityKind::Parent.resource(), req).await?;
    let parent_id = parent.id;

    let mut undo = UndoLog::default();
    undo.push(Undo::DeleteRecord {
        kind: EntityKind::Parent,
        id: parent_id,
    });
    if let Err(e) = add_links(client, parent_id, &req.student_ids, &mut undo).await {
        undo.rollback(client).await;
        return Err(e);
    }

    next.upsert(parent);
    next.set_parent_links(parent_id, &req.student_ids);
    Ok(CommandResult::Created {
        kind: EntityKind::Parent,
        id: parent_id,
    })
}

/// Link replacement runs before the parent update so that a failure at
/// any step can be compensated.
async fn update_parent_remote(
    client: &ApiClient,
    next: &mut Snapshot,
    id: EntityId,
    update: &UpdateParentRequest,
) -> Result<CommandResult, CoreError> {
    if next.find::<Parent>(id).is_none() {
        return Err(CoreError::NotFound {
            kind: EntityKind::Parent,
            id,
        });
    }

    let mut undo = UndoLog::default();
    if let Some(student_ids) = &update.student_ids {
        let existing: Vec<ParentStudentLink> = next.links_of_parent(id).copied().collect();
        let replaced = async {
            for link in &existing {
                delete_link(client, *link).await?;
                undo.push(Undo::RestoreLink(*link));
            }
            add_links(client, id, student_ids, &mut undo).await
        }
        .await;
        if let Err(e) = replaced {
            undo.rollback(client).await;
            return Err(e);
        }
    }

    let parent: Parent = match client
        .update(EntityKind::Parent.resource(), id.get(), update)
        .await
    {
        Ok(parent) => parent,
        Err(e) => {
            undo.rollback(client).await;
            return Err(e.into());
        }
    };

    next.upsert(Parent { id, ..parent });
    if let Some(student_ids) = &update.student_ids {
        next.set_parent_links(id, student_ids);
    }
    Ok(CommandResult::Updated {
        kind: EntityKind::Parent,
        id,
    })
}

async fn add_links(
    client: &ApiClient,
    parent_id: EntityId,
    student_ids: &[EntityId],
    undo: &mut UndoLog,
) -> Result<(), CoreError> {
    for (i, &student_id) in student_ids.iter().enumerate() {
        if student_ids[..i].contains(&student_id) {
            continue;
        }
        let link = ParentStudentLink::new(parent_id, student_id);
        let _: IgnoredAny = client.create(PARENT_STUDENT_RESOURCE, &link).await?;
        undo.push(Undo::DeleteLink(link));
    }
    Ok(())
}

async fn delete_link(client: &ApiClient, link: ParentStudentLink) -> Result<(), CoreError> {
    client
        .delete_where(
            PARENT_STUDENT_RESOURCE,
            &[
                ("parentId", link.parent_id.to_string()),
                ("studentId", link.student_id.to_string()),
            ],
        )
        .await?;
    Ok(())
}

// ── Compensation ─────────────────────────────────────────────────────

/// A remote step already applied, with its inverse.
#[derive(Debug, Clone, Copy)]
enum Undo {
    DeleteRecord { kind: EntityKind, id: EntityId },
    DeleteLink(ParentStudentLink),
    RestoreLink(ParentStudentLink),
}

#[derive(Debug, Default)]
struct UndoLog(Vec<Undo>);

impl UndoLog {
    fn push(&mut self, step: Undo) {
        self.0.push(step);
    }

    /// Undo in reverse order. Compensation failures are logged; the
    /// original error is what the caller reports.
    async fn rollback(self, client: &ApiClient) {
        for step in self.0.into_iter().rev() {
            let undone = match step {
                Undo::DeleteRecord { kind, id } => client
                    .delete(kind.resource(), id.get())
                    .await
                    .map_err(CoreError::from),
                Undo::DeleteLink(link) => delete_link(client, link).await,
                Undo::RestoreLink(link) => client
                    .create::<IgnoredAny, _>(PARENT_STUDENT_RESOURCE, &link)
                    .await
                    .map(|_| ())
                    .map_err(CoreError::from),
            };
            match undone {
                Ok(()) => debug!(?step, "compensated"),
                Err(e) => warn!(?step, error = %e, "compensation step failed"),
            }
        }
    }
}

// ── Full remote fetch ────────────────────────────────────────────────

async fn fetch_everything(client: &ApiClient) -> Result<Snapshot, CoreError> {
    let (establishments, buses, drivers, parents, students, routes, trips, parent_students) = tokio::try_join!(
        fetch_all::<Establishment>(client, EntityKind::Establishment.resource()),
        fetch_all::<Bus>(client, EntityKind::Bus.resource()),
        fetch_all::<Driver>(client, EntityKind::Driver.resource()),
        fetch_all::<Parent>(client, EntityKind::Parent.resource()),
        fetch_all::<Student>(client, EntityKind::Student.resource()),
        fetch_all::<Route>(client, EntityKind::Route.resource()),
        fetch_all::<Trip>(client, EntityKind::Trip.resource()),
        fetch_all::<ParentStudentLink>(client, PARENT_STUDENT_RESOURCE),
    )?;

    Ok(Snapshot {
        establishments: Arc::new(establishments),
        buses: Arc::new(buses),
        drivers: Arc::new(drivers),
        parents: Arc::new(parents),
        students: Arc::new(students),
        routes: Arc::new(routes),
        trips: Arc::new(trips),
        parent_students: Arc::new(parent_students),
    })
}

/// Walk every page of a list endpoint.
async fn fetch_all<T: DeserializeOwned>(
    client: &ApiClient,
    resource: &str,
) -> Result<Vec<T>, CoreError> {
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let resp = client
            .list::<T>(resource, &ListParams::new(page, FETCH_PAGE_SIZE))
            .await?;
        let done = resp.data.is_empty() || page >= resp.pagination.total_pages;
        items.extend(resp.data);
        if done {
            break;
        }
        page += 1;
    }
    debug!(resource, count = items.len(), "fetched collection");
    Ok(items)
}

// ── Helpers ──────────────────────────────────────────────────────────

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroUsize;
    use std::sync::Mutex as StdMutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::command::{CreateBusRequest, UpdateStudentRequest};
    use crate::listing::Listing;
    use crate::notify::AutoConfirm;
    use crate::view::CategoryFilter;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw)
    }

    fn config(per_page: usize, dataset: Option<std::path::PathBuf>) -> ControllerConfig {
        ControllerConfig {
            backend: Backend::Local { dataset },
            items_per_page: NonZeroUsize::new(per_page).unwrap(),
        }
    }

    async fn demo_controller(per_page: usize) -> Controller {
        let controller = Controller::new(config(per_page, None)).unwrap();
        controller.load().await.unwrap();
        controller
    }

    fn new_bus(plate: &str) -> CreateBusRequest {
        CreateBusRequest {
            plate_number: plate.into(),
            make: "Volvo".into(),
            model: None,
            capacity: 40,
            establishment_id: Some(id(2)),
            driver_id: None,
        }
    }

    /// Records each notification with the mutation state seen at that moment.
    #[derive(Default)]
    struct Recorder {
        events: StdMutex<Vec<(bool, String, Option<MutationState>)>>,
        state: StdMutex<Option<watch::Receiver<MutationState>>>,
    }

    impl Recorder {
        fn record(&self, ok: bool, message: &str) {
            let state = self.state.lock().unwrap().as_ref().map(|rx| *rx.borrow());
            self.events
                .lock()
                .unwrap()
                .push((ok, message.to_owned(), state));
        }
    }

    impl Notifier for Recorder {
        fn notify_success(&self, message: &str) {
            self.record(true, message);
        }

        fn notify_failure(&self, message: &str) {
            self.record(false, message);
        }
    }

    // ── Page scenarios ──────────────────────────────────────────────

    #[tokio::test]
    async fn deleting_last_item_on_last_page_snaps_back() {
        let controller = demo_controller(3).await;
        let mut listing = Listing::<Bus>::new(controller.clone());

        let view = listing.goto_page(3).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_pages, 3);
        let last = view.items[0].bus.id;

        controller
            .execute(Command::Delete {
                kind: EntityKind::Bus,
                id: last,
            })
            .await
            .unwrap();
        let view = listing.refresh().await.unwrap();

        assert_eq!(view.total_pages, 2);
        assert_eq!(view.page, 2);
        assert_eq!(listing.page().current(), 2);
    }

    #[tokio::test]
    async fn empty_category_shows_no_results_on_page_one() {
        let controller = demo_controller(3).await;
        let mut listing = Listing::<Bus>::new(controller);
        listing.goto_page(3).await.unwrap();

        let view = listing
            .set_category(CategoryFilter::Only(id(2)))
            .await
            .unwrap();

        assert!(view.is_empty());
        assert_eq!(view.page, 1);
        assert_eq!(view.display_total_pages(), 1);
        assert_eq!(view.total_count, Some(0));
    }

    #[tokio::test]
    async fn search_matches_through_establishment_name() {
        let controller = demo_controller(10).await;
        let mut listing = Listing::<Bus>::new(controller);

        let view = listing.set_query("elo").await.unwrap();

        assert_eq!(view.total_count, Some(4));
        assert!(view
            .items
            .iter()
            .all(|v| v.establishment_name == "Collège Belorado"));
    }

    // ── Mutation gateway ────────────────────────────────────────────

    #[tokio::test]
    async fn parent_creation_links_students_and_delete_removes_exactly_those() {
        let controller = demo_controller(10).await;
        let before = controller.snapshot().parent_students.as_ref().clone();

        let created = controller
            .execute(Command::CreateParent(CreateParentRequest {
                first_name: "Khadija".into(),
                last_name: "Lahlou".into(),
                email: "khadija.lahlou@example.ma".into(),
                phone: None,
                student_ids: vec![id(10), id(11)],
            }))
            .await
            .unwrap();

        let parent_id = created.id();
        assert_eq!(parent_id, id(5));
        let snap = controller.snapshot();
        let links: Vec<ParentStudentLink> = snap.links_of_parent(parent_id).copied().collect();
        assert_eq!(
            links,
            vec![
                ParentStudentLink::new(parent_id, id(10)),
                ParentStudentLink::new(parent_id, id(11)),
            ]
        );
        assert_eq!(snap.parent_students.len(), before.len() + 2);

        let deleted = controller
            .execute(Command::Delete {
                kind: EntityKind::Parent,
                id: parent_id,
            })
            .await
            .unwrap();

        assert!(matches!(
            deleted,
            CommandResult::Deleted {
                policy: DeletePolicy::Soft,
                ..
            }
        ));
        assert_eq!(*controller.snapshot().parent_students, before);
    }

    #[tokio::test]
    async fn repeated_student_ids_link_once() {
        let controller = demo_controller(10).await;

        let created = controller
            .execute(Command::CreateParent(CreateParentRequest {
                first_name: "Khadija".into(),
                last_name: "Lahlou".into(),
                email: "khadija.lahlou@example.ma".into(),
                phone: None,
                student_ids: vec![id(11), id(10), id(11)],
            }))
            .await
            .unwrap();

        let view = controller.get::<Parent>(created.id()).await.unwrap();
        assert_eq!(view.student_ids, vec![id(11), id(10)]);
        assert_eq!(view.student_names, "Ayoub Lahlou, Sara Lahlou");
    }

    #[tokio::test]
    async fn subscription_after_load_sees_loaded_snapshot() {
        let controller = demo_controller(10).await;

        let stream = controller.subscribe();

        assert_eq!(stream.current().buses.len(), 7);
        assert!(Arc::ptr_eq(stream.current(), &controller.snapshot()));
        assert!(controller.store().last_load().is_some());
    }

    #[tokio::test]
    async fn updating_vanished_student_fails_and_keeps_snapshot() {
        let controller = demo_controller(10).await;
        controller
            .execute(Command::Delete {
                kind: EntityKind::Student,
                id: id(5),
            })
            .await
            .unwrap();
        let before = controller.snapshot();

        let err = controller
            .execute(Command::UpdateStudent {
                id: id(5),
                update: UpdateStudentRequest {
                    grade: Some("5ème".into()),
                    ..UpdateStudentRequest::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::NotFound {
                kind: EntityKind::Student,
                ..
            }
        ));
        assert!(Arc::ptr_eq(&before, &controller.snapshot()));
        assert_eq!(*controller.mutation_state().borrow(), MutationState::Idle);
    }

    #[tokio::test]
    async fn local_create_assigns_next_id() {
        let controller = demo_controller(10).await;

        let result = controller
            .execute(Command::CreateBus(new_bus("4321-B-1")))
            .await
            .unwrap();

        assert_eq!(
            result,
            CommandResult::Created {
                kind: EntityKind::Bus,
                id: id(8)
            }
        );
        let view = controller.get::<Bus>(id(8)).await.unwrap();
        assert_eq!(view.establishment_name, "Lycée Ibn Sina");
        assert_eq!(view.driver_name, crate::view::UNASSIGNED);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_store() {
        let recorder = Arc::new(Recorder::default());
        let controller = Controller::with_notifier(config(10, None), recorder.clone()).unwrap();
        controller.load().await.unwrap();
        let version = controller.store().version();

        let err = controller
            .execute(Command::CreateBus(new_bus(" ")))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(controller.store().version(), version);
        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].0);
    }

    #[tokio::test]
    async fn notifications_fire_in_terminal_states() {
        let recorder = Arc::new(Recorder::default());
        let controller = Controller::with_notifier(config(10, None), recorder.clone()).unwrap();
        controller.load().await.unwrap();
        *recorder.state.lock().unwrap() = Some(controller.mutation_state());

        controller
            .execute(Command::CreateBus(new_bus("1111-A-1")))
            .await
            .unwrap();
        controller
            .execute(Command::Delete {
                kind: EntityKind::Route,
                id: id(42),
            })
            .await
            .unwrap_err();

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                (
                    true,
                    "Created bus 8".to_owned(),
                    Some(MutationState::Committed)
                ),
                (
                    false,
                    "route 42 not found".to_owned(),
                    Some(MutationState::RolledBack)
                ),
            ]
        );
        assert_eq!(*controller.mutation_state().borrow(), MutationState::Idle);
    }

    #[tokio::test]
    async fn declined_confirmation_is_a_no_op() {
        let controller = demo_controller(10).await;
        let version = controller.store().version();

        let outcome = controller
            .delete_confirmed(EntityKind::Bus, id(1), &AutoConfirm(false))
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(controller.store().version(), version);
        assert!(controller.snapshot().contains(EntityKind::Bus, id(1)));
    }

    #[tokio::test]
    async fn confirmed_route_delete_cascades() {
        let controller = demo_controller(10).await;

        controller
            .delete_confirmed(EntityKind::Route, id(1), &AutoConfirm(true))
            .await
            .unwrap()
            .unwrap();

        let snap = controller.snapshot();
        assert!(snap.trips.iter().all(|t| t.route_id != Some(id(1))));
        assert!(snap.students.iter().all(|s| s.route_id != Some(id(1))));
        let view = controller.get::<Student>(id(1)).await.unwrap();
        assert_eq!(view.route_name, crate::view::UNASSIGNED);
    }

    // ── Dataset persistence ─────────────────────────────────────────

    #[tokio::test]
    async fn committed_mutations_are_saved_to_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let controller = Controller::new(config(10, Some(path.clone()))).unwrap();
        controller.load().await.unwrap();
        assert!(!path.exists());

        controller
            .execute(Command::CreateBus(new_bus("2222-A-2")))
            .await
            .unwrap();

        let reloaded = Controller::new(config(10, Some(path))).unwrap();
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.snapshot().count::<Bus>(), 8);
    }

    #[tokio::test]
    async fn failed_save_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let controller =
            Controller::new(config(10, Some(blocker.join("dataset.json")))).unwrap();
        controller.load().await.unwrap();
        let before = controller.snapshot();

        let err = controller
            .execute(Command::CreateBus(new_bus("3333-A-3")))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Dataset { .. }));
        assert!(Arc::ptr_eq(&before, &controller.snapshot()));
    }
}
