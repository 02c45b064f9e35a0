//! Manages fetch cycles and the result set currently shown by the dashboard.
//!
//! A filter change never mutates anything in flight. Instead every issued
//! `FilterSpec` opens a new fetch cycle tagged with a monotonically
//! increasing generation number, and only the outcome of the latest issued
//! generation is ever applied. Older cycles are left to finish on their own;
//! their results are dropped when they arrive.
//!
//! The main components are:
//! - `DashboardState`: a clonable handle injected into the Actix application
//!   state. It holds the view (active filter, status, result set, table
//!   state), the query service and the update channel.
//! - `CycleUpdate`: the message a running cycle sends back (page progress or
//!   final outcome).
//! - `start_cycle_updater`: a long-running task that applies `CycleUpdate`s
//!   to the view, discarding those from superseded generations.

use common::jobs::FetchStatus;
use common::model::complaint::Complaint;
use common::model::filter::{FilterChange, FilterSpec};
use common::model::table::TablePage;
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::error::QueryError;
use crate::fetcher::fetch_all_with_progress;
use crate::source::ComplaintSource;
use crate::table::{render_page, total_pages, TableState};

/// Everything a dashboard view reads.
pub struct ViewState {
    /// Filter of the most recently issued cycle.
    pub filter: FilterSpec,
    /// Generation of the most recently issued cycle, `0` before the first.
    pub generation: u64,
    pub status: FetchStatus,
    /// Last successfully fetched result set. Replaced as a whole, never
    /// edited in place; readers clone the `Arc`.
    pub results: Arc<Vec<Complaint>>,
    pub table: TableState,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: FilterSpec::default(),
            generation: 0,
            status: FetchStatus::Idle,
            results: Arc::new(Vec::new()),
            table: TableState::default(),
        }
    }
}

/// A clonable, shareable handle on one dashboard view.
#[derive(Clone)]
pub struct DashboardState {
    pub view: Arc<RwLock<ViewState>>,

    /// Sender used by running cycles to report back to `start_cycle_updater`.
    pub tx: mpsc::Sender<CycleUpdate>,

    /// The query service every cycle pages through.
    pub source: Arc<dyn ComplaintSource>,
}

#[derive(Debug)]
pub enum CycleEvent {
    /// Number of pages received so far.
    Page(usize),
    Finished(Result<Vec<Complaint>, QueryError>),
}

/// Progress or outcome of the cycle tagged `generation`.
#[derive(Debug)]
pub struct CycleUpdate {
    pub(crate) generation: u64,
    pub(crate) event: CycleEvent,
}

impl DashboardState {
    pub fn new(source: Arc<dyn ComplaintSource>) -> (Self, mpsc::Receiver<CycleUpdate>) {
        let (tx, rx) = mpsc::channel(100);
        let state = Self {
            view: Arc::new(RwLock::new(ViewState::default())),
            tx,
            source,
        };
        (state, rx)
    }

    /// Makes `filter` the active filter and starts a cycle for it.
    ///
    /// Returns the new generation, or `None` when `filter` is structurally
    /// equal to the active one and a cycle for it was already issued.
    pub async fn issue(&self, filter: FilterSpec) -> Option<u64> {
        let filter = filter.normalized();
        let mut view = self.view.write().await;
        if view.generation > 0 && view.filter == filter {
            debug!("filter unchanged, keeping cycle {}", view.generation);
            return None;
        }
        Some(self.start_cycle(&mut view, filter))
    }

    /// Applies one filter edit, starting a cycle only if the filter changed.
    pub async fn change(&self, change: FilterChange) -> Option<u64> {
        let mut view = self.view.write().await;
        let next = view.filter.apply(change);
        if view.generation > 0 && view.filter == next {
            return None;
        }
        Some(self.start_cycle(&mut view, next))
    }

    /// Starts a new cycle for the active filter even though it is unchanged,
    /// e.g. after a failed cycle.
    pub async fn refresh(&self) -> u64 {
        let mut view = self.view.write().await;
        let filter = view.filter.clone();
        self.start_cycle(&mut view, filter)
    }

    fn start_cycle(&self, view: &mut ViewState, filter: FilterSpec) -> u64 {
        view.generation += 1;
        let generation = view.generation;
        view.filter = filter.clone();
        view.status = FetchStatus::Loading {
            generation,
            pages: 0,
        };
        info!("fetch cycle {} started for {:?}", generation, filter);

        let source = self.source.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let outcome = fetch_all_with_progress(source.as_ref(), &filter, |pages| {
                let _ = progress_tx.try_send(CycleUpdate {
                    generation,
                    event: CycleEvent::Page(pages),
                });
            })
            .await;
            let _ = tx
                .send(CycleUpdate {
                    generation,
                    event: CycleEvent::Finished(outcome),
                })
                .await;
        });

        generation
    }

    pub async fn status(&self) -> FetchStatus {
        self.view.read().await.status.clone()
    }

    pub async fn filter(&self) -> FilterSpec {
        self.view.read().await.filter.clone()
    }

    /// The loaded result set together with the active filter.
    pub async fn snapshot(&self) -> (Arc<Vec<Complaint>>, FilterSpec) {
        let view = self.view.read().await;
        (view.results.clone(), view.filter.clone())
    }

    pub async fn results(&self) -> Arc<Vec<Complaint>> {
        self.view.read().await.results.clone()
    }

    pub async fn table_page(&self) -> TablePage {
        let view = self.view.read().await;
        render_page(&view.results, &view.table)
    }

    /// Edits the table state and renders the resulting page.
    pub async fn update_table<F>(&self, edit: F) -> TablePage
    where
        F: FnOnce(&mut TableState),
    {
        let mut view = self.view.write().await;
        edit(&mut view.table);
        render_page(&view.results, &view.table)
    }

    /// Moves the table to `page`, clamped to the pages of the result set
    /// held under the same lock.
    pub async fn go_to_page(&self, page: usize) -> TablePage {
        let mut view = self.view.write().await;
        let last = total_pages(view.results.len()).max(1);
        view.table.page = page.clamp(1, last);
        render_page(&view.results, &view.table)
    }
}

/// Applies cycle updates to the view.
///
/// Spawn this once per `DashboardState` (see `main.rs`). Updates whose
/// generation is not the latest issued are discarded. A successful outcome
/// replaces the result set and rewinds the table to its first page; a failed
/// one keeps the previous result set and reports the error in the status.
pub async fn start_cycle_updater(state: DashboardState, mut rx: mpsc::Receiver<CycleUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut view = state.view.write().await;
        if update.generation != view.generation {
            if matches!(update.event, CycleEvent::Finished(_)) {
                info!(
                    "discarding result of cycle {} (latest is {})",
                    update.generation, view.generation
                );
            }
            continue;
        }
        let generation = update.generation;
        match update.event {
            CycleEvent::Page(pages) => {
                view.status = FetchStatus::Loading { generation, pages };
            }
            CycleEvent::Finished(Ok(records)) => {
                info!("fetch cycle {} loaded {} complaints", generation, records.len());
                view.status = FetchStatus::Ready {
                    generation,
                    records: records.len(),
                };
                view.results = Arc::new(records);
                view.table.reset_position();
            }
            CycleEvent::Finished(Err(e)) => {
                error!("fetch cycle {} failed: {}", generation, e);
                view.status = FetchStatus::Failed {
                    generation,
                    message: e.to_string(),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemorySource;
    use crate::source::{Column, ComplaintQuery, Predicate};
    use async_trait::async_trait;
    use common::model::filter::SexFilter;
    use common::model::sort::SortField;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn record(id: &str, commune: &str) -> Complaint {
        Complaint {
            id: id.to_string(),
            commune: Some(commune.to_string()),
            ..Default::default()
        }
    }

    fn records() -> Vec<Complaint> {
        vec![
            record("a1", "A"),
            record("a2", "A"),
            record("b1", "B"),
            record("b2", "B"),
            record("b3", "B"),
        ]
    }

    fn running(source: Arc<dyn ComplaintSource>) -> DashboardState {
        let (state, rx) = DashboardState::new(source);
        tokio::spawn(start_cycle_updater(state.clone(), rx));
        state
    }

    /// Waits until cycle `generation` has settled (ready or failed).
    async fn settled(state: &DashboardState, generation: u64) -> FetchStatus {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let status = state.status().await;
                match &status {
                    FetchStatus::Ready { generation: g, .. }
                    | FetchStatus::Failed { generation: g, .. }
                        if *g == generation =>
                    {
                        return status
                    }
                    _ => tokio::time::sleep(Duration::from_millis(5)).await,
                }
            }
        })
        .await
        .expect("cycle did not settle")
    }

    fn commune(name: &str) -> FilterSpec {
        FilterSpec {
            commune: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn equal_filters_do_not_start_a_cycle() {
        let source = Arc::new(MemorySource::new(records()));
        let state = running(source.clone());

        assert_eq!(state.issue(FilterSpec::default()).await, Some(1));
        assert_eq!(
            settled(&state, 1).await,
            FetchStatus::Ready {
                generation: 1,
                records: 5
            }
        );
        assert_eq!(source.requests(), 1);

        let same = FilterSpec {
            motif: Some(String::new()),
            sex: SexFilter::All,
            ..Default::default()
        };
        assert_eq!(state.issue(same).await, None);
        assert_eq!(state.change(FilterChange::Sex(SexFilter::All)).await, None);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.requests(), 1);
    }

    #[tokio::test]
    async fn new_result_set_rewinds_the_table() {
        let source = Arc::new(MemorySource::new(records()));
        let state = running(source);
        state.issue(FilterSpec::default()).await;
        settled(&state, 1).await;

        state
            .update_table(|t| {
                t.page = 2;
                t.toggle_expand("b1");
                t.toggle_sort(SortField::Commune);
            })
            .await;

        let generation = state
            .change(FilterChange::Commune(Some("b".into())))
            .await
            .unwrap();
        settled(&state, generation).await;

        let page = state.table_page().await;
        assert_eq!(page.page, 1);
        assert_eq!(page.expanded_id, None);
        assert_eq!(page.sort.field, SortField::Commune);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn failed_cycle_keeps_previous_results() {
        let source = Arc::new(MemorySource::new(records()));
        let state = running(source.clone());
        state.issue(FilterSpec::default()).await;
        settled(&state, 1).await;

        source.fail_on_request(1);
        let generation = state.refresh().await;
        match settled(&state, generation).await {
            FetchStatus::Failed { message, .. } => assert!(message.contains("rejected")),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(state.results().await.len(), 5);

        // re-applying the same filter is a no-op; refresh is the retry
        assert_eq!(state.issue(FilterSpec::default()).await, None);
        let retry = state.refresh().await;
        assert!(matches!(
            settled(&state, retry).await,
            FetchStatus::Ready { records: 5, .. }
        ));
    }

    #[tokio::test]
    async fn page_moves_are_clamped_to_the_loaded_results() {
        let source = Arc::new(MemorySource::new(
            (0..25).map(|i| record(&format!("r{:02}", i), "A")).collect(),
        ));
        let state = running(source);
        assert_eq!(state.go_to_page(2).await.page, 1);

        state.issue(FilterSpec::default()).await;
        settled(&state, 1).await;
        assert_eq!(state.go_to_page(0).await.page, 1);
        assert_eq!(state.go_to_page(2).await.page, 2);
        let last = state.go_to_page(99).await;
        assert_eq!((last.page, last.total_pages), (3, 3));
        assert_eq!((last.first_index, last.last_index), (21, 25));
    }

    /// Holds back every page request for one commune until released.
    struct GatedSource {
        inner: MemorySource,
        gated: Predicate,
        gate: Notify,
    }

    #[async_trait]
    impl ComplaintSource for GatedSource {
        async fn fetch_page(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>, QueryError> {
            if query.predicates.contains(&self.gated) {
                self.gate.notified().await;
            }
            self.inner.fetch_page(query).await
        }

        async fn fetch_column(
            &self,
            column: Column,
            query: &ComplaintQuery,
        ) -> Result<Vec<Option<String>>, QueryError> {
            self.inner.fetch_column(column, query).await
        }
    }

    fn gated(commune: &str) -> Arc<GatedSource> {
        Arc::new(GatedSource {
            inner: MemorySource::new(records()),
            gated: Predicate::ILike(Column::Commune, commune.to_string()),
            gate: Notify::new(),
        })
    }

    fn ids(results: &[Complaint]) -> Vec<&str> {
        results.iter().map(|c| c.id.as_str()).collect()
    }

    #[tokio::test]
    async fn late_result_of_superseded_cycle_is_dropped() {
        let source = gated("A");
        let state = running(source.clone());

        assert_eq!(state.issue(commune("A")).await, Some(1));
        assert_eq!(state.issue(commune("B")).await, Some(2));
        settled(&state, 2).await;
        assert_eq!(ids(&state.results().await), vec!["b1", "b2", "b3"]);

        source.gate.notify_one();
        tokio::time::timeout(Duration::from_secs(2), async {
            while source.inner.requests() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            state.status().await,
            FetchStatus::Ready {
                generation: 2,
                records: 3
            }
        );
        assert_eq!(ids(&state.results().await), vec!["b1", "b2", "b3"]);
    }

    #[tokio::test]
    async fn early_result_of_superseded_cycle_is_dropped() {
        let source = gated("B");
        let state = running(source.clone());

        state.issue(commune("A")).await;
        state.issue(commune("B")).await;
        // cycle 1 may finish now, it must not be reported as current
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            state.status().await,
            FetchStatus::Loading {
                generation: 2,
                pages: 0
            }
        );
        assert_eq!(state.filter().await, commune("B"));

        source.gate.notify_one();
        settled(&state, 2).await;
        assert_eq!(ids(&state.results().await), vec!["b1", "b2", "b3"]);
    }
}
