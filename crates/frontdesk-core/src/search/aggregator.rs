//! Debounced, race-guarded search fan-out.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::model::{NavigationTarget, ResultKind, SearchResult, SearchSnapshot};
use crate::config::SearchConfig;
use crate::source::{
    DirectorySearch, DirectorySource, ResultSource, RoomCatalog, RoomSource, ServiceCatalog,
    ServiceSource, SourceOutcome, settle_all,
};

/// Shared between the aggregator handle and its scheduled runs.
struct Inner {
    sources: Vec<Arc<dyn ResultSource>>,
    config: SearchConfig,
    state: watch::Sender<SearchSnapshot>,
}

impl Inner {
    /// Records a new query and returns its generation if it should run.
    ///
    /// Queries below the minimum length clear the results on the spot.
    fn issue(&self, query: &str) -> Option<u64> {
        let runnable = query.trim().chars().count() >= self.config.min_query_len;
        let mut generation = 0;
        self.state.send_modify(|snap| {
            snap.generation += 1;
            generation = snap.generation;
            query.clone_into(&mut snap.query);
            if !runnable {
                snap.results.clear();
                snap.is_searching = false;
            }
        });
        runnable.then_some(generation)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    /// Fans out and commits the merged results if `generation` is still the latest.
    async fn execute(&self, generation: u64, query: &str) -> Option<Vec<SearchResult>> {
        let started = self.state.send_if_modified(|snap| {
            if snap.generation != generation {
                return false;
            }
            snap.is_searching = true;
            true
        });
        if !started {
            debug!(generation, "Search superseded before fan-out");
            return None;
        }

        let outcomes = settle_all(&self.sources, query.trim(), self.config.source_timeout).await;
        let merged = merge(outcomes, self.config.max_results);

        let committed = self.state.send_if_modified(|snap| {
            if snap.generation != generation {
                return false;
            }
            snap.results.clone_from(&merged);
            snap.is_searching = false;
            true
        });

        if committed {
            debug!(generation, count = merged.len(), "Search results committed");
            Some(merged)
        } else {
            debug!(generation, "Discarding stale search response");
            None
        }
    }

    /// Bumps the generation so nothing in flight can commit any more.
    fn invalidate(&self) {
        self.state.send_modify(|snap| {
            snap.generation += 1;
            snap.is_searching = false;
        });
    }
}

/// Concatenates successful outcomes in source order, de-duplicates, and caps.
fn merge(outcomes: Vec<SourceOutcome>, max_results: usize) -> Vec<SearchResult> {
    let mut seen: HashSet<(ResultKind, String)> = HashSet::new();
    outcomes
        .into_iter()
        .flat_map(SourceOutcome::into_results)
        .filter(|result| seen.insert((result.kind(), result.id().to_string())))
        .take(max_results)
        .collect()
}

/// Global header search across tenants, rooms, and services.
///
/// Every [`set_query`](Self::set_query) call issues a new generation number.
/// A scheduled run captures its generation, sleeps for the debounce interval,
/// and only fans out and commits while that generation is still the latest.
/// Responses to superseded queries are dropped on arrival, so out-of-order
/// network completion can never overwrite newer results.
pub struct SearchAggregator {
    inner: Arc<Inner>,
    pending: Vec<JoinHandle<()>>,
    navigation: Option<mpsc::UnboundedSender<NavigationTarget>>,
}

impl SearchAggregator {
    /// Creates an aggregator over `sources`; merge order follows the slice order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn ResultSource>>, config: SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                sources,
                config,
                state,
            }),
            pending: Vec::new(),
            navigation: None,
        }
    }

    /// Creates the standard tenant, room, automation aggregator.
    #[must_use]
    pub fn standard<D, R, S>(directory: D, rooms: R, services: S, config: SearchConfig) -> Self
    where
        D: DirectorySearch + 'static,
        R: RoomCatalog + 'static,
        S: ServiceCatalog + 'static,
    {
        let sources: Vec<Arc<dyn ResultSource>> = vec![
            Arc::new(DirectorySource::new(
                directory,
                config.directory_page_size,
                config.min_query_len,
            )),
            Arc::new(RoomSource::new(rooms)),
            Arc::new(ServiceSource::new(services)),
        ];
        Self::new(sources, config)
    }

    /// Sends a [`NavigationTarget`] on `sender` whenever a result is chosen.
    #[must_use]
    pub fn with_navigation(mut self, sender: mpsc::UnboundedSender<NavigationTarget>) -> Self {
        self.navigation = Some(sender);
        self
    }

    /// Subscribes to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.state.subscribe()
    }

    /// Current query, results, and loading flag.
    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Handles a keystroke: schedules a debounced run for `query`.
    ///
    /// Must be called within a tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.pending.retain(|handle| !handle.is_finished());

        let Some(generation) = self.inner.issue(&query) else {
            debug!("Query too short, results cleared");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let debounce = inner.config.debounce;
        self.pending.push(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if inner.is_current(generation) {
                inner.execute(generation, &query).await;
            }
        }));
    }

    /// Runs `query` immediately, bypassing the debounce.
    ///
    /// Returns the merged results if they were committed, or `None` if a newer
    /// query superseded this one (or the query was too short).
    pub async fn search_now(&self, query: &str) -> Option<Vec<SearchResult>> {
        let generation = self.inner.issue(query)?;
        self.inner.execute(generation, query).await
    }

    /// Reports a chosen result to the owning container.
    pub fn choose(&self, result: &SearchResult) -> NavigationTarget {
        let target = result.target();
        info!(kind = %target.kind, id = %target.id, "Search result chosen");
        if let Some(sender) = &self.navigation {
            if sender.send(target.clone()).is_err() {
                debug!("Navigation receiver dropped");
            }
        }
        target
    }
}

impl Drop for SearchAggregator {
    fn drop(&mut self) {
        self.inner.invalidate();
        for handle in &self.pending {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use super::*;
    use crate::catalog::{Room, Service};
    use crate::directory::{Contact, ContactPage, SortOrder};
    use crate::{Error, Result};

    /// Directory that records queries and answers after a per-query delay.
    #[derive(Default)]
    struct FakeDirectory {
        calls: Mutex<Vec<String>>,
        slow_queries: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl DirectorySearch for FakeDirectory {
        async fn search(&self, query: &str, _: u32, _: SortOrder) -> Result<ContactPage> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = if self.slow_queries.contains(&query) {
                500
            } else {
                10
            };
            sleep(Duration::from_millis(delay)).await;
            if self.fail {
                return Err(Error::source_unavailable(ResultKind::Tenant, "503"));
            }
            Ok(ContactPage {
                items: vec![Contact::new(
                    format!("t-{query}"),
                    format!("{query} GmbH"),
                    "hello@example.com",
                )],
            })
        }
    }

    struct FakeRooms(usize);

    #[async_trait]
    impl RoomCatalog for FakeRooms {
        async fn list_rooms(&self) -> Result<Vec<Room>> {
            Ok((0..self.0)
                .map(|i| Room {
                    id: format!("r{i}"),
                    name: format!("Acme Room {i}"),
                    code: format!("R{i}"),
                })
                .collect())
        }
    }

    struct FakeServices(usize);

    #[async_trait]
    impl ServiceCatalog for FakeServices {
        async fn list_services(&self) -> Result<Vec<Service>> {
            Ok((0..self.0)
                .map(|i| Service {
                    id: format!("s{i}"),
                    name: format!("Acme Scan {i}"),
                    service_type: "mail-scan".into(),
                    center_code: "BER".into(),
                })
                .collect())
        }
    }

    fn aggregator(directory: Arc<FakeDirectory>, rooms: usize, services: usize) -> SearchAggregator {
        SearchAggregator::standard(
            directory,
            FakeRooms(rooms),
            FakeServices(services),
            SearchConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_rapid_input() {
        let directory = Arc::new(FakeDirectory::default());
        let mut search = aggregator(Arc::clone(&directory), 0, 0);

        for query in ["ac", "acm", "acme"] {
            search.set_query(query);
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(400)).await;

        assert_eq!(*directory.calls.lock().unwrap(), vec!["acme".to_string()]);
        let snap = search.snapshot();
        assert_eq!(snap.query, "acme");
        assert!(!snap.is_searching);
        assert_eq!(snap.results[0].id(), "t-acme");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let directory = Arc::new(FakeDirectory {
            slow_queries: vec!["slow"],
            ..FakeDirectory::default()
        });
        let mut search = aggregator(Arc::clone(&directory), 0, 0);

        search.set_query("slow");
        // Debounce fires and the slow request is now in flight.
        sleep(Duration::from_millis(350)).await;
        assert!(search.snapshot().is_searching);

        search.set_query("fast");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(search.snapshot().results[0].id(), "t-fast");

        // The slow response arrives last and must not replace newer results.
        sleep(Duration::from_millis(500)).await;
        let snap = search.snapshot();
        assert_eq!(directory.calls.lock().unwrap().len(), 2);
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.results[0].id(), "t-fast");
        assert!(!snap.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_now_out_of_order_completion() {
        let directory = Arc::new(FakeDirectory {
            slow_queries: vec!["slow"],
            ..FakeDirectory::default()
        });
        let search = aggregator(directory, 0, 0);

        let (first, second) = tokio::join!(search.search_now("slow"), search.search_now("fast"));
        assert!(first.is_none());
        assert_eq!(second.unwrap()[0].id(), "t-fast");
        assert_eq!(search.snapshot().results[0].id(), "t-fast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_source_contributes_nothing() {
        let directory = Arc::new(FakeDirectory {
            fail: true,
            ..FakeDirectory::default()
        });
        let search = aggregator(directory, 8, 5);

        let results = search.search_now("acme").await.unwrap();
        assert_eq!(results.len(), 10);
        assert!(results[..8].iter().all(|r| r.kind() == ResultKind::Room));
        assert!(results[8..].iter().all(|r| r.kind() == ResultKind::Automation));
        assert_eq!(results[9].id(), "s1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sources_merge_in_precedence_order() {
        let directory = Arc::new(FakeDirectory::default());
        let search = aggregator(directory, 1, 1);

        let results = search.search_now("acme").await.unwrap();
        let kinds: Vec<_> = results.iter().map(SearchResult::kind).collect();
        assert_eq!(
            kinds,
            vec![ResultKind::Tenant, ResultKind::Room, ResultKind::Automation]
        );
    }

    /// Catalog listing every room twice.
    struct RepeatedRooms(usize);

    #[async_trait]
    impl RoomCatalog for RepeatedRooms {
        async fn list_rooms(&self) -> Result<Vec<Room>> {
            let rooms = FakeRooms(self.0).list_rooms().await?;
            Ok(rooms.iter().chain(rooms.iter()).cloned().collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_collapse_before_cap() {
        let search = SearchAggregator::standard(
            Arc::new(FakeDirectory::default()),
            RepeatedRooms(6),
            FakeServices(6),
            SearchConfig::default(),
        );

        let results = search.search_now("acme").await.unwrap();
        assert_eq!(results.len(), 10);
        let keys: HashSet<(ResultKind, String)> = results
            .iter()
            .map(|r| (r.kind(), r.id().to_string()))
            .collect();
        assert_eq!(keys.len(), 10);
        // One tenant, six distinct rooms, then services fill the cap.
        assert_eq!(results[0].kind(), ResultKind::Tenant);
        let rooms: Vec<&str> = results
            .iter()
            .filter(|r| r.kind() == ResultKind::Room)
            .map(SearchResult::id)
            .collect();
        assert_eq!(rooms, vec!["r0", "r1", "r2", "r3", "r4", "r5"]);
        assert_eq!(results[9].id(), "s2");
    }

    #[test]
    fn test_same_id_in_different_kinds_is_kept() {
        let room = SearchResult::Room {
            id: "x1".into(),
            name: "Atlas".into(),
            code: "A".into(),
        };
        let service = SearchResult::Automation {
            id: "x1".into(),
            name: "Atlas scan".into(),
            service_type: "mail-scan".into(),
            center_code: "BER".into(),
        };
        let outcomes = vec![
            SourceOutcome {
                kind: ResultKind::Room,
                result: Ok(vec![room.clone(), room]),
            },
            SourceOutcome {
                kind: ResultKind::Automation,
                result: Ok(vec![service]),
            },
        ];
        let merged = merge(outcomes, 10);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].kind(), ResultKind::Automation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_without_calls() {
        let directory = Arc::new(FakeDirectory::default());
        let mut search = aggregator(Arc::clone(&directory), 3, 0);

        assert!(search.search_now("acme").await.is_some());
        let calls_before = directory.calls.lock().unwrap().len();

        search.set_query(" a ");
        assert!(search.snapshot().results.is_empty());
        search.set_query("   ");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(directory.calls.lock().unwrap().len(), calls_before);
        assert!(search.snapshot().results.is_empty());
        assert!(search.search_now("x").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_choose_notifies_navigation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let search = aggregator(Arc::new(FakeDirectory::default()), 0, 0).with_navigation(tx);

        let result = SearchResult::from(Contact::new("c1", "Ada", "ada@example.com"));
        search.choose(&result);

        let target = rx.recv().await.unwrap();
        assert_eq!(target.kind, ResultKind::Tenant);
        assert_eq!(target.id, "c1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_run() {
        let directory = Arc::new(FakeDirectory::default());
        let mut search = aggregator(Arc::clone(&directory), 0, 0);
        let rx = search.subscribe();

        search.set_query("acme");
        drop(search);
        sleep(Duration::from_millis(400)).await;

        assert!(directory.calls.lock().unwrap().is_empty());
        assert!(rx.borrow().results.is_empty());
    }
}
