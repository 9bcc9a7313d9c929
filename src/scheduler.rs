use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::{NormalizedItem, WatchEntry};
use crate::notify::Notifier;
use crate::sources::SourceAdapter;
use crate::store::{DedupStore, WatchRegistry};
use crate::translate::Translator;
use crate::utils::error::FetchError;

/// Timing and fan-out knobs for the polling loop.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Sleep between cycles.
    pub check_interval: Duration,
    /// Upper bound on a single adapter call.
    pub fetch_timeout: Duration,
    /// Cap on in-flight adapter calls within one cycle.
    pub max_concurrent_fetches: usize,
}

/// One failed adapter call, kept as a first-class value in the cycle report
/// rather than a side-channel log line.
#[derive(Debug)]
pub struct FetchFailure {
    pub source_id: &'static str,
    pub query: String,
    pub error: FetchError,
}

/// Outcome of a single cycle. Returned by `run_cycle` so tests can assert on
/// scheduling behavior deterministically.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub entries: usize,
    pub queries: usize,
    pub fetches: usize,
    pub fetch_failures: Vec<FetchFailure>,
    pub items_seen: usize,
    pub items_new: usize,
    pub deliveries: usize,
    pub delivery_failures: usize,
    pub store_failures: usize,
    /// Set when a shutdown signal interrupted the fan-out.
    pub aborted: bool,
}

struct FetchOutcome {
    source_id: &'static str,
    query: String,
    result: Result<Vec<NormalizedItem>, FetchError>,
}

/// The polling and deduplication engine. Owns its lifecycle: `run` loops
/// until the shutdown signal flips, `run_cycle` executes exactly one pass.
///
/// Per cycle: snapshot the watch registry, fan each distinct query out
/// across every adapter (bounded concurrency), gate every returned item
/// through the dedup store's atomic insert, then deliver survivors to every
/// entry watching that query. Items are marked announced before delivery,
/// so a crash between mark and send loses at most that delivery and never
/// produces duplicates across restarts.
pub struct PollScheduler {
    registry: WatchRegistry,
    dedup: DedupStore,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    notifier: Arc<dyn Notifier>,
    translator: Option<Arc<dyn Translator>>,
    settings: PollSettings,
}

impl PollScheduler {
    pub fn new(
        registry: WatchRegistry,
        dedup: DedupStore,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        notifier: Arc<dyn Notifier>,
        translator: Option<Arc<dyn Translator>>,
        settings: PollSettings,
    ) -> Self {
        Self {
            registry,
            dedup,
            adapters,
            notifier,
            translator,
            settings,
        }
    }

    /// Run until `shutdown` flips to true. The loop itself is the top-level
    /// recovery boundary: cycle failures are reported and the next tick
    /// proceeds regardless.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.settings.check_interval.as_secs(),
            sources = self.adapters.len(),
            "poll scheduler started"
        );

        while !*shutdown.borrow() {
            let report = self.cycle(Some(&shutdown)).await;
            info!(
                entries = report.entries,
                queries = report.queries,
                new_items = report.items_new,
                deliveries = report.deliveries,
                delivery_failures = report.delivery_failures,
                fetch_failures = report.fetch_failures.len(),
                "done checking alerts, sleeping until next cycle"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.settings.check_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("poll scheduler stopped");
    }

    /// Execute exactly one cycle. Used directly by tests.
    pub async fn run_cycle(&self) -> CycleReport {
        self.cycle(None).await
    }

    async fn cycle(&self, shutdown: Option<&watch::Receiver<bool>>) -> CycleReport {
        let mut report = CycleReport::default();

        let entries = match self.registry.list_all().await {
            Ok(entries) => entries,
            Err(e) => {
                // Retried on the next tick; nothing has been marked yet.
                warn!(error = %e, "failed to load watch entries, skipping cycle");
                report.store_failures += 1;
                return report;
            }
        };
        report.entries = entries.len();

        let mut watchers_by_query: HashMap<String, Vec<WatchEntry>> = HashMap::new();
        for entry in entries {
            watchers_by_query
                .entry(entry.query.clone())
                .or_default()
                .push(entry);
        }
        report.queries = watchers_by_query.len();

        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_fetches));
        let mut fetches: JoinSet<FetchOutcome> = JoinSet::new();

        'dispatch: for query in watchers_by_query.keys() {
            for adapter in &self.adapters {
                if shutdown.is_some_and(|s| *s.borrow()) {
                    report.aborted = true;
                    break 'dispatch;
                }

                // Acquiring before spawn bounds the fan-out and keeps the
                // dispatch loop responsive to shutdown between calls.
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break 'dispatch,
                };

                // Acquiring can block behind in-flight fetches; re-check so a
                // signal raised meanwhile is observed within one fetch timeout.
                if shutdown.is_some_and(|s| *s.borrow()) {
                    report.aborted = true;
                    break 'dispatch;
                }

                let adapter = Arc::clone(adapter);
                let query = query.clone();
                let timeout = self.settings.fetch_timeout;
                fetches.spawn(async move {
                    let _permit = permit;
                    let source_id = adapter.id();
                    let result = match tokio::time::timeout(timeout, adapter.fetch(&query)).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::Timeout(timeout)),
                    };
                    FetchOutcome {
                        source_id,
                        query,
                        result,
                    }
                });
            }
        }

        if report.aborted {
            // In-flight fetches have no side effects beyond the network
            // call; abandoning them cannot leave partial dedup state.
            fetches.abort_all();
        }

        while let Some(joined) = fetches.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    warn!(error = %e, "fetch task failed to complete");
                    continue;
                }
            };

            report.fetches += 1;
            match outcome.result {
                Ok(items) => {
                    let watchers = watchers_by_query
                        .get(&outcome.query)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]);
                    self.process_items(outcome.source_id, items, watchers, &mut report)
                        .await;
                }
                Err(error) => {
                    warn!(
                        source = outcome.source_id,
                        query = %outcome.query,
                        error = %error,
                        "source check failed"
                    );
                    report.fetch_failures.push(FetchFailure {
                        source_id: outcome.source_id,
                        query: outcome.query,
                        error,
                    });
                }
            }
        }

        report
    }

    async fn process_items(
        &self,
        source_id: &'static str,
        items: Vec<NormalizedItem>,
        watchers: &[WatchEntry],
        report: &mut CycleReport,
    ) {
        for mut item in items {
            report.items_seen += 1;

            match self.dedup.is_announced(source_id, &item.item_id).await {
                Ok(true) => {
                    debug!(source = source_id, item = %item.item_id, "already announced");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // Item stays unmarked and is retried next cycle.
                    warn!(source = source_id, item = %item.item_id, error = %e, "dedup lookup failed");
                    report.store_failures += 1;
                    continue;
                }
            }

            match self.dedup.mark_announced(source_id, &item.item_id).await {
                Ok(true) => {}
                Ok(false) => {
                    // A concurrent cycle claimed it first.
                    debug!(source = source_id, item = %item.item_id, "lost dedup race");
                    continue;
                }
                Err(e) => {
                    warn!(source = source_id, item = %item.item_id, error = %e, "dedup insert failed");
                    report.store_failures += 1;
                    continue;
                }
            }

            report.items_new += 1;

            if let Some(translator) = &self.translator {
                match translator.translate(&item.title).await {
                    Ok(translated) => item.title = translated,
                    Err(e) => {
                        debug!(item = %item.item_id, error = %e, "translation failed, keeping original title");
                    }
                }
            }

            for watcher in watchers {
                match self.notifier.deliver(&watcher.channel_id, &item).await {
                    Ok(()) => report.deliveries += 1,
                    Err(e) => {
                        // The item is already marked announced; the missed
                        // delivery is surfaced here and not retried.
                        warn!(
                            channel = %watcher.channel_id,
                            item = %item.item_id,
                            error = %e,
                            "delivery failed"
                        );
                        report.delivery_failures += 1;
                    }
                }
            }
        }
    }
}
