//! Concurrency coordinator
//!
//! Fans generation requests out to a [`DocGenerator`] with a bounded number
//! in flight, waits for every request to settle, and freezes the results
//! into an immutable [`RewriteMap`] keyed by [`DocId`].
//!
//! Only owned request data (`DocRequest`) crosses task boundaries. Syntax
//! nodes stay on the caller's side; completions are correlated back to the
//! tree purely through their `DocId`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::collector::{DocId, DocRequest};
use crate::error::DocweaveError;
use crate::generation::{DocGenerator, GenerationError};

/// Default number of generation requests in flight
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// What a failed target contributes to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Leave the declaration undocumented
    #[default]
    Skip,
    /// Insert a fallback block naming the error
    Placeholder,
}

/// Documentation text for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDoc {
    pub id: DocId,
    /// Unindented, newline separated documentation text
    pub text: String,
    /// Produced by the failure policy rather than the generator
    pub placeholder: bool,
}

impl GeneratedDoc {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            placeholder: false,
        }
    }

    fn placeholder(id: DocId, error: &GenerationError) -> Self {
        Self {
            id,
            text: format!("<summary>Documentation could not be generated: {error}</summary>"),
            placeholder: true,
        }
    }
}

/// Frozen `DocId -> GeneratedDoc` map handed to the rewriter
///
/// Built once from an iterator; there is no way to add or remove entries
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteMap {
    entries: BTreeMap<DocId, GeneratedDoc>,
}

impl RewriteMap {
    pub fn get(&self, id: DocId) -> Option<&GeneratedDoc> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in ascending offset order
    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedDoc> {
        self.entries.values()
    }
}

impl FromIterator<GeneratedDoc> for RewriteMap {
    fn from_iter<I: IntoIterator<Item = GeneratedDoc>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|doc| (doc.id, doc)).collect(),
        }
    }
}

/// Progress callback invoked as `(settled, total)`
pub type ProgressHook = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Maximum number of requests in flight (values below 1 behave as 1)
    pub max_concurrency: usize,
    /// Overall deadline; unfinished targets count as failed
    pub timeout: Option<Duration>,
    pub on_failure: FailurePolicy,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
            on_failure: FailurePolicy::default(),
        }
    }
}

/// A target whose generation did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub id: DocId,
    pub name: String,
    pub error: GenerationError,
}

impl TargetFailure {
    /// The failure as a run-level error naming the declaration
    pub fn to_error(&self) -> DocweaveError {
        DocweaveError::generation(&self.name, self.error.clone())
    }
}

/// Everything the coordinator learned in one run
#[derive(Debug, Clone, Default)]
pub struct CoordinatorOutcome {
    pub map: RewriteMap,
    pub failures: Vec<TargetFailure>,
    /// Whether the overall deadline cut the run short
    pub timed_out: bool,
}

impl CoordinatorOutcome {
    /// Number of entries produced by the generator itself
    pub fn generated(&self) -> usize {
        self.map.iter().filter(|doc| !doc.placeholder).count()
    }
}

/// Drives generation for a batch of targets
pub struct Coordinator {
    generator: Arc<dyn DocGenerator>,
    options: CoordinatorOptions,
    progress: Option<ProgressHook>,
}

impl Coordinator {
    pub fn new(generator: Arc<dyn DocGenerator>, options: CoordinatorOptions) -> Self {
        Self {
            generator,
            options,
            progress: None,
        }
    }

    /// Set a progress callback invoked after each request settles
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Generate documentation for every request and wait for all of them
    pub async fn run(&self, requests: Vec<DocRequest>) -> CoordinatorOutcome {
        let total = requests.len();
        if total == 0 {
            return CoordinatorOutcome::default();
        }

        let permits = self.options.max_concurrency.max(1);
        tracing::info!(total, max_concurrency = permits, "Starting generation");

        let semaphore = Arc::new(Semaphore::new(permits));
        let results: Arc<DashMap<DocId, GeneratedDoc>> = Arc::new(DashMap::new());
        let mut pending: HashMap<DocId, String> = HashMap::with_capacity(total);
        let mut join_set = JoinSet::new();

        for request in requests {
            pending.insert(request.id, request.name.clone());

            let semaphore = Arc::clone(&semaphore);
            let generator = Arc::clone(&self.generator);
            let results = Arc::clone(&results);

            join_set.spawn(async move {
                let DocRequest { id, name, snippet, .. } = request;
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (id, Err(GenerationError::other("concurrency gate closed"))),
                };

                tracing::debug!(id = %id, name = %name, "Dispatching generation request");
                let result = match generator.generate(&name, &snippet).await {
                    Ok(text) if text.trim().is_empty() => Err(GenerationError::EmptyResponse),
                    other => other,
                };

                if let Ok(text) = &result {
                    results.insert(id, GeneratedDoc::new(id, text.clone()));
                }
                (id, result)
            });
        }

        let mut failures = Vec::new();
        let mut settled = 0usize;

        let drain = async {
            while let Some(joined) = join_set.join_next().await {
                settled += 1;
                match joined {
                    Ok((id, Ok(_))) => {
                        pending.remove(&id);
                        tracing::debug!(id = %id, "Generated documentation");
                    }
                    Ok((id, Err(error))) => {
                        let name = pending.remove(&id).unwrap_or_default();
                        let failure = TargetFailure { id, name, error };
                        tracing::warn!(id = %id, "{}", failure.to_error());
                        failures.push(failure);
                    }
                    Err(join_error) => {
                        // The id stays pending and is reported below
                        let error = DocweaveError::internal_error(format!(
                            "generation task did not complete: {join_error}"
                        ));
                        tracing::error!(kind = ?error.kind(), "{error}");
                    }
                }
                if let Some(progress) = &self.progress {
                    progress(settled, total);
                }
            }
        };

        let timed_out = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, drain).await.is_err(),
            None => {
                drain.await;
                false
            }
        };

        if timed_out {
            tracing::warn!(
                unfinished = pending.len(),
                "Generation deadline reached, treating unfinished targets as failed"
            );
            join_set.shutdown().await;
        }

        // Anything still pending never settled cleanly; keep it out of the map
        let mut unsettled: Vec<(DocId, String)> = pending.into_iter().collect();
        unsettled.sort_by_key(|(id, _)| *id);
        for (id, name) in unsettled {
            results.remove(&id);
            let error = if timed_out {
                GenerationError::Timeout {
                    seconds: self.options.timeout.map(whole_seconds).unwrap_or_default(),
                }
            } else {
                GenerationError::other("generation task aborted")
            };
            failures.push(TargetFailure { id, name, error });
        }
        failures.sort_by_key(|failure| failure.id);

        let results = Arc::try_unwrap(results).unwrap_or_else(|shared| (*shared).clone());
        let mut docs: Vec<GeneratedDoc> = results.into_iter().map(|(_, doc)| doc).collect();

        if self.options.on_failure == FailurePolicy::Placeholder {
            docs.extend(
                failures
                    .iter()
                    .map(|failure| GeneratedDoc::placeholder(failure.id, &failure.error)),
            );
        }

        let map: RewriteMap = docs.into_iter().collect();
        tracing::info!(
            generated = map.len(),
            failed = failures.len(),
            timed_out,
            "Generation finished"
        );

        CoordinatorOutcome {
            map,
            failures,
            timed_out,
        }
    }
}

/// `duration` in seconds, rounded up so sub-second deadlines never read as 0
fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::DeclKind;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn requests(names: &[&str]) -> Vec<DocRequest> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| DocRequest {
                id: DocId::new(i as u32 * 10),
                kind: DeclKind::Method,
                name: name.to_string(),
                snippet: format!("void {name}() {{}}"),
            })
            .collect()
    }

    /// Tracks the highest number of concurrent calls
    #[derive(Default)]
    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocGenerator for ConcurrencyProbe {
        async fn generate(&self, name: &str, _snippet: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("<summary>{name}</summary>"))
        }
    }

    /// Fails for the listed names, sleeps forever for `hang`
    struct Selective {
        fail: Vec<&'static str>,
        hang: Option<&'static str>,
    }

    #[async_trait]
    impl DocGenerator for Selective {
        async fn generate(&self, name: &str, _snippet: &str) -> Result<String, GenerationError> {
            if self.hang == Some(name) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail.contains(&name) {
                return Err(GenerationError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(format!("<summary>{name}</summary>"))
        }
    }

    #[tokio::test]
    async fn test_bounded_concurrency() {
        let probe = Arc::new(ConcurrencyProbe::default());
        let coordinator = Coordinator::new(probe.clone(), CoordinatorOptions::default());

        let names = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
        let outcome = coordinator.run(requests(&names)).await;

        assert_eq!(outcome.map.len(), 10);
        assert!(outcome.failures.is_empty());
        assert!(probe.max_seen.load(Ordering::SeqCst) <= DEFAULT_MAX_CONCURRENCY);
        assert!(probe.max_seen.load(Ordering::SeqCst) >= 1);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_single_permit_serializes() {
        let probe = Arc::new(ConcurrencyProbe::default());
        let options = CoordinatorOptions {
            max_concurrency: 1,
            ..CoordinatorOptions::default()
        };
        let outcome = Coordinator::new(probe.clone(), options)
            .run(requests(&["A", "B", "C"]))
            .await;
        assert_eq!(outcome.map.len(), 3);
        assert_eq!(probe.max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_results_are_keyed_by_id() {
        let outcome = Coordinator::new(Arc::new(ConcurrencyProbe::default()), CoordinatorOptions::default())
            .run(requests(&["Alpha", "Beta"]))
            .await;
        assert_eq!(
            outcome.map.get(DocId::new(0)).map(|d| d.text.as_str()),
            Some("<summary>Alpha</summary>")
        );
        assert_eq!(
            outcome.map.get(DocId::new(10)).map(|d| d.text.as_str()),
            Some("<summary>Beta</summary>")
        );
    }

    #[tokio::test]
    async fn test_failure_is_isolated_with_skip_policy() {
        let generator = Arc::new(Selective {
            fail: vec!["B"],
            hang: None,
        });
        let outcome = Coordinator::new(generator, CoordinatorOptions::default())
            .run(requests(&["A", "B", "C"]))
            .await;

        assert_eq!(outcome.map.len(), 2);
        assert!(!outcome.map.contains(DocId::new(10)));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].name, "B");
        assert_eq!(outcome.generated(), 2);
    }

    #[tokio::test]
    async fn test_placeholder_policy_names_the_error() {
        let generator = Arc::new(Selective {
            fail: vec!["B"],
            hang: None,
        });
        let options = CoordinatorOptions {
            on_failure: FailurePolicy::Placeholder,
            ..CoordinatorOptions::default()
        };
        let outcome = Coordinator::new(generator, options)
            .run(requests(&["A", "B"]))
            .await;

        let placeholder = outcome.map.get(DocId::new(10)).expect("placeholder");
        assert!(placeholder.placeholder);
        assert!(placeholder.text.contains("status 500"));
        assert_eq!(outcome.generated(), 1);
    }

    #[tokio::test]
    async fn test_timeout_treats_unfinished_as_failed() {
        let generator = Arc::new(Selective {
            fail: vec![],
            hang: Some("Slow"),
        });
        let options = CoordinatorOptions {
            timeout: Some(Duration::from_millis(200)),
            ..CoordinatorOptions::default()
        };
        let outcome = Coordinator::new(generator, options)
            .run(requests(&["Fast", "Slow"]))
            .await;

        assert!(outcome.timed_out);
        assert_eq!(outcome.map.len(), 1);
        assert!(outcome.map.contains(DocId::new(0)));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].error, GenerationError::Timeout { seconds: 1 });
        assert_eq!(
            outcome.failures[0].to_error().to_string(),
            "Generation failed for 'Slow': timed out after 1s"
        );
    }

    #[test]
    fn test_whole_seconds_rounds_up() {
        assert_eq!(whole_seconds(Duration::from_millis(200)), 1);
        assert_eq!(whole_seconds(Duration::from_secs(30)), 30);
        assert_eq!(whole_seconds(Duration::from_millis(30_001)), 31);
        assert_eq!(whole_seconds(Duration::ZERO), 0);
    }

    #[tokio::test]
    async fn test_blank_text_counts_as_failure() {
        let generator = Arc::new(crate::generation::StaticGenerator::new("  \n "));
        let outcome = Coordinator::new(generator, CoordinatorOptions::default())
            .run(requests(&["A"]))
            .await;
        assert!(outcome.map.is_empty());
        assert_eq!(outcome.failures[0].error, GenerationError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_empty_batch_never_calls_generator() {
        let probe = Arc::new(ConcurrencyProbe::default());
        let outcome = Coordinator::new(probe.clone(), CoordinatorOptions::default())
            .run(Vec::new())
            .await;
        assert!(outcome.map.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_progress_hook_reports_every_settlement() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook: ProgressHook = Arc::new(move |settled, total| {
            sink.lock().unwrap().push((settled, total));
        });

        Coordinator::new(Arc::new(ConcurrencyProbe::default()), CoordinatorOptions::default())
            .with_progress(hook)
            .run(requests(&["A", "B", "C", "D"]))
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen.last(), Some(&(4, 4)));
    }

    #[test]
    fn test_rewrite_map_from_iterator() {
        let map: RewriteMap = vec![
            GeneratedDoc::new(DocId::new(30), "c"),
            GeneratedDoc::new(DocId::new(10), "a"),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.ids().collect::<Vec<_>>(), vec![DocId::new(10), DocId::new(30)]);
    }
}
