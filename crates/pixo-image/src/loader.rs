//! Single-Image Loader
//!
//! State machine resolving one logical image to its best loadable candidate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::format::{derive_candidates, Candidate, CapabilityProbe, FormatClass};
use crate::probe::{ProbeResult, Prober};

/// One logical image to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub original_path: String,
    pub defer_visibility: bool,
    pub prefer_efficient_format: bool,
}

impl ImageRequest {
    /// Eager request preferring the efficient format.
    pub fn new(original_path: &str) -> Self {
        Self {
            original_path: original_path.to_string(),
            defer_visibility: false,
            prefer_efficient_format: true,
        }
    }

    pub fn with_defer_visibility(mut self, defer: bool) -> Self {
        self.defer_visibility = defer;
        self
    }

    pub fn with_prefer_efficient_format(mut self, prefer: bool) -> Self {
        self.prefer_efficient_format = prefer;
        self
    }
}

/// Observable state of a loader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Not started yet (visibility-gated and not yet near-visible).
    #[default]
    Idle,
    /// Candidates are being checked in order.
    Probing,
    /// A working candidate was found.
    Resolved { url: String, format: FormatClass },
    /// Every candidate failed, including the original path.
    Failed,
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Resolved { .. } | LoadState::Failed)
    }
}

type Observer = Box<dyn Fn(&LoadState) + Send + Sync>;

/// Resolves one request to a usable URL.
///
/// Share behind `Arc`. Each probe cycle carries the generation current at
/// its start; `retry` bumps the generation, so a superseded cycle can
/// never publish its result.
pub struct ImageLoader {
    request: ImageRequest,
    prober: Arc<dyn Prober>,
    capability: Arc<dyn CapabilityProbe>,
    state: Mutex<LoadState>,
    generation: AtomicU64,
    observers: Mutex<Vec<Observer>>,
}

impl ImageLoader {
    pub fn new(
        request: ImageRequest,
        prober: Arc<dyn Prober>,
        capability: Arc<dyn CapabilityProbe>,
    ) -> Self {
        Self {
            request,
            prober,
            capability,
            state: Mutex::new(LoadState::Idle),
            generation: AtomicU64::new(0),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn request(&self) -> &ImageRequest {
        &self.request
    }

    /// Current state snapshot.
    pub fn state(&self) -> LoadState {
        self.state.lock().unwrap().clone()
    }

    /// Resolved URL, if resolution has succeeded.
    pub fn current_url(&self) -> Option<String> {
        match &*self.state.lock().unwrap() {
            LoadState::Resolved { url, .. } => Some(url.clone()),
            _ => None,
        }
    }

    /// Watch state changes. Callbacks run on the probing task.
    pub fn subscribe(&self, observer: impl Fn(&LoadState) + Send + Sync + 'static) {
        self.observers.lock().unwrap().push(Box::new(observer));
    }

    /// Begin resolution. A no-op while a cycle is already probing.
    pub async fn start(&self) {
        let generation = {
            let mut state = self.state.lock().unwrap();
            if *state == LoadState::Probing {
                return;
            }
            *state = LoadState::Probing;
            self.generation.load(Ordering::SeqCst)
        };
        self.notify(&LoadState::Probing);
        self.run_cycle(generation).await;
    }

    /// Restart resolution from the full candidate list, superseding any
    /// in-flight cycle.
    pub async fn retry(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.lock().unwrap() = LoadState::Probing;
        self.notify(&LoadState::Probing);
        self.run_cycle(generation).await;
    }

    async fn run_cycle(&self, generation: u64) {
        let path = self.request.original_path.as_str();
        if path.is_empty() {
            tracing::debug!("empty image path, failing without probing");
            self.finish(generation, LoadState::Failed);
            return;
        }

        for candidate in self.plan() {
            if self.superseded(generation) {
                return;
            }
            let result = self.prober.probe(&candidate.url).await;
            if self.superseded(generation) {
                return;
            }
            if let ProbeResult::Exists { width, height } = result {
                tracing::info!(
                    "image resolved: {} ({}x{}, {:?})",
                    candidate.url,
                    width,
                    height,
                    candidate.format
                );
                self.finish(
                    generation,
                    LoadState::Resolved { url: candidate.url, format: candidate.format },
                );
                return;
            }
        }

        tracing::info!("image failed: no loadable candidate for {path}");
        self.finish(generation, LoadState::Failed);
    }

    /// Candidate plan for this request.
    fn plan(&self) -> Vec<Candidate> {
        if self.request.prefer_efficient_format && self.capability.supports_efficient() {
            derive_candidates(&self.request.original_path)
        } else {
            vec![Candidate::original(self.request.original_path.clone())]
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    /// Publish a terminal state unless this cycle has been superseded.
    fn finish(&self, generation: u64, next: LoadState) {
        let published = {
            let mut state = self.state.lock().unwrap();
            if self.generation.load(Ordering::SeqCst) != generation {
                false
            } else {
                *state = next.clone();
                true
            }
        };
        if published {
            self.notify(&next);
        }
    }

    fn notify(&self, state: &LoadState) {
        let observers = self.observers.lock().unwrap();
        for observer in observers.iter() {
            observer(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FixedCapability;
    use std::collections::HashMap;

    /// Prober answering from a fixed map, recording every probed URL.
    struct ScriptedProber {
        results: HashMap<String, ProbeResult>,
        probed: Mutex<Vec<String>>,
    }

    impl ScriptedProber {
        fn new(results: Vec<(&str, ProbeResult)>) -> Arc<Self> {
            Arc::new(Self {
                results: results
                    .into_iter()
                    .map(|(url, result)| (url.to_string(), result))
                    .collect(),
                probed: Mutex::new(Vec::new()),
            })
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            self.probed.lock().unwrap().push(url.to_string());
            self.results.get(url).copied().unwrap_or(ProbeResult::Missing)
        }
    }

    /// Prober that parks each probe until the test answers it.
    struct GatedProber {
        started: smol::channel::Sender<(String, smol::channel::Sender<ProbeResult>)>,
    }

    impl GatedProber {
        fn new() -> (
            Arc<Self>,
            smol::channel::Receiver<(String, smol::channel::Sender<ProbeResult>)>,
        ) {
            let (started, incoming) = smol::channel::unbounded();
            (Arc::new(Self { started }), incoming)
        }
    }

    #[async_trait::async_trait]
    impl Prober for GatedProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            let (reply, answer) = smol::channel::bounded(1);
            if self.started.send((url.to_string(), reply)).await.is_err() {
                return ProbeResult::Missing;
            }
            answer.recv().await.unwrap_or(ProbeResult::Missing)
        }
    }

    fn exists() -> ProbeResult {
        ProbeResult::Exists { width: 10, height: 10 }
    }

    fn loader(path: &str, prober: Arc<dyn Prober>, supported: bool) -> Arc<ImageLoader> {
        Arc::new(ImageLoader::new(
            ImageRequest::new(path),
            prober,
            Arc::new(FixedCapability(supported)),
        ))
    }

    #[test]
    fn test_first_success_short_circuits() {
        let prober = ScriptedProber::new(vec![("/photos/webp/team.webp", exists())]);
        let subject = loader("/photos/team.png", prober.clone(), true);

        smol::block_on(subject.start());

        assert_eq!(prober.probed(), vec!["/photos/webp/team.webp"]);
        assert_eq!(
            subject.state(),
            LoadState::Resolved {
                url: "/photos/webp/team.webp".to_string(),
                format: FormatClass::Efficient,
            }
        );
        assert_eq!(subject.current_url().as_deref(), Some("/photos/webp/team.webp"));
    }

    #[test]
    fn test_exhaustion_reaches_failed() {
        let prober = ScriptedProber::new(Vec::new());
        let subject = loader("/photos/team.png", prober.clone(), true);

        smol::block_on(subject.start());

        assert_eq!(subject.state(), LoadState::Failed);
        assert_eq!(
            prober.probed(),
            vec!["/photos/webp/team.webp", "/photos/team.webp", "/photos/team.png"]
        );
    }

    #[test]
    fn test_original_fallback_keeps_original_tag() {
        let prober = ScriptedProber::new(vec![("/photos/team.png", exists())]);
        let subject = loader("/photos/team.png", prober.clone(), true);

        smol::block_on(subject.start());

        assert_eq!(
            subject.state(),
            LoadState::Resolved {
                url: "/photos/team.png".to_string(),
                format: FormatClass::Original,
            }
        );
    }

    #[test]
    fn test_empty_path_fails_without_probing() {
        let prober = ScriptedProber::new(Vec::new());
        let subject = loader("", prober.clone(), true);

        smol::block_on(subject.start());

        assert_eq!(subject.state(), LoadState::Failed);
        assert!(prober.probed().is_empty());
    }

    #[test]
    fn test_unsupported_capability_probes_only_original() {
        let prober = ScriptedProber::new(vec![("/photos/team.png", exists())]);
        let subject = loader("/photos/team.png", prober.clone(), false);

        smol::block_on(subject.start());

        assert_eq!(prober.probed(), vec!["/photos/team.png"]);
        assert_eq!(
            subject.state(),
            LoadState::Resolved {
                url: "/photos/team.png".to_string(),
                format: FormatClass::Original,
            }
        );
    }

    #[test]
    fn test_prefer_disabled_probes_only_original() {
        let prober = ScriptedProber::new(Vec::new());
        let request = ImageRequest::new("/photos/team.png").with_prefer_efficient_format(false);
        let subject = Arc::new(ImageLoader::new(
            request,
            prober.clone() as Arc<dyn Prober>,
            Arc::new(FixedCapability(true)),
        ));

        smol::block_on(subject.start());

        assert_eq!(prober.probed(), vec!["/photos/team.png"]);
        assert_eq!(subject.state(), LoadState::Failed);
    }

    #[test]
    fn test_observers_see_each_transition() {
        let prober = ScriptedProber::new(vec![("/photos/webp/team.webp", exists())]);
        let subject = loader("/photos/team.png", prober, true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        subject.subscribe(move |state| sink.lock().unwrap().push(state.clone()));

        smol::block_on(subject.start());

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], LoadState::Probing);
        assert!(matches!(seen[1], LoadState::Resolved { .. }));
    }

    #[test]
    fn test_start_is_noop_while_probing() {
        smol::block_on(async {
            let (prober, incoming) = GatedProber::new();
            let subject = loader("/photos/team.png", prober, true);

            let running = smol::spawn({
                let subject = subject.clone();
                async move { subject.start().await }
            });
            let (url, reply) = incoming.recv().await.unwrap();
            assert_eq!(url, "/photos/webp/team.webp");

            // A second start while the first cycle is parked must not
            // begin another probe sequence.
            subject.start().await;
            assert!(incoming.is_empty());

            reply.send(exists()).await.unwrap();
            running.await;

            assert!(matches!(subject.state(), LoadState::Resolved { .. }));
            assert!(incoming.is_empty());
        });
    }

    #[test]
    fn test_retry_supersedes_inflight_cycle() {
        smol::block_on(async {
            let (prober, incoming) = GatedProber::new();
            let subject = loader("/photos/team.png", prober, true);

            let first = smol::spawn({
                let subject = subject.clone();
                async move { subject.start().await }
            });
            let (url, stale_reply) = incoming.recv().await.unwrap();
            assert_eq!(url, "/photos/webp/team.webp");

            let second = smol::spawn({
                let subject = subject.clone();
                async move { subject.retry().await }
            });
            let (url, retry_reply) = incoming.recv().await.unwrap();
            assert_eq!(url, "/photos/webp/team.webp");

            // The stale cycle resolves successfully, but its generation is
            // gone; the result must be discarded.
            stale_reply.send(exists()).await.unwrap();
            first.await;
            assert_eq!(subject.state(), LoadState::Probing);

            // The retry cycle walks on to the original and wins.
            retry_reply.send(ProbeResult::Missing).await.unwrap();
            let (url, reply) = incoming.recv().await.unwrap();
            assert_eq!(url, "/photos/team.webp");
            reply.send(ProbeResult::Missing).await.unwrap();
            let (url, reply) = incoming.recv().await.unwrap();
            assert_eq!(url, "/photos/team.png");
            reply.send(exists()).await.unwrap();
            second.await;

            assert_eq!(
                subject.state(),
                LoadState::Resolved {
                    url: "/photos/team.png".to_string(),
                    format: FormatClass::Original,
                }
            );
        });
    }

    #[test]
    fn test_retry_restarts_full_candidate_list() {
        let prober = ScriptedProber::new(vec![("/photos/team.png", exists())]);
        let subject = loader("/photos/team.png", prober.clone(), true);

        // Nothing efficient exists, so each cycle walks all three
        // candidates before landing on the original.
        smol::block_on(subject.start());
        assert!(matches!(subject.state(), LoadState::Resolved { .. }));

        smol::block_on(subject.retry());
        assert_eq!(prober.probed().len(), 6);
    }
}
