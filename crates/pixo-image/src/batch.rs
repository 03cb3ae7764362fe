//! Batch Coordinator
//!
//! Aggregates many loaders into one progress signal.

use std::sync::{Arc, Mutex};

use crate::format::CapabilityProbe;
use crate::loader::{ImageLoader, ImageRequest, LoadState};
use crate::probe::Prober;

/// Aggregate progress over a fixed, ordered set of requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchState {
    pub total: usize,
    /// Members currently resolved.
    pub loaded_count: usize,
    /// Positions of members currently failed, in member order.
    pub failed_indices: Vec<usize>,
    /// True while any member is still unsettled.
    pub is_loading: bool,
}

impl BatchState {
    /// Loaded share as a percentage. An empty batch reports zero.
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.loaded_count as f64 / self.total as f64 * 100.0
    }
}

type BatchObserver = Box<dyn Fn(&BatchState) + Send + Sync>;

struct BatchInner {
    members: Vec<Arc<ImageLoader>>,
    observers: Mutex<Vec<BatchObserver>>,
}

impl BatchInner {
    /// Full recomputation from every member's current state. Aggregate
    /// counters are never patched incrementally.
    fn snapshot(&self) -> BatchState {
        let total = self.members.len();
        let mut loaded_count = 0;
        let mut failed_indices = Vec::new();
        for (index, member) in self.members.iter().enumerate() {
            match member.state() {
                LoadState::Resolved { .. } => loaded_count += 1,
                LoadState::Failed => failed_indices.push(index),
                LoadState::Idle | LoadState::Probing => {}
            }
        }
        let is_loading = loaded_count + failed_indices.len() < total;
        BatchState { total, loaded_count, failed_indices, is_loading }
    }

    fn notify(&self) {
        let state = self.snapshot();
        for observer in self.observers.lock().unwrap().iter() {
            observer(&state);
        }
    }
}

/// Owns one loader per request. Members settle independently; every member
/// transition republishes the aggregate state.
#[derive(Clone)]
pub struct BatchHandle {
    inner: Arc<BatchInner>,
}

impl BatchHandle {
    pub fn new(
        requests: Vec<ImageRequest>,
        prober: Arc<dyn Prober>,
        capability: Arc<dyn CapabilityProbe>,
    ) -> Self {
        let members: Vec<Arc<ImageLoader>> = requests
            .into_iter()
            .map(|request| {
                Arc::new(ImageLoader::new(request, prober.clone(), capability.clone()))
            })
            .collect();
        let inner = Arc::new(BatchInner { members, observers: Mutex::new(Vec::new()) });
        for member in &inner.members {
            // Weak link so the member observers never keep the batch alive.
            let weak = Arc::downgrade(&inner);
            member.subscribe(move |_state| {
                if let Some(inner) = weak.upgrade() {
                    inner.notify();
                }
            });
        }
        Self { inner }
    }

    /// Current aggregate state.
    pub fn state(&self) -> BatchState {
        self.inner.snapshot()
    }

    /// Watch aggregate changes. Callbacks run on the settling member's task.
    pub fn subscribe(&self, observer: impl Fn(&BatchState) + Send + Sync + 'static) {
        self.inner.observers.lock().unwrap().push(Box::new(observer));
    }

    pub fn members(&self) -> &[Arc<ImageLoader>] {
        &self.inner.members
    }

    pub fn loader(&self, index: usize) -> Option<&Arc<ImageLoader>> {
        self.inner.members.get(index)
    }

    /// Start every member and wait until all of them settle.
    pub async fn load_all(&self) {
        let tasks: Vec<_> = self
            .inner
            .members
            .iter()
            .map(|member| {
                let member = member.clone();
                smol::spawn(async move { member.start().await })
            })
            .collect();
        for task in tasks {
            task.await;
        }
    }
}
