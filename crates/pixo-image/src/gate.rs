//! Visibility Gate
//!
//! Defers work until an element is near-visible in the viewport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Gate configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOptions {
    /// Lookahead margin around the viewport, in layout units.
    pub root_margin: f32,
    /// Minimum intersection ratio that counts as visible.
    pub threshold: f32,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self { root_margin: 50.0, threshold: 0.1 }
    }
}

/// Handle for one registered near-visibility callback.
pub type SubscriptionId = u64;

/// Callback invoked with the current intersection ratio.
pub type NearVisibleCallback = Box<dyn FnMut(f32) + Send>;

/// Near-visibility events for one observed element.
///
/// A source instance tracks exactly one element; the callback fires
/// whenever the element's intersection ratio crosses the configured
/// threshold in either direction.
pub trait NearVisibleSource: Send + Sync {
    fn subscribe(&self, options: GateOptions, callback: NearVisibleCallback) -> SubscriptionId;

    /// Cancel a subscription; its callback never runs again.
    fn unsubscribe(&self, id: SubscriptionId);
}

type Armed = Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>>;

/// Runs a wired action exactly once, when its element first becomes
/// near-visible.
///
/// Dropping the gate cancels the observation even if visibility was
/// never reached.
pub struct VisibilityGate {
    source: Arc<dyn NearVisibleSource>,
    slot: Arc<Mutex<Option<SubscriptionId>>>,
}

impl VisibilityGate {
    /// Gate `action` behind near-visibility. With `defer` false the
    /// action runs immediately and the source is never consulted.
    pub fn new(
        options: GateOptions,
        defer: bool,
        source: Arc<dyn NearVisibleSource>,
        action: impl FnOnce() + Send + 'static,
    ) -> Self {
        if !defer {
            action();
            return Self { source, slot: Arc::new(Mutex::new(None)) };
        }

        let armed: Armed = Arc::new(Mutex::new(Some(Box::new(action))));
        let slot = Arc::new(Mutex::new(None));
        let threshold = options.threshold;
        let cb_source = source.clone();
        let cb_slot = slot.clone();
        let id = source.subscribe(
            options,
            Box::new(move |ratio| {
                if ratio < threshold {
                    return;
                }
                if let Some(action) = armed.lock().unwrap().take() {
                    action();
                }
                if let Some(id) = cb_slot.lock().unwrap().take() {
                    cb_source.unsubscribe(id);
                }
            }),
        );
        *slot.lock().unwrap() = Some(id);
        Self { source, slot }
    }

    /// Whether the gate is still waiting for visibility.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}

impl Drop for VisibilityGate {
    fn drop(&mut self) {
        if let Some(id) = self.slot.lock().unwrap().take() {
            self.source.unsubscribe(id);
        }
    }
}

/// Axis-aligned rectangle in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Grow outward by a margin on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Overlapping region, if any.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect { x, y, width: right - x, height: bottom - y })
        } else {
            None
        }
    }
}

/// Share of an element lying inside the margin-expanded viewport.
fn intersection_ratio(rect: &Rect, viewport: &Rect, margin: f32) -> f32 {
    let area = rect.area();
    if area <= 0.0 {
        return 0.0;
    }
    match viewport.expand(margin).intersect(rect) {
        Some(overlap) => overlap.area() / area,
        None => 0.0,
    }
}

struct Watcher {
    element: u64,
    options: GateOptions,
    last_ratio: Option<f32>,
    callback: Option<NearVisibleCallback>,
}

#[derive(Default)]
struct TrackerInner {
    viewport: Rect,
    next_element: u64,
    next_subscription: SubscriptionId,
    elements: HashMap<u64, Rect>,
    watchers: HashMap<SubscriptionId, Watcher>,
}

/// Tracks element rectangles against a scrolling viewport and drives
/// near-visibility callbacks on threshold crossings.
pub struct ViewportTracker {
    inner: Mutex<TrackerInner>,
}

impl ViewportTracker {
    pub fn new(viewport: Rect) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(TrackerInner { viewport, ..Default::default() }),
        })
    }

    /// Begin tracking one element's rectangle.
    pub fn track(self: &Arc<Self>, rect: Rect) -> Arc<TrackedElement> {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            inner.next_element += 1;
            let id = inner.next_element;
            inner.elements.insert(id, rect);
            id
        };
        Arc::new(TrackedElement { tracker: self.clone(), id })
    }

    /// Move the viewport (scroll or resize) and re-evaluate watchers.
    pub fn set_viewport(&self, viewport: Rect) {
        self.inner.lock().unwrap().viewport = viewport;
        self.dispatch();
    }

    /// Re-evaluate watchers against the current viewport.
    pub fn refresh(&self) {
        self.dispatch();
    }

    fn set_rect(&self, element: u64, rect: Rect) {
        if let Some(entry) = self.inner.lock().unwrap().elements.get_mut(&element) {
            *entry = rect;
        }
        self.dispatch();
    }

    fn remove_element(&self, element: u64) {
        let mut inner = self.inner.lock().unwrap();
        inner.elements.remove(&element);
        inner.watchers.retain(|_, watcher| watcher.element != element);
    }

    fn subscribe_element(
        &self,
        element: u64,
        options: GateOptions,
        callback: NearVisibleCallback,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_subscription += 1;
        let id = inner.next_subscription;
        inner.watchers.insert(
            id,
            Watcher { element, options, last_ratio: None, callback: Some(callback) },
        );
        id
    }

    fn unsubscribe_id(&self, id: SubscriptionId) {
        self.inner.lock().unwrap().watchers.remove(&id);
    }

    fn dispatch(&self) {
        let due: Vec<(SubscriptionId, f32)> = {
            let mut inner = self.inner.lock().unwrap();
            let viewport = inner.viewport;
            let TrackerInner { elements, watchers, .. } = &mut *inner;
            let mut due = Vec::new();
            for (id, watcher) in watchers.iter_mut() {
                let Some(rect) = elements.get(&watcher.element) else {
                    continue;
                };
                let ratio = intersection_ratio(rect, &viewport, watcher.options.root_margin);
                let threshold = watcher.options.threshold;
                let crossed = match watcher.last_ratio {
                    None => ratio >= threshold,
                    Some(last) => {
                        (last < threshold && ratio >= threshold)
                            || (last >= threshold && ratio < threshold)
                    }
                };
                watcher.last_ratio = Some(ratio);
                if crossed {
                    due.push((*id, ratio));
                }
            }
            due
        };

        for (id, ratio) in due {
            // The callback is taken out of the map for the call so it can
            // unsubscribe itself without deadlocking.
            let callback = {
                let mut inner = self.inner.lock().unwrap();
                inner.watchers.get_mut(&id).and_then(|watcher| watcher.callback.take())
            };
            if let Some(mut callback) = callback {
                callback(ratio);
                let mut inner = self.inner.lock().unwrap();
                if let Some(watcher) = inner.watchers.get_mut(&id) {
                    watcher.callback = Some(callback);
                }
            }
        }
    }
}

/// One element's rectangle registered with a tracker.
///
/// Doubles as the near-visibility source for gates observing the element.
pub struct TrackedElement {
    tracker: Arc<ViewportTracker>,
    id: u64,
}

impl TrackedElement {
    /// Update the element's layout rectangle and re-evaluate watchers.
    pub fn set_rect(&self, rect: Rect) {
        self.tracker.set_rect(self.id, rect);
    }
}

impl NearVisibleSource for TrackedElement {
    fn subscribe(&self, options: GateOptions, callback: NearVisibleCallback) -> SubscriptionId {
        self.tracker.subscribe_element(self.id, options, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.tracker.unsubscribe_id(id);
    }
}

impl Drop for TrackedElement {
    fn drop(&mut self) {
        self.tracker.remove_element(self.id);
    }
}
