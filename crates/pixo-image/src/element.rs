//! Image Element
//!
//! Page-level wiring of one loader behind a visibility gate.

use std::sync::Arc;

use crate::format::CapabilityProbe;
use crate::gate::{GateOptions, NearVisibleSource, VisibilityGate};
use crate::loader::{ImageLoader, ImageRequest, LoadState};
use crate::probe::Prober;
use crate::variants::density_srcset;

/// Declarative description of an image element, mounted into a live
/// element with `mount`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElementConfig {
    pub request: ImageRequest,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub gate_options: GateOptions,
}

impl ImageElementConfig {
    /// Lazy element preferring the efficient format.
    pub fn new(original_path: &str) -> Self {
        Self {
            request: ImageRequest::new(original_path).with_defer_visibility(true),
            alt: String::new(),
            width: None,
            height: None,
            gate_options: GateOptions::default(),
        }
    }

    pub fn with_alt(mut self, alt: &str) -> Self {
        self.alt = alt.to_string();
        self
    }

    pub fn with_defer_visibility(mut self, defer: bool) -> Self {
        self.request.defer_visibility = defer;
        self
    }

    pub fn with_prefer_efficient_format(mut self, prefer: bool) -> Self {
        self.request.prefer_efficient_format = prefer;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_gate_options(mut self, options: GateOptions) -> Self {
        self.gate_options = options;
        self
    }

    /// Wire the loader behind a visibility gate. With deferral off the
    /// load starts before this returns a handle.
    pub fn mount(
        self,
        prober: Arc<dyn Prober>,
        capability: Arc<dyn CapabilityProbe>,
        source: Arc<dyn NearVisibleSource>,
    ) -> ImageElement {
        let defer = self.request.defer_visibility;
        let loader = Arc::new(ImageLoader::new(self.request, prober, capability));
        let task_loader = loader.clone();
        let gate = VisibilityGate::new(self.gate_options, defer, source, move || {
            smol::spawn(async move { task_loader.start().await }).detach();
        });
        ImageElement { loader, gate, alt: self.alt, width: self.width, height: self.height }
    }
}

/// One mounted image. Dropping it tears down the gate observation; a
/// page that changes the path mounts a fresh element rather than
/// mutating this one.
pub struct ImageElement {
    loader: Arc<ImageLoader>,
    gate: VisibilityGate,
    alt: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl ImageElement {
    pub fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    pub fn current_url(&self) -> Option<String> {
        self.loader.current_url()
    }

    pub fn alt(&self) -> &str {
        &self.alt
    }

    pub fn dimensions(&self) -> (Option<u32>, Option<u32>) {
        (self.width, self.height)
    }

    /// Whether the element is still waiting for near-visibility.
    pub fn is_gated(&self) -> bool {
        self.gate.is_pending()
    }

    /// Restart resolution from the full candidate list.
    pub async fn retry(&self) {
        self.loader.retry().await
    }

    pub fn loader(&self) -> &Arc<ImageLoader> {
        &self.loader
    }

    /// Advisory density variants for the resolved URL.
    pub fn srcset(&self) -> Option<String> {
        self.current_url().map(|url| density_srcset(&url))
    }

    /// Text stand-in while no image can be shown.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.load_state() {
            LoadState::Failed => Some("Image not available"),
            LoadState::Idle | LoadState::Probing => Some("Loading image..."),
            LoadState::Resolved { .. } => None,
        }
    }
}
