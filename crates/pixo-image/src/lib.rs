//! Pixo Image
//!
//! Adaptive image loading: candidate derivation, existence probing, and
//! visibility-gated resolution.
//!
//! # Goals
//! - Prefer the efficient format without trusting that it exists
//! - Treat a missing image as a value, never an error
//! - Load nothing until the element is near-visible
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use pixo_image::{
//!     DecodeProber, DecoderCapability, HttpFetcher, ImageElementConfig, Rect,
//!     ViewportTracker,
//! };
//!
//! let tracker = ViewportTracker::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let tracked = tracker.track(Rect::new(0.0, 1200.0, 640.0, 480.0));
//! let element = ImageElementConfig::new("/photos/team.png")
//!     .with_alt("The team")
//!     .mount(
//!         Arc::new(DecodeProber::new(Arc::new(HttpFetcher::new()?))),
//!         Arc::new(DecoderCapability::default()),
//!         tracked,
//!     );
//! ```

mod batch;
mod element;
mod format;
mod gate;
mod loader;
mod probe;
mod variants;

pub use batch::{BatchHandle, BatchState};
pub use element::{ImageElement, ImageElementConfig};
pub use format::{
    derive_candidates, is_efficient, Candidate, CapabilityProbe, DecoderCapability,
    FixedCapability, FormatClass,
};
pub use gate::{
    GateOptions, NearVisibleCallback, NearVisibleSource, Rect, SubscriptionId, TrackedElement,
    ViewportTracker, VisibilityGate,
};
pub use loader::{ImageLoader, ImageRequest, LoadState};
pub use probe::{DecodeProber, ProbeResult, Prober};
pub use variants::{
    density_srcset, preload, Breakpoint, ResponsiveSet, DESKTOP_MIN, TABLET_MIN, WIDE_MIN,
};

// Re-export the networking layer for callers wiring a real prober.
pub use pixo_net as net;
pub use pixo_net::{Fetcher, HttpFetcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
