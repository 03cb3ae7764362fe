//! Responsive Variants
//!
//! Density and breakpoint helpers around resolved URLs.

use std::sync::Arc;

use crate::format::{split_extension, CapabilityProbe};
use crate::loader::{ImageLoader, ImageRequest};
use crate::probe::Prober;

/// First width, in layout units, of each breakpoint above mobile.
pub const TABLET_MIN: u32 = 768;
pub const DESKTOP_MIN: u32 = 1024;
pub const WIDE_MIN: u32 = 1440;

/// Advisory `srcset`-style string naming `@2x` / `@3x` density variants
/// of a URL. Paths without an extension get no variants.
pub fn density_srcset(url: &str) -> String {
    match split_extension(url) {
        Some((stem, ext)) => {
            format!("{url} 1x, {stem}@2x.{ext} 2x, {stem}@3x.{ext} 3x")
        }
        None => format!("{url} 1x"),
    }
}

/// Viewport width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Breakpoint {
    #[default]
    Mobile,
    Tablet,
    Desktop,
    Wide,
}

impl Breakpoint {
    pub fn for_width(width: u32) -> Self {
        if width < TABLET_MIN {
            Breakpoint::Mobile
        } else if width < DESKTOP_MIN {
            Breakpoint::Tablet
        } else if width < WIDE_MIN {
            Breakpoint::Desktop
        } else {
            Breakpoint::Wide
        }
    }
}

/// Breakpoint-to-path mapping with a required default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveSet {
    mobile: Option<String>,
    tablet: Option<String>,
    desktop: Option<String>,
    default_path: String,
}

impl ResponsiveSet {
    pub fn new(default_path: &str) -> Self {
        Self {
            mobile: None,
            tablet: None,
            desktop: None,
            default_path: default_path.to_string(),
        }
    }

    pub fn with_mobile(mut self, path: &str) -> Self {
        self.mobile = Some(path.to_string());
        self
    }

    pub fn with_tablet(mut self, path: &str) -> Self {
        self.tablet = Some(path.to_string());
        self
    }

    pub fn with_desktop(mut self, path: &str) -> Self {
        self.desktop = Some(path.to_string());
        self
    }

    /// Path for a viewport width. Wide viewports share the desktop slot;
    /// unset slots fall back to the default.
    pub fn select(&self, width: u32) -> &str {
        let slot = match Breakpoint::for_width(width) {
            Breakpoint::Mobile => &self.mobile,
            Breakpoint::Tablet => &self.tablet,
            Breakpoint::Desktop | Breakpoint::Wide => &self.desktop,
        };
        slot.as_deref().unwrap_or(&self.default_path)
    }
}

/// Warm a list of paths by running each through an eager loader.
/// Failures are ignored.
pub async fn preload(
    paths: &[&str],
    prober: Arc<dyn Prober>,
    capability: Arc<dyn CapabilityProbe>,
) {
    let loaders: Vec<Arc<ImageLoader>> = paths
        .iter()
        .map(|path| {
            Arc::new(ImageLoader::new(
                ImageRequest::new(path),
                prober.clone(),
                capability.clone(),
            ))
        })
        .collect();
    let tasks: Vec<_> = loaders
        .iter()
        .map(|loader| {
            let loader = loader.clone();
            smol::spawn(async move { loader.start().await })
        })
        .collect();
    for task in tasks {
        task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FixedCapability;
    use crate::probe::ProbeResult;
    use std::sync::Mutex;

    #[test]
    fn test_density_srcset_shape() {
        assert_eq!(
            density_srcset("/photos/webp/team.webp"),
            "/photos/webp/team.webp 1x, /photos/webp/team@2x.webp 2x, \
             /photos/webp/team@3x.webp 3x"
        );
    }

    #[test]
    fn test_density_srcset_keeps_dotted_stems() {
        assert_eq!(
            density_srcset("/img/a.b.png"),
            "/img/a.b.png 1x, /img/a.b@2x.png 2x, /img/a.b@3x.png 3x"
        );
    }

    #[test]
    fn test_density_srcset_without_extension() {
        assert_eq!(density_srcset("/logo"), "/logo 1x");
    }

    #[test]
    fn test_breakpoint_boundaries() {
        assert_eq!(Breakpoint::for_width(0), Breakpoint::Mobile);
        assert_eq!(Breakpoint::for_width(767), Breakpoint::Mobile);
        assert_eq!(Breakpoint::for_width(768), Breakpoint::Tablet);
        assert_eq!(Breakpoint::for_width(1023), Breakpoint::Tablet);
        assert_eq!(Breakpoint::for_width(1024), Breakpoint::Desktop);
        assert_eq!(Breakpoint::for_width(1439), Breakpoint::Desktop);
        assert_eq!(Breakpoint::for_width(1440), Breakpoint::Wide);
        assert_eq!(Breakpoint::for_width(2560), Breakpoint::Wide);
    }

    #[test]
    fn test_responsive_set_selects_slot_or_default() {
        let set = ResponsiveSet::new("/img/hero.png")
            .with_mobile("/img/hero-small.png")
            .with_desktop("/img/hero-large.png");

        assert_eq!(set.select(320), "/img/hero-small.png");
        // No tablet slot configured.
        assert_eq!(set.select(800), "/img/hero.png");
        assert_eq!(set.select(1200), "/img/hero-large.png");
        // Wide shares the desktop slot.
        assert_eq!(set.select(1920), "/img/hero-large.png");
    }

    struct RecordingProber {
        probed: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Prober for RecordingProber {
        async fn probe(&self, url: &str) -> ProbeResult {
            self.probed.lock().unwrap().push(url.to_string());
            ProbeResult::Missing
        }
    }

    #[test]
    fn test_preload_probes_every_path() {
        let prober = Arc::new(RecordingProber { probed: Mutex::new(Vec::new()) });

        smol::block_on(preload(
            &["/img/a.png", "/img/b.png"],
            prober.clone(),
            Arc::new(FixedCapability(false)),
        ));

        let mut probed = prober.probed.lock().unwrap().clone();
        probed.sort();
        assert_eq!(probed, vec!["/img/a.png".to_string(), "/img/b.png".to_string()]);
    }
}
