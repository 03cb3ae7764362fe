//! Format Resolution
//!
//! WebP capability detection and candidate path derivation.

use std::io::Cursor;

use once_cell::sync::OnceCell;

/// File extension of the efficient format.
pub const EFFICIENT_EXT: &str = "webp";

/// Public asset paths get their efficient variants from a mirror subtree.
const ASSETS_PREFIX: &str = "/assets/";
const ASSETS_MIRROR: &str = "/assets/webp/";

/// Format class of a resolved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatClass {
    /// The efficient substitute format (WebP).
    Efficient,
    /// The format the page originally referenced.
    #[default]
    Original,
}

/// One URL to probe, tagged with the format it would resolve as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub format: FormatClass,
}

impl Candidate {
    pub fn efficient(url: String) -> Self {
        Self { url, format: FormatClass::Efficient }
    }

    pub fn original(url: String) -> Self {
        Self { url, format: FormatClass::Original }
    }
}

/// Derive the ordered probe list for an original path.
///
/// Candidates run most-preferred first and always end with the original
/// path itself, except for paths that already name the efficient format
/// or carry no extension at all (single-entry lists, returned unchanged).
pub fn derive_candidates(original_path: &str) -> Vec<Candidate> {
    if is_efficient(original_path) {
        return vec![Candidate::efficient(original_path.to_string())];
    }
    let Some((stem, _ext)) = split_extension(original_path) else {
        return vec![Candidate::original(original_path.to_string())];
    };

    let mut candidates = Vec::with_capacity(4);
    if let Some(sub_stem) = stem.strip_prefix(ASSETS_PREFIX) {
        // /assets/images/a.png mirrors to /assets/webp/images/a.webp
        candidates.push(Candidate::efficient(format!(
            "{ASSETS_MIRROR}{sub_stem}.{EFFICIENT_EXT}"
        )));
    } else {
        let (dir, name) = split_dir(stem);
        candidates.push(Candidate::efficient(format!(
            "{dir}{EFFICIENT_EXT}/{name}.{EFFICIENT_EXT}"
        )));
        candidates.push(Candidate::efficient(format!("{dir}{name}.{EFFICIENT_EXT}")));
    }
    candidates.push(Candidate::efficient(format!("{stem}.{EFFICIENT_EXT}")));
    candidates.push(Candidate::original(original_path.to_string()));

    dedup_keep_first(candidates)
}

/// Whether a path already names the efficient format.
pub fn is_efficient(path: &str) -> bool {
    match split_extension(path) {
        Some((_, ext)) => ext.eq_ignore_ascii_case(EFFICIENT_EXT),
        None => false,
    }
}

/// Split a path into (everything before the final extension, extension).
///
/// The extension must be non-empty and belong to the final path segment;
/// dot-files like `/img/.cache` count as extensionless.
pub(crate) fn split_extension(path: &str) -> Option<(&str, &str)> {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    let split = name_start + dot;
    Some((&path[..split], &path[split + 1..]))
}

/// Split an extensionless path into (directory incl. trailing slash, name).
fn split_dir(stem: &str) -> (&str, &str) {
    match stem.rfind('/') {
        Some(i) => (&stem[..i + 1], &stem[i + 1..]),
        None => ("", stem),
    }
}

/// Drop exact URL duplicates, keeping the highest-priority occurrence.
fn dedup_keep_first(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept.iter().any(|existing| existing.url == candidate.url) {
            kept.push(candidate);
        }
    }
    kept
}

/// Decoding capability query for the efficient format.
pub trait CapabilityProbe: Send + Sync {
    /// Whether this process can decode the efficient format.
    fn supports_efficient(&self) -> bool;
}

/// Fixed capability answer, for tests and forced degradation.
#[derive(Debug, Clone, Copy)]
pub struct FixedCapability(pub bool);

impl CapabilityProbe for FixedCapability {
    fn supports_efficient(&self) -> bool {
        self.0
    }
}

/// One-pixel WebP sample used to discover decoder support.
const WEBP_SAMPLE: &[u8] = &[
    0x52, 0x49, 0x46, 0x46, 0x22, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50, 0x56, 0x50,
    0x38, 0x20, 0x16, 0x00, 0x00, 0x00, 0x30, 0x01, 0x00, 0x9d, 0x01, 0x2a, 0x01, 0x00,
    0x01, 0x00, 0x0e, 0xc0, 0xfe, 0x25, 0xa4, 0x00, 0x03, 0x70, 0x00, 0x00, 0x00, 0x00,
];

static WEBP_SUPPORTED: OnceCell<bool> = OnceCell::new();

/// Capability probe backed by the process image decoder.
///
/// The answer is computed once per process and shared by every loader; a
/// decode failure of the sample means "unsupported", never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderCapability;

impl CapabilityProbe for DecoderCapability {
    fn supports_efficient(&self) -> bool {
        *WEBP_SUPPORTED.get_or_init(|| {
            image::ImageReader::with_format(Cursor::new(WEBP_SAMPLE), image::ImageFormat::WebP)
                .decode()
                .is_ok()
        })
    }
}
