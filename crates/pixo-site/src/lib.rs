//! Pixo Site
//!
//! Build-time tooling and page-shell helpers: the route table, the
//! sitemap generator, page titles, and the upload preview widget.

mod config;
mod routes;
mod sitemap;
mod title;
mod upload;

pub use config::{ConfigError, SiteConfig};
pub use routes::{site_routes, ChangeFreq, Route};
pub use sitemap::{render_sitemap, write_sitemap, SitemapError, URLSET_XMLNS};
pub use title::page_title;
pub use upload::{PickedFile, Preview, UploadError, UploadPreview};
