//! Sitemap Generator
//!
//! Renders the route table as `sitemap.xml`.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::SiteConfig;
use crate::routes::Route;

/// Namespace required by the sitemap protocol.
pub const URLSET_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Escape the five XML-reserved characters.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render the sitemap document, one `<url>` entry per route, every
/// entry stamped with the same `lastmod` date.
pub fn render_sitemap(site_url: &str, routes: &[Route], lastmod: NaiveDate) -> String {
    let stamp = lastmod.format("%Y-%m-%d").to_string();
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{URLSET_XMLNS}\">\n"));
    for route in routes {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}{}</loc>\n",
            escape_xml(site_url),
            escape_xml(route.path)
        ));
        xml.push_str(&format!("    <lastmod>{stamp}</lastmod>\n"));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", route.changefreq.as_str()));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", route.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Write `sitemap.xml` under the configured output directory, creating
/// the directory if missing. Returns the written path.
pub fn write_sitemap(
    config: &SiteConfig,
    routes: &[Route],
    lastmod: NaiveDate,
) -> Result<PathBuf, SitemapError> {
    fs::create_dir_all(&config.output_dir)?;
    let path = config.output_dir.join("sitemap.xml");
    fs::write(&path, render_sitemap(&config.site_url, routes, lastmod))?;
    Ok(path)
}
