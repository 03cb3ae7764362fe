//! Pixo Sitemap - Build Entry Point

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pixo_site::{site_routes, write_sitemap, SiteConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional config path on the command line
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("site.toml"));

    let config = SiteConfig::load(&config_path).context("loading site config")?;
    let routes = site_routes();
    let today = chrono::Local::now().date_naive();
    let written = write_sitemap(&config, &routes, today).context("writing sitemap")?;

    tracing::info!("sitemap: {} routes -> {}", routes.len(), written.display());
    Ok(())
}
