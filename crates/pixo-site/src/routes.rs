//! Route Table
//!
//! The fixed set of public pages.

/// Publication cadence hint for crawlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

/// One public page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub path: &'static str,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Every page the sitemap covers.
pub fn site_routes() -> Vec<Route> {
    vec![
        Route { path: "/", changefreq: ChangeFreq::Weekly, priority: 1.0 },
        Route { path: "/about", changefreq: ChangeFreq::Monthly, priority: 0.8 },
        Route { path: "/services", changefreq: ChangeFreq::Weekly, priority: 0.9 },
        Route { path: "/courses", changefreq: ChangeFreq::Weekly, priority: 0.9 },
        Route { path: "/contact", changefreq: ChangeFreq::Monthly, priority: 0.7 },
    ]
}
