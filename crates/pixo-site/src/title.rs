//! Page Titles

/// Browser tab title for a page. Pages without a title of their own get
/// the suffix alone; an empty title counts as absent.
pub fn page_title(page: Option<&str>, suffix: &str) -> String {
    match page {
        Some(title) if !title.is_empty() => format!("{title} | {suffix}"),
        _ => suffix.to_string(),
    }
}
