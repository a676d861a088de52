//! URL helpers shared by the feeds.

use url::Url;

/// Returns the registrable-looking part of a URL's host.
///
/// Keeps the last three labels for four-label hosts (`a.b.co.uk` style) and the
/// last two otherwise. Unparseable URLs yield an empty string.
pub fn root_domain(url: &str) -> String {
    let hostname = match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_string(),
        Err(_) => String::new(),
    };
    if hostname.is_empty() {
        return hostname;
    }

    let parts: Vec<&str> = hostname.split('.').collect();
    let keep = if parts.len() == 4 { 3 } else { 2 };
    let start = parts.len().saturating_sub(keep);
    parts[start..].join(".")
}
