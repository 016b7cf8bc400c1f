//! Debounced tab batching.

mod scheduler;

pub use scheduler::{BatchKey, BatchScheduler, FlushSignal};

use url::Url;

use tabgrouper_protocols::Tab;

/// Whether a tab is eligible for grouping: not incognito, an ordinary web
/// page and not already in a group.
pub fn is_processable(tab: &Tab) -> bool {
    if tab.incognito || tab.is_grouped() {
        return false;
    }
    tab.url
        .as_deref()
        .and_then(|url| Url::parse(url).ok())
        .is_some_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_tab_is_processable() {
        assert!(is_processable(&Tab::new(1, 1, "https://example.com", "Example")));
        assert!(is_processable(&Tab::new(1, 1, "http://localhost:3000/", "Dev")));
    }

    #[test]
    fn test_restricted_schemes() {
        for url in [
            "chrome://newtab/",
            "chrome-extension://abc/options.html",
            "about:blank",
            "file:///etc/hosts",
            "edge://settings",
        ] {
            assert!(!is_processable(&Tab::new(1, 1, url, "")), "{}", url);
        }
    }

    #[test]
    fn test_missing_url() {
        let mut tab = Tab::new(1, 1, "", "Loading");
        assert!(!is_processable(&tab));
        tab.url = None;
        assert!(!is_processable(&tab));
    }

    #[test]
    fn test_incognito_and_grouped() {
        assert!(!is_processable(&Tab::new(1, 1, "https://a.com", "").incognito()));
        assert!(!is_processable(&Tab::new(1, 1, "https://a.com", "").with_group(3)));
    }
}
