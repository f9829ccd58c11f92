//! Shared User-Agent for query and download traffic.
//!
//! The site serves its grid endpoint to browsers only, so both clients
//! present the same desktop browser string.

/// Browser User-Agent sent with every request to the site.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_looks_like_desktop_browser() {
        assert!(BROWSER_USER_AGENT.starts_with("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
        assert!(BROWSER_USER_AGENT.contains("AppleWebKit/537.36"));
    }
}
