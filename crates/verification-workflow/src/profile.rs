//! Forum profile URL parsing.

use regex::Regex;
use std::sync::OnceLock;

fn profile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://[^/\s]+/(?:[^\s?]*/)?(?:index\.php\?/)?profile/(\d+)-[^/\s]+/?$")
            .expect("profile pattern is valid")
    })
}

/// Extract the account id from a profile URL such as
/// `https://forum.example.com/profile/21-alice/`.
pub fn parse_profile_url(input: &str) -> Option<String> {
    profile_pattern()
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
