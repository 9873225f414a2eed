//! Log-safe summaries of upstream response bodies.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Length and hash of a response body, so error bodies that may echo
/// secrets never reach the logs verbatim.
pub fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_hides_body() {
        let summary = summarize_response_body("{\"message\": \"secret\"}");
        assert!(summary.starts_with("len=21,"));
        assert!(!summary.contains("secret"));
    }

    #[test]
    fn test_summary_is_stable() {
        assert_eq!(summarize_response_body("abc"), summarize_response_body("abc"));
        assert_ne!(summarize_response_body("abc"), summarize_response_body("abd"));
    }
}
