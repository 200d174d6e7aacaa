//! Endpoint URL construction.
//!
//! Base URLs come from config or `GEMINI_BASE_URL` and may or may not end in
//! a slash; method paths may or may not start with one.

/// Strip trailing slashes from a base URL.
///
/// ```
/// use parley::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://example.test/v1beta/"), "https://example.test/v1beta");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use parley::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://example.test/v1beta/", "/models/gemini-2.5-pro"),
///     "https://example.test/v1beta/models/gemini-2.5-pro"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_any_number_of_trailing_slashes() {
        assert_eq!(normalize_base_url("https://example.test"), "https://example.test");
        assert_eq!(normalize_base_url("https://example.test///"), "https://example.test");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_with_single_slash() {
        for (base, endpoint) in [
            ("https://example.test/v1beta", "models/m:streamGenerateContent"),
            ("https://example.test/v1beta/", "models/m:streamGenerateContent"),
            ("https://example.test/v1beta", "///models/m:streamGenerateContent"),
            ("https://example.test/v1beta//", "/models/m:streamGenerateContent"),
        ] {
            assert_eq!(
                construct_api_url(base, endpoint),
                "https://example.test/v1beta/models/m:streamGenerateContent"
            );
        }
    }

    #[test]
    fn query_string_is_kept() {
        assert_eq!(
            construct_api_url(
                "https://generativelanguage.googleapis.com/v1beta",
                "models/gemini-2.5-pro:streamGenerateContent?alt=sse"
            ),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:streamGenerateContent?alt=sse"
        );
    }
}
