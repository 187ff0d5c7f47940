//! Helpers for API credentials.

/// Attach bearer authentication plus the attribution headers OpenRouter
/// expects from client applications.
pub fn add_auth_headers(request: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
    request
        .bearer_auth(api_key)
        .header("X-Title", "codeaid")
}

/// Mask an API key for display.
///
/// Keys longer than eight characters keep their first and last four
/// characters; shorter keys are fully hidden.
///
/// ```
/// use codeaid::utils::auth::mask_api_key;
///
/// assert_eq!(mask_api_key("sk-or-v1-abcdef"), "sk-o...cdef");
/// assert_eq!(mask_api_key("short"), "****");
/// assert_eq!(mask_api_key(""), "");
/// ```
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => String::new(),
        len if len > 8 => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[len - 4..].iter().collect();
            format!("{head}...{tail}")
        }
        _ => "****".to_string(),
    }
}
