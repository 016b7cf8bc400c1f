//! Outbound transport seams.

use async_trait::async_trait;

use crate::error::ProviderError;

/// A JSON POST to a provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw HTTP. Only transport-level failures are errors; any status is a response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError>;
}

/// Prompt in, model text out.
///
/// `Ok(None)` means the provider answered but carried no usable content,
/// which is distinct from a transport failure.
#[async_trait]
pub trait PromptTransport: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<Option<String>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_case_insensitive() {
        let request = HttpRequest {
            url: "https://api.example.com".to_string(),
            headers: vec![("X-Api-Key".to_string(), "secret".to_string())],
            body: serde_json::json!({}),
        };
        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse { status: 204, body: String::new() };
        let err = HttpResponse { status: 500, body: String::new() };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
