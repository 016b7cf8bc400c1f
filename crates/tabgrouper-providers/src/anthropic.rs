//! Anthropic Messages API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tabgrouper_protocols::HttpRequest;

use crate::descriptor::RequestParams;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    text: Option<String>,
}

pub fn build_request(params: &RequestParams<'_>) -> HttpRequest {
    let body = ApiRequest {
        model: params.model,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        messages: vec![ApiMessage {
            role: "user",
            content: params.prompt,
        }],
    };

    let mut headers = vec![
        ("content-type".to_string(), "application/json".to_string()),
        ("anthropic-version".to_string(), API_VERSION.to_string()),
    ];
    if let Some(key) = params.api_key {
        headers.push(("x-api-key".to_string(), key.to_string()));
    }

    HttpRequest {
        url: format!("{}/messages", params.base_url.trim_end_matches('/')),
        headers,
        body: serde_json::to_value(&body).unwrap_or_default(),
    }
}

/// First text block of the response.
pub fn extract_content(body: &Value) -> Option<String> {
    let response = ApiResponse::deserialize(body).ok()?;
    response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .find_map(|block| block.text)
        .filter(|text| !text.trim().is_empty())
}
