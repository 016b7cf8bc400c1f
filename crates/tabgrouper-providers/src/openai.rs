//! OpenAI-compatible chat completions.
//!
//! Shared by every provider that speaks the `/chat/completions` dialect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tabgrouper_protocols::HttpRequest;

use crate::descriptor::RequestParams;

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub fn build_request(params: &RequestParams<'_>) -> HttpRequest {
    let body = ApiRequest {
        model: params.model,
        messages: vec![ApiMessage {
            role: "user",
            content: params.prompt,
        }],
        max_tokens: params.max_tokens,
        temperature: params.temperature,
    };

    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if let Some(key) = params.api_key {
        headers.push(("Authorization".to_string(), format!("Bearer {}", key)));
    }

    HttpRequest {
        url: format!("{}/chat/completions", params.base_url.trim_end_matches('/')),
        headers,
        body: serde_json::to_value(&body).unwrap_or_default(),
    }
}

pub fn extract_content(body: &Value) -> Option<String> {
    let response = ApiResponse::deserialize(body).ok()?;
    response
        .choices
        .into_iter()
        .next()?
        .message?
        .content
        .filter(|text| !text.trim().is_empty())
}
