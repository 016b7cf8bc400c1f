//! Gemini generateContent API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tabgrouper_protocols::HttpRequest;

use crate::descriptor::RequestParams;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub fn build_request(params: &RequestParams<'_>) -> HttpRequest {
    let body = GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: params.prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: params.max_tokens,
            temperature: params.temperature,
        },
    };

    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if let Some(key) = params.api_key {
        headers.push(("x-goog-api-key".to_string(), key.to_string()));
    }

    HttpRequest {
        url: format!(
            "{}/models/{}:generateContent",
            params.base_url.trim_end_matches('/'),
            params.model
        ),
        headers,
        body: serde_json::to_value(&body).unwrap_or_default(),
    }
}

pub fn extract_content(body: &Value) -> Option<String> {
    let response = GenerateContentResponse::deserialize(body).ok()?;
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
}
