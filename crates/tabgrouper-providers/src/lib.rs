//! # TabGrouper Providers
//!
//! Remote model providers for the grouping engine.
//!
//! Each provider is a [`ProviderDescriptor`] in a static registry: how to
//! shape a request and how to pull text out of the response. [`LlmClient`]
//! resolves credentials for the active provider, enforces the call budget
//! and retries transient failures.

pub mod anthropic;
pub mod client;
pub mod credentials;
pub mod descriptor;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod rate_limiter;
pub mod retry;

pub use client::LlmClient;
pub use credentials::{EnvSource, ProcessEnv, ProviderSettings, ResolvedProvider};
pub use descriptor::{ProviderDescriptor, RequestParams, descriptors, lookup, provider_ids};
pub use http::ReqwestTransport;
pub use rate_limiter::RateLimiter;
pub use retry::{RetryConfig, is_retryable};
