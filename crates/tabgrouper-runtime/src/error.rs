//! Runtime errors.

use thiserror::Error;

use tabgrouper_protocols::{HostError, ProviderError};

/// Model output that could not be read as a decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecisionParseError {
    #[error("No JSON object found in response")]
    NoJsonObject,

    #[error("Invalid JSON in response: {0}")]
    InvalidJson(String),
}

/// A field of a decision that was corrected to a safe default.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failure inside the grouping pipeline. Logged, never propagated to the
/// scheduler.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Failure talking to a running engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Engine channel closed")]
    ChannelClosed,
}
