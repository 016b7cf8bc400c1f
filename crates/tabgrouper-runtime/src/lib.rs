//! # TabGrouper Runtime
//!
//! The tab batching and grouping engine.
//!
//! - [`rules`] - Deterministic rule-based classifier
//! - [`prompt`] / [`decision`] - Prompt building and model output parsing
//! - [`remote`] - Batch classifier over a prompt transport, with mock mode
//! - [`batch`] - Debounced batch scheduler
//! - [`pipeline`] - Mode routing, fallback and decision application
//! - [`engine`] - Event loop tying host events to the pipeline
//! - [`memory_host`] - In-memory browser host

pub mod batch;
pub mod confirmations;
pub mod decision;
pub mod engine;
pub mod error;
pub mod memory_host;
pub mod pipeline;
pub mod prompt;
pub mod remote;
pub mod rules;

pub use batch::{BatchKey, BatchScheduler, FlushSignal, is_processable};
pub use confirmations::{Confirmations, PendingConfirmation};
pub use decision::{interpret, normalize, parse_decision};
pub use engine::{ControlMessage, ControlReply, Engine, EngineEvent, EngineHandle, EngineStatus, HostEvent};
pub use error::{DecisionParseError, EngineError, PipelineError, ValidationIssue};
pub use memory_host::{HostCall, InMemoryBrowser};
pub use pipeline::{GroupingPipeline, PipelineOptions};
pub use prompt::BatchContext;
pub use remote::{RemoteClassifier, mock_decision};
pub use rules::{DEFAULT_RULES, GroupingRule, RulesClassifier};
