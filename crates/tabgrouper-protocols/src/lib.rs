//! # TabGrouper Protocols
//!
//! Shared data model and capability traits for the TabGrouper engine.
//! Contains only types and interface definitions - no implementations.
//!
//! ## Capability Traits
//!
//! - [`TabHost`] - Tab lookup, window queries and grouping
//! - [`GroupHost`] - Group queries and title/color updates
//! - [`SettingsStore`] - Named key-value settings
//! - [`Notifier`] - Notification display and dismissal
//! - [`ContentExtractor`] - Best-effort page content extraction
//! - [`HttpTransport`] - Outbound HTTP to model providers
//! - [`PromptTransport`] - Prompt in, model text out

pub mod error;
pub mod host;
pub mod transport;
pub mod types;

pub use error::{HostError, ProviderError};
pub use host::{
    ContentExtractor, GroupHost, GroupUpdate, HostApis, Notification, Notifier, SettingsStore,
    TabHost, keys,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, PromptTransport};
pub use types::*;
