//! Host API errors.

use thiserror::Error;

use crate::types::{GroupId, TabId};

/// A tab, group, settings or notification operation rejected by the host.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Host rejected operation: {0}")]
    Rejected(String),

    #[error("Host capability unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_not_found_display() {
        let err = HostError::TabNotFound(42);
        assert_eq!(err.to_string(), "Tab not found: 42");
    }

    #[test]
    fn test_rejected_display() {
        let err = HostError::Rejected("stale tab id".to_string());
        assert!(err.to_string().contains("stale tab id"));
    }
}
