//! Engine configuration.

use crate::types::ClientId;
use uuid::Uuid;

/// What `diff` does with the edit it just sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingPolicy {
    /// Queue every sent edit until the peer cumulatively acknowledges it. The next
    /// `diff` sends the queued edits ahead of the new one.
    ///
    /// This is not loss recovery. Queued edits keep the `serverVersion` they were
    /// sent with, so once the first of them applies the rest look like duplicates
    /// and are discarded, and the resulting report is still clean. Peers that need
    /// every edit delivered must wait for a round trip between sends.
    #[default]
    Provisional,
    /// Never queue sent edits. The queue only holds what other paths put there.
    Reactive,
}

/// Configuration for a [`SyncEngine`](super::SyncEngine).
///
/// # Examples
///
/// ```
/// use diffsync::{EngineConfig, PendingPolicy};
///
/// let config = EngineConfig {
///     client_id: "editor-1".to_string(),
///     pending_policy: PendingPolicy::Reactive,
///     ..Default::default()
/// };
/// assert!(config.enable_logging);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Identifier stamped on shadows and outgoing messages
    pub client_id: ClientId,

    /// Whether sent edits are provisionally queued
    pub pending_policy: PendingPolicy,

    /// Emit per-edit `tracing` events from the engine
    pub enable_logging: bool,
}

impl EngineConfig {
    /// Default configuration with a fixed client id.
    pub fn new(client_id: impl Into<ClientId>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Set the pending-edit policy.
    #[must_use]
    pub fn with_pending_policy(mut self, policy: PendingPolicy) -> Self {
        self.pending_policy = policy;
        self
    }

    /// Turn engine logging on or off.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client_id: Uuid::new_v4().to_string(),
            pending_policy: PendingPolicy::default(),
            enable_logging: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_ids_are_unique() {
        let a = EngineConfig::default();
        let b = EngineConfig::default();
        assert_ne!(a.client_id, b.client_id);
        assert_eq!(a.pending_policy, PendingPolicy::Provisional);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new("alice")
            .with_pending_policy(PendingPolicy::Reactive)
            .with_logging(false);
        assert_eq!(config.client_id, "alice");
        assert_eq!(config.pending_policy, PendingPolicy::Reactive);
        assert!(!config.enable_logging);
    }
}
