pub mod dummy;
pub mod fcm;

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{
    BatchResponse, MessageEnvelope, MessageTarget, TopicManagementResponse, TopicMembershipChange,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("FCM service is not initialized. Check your Firebase configuration.")]
    NotInitialized,

    /// Rejected or failed backend call, carrying the backend's own error text
    #[error("{0}")]
    SendFailure(String),

    #[error("Failed to initialize notification service: {0}")]
    InitializationFailed(String),
}

/// A push delivery backend. Each method maps to exactly one backend operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Sends one message and returns the backend-assigned message id.
    async fn send(
        &self,
        target: &MessageTarget,
        envelope: &MessageEnvelope,
    ) -> Result<String, NotificationError>;

    /// Sends the envelope to every token. Per-token failures are reported in
    /// the batch, not as an error.
    async fn send_each_for_multicast(
        &self,
        tokens: &[String],
        envelope: &MessageEnvelope,
    ) -> Result<BatchResponse, NotificationError>;

    async fn update_topic_membership(
        &self,
        change: &TopicMembershipChange,
    ) -> Result<TopicManagementResponse, NotificationError>;
}
