use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{NotificationError, PushGateway};
use crate::notifications::entities::{
    BatchResponse, MessageEnvelope, MessageTarget, SendResponse, TopicManagementResponse,
    TopicMembershipChange,
};

/// Gateway for local development: logs every request and reports success.
pub struct DummyPushGateway;

fn dummy_message_id() -> String {
    format!("projects/dummy/messages/{}", Uuid::new_v4())
}

#[async_trait]
impl PushGateway for DummyPushGateway {
    async fn send(
        &self,
        target: &MessageTarget,
        envelope: &MessageEnvelope,
    ) -> Result<String, NotificationError> {
        info!(
            "Notification '{}' to {:?}",
            envelope.notification.title, target
        );
        Ok(dummy_message_id())
    }

    async fn send_each_for_multicast(
        &self,
        tokens: &[String],
        envelope: &MessageEnvelope,
    ) -> Result<BatchResponse, NotificationError> {
        info!(
            "Notification '{}' to {} devices",
            envelope.notification.title,
            tokens.len()
        );
        let responses = tokens
            .iter()
            .map(|_| SendResponse::delivered(dummy_message_id()))
            .collect();
        Ok(BatchResponse::from_responses(responses))
    }

    async fn update_topic_membership(
        &self,
        change: &TopicMembershipChange,
    ) -> Result<TopicManagementResponse, NotificationError> {
        info!(
            "{:?} {} devices for topic '{}'",
            change.direction,
            change.tokens.len(),
            change.topic
        );
        Ok(TopicManagementResponse::from_results(vec![
            None;
            change.tokens.len()
        ]))
    }
}
