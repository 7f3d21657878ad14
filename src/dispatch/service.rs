use std::sync::Arc;
use tracing::instrument;

use super::{
    entities::{
        DispatchResponse, MulticastSendResponse, SendMessageRequest, SendToMultipleDevicesRequest,
        SendToTopicRequest, SingleSendResponse, TopicMembershipResponse, TopicSubscriptionRequest,
    },
    error::{DispatchError, DispatchFailure, DispatchOperation},
};
use crate::{
    notifications::{
        entities::{
            DispatchResult, DispatchTarget, MembershipDirection, MessageEnvelope,
            TopicMembershipChange, is_valid_topic,
        },
        service::NotificationService,
    },
    telemetry::metrics_registry::get_metrics,
};

/// Maximum number of tokens accepted by a single multicast send.
pub const MAX_MULTICAST_TOKENS: usize = 500;
/// Maximum number of tokens accepted by a single topic membership change.
pub const MAX_TOPIC_MEMBERSHIP_TOKENS: usize = 1000;

/// Validates dispatch requests, forwards them to the notification service and
/// shapes the result. Every failure leaves this service as a [`DispatchFailure`].
pub struct DispatchService {
    notification_service: Arc<NotificationService>,
}

impl DispatchService {
    pub fn new(notification_service: Arc<NotificationService>) -> Self {
        Self {
            notification_service,
        }
    }

    pub async fn send_to_device(
        &self,
        request: SendMessageRequest,
    ) -> Result<DispatchResponse, DispatchFailure> {
        let envelope = MessageEnvelope::new(request.title, request.body, request.data);
        self.dispatch(DispatchTarget::Device(request.token), envelope)
            .await
    }

    pub async fn send_to_multiple_devices(
        &self,
        request: SendToMultipleDevicesRequest,
    ) -> Result<DispatchResponse, DispatchFailure> {
        let envelope = MessageEnvelope::new(request.title, request.body, request.data);
        self.dispatch(DispatchTarget::MulticastDevices(request.tokens), envelope)
            .await
    }

    pub async fn send_to_topic(
        &self,
        request: SendToTopicRequest,
    ) -> Result<DispatchResponse, DispatchFailure> {
        let envelope = MessageEnvelope::new(request.title, request.body, request.data);
        self.dispatch(DispatchTarget::Topic(request.topic), envelope)
            .await
    }

    pub async fn subscribe_to_topic(
        &self,
        request: TopicSubscriptionRequest,
    ) -> Result<TopicMembershipResponse, DispatchFailure> {
        self.change_topic_membership(TopicMembershipChange {
            tokens: request.tokens,
            topic: request.topic,
            direction: MembershipDirection::Subscribe,
        })
        .await
    }

    pub async fn unsubscribe_from_topic(
        &self,
        request: TopicSubscriptionRequest,
    ) -> Result<TopicMembershipResponse, DispatchFailure> {
        self.change_topic_membership(TopicMembershipChange {
            tokens: request.tokens,
            topic: request.topic,
            direction: MembershipDirection::Unsubscribe,
        })
        .await
    }

    #[instrument(skip_all)]
    async fn dispatch(
        &self,
        target: DispatchTarget,
        envelope: MessageEnvelope,
    ) -> Result<DispatchResponse, DispatchFailure> {
        let operation = DispatchOperation::for_target(&target);
        record_request(operation);

        let result = async {
            validate_target(&target)?;
            let result = self
                .notification_service
                .dispatch(&target, &envelope)
                .await?;
            Ok::<_, DispatchError>(result)
        }
        .await;

        match result {
            Ok(DispatchResult::Single { message_id }) => {
                let message = match &target {
                    DispatchTarget::Topic(topic) => {
                        format!("Message sent successfully to topic '{}'", topic)
                    }
                    _ => "Notification sent successfully".to_string(),
                };
                Ok(DispatchResponse::Single(SingleSendResponse {
                    success: true,
                    message_id,
                    message,
                }))
            }
            Ok(DispatchResult::Batch(batch)) => {
                record_target_outcomes(operation, batch.success_count, batch.failure_count);
                Ok(DispatchResponse::Multicast(MulticastSendResponse::new(batch)))
            }
            Err(err) => Err(failure(operation, err)),
        }
    }

    #[instrument(skip_all, fields(topic = %change.topic, direction = ?change.direction))]
    async fn change_topic_membership(
        &self,
        change: TopicMembershipChange,
    ) -> Result<TopicMembershipResponse, DispatchFailure> {
        let operation = match change.direction {
            MembershipDirection::Subscribe => DispatchOperation::SubscribeToTopic,
            MembershipDirection::Unsubscribe => DispatchOperation::UnsubscribeFromTopic,
        };
        record_request(operation);

        let result = async {
            validate_tokens(&change.tokens, MAX_TOPIC_MEMBERSHIP_TOKENS)?;
            validate_topic(&change.topic)?;
            let result = match change.direction {
                MembershipDirection::Subscribe => {
                    self.notification_service
                        .subscribe_to_topic(&change.tokens, &change.topic)
                        .await?
                }
                MembershipDirection::Unsubscribe => {
                    self.notification_service
                        .unsubscribe_from_topic(&change.tokens, &change.topic)
                        .await?
                }
            };
            Ok::<_, DispatchError>(result)
        }
        .await
        .map_err(|err| failure(operation, err))?;

        record_target_outcomes(operation, result.success_count, result.failure_count);

        let message = match change.direction {
            MembershipDirection::Subscribe => format!(
                "Subscribed {}/{} devices to topic '{}'",
                result.success_count,
                change.tokens.len(),
                change.topic
            ),
            MembershipDirection::Unsubscribe => format!(
                "Unsubscribed {}/{} devices from topic '{}'",
                result.success_count,
                change.tokens.len(),
                change.topic
            ),
        };

        Ok(TopicMembershipResponse {
            success: true,
            success_count: result.success_count,
            failure_count: result.failure_count,
            message,
        })
    }
}

fn failure(operation: DispatchOperation, err: DispatchError) -> DispatchFailure {
    if let Some(metrics) = get_metrics() {
        metrics.record_failure(operation.as_str());
    }
    DispatchFailure::new(operation, err)
}

fn record_request(operation: DispatchOperation) {
    if let Some(metrics) = get_metrics() {
        metrics.record_request(operation.as_str());
    }
}

fn record_target_outcomes(operation: DispatchOperation, success_count: usize, failure_count: usize) {
    if let Some(metrics) = get_metrics() {
        metrics.record_target_outcomes(operation.as_str(), success_count, failure_count);
    }
}

fn validate_target(target: &DispatchTarget) -> Result<(), DispatchError> {
    match target {
        DispatchTarget::Device(token) => {
            if token.trim().is_empty() {
                return Err(DispatchError::Validation(
                    "token must be a non-empty string".to_string(),
                ));
            }
            Ok(())
        }
        DispatchTarget::MulticastDevices(tokens) => validate_tokens(tokens, MAX_MULTICAST_TOKENS),
        DispatchTarget::Topic(topic) => validate_topic(topic),
    }
}

fn validate_tokens(tokens: &[String], max: usize) -> Result<(), DispatchError> {
    if tokens.is_empty() {
        return Err(DispatchError::Validation(
            "tokens must be a non-empty array".to_string(),
        ));
    }
    if tokens.len() > max {
        return Err(DispatchError::Validation(format!(
            "tokens must not contain more than {} items",
            max
        )));
    }
    if let Some(index) = tokens.iter().position(|token| token.trim().is_empty()) {
        return Err(DispatchError::Validation(format!(
            "tokens[{}] must be a non-empty string",
            index
        )));
    }
    Ok(())
}

fn validate_topic(topic: &str) -> Result<(), DispatchError> {
    if topic.trim().is_empty() {
        return Err(DispatchError::Validation(
            "topic must be a non-empty string".to_string(),
        ));
    }
    if !is_valid_topic(topic) {
        return Err(DispatchError::Validation(format!(
            "topic '{}' must match the format \"/topics/[a-zA-Z0-9-_.~%]+\"",
            topic
        )));
    }
    Ok(())
}
