use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use super::{
    entities::{
        BatchResponse, DispatchResult, DispatchTarget, MembershipDirection, MessageEnvelope,
        MessageTarget, TopicManagementResponse, TopicMembershipChange,
    },
    gateway::{
        NotificationError, PushGateway,
        dummy::DummyPushGateway,
        fcm::{FcmCredentials, FcmPushGateway},
    },
};
use crate::settings::PushSettings;

/// The process-wide handle to the push delivery backend.
enum BackendState {
    Uninitialized,
    Ready(Arc<dyn PushGateway>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Uninitialized,
    Ready,
    Failed,
}

/// Forwards dispatches to the push backend, one backend operation per call.
/// Errors are logged and returned unchanged.
pub struct NotificationService {
    backend: BackendState,
}

impl NotificationService {
    pub fn uninitialized() -> Self {
        Self {
            backend: BackendState::Uninitialized,
        }
    }

    pub fn with_gateway(gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            backend: BackendState::Ready(gateway),
        }
    }

    /// Connects to the configured backend. A failure is logged and leaves the
    /// service in the failed state, in which every dispatch fails fast.
    pub async fn initialize(settings: &PushSettings) -> Self {
        let mut service = Self::uninitialized();

        info!("Initializing push delivery backend");
        service.backend = match Self::connect(settings).await {
            Ok(gateway) => {
                info!("Push delivery backend initialized successfully");
                BackendState::Ready(gateway)
            }
            Err(err) => {
                error!("Failed to initialize push delivery backend: {}", err);
                warn!("FCM service will not be available - check your Firebase configuration");
                BackendState::Failed(err.to_string())
            }
        };

        service
    }

    async fn connect(settings: &PushSettings) -> Result<Arc<dyn PushGateway>, NotificationError> {
        match settings {
            PushSettings::Fcm {
                project_id,
                client_email,
                private_key,
                timeout_secs,
            } => {
                let credentials = FcmCredentials::new(project_id, client_email, private_key);
                let gateway =
                    FcmPushGateway::new(credentials, Duration::from_secs(*timeout_secs)).await?;
                Ok(Arc::new(gateway))
            }
            PushSettings::Dummy => Ok(Arc::new(DummyPushGateway)),
        }
    }

    pub fn status(&self) -> BackendStatus {
        match self.backend {
            BackendState::Uninitialized => BackendStatus::Uninitialized,
            BackendState::Ready(_) => BackendStatus::Ready,
            BackendState::Failed(_) => BackendStatus::Failed,
        }
    }

    fn gateway(&self) -> Result<&dyn PushGateway, NotificationError> {
        match &self.backend {
            BackendState::Ready(gateway) => Ok(gateway.as_ref()),
            BackendState::Failed(reason) => {
                warn!("Push delivery backend unavailable: {}", reason);
                Err(NotificationError::NotInitialized)
            }
            BackendState::Uninitialized => Err(NotificationError::NotInitialized),
        }
    }

    #[instrument(skip(self, envelope))]
    pub async fn send_to_device(
        &self,
        token: &str,
        envelope: &MessageEnvelope,
    ) -> Result<String, NotificationError> {
        let target = MessageTarget::Token(token.to_string());
        match self.gateway()?.send(&target, envelope).await {
            Ok(message_id) => {
                info!("Message sent successfully to device: {}", message_id);
                Ok(message_id)
            }
            Err(err) => {
                error!("Failed to send message to device: {}", err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self, tokens, envelope), fields(tokens = tokens.len()))]
    pub async fn send_to_multiple_devices(
        &self,
        tokens: &[String],
        envelope: &MessageEnvelope,
    ) -> Result<BatchResponse, NotificationError> {
        match self
            .gateway()?
            .send_each_for_multicast(tokens, envelope)
            .await
        {
            Ok(batch) => {
                info!(
                    "Messages sent to {}/{} devices",
                    batch.success_count,
                    tokens.len()
                );
                Ok(batch)
            }
            Err(err) => {
                error!("Failed to send messages to multiple devices: {}", err);
                Err(err)
            }
        }
    }

    #[instrument(skip(self, envelope))]
    pub async fn send_to_topic(
        &self,
        topic: &str,
        envelope: &MessageEnvelope,
    ) -> Result<String, NotificationError> {
        let target = MessageTarget::Topic(topic.to_string());
        match self.gateway()?.send(&target, envelope).await {
            Ok(message_id) => {
                info!(
                    "Message sent successfully to topic '{}': {}",
                    topic, message_id
                );
                Ok(message_id)
            }
            Err(err) => {
                error!("Failed to send message to topic '{}': {}", topic, err);
                Err(err)
            }
        }
    }

    pub async fn subscribe_to_topic(
        &self,
        tokens: &[String],
        topic: &str,
    ) -> Result<TopicManagementResponse, NotificationError> {
        self.change_topic_membership(&TopicMembershipChange {
            tokens: tokens.to_vec(),
            topic: topic.to_string(),
            direction: MembershipDirection::Subscribe,
        })
        .await
    }

    pub async fn unsubscribe_from_topic(
        &self,
        tokens: &[String],
        topic: &str,
    ) -> Result<TopicManagementResponse, NotificationError> {
        self.change_topic_membership(&TopicMembershipChange {
            tokens: tokens.to_vec(),
            topic: topic.to_string(),
            direction: MembershipDirection::Unsubscribe,
        })
        .await
    }

    #[instrument(skip_all, fields(tokens = change.tokens.len(), topic = %change.topic, direction = ?change.direction))]
    pub async fn change_topic_membership(
        &self,
        change: &TopicMembershipChange,
    ) -> Result<TopicManagementResponse, NotificationError> {
        let (done, failed) = match change.direction {
            MembershipDirection::Subscribe => ("Subscribed", "subscribe"),
            MembershipDirection::Unsubscribe => ("Unsubscribed", "unsubscribe"),
        };
        let preposition = match change.direction {
            MembershipDirection::Subscribe => "to",
            MembershipDirection::Unsubscribe => "from",
        };

        match self.gateway()?.update_topic_membership(change).await {
            Ok(response) => {
                info!(
                    "{} {}/{} devices {} topic '{}'",
                    done,
                    response.success_count,
                    change.tokens.len(),
                    preposition,
                    change.topic
                );
                for failure in &response.errors {
                    warn!(
                        index = failure.index,
                        code = %failure.error.code,
                        "Topic membership change rejected for device"
                    );
                }
                Ok(response)
            }
            Err(err) => {
                error!(
                    "Failed to {} devices {} topic '{}': {}",
                    failed, preposition, change.topic, err
                );
                Err(err)
            }
        }
    }

    /// Sends the envelope to any kind of target.
    pub async fn dispatch(
        &self,
        target: &DispatchTarget,
        envelope: &MessageEnvelope,
    ) -> Result<DispatchResult, NotificationError> {
        match target {
            DispatchTarget::Device(token) => self
                .send_to_device(token, envelope)
                .await
                .map(|message_id| DispatchResult::Single { message_id }),
            DispatchTarget::MulticastDevices(tokens) => self
                .send_to_multiple_devices(tokens, envelope)
                .await
                .map(DispatchResult::Batch),
            DispatchTarget::Topic(topic) => self
                .send_to_topic(topic, envelope)
                .await
                .map(|message_id| DispatchResult::Single { message_id }),
        }
    }
}
