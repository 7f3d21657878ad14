use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::notifications::entities::{BatchResponse, MessageData, SendResponse};

// Request fields default to empty values so that incomplete requests are
// answered with a failure envelope instead of a rejected body.

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SendMessageRequest {
    #[schema(example = "Hello")]
    pub title: String,
    #[schema(example = "World")]
    pub body: String,
    /// Registration token of the target device
    pub token: String,
    #[schema(value_type = Option<std::collections::HashMap<String, String>>)]
    pub data: Option<MessageData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SendToMultipleDevicesRequest {
    pub title: String,
    pub body: String,
    pub tokens: Vec<String>,
    #[schema(value_type = Option<std::collections::HashMap<String, String>>)]
    pub data: Option<MessageData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SendToTopicRequest {
    pub title: String,
    pub body: String,
    /// Topic name, with or without the `/topics/` prefix
    #[schema(example = "news")]
    pub topic: String,
    #[schema(value_type = Option<std::collections::HashMap<String, String>>)]
    pub data: Option<MessageData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TopicSubscriptionRequest {
    pub tokens: Vec<String>,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleSendResponse {
    pub success: bool,
    pub message_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MulticastSendResponse {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
    pub message: String,
}

impl MulticastSendResponse {
    pub fn new(batch: BatchResponse) -> Self {
        let message = format!(
            "Messages sent to {}/{} devices",
            batch.success_count,
            batch.responses.len()
        );
        Self {
            success: true,
            success_count: batch.success_count,
            failure_count: batch.failure_count,
            responses: batch.responses,
            message,
        }
    }
}

/// Result of any of the send operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum DispatchResponse {
    Single(SingleSendResponse),
    Multicast(MulticastSendResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicMembershipResponse {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FailureResponse {
    /// Always `false`
    pub success: bool,
    #[schema(example = "FCM service is not initialized. Check your Firebase configuration.")]
    pub error: String,
    #[schema(example = "Failed to send notification")]
    pub message: String,
}
