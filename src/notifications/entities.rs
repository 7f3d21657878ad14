use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

const TOPIC_PREFIX: &str = "/topics/";

/// Free-form key/value payload delivered alongside the notification.
pub type MessageData = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// The target-independent body of a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEnvelope {
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

impl MessageEnvelope {
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: Option<MessageData>) -> Self {
        Self {
            notification: Notification {
                title: title.into(),
                body: body.into(),
            },
            data,
        }
    }
}

/// Addressee of a single backend message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTarget {
    Token(String),
    Topic(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchTarget {
    Device(String),
    MulticastDevices(Vec<String>),
    Topic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipDirection {
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMembershipChange {
    pub tokens: Vec<String>,
    pub topic: String,
    pub direction: MembershipDirection,
}

/// Error reported by the backend for one target of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeliveryError {
    #[schema(example = "messaging/registration-token-not-registered")]
    pub code: String,
    pub message: String,
}

/// Outcome of sending to one device within a multicast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DeliveryError>,
}

impl SendResponse {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: DeliveryError) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
    /// One entry per input token, in input order
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|r| r.success).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TopicManagementError {
    pub index: usize,
    pub error: DeliveryError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicManagementResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<TopicManagementError>,
}

impl TopicManagementResponse {
    /// Builds the response from per-token results aligned with the request tokens,
    /// where `None` marks a token that was processed successfully.
    pub fn from_results(results: Vec<Option<DeliveryError>>) -> Self {
        let total = results.len();
        let errors: Vec<TopicManagementError> = results
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| result.map(|error| TopicManagementError { index, error }))
            .collect();

        Self {
            success_count: total - errors.len(),
            failure_count: errors.len(),
            errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Single { message_id: String },
    Batch(BatchResponse),
}

/// Topic name as used in message sends, without the `/topics/` prefix.
pub fn topic_name(topic: &str) -> &str {
    topic.strip_prefix(TOPIC_PREFIX).unwrap_or(topic)
}

/// Topic path as used in membership requests, always with the `/topics/` prefix.
pub fn topic_path(topic: &str) -> String {
    format!("{}{}", TOPIC_PREFIX, topic_name(topic))
}

/// Whether `topic` is a well-formed topic, with or without the `/topics/` prefix.
pub fn is_valid_topic(topic: &str) -> bool {
    let name = topic_name(topic);
    let name = name.strip_prefix("private/").unwrap_or(name);
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'))
}
