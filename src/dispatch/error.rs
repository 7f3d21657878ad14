use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::entities::FailureResponse;
use crate::notifications::{entities::DispatchTarget, gateway::NotificationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOperation {
    SendToDevice,
    SendToMultipleDevices,
    SendToTopic,
    SubscribeToTopic,
    UnsubscribeFromTopic,
}

impl DispatchOperation {
    pub fn for_target(target: &DispatchTarget) -> Self {
        match target {
            DispatchTarget::Device(_) => DispatchOperation::SendToDevice,
            DispatchTarget::MulticastDevices(_) => DispatchOperation::SendToMultipleDevices,
            DispatchTarget::Topic(_) => DispatchOperation::SendToTopic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOperation::SendToDevice => "send_to_device",
            DispatchOperation::SendToMultipleDevices => "send_to_multiple_devices",
            DispatchOperation::SendToTopic => "send_to_topic",
            DispatchOperation::SubscribeToTopic => "subscribe_to_topic",
            DispatchOperation::UnsubscribeFromTopic => "unsubscribe_from_topic",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            DispatchOperation::SendToDevice => "Failed to send notification",
            DispatchOperation::SendToMultipleDevices => {
                "Failed to send notifications to multiple devices"
            }
            DispatchOperation::SendToTopic => "Failed to send message to topic",
            DispatchOperation::SubscribeToTopic => "Failed to subscribe devices to topic",
            DispatchOperation::UnsubscribeFromTopic => "Failed to unsubscribe devices from topic",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// A failed dispatch operation. Rendered as a `200 OK` failure envelope, so
/// callers branch on the `success` field rather than on the status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{summary}: {error}", summary = .operation.failure_message())]
pub struct DispatchFailure {
    pub operation: DispatchOperation,
    pub error: DispatchError,
}

impl DispatchFailure {
    pub fn new(operation: DispatchOperation, error: impl Into<DispatchError>) -> Self {
        Self {
            operation,
            error: error.into(),
        }
    }

    pub fn to_response_body(&self) -> FailureResponse {
        FailureResponse {
            success: false,
            error: self.error.to_string(),
            message: self.operation.failure_message().to_string(),
        }
    }
}

impl IntoResponse for DispatchFailure {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::OK, Json(self.to_response_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_body_for_uninitialized_backend() {
        let failure = DispatchFailure::new(
            DispatchOperation::SendToDevice,
            NotificationError::NotInitialized,
        );

        assert_eq!(
            failure.to_response_body(),
            FailureResponse {
                success: false,
                error: "FCM service is not initialized. Check your Firebase configuration."
                    .to_string(),
                message: "Failed to send notification".to_string(),
            }
        );
    }

    #[test]
    fn test_failure_keeps_backend_text() {
        let failure = DispatchFailure::new(
            DispatchOperation::UnsubscribeFromTopic,
            NotificationError::SendFailure("Requested entity was not found.".to_string()),
        );

        let body = failure.to_response_body();
        assert_eq!(body.error, "Requested entity was not found.");
        assert_eq!(body.message, "Failed to unsubscribe devices from topic");
    }

    #[test]
    fn test_failure_is_rendered_with_ok_status() {
        let failure = DispatchFailure::new(
            DispatchOperation::SendToTopic,
            DispatchError::Validation("topic must be a non-empty string".to_string()),
        );

        assert_eq!(failure.into_response().status(), StatusCode::OK);
    }
}
