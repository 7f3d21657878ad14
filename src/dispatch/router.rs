use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entities::{
    MulticastSendResponse, SendMessageRequest, SendToMultipleDevicesRequest,
    SendToTopicRequest, SingleSendResponse, TopicMembershipResponse, TopicSubscriptionRequest,
};
use super::error::{DispatchError, DispatchFailure, DispatchOperation};
use crate::context::AppContext;

const DISPATCH_TAG: &str = "dispatch";

pub fn router() -> OpenApiRouter<Arc<AppContext>> {
    OpenApiRouter::new()
        .routes(routes!(send_notification))
        .routes(routes!(send_to_multiple_devices))
        .routes(routes!(send_to_topic))
        .routes(routes!(subscribe_to_topic))
        .routes(routes!(unsubscribe_from_topic))
}

/// Reads a dispatch request body. A body sent without a JSON content type is
/// read as an empty request, and well-formed JSON that does not fit the request
/// shape is answered with a failure envelope. Only malformed JSON is rejected.
fn request_body<T: Default>(
    operation: DispatchOperation,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    match payload {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection @ JsonRejection::JsonSyntaxError(_)) => Err(rejection.into_response()),
        Err(rejection) => Err(DispatchFailure::new(
            operation,
            DispatchError::Validation(rejection.body_text()),
        )
        .into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/send-notification",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Notification sent, or a failure envelope with `success: false`", body = SingleSendResponse)
    ),
    tag = DISPATCH_TAG
)]
async fn send_notification(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let req = request_body(DispatchOperation::SendToDevice, payload)?;
    context
        .dispatch_service
        .send_to_device(req)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

#[utoipa::path(
    post,
    path = "/send-to-multiple-devices",
    request_body = SendToMultipleDevicesRequest,
    responses(
        (status = 200, description = "Per-device outcomes, or a failure envelope with `success: false`", body = MulticastSendResponse)
    ),
    tag = DISPATCH_TAG
)]
async fn send_to_multiple_devices(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<SendToMultipleDevicesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let req = request_body(DispatchOperation::SendToMultipleDevices, payload)?;
    context
        .dispatch_service
        .send_to_multiple_devices(req)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

#[utoipa::path(
    post,
    path = "/send-to-topic",
    request_body = SendToTopicRequest,
    responses(
        (status = 200, description = "Message sent to the topic, or a failure envelope with `success: false`", body = SingleSendResponse)
    ),
    tag = DISPATCH_TAG
)]
async fn send_to_topic(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<SendToTopicRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let req = request_body(DispatchOperation::SendToTopic, payload)?;
    context
        .dispatch_service
        .send_to_topic(req)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

#[utoipa::path(
    post,
    path = "/subscribe-to-topic",
    request_body = TopicSubscriptionRequest,
    responses(
        (status = 200, description = "Membership counts, or a failure envelope with `success: false`", body = TopicMembershipResponse)
    ),
    tag = DISPATCH_TAG
)]
async fn subscribe_to_topic(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<TopicSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let req = request_body(DispatchOperation::SubscribeToTopic, payload)?;
    context
        .dispatch_service
        .subscribe_to_topic(req)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

#[utoipa::path(
    post,
    path = "/unsubscribe-from-topic",
    request_body = TopicSubscriptionRequest,
    responses(
        (status = 200, description = "Membership counts, or a failure envelope with `success: false`", body = TopicMembershipResponse)
    ),
    tag = DISPATCH_TAG
)]
async fn unsubscribe_from_topic(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<TopicSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let req = request_body(DispatchOperation::UnsubscribeFromTopic, payload)?;
    context
        .dispatch_service
        .unsubscribe_from_topic(req)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}
