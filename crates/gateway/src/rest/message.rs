//! Message REST endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::GatewayResult;
use crate::state::GatewayState;
use chatvault_database::{Message, MessageRole};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message_id: Uuid,
    pub chat_id: Uuid,
    pub content: String,
    pub rating: bool,
    pub sent_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub role: MessageRole,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            message_id: message.message_id,
            chat_id: message.chat_id,
            content: message.content,
            rating: message.rating,
            sent_at: message.sent_at,
            role: message.role,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    pub message_id: Uuid,
    pub chat_id: Uuid,
    pub content: String,
    pub rating: bool,
    pub sent_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub role: MessageRole,
}

impl From<CreateMessageRequest> for Message {
    fn from(request: CreateMessageRequest) -> Self {
        Self {
            message_id: request.message_id,
            chat_id: request.chat_id,
            content: request.content,
            rating: request.rating,
            sent_at: request.sent_at,
            role: request.role,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UpdateMessageQuery {
    pub message_id: Uuid,
    pub message_content: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListMessagesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Create message routes
pub fn create_message_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route(
            "/messages",
            axum::routing::get(list_messages)
                .post(create_message)
                .patch(update_message),
        )
        .route(
            "/messages/:message_id",
            axum::routing::get(get_message).delete(delete_message),
        )
}

#[utoipa::path(
    post,
    path = "/messages",
    tag = "Messages",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message created successfully", body = MessageResponse),
        (status = 409, description = "Message already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_message(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<CreateMessageRequest>,
) -> GatewayResult<impl IntoResponse> {
    let message = Message::from(payload);

    let created = state.message_repository.create(&message).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(created))))
}

#[utoipa::path(
    patch,
    path = "/messages",
    tag = "Messages",
    params(UpdateMessageQuery),
    responses(
        (status = 200, description = "Message updated successfully", body = MessageResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_message(
    Query(params): Query<UpdateMessageQuery>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<MessageResponse>> {
    let updated = state
        .message_repository
        .update_content(params.message_id, &params.message_content)
        .await?;

    Ok(Json(MessageResponse::from(updated)))
}

#[utoipa::path(
    get,
    path = "/messages",
    tag = "Messages",
    params(ListMessagesQuery),
    responses(
        (status = 200, description = "Paginated list of messages", body = Vec<MessageResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_messages(
    Query(params): Query<ListMessagesQuery>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<Vec<MessageResponse>>> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(100).max(0);

    let messages = state.message_repository.list(skip, limit).await?;

    let responses: Vec<MessageResponse> =
        messages.into_iter().map(MessageResponse::from).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/messages/{message_id}",
    tag = "Messages",
    params(
        ("message_id" = Uuid, Path, description = "Message identifier")
    ),
    responses(
        (status = 200, description = "Message details", body = MessageResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_message(
    Path(message_id): Path<Uuid>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<MessageResponse>> {
    let message = state.message_repository.find_by_id(message_id).await?;

    Ok(Json(MessageResponse::from(message)))
}

#[utoipa::path(
    delete,
    path = "/messages/{message_id}",
    tag = "Messages",
    params(
        ("message_id" = Uuid, Path, description = "Message identifier")
    ),
    responses(
        (status = 204, description = "Message deleted successfully"),
        (status = 404, description = "Message not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_message(
    Path(message_id): Path<Uuid>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<impl IntoResponse> {
    state.message_repository.delete(message_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
