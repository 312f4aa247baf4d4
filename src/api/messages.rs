// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    models::{ContactMessage, SendMessageRequest},
    state::AppState,
};

const MAX_SUBJECT_LEN: usize = 200;
const MAX_BODY_LEN: usize = 5000;

/// Send a contact message as the authenticated member.
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    security(("bearer" = [])),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message recorded", body = ContactMessage),
        (status = 400, description = "Empty or oversized message"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn send_message(
    Auth(sender): Auth,
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    let subject = request.subject.trim();
    let body = request.body.trim();

    if subject.is_empty() || body.is_empty() {
        return Err(ApiError::bad_request("Subject and message are required"));
    }
    if subject.chars().count() > MAX_SUBJECT_LEN || body.chars().count() > MAX_BODY_LEN {
        return Err(ApiError::bad_request("Message is too long"));
    }

    let message = ContactMessage {
        id: Uuid::new_v4().to_string(),
        sender_id: sender.user_id,
        sender_email: sender.email,
        subject: subject.to_string(),
        body: body.to_string(),
        sent_at: Utc::now(),
    };
    state.store.write().await.record_message(message.clone());

    tracing::info!(message_id = %message.id, sender = %message.sender_id, "contact message recorded");
    Ok((StatusCode::CREATED, Json(message)))
}
