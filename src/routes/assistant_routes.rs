//! Ruta del asistente: respuesta en streaming por server-sent events

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::debug;

use crate::dto::chat_dto::ChatRequest;
use crate::services::{has_user_turn, AssistantService};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, internal_error, AppError};

pub fn create_assistant_router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let model = state
        .assistant
        .clone()
        .ok_or_else(|| internal_error("Assistant service configuration is missing."))?;

    let Json(request) = payload.map_err(|rejection| {
        debug!("Cuerpo de chat rechazado: {}", rejection);
        match rejection {
            JsonRejection::JsonDataError(_) => bad_request_error("Invalid request body"),
            _ => bad_request_error("Malformed JSON body"),
        }
    })?;

    if request.messages.is_empty() {
        return Err(bad_request_error("At least one message is required"));
    }
    if !has_user_turn(&request.messages, state.config.chat_history_limit) {
        return Err(bad_request_error("At least one user message with text is required"));
    }

    let events = AssistantService::new(model, state.clone()).spawn(request.messages);
    let stream = ReceiverStream::new(events).map(|event| {
        Ok(Event::default()
            .event(event.name())
            .data(event.payload().to_string()))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
