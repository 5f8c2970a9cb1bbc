//! Servicio del asistente conversacional
//!
//! Bucle de herramientas: cada paso envía la conversación al modelo,
//! reenvía su texto al cliente y ejecuta las llamadas a función que pida.
//! Termina cuando el modelo responde sin llamadas o al agotar los pasos.
//! Si el cliente cierra la conexión el canal se cae y el bucle se detiene.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::assistant_prompt::{tool_declarations, FLEET_SYSTEM_PROMPT};
use super::assistant_tools::run_tool;
use crate::clients::{ChatModel, FunctionCall, FunctionResult, ModelChunk, ModelRequest, ModelTurn};
use crate::dto::chat_dto::{ChatMessage, ChatRole};
use crate::state::AppState;

/// Evento enviado al navegador por SSE
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Text(String),
    ToolCall { name: String, args: Value },
    ToolResult { name: String, result: Value },
    Error(String),
    Done,
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Text(_) => "text",
            ChatEvent::ToolCall { .. } => "tool-call",
            ChatEvent::ToolResult { .. } => "tool-result",
            ChatEvent::Error(_) => "error",
            ChatEvent::Done => "done",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ChatEvent::Text(text) => json!({ "text": text }),
            ChatEvent::ToolCall { name, args } => json!({ "name": name, "args": args }),
            ChatEvent::ToolResult { name, result } => json!({ "name": name, "result": result }),
            ChatEvent::Error(message) => json!({ "error": message }),
            ChatEvent::Done => json!({}),
        }
    }
}

/// Prompt del sistema (con los mensajes `system` del cliente añadidos) y
/// turnos de la cola del historial
pub fn build_conversation(messages: &[ChatMessage], history_limit: usize) -> (String, Vec<ModelTurn>) {
    let start = messages.len().saturating_sub(history_limit.max(1));
    let mut system = FLEET_SYSTEM_PROMPT.to_string();
    let mut turns = Vec::new();

    for message in &messages[start..] {
        let text = message.content.text();
        if text.trim().is_empty() {
            continue;
        }
        match message.role {
            ChatRole::System => {
                system.push_str("\n\n");
                system.push_str(&text);
            }
            ChatRole::User => turns.push(ModelTurn::User(text)),
            ChatRole::Assistant => {
                // La conversación enviada al modelo empieza por el usuario
                if !turns.is_empty() {
                    turns.push(ModelTurn::Model { text, calls: Vec::new() });
                }
            }
        }
    }

    (system, turns)
}

/// Hay algo que enviar al modelo: al menos un turno de usuario con texto
/// dentro de la ventana del historial
pub fn has_user_turn(messages: &[ChatMessage], history_limit: usize) -> bool {
    !build_conversation(messages, history_limit).1.is_empty()
}

pub struct AssistantService {
    model: Arc<dyn ChatModel>,
    state: AppState,
    history_limit: usize,
    max_steps: usize,
}

impl AssistantService {
    pub fn new(model: Arc<dyn ChatModel>, state: AppState) -> Self {
        let history_limit = state.config.chat_history_limit;
        let max_steps = state.config.chat_max_steps.max(1);
        Self {
            model,
            state,
            history_limit,
            max_steps,
        }
    }

    /// Lanzar el bucle en segundo plano y devolver el canal de eventos
    pub fn spawn(self, messages: Vec<ChatMessage>) -> mpsc::Receiver<ChatEvent> {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            self.run(messages, tx).await;
        });
        rx
    }

    pub async fn run(&self, messages: Vec<ChatMessage>, tx: mpsc::Sender<ChatEvent>) {
        let (system_instruction, mut turns) = build_conversation(&messages, self.history_limit);
        info!(
            "🤖 Chat con {}: {} mensajes, {} turnos enviados",
            self.model.model_name(),
            messages.len(),
            turns.len()
        );

        for step in 1..=self.max_steps {
            let request = ModelRequest {
                system_instruction: system_instruction.clone(),
                turns: turns.clone(),
                tools: tool_declarations(),
            };

            let mut chunks = match self.model.stream_turn(request).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!("⚠️ El modelo no respondió en el paso {}: {}", step, e);
                    let _ = tx.send(ChatEvent::Error(e.to_string())).await;
                    break;
                }
            };

            let mut text = String::new();
            let mut calls: Vec<FunctionCall> = Vec::new();
            let mut failed = false;

            while let Some(chunk) = chunks.recv().await {
                match chunk {
                    Ok(ModelChunk::Text(delta)) => {
                        text.push_str(&delta);
                        if tx.send(ChatEvent::Text(delta)).await.is_err() {
                            debug!("Cliente desconectado durante el paso {}", step);
                            return;
                        }
                    }
                    Ok(ModelChunk::FunctionCall(call)) => calls.push(call),
                    Err(e) => {
                        warn!("⚠️ Error en el stream del modelo: {}", e);
                        let _ = tx.send(ChatEvent::Error(e.to_string())).await;
                        failed = true;
                        break;
                    }
                }
            }

            if failed {
                break;
            }

            turns.push(ModelTurn::Model {
                text,
                calls: calls.clone(),
            });

            if calls.is_empty() {
                break;
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                if tx
                    .send(ChatEvent::ToolCall {
                        name: call.name.clone(),
                        args: call.args.clone(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }

                let result = run_tool(&self.state, &call).await;
                info!("🛠️ Herramienta {} ejecutada (paso {})", call.name, step);

                if tx
                    .send(ChatEvent::ToolResult {
                        name: call.name.clone(),
                        result: result.clone(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }

                results.push(FunctionResult {
                    name: call.name,
                    response: result,
                });
            }
            turns.push(ModelTurn::FunctionResults(results));

            if step == self.max_steps {
                debug!("Límite de {} pasos alcanzado", self.max_steps);
            }
        }

        let _ = tx.send(ChatEvent::Done).await;
    }
}
