use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::utils::errors::AppResult;

/// Llamada a función pedida por el modelo
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
}

/// Resultado de una herramienta devuelto al modelo
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResult {
    pub name: String,
    pub response: Value,
}

/// Fragmento de un turno del modelo
#[derive(Debug, Clone, PartialEq)]
pub enum ModelChunk {
    Text(String),
    FunctionCall(FunctionCall),
}

/// Turno de la conversación enviado al modelo
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    User(String),
    Model {
        text: String,
        calls: Vec<FunctionCall>,
    },
    FunctionResults(Vec<FunctionResult>),
}

/// Herramienta declarada al modelo; `parameters` es un esquema JSON
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub turns: Vec<ModelTurn>,
    pub tools: Vec<FunctionDeclaration>,
}

/// Modelo conversacional con soporte de herramientas.
///
/// `stream_turn` devuelve un canal con los fragmentos de UN turno del
/// modelo; el canal se cierra al terminar el turno. Un error dentro del
/// canal termina el turno.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_turn(
        &self,
        request: ModelRequest,
    ) -> AppResult<mpsc::Receiver<AppResult<ModelChunk>>>;

    fn model_name(&self) -> &str;
}
