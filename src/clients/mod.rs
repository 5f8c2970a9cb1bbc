//! Clientes de proveedores externos
//!
//! `ChatModel` es la costura entre el asistente y el modelo alojado; el
//! servicio solo conoce esta interfaz.

pub mod chat_model;
pub mod gemini_client;

pub use chat_model::*;
pub use gemini_client::GeminiClient;
