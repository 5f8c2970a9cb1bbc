//! Cliente de Gemini
//!
//! Usa `streamGenerateContent?alt=sse`: cada evento SSE trae un
//! `GenerateContentResponse` parcial con texto o llamadas a función.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{ChatModel, FunctionCall, ModelChunk, ModelRequest, ModelTurn};
use crate::config::EnvironmentConfig;
use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

// ==================== FORMATO DE PETICIÓN ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCallPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponsePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCallPart {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponsePart {
    name: String,
    response: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<FunctionDeclarationBody>,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionDeclarationBody {
    name: String,
    description: String,
    parameters: Value,
}

// ==================== FORMATO DE RESPUESTA ====================

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part::text(text)],
    }
}

impl GenerateContentRequest {
    fn from_request(request: ModelRequest) -> Self {
        let contents = request
            .turns
            .into_iter()
            .filter_map(|turn| match turn {
                ModelTurn::User(text) => Some(text_content(Some("user"), &text)),
                ModelTurn::Model { text, calls } => {
                    let mut parts = Vec::new();
                    if !text.is_empty() {
                        parts.push(Part::text(text));
                    }
                    parts.extend(calls.into_iter().map(|call| Part {
                        function_call: Some(FunctionCallPart {
                            name: call.name,
                            args: call.args,
                        }),
                        ..Default::default()
                    }));
                    // Gemini rechaza contenidos sin partes
                    (!parts.is_empty()).then(|| Content {
                        role: Some("model".to_string()),
                        parts,
                    })
                }
                ModelTurn::FunctionResults(results) => Some(Content {
                    role: Some("user".to_string()),
                    parts: results
                        .into_iter()
                        .map(|result| Part {
                            function_response: Some(FunctionResponsePart {
                                name: result.name,
                                response: result.response,
                            }),
                            ..Default::default()
                        })
                        .collect(),
                }),
            })
            .collect();

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolSet {
                function_declarations: request
                    .tools
                    .into_iter()
                    .map(|tool| FunctionDeclarationBody {
                        name: tool.name.to_string(),
                        description: tool.description.to_string(),
                        parameters: tool.parameters,
                    })
                    .collect(),
            }]
        };

        Self {
            system_instruction: text_content(None, &request.system_instruction),
            contents,
            tools,
        }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("No se pudo crear el cliente HTTP de Gemini: {}", e))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Cliente configurado si hay API key; `None` deja el chat sin servicio
    pub fn from_environment(config: &EnvironmentConfig) -> anyhow::Result<Option<Self>> {
        match config.gemini_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(Some(Self::new(
                key.trim(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
                config.chat_timeout(),
            )?)),
            _ => Ok(None),
        }
    }

    fn streaming_endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Extraer los fragmentos de un evento SSE
    fn parse_sse_event(event: &str) -> Vec<ModelChunk> {
        let mut chunks = Vec::new();

        for line in event.lines() {
            let Some(data) = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")) else {
                continue;
            };

            let chunk: StreamChunk = match serde_json::from_str(data.trim()) {
                Ok(chunk) => chunk,
                Err(e) => {
                    debug!("Evento SSE ignorado: {}", e);
                    continue;
                }
            };

            let parts = chunk
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .map(|content| content.parts)
                .unwrap_or_default();

            for part in parts {
                if let Some(text) = part.text.filter(|text| !text.is_empty()) {
                    chunks.push(ModelChunk::Text(text));
                }
                if let Some(call) = part.function_call {
                    chunks.push(ModelChunk::FunctionCall(FunctionCall {
                        name: call.name,
                        args: call.args,
                    }));
                }
            }
        }

        chunks
    }
}

/// Acumula bytes del stream y entrega eventos SSE completos. Solo se
/// decodifica UTF-8 sobre eventos enteros: un carácter multibyte puede
/// llegar partido entre dos fragmentos de red.
#[derive(Debug, Default)]
struct SseBuffer {
    bytes: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Gemini puede separar eventos con \r\n\r\n
        self.bytes.extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = self.bytes.windows(2).position(|pair| pair == b"\n\n") {
            let event: Vec<u8> = self.bytes.drain(..end + 2).collect();
            events.push(String::from_utf8_lossy(&event).into_owned());
        }
        events
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn stream_turn(
        &self,
        request: ModelRequest,
    ) -> AppResult<mpsc::Receiver<AppResult<ModelChunk>>> {
        let body = GenerateContentRequest::from_request(request);

        let response = self
            .client
            .post(self.streaming_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            error!("❌ Gemini respondió {}: {}", status, error_text);
            return Err(AppError::ExternalApi(format!(
                "Gemini returned {}: {}",
                status, error_text
            )));
        }

        let (tx, rx) = mpsc::channel(100);
        let model = self.model.clone();

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = SseBuffer::default();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        for event in buffer.push(&bytes) {
                            for chunk in Self::parse_sse_event(&event) {
                                if tx.send(Ok(chunk)).await.is_err() {
                                    debug!("Receptor cerrado, se detiene el stream de {}", model);
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!("⚠️ Error en el stream de Gemini: {}", e);
                        let _ = tx
                            .send(Err(AppError::ExternalApi(format!("Stream error: {}", e))))
                            .await;
                        return;
                    }
                }
            }

            // Evento final sin separador
            for chunk in Self::parse_sse_event(&buffer.finish()) {
                if tx.send(Ok(chunk)).await.is_err() {
                    return;
                }
            }

            info!("✅ Turno de {} completado", model);
        });

        Ok(rx)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{FunctionDeclaration, FunctionResult};
    use serde_json::json;

    #[test]
    fn test_parse_text_and_function_call() {
        let event = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[",
            "{\"text\":\"Checking fleet\"},",
            "{\"functionCall\":{\"name\":\"queryFleetData\",\"args\":{\"table\":\"vehicles\"}}}",
            "]}}]}\n\n"
        );

        let chunks = GeminiClient::parse_sse_event(event);
        assert_eq!(
            chunks,
            vec![
                ModelChunk::Text("Checking fleet".to_string()),
                ModelChunk::FunctionCall(FunctionCall {
                    name: "queryFleetData".to_string(),
                    args: json!({ "table": "vehicles" }),
                }),
            ]
        );
    }

    #[test]
    fn test_parse_ignores_non_data_lines() {
        assert!(GeminiClient::parse_sse_event(": keep-alive\n\n").is_empty());
        assert!(GeminiClient::parse_sse_event("data: not json\n\n").is_empty());
    }

    #[test]
    fn test_buffer_keeps_multibyte_text_split_across_chunks() {
        let raw = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Cost ₹500\"}]}}]}\n\n";
        let bytes = raw.as_bytes();
        // Corte dentro de los tres bytes de ₹
        let cut = raw.find('₹').unwrap() + 1;

        let mut buffer = SseBuffer::default();
        assert!(buffer.push(&bytes[..cut]).is_empty());
        let events = buffer.push(&bytes[cut..]);

        assert_eq!(events.len(), 1);
        assert_eq!(
            GeminiClient::parse_sse_event(&events[0]),
            vec![ModelChunk::Text("Cost ₹500".to_string())]
        );
        assert!(buffer.finish().is_empty());
    }

    #[test]
    fn test_buffer_splits_crlf_events() {
        let mut buffer = SseBuffer::default();
        let events = buffer.push(b"data: {}\r\n\r\ndata: {\"candidates\":[]}\r\n\r\ndata: tail");

        assert_eq!(events, vec!["data: {}\n\n", "data: {\"candidates\":[]}\n\n"]);
        assert_eq!(buffer.finish(), "data: tail");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ModelRequest {
            system_instruction: "You are FleetFlow AI".to_string(),
            turns: vec![
                ModelTurn::User("How many trucks?".to_string()),
                ModelTurn::Model {
                    text: String::new(),
                    calls: vec![FunctionCall {
                        name: "queryFleetData".to_string(),
                        args: json!({ "table": "vehicles" }),
                    }],
                },
                ModelTurn::FunctionResults(vec![FunctionResult {
                    name: "queryFleetData".to_string(),
                    response: json!({ "count": 0, "data": [] }),
                }]),
                // Turno vacío: se descarta
                ModelTurn::Model {
                    text: String::new(),
                    calls: vec![],
                },
            ],
            tools: vec![FunctionDeclaration {
                name: "queryFleetData",
                description: "Query fleet data",
                parameters: json!({ "type": "OBJECT", "properties": {} }),
            }],
        };

        let body = serde_json::to_value(GenerateContentRequest::from_request(request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are FleetFlow AI");
        assert!(body["systemInstruction"].get("role").is_none());

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "queryFleetData");
        assert_eq!(contents[2]["parts"][0]["functionResponse"]["response"]["count"], 0);

        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "queryFleetData"
        );
    }

    #[test]
    fn test_endpoint_uses_sse() {
        let client = GeminiClient::new(
            "key",
            "gemini-2.0-flash",
            "https://example.test/v1beta/",
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(
            client.streaming_endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:streamGenerateContent?alt=sse"
        );
    }
}
