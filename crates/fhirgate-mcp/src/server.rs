//! Newline-delimited JSON-RPC loop

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{McpError, Result};
use crate::protocol::{Request, Response, JSONRPC_VERSION, PROTOCOL_VERSION};
use crate::tools::{self, FhirTools};

pub const SERVER_NAME: &str = "fhirgate-mcp";

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// MCP server answering one message per line
#[derive(Debug, Clone)]
pub struct McpServer {
    tools: FhirTools,
}

impl McpServer {
    pub fn new(tools: FhirTools) -> Self {
        Self { tools }
    }

    /// Serve until the reader is exhausted
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Answer a single raw message; notifications get no answer
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(Response::failure(Value::Null, &McpError::Parse(e.to_string()))),
            Ok(value) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                match serde_json::from_value::<Request>(value) {
                    Err(e) => Some(Response::failure(
                        id,
                        &McpError::InvalidRequest(e.to_string()),
                    )),
                    Ok(request) => self.handle_request(request).await,
                }
            }
        };

        response.and_then(|response| match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode response");
                None
            }
        })
    }

    async fn handle_request(&self, request: Request) -> Option<Response> {
        if request.jsonrpc != JSONRPC_VERSION {
            let error = McpError::InvalidRequest(format!(
                "Unsupported jsonrpc version '{}'",
                request.jsonrpc
            ));
            return Some(Response::failure(request.id.unwrap_or(Value::Null), &error));
        }

        let outcome = self.dispatch(&request.method, request.params).await;
        let id = match request.id {
            Some(id) => id,
            None => {
                if let Err(e) = outcome {
                    tracing::debug!(method = %request.method, error = %e, "Notification failed");
                }
                return None;
            }
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(e) => {
                tracing::warn!(method = %request.method, error = %e, "Request failed");
                Response::failure(id, &e)
            }
        })
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value> {
        tracing::debug!(method, "Handling request");
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            "notifications/initialized" | "notifications/cancelled" => Ok(Value::Null),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::definitions() })),
            "tools/call" => {
                let params: CallParams = serde_json::from_value(params.unwrap_or(Value::Null))
                    .map_err(|e| McpError::InvalidParams(e.to_string()))?;
                let arguments = params.arguments.unwrap_or_else(|| json!({}));
                let result = self.tools.call(&params.name, arguments).await?;
                Ok(tool_content(result))
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }
}

/// Wrap a tool result as MCP text content, keeping the structured form too
fn tool_content(result: Value) -> Value {
    let text = match &result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut content = json!({
        "content": [{ "type": "text", "text": text }],
        "isError": false
    });
    if result.is_object() {
        content["structuredContent"] = result;
    }
    content
}
