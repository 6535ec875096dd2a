//! Wire types for the wiki server's MCP conversation.
//!
//! The server speaks newline-delimited JSON-RPC 2.0 and uses a narrow
//! slice of MCP: `initialize`, `tools/list` and `tools/call`. Every tool
//! answers with one text block holding a JSON payload, so the content
//! model here is text only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{codes, Error, Result};

/// Value of the `jsonrpc` member on every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request id. Clients pick either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// `"abc"`
    String(String),
    /// `42`
    Number(i64),
}

/// A request or, when `id` is absent, a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Absent on notifications.
    #[serde(default)]
    pub id: Option<JsonRpcId>,
    /// `initialize`, `tools/call`, ...
    pub method: String,
    /// Method arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Error member of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// See [`crate::error::codes`].
    pub code: i32,
    /// Human-readable reason.
    pub message: String,
}

/// One response line. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Echo of the request id; `null` when the request could not be read.
    pub id: Option<JsonRpcId>,
    /// Set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response carrying `result`.
    ///
    /// A result that cannot be serialized turns into an internal error
    /// response rather than a `null` result.
    pub fn success(id: Option<JsonRpcId>, result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: JSONRPC_VERSION.into(),
                id,
                result: Some(value),
                error: None,
            },
            Err(e) => Self::error(
                id,
                codes::INTERNAL_ERROR,
                format!("cannot serialize result: {}", e),
            ),
        }
    }

    /// Failed response.
    pub fn error(id: Option<JsonRpcId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Failed response for a crate error, using [`Error::code`].
    pub fn failure(id: Option<JsonRpcId>, err: &Error) -> Self {
        Self::error(id, err.code(), err.to_string())
    }
}

/// An inbound line, classified.
#[derive(Debug, Clone)]
pub enum McpMessage {
    /// Has `method` and `id`; must be answered.
    Request(JsonRpcRequest),
    /// Has `method` but no `id`; never answered.
    Notification(JsonRpcRequest),
    /// Has `result` or `error`. The server sends no requests, so these are
    /// dropped.
    Response(JsonRpcResponse),
}

impl McpMessage {
    /// Classify and decode one line.
    ///
    /// Malformed JSON is [`Error::Serialization`] (`-32700`); well-formed
    /// JSON that is none of the three shapes is `-32600`.
    pub fn parse(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)?;

        let has_method = value.get("method").is_some();
        let has_id = value.get("id").is_some_and(|id| !id.is_null());
        let has_outcome = value.get("result").is_some() || value.get("error").is_some();

        match (has_method, has_id, has_outcome) {
            (true, true, _) => Ok(Self::Request(serde_json::from_value(value)?)),
            (true, false, _) => Ok(Self::Notification(serde_json::from_value(value)?)),
            (false, _, true) => Ok(Self::Response(serde_json::from_value(value)?)),
            (false, _, false) => Err(Error::JsonRpc {
                code: codes::INVALID_REQUEST,
                message: "invalid MCP message".into(),
            }),
        }
    }
}

// ============================================================================
// MCP payloads
// ============================================================================

/// Name and version of either side of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// e.g. `minecraft-wiki-mcp`
    pub name: String,
    /// e.g. `0.1.0`
    pub version: String,
}

/// `initialize` params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Version the client asked for. Logged; the server always answers
    /// with its own.
    pub protocol_version: String,
    /// Logged only. No client capability changes what the wiki tools do.
    #[serde(default)]
    pub capabilities: Value,
    /// Who is connecting, when the client says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<Implementation>,
}

/// `initialize` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Always [`crate::server::PROTOCOL_VERSION`].
    pub protocol_version: String,
    /// What the server offers.
    pub capabilities: ServerCapabilities,
    /// This server.
    pub server_info: Implementation,
}

/// What the server offers. The wiki is read-only and the tool set is fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// The wiki tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    /// Not offered; logs go to stderr or a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Value>,
}

/// `capabilities.tools`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Always false; the nine wiki tools never change at runtime.
    #[serde(default)]
    pub list_changed: bool,
}

/// One entry of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// `MinecraftWiki_*`
    pub name: String,
    /// Shown to the model when it picks a tool.
    pub description: String,
    /// JSON Schema of the `arguments` object.
    pub input_schema: Value,
}

/// `tools/list` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Sorted by name.
    pub tools: Vec<ToolDefinition>,
}

/// `tools/call` params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Tool to run.
    pub name: String,
    /// `null` when the client omits it.
    #[serde(default)]
    pub arguments: Value,
}

/// `tools/call` result: the tool's JSON payload as a single text block, or
/// an `Error: ...` block with `isError` set when the wiki could not answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// One text block.
    pub content: Vec<ContentItem>,
    /// Set when the wiki request failed.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Successful result carrying one text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: false,
        }
    }

    /// Failed result reading `Error: <message>`.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![ContentItem::text(format!("Error: {}", message))],
            is_error: true,
        }
    }
}

/// A content block. The wiki tools only produce text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// `{"type": "text", "text": ...}`
    Text {
        /// Block body.
        text: String,
    },
}

impl ContentItem {
    /// Text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}
