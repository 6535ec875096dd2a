//! Error types for the MCP server.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// MCP server errors.
#[derive(Error, Debug)]
pub enum Error {
    /// JSON-RPC protocol error.
    #[error("JSON-RPC error: {code} - {message}")]
    JsonRpc {
        /// Error code.
        code: i32,
        /// Error message.
        message: String,
    },

    /// Tool not found.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// HTTP transport failure talking to the wiki API.
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The wiki API answered with an error payload.
    #[error("API request failed: {0}")]
    WikiApi(String),

    /// The requested page or section does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Invalid startup configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::JsonRpc { code, .. } => *code,
            Error::ToolNotFound(_) => codes::METHOD_NOT_FOUND,
            Error::InvalidParams(_) => codes::INVALID_PARAMS,
            Error::Http(_) => -32001,
            Error::WikiApi(_) => -32003,
            Error::NotFound(_) => -32004,
            Error::Config(_) => -32005,
            Error::Serialization(_) => codes::PARSE_ERROR,
            Error::Io(_) => -32002,
        }
    }

    /// Whether this error belongs in the tool result (`isError: true`)
    /// rather than in a JSON-RPC error envelope.
    ///
    /// Upstream failures are part of a tool's answer; malformed calls are
    /// protocol errors.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::WikiApi(_) | Error::NotFound(_)
        )
    }
}

/// Standard JSON-RPC error codes.
pub mod codes {
    /// Parse error.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i32 = -32603;
}
