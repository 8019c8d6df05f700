//! Error type for the MCP server
//!
//! Failures are carried as RFC 9457-style problem objects so a tool error
//! reads the same as an HTTP problem response of the service.

use maat_lib::FailureKind;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// MCP server error with an HTTP status-like code
#[derive(Debug, Error, Serialize, Deserialize, Clone)]
#[error("{message}")]
pub struct Error {
    /// HTTP status-like code (e.g., 400, 404, 504)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Problem type URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Additional context such as the failure kind or parameter name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl Error {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            r#type: None,
            context: None,
        }
    }

    pub fn with_type(mut self, type_uri: impl Into<String>) -> Self {
        self.r#type = Some(type_uri.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Invalid tool or prompt argument
    pub fn invalid_param(param: impl Into<String>, reason: impl Into<String>) -> Self {
        let p = param.into();
        Self::new(400, format!("Invalid parameter: {}", p))
            .with_type("/problems/invalid-request")
            .with_context(json!({
                "parameter": p,
                "reason": reason.into()
            }))
    }

    pub fn unknown_resource(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Self::new(404, format!("Unknown resource '{}'", uri))
            .with_type("/problems/unknown-resource")
            .with_context(json!({ "uri": uri }))
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(500, format!("Internal server error: {}", reason.into()))
            .with_type("/problems/internal-error")
    }

    /// Failure kind, when the error came from a search.
    pub fn kind(&self) -> Option<FailureKind> {
        self.context
            .as_ref()
            .and_then(|c| c.get("kind"))
            .and_then(|k| serde_json::from_value(k.clone()).ok())
    }

    /// Tool failure result carrying the serialized problem.
    pub fn to_tool_result(&self) -> CallToolResult {
        let body = serde_json::to_string(self).unwrap_or_else(|_| self.message.clone());
        CallToolResult::error(vec![Content::text(body)])
    }
}

impl From<&maat_lib::Error> for Error {
    fn from(err: &maat_lib::Error) -> Self {
        let kind = err.kind();
        Self::new(i32::from(err.status_code()), err.to_string())
            .with_type(format!("/problems/{}", kind.as_str().replace('_', "-")))
            .with_context(json!({ "kind": kind }))
    }
}

impl From<maat_lib::Error> for Error {
    fn from(err: maat_lib::Error) -> Self {
        Self::from(&err)
    }
}

impl From<Error> for ErrorData {
    fn from(err: Error) -> Self {
        let data = serde_json::to_value(&err).ok();
        match err.code {
            400 => ErrorData::invalid_params(err.message, data),
            404 if err.kind().is_none() => ErrorData::resource_not_found(err.message, data),
            _ => ErrorData::internal_error(err.message, data),
        }
    }
}
