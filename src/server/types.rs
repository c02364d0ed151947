// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded client command.
///
/// `params` defaults to JSON `null` when absent; individual commands decide
/// whether that is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub command: String,
    #[serde(default)]
    pub params: Value,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>, params: Value) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }
}

/// The single response envelope every command answers with, errors included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandResponse {
    Success { result: Value },
    Error { message: String },
}

impl CommandResponse {
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Machine-readable description of one command, for tool discovery.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolsListResponse {
    pub tools: Vec<ToolDescriptor>,
}
