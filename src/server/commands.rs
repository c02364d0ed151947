// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! The closed set of commands clients can invoke, and their execution
//! against a [`Host`].
//!
//! Everything here runs on the thread that owns the host context; the
//! session layer is responsible for getting requests onto that thread.

use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::doc::{filter_text, filter_value, walk, walk_selection, DetailTier, WalkError,
    DEFAULT_MAX_DEPTH};
use crate::host::Host;

use super::types::{CommandRequest, CommandResponse, ToolDescriptor, ToolsListResponse};

/// Every command the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    GetSelectedNodesInfo,
    GetAllNodesInfo,
    ApplyDetailLevel,
    GetToolsList,
    GetConfigVariable,
    GetAllConfigVariables,
}

impl CommandKind {
    pub const ALL: [Self; 6] = [
        Self::GetSelectedNodesInfo,
        Self::GetAllNodesInfo,
        Self::ApplyDetailLevel,
        Self::GetToolsList,
        Self::GetConfigVariable,
        Self::GetAllConfigVariables,
    ];

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::GetSelectedNodesInfo => "get_selected_nodes_info",
            Self::GetAllNodesInfo => "get_all_nodes_info",
            Self::ApplyDetailLevel => "apply_detail_level",
            Self::GetToolsList => "get_tools_list",
            Self::GetConfigVariable => "get_config_variable",
            Self::GetAllConfigVariables => "get_all_config_variables",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GetSelectedNodesInfo => {
                "Serialize the currently selected nodes of the active graph"
            }
            Self::GetAllNodesInfo => "Serialize every node of the active graph",
            Self::ApplyDetailLevel => {
                "Reduce a previously obtained document or raw text to a detail level"
            }
            Self::GetToolsList => "List every available command with its parameter schema",
            Self::GetConfigVariable => "Read a single configuration variable by name",
            Self::GetAllConfigVariables => "Read the full configuration",
        }
    }

    pub fn params_schema(&self) -> Value {
        fn schema<T: JsonSchema>() -> Value {
            serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
        }
        match self {
            Self::GetSelectedNodesInfo | Self::GetAllNodesInfo => schema::<NodesInfoParams>(),
            Self::ApplyDetailLevel => schema::<ApplyDetailParams>(),
            Self::GetConfigVariable => schema::<ConfigVariableParams>(),
            Self::GetToolsList | Self::GetAllConfigVariables => schema::<NoParams>(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NodesInfoParams {
    /// Detail tier for the response; the configured default applies when
    /// omitted.
    pub detail_level: Option<DetailTier>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplyDetailParams {
    pub detail_level: DetailTier,
    /// A structured document to reduce. Takes precedence over `text`.
    pub document: Option<Value>,
    /// Raw text to reduce when no structured document is at hand.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConfigVariableParams {
    pub variable_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct NoParams {}

#[derive(Debug)]
pub enum CommandError {
    Unknown { name: String },
    BadParams { message: String },
    DocumentUnavailable,
    UnknownConfigVariable { name: String },
    Walk(WalkError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { name } => write!(f, "unknown command '{name}'"),
            Self::BadParams { message } => write!(f, "invalid params: {message}"),
            Self::DocumentUnavailable => write!(f, "no active node graph"),
            Self::UnknownConfigVariable { name } => {
                write!(f, "unknown configuration variable '{name}'")
            }
            Self::Walk(err) => write!(f, "serialization failed: {err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Walk(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WalkError> for CommandError {
    fn from(err: WalkError) -> Self {
        Self::Walk(err)
    }
}

/// Execute one request against the host and fold any failure into the
/// error envelope. This is the function session threads submit over the
/// bridge.
pub fn dispatch(request: &CommandRequest, host: &dyn Host) -> CommandResponse {
    let Some(kind) = CommandKind::from_wire(&request.command) else {
        return CommandResponse::error(
            CommandError::Unknown {
                name: request.command.clone(),
            }
            .to_string(),
        );
    };
    match execute(kind, &request.params, host) {
        Ok(result) => CommandResponse::success(result),
        Err(err) => CommandResponse::error(err.to_string()),
    }
}

fn execute(kind: CommandKind, params: &Value, host: &dyn Host) -> Result<Value, CommandError> {
    match kind {
        CommandKind::GetSelectedNodesInfo => {
            let params: NodesInfoParams = decode_params(params)?;
            let graph = host.active_graph().ok_or(CommandError::DocumentUnavailable)?;
            let document = walk_selection(graph, host.selection(), DEFAULT_MAX_DEPTH)?;
            Ok(render_document(document, params.detail_level, host))
        }
        CommandKind::GetAllNodesInfo => {
            let params: NodesInfoParams = decode_params(params)?;
            let graph = host.active_graph().ok_or(CommandError::DocumentUnavailable)?;
            let document = walk(graph, DEFAULT_MAX_DEPTH)?;
            Ok(render_document(document, params.detail_level, host))
        }
        CommandKind::ApplyDetailLevel => {
            let params: ApplyDetailParams = decode_params(params)?;
            if let Some(document) = params.document {
                return Ok(filter_value(document, params.detail_level));
            }
            if let Some(text) = params.text {
                return Ok(Value::String(filter_text(&text, params.detail_level)));
            }
            Err(CommandError::BadParams {
                message: "either 'document' or 'text' is required".to_owned(),
            })
        }
        CommandKind::GetToolsList => {
            let tools = CommandKind::ALL
                .into_iter()
                .map(|kind| ToolDescriptor {
                    name: kind.wire_name().to_owned(),
                    description: kind.description().to_owned(),
                    params: kind.params_schema(),
                })
                .collect();
            serde_json::to_value(ToolsListResponse { tools }).map_err(|err| {
                CommandError::BadParams {
                    message: err.to_string(),
                }
            })
        }
        CommandKind::GetConfigVariable => {
            let params: ConfigVariableParams = decode_params(params)?;
            host.detail_config()
                .variable(&params.variable_name)
                .ok_or(CommandError::UnknownConfigVariable {
                    name: params.variable_name,
                })
        }
        CommandKind::GetAllConfigVariables => {
            let _: NoParams = decode_params(params)?;
            Ok(host.detail_config().all_variables())
        }
    }
}

fn render_document(
    mut document: crate::doc::Document,
    requested: Option<DetailTier>,
    host: &dyn Host,
) -> Value {
    document.host_version = Some(host.info().host_version().to_owned());
    document.addon_version = Some(host.info().addon_version().to_owned());
    let tier = requested.unwrap_or(host.detail_config().output_detail_level);
    // A document built from typed parts always converts.
    let value = serde_json::to_value(document).unwrap_or(Value::Null);
    filter_value(value, tier)
}

/// Absent params decode like an empty object, so commands whose params are
/// all optional accept a bare `{"type": ...}` request.
fn decode_params<T: DeserializeOwned>(params: &Value) -> Result<T, CommandError> {
    let params = match params {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(params).map_err(|err| CommandError::BadParams {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{dispatch, CommandKind};
    use crate::config::DetailConfig;
    use crate::doc::DetailTier;
    use crate::host::{HostInfo, InMemoryHost};
    use crate::model::fixtures::demo_graph;
    use crate::model::Selection;
    use crate::server::types::{CommandRequest, CommandResponse};

    fn demo_host() -> InMemoryHost {
        let mut host = InMemoryHost::new(HostInfo::new("4.1.0", "0.9.0"), DetailConfig::default());
        host.set_graph(demo_graph());
        host.set_selection(Selection::new(["Grid", "Smooth"]));
        host
    }

    fn result_of(response: CommandResponse) -> Value {
        match response {
            CommandResponse::Success { result } => result,
            CommandResponse::Error { message } => panic!("unexpected error: {message}"),
        }
    }

    fn message_of(response: CommandResponse) -> String {
        match response {
            CommandResponse::Error { message } => message,
            CommandResponse::Success { .. } => panic!("expected an error"),
        }
    }

    #[test]
    fn every_wire_name_resolves_back_to_its_kind() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_wire(kind.wire_name()), Some(kind));
        }
        assert_eq!(CommandKind::from_wire("reboot"), None);
    }

    #[test]
    fn unknown_commands_answer_with_an_error_envelope() {
        let host = demo_host();
        let message = message_of(dispatch(
            &CommandRequest::new("make_coffee", Value::Null),
            &host,
        ));
        assert!(message.contains("make_coffee"));
    }

    #[test]
    fn selected_nodes_info_scopes_to_the_selection() {
        let host = demo_host();
        let result = result_of(dispatch(
            &CommandRequest::new("get_selected_nodes_info", json!({ "detail_level": "FULL" })),
            &host,
        ));
        let names: Vec<&str> = result["nodes"]
            .as_array()
            .expect("nodes")
            .iter()
            .map(|node| node["name"].as_str().expect("name"))
            .collect();
        assert_eq!(names, ["Grid", "Smooth"]);
        assert_eq!(result["selected_nodes_count"], json!(2));
        assert_eq!(result["host_version"], json!("4.1.0"));
        assert_eq!(result["addon_version"], json!("0.9.0"));
    }

    #[test]
    fn all_nodes_info_defaults_to_the_configured_tier() {
        let mut host = demo_host();
        host.config_mut().output_detail_level = DetailTier::UltraLite;

        let result = result_of(dispatch(
            &CommandRequest::new("get_all_nodes_info", Value::Null),
            &host,
        ));
        assert_eq!(result["nodes"].as_array().expect("nodes").len(), 3);
        for node in result["nodes"].as_array().expect("nodes") {
            assert_eq!(node.as_object().expect("node").len(), 2);
        }
        assert!(result.get("groups").is_none());
    }

    #[test]
    fn nodes_info_without_an_active_graph_is_an_error() {
        let host = InMemoryHost::new(HostInfo::new("4.1.0", "0.9.0"), DetailConfig::default());
        let message = message_of(dispatch(
            &CommandRequest::new("get_all_nodes_info", Value::Null),
            &host,
        ));
        assert!(message.contains("no active node graph"));
    }

    #[test]
    fn apply_detail_level_reduces_a_supplied_document() {
        let host = demo_host();
        let full = result_of(dispatch(
            &CommandRequest::new("get_all_nodes_info", json!({ "detail_level": "FULL" })),
            &host,
        ));
        let reduced = result_of(dispatch(
            &CommandRequest::new(
                "apply_detail_level",
                json!({ "detail_level": "ULTRA_LITE", "document": full }),
            ),
            &host,
        ));
        assert!(reduced.get("groups").is_none());
        assert_eq!(reduced["nodes"][0].as_object().expect("node").len(), 2);
    }

    #[test]
    fn apply_detail_level_reduces_raw_text() {
        let host = demo_host();
        let reduced = result_of(dispatch(
            &CommandRequest::new(
                "apply_detail_level",
                json!({ "detail_level": "ULTRA_LITE", "text": "not structured at all" }),
            ),
            &host,
        ));
        assert_eq!(reduced, json!("(unparsable node data)"));
    }

    #[test]
    fn apply_detail_level_requires_some_payload() {
        let host = demo_host();
        let message = message_of(dispatch(
            &CommandRequest::new("apply_detail_level", json!({ "detail_level": "LITE" })),
            &host,
        ));
        assert!(message.contains("'document' or 'text'"));
    }

    #[test]
    fn malformed_params_are_reported_not_crashed_on() {
        let host = demo_host();
        let message = message_of(dispatch(
            &CommandRequest::new(
                "get_selected_nodes_info",
                json!({ "detail_level": "MEDIUM" }),
            ),
            &host,
        ));
        assert!(message.contains("invalid params"));
    }

    #[test]
    fn tools_list_describes_every_command() {
        let host = demo_host();
        let result = result_of(dispatch(
            &CommandRequest::new("get_tools_list", Value::Null),
            &host,
        ));
        let tools = result["tools"].as_array().expect("tools");
        assert_eq!(tools.len(), CommandKind::ALL.len());
        for tool in tools {
            assert!(tool["name"].as_str().is_some());
            assert!(!tool["description"].as_str().expect("description").is_empty());
            assert!(tool["params"].is_object());
        }
    }

    #[test]
    fn config_variables_resolve_by_name() {
        let host = demo_host();
        let value = result_of(dispatch(
            &CommandRequest::new(
                "get_config_variable",
                json!({ "variable_name": "output_detail_level" }),
            ),
            &host,
        ));
        assert_eq!(value, json!("STANDARD"));

        let message = message_of(dispatch(
            &CommandRequest::new(
                "get_config_variable",
                json!({ "variable_name": "no_such_setting" }),
            ),
            &host,
        ));
        assert!(message.contains("no_such_setting"));

        let all = result_of(dispatch(
            &CommandRequest::new("get_all_config_variables", Value::Null),
            &host,
        ));
        assert_eq!(all["output_detail_level"], json!("STANDARD"));
    }
}
