// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One side of a resolved connection, by node name and socket display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub node: String,
    pub socket: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDoc {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
    pub from_socket_type: String,
    pub to_socket_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub socket_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub enabled: bool,
    pub hide: bool,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_from: Option<LinkEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_to: Option<Vec<LinkEndpoint>>,
}

/// A serialized node. Presentation fields are `Option` because tiers below
/// FULL strip them; a fully collapsed node keeps only `name` and `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_custom_color: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<PortDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PortDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_content: Option<Box<Document>>,
}

impl NodeDoc {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            label: None,
            position: None,
            width: None,
            height: None,
            color: None,
            use_custom_color: None,
            selected: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            group_content: None,
        }
    }
}

/// The structured output of walking a graph, before or after tier filtering.
///
/// Group content appears twice on purpose: inline on the owning `NodeDoc` and
/// indexed by node name in `groups`, so callers can consume either the nested
/// or the flat form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_nodes_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkDoc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, Document>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub max_depth_reached: bool,
}

impl Document {
    /// The sentinel emitted where recursion hit the depth guard.
    pub fn depth_marker() -> Self {
        Self {
            max_depth_reached: true,
            ..Self::default()
        }
    }
}
