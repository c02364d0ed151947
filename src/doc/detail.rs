// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Tiered detail filtering over serialized documents.
//!
//! The filter is lossy and idempotent: applying a tier to an
//! already-filtered document changes nothing, and FULL is the identity.
//! It operates on plain JSON values so it works equally on documents the
//! walker just produced and on documents a client sent back for reduction.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What replaces text content at ULTRA_LITE, and whole payloads that fail
/// to parse at any lossy tier.
pub const ULTRA_LITE_PLACEHOLDER: &str = "(unparsable node data)";

/// Unparsable text at LITE and STANDARD keeps this many leading characters.
const DEGRADED_TEXT_LIMIT: usize = 1000;

/// Node fields carrying editor presentation, stripped below FULL.
const PRESENTATION_FIELDS: [&str; 6] = [
    "position",
    "width",
    "height",
    "color",
    "use_custom_color",
    "selected",
];

/// Document fields describing the host session, stripped at LITE and below.
const DOCUMENT_METADATA_FIELDS: [&str; 4] = [
    "host_version",
    "addon_version",
    "selected_nodes_count",
    "tree_type",
];

/// All a node keeps at ULTRA_LITE.
const ULTRA_LITE_NODE_FIELDS: [&str; 2] = ["name", "type"];

/// Detail tiers, ordered from most to least lossy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailTier {
    UltraLite,
    Lite,
    Standard,
    Full,
}

impl Default for DetailTier {
    fn default() -> Self {
        Self::Standard
    }
}

impl DetailTier {
    pub const ALL: [Self; 4] = [Self::UltraLite, Self::Lite, Self::Standard, Self::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UltraLite => "ULTRA_LITE",
            Self::Lite => "LITE",
            Self::Standard => "STANDARD",
            Self::Full => "FULL",
        }
    }
}

impl fmt::Display for DetailTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTier {
    name: String,
}

impl fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown detail level '{}' (expected ULTRA_LITE, LITE, STANDARD, or FULL)",
            self.name
        )
    }
}

impl std::error::Error for UnknownTier {}

impl FromStr for DetailTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ULTRA_LITE" => Ok(Self::UltraLite),
            "LITE" => Ok(Self::Lite),
            "STANDARD" => Ok(Self::Standard),
            "FULL" => Ok(Self::Full),
            other => Err(UnknownTier {
                name: other.to_owned(),
            }),
        }
    }
}

/// Reduce a serialized document (or fragment) to `tier`.
pub fn filter_value(value: Value, tier: DetailTier) -> Value {
    if tier == DetailTier::Full {
        return value;
    }
    let Value::Object(document) = value else {
        return value;
    };
    filter_document(document, tier)
}

fn filter_document(mut document: Map<String, Value>, tier: DetailTier) -> Value {
    if tier <= DetailTier::Lite {
        for field in DOCUMENT_METADATA_FIELDS {
            document.remove(field);
        }
    }

    if let Some(Value::Array(nodes)) = document.remove("nodes") {
        let nodes = nodes
            .into_iter()
            .map(|node| filter_node(node, tier))
            .collect();
        document.insert("nodes".to_owned(), Value::Array(nodes));
    }

    if tier == DetailTier::UltraLite {
        // At the coarsest tier the flat group index is pure repetition of
        // collapsed nodes; links alone still convey the topology.
        document.remove("groups");
    } else if let Some(Value::Object(groups)) = document.remove("groups") {
        let groups = groups
            .into_iter()
            .map(|(name, content)| (name, filter_value(content, tier)))
            .collect();
        document.insert("groups".to_owned(), Value::Object(groups));
    }

    Value::Object(document)
}

fn filter_node(node: Value, tier: DetailTier) -> Value {
    let Value::Object(mut node) = node else {
        return node;
    };

    if tier == DetailTier::UltraLite {
        node.retain(|field, _| ULTRA_LITE_NODE_FIELDS.contains(&field.as_str()));
        return Value::Object(node);
    }

    for field in PRESENTATION_FIELDS {
        node.remove(field);
    }

    if tier == DetailTier::Lite {
        if let Some(Value::Array(inputs)) = node.remove("inputs") {
            let inputs: Vec<Value> = inputs
                .into_iter()
                .filter(input_is_relevant)
                .map(strip_port_identifier)
                .collect();
            if !inputs.is_empty() {
                node.insert("inputs".to_owned(), Value::Array(inputs));
            }
        }
        if let Some(Value::Array(outputs)) = node.remove("outputs") {
            let outputs: Vec<Value> = outputs.into_iter().map(strip_port_identifier).collect();
            if !outputs.is_empty() {
                node.insert("outputs".to_owned(), Value::Array(outputs));
            }
        }
    }

    if let Some(content) = node.remove("group_content") {
        node.insert("group_content".to_owned(), filter_value(content, tier));
    }

    Value::Object(node)
}

/// LITE keeps an input only if it participates in the graph: connected, or
/// carrying a default an author actually set.
fn input_is_relevant(input: &Value) -> bool {
    let Value::Object(input) = input else {
        return true;
    };
    if input.get("connected").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    meaningful_default(input.get("default_value"))
}

fn meaningful_default(default: Option<&Value>) -> bool {
    match default {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => s != "N/A",
        Some(_) => true,
    }
}

fn strip_port_identifier(port: Value) -> Value {
    let Value::Object(mut port) = port else {
        return port;
    };
    port.remove("identifier");
    Value::Object(port)
}

/// Reduce raw client-supplied text to `tier`.
///
/// If the text parses as JSON it goes through the structural filter and is
/// re-rendered; otherwise it degrades per tier rather than erroring, since
/// callers use this on content they do not control.
pub fn filter_text(text: &str, tier: DetailTier) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        let filtered = filter_value(value, tier);
        // A JSON value always renders.
        return serde_json::to_string_pretty(&filtered).unwrap_or_else(|_| text.to_owned());
    }
    match tier {
        DetailTier::Full => text.to_owned(),
        DetailTier::UltraLite => ULTRA_LITE_PLACEHOLDER.to_owned(),
        DetailTier::Lite | DetailTier::Standard => {
            if text.chars().count() <= DEGRADED_TEXT_LIMIT {
                text.to_owned()
            } else {
                text.chars().take(DEGRADED_TEXT_LIMIT).collect()
            }
        }
    }
}
