// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! The tree walker: pure serialization of a graph (nodes, ports, links,
//! nested groups) into a [`Document`]. No I/O, no threading concerns.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::model::{Graph, Link, Node, Port, PortValue, Selection};

use super::types::{Document, LinkDoc, LinkEndpoint, NodeDoc, PortDoc};

/// Generous default for group nesting; real trees rarely go past three.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Sequences longer than this are stringified instead of materialized.
const MAX_INLINE_SEQUENCE: usize = 10;

/// Stringified default values are cut here to keep payloads bounded.
const OPAQUE_VALUE_LIMIT: usize = 50;

/// The walk failed because the live document changed underneath it. Partial
/// trees are never returned; they are unsafe to feed into the detail filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    NodeVanished { name: String },
    DanglingLink { from_node: String, to_node: String },
    MissingPort { node: String, port: String },
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeVanished { name } => {
                write!(f, "node disappeared during walk (name={name})")
            }
            Self::DanglingLink { from_node, to_node } => {
                write!(f, "link references a missing node (from={from_node}, to={to_node})")
            }
            Self::MissingPort { node, port } => {
                write!(f, "link references a missing port (node={node}, port={port})")
            }
        }
    }
}

impl std::error::Error for WalkError {}

/// Serialize every node of `graph`, recursing into group subgraphs up to
/// `max_depth` levels.
pub fn walk(graph: &Graph, max_depth: usize) -> Result<Document, WalkError> {
    let scope: Vec<&Node> = graph.nodes().values().collect();
    let mut document = walk_level(graph, &scope, 0, max_depth)?;
    document.selected_nodes_count = Some(scope.len() as u64);
    Ok(document)
}

/// Serialize only the selected nodes, plus every link touching them.
///
/// Selection names are resolved against the graph up front; a name that no
/// longer resolves fails the whole walk.
pub fn walk_selection(
    graph: &Graph,
    selection: &Selection,
    max_depth: usize,
) -> Result<Document, WalkError> {
    let mut scope: Vec<&Node> = Vec::with_capacity(selection.len());
    for name in selection.names() {
        let node = graph.node(name).ok_or_else(|| WalkError::NodeVanished {
            name: name.clone(),
        })?;
        scope.push(node);
    }
    let mut document = walk_level(graph, &scope, 0, max_depth)?;
    document.selected_nodes_count = Some(selection.len() as u64);
    Ok(document)
}

fn walk_level(
    graph: &Graph,
    scope: &[&Node],
    depth: usize,
    max_depth: usize,
) -> Result<Document, WalkError> {
    if depth >= max_depth {
        return Ok(Document::depth_marker());
    }

    let mut document = Document {
        tree_type: Some(graph.tree_kind().label().to_owned()),
        ..Document::default()
    };

    for node in scope {
        let node_doc = node_doc(graph, node, depth, max_depth)?;
        if let Some(content) = &node_doc.group_content {
            document.groups.insert(node.name().to_owned(), (**content).clone());
        }
        document.nodes.push(node_doc);
    }

    let scope_names: BTreeSet<&str> = scope.iter().map(|node| node.name()).collect();
    for link in graph.links() {
        if !scope_names.contains(link.from_node()) && !scope_names.contains(link.to_node()) {
            continue;
        }
        document.links.push(link_doc(graph, link)?);
    }

    Ok(document)
}

fn node_doc(
    graph: &Graph,
    node: &Node,
    depth: usize,
    max_depth: usize,
) -> Result<NodeDoc, WalkError> {
    let inputs = node
        .inputs()
        .iter()
        .map(|port| input_doc(graph, node, port))
        .collect::<Result<Vec<_>, _>>()?;
    let outputs = node
        .outputs()
        .iter()
        .map(|port| output_doc(graph, node, port))
        .collect::<Result<Vec<_>, _>>()?;

    let group_content = match node.subgraph() {
        Some(subgraph) => {
            let scope: Vec<&Node> = subgraph.nodes().values().collect();
            Some(Box::new(walk_level(subgraph, &scope, depth + 1, max_depth)?))
        }
        None => None,
    };

    Ok(NodeDoc {
        label: Some(node.label().to_owned()),
        position: Some(node.position()),
        width: Some(node.width()),
        height: Some(node.height()),
        color: node.color(),
        use_custom_color: Some(node.use_custom_color()),
        selected: Some(node.selected()),
        inputs,
        outputs,
        group_content,
        ..NodeDoc::new(node.name(), node.node_type())
    })
}

fn input_doc(graph: &Graph, node: &Node, port: &Port) -> Result<PortDoc, WalkError> {
    let mut linked_from = None;
    for link in graph.links() {
        if link.to_node() != node.name() || link.to_port() != port.identifier() {
            continue;
        }
        let (source_node, source_port) = resolve_output(graph, link)?;
        linked_from = Some(LinkEndpoint {
            node: source_node.name().to_owned(),
            socket: source_port.name().to_owned(),
        });
        // A well-formed graph has at most one link per input; first match wins.
        break;
    }

    Ok(PortDoc {
        connected: linked_from.is_some(),
        linked_from,
        linked_to: None,
        ..port_doc(port)
    })
}

fn output_doc(graph: &Graph, node: &Node, port: &Port) -> Result<PortDoc, WalkError> {
    let mut linked_to = Vec::new();
    for link in graph.links() {
        if link.from_node() != node.name() || link.from_port() != port.identifier() {
            continue;
        }
        let (target_node, target_port) = resolve_input(graph, link)?;
        linked_to.push(LinkEndpoint {
            node: target_node.name().to_owned(),
            socket: target_port.name().to_owned(),
        });
    }

    Ok(PortDoc {
        connected: !linked_to.is_empty(),
        linked_from: None,
        linked_to: (!linked_to.is_empty()).then_some(linked_to),
        ..port_doc(port)
    })
}

fn port_doc(port: &Port) -> PortDoc {
    PortDoc {
        name: port.name().to_owned(),
        socket_type: port.socket_type().to_owned(),
        identifier: Some(port.identifier().to_owned()),
        enabled: port.enabled(),
        hide: port.hidden(),
        connected: false,
        default_value: port.default_value().map(default_value_doc),
        linked_from: None,
        linked_to: None,
    }
}

fn link_doc(graph: &Graph, link: &Link) -> Result<LinkDoc, WalkError> {
    let (from_node, from_port) = resolve_output(graph, link)?;
    let (to_node, to_port) = resolve_input(graph, link)?;
    Ok(LinkDoc {
        from_node: from_node.name().to_owned(),
        from_socket: from_port.name().to_owned(),
        to_node: to_node.name().to_owned(),
        to_socket: to_port.name().to_owned(),
        from_socket_type: from_port.socket_type().to_owned(),
        to_socket_type: to_port.socket_type().to_owned(),
    })
}

fn resolve_output<'g>(graph: &'g Graph, link: &Link) -> Result<(&'g Node, &'g Port), WalkError> {
    let node = graph.node(link.from_node()).ok_or_else(|| WalkError::DanglingLink {
        from_node: link.from_node().to_owned(),
        to_node: link.to_node().to_owned(),
    })?;
    let port = node
        .output_by_identifier(link.from_port())
        .ok_or_else(|| WalkError::MissingPort {
            node: link.from_node().to_owned(),
            port: link.from_port().to_owned(),
        })?;
    Ok((node, port))
}

fn resolve_input<'g>(graph: &'g Graph, link: &Link) -> Result<(&'g Node, &'g Port), WalkError> {
    let node = graph.node(link.to_node()).ok_or_else(|| WalkError::DanglingLink {
        from_node: link.from_node().to_owned(),
        to_node: link.to_node().to_owned(),
    })?;
    let port = node
        .input_by_identifier(link.to_port())
        .ok_or_else(|| WalkError::MissingPort {
            node: link.to_node().to_owned(),
            port: link.to_port().to_owned(),
        })?;
    Ok((node, port))
}

/// Default-value resolution policy: scalars, bools, and strings pass through
/// unchanged; short sequences materialize as plain arrays; everything else is
/// stringified and truncated.
fn default_value_doc(value: &PortValue) -> Value {
    match value {
        PortValue::Bool(b) => Value::Bool(*b),
        PortValue::Int(i) => Value::from(*i),
        PortValue::Float(f) => Value::from(*f),
        PortValue::Str(s) => Value::String(s.clone()),
        PortValue::Vector(v) if v.len() <= MAX_INLINE_SEQUENCE => {
            Value::Array(v.iter().map(|f| Value::from(*f)).collect())
        }
        PortValue::Vector(v) => Value::String(truncate_opaque(&format!("{:?}", v.as_slice()))),
        PortValue::Opaque(s) => Value::String(truncate_opaque(s)),
    }
}

fn truncate_opaque(raw: &str) -> String {
    if raw.chars().count() <= OPAQUE_VALUE_LIMIT {
        return raw.to_owned();
    }
    let mut truncated: String = raw.chars().take(OPAQUE_VALUE_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::{walk, walk_selection, WalkError, DEFAULT_MAX_DEPTH};
    use crate::model::fixtures::{demo_graph, nested_groups, two_node_link};
    use crate::model::{Graph, Link, Node, Port, PortValue, Selection, TreeKind};

    #[test]
    fn link_round_trip_resolves_both_directions() {
        let document = walk(&two_node_link(), DEFAULT_MAX_DEPTH).expect("walk");

        assert_eq!(document.links.len(), 1);
        let link = &document.links[0];
        assert_eq!(link.from_node, "N1");
        assert_eq!(link.to_node, "N2");

        let n1 = &document.nodes[0];
        let n2 = &document.nodes[1];
        assert_eq!(n1.name, "N1");
        assert_eq!(n2.name, "N2");

        let out0 = &n1.outputs[0];
        assert!(out0.connected);
        assert_eq!(out0.linked_to.as_ref().map(Vec::len), Some(1));
        assert!(!n1.outputs[1].connected);

        let in0 = &n2.inputs[0];
        assert!(in0.connected);
        assert_eq!(in0.linked_from.as_ref().map(|e| e.node.as_str()), Some("N1"));
        assert!(!n2.inputs[1].connected);
    }

    #[test]
    fn portless_node_and_empty_selection_serialize_without_error() {
        let mut graph = Graph::new(TreeKind::Compositing);
        graph.add_node(Node::new("Bare", "FRAME"));

        let all = walk(&graph, DEFAULT_MAX_DEPTH).expect("walk");
        assert_eq!(all.nodes.len(), 1);
        assert!(all.nodes[0].inputs.is_empty());

        let none = walk_selection(&graph, &Selection::empty(), DEFAULT_MAX_DEPTH)
            .expect("walk empty selection");
        assert!(none.nodes.is_empty());
        assert!(none.links.is_empty());
        assert_eq!(none.selected_nodes_count, Some(0));
    }

    #[test]
    fn selection_scopes_nodes_but_keeps_touching_links() {
        let graph = two_node_link();
        let document = walk_selection(&graph, &Selection::new(["N2"]), DEFAULT_MAX_DEPTH)
            .expect("walk selection");

        assert_eq!(document.nodes.len(), 1);
        assert_eq!(document.nodes[0].name, "N2");
        // N1 is outside the selection but the link into N2 still appears.
        assert_eq!(document.links.len(), 1);
        assert_eq!(document.links[0].from_node, "N1");
    }

    #[test]
    fn selection_naming_a_vanished_node_fails_the_whole_walk() {
        let graph = two_node_link();
        let result = walk_selection(&graph, &Selection::new(["N1", "Ghost"]), DEFAULT_MAX_DEPTH);
        assert_eq!(
            result,
            Err(WalkError::NodeVanished {
                name: "Ghost".to_owned()
            })
        );
    }

    #[test]
    fn dangling_link_fails_instead_of_returning_partial_data() {
        let mut graph = two_node_link();
        graph.add_link(Link::new("N1", "out_1", "Deleted", "in_0"));
        let result = walk(&graph, DEFAULT_MAX_DEPTH);
        assert_eq!(
            result,
            Err(WalkError::DanglingLink {
                from_node: "N1".to_owned(),
                to_node: "Deleted".to_owned()
            })
        );
    }

    #[test]
    fn link_to_missing_port_is_a_typed_error() {
        let mut graph = two_node_link();
        graph.add_link(Link::new("N1", "out_9", "N2", "in_1"));
        let result = walk(&graph, DEFAULT_MAX_DEPTH);
        assert_eq!(
            result,
            Err(WalkError::MissingPort {
                node: "N1".to_owned(),
                port: "out_9".to_owned()
            })
        );
    }

    #[test]
    fn group_content_is_stored_inline_and_in_the_groups_index() {
        let document = walk(&demo_graph(), DEFAULT_MAX_DEPTH).expect("walk");

        let smooth = document
            .nodes
            .iter()
            .find(|node| node.name == "Smooth")
            .expect("group node");
        let inline = smooth.group_content.as_deref().expect("inline content");
        let indexed = document.groups.get("Smooth").expect("indexed content");
        assert_eq!(inline, indexed);
        assert_eq!(inline.nodes.len(), 3);
    }

    #[test]
    fn nesting_past_max_depth_yields_the_marker_not_a_crash() {
        let graph = nested_groups(5);
        let document = walk(&graph, 2).expect("walk");

        let level1 = document
            .nodes
            .iter()
            .find_map(|node| node.group_content.as_deref())
            .expect("first group level");
        assert!(!level1.max_depth_reached);

        let level2 = level1
            .nodes
            .iter()
            .find_map(|node| node.group_content.as_deref())
            .expect("second group level");
        assert!(level2.max_depth_reached);
        assert!(level2.nodes.is_empty());
    }

    #[test]
    fn default_values_follow_the_resolution_policy() {
        let document = walk(&demo_graph(), DEFAULT_MAX_DEPTH).expect("walk");

        let smooth_content = document.groups.get("Smooth").expect("group content");
        let set_position = smooth_content
            .nodes
            .iter()
            .find(|node| node.name == "Set Position")
            .expect("set position node");
        let offset = &set_position.inputs[1];
        assert_eq!(
            offset.default_value,
            Some(serde_json::json!([0.0, 0.0, 1.0]))
        );

        let output = document
            .nodes
            .iter()
            .find(|node| node.name == "Output")
            .expect("output node");
        let settings = &output.inputs[1];
        let rendered = settings
            .default_value
            .as_ref()
            .and_then(|value| value.as_str())
            .expect("stringified default");
        assert!(rendered.ends_with("..."));
        assert_eq!(rendered.chars().count(), 53);
    }

    #[test]
    fn long_vectors_are_stringified_not_materialized() {
        let mut graph = Graph::new(TreeKind::Shading);
        graph.add_node(Node::new("Big", "CUSTOM").with_input(
            Port::new("in_0", "Matrix", "CUSTOM")
                .with_default(PortValue::vector((0..16).map(f64::from))),
        ));

        let document = walk(&graph, DEFAULT_MAX_DEPTH).expect("walk");
        let default = document.nodes[0].inputs[0]
            .default_value
            .as_ref()
            .expect("default");
        assert!(default.is_string());
    }
}
