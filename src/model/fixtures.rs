// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Canonical in-memory graphs for tests and the demo binary.

use super::graph::{Graph, Link, Node, TreeKind};
use super::port::{Port, PortValue};

/// A small geometry tree with one group node, used by the demo binary.
///
/// It deliberately exercises the awkward corners of default-value handling:
/// a vector default, the `"N/A"` sentinel, and an opaque default long enough
/// to be truncated by the walker.
pub fn demo_graph() -> Graph {
    let mut subgraph = Graph::new(TreeKind::Geometry);
    subgraph.add_node(
        Node::new("Group Input", "GROUP_INPUT")
            .with_output(Port::new("out_geo", "Geometry", "GEOMETRY")),
    );
    subgraph.add_node(
        Node::new("Set Position", "SET_POSITION")
            .with_position(200.0, 0.0)
            .with_input(Port::new("in_geo", "Geometry", "GEOMETRY"))
            .with_input(
                Port::new("in_offset", "Offset", "VECTOR")
                    .with_default(PortValue::vector([0.0, 0.0, 1.0])),
            )
            .with_output(Port::new("out_geo", "Geometry", "GEOMETRY")),
    );
    subgraph.add_node(
        Node::new("Group Output", "GROUP_OUTPUT")
            .with_position(400.0, 0.0)
            .with_input(Port::new("in_geo", "Geometry", "GEOMETRY")),
    );
    subgraph.add_link(Link::new("Group Input", "out_geo", "Set Position", "in_geo"));
    subgraph.add_link(Link::new("Set Position", "out_geo", "Group Output", "in_geo"));

    let mut graph = Graph::new(TreeKind::Geometry);
    graph.add_node(
        Node::new("Grid", "MESH_PRIMITIVE_GRID")
            .with_label("Base Grid")
            .with_input(
                Port::new("in_size_x", "Size X", "VALUE").with_default(PortValue::Float(1.0)),
            )
            .with_input(
                Port::new("in_size_y", "Size Y", "VALUE").with_default(PortValue::Float(1.0)),
            )
            .with_output(Port::new("out_mesh", "Mesh", "GEOMETRY")),
    );
    graph.add_node(
        Node::new("Smooth", "GROUP")
            .with_position(250.0, 0.0)
            .with_input(Port::new("in_geo", "Geometry", "GEOMETRY"))
            .with_input(
                Port::new("in_factor", "Factor", "VALUE").with_default(PortValue::Float(0.5)),
            )
            .with_input(
                Port::new("in_preset", "Preset", "STRING")
                    .with_default(PortValue::Str("N/A".to_owned())),
            )
            .with_output(Port::new("out_geo", "Geometry", "GEOMETRY"))
            .with_subgraph(subgraph),
    );
    graph.add_node(
        Node::new("Output", "GROUP_OUTPUT")
            .with_position(500.0, 0.0)
            .with_input(Port::new("in_geo", "Geometry", "GEOMETRY"))
            .with_input(Port::new("in_settings", "Settings", "CUSTOM").with_default(
                PortValue::Opaque(
                    "<bpy_struct, NodeSocketInterface metadata blob far exceeding any sane \
                     inline size>"
                        .to_owned(),
                ),
            )),
    );
    graph.add_link(Link::new("Grid", "out_mesh", "Smooth", "in_geo"));
    graph.add_link(Link::new("Smooth", "out_geo", "Output", "in_geo"));

    graph
}

/// The two-node scenario: `N1` with two outputs, `N2` with two inputs, one
/// link `N1.out0 -> N2.in0`.
#[cfg(test)]
pub(crate) fn two_node_link() -> Graph {
    let mut graph = Graph::new(TreeKind::Geometry);
    graph.add_node(
        Node::new("N1", "Input")
            .with_output(Port::new("out_0", "Value", "VALUE"))
            .with_output(Port::new("out_1", "Vector", "VECTOR")),
    );
    graph.add_node(
        Node::new("N2", "Output")
            .with_position(200.0, 50.0)
            .with_input(Port::new("in_0", "Value", "VALUE"))
            .with_input(
                Port::new("in_1", "Fallback", "STRING")
                    .with_default(PortValue::Str("N/A".to_owned())),
            ),
    );
    graph.add_link(Link::new("N1", "out_0", "N2", "in_0"));
    graph
}

/// A chain of group nodes nested `levels` deep, each level holding a single
/// leaf node next to the next group.
#[cfg(test)]
pub(crate) fn nested_groups(levels: usize) -> Graph {
    let mut graph = Graph::new(TreeKind::Geometry);
    graph.add_node(Node::new("Leaf", "VALUE"));
    for level in 0..levels {
        let mut outer = Graph::new(TreeKind::Geometry);
        outer.add_node(Node::new("Leaf", "VALUE"));
        outer.add_node(Node::new(format!("Group {level}"), "GROUP").with_subgraph(graph));
        graph = outer;
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::{demo_graph, nested_groups, two_node_link};

    #[test]
    fn demo_graph_contains_one_group_node() {
        let graph = demo_graph();
        let groups = graph
            .nodes()
            .values()
            .filter(|node| node.subgraph().is_some())
            .count();
        assert_eq!(groups, 1);
    }

    #[test]
    fn two_node_link_matches_the_scenario_shape() {
        let graph = two_node_link();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.links().len(), 1);
    }

    #[test]
    fn nested_groups_nest_to_the_requested_depth() {
        let graph = nested_groups(3);
        let mut depth = 0;
        let mut current = Some(&graph);
        while let Some(graph) = current {
            current = graph.nodes().values().find_map(|node| node.subgraph());
            if current.is_some() {
                depth += 1;
            }
        }
        assert_eq!(depth, 3);
    }
}
