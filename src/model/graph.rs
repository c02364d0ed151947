// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;

use super::port::Port;

/// The flavor of node system a graph belongs to. Informational only; it does
/// not change the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Geometry,
    Shading,
    Compositing,
}

impl TreeKind {
    /// The host-side tree type identifier serialized into documents.
    pub fn label(self) -> &'static str {
        match self {
            Self::Geometry => "GeometryNodeTree",
            Self::Shading => "ShaderNodeTree",
            Self::Compositing => "CompositorNodeTree",
        }
    }
}

/// A typed vertex in the graph.
///
/// Nodes with a `subgraph` are group variants; the subgraph is a full `Graph`
/// owned exclusively by its group node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    label: String,
    node_type: String,
    position: [f64; 2],
    width: f64,
    height: f64,
    color: Option<[f64; 3]>,
    use_custom_color: bool,
    selected: bool,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    subgraph: Option<Graph>,
}

impl Node {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            node_type: node_type.into(),
            position: [0.0, 0.0],
            width: 140.0,
            height: 100.0,
            color: None,
            use_custom_color: false,
            selected: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            subgraph: None,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = [x, y];
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    pub fn with_subgraph(mut self, subgraph: Graph) -> Self {
        self.subgraph = Some(subgraph);
        self
    }

    pub fn set_color(&mut self, color: Option<[f64; 3]>) {
        self.use_custom_color = color.is_some();
        self.color = color;
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn color(&self) -> Option<[f64; 3]> {
        self.color
    }

    pub fn use_custom_color(&self) -> bool {
        self.use_custom_color
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn subgraph(&self) -> Option<&Graph> {
        self.subgraph.as_ref()
    }

    pub fn input_by_identifier(&self, identifier: &str) -> Option<&Port> {
        self.inputs.iter().find(|port| port.identifier() == identifier)
    }

    pub fn output_by_identifier(&self, identifier: &str) -> Option<&Port> {
        self.outputs.iter().find(|port| port.identifier() == identifier)
    }
}

/// A directed edge between an output port and an input port.
///
/// Links are stored at the graph level and reference their endpoints by node
/// name and port identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    from_node: String,
    from_port: String,
    to_node: String,
    to_port: String,
}

impl Link {
    pub fn new(
        from_node: impl Into<String>,
        from_port: impl Into<String>,
        to_node: impl Into<String>,
        to_port: impl Into<String>,
    ) -> Self {
        Self {
            from_node: from_node.into(),
            from_port: from_port.into(),
            to_node: to_node.into(),
            to_port: to_port.into(),
        }
    }

    pub fn from_node(&self) -> &str {
        &self.from_node
    }

    pub fn from_port(&self) -> &str {
        &self.from_port
    }

    pub fn to_node(&self) -> &str {
        &self.to_node
    }

    pub fn to_port(&self) -> &str {
        &self.to_port
    }
}

/// An insertion-stable collection of nodes plus the links between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    tree_kind: TreeKind,
    nodes: IndexMap<String, Node>,
    links: Vec<Link>,
}

impl Graph {
    pub fn new(tree_kind: TreeKind) -> Self {
        Self {
            tree_kind,
            nodes: IndexMap::new(),
            links: Vec::new(),
        }
    }

    pub fn tree_kind(&self) -> TreeKind {
        self.tree_kind
    }

    pub fn nodes(&self) -> &IndexMap<String, Node> {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut IndexMap<String, Node> {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Insert a node keyed by its own name, replacing any node with the same
    /// name.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.name().to_owned(), node);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }
}
