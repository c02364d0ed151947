// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! The seam between command handling and the embedding application.
//!
//! Command handlers only ever see a [`Host`]; the demo binary and the tests
//! plug in an [`InMemoryHost`], a real embedding wraps its own session state.

use crate::config::DetailConfig;
use crate::model::{Graph, Selection};

/// Version strings reported alongside serialized documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostInfo {
    host_version: String,
    addon_version: String,
}

impl HostInfo {
    pub fn new(host_version: impl Into<String>, addon_version: impl Into<String>) -> Self {
        Self {
            host_version: host_version.into(),
            addon_version: addon_version.into(),
        }
    }

    pub fn host_version(&self) -> &str {
        &self.host_version
    }

    pub fn addon_version(&self) -> &str {
        &self.addon_version
    }
}

/// Read access to the embedding application's current state.
///
/// Implementations are only ever called from the thread that owns the host
/// context, so none of these methods need interior locking.
pub trait Host {
    /// The graph currently open for editing, if any.
    fn active_graph(&self) -> Option<&Graph>;

    /// The current node selection within the active graph.
    fn selection(&self) -> &Selection;

    fn info(&self) -> &HostInfo;

    fn detail_config(&self) -> &DetailConfig;
}

/// A self-contained [`Host`] over plain owned state.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    graph: Option<Graph>,
    selection: Selection,
    info: HostInfo,
    config: DetailConfig,
}

impl InMemoryHost {
    pub fn new(info: HostInfo, config: DetailConfig) -> Self {
        Self {
            graph: None,
            selection: Selection::empty(),
            info,
            config,
        }
    }

    pub fn set_graph(&mut self, graph: Graph) {
        self.graph = Some(graph);
    }

    pub fn clear_graph(&mut self) {
        self.graph = None;
        self.selection = Selection::empty();
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn config_mut(&mut self) -> &mut DetailConfig {
        &mut self.config
    }
}

impl Host for InMemoryHost {
    fn active_graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn info(&self) -> &HostInfo {
        &self.info
    }

    fn detail_config(&self) -> &DetailConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::{Host, HostInfo, InMemoryHost};
    use crate::config::DetailConfig;
    use crate::model::fixtures::demo_graph;
    use crate::model::Selection;

    #[test]
    fn in_memory_host_exposes_its_state() {
        let mut host = InMemoryHost::new(
            HostInfo::new("4.1.0", "0.9.0"),
            DetailConfig::default(),
        );
        assert!(host.active_graph().is_none());
        assert!(host.selection().is_empty());

        host.set_graph(demo_graph());
        host.set_selection(Selection::new(["Grid"]));
        assert!(host.active_graph().is_some());
        assert!(host.selection().contains("Grid"));
        assert_eq!(host.info().host_version(), "4.1.0");

        host.clear_graph();
        assert!(host.active_graph().is_none());
        assert!(host.selection().is_empty());
    }
}
