// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Read views over the host application's live node document.
//!
//! Nothing in this module creates, mutates, or destroys host entities; the
//! core only observes them at the instant of a request. Wire shapes live in
//! `doc` and `server::types`, not here.

pub mod fixtures;
mod graph;
mod port;
mod selection;

pub use graph::{Graph, Link, Node, TreeKind};
pub use port::{Port, PortValue};
pub use selection::Selection;
