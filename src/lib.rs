// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Nodescope — live node-graph introspection over a loopback JSON protocol.
//!
//! The crate serializes the host application's node graphs into tiered JSON
//! documents and serves them to local clients through a small TCP command
//! server, marshalling all host access onto a single owning thread.

pub mod bridge;
pub mod config;
pub mod doc;
pub mod host;
pub mod model;
pub mod server;
