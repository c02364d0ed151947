// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Graph serialization and tiered detail filtering.
//!
//! [`walk`] turns a live graph into a [`Document`]; [`filter_value`] and
//! [`filter_text`] then reduce that document to a requested [`DetailTier`].

mod detail;
mod types;
pub(crate) mod walk;

pub use detail::{filter_text, filter_value, DetailTier, UnknownTier, ULTRA_LITE_PLACEHOLDER};
pub use types::{Document, LinkDoc, LinkEndpoint, NodeDoc, PortDoc};
pub use walk::{walk, walk_selection, WalkError, DEFAULT_MAX_DEPTH};
