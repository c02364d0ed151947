// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

/// A transient, externally supplied subset of the active graph's nodes.
///
/// An empty selection is a valid serialization input; it signals "no node
/// context" to downstream consumers, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    names: Vec<String>,
}

impl Selection {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| candidate == name)
    }
}
