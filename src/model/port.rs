// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

use smallvec::SmallVec;

/// A default value carried by an unconnected input port.
///
/// Host node systems attach defaults of wildly different shapes to ports; the
/// read view keeps scalars and short numeric vectors structured and demotes
/// everything else to an opaque string (the walker truncates those on the way
/// out, see `doc::walk`).
#[derive(Debug, Clone, PartialEq)]
pub enum PortValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vector(SmallVec<[f64; 4]>),
    Opaque(String),
}

impl PortValue {
    pub fn vector(values: impl IntoIterator<Item = f64>) -> Self {
        Self::Vector(values.into_iter().collect())
    }
}

/// One connection point on a node, input or output.
///
/// `identifier` is the stable handle links use; `name` is the display name and
/// is not guaranteed unique across the ports of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    identifier: String,
    name: String,
    socket_type: String,
    enabled: bool,
    hidden: bool,
    default_value: Option<PortValue>,
}

impl Port {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        socket_type: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            socket_type: socket_type.into(),
            enabled: true,
            hidden: false,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn set_default_value(&mut self, value: Option<PortValue>) {
        self.default_value = value;
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn socket_type(&self) -> &str {
        &self.socket_type
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn default_value(&self) -> Option<&PortValue> {
        self.default_value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::{Port, PortValue};

    #[test]
    fn port_can_be_constructed_and_updated() {
        let mut port = Port::new("in_0", "Value", "VALUE");
        assert_eq!(port.identifier(), "in_0");
        assert_eq!(port.name(), "Value");
        assert_eq!(port.socket_type(), "VALUE");
        assert!(port.enabled());
        assert!(!port.hidden());
        assert_eq!(port.default_value(), None);

        port.set_enabled(false);
        port.set_hidden(true);
        port.set_default_value(Some(PortValue::Float(0.5)));

        assert!(!port.enabled());
        assert!(port.hidden());
        assert_eq!(port.default_value(), Some(&PortValue::Float(0.5)));
    }

    #[test]
    fn vector_values_collect_into_inline_storage() {
        let value = PortValue::vector([1.0, 2.0, 3.0]);
        let PortValue::Vector(values) = &value else {
            panic!("expected vector value");
        };
        assert_eq!(values.as_slice(), &[1.0, 2.0, 3.0]);
    }
}
