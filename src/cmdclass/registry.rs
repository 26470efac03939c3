//! Immutable command class table and payload descriptors.

use std::collections::HashMap;

use thiserror::Error;

use super::class_id;

/// Error returned when a command payload does not satisfy its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "payload for command 0x{command_class_id:02X}/0x{command_id:02X} too short: \
     expected at least {expected} bytes, got {actual}"
)]
pub struct CommandParseError {
    /// Command class the payload was parsed against
    pub command_class_id: u8,
    /// Command within the class
    pub command_id: u8,
    /// Minimum payload length the descriptor declares
    pub expected: usize,
    /// Length of the payload that was offered
    pub actual: usize,
}

/// One command within a command class.
///
/// A descriptor names the command and lists the single-byte fields its
/// inbound payload starts with. Commands the hub only sends declare no
/// fields and accept any payload.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    command_class_id: u8,
    command_id: u8,
    name: &'static str,
    fields: &'static [&'static str],
}

impl CommandDescriptor {
    /// Command class this descriptor belongs to.
    pub fn command_class_id(&self) -> u8 {
        self.command_class_id
    }

    /// Command id within the class.
    pub fn command_id(&self) -> u8 {
        self.command_id
    }

    /// Human-readable command name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Named payload fields, one byte each, in wire order.
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Parse a raw payload against this descriptor.
    ///
    /// Each declared field consumes one byte in order; bytes beyond the
    /// declared fields are preserved as trailing data. A payload shorter
    /// than the declared fields fails.
    pub fn parse_payload(&self, payload: &[u8]) -> Result<ParsedCommand, CommandParseError> {
        if payload.len() < self.fields.len() {
            return Err(CommandParseError {
                command_class_id: self.command_class_id,
                command_id: self.command_id,
                expected: self.fields.len(),
                actual: payload.len(),
            });
        }

        let values = self
            .fields
            .iter()
            .zip(payload)
            .map(|(name, value)| (*name, *value))
            .collect();

        Ok(ParsedCommand {
            command_class_id: self.command_class_id,
            command_id: self.command_id,
            values,
            trailing: payload[self.fields.len()..].to_vec(),
        })
    }
}

/// Structured view of one command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    command_class_id: u8,
    command_id: u8,
    values: Vec<(&'static str, u8)>,
    trailing: Vec<u8>,
}

impl ParsedCommand {
    /// Command class the payload belongs to.
    pub fn command_class_id(&self) -> u8 {
        self.command_class_id
    }

    /// Command id within the class.
    pub fn command_id(&self) -> u8 {
        self.command_id
    }

    /// Value of a named field, if the descriptor declares it.
    pub fn get(&self, field: &str) -> Option<u8> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
    }

    /// Named fields in wire order.
    pub fn values(&self) -> &[(&'static str, u8)] {
        &self.values
    }

    /// Payload bytes beyond the declared fields.
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }
}

/// A command class: a named group of commands under one class id.
#[derive(Debug, Clone)]
pub struct CommandClass {
    id: u8,
    name: &'static str,
    commands: HashMap<u8, CommandDescriptor>,
}

impl CommandClass {
    /// Create an empty command class.
    pub fn new(id: u8, name: &'static str) -> Self {
        Self {
            id,
            name,
            commands: HashMap::new(),
        }
    }

    /// Add one command to the class, returning the class for chaining.
    pub fn command(
        mut self,
        command_id: u8,
        name: &'static str,
        fields: &'static [&'static str],
    ) -> Self {
        self.commands.insert(
            command_id,
            CommandDescriptor {
                command_class_id: self.id,
                command_id,
                name,
                fields,
            },
        );
        self
    }

    /// Numeric class id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Human-readable class name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a command by id.
    pub fn get(&self, command_id: u8) -> Option<&CommandDescriptor> {
        self.commands.get(&command_id)
    }

    /// Number of commands in the class.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

/// Immutable table of command classes keyed by class id.
///
/// Built once at startup; lookups never require synchronization.
#[derive(Debug, Clone)]
pub struct CommandClassRegistry {
    classes: HashMap<u8, CommandClass>,
}

impl CommandClassRegistry {
    /// Build a registry from explicit classes.
    pub fn from_classes(classes: impl IntoIterator<Item = CommandClass>) -> Self {
        Self {
            classes: classes.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// The standard table of well-known command classes.
    pub fn standard() -> Self {
        Self::from_classes([
            CommandClass::new(class_id::BASIC, "basic")
                .command(0x01, "set", &["value"])
                .command(0x02, "get", &[])
                .command(0x03, "report", &["value"]),
            CommandClass::new(class_id::SWITCH_BINARY, "switch_binary")
                .command(0x01, "set", &["value"])
                .command(0x02, "get", &[])
                .command(0x03, "report", &["value"]),
            CommandClass::new(class_id::SWITCH_MULTILEVEL, "switch_multilevel")
                .command(0x01, "set", &["value"])
                .command(0x02, "get", &[])
                .command(0x03, "report", &["value"]),
            CommandClass::new(class_id::SENSOR_BINARY, "sensor_binary")
                .command(0x02, "get", &[])
                .command(0x03, "report", &["value"]),
            CommandClass::new(class_id::SENSOR_MULTILEVEL, "sensor_multilevel")
                .command(0x04, "get", &[])
                .command(0x05, "report", &["sensor_type", "level"]),
            CommandClass::new(class_id::METER, "meter")
                .command(0x01, "get", &[])
                .command(0x02, "report", &["meter_type", "properties"]),
            CommandClass::new(class_id::CONFIGURATION, "configuration")
                .command(0x04, "set", &["parameter", "size"])
                .command(0x05, "get", &["parameter"])
                .command(0x06, "report", &["parameter", "size"]),
            CommandClass::new(class_id::NOTIFICATION, "notification")
                .command(0x04, "get", &[])
                .command(0x05, "report", &["alarm_type", "alarm_level"]),
            CommandClass::new(class_id::MANUFACTURER_SPECIFIC, "manufacturer_specific")
                .command(0x04, "get", &[])
                .command(
                    0x05,
                    "report",
                    &[
                        "manufacturer_id_msb",
                        "manufacturer_id_lsb",
                        "product_type_id_msb",
                        "product_type_id_lsb",
                        "product_id_msb",
                        "product_id_lsb",
                    ],
                ),
            CommandClass::new(class_id::BATTERY, "battery")
                .command(0x02, "get", &[])
                .command(0x03, "report", &["level"]),
            CommandClass::new(class_id::WAKE_UP, "wake_up")
                .command(0x04, "interval_set", &[])
                .command(0x05, "interval_get", &[])
                .command(
                    0x06,
                    "interval_report",
                    &["seconds_msb", "seconds_mid", "seconds_lsb", "node_id"],
                )
                .command(0x07, "notification", &[])
                .command(0x08, "no_more_information", &[]),
            CommandClass::new(class_id::ASSOCIATION, "association")
                .command(0x01, "set", &["grouping"])
                .command(0x02, "get", &["grouping"])
                .command(0x03, "report", &["grouping", "max_nodes", "reports_to_follow"])
                .command(0x05, "groupings_get", &[])
                .command(0x06, "groupings_report", &["supported_groupings"]),
            CommandClass::new(class_id::VERSION, "version")
                .command(0x11, "get", &[])
                .command(
                    0x12,
                    "report",
                    &[
                        "library_type",
                        "protocol_version",
                        "protocol_subversion",
                        "application_version",
                        "application_subversion",
                    ],
                ),
        ])
    }

    /// Look up a command class by id.
    pub fn lookup(&self, command_class_id: u8) -> Option<&CommandClass> {
        self.classes.get(&command_class_id)
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lookup() {
        let registry = CommandClassRegistry::standard();

        let basic = registry.lookup(class_id::BASIC).unwrap();
        assert_eq!(basic.name(), "basic");
        assert_eq!(basic.get(0x03).unwrap().name(), "report");
        assert!(basic.get(0x7F).is_none());

        assert!(registry.lookup(0xEE).is_none());
    }

    #[test]
    fn test_parse_report_payload() {
        let registry = CommandClassRegistry::standard();
        let report = registry
            .lookup(class_id::MANUFACTURER_SPECIFIC)
            .unwrap()
            .get(0x05)
            .unwrap();

        let parsed = report
            .parse_payload(&[0x01, 0x4D, 0x30, 0x02, 0x00, 0x4B])
            .unwrap();
        assert_eq!(parsed.get("manufacturer_id_msb"), Some(0x01));
        assert_eq!(parsed.get("product_id_lsb"), Some(0x4B));
        assert_eq!(parsed.get("missing"), None);
        assert!(parsed.trailing().is_empty());
    }

    #[test]
    fn test_parse_keeps_trailing_bytes() {
        let registry = CommandClassRegistry::standard();
        let report = registry
            .lookup(class_id::SENSOR_MULTILEVEL)
            .unwrap()
            .get(0x05)
            .unwrap();

        let parsed = report.parse_payload(&[0x01, 0x42, 0x09, 0xC4]).unwrap();
        assert_eq!(parsed.get("sensor_type"), Some(0x01));
        assert_eq!(parsed.trailing(), &[0x09, 0xC4]);
    }

    #[test]
    fn test_parse_rejects_short_payload() {
        let registry = CommandClassRegistry::standard();
        let report = registry
            .lookup(class_id::BATTERY)
            .unwrap()
            .get(0x03)
            .unwrap();

        let err = report.parse_payload(&[]).unwrap_err();
        assert_eq!(err.expected, 1);
        assert_eq!(err.actual, 0);
    }

    #[test]
    fn test_set_accepts_any_payload_for_undeclared_commands() {
        let registry = CommandClassRegistry::standard();
        let get = registry.lookup(class_id::BASIC).unwrap().get(0x02).unwrap();

        let parsed = get.parse_payload(&[]).unwrap();
        assert!(parsed.values().is_empty());
    }
}
