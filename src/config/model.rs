//! Persisted configuration root
//!
//! Pin protection, output display names and the preset book. Field names are
//! serialized in PascalCase so stored documents read `{"Preset": {"Default":
//! null, "Current": 0, "List": [...]}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::Settings;
use crate::device::{ConnectorId, MatrixLayout, MonitorRole, SourceId};
use crate::error::{Error, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Configuration {
    pub pin_protection: PinProtection,
    #[serde(default)]
    pub output_names: BTreeMap<ConnectorId, String>,
    pub preset: PresetBook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinProtection {
    pub mode: PinMode,
    pub pin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinMode {
    Enabled,
    Disabled,
}

impl PinMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Enabled" => Some(Self::Enabled),
            "Disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PresetBook {
    /// Preset applied on standby wake and call end
    pub default: Option<usize>,
    /// Preset believed to match the live device state
    pub current: Option<usize>,
    pub list: Vec<PresetEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PresetEntry {
    pub name: String,
    #[serde(default)]
    pub monitor_roles: Vec<RoleAssignment>,
    #[serde(default)]
    pub routes: Vec<OutputRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleAssignment {
    pub connector: ConnectorId,
    pub role: MonitorRole,
}

/// Ordered sources for one output. The first source replaces whatever the
/// output shows, every later source is added on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputRoute {
    pub connector: ConnectorId,
    #[serde(default)]
    pub layout: MatrixLayout,
    #[serde(default)]
    pub input_order: Vec<SourceId>,
}

impl OutputRoute {
    pub fn empty(connector: ConnectorId) -> Self {
        Self {
            connector,
            layout: MatrixLayout::default(),
            input_order: Vec::new(),
        }
    }
}

impl Configuration {
    /// Fresh configuration used on first start or after corruption
    pub fn factory(settings: &Settings) -> Self {
        let output_names = (1..=settings.factory_outputs)
            .map(|connector| (connector, format!("{} {}", settings.initial_output_name, connector)))
            .collect();

        Self {
            pin_protection: PinProtection {
                mode: PinMode::Enabled,
                pin: settings.factory_pin.clone(),
            },
            output_names,
            preset: PresetBook::default(),
        }
    }

    /// Parse a stored document.
    ///
    /// A preset list that exists but is not a sequence is fatal; anything else
    /// that fails to deserialize is reported as corruption so the caller can
    /// regenerate.
    pub fn from_value(value: Value, location: &str) -> Result<Self, Error> {
        if let Some(list) = value.pointer("/Preset/List")
            && !list.is_array()
        {
            return Err(Error::Malformed {
                details: format!("Preset.List must be a sequence, found {}", json_type(list)),
            });
        }

        let mut config: Configuration =
            serde_json::from_value(value).map_err(|source| StoreError::Corrupt {
                location: location.to_string(),
                source,
            })?;
        config.clamp_indices();
        Ok(config)
    }

    pub fn preset(&self, index: usize) -> Option<&PresetEntry> {
        self.preset.list.get(index)
    }

    /// Drop Default/Current pointers that no longer resolve
    fn clamp_indices(&mut self) {
        let len = self.preset.list.len();
        if let Some(default) = self.preset.default
            && default >= len
        {
            warn!(default, len, "Stored default preset index out of range, clearing");
            self.preset.default = None;
        }
        if let Some(current) = self.preset.current
            && current >= len
        {
            warn!(current, len, "Stored current preset index out of range, clearing");
            self.preset.current = None;
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_factory_defaults() {
        let config = Configuration::factory(&Settings::default());
        assert_eq!(config.pin_protection.mode, PinMode::Enabled);
        assert_eq!(config.pin_protection.pin, "000000");
        assert_eq!(config.output_names.get(&1).map(String::as_str), Some("HDMI 1"));
        assert_eq!(config.output_names.get(&3).map(String::as_str), Some("HDMI 3"));
        assert_eq!(config.preset, PresetBook::default());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut config = Configuration::factory(&Settings::default());
        config.preset.list.push(PresetEntry {
            name: "Room A".to_string(),
            monitor_roles: vec![RoleAssignment {
                connector: 1,
                role: MonitorRole::First,
            }],
            routes: vec![OutputRoute {
                connector: 1,
                layout: MatrixLayout::Equal,
                input_order: vec![5, 7],
            }],
        });

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["PinProtection"]["Mode"], "Enabled");
        assert_eq!(value["OutputNames"]["2"], "HDMI 2");
        assert_eq!(value["Preset"]["Default"], Value::Null);
        assert_eq!(value["Preset"]["List"][0]["MonitorRoles"][0]["Role"], "First");
        assert_eq!(value["Preset"]["List"][0]["Routes"][0]["InputOrder"], json!([5, 7]));
    }

    #[test]
    fn test_route_layout_defaults_to_equal() {
        let route: OutputRoute = serde_json::from_value(json!({"Connector": 2})).unwrap();
        assert_eq!(route, OutputRoute::empty(2));
    }

    #[test]
    fn test_list_not_sequence_is_malformed() {
        let value = json!({
            "PinProtection": {"Mode": "Enabled", "Pin": "1234"},
            "Preset": {"Default": null, "Current": null, "List": {"0": "x"}}
        });
        let err = Configuration::from_value(value, "test").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_missing_fields_are_corruption() {
        let err = Configuration::from_value(json!({"Preset": 4}), "test").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_dangling_indices_are_cleared() {
        let value = json!({
            "PinProtection": {"Mode": "Disabled", "Pin": "1234"},
            "OutputNames": {"1": "Left"},
            "Preset": {"Default": 3, "Current": 0, "List": [{"Name": "Only"}]}
        });
        let config = Configuration::from_value(value, "test").unwrap();
        assert_eq!(config.preset.default, None);
        assert_eq!(config.preset.current, Some(0));
        assert_eq!(config.preset.list[0].routes, Vec::new());
    }
}
