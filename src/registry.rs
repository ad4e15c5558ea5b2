//! Preset registry
//!
//! Owns the configuration root. Every mutation is written through to the
//! store and followed by a rebuild of the preset list panel, so the panel
//! and the stored document never lag the in-memory state.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::validation::{validate_output_name, validate_pin, validate_preset_name};
use crate::config::{Configuration, PinMode, PresetEntry, RoleAssignment, Settings};
use crate::constants::{storage, widgets};
use crate::device::{ConnectorId, DeviceControl};
use crate::error::{Error, Result, StoreError};
use crate::matrix::WorkingRoutes;
use crate::persistence::ConfigStore;
use crate::ui::{PanelUpdate, PresetListItem, PresetListView, UiSurface};

/// Default index after entry `removed` is spliced out of the list.
///
/// The default is cleared when it was the removed entry. Any other default
/// moves down by one and is cleared when that would take it below zero.
pub fn shift_default_after_removal(default: Option<usize>, removed: usize) -> Option<usize> {
    match default {
        Some(index) if index == removed => None,
        Some(index) => index.checked_sub(1),
        None => None,
    }
}

pub struct PresetRegistry {
    config: Configuration,
    settings: Settings,
    store: Arc<dyn ConfigStore>,
    ui: Arc<dyn UiSurface>,
}

impl PresetRegistry {
    /// Starts from the factory configuration until [`load`](Self::load) runs
    pub fn new(settings: Settings, store: Arc<dyn ConfigStore>, ui: Arc<dyn UiSurface>) -> Self {
        Self {
            config: Configuration::factory(&settings),
            settings,
            store,
            ui,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn preset(&self, index: usize) -> Option<&PresetEntry> {
        self.config.preset(index)
    }

    pub fn len(&self) -> usize {
        self.config.preset.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.preset.list.is_empty()
    }

    pub fn default_index(&self) -> Option<usize> {
        self.config.preset.default
    }

    pub fn current_index(&self) -> Option<usize> {
        self.config.preset.current
    }

    pub fn pin_mode(&self) -> PinMode {
        self.config.pin_protection.mode
    }

    pub fn pin_matches(&self, pin: &str) -> bool {
        self.config.pin_protection.pin == pin
    }

    pub fn output_name(&self, connector: ConnectorId) -> Option<&str> {
        self.config.output_names.get(&connector).map(String::as_str)
    }

    /// Load the root from the store, regenerating it when missing or corrupt.
    ///
    /// Only a structurally unusable document is returned as an error.
    pub async fn load(&mut self) -> Result<()> {
        let value = match self.store.read(storage::CONFIG_KEY).await {
            Ok(value) => value,
            Err(StoreError::NotFound { component, .. }) => {
                info!(component = %component, "No stored configuration, generating defaults");
                return self.regenerate().await;
            }
            Err(err @ StoreError::Corrupt { .. }) => {
                warn!(error = %err, "Stored configuration unreadable, regenerating");
                return self.regenerate().await;
            }
            Err(err) => return Err(err.into()),
        };

        match Configuration::from_value(value, storage::CONFIG_KEY) {
            Ok(config) => {
                info!(
                    presets = config.preset.list.len(),
                    default = ?config.preset.default,
                    current = ?config.preset.current,
                    "Loaded configuration"
                );
                self.config = config;
                Ok(())
            }
            Err(Error::Store(err)) => {
                warn!(error = %err, "Stored configuration corrupt, regenerating");
                self.regenerate().await
            }
            Err(err) => Err(err),
        }
    }

    async fn regenerate(&mut self) -> Result<()> {
        self.config = Configuration::factory(&self.settings);
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let value = serde_json::to_value(&self.config).map_err(StoreError::from)?;
        self.store.write(storage::CONFIG_KEY, &value).await?;
        debug!(key = storage::CONFIG_KEY, "Persisted configuration");
        Ok(())
    }

    /// Persist, then rebuild the preset list
    async fn commit(&self) -> Result<()> {
        self.persist().await?;
        self.publish_preset_list().await;
        Ok(())
    }

    pub fn preset_list_view(&self) -> PresetListView {
        let items = self
            .config
            .preset
            .list
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let is_default = self.config.preset.default == Some(index);
                let mut label = entry.name.clone();
                if self.settings.show_index {
                    label.push_str(&format!(" [{index}]"));
                }
                if is_default {
                    label.push(' ');
                    label.push_str(&self.settings.default_terminator);
                }
                PresetListItem {
                    index,
                    label,
                    is_default,
                }
            })
            .collect();
        PresetListView { items }
    }

    /// Publish the list panel and point the selection widget at Current.
    /// UI failures are logged, never propagated.
    pub async fn publish_preset_list(&self) {
        if let Err(err) = self
            .ui
            .publish_panel(PanelUpdate::PresetList(self.preset_list_view()))
            .await
        {
            warn!(error = %err, "Failed to publish preset list");
        }

        let current = self
            .config
            .preset
            .current
            .and_then(|index| self.preset(index).map(|entry| (index, entry)));
        let result = match current {
            Some((index, entry)) => {
                let value = format!("{index}~{}", entry.name);
                self.ui.set_widget_value(widgets::PRESET_SELECT, &value).await
            }
            None => self.ui.unset_widget_value(widgets::PRESET_SELECT).await,
        };
        if let Err(err) = result {
            warn!(error = %err, "Failed to update current preset widget");
        }
    }

    /// Capture live roles and the working routes as a new preset; returns its index
    pub async fn save(
        &mut self,
        device: &dyn DeviceControl,
        routes: &WorkingRoutes,
        name: Option<&str>,
    ) -> Result<usize> {
        let name = match name {
            Some(name) => {
                validate_preset_name(name)?;
                name.to_string()
            }
            None => format!("Monitor Preset {}", self.len() + 1),
        };

        let monitor_roles = device
            .output_connectors()
            .await?
            .into_iter()
            .map(|output| RoleAssignment {
                connector: output.id,
                role: output.monitor_role,
            })
            .collect();

        self.config.preset.list.push(PresetEntry {
            name,
            monitor_roles,
            routes: routes.snapshot(),
        });
        let index = self.len() - 1;
        self.config.preset.current = Some(index);
        info!(index, name = %self.config.preset.list[index].name, "Saved preset");

        self.commit().await?;
        Ok(index)
    }

    pub async fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        let Some(entry) = self.config.preset.list.get_mut(index) else {
            warn!(index, "Cannot rename, preset index does not resolve");
            return Ok(());
        };
        if name.is_empty() {
            warn!(index, "Cannot rename, new name is empty");
            return Ok(());
        }
        if entry.name == name {
            debug!(index, name, "Preset name unchanged");
            return Ok(());
        }
        validate_preset_name(name)?;

        info!(index, from = %entry.name, to = name, "Renamed preset");
        entry.name = name.to_string();
        self.commit().await
    }

    pub async fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.len() {
            warn!(index, len = self.len(), "Cannot remove, preset index out of bounds");
            return Ok(());
        }

        let removed = self.config.preset.list.remove(index);
        self.config.preset.default = shift_default_after_removal(self.config.preset.default, index);
        self.config.preset.current = None;
        info!(index, name = %removed.name, default = ?self.config.preset.default, "Removed preset");

        self.commit().await
    }

    /// Set (or with `remove`, clear) the preset applied on wake and call end
    pub async fn set_default(&mut self, index: usize, remove: bool) -> Result<()> {
        if self.preset(index).is_none() {
            warn!(index, "Cannot change default, preset index does not resolve");
            return Ok(());
        }

        let target = if remove { None } else { Some(index) };
        if self.config.preset.default == target {
            debug!(index, remove, "Default preset unchanged");
            return Ok(());
        }

        self.config.preset.default = target;
        info!(default = ?target, "Default preset changed");
        self.commit().await
    }

    pub async fn mark_current(&mut self, index: usize) -> Result<()> {
        if self.preset(index).is_none() {
            warn!(index, "Cannot mark current, preset index does not resolve");
            return Ok(());
        }
        self.config.preset.current = Some(index);
        self.commit().await
    }

    pub async fn set_output_name(&mut self, connector: ConnectorId, name: &str) -> Result<()> {
        let weight = validate_output_name(name)?;
        self.config.output_names.insert(connector, name.to_string());
        info!(connector, name, weight, "Output renamed");
        self.commit().await
    }

    pub async fn set_pin_mode(&mut self, mode: PinMode) -> Result<()> {
        if self.config.pin_protection.mode == mode {
            debug!(mode = mode.as_str(), "Pin mode unchanged");
            return Ok(());
        }
        self.config.pin_protection.mode = mode;
        info!(mode = mode.as_str(), "Pin protection mode changed");
        self.commit().await
    }

    pub async fn set_pin(&mut self, pin: &str) -> Result<()> {
        validate_pin(pin)?;
        self.config.pin_protection.pin = pin.to_string();
        info!("Pin changed");
        self.commit().await
    }
}
