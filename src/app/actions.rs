//! Widget actions registered with the router

use tracing::{debug, info, warn};

use super::{HostEvent, PresetController, dialogs};
use crate::config::PinMode;
use crate::constants::{namespaces, widgets};
use crate::device::ConnectorId;
use crate::dispatch::press::ReleaseOutcome;
use crate::dispatch::{Branch, RouteNode, Router, WidgetEvent};
use crate::error::Result;
use crate::maker::Direction;
use crate::ui::Feedback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    ActivatePreset,
    ArmPresetOptions,
    SelectOutput,
    CycleMonitorRole,
    SelectSource,
    AddSource,
    ResetRoute,
    PromptSave,
    CycleMonitors,
    EditOutputName,
    OutputNameHelp,
    SetPinMode,
    EditPin,
    Ignore,
}

pub fn build_router() -> Router<WidgetAction> {
    use RouteNode::{Branch as Node, Leaf};
    use WidgetAction::*;

    Router::new([namespaces::PRESETS, namespaces::MAKER])
        .on_released("Presets", "Select", Leaf(ActivatePreset))
        .on_pressed("Presets", "Select", Leaf(ArmPresetOptions))
        .on_released("Maker", "OutputSelect", Leaf(SelectOutput))
        .on_released("Maker", "MonitorRole", Leaf(CycleMonitorRole))
        .on_released(
            "Maker",
            "Matrix",
            Node(
                Branch::new()
                    .on("SourceSelect", SelectSource)
                    .on("Add", AddSource)
                    .on("Reset", ResetRoute)
                    .fallback(Ignore),
            ),
        )
        .on_released("Maker", "PresetSave", Leaf(PromptSave))
        .on_released(
            "Config",
            "MonitorsConfig",
            Node(Branch::new().on("Select", CycleMonitors).on("Help", Ignore)),
        )
        .on_released(
            "Config",
            "DisplayName",
            Node(Branch::new().on("Edit", EditOutputName).on("Help", OutputNameHelp)),
        )
        .on_released(
            "Config",
            "PinProtection",
            Node(Branch::new().on("Mode", SetPinMode).on("Edit", EditPin)),
        )
}

/// Owned copy of what a handler needs from the event
#[derive(Debug, Clone)]
struct ActionContext {
    sub_action: Option<String>,
    data: Option<String>,
    value: String,
    peripheral_id: Option<String>,
}

impl ActionContext {
    /// Preset index from `{i}:{name}` data on single buttons, else from `{i}~{name}` value
    fn preset_index(&self) -> Option<usize> {
        let raw = if self.sub_action.as_deref() == Some("Single") {
            self.data.as_deref()?.split(':').next()?
        } else {
            self.value.split('~').next()?
        };
        raw.trim().parse().ok()
    }
}

impl PresetController {
    pub(super) async fn on_widget(&mut self, event: WidgetEvent) -> Result<()> {
        let Some(dispatch) = self.router.resolve(&event) else {
            return Ok(());
        };
        let action = *dispatch.handler;
        let ctx = ActionContext {
            sub_action: dispatch.path.sub_action.map(str::to_string),
            data: dispatch.path.data.map(str::to_string),
            value: event.value.clone(),
            peripheral_id: event.peripheral_id.clone(),
        };
        debug!(widget = %event.widget_id, phase = %event.phase, ?action, "Dispatching widget action");
        self.run_action(action, ctx).await
    }

    async fn run_action(&mut self, action: WidgetAction, ctx: ActionContext) -> Result<()> {
        match action {
            WidgetAction::ActivatePreset => {
                if self.press.is_pending() {
                    debug!("Preset released before its options opened");
                }
                if self.press.release() == ReleaseOutcome::Suppressed {
                    return Ok(());
                }
                match ctx.preset_index() {
                    Some(index) => self.activate(index).await.map(|_| ()),
                    None => {
                        warn!(value = %ctx.value, data = ?ctx.data, "Preset selection carried no index");
                        Ok(())
                    }
                }
            }
            WidgetAction::ArmPresetOptions => {
                let Some(index) = ctx.preset_index().filter(|index| self.registry.preset(*index).is_some())
                else {
                    warn!(value = %ctx.value, "Pressed preset does not resolve, not arming options");
                    return Ok(());
                };
                let peripheral_id = ctx.peripheral_id;
                self.press.arm(&self.events, move |generation| HostEvent::LongPressElapsed {
                    generation,
                    index,
                    peripheral_id,
                });
                Ok(())
            }
            WidgetAction::SelectOutput => {
                let Ok(output) = ctx.value.trim().parse::<ConnectorId>() else {
                    warn!(value = %ctx.value, "Invalid output selection");
                    return Ok(());
                };
                self.maker.select_output(output);
                info!(output, "Maker output selected");
                self.refresh_role_feedback().await;
                self.refresh_route_feedback().await;
                Ok(())
            }
            WidgetAction::CycleMonitorRole => {
                let Ok(direction) = ctx.value.parse::<Direction>() else {
                    warn!(value = %ctx.value, "Invalid monitor role direction");
                    return Ok(());
                };
                let output = self.maker.selected_output;
                let current = self.device.monitor_role(output).await?;
                if let Some(next) = self.maker.next_role(&current, direction) {
                    self.device.set_monitor_role(output, &next).await?;
                    info!(output, from = %current, to = %next, "Monitor role changed");
                }
                self.refresh_role_feedback().await;
                Ok(())
            }
            WidgetAction::SelectSource => {
                match ctx.value.trim().parse() {
                    Ok(source) => {
                        self.maker.select_input(source);
                        info!(source, "Maker input selected");
                    }
                    Err(_) => warn!(value = %ctx.value, "Invalid source selection"),
                }
                Ok(())
            }
            WidgetAction::AddSource => {
                let Some(source) = self.maker.selected_input else {
                    self.show_prompt(dialogs::source_reminder(ctx.peripheral_id)).await?;
                    self.clear_source_selection().await;
                    return Ok(());
                };
                let output = self.maker.selected_output;
                self.routes.add_source(self.device.as_ref(), output, source).await;
                self.refresh_route_feedback().await;
                self.clear_source_selection().await;
                Ok(())
            }
            WidgetAction::ResetRoute => {
                let output = self.maker.selected_output;
                self.routes.clear_route(self.device.as_ref(), output).await;
                self.refresh_route_feedback().await;
                self.clear_source_selection().await;
                Ok(())
            }
            WidgetAction::PromptSave => {
                self.show_text_input(dialogs::save_preset(false, ctx.peripheral_id))
                    .await
            }
            WidgetAction::CycleMonitors => {
                let Ok(direction) = ctx.value.parse::<Direction>() else {
                    warn!(value = %ctx.value, "Invalid monitors direction");
                    return Ok(());
                };
                let current = self.device.monitors_mode().await?;
                if let Some(next) = self.maker.next_monitors(&current, direction) {
                    self.device.set_monitors_mode(&next).await?;
                    info!(from = %current, to = %next, "Monitors mode changed");
                }
                self.refresh_monitors_feedback().await;
                Ok(())
            }
            WidgetAction::EditOutputName => {
                let Some(connector) = ctx.data.as_deref().and_then(|data| data.parse().ok()) else {
                    warn!(data = ?ctx.data, "Output name edit carried no connector");
                    return Ok(());
                };
                let current = self.registry.output_name(connector);
                let input = dialogs::output_name(connector, current, None, ctx.peripheral_id);
                self.show_text_input(input).await
            }
            WidgetAction::OutputNameHelp => {
                self.show_prompt(dialogs::output_name_help(ctx.peripheral_id))
                    .await
            }
            WidgetAction::SetPinMode => {
                let Some(mode) = PinMode::parse(&ctx.value) else {
                    warn!(value = %ctx.value, "Invalid pin protection mode");
                    return Ok(());
                };
                self.registry.set_pin_mode(mode).await?;
                self.refresh_pin_feedback().await;
                Ok(())
            }
            WidgetAction::EditPin => {
                self.pending_pin = None;
                let input = dialogs::pin_edit(Feedback::PinEditValidate, false, ctx.peripheral_id);
                self.show_text_input(input).await
            }
            WidgetAction::Ignore => Ok(()),
        }
    }

    pub(super) async fn on_long_press(
        &mut self,
        generation: u64,
        index: usize,
        peripheral_id: Option<String>,
    ) -> Result<()> {
        if !self.press.take_elapsed(generation) {
            return Ok(());
        }
        let Some(entry) = self.registry.preset(index) else {
            warn!(index, "Long-pressed preset no longer exists");
            return Ok(());
        };
        let is_default = self.registry.default_index() == Some(index);
        let prompt = dialogs::preset_options(
            index,
            &entry.name,
            is_default,
            &self.settings.default_terminator,
            peripheral_id,
        );
        info!(index, is_default, "Opening preset options");
        self.show_prompt(prompt).await
    }

    async fn clear_source_selection(&mut self) {
        if self.maker.clear_input().is_some() {
            debug!("Maker input deselected");
        }
        if let Err(err) = self.ui.unset_widget_value(widgets::SOURCE_SELECT).await {
            debug!(error = %err, "Failed to clear source selection widget");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::WidgetPhase;

    fn resolve(id: &str, phase: WidgetPhase) -> Option<WidgetAction> {
        let router = build_router();
        let event = WidgetEvent::new(id, phase, "");
        router.resolve(&event).map(|dispatch| *dispatch.handler)
    }

    #[test]
    fn test_registered_actions() {
        use WidgetAction::*;
        assert_eq!(resolve("dop~Presets~Select", WidgetPhase::Released), Some(ActivatePreset));
        assert_eq!(resolve("dop~Presets~Select", WidgetPhase::Pressed), Some(ArmPresetOptions));
        assert_eq!(resolve("dopm~Maker~Matrix:Add", WidgetPhase::Released), Some(AddSource));
        assert_eq!(resolve("dopm~Maker~Matrix:RouteOrder", WidgetPhase::Released), Some(Ignore));
        assert_eq!(resolve("dopm~Config~DisplayName:Edit~2", WidgetPhase::Released), Some(EditOutputName));
        assert_eq!(resolve("dopm~Config~PinProtection:Mode", WidgetPhase::Released), Some(SetPinMode));
        assert_eq!(resolve("dopm~Config~PinProtection:Other", WidgetPhase::Released), None);
        assert_eq!(resolve("dopm~Maker~PresetSave", WidgetPhase::Pressed), None);
    }

    #[test]
    fn test_preset_index_sources() {
        let ctx = ActionContext {
            sub_action: Some("Single".to_string()),
            data: Some("3:Room A".to_string()),
            value: String::new(),
            peripheral_id: None,
        };
        assert_eq!(ctx.preset_index(), Some(3));

        let ctx = ActionContext {
            sub_action: None,
            data: None,
            value: "2~Room B".to_string(),
            peripheral_id: None,
        };
        assert_eq!(ctx.preset_index(), Some(2));

        let ctx = ActionContext {
            sub_action: Some("Single".to_string()),
            data: None,
            value: "1~x".to_string(),
            peripheral_id: None,
        };
        assert_eq!(ctx.preset_index(), None);
    }
}
