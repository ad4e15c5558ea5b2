//! Preset controller
//!
//! Single actor that owns the registry, the working routes, the maker state
//! and the press session. Host events arrive on one channel and each is
//! handled to completion before the next; handler errors are logged and the
//! loop keeps going.

mod actions;
mod dialogs;
mod event;
mod startup;

pub use actions::{WidgetAction, build_router};
pub use event::{EventParseError, HostEvent};

use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::activation::{Activation, ActivationReport};
use crate::config::{PinMode, Settings};
use crate::constants::{panels, widgets};
use crate::device::DeviceControl;
use crate::dispatch::Router;
use crate::dispatch::press::PressSession;
use crate::error::Result;
use crate::maker::MakerState;
use crate::matrix::WorkingRoutes;
use crate::persistence::ConfigStore;
use crate::registry::PresetRegistry;
use crate::triggers::{Subscriptions, call_disconnect_target, standby_target};
use crate::ui::{Feedback, MakerView, PanelUpdate, UiSurface};

pub struct PresetController {
    device: Arc<dyn DeviceControl>,
    ui: Arc<dyn UiSurface>,
    settings: Settings,
    registry: PresetRegistry,
    routes: WorkingRoutes,
    maker: MakerState,
    router: Router<WidgetAction>,
    press: PressSession,
    subscriptions: Subscriptions,
    /// New pin awaiting confirmation during a pin change
    pending_pin: Option<String>,
    events: UnboundedSender<HostEvent>,
}

impl PresetController {
    /// `events` must feed the receiver later passed to [`run`](Self::run);
    /// the long-press timer posts its expiry there.
    pub fn new(
        settings: Settings,
        device: Arc<dyn DeviceControl>,
        store: Arc<dyn ConfigStore>,
        ui: Arc<dyn UiSurface>,
        events: UnboundedSender<HostEvent>,
    ) -> Self {
        Self {
            registry: PresetRegistry::new(settings.clone(), store, ui.clone()),
            routes: WorkingRoutes::seeded(settings.factory_outputs),
            maker: MakerState::default(),
            router: build_router(),
            press: PressSession::new(settings.options_timeout(), settings.suppress_release_after_options),
            subscriptions: Subscriptions::new(),
            pending_pin: None,
            device,
            ui,
            settings,
            events,
        }
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn routes(&self) -> &WorkingRoutes {
        &self.routes
    }

    pub fn maker(&self) -> &MakerState {
        &self.maker
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub async fn run(mut self, mut rx: UnboundedReceiver<HostEvent>) {
        while let Some(event) = rx.recv().await {
            if event == HostEvent::Shutdown {
                info!("Shutdown requested");
                break;
            }
            let _ = self
                .handle(event)
                .await
                .inspect_err(|err| error!("encountered error handling host event: err={err:#?}"));
        }
        info!("Controller stopped");
    }

    pub async fn handle(&mut self, event: HostEvent) -> Result<()> {
        if let Some(kind) = event.subscription()
            && !self.subscriptions.is_armed(kind)
        {
            debug!(subscription = %kind, "Subscription not armed, dropping event");
            return Ok(());
        }

        match event {
            HostEvent::PanelClicked {
                panel_id,
                peripheral_id,
            } => self.on_panel_clicked(&panel_id, peripheral_id).await,
            HostEvent::Widget(widget) => self.on_widget(widget).await,
            HostEvent::TextInputResponse {
                feedback,
                text,
                peripheral_id,
            } => self.on_text_input(&feedback, &text, peripheral_id).await,
            HostEvent::PromptResponse {
                feedback,
                option_id,
                peripheral_id,
            } => self.on_prompt_response(&feedback, option_id, peripheral_id).await,
            HostEvent::StandbyChanged(state) => {
                match standby_target(state, self.registry.default_index()) {
                    Some(index) => {
                        info!(index, "Standby exited, applying default preset");
                        self.activate(index).await.map(|_| ())
                    }
                    None => Ok(()),
                }
            }
            HostEvent::CallDisconnected => {
                let default = self.registry.default_index();
                match call_disconnect_target(self.device.as_ref(), default).await {
                    Some(index) => {
                        info!(index, "Call disconnected, applying default preset");
                        self.activate(index).await.map(|_| ())
                    }
                    None => Ok(()),
                }
            }
            HostEvent::LongPressElapsed {
                generation,
                index,
                peripheral_id,
            } => self.on_long_press(generation, index, peripheral_id).await,
            HostEvent::Shutdown => Ok(()),
        }
    }

    /// Apply preset `index` to the device; `None` when it does not resolve
    pub async fn activate(&mut self, index: usize) -> Result<Option<ActivationReport>> {
        let Some(mut activation) = Activation::prepare(self.registry.config(), index) else {
            return Ok(None);
        };
        activation.apply_roles(self.device.as_ref()).await;
        activation.load_working_routes(&mut self.routes);
        self.refresh_maker_feedback().await;
        activation.push_routes(self.device.as_ref()).await;
        let report = activation.commit(&mut self.registry).await?;
        Ok(Some(report))
    }

    async fn on_panel_clicked(&mut self, panel_id: &str, peripheral_id: Option<String>) -> Result<()> {
        if panel_id != panels::MAKER_VISIBLE {
            return Ok(());
        }
        match self.registry.pin_mode() {
            PinMode::Enabled => {
                let input = dialogs::pin_entry(Feedback::MakerAccessPin, None, false, peripheral_id);
                self.show_text_input(input).await
            }
            PinMode::Disabled => self.open_maker(peripheral_id).await,
        }
    }

    async fn open_maker(&mut self, peripheral_id: Option<String>) -> Result<()> {
        self.ui
            .open_panel(panels::MAKER_HIDDEN, peripheral_id.as_deref())
            .await?;
        self.maker.select_output(1);
        self.refresh_maker_feedback().await;
        self.refresh_pin_feedback().await;
        Ok(())
    }

    async fn publish_maker(&self) {
        let inputs = self.device.input_connectors().await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to enumerate inputs");
            Vec::new()
        });
        let outputs = self
            .routes
            .routes()
            .iter()
            .map(|route| {
                let name = self
                    .registry
                    .output_name(route.connector)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} {}", self.settings.initial_output_name, route.connector));
                (route.connector, name)
            })
            .collect();
        let view = MakerView {
            outputs,
            inputs,
            pin_mode: self.registry.pin_mode(),
        };
        if let Err(err) = self.ui.publish_panel(PanelUpdate::PresetMaker(view)).await {
            warn!(error = %err, "Failed to publish maker panel");
        }
    }

    async fn set_widget(&self, widget_id: &str, value: &str) {
        if let Err(err) = self.ui.set_widget_value(widget_id, value).await {
            warn!(widget = widget_id, error = %err, "Failed to set widget value");
        }
    }

    async fn refresh_role_feedback(&self) {
        let output = self.maker.selected_output;
        match self.device.monitor_role(output).await {
            Ok(role) => self.set_widget(widgets::MONITOR_ROLE, role.as_str()).await,
            Err(err) => warn!(output, error = %err, "Failed to read monitor role"),
        }
    }

    async fn refresh_monitors_feedback(&self) {
        match self.device.monitors_mode().await {
            Ok(mode) => self.set_widget(widgets::MONITORS_SELECT, mode.as_str()).await,
            Err(err) => warn!(error = %err, "Failed to read monitors mode"),
        }
    }

    async fn refresh_route_feedback(&self) {
        let text = self.routes.route_order_text(self.maker.selected_output);
        self.set_widget(widgets::ROUTE_ORDER, &text).await;
    }

    async fn refresh_pin_feedback(&self) {
        self.set_widget(widgets::PIN_MODE, self.registry.pin_mode().as_str())
            .await;
    }

    async fn refresh_maker_feedback(&self) {
        self.set_widget(widgets::OUTPUT_SELECT, &self.maker.selected_output.to_string())
            .await;
        self.refresh_role_feedback().await;
        self.refresh_monitors_feedback().await;
        self.refresh_route_feedback().await;
    }
}
