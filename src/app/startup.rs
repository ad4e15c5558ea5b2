use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::PresetController;
use crate::constants::UPTIME_POLL_INTERVAL;
use crate::device::{MonitorRole, MonitorsMode};
use crate::error::Result;
use crate::maker::order_by_template;
use crate::matrix::WorkingRoutes;

impl PresetController {
    /// Block until the endpoint has been up for the configured delay
    async fn wait_for_uptime(&self) -> Duration {
        let target = self.settings.uptime_delay();
        let mut announced = false;
        loop {
            match self.device.uptime().await {
                Ok(uptime) if uptime >= target => {
                    info!(uptime_secs = uptime.as_secs(), "Minimum uptime reached");
                    return uptime;
                }
                Ok(uptime) => {
                    if !announced {
                        info!(
                            uptime_secs = uptime.as_secs(),
                            target_secs = target.as_secs(),
                            "Waiting for minimum uptime"
                        );
                        announced = true;
                    }
                }
                Err(err) => error!(error = %err, "Failed to read uptime"),
            }
            tokio::time::sleep(UPTIME_POLL_INTERVAL).await;
        }
    }

    async fn seed_routes(&mut self) {
        let routes = match self.device.output_connectors().await {
            Ok(outputs) => WorkingRoutes::from_connectors(outputs.into_iter().map(|output| output.id)),
            Err(err) => {
                warn!(
                    error = %err,
                    outputs = self.settings.factory_outputs,
                    "Failed to enumerate outputs, seeding from settings"
                );
                WorkingRoutes::seeded(self.settings.factory_outputs)
            }
        };
        debug!(outputs = routes.routes().len(), "Working routes seeded");
        self.routes = routes;
    }

    async fn load_value_spaces(&mut self) {
        match self.device.monitor_role_values().await {
            Ok(values) => self.maker.roles = order_by_template(values, MonitorRole::template()),
            Err(err) => warn!(error = %err, "Failed to read monitor role values, using template"),
        }
        match self.device.monitors_mode_values().await {
            Ok(values) => self.maker.monitors = order_by_template(values, MonitorsMode::template()),
            Err(err) => warn!(error = %err, "Failed to read monitors values, using template"),
        }
    }

    /// Bring the controller up against a freshly started endpoint.
    ///
    /// On a fresh boot the Default (or else Current) preset is reapplied; after
    /// a controller restart only the working routes are restored.
    pub async fn startup(&mut self) -> Result<()> {
        info!(version = env!("CARGO_PKG_VERSION"), "Starting monitor presets");

        let uptime = self.wait_for_uptime().await;
        self.seed_routes().await;
        self.load_value_spaces().await;
        self.registry.load().await?;

        if uptime <= self.settings.boot_threshold() {
            debug!("Boot detected");
            let target = self
                .registry
                .default_index()
                .or(self.registry.current_index());
            if let Some(index) = target {
                info!(index, "Applying preset after boot");
                self.activate(index).await?;
            }
        } else if let Some(entry) = self
            .registry
            .current_index()
            .and_then(|index| self.registry.preset(index))
        {
            debug!(name = %entry.name, "Restart detected, restoring working routes");
            self.routes.replace_with(entry.routes.clone());
        }

        self.registry.publish_preset_list().await;
        self.publish_maker().await;
        self.subscriptions.start_all();
        self.refresh_maker_feedback().await;
        self.refresh_pin_feedback().await;
        Ok(())
    }
}
