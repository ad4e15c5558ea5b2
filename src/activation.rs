//! Preset activation
//!
//! Pushes a saved preset onto live hardware in fixed steps: monitor roles,
//! working buffer, matrix routes, then Current. Every device step is
//! best-effort and nothing is rolled back.

use tracing::{error, info, warn};

use crate::config::{Configuration, PresetEntry};
use crate::device::DeviceControl;
use crate::error::Result;
use crate::matrix::{ReplayOutcome, WorkingRoutes, apply_route};
use crate::registry::PresetRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub index: usize,
    pub roles_applied: usize,
    pub roles_failed: usize,
    pub routes: ReplayOutcome,
}

/// One activation in flight, holding its own copy of the target preset
#[derive(Debug, Clone)]
pub struct Activation {
    index: usize,
    snapshot: PresetEntry,
    report: ActivationReport,
}

impl Activation {
    /// `None` with a warning when the index does not resolve
    pub fn prepare(config: &Configuration, index: usize) -> Option<Self> {
        let Some(entry) = config.preset(index) else {
            warn!(index, len = config.preset.list.len(), "Cannot activate, preset index does not resolve");
            return None;
        };
        info!(index, name = %entry.name, "Activating preset");
        Some(Self {
            index,
            snapshot: entry.clone(),
            report: ActivationReport {
                index,
                ..ActivationReport::default()
            },
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn preset(&self) -> &PresetEntry {
        &self.snapshot
    }

    pub async fn apply_roles(&mut self, device: &dyn DeviceControl) {
        for assignment in &self.snapshot.monitor_roles {
            match device.set_monitor_role(assignment.connector, &assignment.role).await {
                Ok(()) => self.report.roles_applied += 1,
                Err(err) => {
                    error!(
                        output = assignment.connector,
                        role = %assignment.role,
                        error = %err,
                        "Failed to set monitor role"
                    );
                    self.report.roles_failed += 1;
                }
            }
        }
    }

    pub fn load_working_routes(&self, routes: &mut WorkingRoutes) {
        routes.replace_with(self.snapshot.routes.clone());
    }

    pub async fn push_routes(&mut self, device: &dyn DeviceControl) {
        for route in &self.snapshot.routes {
            self.report.routes.merge(apply_route(device, route).await);
        }
    }

    /// Record the preset as Current and rebuild the list
    pub async fn commit(self, registry: &mut PresetRegistry) -> Result<ActivationReport> {
        registry.mark_current(self.index).await?;
        let report = self.report;
        info!(
            index = report.index,
            roles_applied = report.roles_applied,
            roles_failed = report.roles_failed,
            route_steps = report.routes.applied,
            route_failures = report.routes.failed,
            "Preset activated"
        );
        Ok(report)
    }
}
