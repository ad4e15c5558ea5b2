//! Matrix route model
//!
//! The working buffer holds one [`OutputRoute`] per physical output and is
//! edited live from the maker panel. Every edit is replayed against the
//! device in list order: the first source replaces, later sources add.

use tracing::{debug, error, warn};

use crate::config::OutputRoute;
use crate::device::{ConnectorId, DeviceControl, MatrixAssignment, MatrixMode, SourceId};

/// Applied and failed device steps of one or more route replays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub applied: usize,
    pub failed: usize,
}

impl ReplayOutcome {
    pub fn merge(&mut self, other: ReplayOutcome) {
        self.applied += other.applied;
        self.failed += other.failed;
    }
}

/// Replay a route's input order. A failed step is logged and the rest still run.
pub async fn replay_route(device: &dyn DeviceControl, route: &OutputRoute) -> ReplayOutcome {
    let mut outcome = ReplayOutcome::default();
    for (position, source) in route.input_order.iter().enumerate() {
        let assignment = MatrixAssignment {
            output: route.connector,
            source: *source,
            mode: MatrixMode::for_position(position),
            layout: route.layout.clone(),
        };
        match device.assign_matrix(&assignment).await {
            Ok(()) => outcome.applied += 1,
            Err(err) => {
                error!(
                    output = route.connector,
                    source = *source,
                    action = %assignment.mode,
                    layout = %assignment.layout,
                    error = %err,
                    "Matrix assignment failed"
                );
                outcome.failed += 1;
            }
        }
    }
    outcome
}

/// Push a route to its output, resetting the output when the route is empty
pub async fn apply_route(device: &dyn DeviceControl, route: &OutputRoute) -> ReplayOutcome {
    if !route.input_order.is_empty() {
        return replay_route(device, route).await;
    }
    match device.reset_matrix(route.connector).await {
        Ok(()) => ReplayOutcome { applied: 1, failed: 0 },
        Err(err) => {
            error!(output = route.connector, error = %err, "Matrix reset failed");
            ReplayOutcome { applied: 0, failed: 1 }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingRoutes {
    routes: Vec<OutputRoute>,
}

impl WorkingRoutes {
    /// One empty `Equal` route per output connector 1..=outputs
    pub fn seeded(outputs: u32) -> Self {
        Self {
            routes: (1..=outputs).map(OutputRoute::empty).collect(),
        }
    }

    pub fn from_connectors(connectors: impl IntoIterator<Item = ConnectorId>) -> Self {
        Self {
            routes: connectors.into_iter().map(OutputRoute::empty).collect(),
        }
    }

    pub fn routes(&self) -> &[OutputRoute] {
        &self.routes
    }

    pub fn route(&self, output: ConnectorId) -> Option<&OutputRoute> {
        self.routes.iter().find(|route| route.connector == output)
    }

    fn route_mut(&mut self, output: ConnectorId) -> Option<&mut OutputRoute> {
        self.routes.iter_mut().find(|route| route.connector == output)
    }

    /// Deep copy for storing into a preset
    pub fn snapshot(&self) -> Vec<OutputRoute> {
        self.routes.clone()
    }

    pub fn replace_with(&mut self, routes: Vec<OutputRoute>) {
        self.routes = routes;
    }

    /// Append a source to an output and replay that output's whole route
    pub async fn add_source(
        &mut self,
        device: &dyn DeviceControl,
        output: ConnectorId,
        source: SourceId,
    ) -> Option<ReplayOutcome> {
        let Some(route) = self.route_mut(output) else {
            warn!(output, source, "Cannot add source, output has no working route");
            return None;
        };
        route.input_order.push(source);
        debug!(output, order = ?route.input_order, "Replaying route");
        let route = route.clone();
        Some(replay_route(device, &route).await)
    }

    /// Empty an output's route and reset it on the device
    pub async fn clear_route(&mut self, device: &dyn DeviceControl, output: ConnectorId) -> bool {
        let Some(route) = self.route_mut(output) else {
            warn!(output, "Cannot clear route, output has no working route");
            return false;
        };
        route.input_order.clear();
        if let Err(err) = device.reset_matrix(output).await {
            error!(output, error = %err, "Matrix reset failed");
        }
        true
    }

    pub fn route_order_text(&self, output: ConnectorId) -> String {
        let order = self
            .route(output)
            .map(|route| {
                route
                    .input_order
                    .iter()
                    .map(SourceId::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        format!("Route Order: [{order}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, MatrixLayout, SimulatedDevice};

    fn assign(output: ConnectorId, source: SourceId, mode: MatrixMode) -> DeviceCommand {
        DeviceCommand::Assign(MatrixAssignment {
            output,
            source,
            mode,
            layout: MatrixLayout::Equal,
        })
    }

    #[tokio::test]
    async fn test_add_source_replays_whole_route() {
        let device = SimulatedDevice::new(2, 8);
        let mut routes = WorkingRoutes::seeded(2);

        routes.add_source(&device, 1, 5).await.unwrap();
        routes.add_source(&device, 1, 7).await.unwrap();

        assert_eq!(
            device.commands(),
            vec![
                assign(1, 5, MatrixMode::Replace),
                assign(1, 5, MatrixMode::Replace),
                assign(1, 7, MatrixMode::Add),
            ]
        );
        assert_eq!(device.matrix(1), vec![5, 7]);
        assert_eq!(routes.route_order_text(1), "Route Order: [5, 7]");
        assert_eq!(routes.route_order_text(2), "Route Order: []");
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort_replay() {
        let device = SimulatedDevice::new(1, 8);
        device.fail_source(5);
        let route = OutputRoute {
            connector: 1,
            layout: MatrixLayout::Equal,
            input_order: vec![5, 7, 8],
        };

        let outcome = replay_route(&device, &route).await;
        assert_eq!(outcome, ReplayOutcome { applied: 2, failed: 1 });
        assert_eq!(
            device.commands(),
            vec![assign(1, 7, MatrixMode::Add), assign(1, 8, MatrixMode::Add)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_sources_keep_insertion_order() {
        let device = SimulatedDevice::new(1, 8);
        let route = OutputRoute {
            connector: 1,
            layout: MatrixLayout::Equal,
            input_order: vec![3, 3, 2],
        };
        replay_route(&device, &route).await;
        assert_eq!(
            device.commands(),
            vec![
                assign(1, 3, MatrixMode::Replace),
                assign(1, 3, MatrixMode::Add),
                assign(1, 2, MatrixMode::Add),
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_route_resets_output() {
        let device = SimulatedDevice::new(1, 8);
        let mut routes = WorkingRoutes::seeded(1);
        routes.add_source(&device, 1, 4).await;
        device.clear_commands();

        assert!(routes.clear_route(&device, 1).await);
        assert_eq!(device.commands(), vec![DeviceCommand::Reset(1)]);
        assert!(routes.route(1).unwrap().input_order.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_output_is_noop() {
        let device = SimulatedDevice::new(1, 8);
        let mut routes = WorkingRoutes::seeded(1);
        assert_eq!(routes.add_source(&device, 9, 1).await, None);
        assert!(!routes.clear_route(&device, 9).await);
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn test_apply_empty_route_resets() {
        let device = SimulatedDevice::new(2, 8);
        let outcome = apply_route(&device, &OutputRoute::empty(2)).await;
        assert_eq!(outcome.applied, 1);
        assert_eq!(device.commands(), vec![DeviceCommand::Reset(2)]);
    }
}
