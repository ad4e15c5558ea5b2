use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::{
    ConnectorId, DeviceControl, InputConnector, MatrixAssignment, MatrixMode, MonitorRole,
    MonitorsMode, OutputConnector, SourceId,
};
use crate::error::DeviceError;

/// Command accepted by the simulated endpoint, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    SetRole { output: ConnectorId, role: MonitorRole },
    SetMonitors(MonitorsMode),
    Assign(MatrixAssignment),
    Reset(ConnectorId),
}

#[derive(Debug)]
struct SimState {
    roles: BTreeMap<ConnectorId, MonitorRole>,
    inputs: Vec<InputConnector>,
    monitors: MonitorsMode,
    matrix: BTreeMap<ConnectorId, Vec<SourceId>>,
    commands: Vec<DeviceCommand>,
    active_calls: u32,
    /// Uptime at `uptime_since`; reported uptime keeps counting from there
    uptime: Duration,
    uptime_since: Instant,
    failing_sources: HashSet<SourceId>,
    failing_role_outputs: HashSet<ConnectorId>,
    fail_call_count: bool,
}

/// In-process endpoint with a recorded command log and failure injection
#[derive(Debug)]
pub struct SimulatedDevice {
    state: Mutex<SimState>,
}

impl SimulatedDevice {
    /// Outputs are numbered 1..=outputs, inputs 1..=inputs
    pub fn new(outputs: u32, inputs: u32) -> Self {
        let roles = (1..=outputs).map(|id| (id, MonitorRole::Auto)).collect();
        let inputs = (1..=inputs)
            .map(|id| InputConnector {
                id,
                name: format!("Input {id}"),
            })
            .collect();
        Self {
            state: Mutex::new(SimState {
                roles,
                inputs,
                monitors: MonitorsMode::Auto,
                matrix: BTreeMap::new(),
                commands: Vec::new(),
                active_calls: 0,
                uptime: Duration::from_secs(24 * 60 * 60),
                uptime_since: Instant::now(),
                failing_sources: HashSet::new(),
                failing_role_outputs: HashSet::new(),
                fail_call_count: false,
            }),
        }
    }

    pub fn with_uptime(self, uptime: Duration) -> Self {
        self.set_uptime(uptime);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // A poisoned lock only means a test panicked mid-command; the state is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_uptime(&self, uptime: Duration) {
        let mut state = self.lock();
        state.uptime = uptime;
        state.uptime_since = Instant::now();
    }

    pub fn set_active_calls(&self, calls: u32) {
        self.lock().active_calls = calls;
    }

    pub fn set_role(&self, output: ConnectorId, role: MonitorRole) {
        self.lock().roles.insert(output, role);
    }

    /// Matrix assignments of this source fail from now on
    pub fn fail_source(&self, source: SourceId) {
        self.lock().failing_sources.insert(source);
    }

    /// Role changes on this output fail from now on
    pub fn fail_role(&self, output: ConnectorId) {
        self.lock().failing_role_outputs.insert(output);
    }

    pub fn fail_call_count(&self, fail: bool) {
        self.lock().fail_call_count = fail;
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.lock().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.lock().commands.clear();
    }

    /// Sources currently shown on an output
    pub fn matrix(&self, output: ConnectorId) -> Vec<SourceId> {
        self.lock().matrix.get(&output).cloned().unwrap_or_default()
    }

    pub fn role(&self, output: ConnectorId) -> Option<MonitorRole> {
        self.lock().roles.get(&output).cloned()
    }
}

#[async_trait]
impl DeviceControl for SimulatedDevice {
    async fn output_connectors(&self) -> Result<Vec<OutputConnector>, DeviceError> {
        Ok(self
            .lock()
            .roles
            .iter()
            .map(|(id, role)| OutputConnector {
                id: *id,
                monitor_role: role.clone(),
            })
            .collect())
    }

    async fn input_connectors(&self) -> Result<Vec<InputConnector>, DeviceError> {
        Ok(self.lock().inputs.clone())
    }

    async fn monitor_role(&self, output: ConnectorId) -> Result<MonitorRole, DeviceError> {
        self.lock()
            .roles
            .get(&output)
            .cloned()
            .ok_or(DeviceError::UnknownConnector { connector: output })
    }

    async fn set_monitor_role(
        &self,
        output: ConnectorId,
        role: &MonitorRole,
    ) -> Result<(), DeviceError> {
        let mut state = self.lock();
        if state.failing_role_outputs.contains(&output) {
            return Err(DeviceError::command(
                "set monitor role",
                format!("output {output} rejected role {role}"),
            ));
        }
        if !state.roles.contains_key(&output) {
            return Err(DeviceError::UnknownConnector { connector: output });
        }
        debug!(output, role = %role, "simulated role change");
        state.roles.insert(output, role.clone());
        state.commands.push(DeviceCommand::SetRole {
            output,
            role: role.clone(),
        });
        Ok(())
    }

    async fn monitors_mode(&self) -> Result<MonitorsMode, DeviceError> {
        Ok(self.lock().monitors.clone())
    }

    async fn set_monitors_mode(&self, mode: &MonitorsMode) -> Result<(), DeviceError> {
        let mut state = self.lock();
        state.monitors = mode.clone();
        state.commands.push(DeviceCommand::SetMonitors(mode.clone()));
        Ok(())
    }

    async fn monitor_role_values(&self) -> Result<Vec<MonitorRole>, DeviceError> {
        Ok(MonitorRole::template())
    }

    async fn monitors_mode_values(&self) -> Result<Vec<MonitorsMode>, DeviceError> {
        Ok(MonitorsMode::template())
    }

    async fn assign_matrix(&self, assignment: &MatrixAssignment) -> Result<(), DeviceError> {
        let mut state = self.lock();
        if state.failing_sources.contains(&assignment.source) {
            return Err(DeviceError::command(
                "matrix assign",
                format!("source {} unavailable", assignment.source),
            ));
        }
        if !state.roles.contains_key(&assignment.output) {
            return Err(DeviceError::UnknownConnector {
                connector: assignment.output,
            });
        }
        let shown = state.matrix.entry(assignment.output).or_default();
        match assignment.mode {
            MatrixMode::Replace => *shown = vec![assignment.source],
            MatrixMode::Add => shown.push(assignment.source),
        }
        state.commands.push(DeviceCommand::Assign(assignment.clone()));
        Ok(())
    }

    async fn reset_matrix(&self, output: ConnectorId) -> Result<(), DeviceError> {
        let mut state = self.lock();
        if !state.roles.contains_key(&output) {
            return Err(DeviceError::UnknownConnector { connector: output });
        }
        state.matrix.remove(&output);
        state.commands.push(DeviceCommand::Reset(output));
        Ok(())
    }

    async fn active_call_count(&self) -> Result<u32, DeviceError> {
        let state = self.lock();
        if state.fail_call_count {
            return Err(DeviceError::command("read active calls", "status unavailable"));
        }
        Ok(state.active_calls)
    }

    async fn uptime(&self) -> Result<Duration, DeviceError> {
        let state = self.lock();
        Ok(state.uptime + state.uptime_since.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MatrixLayout;

    fn assignment(output: ConnectorId, source: SourceId, mode: MatrixMode) -> MatrixAssignment {
        MatrixAssignment {
            output,
            source,
            mode,
            layout: MatrixLayout::Equal,
        }
    }

    #[tokio::test]
    async fn test_replace_then_add_builds_matrix() {
        let device = SimulatedDevice::new(2, 4);
        device.assign_matrix(&assignment(1, 3, MatrixMode::Replace)).await.unwrap();
        device.assign_matrix(&assignment(1, 4, MatrixMode::Add)).await.unwrap();
        assert_eq!(device.matrix(1), vec![3, 4]);

        device.assign_matrix(&assignment(1, 2, MatrixMode::Replace)).await.unwrap();
        assert_eq!(device.matrix(1), vec![2]);
    }

    #[tokio::test]
    async fn test_failing_source_is_not_recorded() {
        let device = SimulatedDevice::new(1, 2);
        device.fail_source(2);
        let result = device.assign_matrix(&assignment(1, 2, MatrixMode::Replace)).await;
        assert!(result.is_err());
        assert!(device.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uptime_keeps_counting() {
        let device = SimulatedDevice::new(1, 1).with_uptime(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(90)).await;
        let uptime = device.uptime().await.unwrap();
        assert!(uptime >= Duration::from_secs(120) && uptime < Duration::from_secs(121));
    }

    #[tokio::test]
    async fn test_unknown_output_rejected() {
        let device = SimulatedDevice::new(1, 1);
        let result = device.reset_matrix(9).await;
        assert_eq!(result, Err(DeviceError::UnknownConnector { connector: 9 }));
    }
}
