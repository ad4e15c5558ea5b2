//! Preset maker editing state
//!
//! Which output and input the maker panel has selected, and the ordered value
//! spaces the role and monitors spinners step through.

use std::str::FromStr;

use crate::device::{ConnectorId, MonitorRole, MonitorsMode, SourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(Self::Increment),
            "decrement" => Ok(Self::Decrement),
            other => Err(format!("unknown direction `{other}`")),
        }
    }
}

/// Step through `values` from `current`, wrapping at both ends.
///
/// A current value outside the list steps to the first value on increment and
/// to the last on decrement.
pub fn cycle<T: PartialEq + Clone>(values: &[T], current: &T, direction: Direction) -> Option<T> {
    let len = values.len();
    if len == 0 {
        return None;
    }
    let position = values.iter().position(|value| value == current);
    let next = match (direction, position) {
        (Direction::Increment, Some(position)) => (position + 1) % len,
        (Direction::Increment, None) => 0,
        (Direction::Decrement, Some(0)) | (Direction::Decrement, None) => len - 1,
        (Direction::Decrement, Some(position)) => position - 1,
    };
    values.get(next).cloned()
}

/// Known values in template order, then anything else the device reported
pub fn order_by_template<T: PartialEq>(reported: Vec<T>, template: Vec<T>) -> Vec<T> {
    let mut ordered: Vec<T> = template
        .into_iter()
        .filter(|value| reported.contains(value))
        .collect();
    for value in reported {
        if !ordered.contains(&value) {
            ordered.push(value);
        }
    }
    ordered
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerState {
    pub selected_output: ConnectorId,
    pub selected_input: Option<SourceId>,
    pub roles: Vec<MonitorRole>,
    pub monitors: Vec<MonitorsMode>,
}

impl Default for MakerState {
    fn default() -> Self {
        Self {
            selected_output: 1,
            selected_input: None,
            roles: MonitorRole::template(),
            monitors: MonitorsMode::template(),
        }
    }
}

impl MakerState {
    pub fn select_output(&mut self, output: ConnectorId) {
        self.selected_output = output;
    }

    pub fn select_input(&mut self, input: SourceId) {
        self.selected_input = Some(input);
    }

    pub fn clear_input(&mut self) -> Option<SourceId> {
        self.selected_input.take()
    }

    pub fn next_role(&self, current: &MonitorRole, direction: Direction) -> Option<MonitorRole> {
        cycle(&self.roles, current, direction)
    }

    pub fn next_monitors(&self, current: &MonitorsMode, direction: Direction) -> Option<MonitorsMode> {
        cycle(&self.monitors, current, direction)
    }
}
