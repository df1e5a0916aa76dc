use crate::types::{DeviceState, TargetTemperature};

/// A tracked field whose freshly polled value differs from the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Power(Option<bool>),
    Mode(Option<u8>),
    IndoorTemperature(Option<f64>),
    TargetTemperature(f64),
}

/// Compare two snapshots field by field.
/// A manual target temperature never produces a change.
pub fn diff_states(previous: &DeviceState, current: &DeviceState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if current.power != previous.power {
        changes.push(StateChange::Power(current.power));
    }
    if current.mode != previous.mode {
        changes.push(StateChange::Mode(current.mode));
    }
    if current.indoor_temperature != previous.indoor_temperature {
        changes.push(StateChange::IndoorTemperature(current.indoor_temperature));
    }
    if let Some(TargetTemperature::Celsius(target)) = current.target_temperature
        && current.target_temperature != previous.target_temperature
    {
        changes.push(StateChange::TargetTemperature(target));
    }

    changes
}
