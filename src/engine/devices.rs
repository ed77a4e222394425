use serde::Serialize;
use tracing::info;

use crate::model::*;

use super::{BookingError, BookingRegistry, Resource};

/// Result of one command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceCommandOutcome {
    Switched(DeviceKind),
    /// Unknown code, or a code for a device this room does not have.
    Unknown(char),
}

type DeviceAction = fn(&mut Device);

fn switch_on(device: &mut Device) {
    device.on = true;
}

/// Command code → (target device, action).
fn dispatch(code: char) -> Option<(DeviceKind, DeviceAction)> {
    match code.to_ascii_uppercase() {
        'L' => Some((DeviceKind::Lights, switch_on)),
        'A' => Some((DeviceKind::AirConditioner, switch_on)),
        'P' => Some((DeviceKind::Projector, switch_on)),
        _ => None,
    }
}

impl Resource {
    fn require_room(&self) -> Result<(), BookingError> {
        match self.kind() {
            ResourceKind::Room { .. } => Ok(()),
            ResourceKind::Generic => Err(BookingError::NotARoom(self.name().to_string())),
        }
    }

    pub(super) fn execute_commands(&self, codes: &str) -> Result<Vec<DeviceCommandOutcome>, BookingError> {
        self.require_room()?;
        let mut events = Vec::new();
        let outcomes = self.with_state_mut(|state| {
            codes
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|code| {
                    let target = dispatch(code).and_then(|(kind, action)| {
                        let device = state.devices.iter_mut().find(|d| d.kind == kind)?;
                        action(device);
                        Some(device.kind)
                    });
                    match target {
                        Some(kind) => {
                            events.push(Event::DeviceSwitched { device: kind, on: true });
                            DeviceCommandOutcome::Switched(kind)
                        }
                        None => DeviceCommandOutcome::Unknown(code),
                    }
                })
                .collect::<Vec<_>>()
        });
        for event in &events {
            self.publish(event);
        }
        Ok(outcomes)
    }

    pub(super) fn set_power(&self, on: bool) -> Result<Vec<Device>, BookingError> {
        self.require_room()?;
        let devices = self.with_state_mut(|state| {
            for device in &mut state.devices {
                device.on = on;
            }
            state.devices.clone()
        });
        for device in &devices {
            self.publish(&Event::DeviceSwitched { device: device.kind, on });
        }
        Ok(devices)
    }
}

impl BookingRegistry {
    /// Run single-letter device commands (`L` lights, `A` AC, `P` projector)
    /// in order. Unknown codes are reported, not fatal.
    pub fn execute_device_commands(&self, name: &str, codes: &str) -> Result<Vec<DeviceCommandOutcome>, BookingError> {
        let outcomes = self.resolve(name)?.execute_commands(codes)?;
        info!(resource = name, codes, "device commands executed");
        Ok(outcomes)
    }

    /// Switch every device in the room on or off.
    pub fn set_devices_power(&self, name: &str, on: bool) -> Result<Vec<Device>, BookingError> {
        let devices = self.resolve(name)?.set_power(on)?;
        info!(resource = name, on, "room devices switched");
        Ok(devices)
    }
}
