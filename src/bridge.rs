use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::DaikinApi;
use crate::device::{DaikinAcDevice, UpdateCallbacks, UpdateHandle};
use crate::host::*;
use crate::modes::{daikin_mode_from_system, system_mode_from_daikin, ModeCommand};
use crate::types::{ControlInfo, ControlUpdate, DeviceState};
use crate::{Error, Result};

/// Used when the unit reports no numeric setpoint.
pub const DEFAULT_TARGET_TEMPERATURE: f64 = 24.0;

pub const VENDOR_ID: u16 = 0xFFF1;
const VENDOR_NAME: &str = "daikin-ac-bridge";
const PRODUCT_NAME: &str = "Daikin AC";

/// Stable per-unit serial: the first 16 hex digits of a name-based UUID.
pub fn serial_number(storage_key: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, storage_key.as_bytes());
    id.simple().to_string()[..16].to_string()
}

/// Digits of a version string as a number, `"1.2.3"` becomes `123`.
fn version_number(version: &str) -> u32 {
    let digits: String = version.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn push<H: BridgeHost>(host: &H, storage_key: &str, attribute: Attribute) {
    if let Err(e) = host.set_attribute(storage_key, attribute) {
        warn!(storage_key, ?attribute, error = %e, "failed to set attribute");
    }
}

fn push_snapshot<H: BridgeHost>(host: &H, storage_key: &str, state: &DeviceState) {
    if let Some(power) = state.power {
        push(host, storage_key, Attribute::OnOff(power));
    }
    if let Some(target) = state.target_temperature {
        let target = centidegrees(target.celsius().unwrap_or(DEFAULT_TARGET_TEMPERATURE));
        push(host, storage_key, Attribute::OccupiedCoolingSetpoint(target));
        push(host, storage_key, Attribute::OccupiedHeatingSetpoint(target));
    }
    let indoor = state.indoor_temperature.map(centidegrees);
    push(host, storage_key, Attribute::MeasuredValue(indoor));
    push(host, storage_key, Attribute::LocalTemperature(indoor));
    let mode = system_mode_from_daikin(state.power.unwrap_or(false), state.mode);
    push(host, storage_key, Attribute::SystemMode(mode));
}

/// A Daikin unit exposed to the host as a thermostat accessory.
pub struct BridgedAc<A, H> {
    device: DaikinAcDevice<A>,
    host: Arc<H>,
    accessory: Option<Accessory>,
    updates: Option<UpdateHandle>,
}

impl<A: DaikinApi, H: BridgeHost> BridgedAc<A, H> {
    pub fn new(device: DaikinAcDevice<A>, host: Arc<H>) -> Self {
        Self {
            device,
            host,
            accessory: None,
            updates: None,
        }
    }

    pub fn device(&self) -> &DaikinAcDevice<A> {
        &self.device
    }

    pub fn accessory(&self) -> Option<&Accessory> {
        self.accessory.as_ref()
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.accessory.as_ref().map(|a| a.storage_key.as_str())
    }

    pub fn is_updating(&self) -> bool {
        self.updates.as_ref().is_some_and(UpdateHandle::is_running)
    }

    fn require_accessory(&self) -> Result<&Accessory> {
        self.accessory.as_ref().ok_or(Error::EndpointNotCreated)
    }

    pub async fn connect(&self) -> Result<()> {
        self.device.connect().await
    }

    /// Describe the accessory from freshly fetched state.
    pub async fn create_endpoint(&mut self) -> Result<&Accessory> {
        let info = self.device.basic_info().await?;
        let control = self.device.control_info().await?;
        let sensor = self.device.sensor_info().await?;

        let storage_key = format!("daikin-ac-{}", info.name);
        let serial = serial_number(&storage_key);
        let target = centidegrees(
            control
                .target_temperature
                .celsius()
                .unwrap_or(DEFAULT_TARGET_TEMPERATURE),
        );
        let local = sensor.indoor_temperature.map(centidegrees);
        let host_version = self.host.host_version();
        let software_version = env!("CARGO_PKG_VERSION");

        let accessory = Accessory {
            storage_key,
            device_types: vec![
                DeviceType::AirConditioner,
                DeviceType::BridgedNode,
                DeviceType::PowerSource,
            ],
            clusters: vec![
                Cluster::Identify,
                Cluster::Groups,
                Cluster::OnOff,
                Cluster::Thermostat,
                Cluster::ThermostatUserInterfaceConfiguration,
                Cluster::TemperatureMeasurement,
                Cluster::BridgedDeviceBasicInformation,
            ],
            basic_information: BasicInformation {
                node_label: format!("AC {}", info.name),
                serial_number: serial,
                vendor_id: VENDOR_ID,
                vendor_name: VENDOR_NAME.to_string(),
                product_name: PRODUCT_NAME.to_string(),
                software_version: version_number(software_version),
                software_version_string: software_version.to_string(),
                hardware_version: version_number(host_version),
                hardware_version_string: if host_version.is_empty() {
                    "Unknown".to_string()
                } else {
                    host_version.to_string()
                },
            },
            on_off: info.power,
            thermostat: ThermostatDefaults {
                local_temperature: local,
                occupied_heating_setpoint: target,
                occupied_cooling_setpoint: target,
                system_mode: system_mode_from_daikin(control.power, Some(control.mode)),
            },
            measured_temperature: local,
            commands: vec![CommandKind::Identify, CommandKind::On, CommandKind::Off],
            subscriptions: vec![
                AttributeKind::OccupiedCoolingSetpoint,
                AttributeKind::OccupiedHeatingSetpoint,
                AttributeKind::SystemMode,
            ],
        };

        info!(
            address = %self.device.address(),
            name = %accessory.device_name(),
            serial = %accessory.serial_number(),
            "created endpoint"
        );
        Ok(&*self.accessory.insert(accessory))
    }

    /// Returns whether the host accepted the accessory.
    pub fn register_with_platform(&self) -> Result<bool> {
        let accessory = self.require_accessory()?;
        let name = accessory.device_name();
        self.host.select_device(accessory.serial_number(), name);

        if !self.host.validate_device(name) {
            info!(name, "device not selected, skipping registration");
            return Ok(false);
        }
        self.host.register_device(accessory)?;
        Ok(true)
    }

    /// Push the cached snapshot back into the host's attribute store.
    pub fn restore_state(&self) -> Result<()> {
        let accessory = self.require_accessory()?;
        let state = self.device.state();
        debug!(storage_key = %accessory.storage_key, ?state, "restoring state");
        push_snapshot(&*self.host, &accessory.storage_key, &state);
        Ok(())
    }

    /// Forward polled changes to the host. No-op while already running.
    pub fn start_updates(&mut self) -> Result<()> {
        if self.is_updating() {
            return Ok(());
        }
        let storage_key = self.require_accessory()?.storage_key.clone();
        let callbacks = self.callbacks(storage_key);
        self.updates = Some(self.device.start_updates(callbacks));
        Ok(())
    }

    pub fn stop_updates(&mut self) {
        if let Some(handle) = self.updates.take() {
            handle.stop();
        }
    }

    fn callbacks(&self, storage_key: String) -> UpdateCallbacks {
        let (host_power, key_power, device_power) =
            (Arc::clone(&self.host), storage_key.clone(), self.device.clone());
        let (host_mode, key_mode, device_mode) =
            (Arc::clone(&self.host), storage_key.clone(), self.device.clone());
        let (host_indoor, key_indoor) = (Arc::clone(&self.host), storage_key.clone());
        let (host_target, key_target) = (Arc::clone(&self.host), storage_key);

        UpdateCallbacks::new()
            .on_power(move |power| {
                let Some(power) = power else { return };
                push(&*host_power, &key_power, Attribute::OnOff(power));
                let mode = system_mode_from_daikin(power, device_power.state().mode);
                push(&*host_power, &key_power, Attribute::SystemMode(mode));
            })
            .on_mode(move |mode| {
                let power = device_mode.state().power.unwrap_or(false);
                let mode = system_mode_from_daikin(power, mode);
                push(&*host_mode, &key_mode, Attribute::SystemMode(mode));
            })
            .on_indoor_temperature(move |indoor| {
                let indoor = indoor.map(centidegrees);
                push(&*host_indoor, &key_indoor, Attribute::LocalTemperature(indoor));
                push(&*host_indoor, &key_indoor, Attribute::MeasuredValue(indoor));
            })
            .on_target_temperature(move |target| {
                let target = centidegrees(target);
                push(&*host_target, &key_target, Attribute::OccupiedCoolingSetpoint(target));
                push(&*host_target, &key_target, Attribute::OccupiedHeatingSetpoint(target));
            })
    }

    /// Apply a host command, then push the resulting power and mode back to the host.
    pub async fn handle(&self, command: HostCommand) -> Result<()> {
        let accessory = self.require_accessory()?;
        let confirmed = match command {
            HostCommand::Identify { identify_time } => {
                info!(name = %accessory.device_name(), identify_time, "identify called");
                return Ok(());
            }
            HostCommand::On => self.device.switch_on().await?,
            HostCommand::Off => self.device.switch_off().await?,
            HostCommand::AttributeWritten(attribute) => {
                let subscribed = attribute
                    .kind()
                    .is_some_and(|kind| accessory.subscriptions.contains(&kind));
                if !subscribed {
                    debug!(?attribute, "ignoring write to unsubscribed attribute");
                    return Ok(());
                }
                match self.apply_write(attribute).await? {
                    Some(confirmed) => confirmed,
                    None => return Ok(()),
                }
            }
        };

        let storage_key = accessory.storage_key.as_str();
        push(&*self.host, storage_key, Attribute::OnOff(confirmed.power));
        let mode = system_mode_from_daikin(confirmed.power, Some(confirmed.mode));
        push(&*self.host, storage_key, Attribute::SystemMode(mode));
        Ok(())
    }

    async fn apply_write(&self, attribute: Attribute) -> Result<Option<ControlInfo>> {
        let confirmed = match attribute {
            Attribute::OccupiedCoolingSetpoint(v) | Attribute::OccupiedHeatingSetpoint(v) => {
                self.device
                    .set_target_temperature(from_centidegrees(v))
                    .await?
            }
            Attribute::SystemMode(mode) => match daikin_mode_from_system(mode) {
                ModeCommand::PowerOff => self.device.set_power(false).await?,
                ModeCommand::Mode(ac) => {
                    self.device
                        .set_control_info(&ControlUpdate::mode(ac).with_power(true))
                        .await?
                }
            },
            _ => return Ok(None),
        };
        Ok(Some(confirmed))
    }
}
