//! The bridging host's side of the boundary: what an accessory looks like,
//! which attributes it carries, and how the host talks back.

use crate::Result;

/// Thermostat system modes as the host enumerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMode {
    Off,
    Auto,
    Cool,
    Heat,
    EmergencyHeat,
    Precooling,
    FanOnly,
    Dry,
    Sleep,
}

impl SystemMode {
    pub const ALL: [SystemMode; 9] = [
        SystemMode::Off,
        SystemMode::Auto,
        SystemMode::Cool,
        SystemMode::Heat,
        SystemMode::EmergencyHeat,
        SystemMode::Precooling,
        SystemMode::FanOnly,
        SystemMode::Dry,
        SystemMode::Sleep,
    ];

    pub fn as_u8(&self) -> u8 {
        match self {
            SystemMode::Off => 0,
            SystemMode::Auto => 1,
            SystemMode::Cool => 3,
            SystemMode::Heat => 4,
            SystemMode::EmergencyHeat => 5,
            SystemMode::Precooling => 6,
            SystemMode::FanOnly => 7,
            SystemMode::Dry => 8,
            SystemMode::Sleep => 9,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_u8() == v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    AirConditioner,
    BridgedNode,
    PowerSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Identify,
    Groups,
    OnOff,
    Thermostat,
    ThermostatUserInterfaceConfiguration,
    TemperatureMeasurement,
    BridgedDeviceBasicInformation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Identify,
    On,
    Off,
}

/// Attributes the host lets the accessory observe writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    OccupiedCoolingSetpoint,
    OccupiedHeatingSetpoint,
    SystemMode,
}

/// Attribute values. Temperatures are in hundredths of a degree Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    OnOff(bool),
    OccupiedCoolingSetpoint(i16),
    OccupiedHeatingSetpoint(i16),
    LocalTemperature(Option<i16>),
    MeasuredValue(Option<i16>),
    SystemMode(SystemMode),
}

impl Attribute {
    pub fn kind(&self) -> Option<AttributeKind> {
        match self {
            Attribute::OccupiedCoolingSetpoint(_) => Some(AttributeKind::OccupiedCoolingSetpoint),
            Attribute::OccupiedHeatingSetpoint(_) => Some(AttributeKind::OccupiedHeatingSetpoint),
            Attribute::SystemMode(_) => Some(AttributeKind::SystemMode),
            _ => None,
        }
    }
}

/// Inbound traffic from the host for one accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Identify { identify_time: u16 },
    On,
    Off,
    AttributeWritten(Attribute),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicInformation {
    pub node_label: String,
    pub serial_number: String,
    pub vendor_id: u16,
    pub vendor_name: String,
    pub product_name: String,
    pub software_version: u32,
    pub software_version_string: String,
    pub hardware_version: u32,
    pub hardware_version_string: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatDefaults {
    pub local_temperature: Option<i16>,
    pub occupied_heating_setpoint: i16,
    pub occupied_cooling_setpoint: i16,
    pub system_mode: SystemMode,
}

/// Everything the host needs to materialise one bridged accessory.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessory {
    pub storage_key: String,
    pub device_types: Vec<DeviceType>,
    pub clusters: Vec<Cluster>,
    pub basic_information: BasicInformation,
    pub on_off: bool,
    pub thermostat: ThermostatDefaults,
    pub measured_temperature: Option<i16>,
    pub commands: Vec<CommandKind>,
    pub subscriptions: Vec<AttributeKind>,
}

impl Accessory {
    pub fn device_name(&self) -> &str {
        &self.basic_information.node_label
    }

    pub fn serial_number(&self) -> &str {
        &self.basic_information.serial_number
    }
}

/// The smart-home host this crate bridges into.
pub trait BridgeHost: Send + Sync + 'static {
    fn host_version(&self) -> &str;

    fn select_device(&self, _serial: &str, _name: &str) {}

    fn validate_device(&self, _name: &str) -> bool {
        true
    }

    fn register_device(&self, accessory: &Accessory) -> Result<()>;

    fn set_attribute(&self, storage_key: &str, attribute: Attribute) -> Result<()>;
}

/// Values outside the `i16` range clamp to its bounds.
pub fn centidegrees(celsius: f64) -> i16 {
    let value = (celsius * 100.0)
        .round()
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX));
    value as i16
}

pub fn from_centidegrees(value: i16) -> f64 {
    f64::from(value) / 100.0
}
