use std::collections::BTreeMap;
use std::fmt;

/// Target temperature as reported in `stemp`.
/// `M` (dry) and `--` (fan) mean no setpoint is active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TargetTemperature {
    Celsius(f64),
    #[default]
    Manual,
}

impl TargetTemperature {
    pub fn from_daikin_str(s: &str) -> Option<Self> {
        match s.trim() {
            "M" | "--" => Some(TargetTemperature::Manual),
            other => other.parse().ok().map(TargetTemperature::Celsius),
        }
    }

    pub fn celsius(&self) -> Option<f64> {
        match self {
            TargetTemperature::Celsius(c) => Some(*c),
            TargetTemperature::Manual => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, TargetTemperature::Manual)
    }
}

impl fmt::Display for TargetTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetTemperature::Celsius(c) => write!(f, "{c:.1}\u{00b0}C"),
            TargetTemperature::Manual => write!(f, "manual"),
        }
    }
}

/// Operating modes in the Daikin vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcMode {
    Auto,
    Dry,
    Cool,
    Heat,
    Fan,
}

impl AcMode {
    pub fn code(&self) -> u8 {
        match self {
            AcMode::Auto => 0,
            AcMode::Dry => 2,
            AcMode::Cool => 3,
            AcMode::Heat => 4,
            AcMode::Fan => 6,
        }
    }

    /// Units report auto as 0, 1 or 7 depending on firmware.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 | 1 | 7 => Some(AcMode::Auto),
            2 => Some(AcMode::Dry),
            3 => Some(AcMode::Cool),
            4 => Some(AcMode::Heat),
            6 => Some(AcMode::Fan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasicInfo {
    pub name: String,
    pub power: bool,
    pub mac: Option<String>,
    pub firmware: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlInfo {
    pub power: bool,
    pub mode: u8,
    pub target_temperature: TargetTemperature,
    pub target_humidity: String,
    pub fan_rate: String,
    pub fan_direction: String,
    /// Remembered setpoint per mode (`dt<n>`).
    pub mode_temperatures: BTreeMap<u8, String>,
    /// Remembered humidity per mode (`dh<n>`).
    pub mode_humidities: BTreeMap<u8, String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorInfo {
    pub indoor_temperature: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub outdoor_temperature: Option<f64>,
}

/// Partial control change; unset fields keep the unit's current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlUpdate {
    pub power: Option<bool>,
    pub mode: Option<u8>,
    pub target_temperature: Option<TargetTemperature>,
}

impl ControlUpdate {
    pub fn power(on: bool) -> Self {
        Self {
            power: Some(on),
            ..Default::default()
        }
    }

    pub fn mode(mode: AcMode) -> Self {
        Self {
            mode: Some(mode.code()),
            ..Default::default()
        }
    }

    pub fn target_temperature(celsius: f64) -> Self {
        Self {
            target_temperature: Some(TargetTemperature::Celsius(celsius)),
            ..Default::default()
        }
    }

    pub fn with_power(mut self, on: bool) -> Self {
        self.power = Some(on);
        self
    }
}

/// Last observed state of one unit. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceState {
    pub power: Option<bool>,
    pub mode: Option<u8>,
    pub target_temperature: Option<TargetTemperature>,
    pub indoor_temperature: Option<f64>,
}

impl DeviceState {
    pub fn from_info(control: &ControlInfo, sensor: &SensorInfo) -> Self {
        Self {
            power: Some(control.power),
            mode: Some(control.mode),
            target_temperature: Some(control.target_temperature),
            indoor_temperature: sensor.indoor_temperature,
        }
    }
}
