mod bridge;
mod client;
mod config;
mod device;
mod diff;
mod error;
mod host;
mod logger;
mod modes;
mod platform;
mod protocol;
mod types;

pub use bridge::{serial_number, BridgedAc, DEFAULT_TARGET_TEMPERATURE, VENDOR_ID};
pub use client::{DaikinApi, DaikinClient, DaikinClientBuilder};
pub use config::{DeviceEntry, PlatformConfig};
pub use device::{
    DaikinAcDevice, TemperatureInfo, UpdateCallbacks, UpdateHandle, POLL_INTERVAL,
};
pub use diff::{diff_states, StateChange};
pub use error::{Error, Result};
pub use host::*;
pub use logger::MessageLogMode;
pub use modes::{daikin_mode_from_system, system_mode_from_daikin, ModeCommand};
pub use platform::DaikinPlatform;
pub use types::*;
