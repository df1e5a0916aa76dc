use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::logger::MessageLogMode;
use crate::{Error, Result};

const USE_GET_TO_POST: &str = "useGetToPost";

/// Plugin configuration as delivered by the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    #[serde(rename = "daikinIPs", default)]
    pub daikin_ips: Vec<String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub message_log: Option<PathBuf>,
    #[serde(default)]
    pub message_log_mode: MessageLogMode,
}

impl PlatformConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn entries(&self) -> Result<Vec<DeviceEntry>> {
        self.daikin_ips.iter().map(|s| s.parse()).collect()
    }
}

/// One configured unit: `"<address>[,useGetToPost]"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub address: String,
    pub use_get_to_post: bool,
}

impl FromStr for DeviceEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',');
        let address = parts.next().unwrap_or_default().trim();
        if address.is_empty() {
            return Err(Error::InvalidConfig(format!("missing address in {s:?}")));
        }
        let use_get_to_post = parts.next().is_some_and(|flag| flag.trim() == USE_GET_TO_POST);

        Ok(DeviceEntry {
            address: address.to_string(),
            use_get_to_post,
        })
    }
}
