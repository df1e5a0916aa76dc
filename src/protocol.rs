use std::collections::BTreeMap;

use crate::types::*;
use crate::{Error, Result};

pub const BASIC_INFO_PATH: &str = "/common/basic_info";
pub const CONTROL_INFO_PATH: &str = "/aircon/get_control_info";
pub const SET_CONTROL_INFO_PATH: &str = "/aircon/set_control_info";
pub const SENSOR_INFO_PATH: &str = "/aircon/get_sensor_info";

const RET_OK: &str = "OK";
const FAN_MODE_CODE: u8 = 6;

pub type Fields = BTreeMap<String, String>;

/// Split a `ret=OK,key=value,...` body into its fields.
pub fn parse_fields(path: &str, body: &str) -> Result<Fields> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::EmptyResponse {
            path: path.to_string(),
        });
    }

    let fields: Fields = body
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .collect();

    match fields.get("ret").map(String::as_str) {
        Some(RET_OK) => Ok(fields),
        Some(ret) => Err(Error::Rejected {
            path: path.to_string(),
            ret: ret.to_string(),
        }),
        None => Err(Error::MissingField("ret")),
    }
}

fn required<'a>(fields: &'a Fields, key: &'static str) -> Result<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or(Error::MissingField(key))
}

fn parse_power(fields: &Fields) -> Result<bool> {
    match required(fields, "pow")? {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(Error::InvalidValue {
            field: "pow",
            value: other.to_string(),
        }),
    }
}

/// `-` and `--` mark a sensor the unit does not have.
fn optional_number(fields: &Fields, key: &str) -> Option<f64> {
    fields.get(key).and_then(|v| v.trim().parse().ok())
}

fn optional_string(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).filter(|v| !v.is_empty()).cloned()
}

fn per_mode(fields: &Fields, prefix: &str) -> BTreeMap<u8, String> {
    fields
        .iter()
        .filter_map(|(k, v)| {
            let mode = k.strip_prefix(prefix)?.parse::<u8>().ok()?;
            Some((mode, v.clone()))
        })
        .collect()
}

pub fn parse_basic_info(fields: &Fields) -> Result<BasicInfo> {
    let name = match fields.get("name") {
        Some(raw) => urlencoding::decode(raw)
            .map_err(|_| Error::InvalidValue {
                field: "name",
                value: raw.clone(),
            })?
            .into_owned(),
        None => String::new(),
    };

    Ok(BasicInfo {
        name,
        power: parse_power(fields)?,
        mac: optional_string(fields, "mac"),
        firmware: optional_string(fields, "ver"),
        kind: optional_string(fields, "type"),
    })
}

pub fn parse_control_info(fields: &Fields) -> Result<ControlInfo> {
    let mode_raw = required(fields, "mode")?;
    let mode = mode_raw.trim().parse().map_err(|_| Error::InvalidValue {
        field: "mode",
        value: mode_raw.to_string(),
    })?;

    let stemp = required(fields, "stemp")?;
    let target_temperature =
        TargetTemperature::from_daikin_str(stemp).ok_or_else(|| Error::InvalidValue {
            field: "stemp",
            value: stemp.to_string(),
        })?;

    Ok(ControlInfo {
        power: parse_power(fields)?,
        mode,
        target_temperature,
        target_humidity: fields.get("shum").cloned().unwrap_or_else(|| "0".to_string()),
        fan_rate: fields.get("f_rate").cloned().unwrap_or_else(|| "A".to_string()),
        fan_direction: fields.get("f_dir").cloned().unwrap_or_else(|| "0".to_string()),
        mode_temperatures: per_mode(fields, "dt"),
        mode_humidities: per_mode(fields, "dh"),
    })
}

pub fn parse_sensor_info(fields: &Fields) -> SensorInfo {
    SensorInfo {
        indoor_temperature: optional_number(fields, "htemp"),
        indoor_humidity: optional_number(fields, "hhum"),
        outdoor_temperature: optional_number(fields, "otemp"),
    }
}

fn encode_target(target: TargetTemperature, mode: u8) -> String {
    match target {
        TargetTemperature::Celsius(c) => format!("{c:.1}"),
        TargetTemperature::Manual if mode == FAN_MODE_CODE => "--".to_string(),
        TargetTemperature::Manual => "M".to_string(),
    }
}

/// Merge `update` over `current` into the full parameter set the unit requires.
/// Switching mode without an explicit temperature restores that mode's remembered values.
pub fn control_params(current: &ControlInfo, update: &ControlUpdate) -> Vec<(&'static str, String)> {
    let power = update.power.unwrap_or(current.power);
    let mode = update.mode.unwrap_or(current.mode);
    let mode_changed = mode != current.mode;

    let target = match update.target_temperature {
        Some(t) => t,
        None if mode_changed => current
            .mode_temperatures
            .get(&mode)
            .and_then(|s| TargetTemperature::from_daikin_str(s))
            .unwrap_or(current.target_temperature),
        None => current.target_temperature,
    };

    let humidity = if mode_changed {
        current
            .mode_humidities
            .get(&mode)
            .cloned()
            .unwrap_or_else(|| current.target_humidity.clone())
    } else {
        current.target_humidity.clone()
    };

    vec![
        ("pow", if power { "1" } else { "0" }.to_string()),
        ("mode", mode.to_string()),
        ("stemp", encode_target(target, mode)),
        ("shum", humidity),
        ("f_rate", current.fan_rate.clone()),
        ("f_dir", current.fan_direction.clone()),
    ]
}

pub fn encode_form(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
