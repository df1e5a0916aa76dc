use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::protocol::Fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLogMode {
    #[default]
    Full,
    Diffed,
}

/// NDJSON record of every exchange with one unit.
/// Units may share a file, so every entry carries the unit's address.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    address: String,
    file: File,
    previous: HashMap<String, Fields>,
}

impl MessageLogger {
    pub fn new(
        mode: MessageLogMode,
        path: impl AsRef<Path>,
        address: impl Into<String>,
    ) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            address: address.into(),
            file,
            previous: HashMap::new(),
        })
    }

    pub fn log_request(&mut self, method: &str, path: &str, params: &[(&str, String)]) {
        let params: serde_json::Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect();
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "address": self.address,
            "dir": "req",
            "method": method,
            "path": path,
            "params": params,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, path: &str, status: u16, fields: &Fields) {
        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "address": self.address,
                    "dir": "resp",
                    "path": path,
                    "status": status,
                    "body": fields,
                });
                self.write_line(&entry);
            }
            MessageLogMode::Diffed => {
                let entry = match self.previous.get(path) {
                    None => json!({
                        "ts": Utc::now().to_rfc3339(),
                        "address": self.address,
                        "dir": "resp",
                        "path": path,
                        "status": status,
                        "full": true,
                        "body": fields,
                    }),
                    Some(prev) => {
                        let changes: Vec<Value> = diff_fields(prev, fields)
                            .into_iter()
                            .map(|(key, old, new)| json!({ "key": key, "old": old, "new": new }))
                            .collect();
                        json!({
                            "ts": Utc::now().to_rfc3339(),
                            "address": self.address,
                            "dir": "resp",
                            "path": path,
                            "status": status,
                            "changes": changes,
                        })
                    }
                };
                self.write_line(&entry);
                self.previous.insert(path.to_string(), fields.clone());
            }
        }
    }

    /// One `write_all` per entry; other units may append to the same file.
    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = self.file.write_all(format!("{line}\n").as_bytes())
        {
            warn!("failed to write log entry: {e}");
        }
    }
}

fn diff_fields<'a>(
    previous: &'a Fields,
    current: &'a Fields,
) -> Vec<(&'a str, Option<&'a str>, Option<&'a str>)> {
    let mut changes: Vec<_> = current
        .iter()
        .filter(|(k, v)| previous.get(*k) != Some(*v))
        .map(|(k, v)| (k.as_str(), previous.get(k).map(String::as_str), Some(v.as_str())))
        .collect();
    changes.extend(
        previous
            .iter()
            .filter(|(k, _)| !current.contains_key(*k))
            .map(|(k, v)| (k.as_str(), Some(v.as_str()), None)),
    );
    changes
}
