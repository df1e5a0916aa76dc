use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The device answered with an empty body.
    #[error("no data returned from {path}")]
    EmptyResponse { path: String },

    /// The device answered with `ret` other than `OK`.
    #[error("device rejected {path}: {ret}")]
    Rejected { path: String, ret: String },

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("endpoint not created")]
    EndpointNotCreated,

    #[error("unknown device: {0}")]
    DeviceNotFound(String),

    #[error("host error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, Error>;
