use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    control_params, encode_form, parse_basic_info, parse_control_info, parse_fields,
    parse_sensor_info, Fields, BASIC_INFO_PATH, CONTROL_INFO_PATH, SENSOR_INFO_PATH,
    SET_CONTROL_INFO_PATH,
};
use crate::types::*;
use crate::Result;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Operations a Daikin unit exposes on the LAN.
pub trait DaikinApi: Send + Sync + 'static {
    fn basic_info(&self) -> impl Future<Output = Result<BasicInfo>> + Send;

    fn control_info(&self) -> impl Future<Output = Result<ControlInfo>> + Send;

    /// Apply `update` and return the control info the unit reports afterwards.
    fn set_control_info(
        &self,
        update: &ControlUpdate,
    ) -> impl Future<Output = Result<ControlInfo>> + Send;

    fn sensor_info(&self) -> impl Future<Output = Result<SensorInfo>> + Send;
}

pub struct DaikinClientBuilder {
    address: String,
    use_get_to_post: bool,
    timeout: Duration,
    log_mode: Option<MessageLogMode>,
    log_path: Option<PathBuf>,
}

impl DaikinClientBuilder {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            use_get_to_post: false,
            timeout: DEFAULT_TIMEOUT,
            log_mode: None,
            log_path: None,
        }
    }

    /// Newer firmware only accepts POST; parameters move into a form body.
    pub fn use_get_to_post(mut self, enabled: bool) -> Self {
        self.use_get_to_post = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<PathBuf>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<DaikinClient> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => {
                Some(Mutex::new(MessageLogger::new(mode, path, &self.address)?))
            }
            _ => None,
        };

        let base_url = if self.address.contains("://") {
            self.address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", self.address)
        };

        Ok(DaikinClient {
            http,
            base_url,
            use_get_to_post: self.use_get_to_post,
            logger,
        })
    }
}

/// HTTP client for the Daikin LAN adapter. Stateless: every call is one request.
pub struct DaikinClient {
    http: reqwest::Client,
    base_url: String,
    use_get_to_post: bool,
    logger: Option<Mutex<MessageLogger>>,
}

impl DaikinClient {
    pub fn builder(address: impl Into<String>) -> DaikinClientBuilder {
        DaikinClientBuilder::new(address)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn uses_get_to_post(&self) -> bool {
        self.use_get_to_post
    }

    async fn request(&self, path: &str, params: &[(&str, String)]) -> Result<Fields> {
        let url = format!("{}{}", self.base_url, path);
        let method = if self.use_get_to_post { "POST" } else { "GET" };
        debug!(url = %url, method, "daikin request");

        if let Some(ref logger) = self.logger {
            logger.lock().log_request(method, path, params);
        }

        let request = if self.use_get_to_post {
            self.http
                .post(&url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_form(params))
        } else {
            self.http.get(&url).query(params)
        };

        let resp = request.send().await?.error_for_status()?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        trace!(path, body = %body, "daikin response");

        let fields = parse_fields(path, &body)?;
        if let Some(ref logger) = self.logger {
            logger.lock().log_response(path, status, &fields);
        }
        Ok(fields)
    }
}

impl DaikinApi for DaikinClient {
    async fn basic_info(&self) -> Result<BasicInfo> {
        let fields = self.request(BASIC_INFO_PATH, &[]).await?;
        parse_basic_info(&fields)
    }

    async fn control_info(&self) -> Result<ControlInfo> {
        let fields = self.request(CONTROL_INFO_PATH, &[]).await?;
        parse_control_info(&fields)
    }

    async fn set_control_info(&self, update: &ControlUpdate) -> Result<ControlInfo> {
        let current = self.control_info().await?;
        let params = control_params(&current, update);
        debug!(?update, "setting control info");
        self.request(SET_CONTROL_INFO_PATH, &params).await?;
        self.control_info().await
    }

    async fn sensor_info(&self) -> Result<SensorInfo> {
        let fields = self.request(SENSOR_INFO_PATH, &[]).await?;
        Ok(parse_sensor_info(&fields))
    }
}
