use std::sync::Arc;

use tracing::{info, warn};

use crate::bridge::BridgedAc;
use crate::client::DaikinClient;
use crate::config::PlatformConfig;
use crate::device::DaikinAcDevice;
use crate::host::{BridgeHost, HostCommand};
use crate::{Error, Result};

/// Entry point the host drives: one bridged accessory per configured address.
pub struct DaikinPlatform<H> {
    host: Arc<H>,
    config: PlatformConfig,
    devices: Vec<BridgedAc<DaikinClient, H>>,
    configured: bool,
}

impl<H: BridgeHost> DaikinPlatform<H> {
    pub fn new(host: Arc<H>, config: PlatformConfig) -> Self {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            host_version = %host.host_version(),
            debug = config.debug,
            "initializing Daikin AC platform"
        );
        Self {
            host,
            config,
            devices: Vec::new(),
            configured: false,
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn devices(&self) -> &[BridgedAc<DaikinClient, H>] {
        &self.devices
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Sets up every configured unit in order. The first failure aborts startup.
    pub async fn on_start(&mut self, reason: &str) -> Result<()> {
        info!(reason, "starting Daikin AC platform");
        for entry in self.config.entries()? {
            info!(
                address = %entry.address,
                use_get_to_post = entry.use_get_to_post,
                "creating Daikin AC device"
            );

            let mut builder =
                DaikinClient::builder(entry.address.as_str()).use_get_to_post(entry.use_get_to_post);
            if let Some(path) = &self.config.message_log {
                builder = builder.message_log(self.config.message_log_mode, path.clone());
            }
            let device = DaikinAcDevice::new(entry.address, builder.build()?);
            let mut bridged = BridgedAc::new(device, Arc::clone(&self.host));

            bridged.connect().await?;
            bridged.create_endpoint().await?;
            bridged.register_with_platform()?;
            self.devices.push(bridged);
        }
        Ok(())
    }

    /// Restores every accessory's attributes, then starts polling.
    pub fn on_configure(&mut self) -> Result<()> {
        info!("restoring state for Daikin AC platform");
        for device in &mut self.devices {
            device.restore_state()?;
            device.start_updates()?;
        }
        self.configured = true;
        Ok(())
    }

    pub fn on_shutdown(&mut self, reason: &str) {
        for device in &mut self.devices {
            device.stop_updates();
        }
        self.configured = false;
        info!(reason, "shutting down Daikin AC platform");
    }

    /// Route a host command to the accessory stored under `storage_key`.
    pub async fn dispatch(&self, storage_key: &str, command: HostCommand) -> Result<()> {
        let device = self
            .devices
            .iter()
            .find(|d| d.storage_key() == Some(storage_key))
            .ok_or_else(|| Error::DeviceNotFound(storage_key.to_string()))?;

        if let Err(e) = device.handle(command).await {
            warn!(storage_key, ?command, error = %e, "command failed");
            return Err(e);
        }
        Ok(())
    }
}
