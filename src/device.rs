use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::client::DaikinApi;
use crate::diff::{diff_states, StateChange};
use crate::types::*;
use crate::Result;

pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

type PowerCallback = Box<dyn Fn(Option<bool>) + Send + Sync>;
type ModeCallback = Box<dyn Fn(Option<u8>) + Send + Sync>;
type TemperatureCallback = Box<dyn Fn(Option<f64>) + Send + Sync>;
type TargetCallback = Box<dyn Fn(f64) + Send + Sync>;

/// Per-field change handlers invoked by the poller.
#[derive(Default)]
pub struct UpdateCallbacks {
    power: Option<PowerCallback>,
    mode: Option<ModeCallback>,
    indoor_temperature: Option<TemperatureCallback>,
    target_temperature: Option<TargetCallback>,
}

impl UpdateCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_power(mut self, f: impl Fn(Option<bool>) + Send + Sync + 'static) -> Self {
        self.power = Some(Box::new(f));
        self
    }

    pub fn on_mode(mut self, f: impl Fn(Option<u8>) + Send + Sync + 'static) -> Self {
        self.mode = Some(Box::new(f));
        self
    }

    pub fn on_indoor_temperature(mut self, f: impl Fn(Option<f64>) + Send + Sync + 'static) -> Self {
        self.indoor_temperature = Some(Box::new(f));
        self
    }

    pub fn on_target_temperature(mut self, f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.target_temperature = Some(Box::new(f));
        self
    }

    fn dispatch(&self, change: &StateChange) {
        match change {
            StateChange::Power(v) => {
                if let Some(cb) = &self.power {
                    cb(*v);
                }
            }
            StateChange::Mode(v) => {
                if let Some(cb) = &self.mode {
                    cb(*v);
                }
            }
            StateChange::IndoorTemperature(v) => {
                if let Some(cb) = &self.indoor_temperature {
                    cb(*v);
                }
            }
            StateChange::TargetTemperature(v) => {
                if let Some(cb) = &self.target_temperature {
                    cb(*v);
                }
            }
        }
    }
}

/// Stops the poller when stopped or dropped.
pub struct UpdateHandle {
    task: JoinHandle<()>,
}

impl UpdateHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for UpdateHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureInfo {
    pub indoor: Option<f64>,
    pub target: TargetTemperature,
}

struct Inner<A> {
    address: String,
    api: A,
    connected: AtomicBool,
    state: Mutex<DeviceState>,
}

/// One air conditioner: connection, cached snapshot and poller.
pub struct DaikinAcDevice<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for DaikinAcDevice<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: DaikinApi> DaikinAcDevice<A> {
    pub fn new(address: impl Into<String>, api: A) -> Self {
        Self {
            inner: Arc::new(Inner {
                address: address.into(),
                api,
                connected: AtomicBool::new(false),
                state: Mutex::new(DeviceState::default()),
            }),
        }
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    pub fn state(&self) -> DeviceState {
        self.inner.state.lock().clone()
    }

    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let address = &self.inner.address;
        info!(address = %address, "connecting to Daikin AC");
        match self.inner.api.basic_info().await {
            Ok(basic) => {
                self.inner.state.lock().power = Some(basic.power);
                self.inner.connected.store(true, Ordering::Release);
                info!(address = %address, name = %basic.name, "connected");
                Ok(())
            }
            Err(e) => {
                error!(address = %address, error = %e, "failed to connect to Daikin AC");
                Err(e)
            }
        }
    }

    async fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            warn!(address = %self.inner.address, "connect needs to be called first");
            self.connect().await?;
        }
        Ok(())
    }

    pub async fn basic_info(&self) -> Result<BasicInfo> {
        self.ensure_connected().await?;
        let basic = self.inner.api.basic_info().await?;
        self.inner.state.lock().power = Some(basic.power);
        Ok(basic)
    }

    pub async fn control_info(&self) -> Result<ControlInfo> {
        self.ensure_connected().await?;
        let control = self.inner.api.control_info().await?;
        self.cache_control(&control);
        Ok(control)
    }

    pub async fn sensor_info(&self) -> Result<SensorInfo> {
        self.ensure_connected().await?;
        let sensor = self.inner.api.sensor_info().await?;
        self.inner.state.lock().indoor_temperature = sensor.indoor_temperature;
        Ok(sensor)
    }

    pub async fn power_info(&self) -> Result<bool> {
        Ok(self.control_info().await?.power)
    }

    pub async fn mode_info(&self) -> Result<u8> {
        Ok(self.control_info().await?.mode)
    }

    pub async fn temperature_info(&self) -> Result<TemperatureInfo> {
        let control = self.control_info().await?;
        let sensor = self.sensor_info().await?;
        Ok(TemperatureInfo {
            indoor: sensor.indoor_temperature,
            target: control.target_temperature,
        })
    }

    /// Send `update` and cache the state the unit confirms.
    pub async fn set_control_info(&self, update: &ControlUpdate) -> Result<ControlInfo> {
        self.ensure_connected().await?;
        let confirmed = self.inner.api.set_control_info(update).await?;
        debug!(
            address = %self.inner.address,
            power = confirmed.power,
            mode = confirmed.mode,
            target = %confirmed.target_temperature,
            "control info confirmed"
        );
        self.cache_control(&confirmed);
        Ok(confirmed)
    }

    pub async fn set_power(&self, on: bool) -> Result<ControlInfo> {
        self.set_control_info(&ControlUpdate::power(on)).await
    }

    pub async fn switch_on(&self) -> Result<ControlInfo> {
        self.set_power(true).await
    }

    pub async fn switch_off(&self) -> Result<ControlInfo> {
        self.set_power(false).await
    }

    pub async fn set_mode(&self, mode: AcMode) -> Result<ControlInfo> {
        self.set_control_info(&ControlUpdate::mode(mode)).await
    }

    pub async fn set_target_temperature(&self, celsius: f64) -> Result<ControlInfo> {
        self.set_control_info(&ControlUpdate::target_temperature(celsius))
            .await
    }

    fn cache_control(&self, control: &ControlInfo) {
        let mut state = self.inner.state.lock();
        state.power = Some(control.power);
        state.mode = Some(control.mode);
        state.target_temperature = Some(control.target_temperature);
    }

    /// One poll: fetch, swap the snapshot, then notify.
    /// Callbacks run after the swap so `state()` already reflects the whole tick.
    pub async fn poll_once(&self, callbacks: &UpdateCallbacks) -> Result<Vec<StateChange>> {
        self.ensure_connected().await?;
        let control = self.inner.api.control_info().await?;
        let sensor = self.inner.api.sensor_info().await?;
        let fresh = DeviceState::from_info(&control, &sensor);

        let previous = std::mem::replace(&mut *self.inner.state.lock(), fresh.clone());
        let changes = diff_states(&previous, &fresh);

        for change in &changes {
            debug!(address = %self.inner.address, ?change, "state changed");
            callbacks.dispatch(change);
        }
        Ok(changes)
    }

    pub fn start_updates(&self, callbacks: UpdateCallbacks) -> UpdateHandle {
        self.start_updates_every(POLL_INTERVAL, callbacks)
    }

    /// Ticks never overlap: each poll is awaited before the next tick, and late ticks are skipped.
    pub fn start_updates_every(&self, period: Duration, callbacks: UpdateCallbacks) -> UpdateHandle {
        let device = self.clone();
        info!(address = %self.inner.address, period_secs = period.as_secs(), "starting updates");

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = device.poll_once(&callbacks).await {
                    warn!(address = %device.inner.address, error = %e, "poll failed");
                }
            }
        });

        UpdateHandle { task }
    }
}
