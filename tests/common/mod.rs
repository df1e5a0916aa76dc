#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use daikin_ac_bridge::{
    Accessory, Attribute, BasicInfo, BridgeHost, ControlInfo, ControlUpdate, DaikinApi, Error,
    Result, SensorInfo, TargetTemperature,
};
use parking_lot::Mutex;

pub const BASIC_BODY: &str = "ret=OK,type=aircon,reg=eu,dst=1,ver=1_2_51,rev=F8D5391,pow=1,err=0,location=0,name=%4c%69%76%69%6e%67,icon=0,method=home only,port=30050,id=,pw=,lpw_flag=0,adp_kind=2,pv=2,cpv=2,cpv_minor=00,led=1,en_setzone=1,mac=A0B1C2D3E4F5,adp_mode=run";
pub const CONTROL_BODY: &str = "ret=OK,pow=1,mode=3,adv=,stemp=22.0,shum=0,dt1=25.0,dt2=M,dt3=22.0,dt4=21.0,dt5=21.0,dt7=25.0,dh1=AUTO,dh2=50,dh3=0,dh4=0,dh5=0,dh7=AUTO,dhh=50,b_mode=3,b_stemp=22.0,b_shum=0,alert=255,f_rate=A,f_dir=3";
pub const SENSOR_BODY: &str = "ret=OK,htemp=21.5,hhum=-,otemp=12.0,err=0,cmpfreq=0";

pub fn basic_body(name: &str) -> String {
    BASIC_BODY.replace("%4c%69%76%69%6e%67", &urlencoding::encode(name))
}

/// In-memory unit standing in for a Daikin adapter.
pub struct FakeUnit {
    pub basic: Mutex<BasicInfo>,
    pub control: Mutex<ControlInfo>,
    pub sensor: Mutex<SensorInfo>,
    pub fail_basic: AtomicBool,
    pub fail_sensor: AtomicBool,
    pub basic_calls: AtomicUsize,
    pub control_calls: AtomicUsize,
    pub control_delay: Mutex<Option<Duration>>,
    pub control_in_flight: AtomicUsize,
    pub max_control_in_flight: AtomicUsize,
    pub updates: Mutex<Vec<ControlUpdate>>,
}

#[derive(Clone)]
pub struct FakeApi(pub Arc<FakeUnit>);

impl FakeApi {
    pub fn new(name: &str) -> Self {
        FakeApi(Arc::new(FakeUnit {
            basic: Mutex::new(BasicInfo {
                name: name.to_string(),
                power: false,
                ..Default::default()
            }),
            control: Mutex::new(ControlInfo {
                power: false,
                mode: 3,
                target_temperature: TargetTemperature::Celsius(22.0),
                target_humidity: "0".to_string(),
                fan_rate: "A".to_string(),
                fan_direction: "0".to_string(),
                ..Default::default()
            }),
            sensor: Mutex::new(SensorInfo {
                indoor_temperature: Some(20.0),
                ..Default::default()
            }),
            fail_basic: AtomicBool::new(false),
            fail_sensor: AtomicBool::new(false),
            basic_calls: AtomicUsize::new(0),
            control_calls: AtomicUsize::new(0),
            control_delay: Mutex::new(None),
            control_in_flight: AtomicUsize::new(0),
            max_control_in_flight: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }))
    }

    pub fn unit(&self) -> &FakeUnit {
        &self.0
    }

    pub fn set_control(&self, f: impl FnOnce(&mut ControlInfo)) {
        f(&mut self.0.control.lock());
    }

    /// Make every `control_info` call take `delay` of (tokio) time.
    pub fn set_control_delay(&self, delay: Duration) {
        *self.0.control_delay.lock() = Some(delay);
    }

    pub fn set_indoor(&self, celsius: Option<f64>) {
        self.0.sensor.lock().indoor_temperature = celsius;
    }
}

impl DaikinApi for FakeApi {
    async fn basic_info(&self) -> Result<BasicInfo> {
        self.0.basic_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_basic.load(Ordering::SeqCst) {
            return Err(Error::EmptyResponse {
                path: "/common/basic_info".to_string(),
            });
        }
        Ok(self.0.basic.lock().clone())
    }

    async fn control_info(&self) -> Result<ControlInfo> {
        self.0.control_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.0.control_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.0
            .max_control_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.0.control_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.0.control_in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.0.control.lock().clone())
    }

    async fn set_control_info(&self, update: &ControlUpdate) -> Result<ControlInfo> {
        self.0.updates.lock().push(update.clone());
        let mut control = self.0.control.lock();
        if let Some(power) = update.power {
            control.power = power;
        }
        if let Some(mode) = update.mode {
            control.mode = mode;
        }
        if let Some(target) = update.target_temperature {
            control.target_temperature = target;
        }
        Ok(control.clone())
    }

    async fn sensor_info(&self) -> Result<SensorInfo> {
        if self.0.fail_sensor.load(Ordering::SeqCst) {
            return Err(Error::EmptyResponse {
                path: "/aircon/get_sensor_info".to_string(),
            });
        }
        Ok(self.0.sensor.lock().clone())
    }
}

/// Host that records everything it is told.
#[derive(Default)]
pub struct RecordingHost {
    pub registered: Mutex<Vec<Accessory>>,
    pub selected: Mutex<Vec<(String, String)>>,
    pub attributes: Mutex<Vec<(String, Attribute)>>,
    pub reject_all: bool,
}

impl RecordingHost {
    pub fn rejecting() -> Self {
        Self {
            reject_all: true,
            ..Default::default()
        }
    }

    pub fn attributes_for(&self, storage_key: &str) -> Vec<Attribute> {
        self.attributes
            .lock()
            .iter()
            .filter(|(k, _)| k == storage_key)
            .map(|(_, a)| *a)
            .collect()
    }

    pub fn clear_attributes(&self) {
        self.attributes.lock().clear();
    }
}

impl BridgeHost for RecordingHost {
    fn host_version(&self) -> &str {
        "1.2.3"
    }

    fn select_device(&self, serial: &str, name: &str) {
        self.selected
            .lock()
            .push((serial.to_string(), name.to_string()));
    }

    fn validate_device(&self, _name: &str) -> bool {
        !self.reject_all
    }

    fn register_device(&self, accessory: &Accessory) -> Result<()> {
        self.registered.lock().push(accessory.clone());
        Ok(())
    }

    fn set_attribute(&self, storage_key: &str, attribute: Attribute) -> Result<()> {
        self.attributes
            .lock()
            .push((storage_key.to_string(), attribute));
        Ok(())
    }
}
