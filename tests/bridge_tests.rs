mod common;

use std::sync::Arc;
use std::time::Duration;

use daikin_ac_bridge::{
    serial_number, Attribute, AttributeKind, BridgedAc, Cluster, DaikinAcDevice, Error,
    HostCommand, SystemMode, TargetTemperature, VENDOR_ID,
};

use common::{FakeApi, RecordingHost};

fn bridged(api: &FakeApi, host: &Arc<RecordingHost>) -> BridgedAc<FakeApi, RecordingHost> {
    let device = DaikinAcDevice::new("10.0.0.2", api.clone());
    BridgedAc::new(device, Arc::clone(host))
}

async fn ready(api: &FakeApi, host: &Arc<RecordingHost>) -> BridgedAc<FakeApi, RecordingHost> {
    let mut ac = bridged(api, host);
    ac.connect().await.unwrap();
    ac.create_endpoint().await.unwrap();
    ac
}

#[tokio::test]
async fn create_endpoint_describes_thermostat() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let mut ac = bridged(&api, &host);
    ac.connect().await.unwrap();

    let accessory = ac.create_endpoint().await.unwrap().clone();
    assert_eq!(accessory.storage_key, "daikin-ac-Living");
    assert_eq!(accessory.device_name(), "AC Living");
    assert_eq!(accessory.serial_number(), serial_number("daikin-ac-Living"));
    assert_eq!(accessory.serial_number().len(), 16);
    assert_eq!(accessory.basic_information.vendor_id, VENDOR_ID);
    assert_eq!(accessory.basic_information.hardware_version, 123);
    assert_eq!(accessory.basic_information.hardware_version_string, "1.2.3");
    assert_eq!(accessory.clusters.len(), 7);
    assert!(accessory.clusters.contains(&Cluster::Thermostat));
    assert_eq!(
        accessory.subscriptions,
        vec![
            AttributeKind::OccupiedCoolingSetpoint,
            AttributeKind::OccupiedHeatingSetpoint,
            AttributeKind::SystemMode,
        ]
    );
    assert!(!accessory.on_off);
    assert_eq!(accessory.thermostat.occupied_cooling_setpoint, 2200);
    assert_eq!(accessory.thermostat.occupied_heating_setpoint, 2200);
    assert_eq!(accessory.thermostat.local_temperature, Some(2000));
    assert_eq!(accessory.thermostat.system_mode, SystemMode::Off);
    assert_eq!(accessory.measured_temperature, Some(2000));
}

#[tokio::test]
async fn manual_target_defaults_to_24() {
    let api = FakeApi::new("Bedroom");
    api.set_control(|c| c.target_temperature = TargetTemperature::Manual);
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    let accessory = ac.accessory().unwrap();
    assert_eq!(accessory.thermostat.occupied_cooling_setpoint, 2400);
    assert_eq!(accessory.thermostat.occupied_heating_setpoint, 2400);
}

#[test]
fn serial_is_stable_per_name() {
    assert_eq!(serial_number("daikin-ac-Living"), serial_number("daikin-ac-Living"));
    assert_ne!(serial_number("daikin-ac-Living"), serial_number("daikin-ac-Bedroom"));
    assert!(serial_number("daikin-ac-Living").chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn register_with_platform_uses_host_selection() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    assert!(ac.register_with_platform().unwrap());
    assert_eq!(host.registered.lock().len(), 1);
    assert_eq!(host.selected.lock()[0].1, "AC Living");

    let rejecting = Arc::new(RecordingHost::rejecting());
    let ac = ready(&api, &rejecting).await;
    assert!(!ac.register_with_platform().unwrap());
    assert!(rejecting.registered.lock().is_empty());
}

#[tokio::test]
async fn operations_before_endpoint_fail() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = bridged(&api, &host);

    assert!(matches!(ac.register_with_platform(), Err(Error::EndpointNotCreated)));
    assert!(matches!(ac.restore_state(), Err(Error::EndpointNotCreated)));
    assert!(matches!(
        ac.handle(HostCommand::On).await,
        Err(Error::EndpointNotCreated)
    ));
}

#[tokio::test]
async fn restore_state_pushes_cached_snapshot() {
    let api = FakeApi::new("Living");
    api.set_control(|c| {
        c.power = true;
        c.mode = 4;
        c.target_temperature = TargetTemperature::Celsius(21.5);
    });
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.restore_state().unwrap();
    assert_eq!(
        host.attributes_for("daikin-ac-Living"),
        vec![
            Attribute::OnOff(true),
            Attribute::OccupiedCoolingSetpoint(2150),
            Attribute::OccupiedHeatingSetpoint(2150),
            Attribute::MeasuredValue(Some(2000)),
            Attribute::LocalTemperature(Some(2000)),
            Attribute::SystemMode(SystemMode::Heat),
        ]
    );
}

#[tokio::test]
async fn on_off_commands_reach_the_unit() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.handle(HostCommand::On).await.unwrap();
    assert_eq!(ac.device().state().power, Some(true));
    ac.handle(HostCommand::Off).await.unwrap();
    assert_eq!(ac.device().state().power, Some(false));

    ac.handle(HostCommand::Identify { identify_time: 5 })
        .await
        .unwrap();
    assert_eq!(api.unit().updates.lock().len(), 2);
}

#[tokio::test]
async fn setpoint_writes_set_target_temperature() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.handle(HostCommand::AttributeWritten(Attribute::OccupiedCoolingSetpoint(2350)))
        .await
        .unwrap();
    assert_eq!(
        api.unit().control.lock().target_temperature,
        TargetTemperature::Celsius(23.5)
    );

    ac.handle(HostCommand::AttributeWritten(Attribute::OccupiedHeatingSetpoint(1900)))
        .await
        .unwrap();
    assert_eq!(
        api.unit().control.lock().target_temperature,
        TargetTemperature::Celsius(19.0)
    );
}

#[tokio::test]
async fn system_mode_writes_translate_through_table() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.handle(HostCommand::AttributeWritten(Attribute::SystemMode(SystemMode::Heat)))
        .await
        .unwrap();
    {
        let control = api.unit().control.lock();
        assert!(control.power);
        assert_eq!(control.mode, 4);
    }

    ac.handle(HostCommand::AttributeWritten(Attribute::SystemMode(SystemMode::Sleep)))
        .await
        .unwrap();
    {
        let control = api.unit().control.lock();
        assert!(!control.power);
        assert_eq!(control.mode, 4);
    }
}

#[tokio::test(start_paused = true)]
async fn mode_write_reports_power_on_to_host() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let mut ac = ready(&api, &host).await;

    ac.handle(HostCommand::AttributeWritten(Attribute::SystemMode(SystemMode::Cool)))
        .await
        .unwrap();
    assert_eq!(
        host.attributes_for("daikin-ac-Living"),
        vec![Attribute::OnOff(true), Attribute::SystemMode(SystemMode::Cool)]
    );

    // Host already matches the unit, so polling has nothing to add.
    host.clear_attributes();
    ac.start_updates().unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(host.attributes_for("daikin-ac-Living").is_empty());
    ac.stop_updates();
}

#[tokio::test]
async fn off_command_reports_system_mode_off() {
    let api = FakeApi::new("Living");
    api.set_control(|c| c.power = true);
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.handle(HostCommand::Off).await.unwrap();
    assert_eq!(
        host.attributes_for("daikin-ac-Living"),
        vec![Attribute::OnOff(false), Attribute::SystemMode(SystemMode::Off)]
    );

    host.clear_attributes();
    ac.handle(HostCommand::On).await.unwrap();
    assert_eq!(
        host.attributes_for("daikin-ac-Living"),
        vec![Attribute::OnOff(true), Attribute::SystemMode(SystemMode::Cool)]
    );
}

#[tokio::test]
async fn identify_pushes_nothing() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.handle(HostCommand::Identify { identify_time: 5 })
        .await
        .unwrap();
    assert!(host.attributes_for("daikin-ac-Living").is_empty());
}

#[tokio::test]
async fn unsubscribed_writes_are_ignored() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let ac = ready(&api, &host).await;

    ac.handle(HostCommand::AttributeWritten(Attribute::LocalTemperature(Some(2500))))
        .await
        .unwrap();
    assert!(api.unit().updates.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn polled_changes_reach_the_host() {
    let api = FakeApi::new("Living");
    let host = Arc::new(RecordingHost::default());
    let mut ac = ready(&api, &host).await;

    ac.start_updates().unwrap();
    assert!(ac.is_updating());

    // First tick matches the snapshot taken by create_endpoint.
    tokio::time::sleep(Duration::from_secs(16)).await;
    assert!(host.attributes_for("daikin-ac-Living").is_empty());

    api.set_control(|c| {
        c.power = true;
        c.target_temperature = TargetTemperature::Celsius(25.0);
    });
    api.set_indoor(Some(22.5));
    tokio::time::sleep(Duration::from_secs(15)).await;

    assert_eq!(
        host.attributes_for("daikin-ac-Living"),
        vec![
            Attribute::OnOff(true),
            Attribute::SystemMode(SystemMode::Cool),
            Attribute::LocalTemperature(Some(2250)),
            Attribute::MeasuredValue(Some(2250)),
            Attribute::OccupiedCoolingSetpoint(2500),
            Attribute::OccupiedHeatingSetpoint(2500),
        ]
    );

    ac.stop_updates();
    assert!(!ac.is_updating());
}
