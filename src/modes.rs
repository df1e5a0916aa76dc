use crate::host::SystemMode;
use crate::types::AcMode;

/// What a host system-mode write asks of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    PowerOff,
    Mode(AcMode),
}

/// Unit state to host mode. Powered-off units and unknown codes read as `Off`.
pub fn system_mode_from_daikin(power: bool, mode: Option<u8>) -> SystemMode {
    if !power {
        return SystemMode::Off;
    }
    match mode.and_then(AcMode::from_code) {
        Some(AcMode::Auto) => SystemMode::Auto,
        Some(AcMode::Dry) => SystemMode::Dry,
        Some(AcMode::Cool) => SystemMode::Cool,
        Some(AcMode::Heat) => SystemMode::Heat,
        Some(AcMode::Fan) => SystemMode::FanOnly,
        None => SystemMode::Off,
    }
}

/// Host mode to unit command. Modes the unit lacks switch it off.
pub fn daikin_mode_from_system(mode: SystemMode) -> ModeCommand {
    match mode {
        SystemMode::Auto => ModeCommand::Mode(AcMode::Auto),
        SystemMode::Cool => ModeCommand::Mode(AcMode::Cool),
        SystemMode::Heat => ModeCommand::Mode(AcMode::Heat),
        SystemMode::Dry => ModeCommand::Mode(AcMode::Dry),
        SystemMode::FanOnly => ModeCommand::Mode(AcMode::Fan),
        SystemMode::Off
        | SystemMode::EmergencyHeat
        | SystemMode::Precooling
        | SystemMode::Sleep => ModeCommand::PowerOff,
    }
}
