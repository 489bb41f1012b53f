//! # Shooter Equipment Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the shooter mechanism drivers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ShooterDems {
    /// Flywheel velocity demand in encoder ticks per second.
    pub flywheel_tps: f64,

    /// Intake roller power demand, in the range [-1, 1].
    pub intake_pwr: f64,

    /// Direction of the transfer wheel which feeds rings/balls into the flywheel.
    pub transfer: TransferDir,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Direction of the transfer wheel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDir {
    /// Stopped
    Off,

    /// Feeding into the flywheel, i.e. discharging
    Feed,

    /// Running backwards, holding game elements away from the flywheel
    Reverse,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TransferDir {
    fn default() -> Self {
        TransferDir::Off
    }
}

impl ShooterDems {
    /// Demands which stop every actuator of the shooter.
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Returns true if the shooter is currently discharging.
    pub fn is_discharging(&self) -> bool {
        self.transfer == TransferDir::Feed && self.flywheel_tps > 0.0
    }
}
