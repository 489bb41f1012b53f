//! # Shooter Control
//!
//! Turns the sequencer's action triggers into shooter demands. The flywheel and intake are held at
//! their configured levels for the whole routine, while the transfer wheel feeds game elements
//! into the flywheel between a hold's begin and end actions:
//!
//! - `Begin` - transfer wheel to [`TransferDir::Feed`]
//! - `End` - transfer wheel to [`TransferDir::Reverse`], keeping the next elements away from the
//!   flywheel until the following begin.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
pub use params::ShooterParams;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::shooter::{ShooterDems, TransferDir},
    tm::RoutineTm,
};
use log::{info, warn};

use crate::{
    runner::ActionSink,
    seq::{ActionKind, ActionTrigger},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ShooterCtrl {
    params: ShooterParams,

    /// Current demands.
    dems: ShooterDems,

    /// Number of times feeding has been started.
    num_discharges: usize,

    halted: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ShooterCtrl {
    /// Create the controller with the flywheel and intake running and the transfer wheel off.
    pub fn new(params: ShooterParams) -> Self {
        let dems = ShooterDems {
            flywheel_tps: params.flywheel_tps,
            intake_pwr: params.intake_pwr,
            transfer: TransferDir::Off,
        };

        Self {
            params,
            dems,
            num_discharges: 0,
            halted: false,
        }
    }

    pub fn dems(&self) -> ShooterDems {
        self.dems
    }

    pub fn num_discharges(&self) -> usize {
        self.num_discharges
    }

    pub fn params(&self) -> &ShooterParams {
        &self.params
    }
}

impl ActionSink for ShooterCtrl {
    fn on_trigger(&mut self, trigger: &ActionTrigger) {
        if self.halted {
            warn!("Shooter is halted, ignoring {} action", trigger.kind);
            return;
        }

        let transfer = match trigger.kind {
            ActionKind::Begin => TransferDir::Feed,
            ActionKind::End => TransferDir::Reverse,
        };

        if self.dems.transfer == transfer {
            return;
        }

        if transfer == TransferDir::Feed {
            self.num_discharges += 1;
            info!(
                "Discharging (S{}, discharge {})",
                trigger.state_index, self.num_discharges
            );
        } else {
            info!("Discharge stopped (S{})", trigger.state_index);
        }

        self.dems.transfer = transfer;
    }

    fn halt(&mut self) {
        if !self.halted {
            info!("Shooter halted");
        }

        self.halted = true;
        self.dems = ShooterDems::stopped();
    }

    fn fill_tm(&self, tm: &mut RoutineTm) {
        tm.shooter = self.dems;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ctrl() -> ShooterCtrl {
        ShooterCtrl::new(ShooterParams {
            flywheel_tps: 4200.0,
            intake_pwr: 1.0,
        })
    }

    fn trigger(kind: ActionKind) -> ActionTrigger {
        ActionTrigger {
            state_index: 0,
            kind,
        }
    }

    #[test]
    fn test_begin_end() {
        let mut ctrl = ctrl();

        assert_eq!(ctrl.dems().flywheel_tps, 4200.0);
        assert_eq!(ctrl.dems().transfer, TransferDir::Off);
        assert!(!ctrl.dems().is_discharging());

        ctrl.on_trigger(&trigger(ActionKind::Begin));
        assert_eq!(ctrl.dems().transfer, TransferDir::Feed);
        assert!(ctrl.dems().is_discharging());

        // Repeated triggers change nothing
        ctrl.on_trigger(&trigger(ActionKind::Begin));
        assert_eq!(ctrl.num_discharges(), 1);

        ctrl.on_trigger(&trigger(ActionKind::End));
        assert_eq!(ctrl.dems().transfer, TransferDir::Reverse);
        assert_eq!(ctrl.dems().intake_pwr, 1.0);

        ctrl.on_trigger(&trigger(ActionKind::Begin));
        assert_eq!(ctrl.num_discharges(), 2);

        let mut tm = RoutineTm::default();
        ctrl.fill_tm(&mut tm);
        assert_eq!(tm.shooter, ctrl.dems());
    }

    #[test]
    fn test_halt() {
        let mut ctrl = ctrl();

        ctrl.on_trigger(&trigger(ActionKind::Begin));
        ctrl.halt();
        assert_eq!(ctrl.dems(), ShooterDems::stopped());

        ctrl.on_trigger(&trigger(ActionKind::Begin));
        assert_eq!(ctrl.dems(), ShooterDems::stopped());
    }
}
