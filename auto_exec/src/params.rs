//! # Autonomous Routine Executable Parameters
//!
//! Parameters for the `auto_exec` executable, loaded from `auto_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{path_exec::SimExecutorParams, plan::Alliance, shooter_ctrl::ShooterParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AutoExecParams {
    /// Target period of one cycle.
    pub cycle_period_s: f64,

    /// Routine file to run, relative to the params directory.
    pub routine: String,

    /// Alliance to run the routine for, the routine file is written for blue.
    pub alliance: Alliance,

    /// The routine is cancelled if it runs for longer than this.
    pub max_routine_duration_s: f64,

    pub sim_executor: SimExecutorParams,

    pub shooter: ShooterParams,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_shipped_params() {
        let params: AutoExecParams =
            util::params::parse(include_str!("../../params/auto_exec.toml")).unwrap();

        assert_eq!(params.routine, "routines/close.toml");
        assert_eq!(params.alliance, Alliance::Blue);
        assert!(params.cycle_period_s > 0.0);
        assert_eq!(params.shooter.flywheel_tps, 4200.0);
    }
}
