//! Autonomous routine executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logging
//!     - Load the executable parameters and the routine
//!     - Build the segment plan and compile the routine
//!     - Main loop:
//!         - Path executor update
//!         - Sequencer processing
//!         - Action trigger handling
//!         - Segment command forwarding
//!         - Telemetry logging
//!
//! The loop runs until the routine completes, aborts, or is cancelled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use comms_if::tm::RoutineTm;
use log::{debug, info, warn};
use std::{
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use auto_lib::{
    params::AutoExecParams,
    path_exec::SimExecutor,
    plan::Alliance,
    runner::RoutineRunner,
    seq::{Routine, RoutineParams, RoutineStatus, Sequencer},
    shooter_ctrl::ShooterCtrl,
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Run an autonomous routine against the simulated path executor.
#[derive(Debug, StructOpt)]
#[structopt(name = "auto_exec")]
struct Opt {
    /// Routine file to run, relative to the params directory. Overrides the parameter file.
    #[structopt(long)]
    routine: Option<String>,

    /// Alliance to run the routine for, "blue" or "red". Overrides the parameter file.
    #[structopt(long)]
    alliance: Option<Alliance>,

    /// Cancel the routine after this many cycles.
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Minimum level of log messages, one of info, debug or trace.
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("auto_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &[], &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Autonomous Routine Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: AutoExecParams =
        util::params::load("auto_exec.toml").wrap_err("Could not load exec params")?;

    let routine_path = opt.routine.clone().unwrap_or_else(|| params.routine.clone());
    let alliance = opt.alliance.unwrap_or(params.alliance);

    let routine_params: RoutineParams = util::params::load(&routine_path)
        .wrap_err_with(|| format!("Could not load the routine from {:?}", routine_path))?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let routine = Routine::from_params(&routine_params, alliance)
        .wrap_err_with(|| format!("Routine {:?} is invalid", routine_params.name))?;

    let executor = SimExecutor::new(params.sim_executor.clone(), routine.plan().start_pose());
    let shooter = ShooterCtrl::new(params.shooter.clone());

    let mut runner = RoutineRunner::new(Sequencer::new(routine), executor, shooter)
        .with_max_duration(params.max_routine_duration_s);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);
    let loop_start_instant = Instant::now();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let now_s = (cycle_start_instant - loop_start_instant).as_secs_f64();

        // ---- ROUTINE PROCESSING ----

        let report = runner
            .cycle(now_s)
            .wrap_err("An error occured while running the routine")?;

        // ---- TELEMETRY ----

        if report.transitioned || report.tm.status.is_finished() {
            info!("{}", format_tm(&report.tm));
        } else {
            debug!("{}", format_tm(&report.tm));
        }

        if runner.is_finished() {
            break;
        }

        if let Some(max_cycles) = opt.max_cycles {
            if runner.num_cycles() >= max_cycles {
                warn!("Maximum number of cycles ({}) reached", max_cycles);
                runner.cancel_token().cancel();
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    let status = runner.run_status();
    info!(
        "Routine finished with status {} after {} cycles",
        status,
        runner.num_cycles()
    );
    info!("Shooter discharged {} times", runner.actions().num_discharges());

    session.exit();

    match runner.sequencer().status() {
        RoutineStatus::Aborted(fault) => Err(eyre!("Routine aborted: {}", fault)),
        _ => Ok(()),
    }
}

/// Format the telemetry snapshot as a single line of key-value pairs.
fn format_tm(tm: &RoutineTm) -> String {
    tm.entries()
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
