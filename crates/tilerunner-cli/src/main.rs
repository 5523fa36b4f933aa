//! `tilerunner-cli` – interactive shell for the Tilerunner motion core.
//!
//! This binary:
//!
//! 1. Loads `~/.tilerunner/config.toml` (defaults when absent).
//! 2. Builds a simulated robot through the hardware registry, leaving out any
//!    devices listed under `[simulation] missing`.
//! 3. Drops the user into an **interactive REPL** with slash-commands
//!    (`/move`, `/turn`, `/calibrate`, `/square`, `/status`, `/help`, …).
//! 4. Intercepts **Ctrl-C** to cancel the running command; a second Ctrl-C
//!    at the prompt exits.

mod config;
mod repl;

use colored::Colorize;
use tracing::{info, warn};

use tilerunner_control::{CancellationToken, RunFlag, Tilerunner, telemetry};
use tilerunner_hal::SimRegistry;

use crate::config::Config;
use crate::repl::SessionDiagnostics;

fn main() {
    // Set TILERUNNER_LOG_FORMAT=json for newline-delimited JSON logs.  The
    // REPL's own output still uses println!.
    telemetry::init_tracing();

    print_banner();

    // ── Cancellation ──────────────────────────────────────────────────────
    let run_flag = RunFlag::new();
    let handler_flag = run_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        if handler_flag.is_active() {
            println!("{}", "⚠  Ctrl-C received – stopping the current command …".yellow().bold());
            handler_flag.stop();
        } else {
            println!("{}", "  ✓ Exiting Tilerunner.".green());
            std::process::exit(130);
        }
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; commands cannot be cancelled");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(c)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            c
        }
        Ok(None) => {
            println!(
                "  No config at {}; using defaults.",
                config::config_path().display().to_string().dimmed()
            );
            Config::default()
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            Config::default()
        }
    };

    // ── Simulated robot ───────────────────────────────────────────────────
    let mut sim = SimRegistry::with_rates(cfg.simulation.ticks_per_poll, cfg.simulation.degrees_per_poll)
        .with_drive_base(&cfg.devices.left_drive, &cfg.devices.right_drive)
        .with_motor(&cfg.devices.lift_drive)
        .with_motor(&cfg.devices.claw)
        .with_motor(&cfg.devices.jewel_whacker)
        .with_imu(&cfg.devices.imu);
    for name in &cfg.simulation.missing {
        sim = sim.without(name);
    }
    let mut registry = sim.build();

    let mut robot = match Tilerunner::from_registry(
        &mut registry,
        &cfg.devices,
        cfg.motion.clone(),
        SessionDiagnostics::default(),
    ) {
        Ok(r) => r,
        Err(e) => {
            println!("{}: {}", "Failed to assemble robot".red(), e);
            std::process::exit(1);
        }
    };
    info!(missing = ?cfg.simulation.missing, "simulated robot ready");

    println!(
        "  Simulated robot ready, heading {:.1}°.",
        robot.heading()
    );
    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(&mut robot, &run_flag);
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#" _____ _ _                                      "#.bold().cyan());
    println!("{}", r#"|_   _(_) | ___ _ __ _   _ _ __  _ __   ___ _ __ "#.bold().cyan());
    println!("{}", r#"  | | | | |/ _ \ '__| | | | '_ \| '_ \ / _ \ '__|"#.bold().cyan());
    println!("{}", r#"  | | | | |  __/ |  | |_| | | | | | | |  __/ |   "#.bold().cyan());
    println!("{}", r#"  |_| |_|_|\___|_|   \__,_|_| |_|_| |_|\___|_|   "#.bold().cyan());
    println!();
    println!("  {} {}",
        "Tilerunner".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Closed-loop motion control shell (simulated hardware)");
    println!();
}
