//! REPL – Read-Eval-Print Loop driving the simulated Tilerunner.
//!
//! Supported slash-commands:
//!   /move <inches> [power]    – straight move on encoder feedback
//!   /turn <degrees> [power]   – in-place turn on gyro feedback
//!   /calibrate                – settle the gyro and zero the drive encoders
//!   /lift <ticks> [power]     – run the lift to a tick position
//!   /claw <ticks> [power]     – run the claw to a tick position
//!   /glyph                    – open the claw to drop a glyph
//!   /jewel                    – swing the jewel whacker
//!   /square                   – drive a 12" square
//!   /status                   – heading, encoders and the last command's log
//!   /help                     – show this list
//!   /quit | /exit             – exit the CLI

use colored::Colorize;
use std::io::{self, BufRead, Write};

use tilerunner_control::{
    CancellationToken, Diagnostics, Phase, PositionOutcome, RecordingDiagnostics, RunFlag,
    StatusLine, Tilerunner, TracingDiagnostics, TurnOutcome,
};
use tilerunner_hal::Actuator;
use tilerunner_types::RobotError;

const DEFAULT_MOVE_POWER: f64 = 1.0;
const DEFAULT_TURN_POWER: f64 = 0.5;
const DEFAULT_SERVO_POWER: f64 = 0.5;
const SQUARE_SIDE_INCHES: f64 = 12.0;
const SQUARE_TURN_DEGREES: f64 = 90.0;

/// A parsed slash-command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move { inches: f64, power: f64 },
    Turn { degrees: f64, power: f64 },
    Calibrate,
    Lift { ticks: i32, power: f64 },
    Claw { ticks: i32, power: f64 },
    Glyph,
    Jewel,
    Square,
    Status,
    Help,
    Quit,
}

/// Parse one input line.  The error is a user-facing message.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = words.collect();

    let command = match head {
        "/move" => {
            let (inches, power) = value_and_power(head, &args, DEFAULT_MOVE_POWER)?;
            Command::Move { inches, power }
        }
        "/turn" => {
            let (degrees, power) = value_and_power(head, &args, DEFAULT_TURN_POWER)?;
            Command::Turn { degrees, power }
        }
        "/lift" | "/claw" => {
            let (ticks, power) = value_and_power::<i32>(head, &args, DEFAULT_SERVO_POWER)?;
            if head == "/lift" {
                Command::Lift { ticks, power }
            } else {
                Command::Claw { ticks, power }
            }
        }
        "/calibrate" => no_args(head, &args, Command::Calibrate)?,
        "/glyph" => no_args(head, &args, Command::Glyph)?,
        "/jewel" => no_args(head, &args, Command::Jewel)?,
        "/square" => no_args(head, &args, Command::Square)?,
        "/status" => no_args(head, &args, Command::Status)?,
        "/help" => no_args(head, &args, Command::Help)?,
        "/quit" | "/exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

fn value_and_power<V: std::str::FromStr>(
    head: &str,
    args: &[&str],
    default_power: f64,
) -> Result<(V, f64), String> {
    let usage = || format!("usage: {head} <value> [power]");
    let raw = match args {
        [value] | [value, _] => *value,
        _ => return Err(usage()),
    };
    if let Ok(number) = raw.parse::<f64>()
        && !number.is_finite()
    {
        return Err(format!("{head} needs a finite value, got {raw}"));
    }
    let value = raw.parse::<V>().map_err(|_| usage())?;
    let power = match args.get(1) {
        Some(p) => p.parse::<f64>().map_err(|_| usage())?,
        None => default_power,
    };
    if !(-1.0..=1.0).contains(&power) {
        return Err(format!("power must be within [-1, 1], got {power}"));
    }
    Ok((value, power))
}

fn no_args(head: &str, args: &[&str], command: Command) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("{head} takes no arguments"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session diagnostics
// ─────────────────────────────────────────────────────────────────────────────

/// Forwards every status line to `tracing` and keeps the current command's
/// lines for `/status`.
#[derive(Debug, Default)]
pub struct SessionDiagnostics {
    tracing: TracingDiagnostics,
    recent: RecordingDiagnostics,
}

impl SessionDiagnostics {
    pub fn recent(&self) -> &RecordingDiagnostics {
        &self.recent
    }

    fn start_command(&mut self) {
        self.recent.clear();
    }
}

impl Diagnostics for SessionDiagnostics {
    fn emit(&mut self, line: StatusLine) {
        self.recent.emit(line.clone());
        self.tracing.emit(line);
    }
}

pub type Robot = Tilerunner<SessionDiagnostics>;

// ─────────────────────────────────────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for the interactive REPL.
///
/// `run_flag` is the cancellation token of every robot command.  The Ctrl-C
/// handler clears it: a running command stops and the flag is re-armed; a
/// flag found cleared at the prompt ends the REPL.
pub fn run(robot: &mut Robot, run_flag: &RunFlag) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", "tilerunner>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }
        if !run_flag.is_active() {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let command = match parse_command(input) {
            Ok(c) => c,
            Err(msg) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    msg.yellow(),
                    "/help".bold()
                );
                continue;
            }
        };

        if command == Command::Quit {
            println!("{}", "Goodbye.".green());
            break;
        }

        robot.diagnostics_mut().start_command();
        if let Err(e) = execute(robot, run_flag, &command) {
            println!("{}: {}", "Command failed".red(), e);
        }
        if !run_flag.is_active() {
            println!("{}", "  ⚠ command cancelled".yellow());
            run_flag.rearm();
        }
    }
}

/// Run one command against `robot`.
pub fn execute(robot: &mut Robot, token: &RunFlag, command: &Command) -> Result<(), RobotError> {
    match *command {
        Command::Move { inches, power } => {
            let outcome = robot.move_inches(token, power, inches)?;
            print_position("drive", &outcome);
        }
        Command::Turn { degrees, power } => {
            let outcome = robot.turn(token, power, degrees)?;
            print_turn(&outcome);
        }
        Command::Calibrate => {
            robot.calibrate(token)?;
            println!("  {} calibrated, heading {:.1}°", "✓".green(), robot.heading());
        }
        Command::Lift { ticks, power } => {
            let outcome = robot.lift(token, ticks, power)?;
            print_position("lift", &outcome);
        }
        Command::Claw { ticks, power } => {
            let outcome = robot.move_claw(token, ticks, power)?;
            print_position("claw", &outcome);
        }
        Command::Glyph => {
            let outcome = robot.remove_glyph(token, DEFAULT_SERVO_POWER)?;
            print_position("claw", &outcome);
        }
        Command::Jewel => {
            robot.activate_jewel_whacker(token)?;
            robot.retract_jewel_whacker(token)?;
        }
        Command::Square => run_square(robot, token)?,
        Command::Status => print_status(robot),
        Command::Help => print_help(),
        Command::Quit => {}
    }
    Ok(())
}

/// Four sides of [`SQUARE_SIDE_INCHES`], each followed by a right-angle turn.
fn run_square(robot: &mut Robot, token: &RunFlag) -> Result<(), RobotError> {
    for side in 1..=4 {
        if !token.is_active() {
            break;
        }
        let moved = robot.move_inches(token, DEFAULT_MOVE_POWER, SQUARE_SIDE_INCHES)?;
        let turned = robot.turn(token, DEFAULT_TURN_POWER, SQUARE_TURN_DEGREES)?;
        let delta = turned.primary().map_or(0.0, |p| p.delta);
        println!(
            "  side {side}/4: {} ticks, turned {:.1}°",
            moved.final_position.to_string().bold(),
            delta
        );
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_help() {
    println!();
    println!("{}", "Tilerunner Commands".bold().underline());
    println!("  {}  – drive straight", "/move <inches> [power]".bold().cyan());
    println!("  {} – turn in place (positive is clockwise)", "/turn <degrees> [power]".bold().cyan());
    println!("  {}               – settle the gyro, zero encoders", "/calibrate".bold().cyan());
    println!("  {}   – run the lift", "/lift <ticks> [power]".bold().cyan());
    println!("  {}   – run the claw", "/claw <ticks> [power]".bold().cyan());
    println!("  {}                   – drop a glyph", "/glyph".bold().cyan());
    println!("  {}                   – swing the jewel whacker", "/jewel".bold().cyan());
    println!("  {}                  – drive a 12\" square", "/square".bold().cyan());
    println!("  {}                  – heading, encoders, last command log", "/status".bold().cyan());
    println!("  {}            – exit the CLI", "/quit  /exit".bold().cyan());
    println!("  Press Ctrl-C to cancel a running command.");
    println!();
}

fn print_position(what: &str, outcome: &PositionOutcome) {
    let mark = if outcome.cancelled { "⚠".yellow() } else { "✓".green() };
    println!(
        "  {mark} {what}: {} / {} ticks in {} polls",
        outcome.final_position.to_string().bold(),
        outcome.target_ticks,
        outcome.iterations
    );
}

fn print_turn(outcome: &TurnOutcome) {
    for (i, pass) in outcome.passes.iter().enumerate() {
        let kind = if i == 0 { "turn" } else { "correction" };
        let mark = if pass.cancelled { "⚠".yellow() } else { "✓".green() };
        println!(
            "  {mark} {kind} {}: {:.1}° of {:.1}° (overshoot {:.1}°, {} polls)",
            pass.direction,
            pass.delta,
            pass.destination_degrees,
            pass.overshoot,
            pass.iterations
        );
    }
}

fn print_status(robot: &mut Robot) {
    println!("{}", "Robot Status".bold().underline());
    println!("  Heading        : {:.1}°", robot.heading());
    println!("  Drive encoder  : {}", robot.drive_position());
    println!("  Drive mode     : {}", robot.drive().mode());
    println!("  Lift target    : {}", robot.lift_motor().target_position());
    println!("  Claw target    : {}", robot.claw_motor().target_position());

    let recent = robot.diagnostics().recent();
    let summary: Vec<&StatusLine> = recent
        .lines()
        .iter()
        .filter(|l| l.phase != Phase::Step)
        .collect();
    if !summary.is_empty() {
        println!("  Last command   :");
        for line in summary {
            println!("    {}", line.to_string().dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilerunner_control::{DeviceNames, MotionConfig};
    use tilerunner_hal::SimRegistry;

    fn sim_robot() -> Robot {
        let mut registry = SimRegistry::builder().with_full_robot().build();
        Tilerunner::from_registry(
            &mut registry,
            &DeviceNames::default(),
            MotionConfig::default().without_pauses(),
            SessionDiagnostics::default(),
        )
        .unwrap()
    }

    #[test]
    fn parses_move_with_default_power() {
        assert_eq!(
            parse_command("/move 12").unwrap(),
            Command::Move { inches: 12.0, power: 1.0 }
        );
        assert_eq!(
            parse_command("  /move -6.5 0.4 ").unwrap(),
            Command::Move { inches: -6.5, power: 0.4 }
        );
    }

    #[test]
    fn parses_turn_and_servo_commands() {
        assert_eq!(
            parse_command("/turn -90").unwrap(),
            Command::Turn { degrees: -90.0, power: 0.5 }
        );
        assert_eq!(
            parse_command("/lift 400 1").unwrap(),
            Command::Lift { ticks: 400, power: 1.0 }
        );
        assert_eq!(
            parse_command("/claw -10").unwrap(),
            Command::Claw { ticks: -10, power: 0.5 }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_command("/move").is_err());
        assert!(parse_command("/move far").is_err());
        assert!(parse_command("/move 1 2 3").is_err());
        assert!(parse_command("/move 12 1.5").is_err());
        assert!(parse_command("/lift 2.5").is_err());
        assert!(parse_command("/status now").is_err());
        assert!(parse_command("/dance").is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        for input in ["/turn inf", "/turn -inf", "/turn NaN", "/move infinity", "/move 12 NaN"] {
            assert!(parse_command(input).is_err(), "{input} must be rejected");
        }
        assert!(parse_command("/turn 1e3").is_ok());
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse_command("/quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("/exit").unwrap(), Command::Quit);
    }

    #[test]
    fn session_diagnostics_keeps_current_command_only() {
        let mut robot = sim_robot();
        let flag = RunFlag::new();
        execute(&mut robot, &flag, &Command::Move { inches: 2.0, power: 1.0 }).unwrap();
        assert!(!robot.diagnostics().recent().lines().is_empty());

        robot.diagnostics_mut().start_command();
        assert!(robot.diagnostics().recent().lines().is_empty());
    }

    #[test]
    fn square_returns_to_start_heading() {
        let mut robot = sim_robot();
        let flag = RunFlag::new();
        let start = robot.heading();
        execute(&mut robot, &flag, &Command::Square).unwrap();

        let end = robot.heading();
        let error = (end - start).rem_euclid(360.0);
        assert!(error.min(360.0 - error) < 5.0, "start {start}, end {end}");
    }

    #[test]
    fn stopped_flag_cancels_square() {
        let mut robot = sim_robot();
        let flag = RunFlag::new();
        flag.stop();
        execute(&mut robot, &flag, &Command::Square).unwrap();
        assert!(robot.diagnostics().recent().lines().is_empty());
    }

    #[test]
    fn jewel_reports_unsupported() {
        let mut robot = sim_robot();
        let flag = RunFlag::new();
        let result = execute(&mut robot, &flag, &Command::Jewel);
        assert!(matches!(result, Err(RobotError::Unsupported { .. })));
    }
}
