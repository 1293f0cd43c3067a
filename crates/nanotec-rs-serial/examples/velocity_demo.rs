// crates/nanotec-rs-serial/examples/velocity_demo.rs
//! Spins a drive in Profile Velocity mode over Modbus RTU.
//!
//! To run this example:
//!   RUST_LOG=info cargo run -p nanotec-rs-serial --example velocity_demo -- /dev/ttyUSB0 [speed]
//!
//! The drive is stopped, switched to Profile Velocity, run at the requested
//! speed for a few seconds, paused, and stopped again.

use log::{error, info};
use nanotec_rs::{DriveConfig, MotorController, Polarity, PowerState};
use nanotec_rs_serial::{RtuSerialTransport, SerialConfig};
use std::{
    env, thread,
    time::{Duration, Instant},
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
const RUN_TIME: Duration = Duration::from_secs(3);
const DEFAULT_SPEED: u32 = 100;

/// Pumps events until the drive reports `expected` or the timeout expires.
fn wait_for(
    motor: &mut MotorController<RtuSerialTransport>,
    expected: PowerState,
) -> Result<(), String> {
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    while Instant::now() < deadline {
        motor.process_events();
        if motor.power_state() == expected && !motor.session().is_polling() {
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
    Err(format!(
        "drive did not reach {} (still {}, target {:?})",
        expected,
        motor.power_state(),
        motor.target_operation()
    ))
}

fn run(port: String, speed: u32) -> Result<(), Box<dyn std::error::Error>> {
    let transport = RtuSerialTransport::open(SerialConfig::with_port(port))?;
    let mut motor = MotorController::new(transport, DriveConfig::default());
    motor.process_events();

    motor.stop_motor()?;
    wait_for(&mut motor, PowerState::SwitchedOff)?;

    motor.initialize_profile_velocity()?;
    motor.process_events();

    info!("Starting at speed {}.", speed);
    motor.start_motor(speed, Polarity::Normal)?;
    wait_for(&mut motor, PowerState::Running)?;

    let until = Instant::now() + RUN_TIME;
    while Instant::now() < until {
        motor.process_events();
        thread::sleep(POLL_INTERVAL);
    }

    motor.pause_motor()?;
    wait_for(&mut motor, PowerState::QuickStop)?;

    motor.stop_motor()?;
    wait_for(&mut motor, PowerState::SwitchedOff)?;
    info!("Drive stopped.");
    Ok(())
}

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(port) = args.next() else {
        eprintln!("usage: velocity_demo <serial-port> [speed]");
        std::process::exit(2);
    };
    let speed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SPEED);

    if let Err(e) = run(port, speed) {
        error!("{}", e);
        std::process::exit(1);
    }
}
