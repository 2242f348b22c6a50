//! Drive Commands
//!
//! Hand-off from the collision reactor to the drive task. The reactor posts
//! absolute track motions (cruise, back off, spin in place, brake) and the
//! drive task applies them to the motor driver.
//!
//! A newer command replaces one the drive task has not picked up yet, so the
//! tracks always follow the latest step of a maneuver.

use bump_core::{DriveMotors, Side};
use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Forward speed while exploring (0-100)
const CRUISE_SPEED: u8 = 50;

/// Backward speed when backing off an obstacle (0-100)
const REVERSE_SPEED: u8 = 60;

/// Track speed for turning in place (0-100)
const TURN_SPEED: u8 = 70;

/// Latest drive command not yet applied by the drive task
pub static DRIVE: Signal<CriticalSectionRawMutex, Command> = Signal::new();

/// Posts `command`, replacing any command still waiting to be applied
///
/// Never blocks, so the reactor can call it between its timed steps.
pub fn update(command: Command) {
    DRIVE.signal(command);
}

/// Next command for the motor driver
pub async fn wait() -> Command {
    DRIVE.wait().await
}

/// Track motions, speeds in percent of full PWM duty
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum Command {
    /// Spin counterclockwise in place, tracks running opposite ways
    Left(u8),
    /// Spin clockwise in place
    Right(u8),
    /// Both tracks forward
    Forward(u8),
    /// Both tracks backward
    Backward(u8),
    /// Short both motors, stopping the tracks at once
    Brake,
}

impl Command {
    /// True for commands that need the motor driver out of standby
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Command::Left(_) | Command::Right(_) | Command::Forward(_) | Command::Backward(_)
        )
    }
}

/// Motor collaborator for the collision reactor, backed by the drive signal
#[derive(Debug, Default)]
pub struct SignalledDrive;

impl DriveMotors for SignalledDrive {
    fn stop(&mut self) {
        update(Command::Brake);
    }

    fn reverse(&mut self) {
        update(Command::Backward(REVERSE_SPEED));
    }

    fn turn(&mut self, side: Side) {
        update(match side {
            Side::Left => Command::Left(TURN_SPEED),
            Side::Right => Command::Right(TURN_SPEED),
        });
    }

    fn forward(&mut self) {
        update(Command::Forward(CRUISE_SPEED));
    }
}
