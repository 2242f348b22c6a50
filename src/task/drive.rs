//! Drive Task Module
//!
//! This module implements the drive control task that manages motor operations.
//! It handles forward/backward motion, turning in place and braking using
//! a TB6612FNG motor driver.
//!
//! # Track Mapping
//! - Motor A: left track
//! - Motor B: right track
//!
//! Turning in place runs both tracks at the same speed in opposite directions.

use crate::system::drive_command::{self, Command};
use crate::system::resources::MotorResources;
use defmt::{debug, info};
use embassy_rp::gpio;
use embassy_rp::pwm;
use embassy_time::{Duration, Timer};
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

/// Motor PWM frequency; cheaper DC motors often work better at lower frequencies
const PWM_FREQUENCY_HZ: u32 = 10_000;

/// Time for the driver to come out of standby before it accepts motion
const STANDBY_WAKE_DELAY: Duration = Duration::from_millis(100);

/// Per-track driver commands for a drive command, as (left, right)
fn track_commands(command: Command) -> (DriveCommand, DriveCommand) {
    match command {
        Command::Forward(speed) => (DriveCommand::Forward(speed), DriveCommand::Forward(speed)),
        Command::Backward(speed) => (DriveCommand::Backward(speed), DriveCommand::Backward(speed)),
        Command::Left(speed) => (DriveCommand::Backward(speed), DriveCommand::Forward(speed)),
        Command::Right(speed) => (DriveCommand::Forward(speed), DriveCommand::Backward(speed)),
        Command::Brake => (DriveCommand::Brake, DriveCommand::Brake),
    }
}

#[embassy_executor::task]
pub async fn drive(r: MotorResources) {
    let sys_hz = embassy_rp::clocks::clk_sys_freq();

    // smallest divider whose counter top still fits the 16-bit register
    let divider = ((sys_hz / PWM_FREQUENCY_HZ) / 65535 + 1) as u8;
    let period = (sys_hz / (PWM_FREQUENCY_HZ * divider as u32)) as u16 - 1;

    // both tracks share one PWM setup
    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    // driver starts in standby until the first motion command
    let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

    // left track on channel A
    let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
    let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
    let left_pwm = pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone());
    let left_motor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

    // right track on channel B
    let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
    let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
    let right_pwm = pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config);
    let right_motor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

    let mut control = Tb6612fng::new(left_motor, right_motor, stby).unwrap();
    info!("Drive ready, PWM divider {} top {}", divider, period);

    loop {
        let command = drive_command::wait().await;

        // only motion wakes the driver from standby
        if command.is_motion() && control.current_standby().unwrap() {
            control.disable_standby().unwrap();
            Timer::after(STANDBY_WAKE_DELAY).await;
        }

        debug!("drive {}", command);
        let (left, right) = track_commands(command);
        control.motor_a.drive(left).unwrap();
        control.motor_b.drive(right).unwrap();
    }
}
