//! Robot firmware entry point
//!
//! Initializes the system and spawns the collision response tasks.
//!
//! # Executors
//! - Interrupt executor (`SWI_IRQ_0`): bump capture, preempts everything below
//! - Thread executor: collision reactor, drive, crash reporting

#![no_std]
#![no_main]

use crate::task::{
    bump_capture::bump_capture, collision_react::collision_react, crash_report::crash_report,
    drive::drive,
};
use bump_core::CollisionMonitor;
use defmt::info;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use system::resources::{AssignedResources, BumpSensorResources, MotorResources};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Collision latch and crash counter, shared by capture and reactor
static COLLISIONS: CollisionMonitor = CollisionMonitor::new();

/// High priority executor running the bump capture
static EXECUTOR_CAPTURE: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_CAPTURE.on_interrupt()
}

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Start from a clean latch and counter before the capture context exists.
    COLLISIONS.reset();

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    // Capture runs on its own interrupt executor so it can preempt the reactor
    interrupt::SWI_IRQ_0.set_priority(Priority::P2);
    let capture_spawner = EXECUTOR_CAPTURE.start(interrupt::SWI_IRQ_0);
    capture_spawner.spawn(bump_capture(r.bump_sensors, &COLLISIONS)).unwrap();

    // Drive first, so the reactor's first command is picked up
    spawner.spawn(drive(r.motor_driver)).unwrap();
    spawner.spawn(collision_react(&COLLISIONS)).unwrap();
    spawner.spawn(crash_report(&COLLISIONS)).unwrap();

    info!("Collision response running");
}
