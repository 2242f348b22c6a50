//! Bump Capture
//!
//! Watches the six bump sensor lines and latches collisions for the reactor.
//!
//! # Execution Context
//! Spawned on the interrupt executor, so it preempts everything running on the
//! thread executor, the collision reactor included. The work done per edge is
//! one read of the ring plus one atomic store: no delays, no motor commands.
//!
//! # Sensor Operation
//! - Switches close to ground; lines use internal pull-ups
//! - A line reads low while pressed, high when released
//! - Each line waits for the edge it is armed for (press or release)

use bump_core::{BumpRing, Capture, CollisionMonitor, EdgeCapture, SENSOR_COUNT};
use defmt::{debug, info};
use embassy_rp::gpio::{Input, Pull};

use crate::system::resources::BumpSensorResources;

/// Bump sensor capture task
///
/// Configures the sensor lines, arms all of them for a press and then handles
/// one edge per loop iteration.
#[embassy_executor::task]
pub async fn bump_capture(r: BumpSensorResources, monitor: &'static CollisionMonitor) {
    let mut ring = BumpRing::new([
        Input::new(r.bump0_pin, Pull::Up),
        Input::new(r.bump1_pin, Pull::Up),
        Input::new(r.bump2_pin, Pull::Up),
        Input::new(r.bump3_pin, Pull::Up),
        Input::new(r.bump4_pin, Pull::Up),
        Input::new(r.bump5_pin, Pull::Up),
    ]);
    let mut capture = EdgeCapture::new();
    info!("Bump capture armed on {} sensors", SENSOR_COUNT);

    loop {
        // GPIO errors are infallible on the RP2350
        let trigger = match ring.wait_for_edge(capture.arming()).await {
            Ok(sensor) => sensor,
            Err(never) => match never {},
        };
        let mask = match ring.read() {
            Ok(mask) => mask,
            Err(never) => match never {},
        };

        match capture.on_edge(mask, monitor.latch()) {
            Capture::Pressed(mask) => {
                debug!("{} edge ({} side): pressed {}", trigger, trigger.side(), mask);
                for sensor in mask.sensors() {
                    debug!("  {} held on the {} side", sensor, sensor.side());
                }
            }
            Capture::Released => debug!("{} edge ({} side): ring clear", trigger, trigger.side()),
        }
    }
}
