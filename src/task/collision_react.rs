//! Collision Reactor Task
//!
//! Polls the collision latch and runs the avoidance maneuver for each collision.
//!
//! # Behavior
//! - Starts the robot cruising forward
//! - Checks the latch every `POLL_PERIOD`
//! - On a collision: stop, settle, back off and/or turn, then cruise on
//!
//! Maneuvers run to completion. Collisions latched meanwhile are handled on the
//! next poll, coalesced into the most recent one.

use bump_core::{CollisionMonitor, DriveMotors, ReactionConfig, Reactor, Resume};
use defmt::info;
use embassy_time::{Delay, Duration, Ticker};

use crate::system::drive_command::SignalledDrive;

/// Latch polling period, well below the duration of a bump
const POLL_PERIOD: Duration = Duration::from_millis(10);

/// Maneuver timing; the robot keeps exploring after each collision
const REACTION: ReactionConfig = ReactionConfig {
    resume: Resume::Forward,
    ..ReactionConfig::DEFAULT
};

/// Collision reactor task
#[embassy_executor::task]
pub async fn collision_react(monitor: &'static CollisionMonitor) {
    let reactor = Reactor::new(monitor, REACTION);
    let mut motors = SignalledDrive;
    let mut delay = Delay;
    info!("Collision reactor started: {}", reactor.config());

    motors.forward();

    let mut ticker = Ticker::every(POLL_PERIOD);
    loop {
        ticker.next().await;

        if let Some(handled) = reactor.poll(&mut motors, &mut delay).await {
            info!(
                "Collision #{}: {} hit, sensors {}, reaction {}",
                handled.crash_count, handled.impact, handled.mask, handled.reaction
            );
            // skip the ticks missed while maneuvering
            ticker.reset();
        }
    }
}
