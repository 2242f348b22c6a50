//! Collision Classifier & Reactor
//!
//! Consumes latched collisions and drives the robot away from the obstacle.
//!
//! # Reaction Sequence
//! 1. Stop immediately and count the crash
//! 2. Pause briefly so the robot settles
//! 3. Run the maneuver picked by [`classify`]
//! 4. Halt or resume forward motion, see [`Resume`]
//!
//! # Decision Policy
//! | Pressed sensors         | Reaction                                          |
//! |-------------------------|---------------------------------------------------|
//! | both sides              | brief reverse, large turn toward the lighter side |
//! | one side, two or more   | reverse, large turn away from that side           |
//! | one side, single sensor | small turn away from that side                    |
//! | none                    | brief reverse only                                |
//!
//! A head-on hit with the same count on both sides turns left.
//!
//! The reactor may sleep while maneuvering. Collisions captured meanwhile stay
//! latched and are picked up by the next [`Reactor::poll`].

use embedded_hal_async::delay::DelayNs;

use crate::latch::CollisionMonitor;
use crate::sensor::{Impact, SensorMask, Side};

/// Motor commands the reactor issues
///
/// Commands are fire-and-forget: each one starts a motion that continues
/// until the next command. The reactor times them with its delay source.
pub trait DriveMotors {
    /// Stop all motion
    fn stop(&mut self);
    /// Drive straight backward
    fn reverse(&mut self);
    /// Turn in place toward `side`
    fn turn(&mut self, side: Side);
    /// Drive straight forward
    fn forward(&mut self);
}

/// Maneuver chosen for a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reaction {
    /// Back off only; the hit could not be attributed to a side
    Reverse,
    /// Small corrective turn toward the given side, no backing off
    Nudge(Side),
    /// Back off, then large turn toward the given side
    Evade(Side),
}

impl Reaction {
    /// True if the maneuver starts by backing off
    pub const fn reverses(&self) -> bool {
        matches!(self, Reaction::Reverse | Reaction::Evade(_))
    }

    /// Side the maneuver turns toward, if it turns at all
    pub const fn turn(&self) -> Option<Side> {
        match self {
            Reaction::Reverse => None,
            Reaction::Nudge(side) | Reaction::Evade(side) => Some(*side),
        }
    }
}

/// Picks the maneuver for a latched sensor mask
pub fn classify(mask: SensorMask) -> Reaction {
    let group = mask.group();
    let (left, right) = (group.left_count(), group.right_count());

    match group.impact() {
        // head-on: away from the heavier side, left on a tie
        Impact::Center if left > right => Reaction::Evade(Side::Right),
        Impact::Center => Reaction::Evade(Side::Left),
        Impact::Left => away_from(Side::Left, left),
        Impact::Right => away_from(Side::Right, right),
        Impact::Unattributed => Reaction::Reverse,
    }
}

/// Single-sided hit with `count` sensors pressed on `hit`
fn away_from(hit: Side, count: u8) -> Reaction {
    if count >= 2 {
        Reaction::Evade(hit.opposite())
    } else {
        Reaction::Nudge(hit.opposite())
    }
}

/// What the robot does once a maneuver is done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resume {
    /// Stop and stay put
    Halt,
    /// Continue driving forward
    Forward,
}

/// Maneuver timing, all durations in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReactionConfig {
    /// Pause after the immediate stop
    pub settle_ms: u32,
    /// Duration of backing off after a one-sided hit
    pub reverse_ms: u32,
    /// Duration of the short back-off after a head-on or unattributed hit
    pub brief_reverse_ms: u32,
    /// Duration of a small corrective turn
    pub small_turn_ms: u32,
    /// Duration of a large turn
    pub large_turn_ms: u32,
    /// Behaviour after the maneuver
    pub resume: Resume,
}

impl ReactionConfig {
    pub const DEFAULT: ReactionConfig = ReactionConfig {
        settle_ms: 500,
        reverse_ms: 1000,
        brief_reverse_ms: 100,
        small_turn_ms: 300,
        large_turn_ms: 1000,
        resume: Resume::Halt,
    };
}

impl ReactionConfig {
    /// How long to back off for a hit of the given geometry
    pub const fn reverse_duration(&self, impact: Impact) -> u32 {
        match impact {
            Impact::Center | Impact::Unattributed => self.brief_reverse_ms,
            Impact::Left | Impact::Right => self.reverse_ms,
        }
    }
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Summary of one handled collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handled {
    /// Mask taken from the latch
    pub mask: SensorMask,
    /// Geometry of the hit
    pub impact: Impact,
    /// Maneuver that was run
    pub reaction: Reaction,
    /// Crash counter after this collision
    pub crash_count: u32,
}

/// Collision consumer, polled from the control loop
pub struct Reactor<'a> {
    monitor: &'a CollisionMonitor,
    config: ReactionConfig,
}

impl<'a> Reactor<'a> {
    pub fn new(monitor: &'a CollisionMonitor, config: ReactionConfig) -> Self {
        Self { monitor, config }
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    /// Handles the pending collision, if any
    ///
    /// Returns `None` without touching the motors when nothing is latched.
    /// Otherwise runs the complete reaction before returning.
    pub async fn poll<M, D>(&self, motors: &mut M, delay: &mut D) -> Option<Handled>
    where
        M: DriveMotors,
        D: DelayNs,
    {
        let mask = self.monitor.latch().take()?;

        motors.stop();
        let crash_count = self.monitor.record_crash();
        delay.delay_ms(self.config.settle_ms).await;

        let impact = mask.group().impact();
        let reaction = classify(mask);
        self.run(reaction, impact, motors, delay).await;

        match self.config.resume {
            Resume::Halt => motors.stop(),
            Resume::Forward => motors.forward(),
        }

        Some(Handled {
            mask,
            impact,
            reaction,
            crash_count,
        })
    }

    async fn run<M, D>(&self, reaction: Reaction, impact: Impact, motors: &mut M, delay: &mut D)
    where
        M: DriveMotors,
        D: DelayNs,
    {
        if reaction.reverses() {
            motors.reverse();
            delay.delay_ms(self.config.reverse_duration(impact)).await;
        }
        if let Some(side) = reaction.turn() {
            motors.turn(side);
            let turn_ms = match reaction {
                Reaction::Nudge(_) => self.config.small_turn_ms,
                _ => self.config.large_turn_ms,
            };
            delay.delay_ms(turn_ms).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::BumpSensor::{self, *};

    fn mask(sensors: &[BumpSensor]) -> SensorMask {
        sensors.iter().copied().collect()
    }

    #[test]
    fn every_mask_gets_a_reaction_matching_the_policy() {
        for bits in 0..=SensorMask::VALID_BITS {
            let mask = SensorMask::from_bits(bits);
            let group = mask.group();
            let (left, right) = (group.left_count(), group.right_count());
            let reaction = classify(mask);

            match (left, right) {
                (0, 0) => assert_eq!(reaction, Reaction::Reverse),
                (1, 0) => assert_eq!(reaction, Reaction::Nudge(Side::Right)),
                (_, 0) => assert_eq!(reaction, Reaction::Evade(Side::Right)),
                (0, 1) => assert_eq!(reaction, Reaction::Nudge(Side::Left)),
                (0, _) => assert_eq!(reaction, Reaction::Evade(Side::Left)),
                (l, r) if l > r => assert_eq!(reaction, Reaction::Evade(Side::Right)),
                _ => assert_eq!(reaction, Reaction::Evade(Side::Left)),
            }
        }
    }

    #[test]
    fn fallback_never_turns() {
        assert_eq!(classify(SensorMask::EMPTY).turn(), None);
        assert!(classify(SensorMask::EMPTY).reverses());
    }

    #[test]
    fn single_sided_hits_turn_away() {
        assert_eq!(classify(mask(&[Bump2])), Reaction::Nudge(Side::Right));
        assert_eq!(classify(mask(&[Bump1, Bump2])), Reaction::Evade(Side::Right));
        assert_eq!(classify(mask(&[Bump0, Bump1, Bump2])), Reaction::Evade(Side::Right));
        assert_eq!(classify(mask(&[Bump5])), Reaction::Nudge(Side::Left));
        assert_eq!(classify(mask(&[Bump3, Bump5])), Reaction::Evade(Side::Left));
    }

    #[test]
    fn center_hits_turn_toward_lighter_side() {
        assert_eq!(classify(mask(&[Bump0, Bump3])), Reaction::Evade(Side::Left));
        assert_eq!(classify(mask(&[Bump0, Bump1, Bump3])), Reaction::Evade(Side::Right));
        assert_eq!(classify(mask(&[Bump0, Bump3, Bump4])), Reaction::Evade(Side::Left));
        let all = SensorMask::from_bits(SensorMask::VALID_BITS);
        assert_eq!(classify(all), Reaction::Evade(Side::Left));
        assert!(classify(mask(&[Bump2, Bump5])).reverses());
    }

    #[test]
    fn head_on_and_unattributed_hits_back_off_briefly() {
        let config = ReactionConfig::DEFAULT;
        assert_eq!(config.reverse_duration(Impact::Center), config.brief_reverse_ms);
        assert_eq!(config.reverse_duration(Impact::Unattributed), config.brief_reverse_ms);
        assert_eq!(config.reverse_duration(Impact::Left), config.reverse_ms);
        assert_eq!(config.reverse_duration(Impact::Right), config.reverse_ms);
    }

    #[test]
    fn nudge_does_not_reverse() {
        let nudge = Reaction::Nudge(Side::Left);
        assert!(!nudge.reverses());
        assert_eq!(nudge.turn(), Some(Side::Left));
    }
}
