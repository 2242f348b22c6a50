//! Edge-Triggered Capture
//!
//! Turns edge events on the bump sensor lines into latched collisions.
//!
//! # Polarity Toggling
//! Every sensor line is armed for exactly one edge at a time:
//! - [`TriggerPolarity::FallingEdge`]: waiting for the switch to close (press)
//! - [`TriggerPolarity::RisingEdge`]: waiting for the switch to open again (release)
//!
//! All lines start armed for a press. A captured press re-arms the pressed lines
//! for their release, and once the whole ring reads clear every line is armed
//! for a press again. This way presses and releases are both seen without
//! polling the lines.
//!
//! # Capture Rules
//! - Non-empty mask: latch the mask as a pending collision
//! - Empty mask: clear the pending collision
//!
//! [`EdgeCapture::on_edge`] never blocks and never touches the motors, so it can
//! run in a context that preempts the reactor.

use crate::latch::CollisionLatch;
use crate::sensor::{BumpSensor, SensorMask, SENSOR_COUNT};

/// Edge a sensor line is currently armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerPolarity {
    /// High to low transition, i.e. the switch closing
    FallingEdge,
    /// Low to high transition, i.e. the switch opening
    RisingEdge,
}

/// Per-sensor trigger polarity table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeArming {
    polarities: [TriggerPolarity; SENSOR_COUNT],
}

impl EdgeArming {
    /// All sensors armed for a press
    pub const fn new() -> Self {
        Self {
            polarities: [TriggerPolarity::FallingEdge; SENSOR_COUNT],
        }
    }

    /// Polarity `sensor` is currently armed for
    pub const fn polarity(&self, sensor: BumpSensor) -> TriggerPolarity {
        self.polarities[sensor.index()]
    }

    /// Arms the pressed sensors for their release and everything else for a press
    pub fn arm_release(&mut self, pressed: SensorMask) {
        for sensor in BumpSensor::ALL {
            self.polarities[sensor.index()] = if pressed.contains(sensor) {
                TriggerPolarity::RisingEdge
            } else {
                TriggerPolarity::FallingEdge
            };
        }
    }

    /// Arms every sensor for a press
    pub fn reset(&mut self) {
        self.polarities = [TriggerPolarity::FallingEdge; SENSOR_COUNT];
    }
}

impl Default for EdgeArming {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single edge event amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capture {
    /// At least one sensor is pressed; the mask was latched
    Pressed(SensorMask),
    /// The ring reads clear; the latch was cleared
    Released,
}

/// Capture handler state, owned by the capture context
#[derive(Debug, Default)]
pub struct EdgeCapture {
    arming: EdgeArming,
}

impl EdgeCapture {
    /// Handler with all sensors armed for a press
    pub const fn new() -> Self {
        Self {
            arming: EdgeArming::new(),
        }
    }

    /// Current arming, used to pick which edge to wait for on each line
    pub fn arming(&self) -> &EdgeArming {
        &self.arming
    }

    /// Handles one edge event
    ///
    /// `mask` is the ring as read right after the edge fired.
    pub fn on_edge(&mut self, mask: SensorMask, latch: &CollisionLatch) -> Capture {
        if mask.is_empty() {
            self.arming.reset();
            latch.release();
            Capture::Released
        } else {
            latch.latch(mask);
            self.arming.arm_release(mask);
            Capture::Pressed(mask)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(sensors: &[BumpSensor]) -> SensorMask {
        sensors.iter().copied().collect()
    }

    #[test]
    fn starts_armed_for_press() {
        let capture = EdgeCapture::new();
        for sensor in BumpSensor::ALL {
            assert_eq!(capture.arming().polarity(sensor), TriggerPolarity::FallingEdge);
        }
    }

    #[test]
    fn press_latches_and_arms_only_pressed_sensors_for_release() {
        let latch = CollisionLatch::new();
        let mut capture = EdgeCapture::new();
        let pressed = mask(&[BumpSensor::Bump1, BumpSensor::Bump3]);

        assert_eq!(capture.on_edge(pressed, &latch), Capture::Pressed(pressed));
        assert!(latch.is_pending());

        for sensor in BumpSensor::ALL {
            let expected = if pressed.contains(sensor) {
                TriggerPolarity::RisingEdge
            } else {
                TriggerPolarity::FallingEdge
            };
            assert_eq!(capture.arming().polarity(sensor), expected, "{:?}", sensor);
        }
        assert_eq!(latch.take(), Some(pressed));
    }

    #[test]
    fn full_release_clears_latch_and_rearms_everything() {
        let latch = CollisionLatch::new();
        let mut capture = EdgeCapture::new();

        capture.on_edge(mask(&[BumpSensor::Bump0, BumpSensor::Bump5]), &latch);
        assert_eq!(capture.on_edge(SensorMask::EMPTY, &latch), Capture::Released);

        assert!(!latch.is_pending());
        assert_eq!(latch.take(), None);
        assert_eq!(*capture.arming(), EdgeArming::new());
    }

    #[test]
    fn partial_release_keeps_remaining_sensor_latched() {
        let latch = CollisionLatch::new();
        let mut capture = EdgeCapture::new();

        capture.on_edge(mask(&[BumpSensor::Bump0, BumpSensor::Bump1]), &latch);
        // Bump0 opens while Bump1 is still held
        let remaining = mask(&[BumpSensor::Bump1]);
        assert_eq!(capture.on_edge(remaining, &latch), Capture::Pressed(remaining));

        assert_eq!(capture.arming().polarity(BumpSensor::Bump0), TriggerPolarity::FallingEdge);
        assert_eq!(capture.arming().polarity(BumpSensor::Bump1), TriggerPolarity::RisingEdge);
        assert_eq!(latch.take(), Some(remaining));
    }

    #[test]
    fn consumed_latch_stays_clear_until_next_press() {
        let latch = CollisionLatch::new();
        let mut capture = EdgeCapture::new();

        capture.on_edge(mask(&[BumpSensor::Bump4]), &latch);
        assert!(latch.take().is_some());
        // release after the reactor already consumed the collision
        capture.on_edge(SensorMask::EMPTY, &latch);
        assert_eq!(latch.take(), None);
    }
}
