//! Bump Sensor Interface
//!
//! Six discrete contact switches arranged in a ring at the front of the robot.
//!
//! # Sensor Operation
//! - Each switch closes to ground and its line is biased with a pull-up
//! - A line reads low (0) while the switch is pressed, high (1) when released
//! - [`BumpRing::read`] inverts this, so a set bit in [`SensorMask`] means "pressed"
//!
//! # Geometry
//! ```text
//!            front
//!   Bump2 Bump1 Bump0 | Bump3 Bump4 Bump5
//!   └──── left ─────┘   └──── right ────┘
//! ```
//! Bump0 and Bump3 sit next to the centerline, Bump2 and Bump5 on the outer corners.

use core::fmt;

use embassy_futures::select::select_array;
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::capture::{EdgeArming, TriggerPolarity};

/// Number of bump sensors in the ring
pub const SENSOR_COUNT: usize = 6;

/// Individual bump sensors, numbered by their bit position in [`SensorMask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BumpSensor {
    Bump0,
    Bump1,
    Bump2,
    Bump3,
    Bump4,
    Bump5,
}

impl BumpSensor {
    /// All sensors in bit order
    pub const ALL: [BumpSensor; SENSOR_COUNT] = [
        BumpSensor::Bump0,
        BumpSensor::Bump1,
        BumpSensor::Bump2,
        BumpSensor::Bump3,
        BumpSensor::Bump4,
        BumpSensor::Bump5,
    ];

    /// Bit position of this sensor in a [`SensorMask`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this sensor
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Side of the robot this sensor is mounted on
    pub const fn side(self) -> Side {
        match self {
            BumpSensor::Bump0 | BumpSensor::Bump1 | BumpSensor::Bump2 => Side::Left,
            BumpSensor::Bump3 | BumpSensor::Bump4 | BumpSensor::Bump5 => Side::Right,
        }
    }
}

/// Left or right half of the robot
///
/// Used both for where sensors sit and for which way a turn goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The other side
    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Snapshot of which sensors are pressed, one bit per [`BumpSensor`]
///
/// Only the low six bits are ever set.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorMask(u8);

impl SensorMask {
    /// Bits that map to a physical sensor
    pub const VALID_BITS: u8 = (1 << SENSOR_COUNT) - 1;

    /// Mask with no sensor pressed
    pub const EMPTY: SensorMask = SensorMask(0);

    const LEFT_BITS: u8 = Self::side_bits(Side::Left);
    const RIGHT_BITS: u8 = Self::side_bits(Side::Right);

    /// Bits of all sensors mounted on `side`
    const fn side_bits(side: Side) -> u8 {
        let mut bits = 0;
        let mut i = 0;
        while i < SENSOR_COUNT {
            let sensor = BumpSensor::ALL[i];
            if sensor.side() as u8 == side as u8 {
                bits |= sensor.bit();
            }
            i += 1;
        }
        bits
    }

    /// Builds a mask from raw bits, dropping anything above bit 5
    pub const fn from_bits(bits: u8) -> Self {
        SensorMask(bits & Self::VALID_BITS)
    }

    /// Raw bits of the mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if no sensor is pressed
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if `sensor` is pressed in this snapshot
    pub const fn contains(self, sensor: BumpSensor) -> bool {
        self.0 & sensor.bit() != 0
    }

    /// Copy of this mask with `sensor` marked as pressed
    pub const fn with(self, sensor: BumpSensor) -> Self {
        SensorMask(self.0 | sensor.bit())
    }

    /// Number of pressed sensors
    pub const fn count(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Pressed sensors in bit order
    pub fn sensors(self) -> impl Iterator<Item = BumpSensor> {
        BumpSensor::ALL.into_iter().filter(move |sensor| self.contains(*sensor))
    }

    /// Splits the mask into its left and right halves
    pub const fn group(self) -> SensorGroup {
        SensorGroup {
            left: SensorMask(self.0 & Self::LEFT_BITS),
            right: SensorMask(self.0 & Self::RIGHT_BITS),
        }
    }
}

impl FromIterator<BumpSensor> for SensorMask {
    fn from_iter<I: IntoIterator<Item = BumpSensor>>(iter: I) -> Self {
        iter.into_iter().fold(SensorMask::EMPTY, SensorMask::with)
    }
}

impl fmt::Debug for SensorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorMask({:#08b})", self.0)
    }
}

/// Per-side partition of a [`SensorMask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorGroup {
    /// Pressed sensors on the left half (Bump0..Bump2)
    pub left: SensorMask,
    /// Pressed sensors on the right half (Bump3..Bump5)
    pub right: SensorMask,
}

impl SensorGroup {
    /// Number of pressed sensors on the left
    pub const fn left_count(&self) -> u8 {
        self.left.count()
    }

    /// Number of pressed sensors on the right
    pub const fn right_count(&self) -> u8 {
        self.right.count()
    }

    /// Rough geometry of the hit
    pub const fn impact(&self) -> Impact {
        match (self.left.is_empty(), self.right.is_empty()) {
            (false, false) => Impact::Center,
            (false, true) => Impact::Left,
            (true, false) => Impact::Right,
            (true, true) => Impact::Unattributed,
        }
    }
}

/// Where the robot was hit, derived from which halves of the ring fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Impact {
    /// Sensors on both halves pressed (head-on obstacle)
    Center,
    /// Only left sensors pressed
    Left,
    /// Only right sensors pressed
    Right,
    /// Latched without any pressed sensor
    Unattributed,
}

/// The six bump sensor input lines, in [`BumpSensor`] order
///
/// Pins are expected to be configured as inputs with pull-ups before they are
/// handed over (see the firmware's capture task).
pub struct BumpRing<P> {
    pins: [P; SENSOR_COUNT],
}

impl<P: InputPin> BumpRing<P> {
    /// Takes ownership of the sensor pins, index `i` being `BumpSensor::ALL[i]`
    pub fn new(pins: [P; SENSOR_COUNT]) -> Self {
        Self { pins }
    }

    /// Samples all six lines and returns the pressed sensors
    ///
    /// The lines are active low; the returned mask is active high.
    pub fn read(&mut self) -> Result<SensorMask, P::Error> {
        let mut mask = SensorMask::EMPTY;
        for (pin, sensor) in self.pins.iter_mut().zip(BumpSensor::ALL) {
            if pin.is_low()? {
                mask = mask.with(sensor);
            }
        }
        Ok(mask)
    }
}

impl<P: InputPin + Wait> BumpRing<P> {
    /// Waits until any sensor line sees the edge it is currently armed for
    ///
    /// Falling-edge armed lines wake on a press, rising-edge armed lines on a release.
    /// Returns the sensor whose line transitioned first.
    pub async fn wait_for_edge(&mut self, arming: &EdgeArming) -> Result<BumpSensor, P::Error> {
        let mut next = 0;
        let waits = self.pins.each_mut().map(|pin| {
            let polarity = arming.polarity(BumpSensor::ALL[next]);
            next += 1;
            async move {
                match polarity {
                    TriggerPolarity::FallingEdge => pin.wait_for_falling_edge().await,
                    TriggerPolarity::RisingEdge => pin.wait_for_rising_edge().await,
                }
            }
        });
        let (result, index) = select_array(waits).await;
        result?;
        Ok(BumpSensor::ALL[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;

    /// Contact line fake: `low` is the electrical level, `edge` the edge it will report
    #[derive(Default)]
    struct FakeLine {
        low: bool,
        edge: Option<TriggerPolarity>,
    }

    impl embedded_hal::digital::ErrorType for FakeLine {
        type Error = Infallible;
    }

    impl InputPin for FakeLine {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(!self.low)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(self.low)
        }
    }

    impl FakeLine {
        async fn report(&mut self, polarity: TriggerPolarity) -> Result<(), Infallible> {
            if self.edge == Some(polarity) {
                Ok(())
            } else {
                core::future::pending().await
            }
        }
    }

    impl Wait for FakeLine {
        async fn wait_for_high(&mut self) -> Result<(), Infallible> {
            core::future::pending().await
        }

        async fn wait_for_low(&mut self) -> Result<(), Infallible> {
            core::future::pending().await
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
            self.report(TriggerPolarity::RisingEdge).await
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
            self.report(TriggerPolarity::FallingEdge).await
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
            core::future::pending().await
        }
    }

    fn ring() -> BumpRing<FakeLine> {
        BumpRing::new(Default::default())
    }

    #[test]
    fn read_inverts_active_low_lines() {
        let mut ring = ring();
        assert_eq!(ring.read(), Ok(SensorMask::EMPTY));

        ring.pins[1].low = true;
        ring.pins[4].low = true;
        let mask = ring.read().unwrap();
        assert_eq!(mask.bits(), 0b01_0010);
        assert!(mask.contains(BumpSensor::Bump1));
        assert!(mask.contains(BumpSensor::Bump4));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn from_bits_drops_unknown_positions() {
        assert_eq!(SensorMask::from_bits(0xFF).bits(), 0b11_1111);
        assert!(SensorMask::from_bits(0b1100_0000).is_empty());
    }

    #[test]
    fn group_partitions_by_side() {
        let mask: SensorMask = [BumpSensor::Bump0, BumpSensor::Bump2, BumpSensor::Bump5]
            .into_iter()
            .collect();
        let group = mask.group();
        assert_eq!(group.left_count(), 2);
        assert_eq!(group.right_count(), 1);
        assert_eq!(group.left.bits() | group.right.bits(), mask.bits());
        assert_eq!(group.impact(), Impact::Center);

        for sensor in BumpSensor::ALL {
            let single = SensorMask::EMPTY.with(sensor).group();
            match sensor.side() {
                Side::Left => assert_eq!(single.impact(), Impact::Left),
                Side::Right => assert_eq!(single.impact(), Impact::Right),
            }
        }
        assert_eq!(SensorMask::EMPTY.group().impact(), Impact::Unattributed);
    }

    #[test]
    fn sensors_iterates_pressed_in_bit_order() {
        let mask = SensorMask::from_bits(0b10_1001);
        let pressed: Vec<_> = mask.sensors().collect();
        assert_eq!(pressed, [BumpSensor::Bump0, BumpSensor::Bump3, BumpSensor::Bump5]);
    }

    #[test]
    fn wait_for_edge_honours_arming() {
        let mut ring = ring();
        let mut arming = EdgeArming::new();

        // Bump2 reports a rising edge, which nobody listens for yet; Bump4 a falling one
        ring.pins[2].edge = Some(TriggerPolarity::RisingEdge);
        ring.pins[4].edge = Some(TriggerPolarity::FallingEdge);
        assert_eq!(block_on(ring.wait_for_edge(&arming)), Ok(BumpSensor::Bump4));

        // Once Bump2 is armed for release and Bump4 is quiet, Bump2 wins
        arming.arm_release(SensorMask::EMPTY.with(BumpSensor::Bump2));
        ring.pins[4].edge = None;
        assert_eq!(block_on(ring.wait_for_edge(&arming)), Ok(BumpSensor::Bump2));
    }
}
