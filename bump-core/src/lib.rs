//! Bump robot collision core
//!
//! Hardware independent part of the collision response:
//! - [`sensor`]: the six contact sensors and their normalized bitmask
//! - [`capture`]: edge polarity arming and the press/release capture handler
//! - [`latch`]: the collision latch shared between capture and reactor, plus the crash counter
//! - [`reactor`]: classification of a latched mask and the resulting motor maneuver
//!
//! # Data flow
//! ```text
//! BumpRing::read ──> EdgeCapture::on_edge ──> CollisionLatch ──> Reactor::poll ──> DriveMotors
//!  (edge event)        (capture context)        (atomic word)     (polling loop)
//! ```
//!
//! Everything here is generic over `embedded-hal` traits, so the firmware plugs in
//! embassy-rp pins and timers while tests plug in fakes.

#![cfg_attr(not(test), no_std)]

pub mod capture;
pub mod latch;
pub mod reactor;
pub mod sensor;

pub use capture::{Capture, EdgeArming, EdgeCapture, TriggerPolarity};
pub use latch::{CollisionLatch, CollisionMonitor};
pub use reactor::{classify, DriveMotors, Handled, Reaction, ReactionConfig, Reactor, Resume};
pub use sensor::{BumpRing, BumpSensor, Impact, SensorGroup, SensorMask, Side, SENSOR_COUNT};
