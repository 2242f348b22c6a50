//! Hardware Resource Management
//!
//! Allocates the RP2350 pins and peripherals to the tasks that own them.
//!
//! # Resource Groups
//! - Bump Sensors: six contact switches, wired to ground, read with internal pull-ups
//! - Motor Control: TB6612FNG dual motor driver pins and PWM channels
//!
//! Nothing is shared between tasks at the pin level. The bump sensor lines are
//! owned by the capture task, the motor driver pins by the drive task.

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// Bump sensor contact lines, in `BumpSensor` order (Bump0..Bump5)
    bump_sensors: BumpSensorResources {
        bump0_pin: PIN_10,
        bump1_pin: PIN_11,
        bump2_pin: PIN_12,
        bump3_pin: PIN_13,
        bump4_pin: PIN_14,
        bump5_pin: PIN_15,
    },
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorResources {
        standby_pin: PIN_22,
        // Motor drive PWM
        left_slice: PWM_SLICE6,
        left_pwm_pin: PIN_28,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        // Motor drive PWM
        right_slice: PWM_SLICE5,
        right_pwm_pin: PIN_27,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
}
