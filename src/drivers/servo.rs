//! Hobby servo on a 50 Hz PWM channel.
//!
//! Angle 0..=180° maps linearly onto a 544–2400 µs pulse inside the 20 ms
//! frame.  Out-of-range requests are clamped here; the command layer does
//! not range-check.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::pwm::SetDutyCycle`: on ESP-IDF an LEDC
//! channel configured for 50 Hz, on the host any mock channel.

use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::error::ActuatorError;

pub const MIN_PULSE_US: u32 = 544;
pub const MAX_PULSE_US: u32 = 2_400;
pub const FRAME_US: u32 = 20_000;
pub const MAX_ANGLE: i32 = 180;

/// Pulse width for `degrees` after clamping to 0..=180.
pub fn pulse_width_us(degrees: i32) -> u32 {
    let angle = degrees.clamp(0, MAX_ANGLE) as u32;
    MIN_PULSE_US + (MAX_PULSE_US - MIN_PULSE_US) * angle / MAX_ANGLE as u32
}

pub struct ServoDriver<P> {
    pwm: P,
    angle: i32,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, angle: 0 }
    }

    /// Move to `degrees` (clamped).  Returns the angle actually applied.
    pub fn set_angle(&mut self, degrees: i32) -> Result<i32, ActuatorError> {
        let angle = degrees.clamp(0, MAX_ANGLE);
        if angle != degrees {
            debug!("Servo: {}° clamped to {}°", degrees, angle);
        }
        let max = u32::from(self.pwm.max_duty_cycle());
        let duty = pulse_width_us(angle) * max / FRAME_US;
        self.pwm
            .set_duty_cycle(duty as u16)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.angle = angle;
        Ok(angle)
    }

    /// Last angle written.
    pub fn angle(&self) -> i32 {
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Channel {
        max: u16,
        duty: u16,
    }

    impl embedded_hal::pwm::ErrorType for Channel {
        type Error = Infallible;
    }

    impl SetDutyCycle for Channel {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn pulse_endpoints() {
        assert_eq!(pulse_width_us(0), 544);
        assert_eq!(pulse_width_us(90), 1_472);
        assert_eq!(pulse_width_us(180), 2_400);
    }

    #[test]
    fn pulse_clamps() {
        assert_eq!(pulse_width_us(-20), 544);
        assert_eq!(pulse_width_us(720), 2_400);
    }

    #[test]
    fn duty_scales_with_resolution() {
        // 14-bit LEDC: 2400 µs / 20 ms × 16383 = 1965
        let mut servo = ServoDriver::new(Channel { max: 16_383, duty: 0 });
        assert_eq!(servo.set_angle(180), Ok(180));
        assert_eq!(servo.pwm.duty, 1_965);
    }

    #[test]
    fn set_angle_reports_clamped_value() {
        let mut servo = ServoDriver::new(Channel { max: 1_000, duty: 0 });
        assert_eq!(servo.set_angle(200), Ok(180));
        assert_eq!(servo.angle(), 180);
        assert_eq!(servo.set_angle(-5), Ok(0));
        // 544 µs of 20 ms at 1000 steps
        assert_eq!(servo.pwm.duty, 27);
    }
}
