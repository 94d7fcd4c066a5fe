//! PWM-backed drivers built on `embedded-hal`'s [`SetDutyCycle`].

use embedded_hal::pwm::SetDutyCycle;

use crate::driver::{LightDriver, MotorDriver};
use crate::types::{Color, DecayMode};

/// RGB light on three PWM channels.
pub struct PwmRgbLight<P: SetDutyCycle> {
    red: P,
    green: P,
    blue: P,
    common_anode: bool,
}

impl<P: SetDutyCycle> PwmRgbLight<P> {
    /// Wraps three PWM channels. With `common_anode` the duty is inverted,
    /// since the LED lights while its pin is low.
    pub fn new(red: P, green: P, blue: P, common_anode: bool) -> Self {
        Self {
            red,
            green,
            blue,
            common_anode,
        }
    }

    /// Releases the PWM channels.
    pub fn release(self) -> (P, P, P) {
        (self.red, self.green, self.blue)
    }

    fn write(channel: &mut P, value: u8, common_anode: bool) -> Result<(), P::Error> {
        let max_duty = channel.max_duty_cycle();
        let duty = (u32::from(value) * u32::from(max_duty) / 255) as u16;

        if common_anode {
            channel.set_duty_cycle(max_duty - duty)
        } else {
            channel.set_duty_cycle(duty)
        }
    }
}

impl<P: SetDutyCycle> LightDriver for PwmRgbLight<P> {
    type Error = P::Error;

    fn set_color(&mut self, color: Color) -> Result<(), Self::Error> {
        Self::write(&mut self.red, color.red, self.common_anode)?;
        Self::write(&mut self.green, color.green, self.common_anode)?;
        Self::write(&mut self.blue, color.blue, self.common_anode)
    }
}

/// Brushed DC motor on an H-bridge driven by two PWM channels.
///
/// A throttle of exactly zero brakes the motor (both sides fully on); use
/// [`coast`](Self::coast) to let it spin freely.
pub struct PwmDcMotor<P: SetDutyCycle> {
    positive: P,
    negative: P,
    decay_mode: DecayMode,
}

impl<P: SetDutyCycle> PwmDcMotor<P> {
    /// Wraps the two bridge inputs. Starts in fast decay; nothing is
    /// written until the first call.
    pub fn new(positive: P, negative: P) -> Self {
        Self {
            positive,
            negative,
            decay_mode: DecayMode::Fast,
        }
    }

    /// Returns the current decay mode.
    pub fn decay_mode(&self) -> DecayMode {
        self.decay_mode
    }

    /// Turns both bridge inputs off.
    pub fn coast(&mut self) -> Result<(), P::Error> {
        self.positive.set_duty_cycle_fully_off()?;
        self.negative.set_duty_cycle_fully_off()
    }

    /// Releases the PWM channels.
    pub fn release(self) -> (P, P) {
        (self.positive, self.negative)
    }
}

impl<P: SetDutyCycle> MotorDriver for PwmDcMotor<P> {
    type Error = P::Error;

    fn set_throttle(&mut self, throttle: f32) -> Result<(), Self::Error> {
        let throttle = throttle.clamp(-1.0, 1.0);

        if throttle == 0.0 {
            self.positive.set_duty_cycle_fully_on()?;
            return self.negative.set_duty_cycle_fully_on();
        }

        let max_duty = self.positive.max_duty_cycle();
        let duty = (throttle.abs() * f32::from(max_duty)) as u16;
        let reverse = throttle < 0.0;

        let (positive, negative) = match (self.decay_mode, reverse) {
            (DecayMode::Slow, false) => (max_duty, max_duty - duty),
            (DecayMode::Slow, true) => (max_duty - duty, max_duty),
            (DecayMode::Fast, false) => (duty, 0),
            (DecayMode::Fast, true) => (0, duty),
        };

        self.positive.set_duty_cycle(positive)?;
        self.negative.set_duty_cycle(negative)
    }

    fn set_decay_mode(&mut self, mode: DecayMode) -> Result<(), Self::Error> {
        self.decay_mode = mode;
        Ok(())
    }
}
