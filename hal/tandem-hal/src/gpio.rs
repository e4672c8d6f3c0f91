//! GPIO pin abstractions
//!
//! The handshake line is a single dedicated pin: an output on the
//! Responder, an input on the Initiator. Chip HALs can implement these
//! traits directly, or wrap any embedded-hal 1.0 pin in [`EhOutput`] /
//! [`EhInput`].

use embedded_hal::digital;

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
///
/// Takes `&mut self` because embedded-hal 1.0 input reads do.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&mut self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// Adapter from an embedded-hal output pin
///
/// The last written level is cached so `is_set_high` can stay `&self`.
/// Pin errors are dropped: GPIO writes on the supported chips are
/// infallible.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin> EhOutput<P> {
    /// Wrap a pin and drive it to `initial_high`
    pub fn new(pin: P, initial_high: bool) -> Self {
        let mut out = Self {
            pin,
            high: !initial_high,
        };
        out.set_state(initial_high);
        out
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Adapter from an embedded-hal input pin
///
/// A read error is reported as low.
pub struct EhInput<P> {
    pin: P,
}

impl<P: digital::InputPin> EhInput<P> {
    /// Wrap an input pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::InputPin> InputPin for EhInput<P> {
    fn is_high(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}
