//! Signal line controller
//!
//! Thin wrappers over a GPIO pin that translate between electrical levels
//! and [`SignalState`]. Both sides support active-low wiring.

use tandem_hal::{InputPin, OutputPin};

/// Level of the handshake line as seen by the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalState {
    /// Responder is armed with a frame to read
    Ready,
    /// Responder has nothing to offer
    Busy,
}

impl SignalState {
    /// Interpret an electrical level
    pub fn from_level(high: bool, active_low: bool) -> Self {
        if high != active_low {
            SignalState::Ready
        } else {
            SignalState::Busy
        }
    }
}

/// Responder side: drives the line
pub struct SignalLine<P> {
    pin: P,
    /// If true, Ready = pin LOW
    active_low: bool,
    state: SignalState,
}

impl<P: OutputPin> SignalLine<P> {
    /// Take over `pin` and drive it to `Busy`
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut line = Self {
            pin,
            active_low,
            state: SignalState::Busy,
        };
        line.drive(SignalState::Busy);
        line
    }

    /// Signal `Ready`
    pub fn assert(&mut self) {
        self.drive(SignalState::Ready);
    }

    /// Signal `Busy`
    pub fn deassert(&mut self) {
        self.drive(SignalState::Busy);
    }

    /// Last driven state
    pub fn state(&self) -> SignalState {
        self.state
    }

    /// True if currently signalling `Ready`
    pub fn is_asserted(&self) -> bool {
        self.state == SignalState::Ready
    }

    /// Underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    fn drive(&mut self, state: SignalState) {
        self.state = state;
        let ready = state == SignalState::Ready;
        self.pin.set_state(ready != self.active_low);
    }
}

/// Initiator side: samples the line
pub struct SignalSampler<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> SignalSampler<P> {
    /// Wrap an input pin
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Instantaneous level, no debouncing
    pub fn sample(&mut self) -> SignalState {
        SignalState::from_level(self.pin.is_high(), self.active_low)
    }
}
