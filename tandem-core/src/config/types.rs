//! Configuration type definitions

use heapless::String;

use tandem_hal::{BusConfig, Timeout};
use tandem_protocol::{FrameError, OverflowPolicy};

use crate::engine::{TemplateOutbox, MAX_TEMPLATE_LEN};
use crate::signal::Policy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initiator message template of the first firmware
pub const DEFAULT_INITIATOR_TEMPLATE: &str = "Sender, transmission no. {seq}.";

/// Responder message template of the first firmware
pub const DEFAULT_RESPONDER_TEMPLATE: &str = "Receiver, sending data for transmission no. {seq}.";

/// Signal line wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalConfig {
    /// Ready is signalled by a LOW level
    pub active_low: bool,
}

/// Initiator node settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitiatorConfig {
    /// Per-transaction timeout
    pub timeout_ms: u32,
    /// Pause between cycles
    pub cycle_delay_ms: u32,
    /// Outgoing message template
    pub template: String<MAX_TEMPLATE_LEN>,
    /// What to do when a rendered message does not fit a frame
    pub overflow: OverflowPolicy,
}

impl Default for InitiatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            cycle_delay_ms: 2500,
            template: template(DEFAULT_INITIATOR_TEMPLATE),
            overflow: OverflowPolicy::Truncate,
        }
    }
}

impl InitiatorConfig {
    /// Transaction timeout
    pub fn timeout(&self) -> Timeout {
        Timeout::Millis(self.timeout_ms)
    }

    /// Outbox rendering this node's template
    pub fn outbox(&self) -> Result<TemplateOutbox, FrameError> {
        TemplateOutbox::new(&self.template, self.overflow)
    }
}

/// Responder node settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResponderConfig {
    /// Wait for the Initiator; `None` waits forever
    pub timeout_ms: Option<u32>,
    /// Outgoing message template
    pub template: String<MAX_TEMPLATE_LEN>,
    /// What to do when a rendered message does not fit a frame
    pub overflow: OverflowPolicy,
    /// When to assert the signal line
    pub policy: Policy,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            template: template(DEFAULT_RESPONDER_TEMPLATE),
            overflow: OverflowPolicy::Truncate,
            policy: Policy::WhenStaged,
        }
    }
}

impl ResponderConfig {
    /// Wait bound for each armed pair
    pub fn timeout(&self) -> Timeout {
        match self.timeout_ms {
            Some(ms) => Timeout::Millis(ms),
            None => Timeout::Forever,
        }
    }

    /// Outbox rendering this node's template
    pub fn outbox(&self) -> Result<TemplateOutbox, FrameError> {
        TemplateOutbox::new(&self.template, self.overflow)
    }
}

/// Complete link configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Bus settings, shared by both nodes
    pub bus: BusConfig,
    /// Signal line wiring, shared by both nodes
    pub signal: SignalConfig,
    /// Initiator settings
    pub initiator: InitiatorConfig,
    /// Responder settings
    pub responder: ResponderConfig,
}

/// Reason a configuration is unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Bus frequency is zero
    ZeroFrequency,
    /// Responder queue depth is zero
    ZeroQueueDepth,
    /// Initiator timeout is zero
    ZeroTimeout,
}

impl LinkConfig {
    /// Check cross-field constraints the types cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.bus.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        if self.initiator.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Copy a built-in template; they all fit
fn template(text: &str) -> String<MAX_TEMPLATE_LEN> {
    let mut s = String::new();
    let _ = s.push_str(text);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_hal::Mode;

    #[test]
    fn test_defaults_match_first_firmware() {
        let config = LinkConfig::default();
        assert_eq!(config.bus.frequency, 1_000_000);
        assert_eq!(config.bus.mode, Mode::Mode0);
        assert_eq!(config.bus.queue_depth, 3);
        assert_eq!(config.initiator.cycle_delay_ms, 2500);
        assert_eq!(config.responder.timeout(), Timeout::Forever);
        assert_eq!(config.initiator.template.as_str(), DEFAULT_INITIATOR_TEMPLATE);
        assert_eq!(config.responder.template.as_str(), DEFAULT_RESPONDER_TEMPLATE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = LinkConfig::default();
        config.bus.queue_depth = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueueDepth));

        let mut config = LinkConfig::default();
        config.initiator.timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_outbox_from_config() {
        let config = ResponderConfig::default();
        let frame = {
            use crate::engine::Outbox;
            config.outbox().unwrap().stage(5).unwrap().unwrap()
        };
        assert_eq!(
            frame.as_bytes(),
            b"Receiver, sending data for transmission no. 0005."
        );
    }
}
