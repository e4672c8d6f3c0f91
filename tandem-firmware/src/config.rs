//! Embedded link configuration
//!
//! `link.toml` is compiled into the firmware and validated by the build
//! script. Parsing at boot can still fail if the build script and the
//! parser disagree; the defaults are used then.

use defmt::*;

use tandem_core::config::{parse_config, LinkConfig};

/// Embedded configuration (compiled into firmware)
/// Edit link.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

/// Load the embedded configuration, falling back to defaults
pub fn load_config() -> LinkConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            warn!(
                "link.toml line {}: {}, using defaults",
                e.line, e.kind
            );
            return LinkConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        warn!("link.toml rejected: {}, using defaults", e);
        return LinkConfig::default();
    }

    info!(
        "Link config: {} Hz, {}, queue depth {}, active_low={}",
        config.bus.frequency,
        config.bus.mode,
        config.bus.queue_depth,
        config.signal.active_low
    );
    config
}
