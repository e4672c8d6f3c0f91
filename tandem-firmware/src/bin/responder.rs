//! Tandem Responder
//!
//! Follows the Initiator's clock on PIO. Each cycle arms a fresh frame and
//! raises the handshake line when the policy says there is something to
//! read.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::Common;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tandem_core::{ResponderEngine, SignalLine};
use tandem_firmware::board::{self, ResponderBoard};
use tandem_firmware::config::load_config;
use tandem_firmware::tasks::{self, Responder};
use tandem_hal::EhOutput;

static ENGINE: StaticCell<Responder> = StaticCell::new();
static PIO_COMMON: StaticCell<Common<'static, PIO0>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tandem responder starting...");

    let p = embassy_rp::init(Default::default());
    let config = load_config();

    let ResponderBoard {
        link,
        handshake,
        common,
    } = unwrap!(board::responder(p, &config));
    // The PIO block must outlive the state machine
    PIO_COMMON.init(common);

    // Start at the Busy level
    let active_low = config.signal.active_low;
    let signal = SignalLine::new(EhOutput::new(handshake, active_low), active_low);
    let outbox = unwrap!(config.responder.outbox());

    let engine = ENGINE.init(ResponderEngine::new(
        link,
        signal,
        outbox,
        config.responder.policy.clone(),
        config.responder.timeout(),
    ));

    spawner.spawn(tasks::responder_task(engine)).unwrap();

    info!("Responder running, policy {}", config.responder.policy);
}
