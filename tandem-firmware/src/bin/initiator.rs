//! Tandem Initiator
//!
//! Drives the SPI clock. Each cycle samples the handshake line, then either
//! reads the Responder's frame or writes its own.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tandem_core::{InitiatorEngine, SignalSampler};
use tandem_firmware::board;
use tandem_firmware::config::load_config;
use tandem_firmware::tasks::{self, Initiator};
use tandem_hal::EhInput;

static ENGINE: StaticCell<Initiator> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tandem initiator starting...");

    let p = embassy_rp::init(Default::default());
    let config = load_config();

    let board = board::initiator(p, &config);
    let sampler = SignalSampler::new(EhInput::new(board.handshake), config.signal.active_low);
    let outbox = unwrap!(config.initiator.outbox());

    let engine = ENGINE.init(InitiatorEngine::new(
        board.link,
        sampler,
        outbox,
        config.initiator.timeout(),
    ));

    spawner
        .spawn(tasks::initiator_task(engine, config.initiator.cycle_delay_ms))
        .unwrap();

    info!("Initiator running, one cycle every {} ms", config.initiator.cycle_delay_ms);
}
