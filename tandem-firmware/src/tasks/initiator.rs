//! Initiator task
//!
//! Runs one engine cycle per tick. The direction follows the handshake
//! line sampled at the start of each cycle.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_rp::peripherals::SPI0;
use embassy_time::{Duration, Ticker};

use tandem_core::{Direction, InitiatorEngine, InitiatorReport, TemplateOutbox};
use tandem_hal::EhInput;
use tandem_hal_rp2040::Rp2040Initiator;
use tandem_protocol::{decode, DecodedFrame};

/// Initiator engine as wired on the board
pub type Initiator =
    InitiatorEngine<Rp2040Initiator<'static, SPI0>, EhInput<Input<'static>>, TemplateOutbox>;

/// Initiator task
#[embassy_executor::task]
pub async fn initiator_task(engine: &'static mut Initiator, cycle_delay_ms: u32) {
    info!("Initiator task started");

    let mut ticker = Ticker::every(Duration::from_millis(cycle_delay_ms as u64));

    loop {
        let report = engine.run_cycle(&mut |_, frame: DecodedFrame<'_>| {
            info!("Received: {}", frame);
        });
        log_report(&report);

        ticker.next().await;
    }
}

fn log_report(report: &InitiatorReport) {
    match (report.direction, &report.outgoing) {
        (Direction::Read, _) => debug!("#{} READ", report.cycle),
        (Direction::Write, Some(frame)) => {
            debug!("#{} WRITE ->{}", report.cycle, decode(frame.as_bytes()))
        }
        (Direction::Write, None) => debug!("#{} WRITE", report.cycle),
    }

    if let Some(failure) = report.staging {
        warn!("#{} frame not staged: {}", report.cycle, failure);
    }
    if let Some(failure) = report.outcome.failure() {
        warn!("#{} {} failed: {}", report.cycle, report.direction, failure);
    }
}
