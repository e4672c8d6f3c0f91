//! Responder task
//!
//! The link driver busy-waits for the Initiator, so each cycle blocks the
//! executor until the transaction completes or times out. The task yields
//! between cycles.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::PIO0;

use tandem_core::{Policy, ResponderEngine, TemplateOutbox};
use tandem_hal::EhOutput;
use tandem_hal_rp2040::PioResponder;
use tandem_protocol::DecodedFrame;

/// Responder engine as wired on the board
pub type Responder = ResponderEngine<
    PioResponder<'static, PIO0, 0>,
    EhOutput<Output<'static>>,
    TemplateOutbox,
    Policy,
>;

/// Responder task
#[embassy_executor::task]
pub async fn responder_task(engine: &'static mut Responder) {
    info!("Responder task started");

    loop {
        let report = engine.run_cycle(&mut |cycle, frame: DecodedFrame<'_>| {
            info!("Received: {} (#{})", frame, cycle);
        });

        if report.asserted {
            debug!("#{} signalled ready", report.cycle);
        }
        if let Some(failure) = report.outcome.failure() {
            warn!("#{} failed: {}", report.cycle, failure);
        }

        yield_now().await;
    }
}
