//! GPS producer actor: sole writer of the NMEA ring buffer.
//!
//! Performs no action-state inspection at all — flow control is entirely
//! the consumer's appetite on `full`, via `RingBuffer::try_push`'s 1s
//! timeout. When nothing is draining the buffer (the drone isn't in
//! `SampleGPS`), pushes simply start timing out and the current sample is
//! abandoned.

use drone_shared::ActorRole;
use drone_shared::SharedRegion;
use std::sync::Arc;
use std::time::Duration;

use super::gps_samples::SampleCycle;
use crate::supervisor::Shutdown;

const TICK_PERIOD: Duration = Duration::from_secs(1);
const EMPTY_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

pub fn run(region: &Arc<SharedRegion>, shutdown: &Shutdown) {
    let mut cycle = SampleCycle::new();

    while !shutdown.requested() {
        std::thread::sleep(TICK_PERIOD);

        let sample = cycle.current();
        for byte in sample.bytes() {
            if !region.gps.try_push(byte, EMPTY_WAIT_TIMEOUT) {
                log::debug!(target: "drone::gps_producer", "empty-wait timed out, abandoning sample");
                break;
            }
        }
        cycle.advance();

        region.heartbeats.tick(ActorRole::GpsProducer);
    }
}
