//! Watchdog actor: observes the five heartbeat counters and escalates a
//! stalled actor to the supervisor.
//!
//! Uses wall-clock ticks, not the counters themselves, to measure elapsed
//! time — the watchdog must not self-track elapsed time via the counters
//! it's watching.

use drone_shared::sync::HEARTBEAT_ROLES;
use drone_shared::SharedRegion;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::supervisor::{Shutdown, SupervisorEvent};

const TICK_PERIOD: Duration = Duration::from_millis(100);
const STALL_THRESHOLD: Duration = Duration::from_millis(2000);

pub fn run(region: &Arc<SharedRegion>, shutdown: &Shutdown, events: &Sender<SupervisorEvent>) {
    let mut last_seen = [0u32; 5];
    let mut last_change = [Instant::now(); 5];

    while !shutdown.requested() {
        std::thread::sleep(TICK_PERIOD);

        let now = Instant::now();
        for (i, role) in HEARTBEAT_ROLES.into_iter().enumerate() {
            let count = region.heartbeats.get(role);
            if count != last_seen[i] {
                last_seen[i] = count;
                last_change[i] = now;
                continue;
            }
            if now.duration_since(last_change[i]) >= STALL_THRESHOLD {
                log::warn!(target: "drone::watchdog", "{} stalled for {:?}, requesting recovery", role.name(), STALL_THRESHOLD);
                let _ = events.send(SupervisorEvent::RecoveryRequested);
                return;
            }
        }
    }
}
