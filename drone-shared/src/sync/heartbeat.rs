//! Per-actor heartbeat counters.
//!
//! Five monotonic `u32` counters, one per actor role excluding the watchdog
//! itself (the watchdog has nothing watching it). Each actor increments
//! only its own counter; the watchdog reads all five.

use crate::ActorRole;
use std::sync::atomic::{AtomicU32, Ordering};

/// The five heartbeat-bearing roles, in the order they're stored.
pub const HEARTBEAT_ROLES: [ActorRole; 5] = [
    ActorRole::Battery,
    ActorRole::Accelerometer,
    ActorRole::FlightController,
    ActorRole::GpsProducer,
    ActorRole::Telemetry,
];

fn slot(role: ActorRole) -> usize {
    HEARTBEAT_ROLES
        .iter()
        .position(|r| *r == role)
        .unwrap_or_else(|| panic!("{role:?} has no heartbeat counter (watchdog is not observed)"))
}

pub struct Heartbeats {
    counters: [AtomicU32; 5],
}

impl Heartbeats {
    pub fn new() -> Self {
        Self {
            counters: Default::default(),
        }
    }

    /// Increment the calling actor's own counter. Every actor but the
    /// watchdog calls this once per loop iteration.
    pub fn tick(&self, role: ActorRole) {
        self.counters[slot(role)].fetch_add(1, Ordering::Relaxed);
    }

    /// Read a single role's counter. Used by the watchdog.
    pub fn get(&self, role: ActorRole) -> u32 {
        self.counters[slot(role)].load(Ordering::Relaxed)
    }

    /// Snapshot all five counters in role order.
    pub fn snapshot(&self) -> [(ActorRole, u32); 5] {
        let mut out = [(ActorRole::Battery, 0u32); 5];
        for (i, role) in HEARTBEAT_ROLES.into_iter().enumerate() {
            out[i] = (role, self.get(role));
        }
        out
    }
}

impl Default for Heartbeats {
    fn default() -> Self {
        Self::new()
    }
}
