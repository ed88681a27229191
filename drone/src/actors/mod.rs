//! The six long-running actors and the pure flight-controller transition
//! function they're built around.
//!
//! Every actor function here has the same shape: a loop that sleeps for its
//! period, does one unit of work against the `Arc<SharedRegion>`, ticks its
//! own heartbeat slot, and checks `Shutdown` before going back to sleep.
//! `run` is the single entry point the supervisor spawns a thread with per
//! role; it exists so `supervisor::Supervisor::spawn` doesn't need a match
//! arm of its own.

mod accelerometer;
mod battery;
mod flight_controller;
pub mod flight_logic;
mod gps_producer;
mod gps_samples;
mod telemetry;
mod watchdog;

use drone_shared::{ActorRole, SharedRegion};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::supervisor::{Shutdown, SupervisorEvent};

pub fn run(
    role: ActorRole,
    region: &Arc<SharedRegion>,
    shutdown: &Shutdown,
    events: &Sender<SupervisorEvent>,
) {
    match role {
        ActorRole::Battery => battery::run(region, shutdown, events),
        ActorRole::Accelerometer => accelerometer::run(region, shutdown),
        ActorRole::FlightController => flight_controller::run(region, shutdown),
        ActorRole::GpsProducer => gps_producer::run(region, shutdown),
        ActorRole::Telemetry => telemetry::run(region, shutdown),
        ActorRole::Watchdog => watchdog::run(region, shutdown, events),
    }
}
