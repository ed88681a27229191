//! Battery actor: sole writer of the charge scalar.

use drone_shared::{Action, ActorRole, SharedRegion};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::supervisor::{Shutdown, SupervisorEvent};

const TICK_PERIOD: Duration = Duration::from_micros(100);
const CHARGE_PERIOD: Duration = Duration::from_millis(500);
const DRAIN_PERIOD: Duration = Duration::from_millis(2000);
const ABORT_THRESHOLD: u8 = 15;

pub fn run(region: &Arc<SharedRegion>, shutdown: &Shutdown, events: &Sender<SupervisorEvent>) {
    let mut charging = *region.action.read() == Action::Charge;
    let mut last_transition = Instant::now();

    while !shutdown.requested() {
        std::thread::sleep(TICK_PERIOD);

        let action = *region.action.read();
        let now_charging = action == Action::Charge;
        if now_charging != charging {
            charging = now_charging;
            last_transition = Instant::now();
        }

        let period = if charging { CHARGE_PERIOD } else { DRAIN_PERIOD };
        if last_transition.elapsed() >= period {
            last_transition = Instant::now();
            let charge = if charging {
                region.battery.saturating_increment()
            } else {
                region.battery.saturating_decrement()
            };

            if !charging && charge < ABORT_THRESHOLD && action != Action::Abort {
                log::warn!(target: "drone::battery", "charge at {charge}%, forcing Abort");
                *region.action.write() = Action::Abort;
            }

            if charge == 0 {
                log::error!(target: "drone::battery", "charge depleted to 0%");
                region.heartbeats.tick(ActorRole::Battery);
                let _ = events.send(SupervisorEvent::FatalBatteryDepleted);
                return;
            }
        }

        region.heartbeats.tick(ActorRole::Battery);
    }
}
