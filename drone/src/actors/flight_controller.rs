//! Flight controller actor: sole writer of motor PWM, central driver of
//! `Action` transitions. The state machine itself lives in
//! [`super::flight_logic`]; this module is the I/O shell around it — binding
//! the command socket, reading the shared region, and feeding `flight_logic::tick`.

use drone_shared::{Action, ActorRole, SharedRegion};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::flight_logic::{self, FlightControllerState, TickInput};
use crate::supervisor::Shutdown;

const TICK_PERIOD: Duration = Duration::from_millis(50);
const REBIND_PERIOD: Duration = Duration::from_millis(2000);

pub fn run(region: &Arc<SharedRegion>, shutdown: &Shutdown) {
    let mut socket = None;
    let mut last_bind_attempt = Instant::now() - REBIND_PERIOD;
    let mut state = FlightControllerState::new();
    // See flight_logic's module docs: while landing out of Abort, we keep
    // presenting Abort to the transition function regardless of what the
    // shared field currently reads, so a multi-tick landing isn't cut short
    // by the tick that reverted `action` to `last_action`.
    let mut landing_in_progress = false;

    while !shutdown.requested() {
        std::thread::sleep(TICK_PERIOD);

        if socket.is_none() && last_bind_attempt.elapsed() >= REBIND_PERIOD {
            last_bind_attempt = Instant::now();
            match UdpSocket::bind((region.drone_ip, region.flight_ctrl_port)) {
                Ok(s) => {
                    if let Err(e) = s.set_nonblocking(true) {
                        log::warn!(target: "drone::flight_controller", "set_nonblocking failed: {e}");
                    } else {
                        log::info!(target: "drone::flight_controller", "bound command socket");
                        socket = Some(s);
                    }
                }
                Err(e) => {
                    log::warn!(target: "drone::flight_controller", "bind failed, will retry: {e}");
                    *region.action.write() = Action::Abort;
                }
            }
        }

        let operator_cmd = match socket.as_ref().map(recv_command) {
            Some(Ok(cmd)) => cmd,
            Some(Err(e)) => {
                log::warn!(target: "drone::flight_controller", "command recv error: {e}, forcing Abort and re-bind");
                *region.action.write() = Action::Abort;
                socket = None;
                None
            }
            None => None,
        };

        let observed_action = *region.action.read();
        let effective_action = if landing_in_progress {
            Action::Abort
        } else {
            observed_action
        };

        let input = TickInput {
            action: effective_action,
            motors: *region.pwm.lock(),
            accel: *region.accel.lock(),
            operator_cmd,
            battery_pct: region.battery.load(),
        };
        let output = flight_logic::tick(&mut state, input);

        landing_in_progress = effective_action == Action::Abort && output.action != Action::Charge;

        *region.pwm.lock() = output.motors;
        *region.action.write() = output.action;

        region.heartbeats.tick(ActorRole::FlightController);
    }
}

/// Non-blocking receive of one command datagram. `WouldBlock` means no
/// datagram is waiting and is folded into `Ok(None)`; any other error is
/// a genuine communication failure and is handed back to the caller, which
/// forces `Abort` and re-binds rather than silently ignoring it.
fn recv_command(socket: &UdpSocket) -> std::io::Result<Option<Action>> {
    let mut buf = [0u8; 8];
    match socket.recv(&mut buf) {
        Ok(n) => Ok(Action::from_wire(&buf[..n])),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}
