//! Telemetry actor: TCP client to the operator, sole consumer of the GPS
//! ring buffer.

use drone_shared::{Action, ActorRole, SharedRegion};
use std::io::Write;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::supervisor::Shutdown;

const TICK_PERIOD: Duration = Duration::from_millis(10);
const GPS_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound on one GPS block so a pathological stream without a newline
/// can't grow a telemetry message without limit.
const GPS_MAX_CHARS: usize = 256;

pub fn run(region: &Arc<SharedRegion>, shutdown: &Shutdown) {
    let mut stream: Option<TcpStream> = None;

    while !shutdown.requested() {
        std::thread::sleep(TICK_PERIOD);

        if stream.is_none() {
            match TcpStream::connect((region.operator_ip, region.telemetry_port)) {
                Ok(s) => {
                    log::info!(target: "drone::telemetry", "connected to operator");
                    stream = Some(s);
                }
                Err(e) => {
                    log::debug!(target: "drone::telemetry", "connect failed, will retry: {e}");
                }
            }
        }

        let message = compose_message(region);

        if let Some(s) = stream.as_mut() {
            if let Err(e) = s.write_all(message.as_bytes()).and_then(|_| s.flush()) {
                log::warn!(target: "drone::telemetry", "send failed, reconnecting: {e}");
                stream = None;
            }
        }

        region.heartbeats.tick(ActorRole::Telemetry);
    }
}

fn compose_message(region: &Arc<SharedRegion>) -> String {
    let mut out = String::new();

    out.push_str(&format!("BAT = {}%\n", region.battery.load()));

    if let Some(accel) = region.accel.try_lock() {
        out.push_str(&format!(
            "ACCEL = ({:.6}, {:.6}, {:.6})\n",
            accel.x, accel.y, accel.z
        ));
    }

    if let Some(motors) = region.pwm.try_lock() {
        let pct: Vec<i32> = motors.0.iter().map(|m| (m * 100.0).round() as i32).collect();
        out.push_str(&format!(
            "MOTORS PWM = [{}%, {}%, {}%, {}%]\n",
            pct[0], pct[1], pct[2], pct[3]
        ));
    }

    let action = *region.action.read();
    out.push_str(&format!("ACTION = {}\n", u8::from(action)));

    if action == Action::SampleGPS {
        out.push_str("GPS {");
        let mut got_fix = false;
        for _ in 0..GPS_MAX_CHARS {
            match region.gps.try_pop(GPS_TIMEOUT) {
                Some(byte) => {
                    out.push(byte as char);
                    if byte == b'\n' {
                        got_fix = true;
                        break;
                    }
                }
                None => break,
            }
        }
        out.push_str("}\n");
        if !got_fix {
            out.push_str("NO FIX.\n");
            *region.action.write() = Action::Abort;
        }
    }

    out
}
