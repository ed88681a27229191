//! Entry point for the drone binary: parses the four positional network
//! arguments, creates the shared region, installs signal handlers, spawns
//! the six actors, and runs the supervisor to completion.

mod actors;
mod supervisor;

use anyhow::Context;
use drone_shared::{NetConfig, SharedRegion};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};
use signal_hook::iterator::Signals;
use std::sync::Arc;

use supervisor::{Supervisor, SupervisorEvent};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = NetConfig::parse(&args)
        .context("usage: drone <operator_ip> <operator_tcp_port> <drone_ip> <flight_ctrl_udp_port>")?;

    let region = Arc::new(SharedRegion::new(
        config.operator_ip,
        config.drone_ip,
        config.operator_tcp_port,
        config.flight_ctrl_udp_port,
    ));

    let mut supervisor = Supervisor::new(Arc::clone(&region));
    install_signal_handlers(supervisor.events_sender())?;
    supervisor.spawn_all();

    let exit_code = supervisor.run();
    std::process::exit(exit_code);
}

/// Turns SIGTERM/SIGINT/SIGUSR1 into `SupervisorEvent`s on the same channel
/// actor exits use, so the supervisor's main loop only has one source to poll.
fn install_signal_handlers(events: std::sync::mpsc::Sender<SupervisorEvent>) -> anyhow::Result<()> {
    let mut signals =
        Signals::new([SIGTERM, SIGINT, SIGUSR1]).context("failed to install signal handlers")?;

    std::thread::spawn(move || {
        for signal in signals.forever() {
            let event = match signal {
                SIGTERM | SIGINT => SupervisorEvent::ShutdownRequested,
                SIGUSR1 => SupervisorEvent::RecoveryRequested,
                _ => continue,
            };
            if events.send(event).is_err() {
                return;
            }
        }
    });

    Ok(())
}
