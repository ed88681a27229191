//! Operator console: a TCP server that accepts one drone connection and
//! prints its telemetry, a UDP sender that encodes operator commands onto
//! the drone's command port, and a stdin reader — three threads feeding one
//! `mpsc` channel the main loop drains.

mod command;

use anyhow::Context;
use drone_shared::NetConfig;
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::sync::mpsc::{self, Sender};

enum ConsoleEvent {
    TelemetryLine(String),
    TelemetryClosed,
    Command(String),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = NetConfig::parse(&args).context(
        "usage: drone-operator <operator_ip> <operator_tcp_port> <drone_ip> <flight_ctrl_udp_port>",
    )?;

    let listener = TcpListener::bind((config.operator_ip, config.operator_tcp_port))
        .context("failed to bind telemetry listener")?;
    log::info!("listening for drone telemetry on {}:{}", config.operator_ip, config.operator_tcp_port);

    let command_socket = UdpSocket::bind((config.operator_ip, 0))
        .context("failed to bind command-sending socket")?;
    let drone_addr = (config.drone_ip, config.flight_ctrl_udp_port);

    let (events_tx, events_rx) = mpsc::channel();

    spawn_accept_loop(listener, events_tx.clone());
    spawn_stdin_reader(events_tx);

    for event in events_rx {
        match event {
            ConsoleEvent::TelemetryLine(line) => println!("{line}"),
            ConsoleEvent::TelemetryClosed => log::warn!("drone telemetry connection closed"),
            ConsoleEvent::Command(line) => match command::parse(&line) {
                Some(action) => {
                    if let Err(e) = command_socket.send_to(&action.to_wire(), drone_addr) {
                        log::warn!("failed to send command: {e}");
                    }
                }
                None => println!("{}", command::USAGE),
            },
        }
    }

    Ok(())
}

/// Accept connections one at a time; only one drone is ever expected. Each
/// accepted connection gets its own reader thread so a stalled or dropped
/// drone doesn't block accepting its replacement.
fn spawn_accept_loop(listener: TcpListener, events: Sender<ConsoleEvent>) {
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => spawn_telemetry_reader(stream, events.clone()),
                Err(e) => log::warn!("accept failed: {e}"),
            }
        }
    });
}

fn spawn_telemetry_reader(stream: TcpStream, events: Sender<ConsoleEvent>) {
    std::thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if events.send(ConsoleEvent::TelemetryLine(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = events.send(ConsoleEvent::TelemetryClosed);
    });
}

fn spawn_stdin_reader(events: Sender<ConsoleEvent>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if events.send(ConsoleEvent::Command(line)).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    });
}
