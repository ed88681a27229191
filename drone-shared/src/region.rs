//! The shared region: every field every actor touches, with the
//! single-writer discipline for each field encoded as the type of that
//! field rather than left as a convention to remember.

use crate::action::Action;
use crate::error::SharedError;
use crate::sync::{AtomicCharge, DataMutex, GpsRingBuffer, Heartbeats, SemRwLock};
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::thread::ThreadId;

/// One of the six long-running actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRole {
    Battery,
    Accelerometer,
    FlightController,
    GpsProducer,
    Telemetry,
    Watchdog,
}

impl ActorRole {
    /// All six roles, in the order the supervisor spawns them.
    pub const ALL: [ActorRole; 6] = [
        ActorRole::Battery,
        ActorRole::Accelerometer,
        ActorRole::GpsProducer,
        ActorRole::FlightController,
        ActorRole::Telemetry,
        ActorRole::Watchdog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActorRole::Battery => "battery",
            ActorRole::Accelerometer => "accelerometer",
            ActorRole::FlightController => "flight_controller",
            ActorRole::GpsProducer => "gps_producer",
            ActorRole::Telemetry => "telemetry",
            ActorRole::Watchdog => "watchdog",
        }
    }
}

/// Acceleration triple written solely by the accelerometer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Motor PWM values written solely by the flight controller, each
/// constrained to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motors(pub [f32; 4]);

impl Motors {
    pub fn mean(&self) -> f32 {
        self.0.iter().sum::<f32>() / self.0.len() as f32
    }

    pub fn clamp_all(&mut self) {
        for v in &mut self.0 {
            *v = v.clamp(0.0, 1.0);
        }
    }
}

/// Per-actor process/thread identity, written by the supervisor only. In
/// the thread-per-actor model this holds [`ThreadId`]s rather than OS pids.
#[derive(Default)]
pub struct PidTable {
    slots: Mutex<[Option<ThreadId>; 6]>,
}

fn role_index(role: ActorRole) -> usize {
    ActorRole::ALL.iter().position(|r| *r == role).unwrap()
}

impl PidTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, role: ActorRole, id: ThreadId) {
        self.slots.lock().unwrap_or_else(|p| p.into_inner())[role_index(role)] = Some(id);
    }

    pub fn clear(&self, role: ActorRole) {
        self.slots.lock().unwrap_or_else(|p| p.into_inner())[role_index(role)] = None;
    }

    pub fn get(&self, role: ActorRole) -> Option<ThreadId> {
        self.slots.lock().unwrap_or_else(|p| p.into_inner())[role_index(role)]
    }
}

/// The shared state substrate, created once by the supervisor and handed
/// to every actor behind an `Arc`.
pub struct SharedRegion {
    pub pids: PidTable,
    pub operator_ip: Ipv4Addr,
    pub drone_ip: Ipv4Addr,
    pub telemetry_port: u16,
    pub flight_ctrl_port: u16,
    pub heartbeats: Heartbeats,
    pub action: SemRwLock<Action>,
    pub accel: DataMutex<Acceleration>,
    pub pwm: DataMutex<Motors>,
    pub gps: GpsRingBuffer,
    pub battery: AtomicCharge,
}

impl SharedRegion {
    /// Create the region with its documented defaults: charge 100, `Idle`,
    /// zero acceleration, zero motors.
    pub fn new(
        operator_ip: Ipv4Addr,
        drone_ip: Ipv4Addr,
        telemetry_port: u16,
        flight_ctrl_port: u16,
    ) -> Self {
        Self {
            pids: PidTable::new(),
            operator_ip,
            drone_ip,
            telemetry_port,
            flight_ctrl_port,
            heartbeats: Heartbeats::new(),
            action: SemRwLock::new(Action::Idle),
            accel: DataMutex::new(Acceleration::default()),
            pwm: DataMutex::new(Motors::default()),
            gps: GpsRingBuffer::new(),
            battery: AtomicCharge::new(100),
        }
    }

    /// Reinitialize every lock's synchronization state in place, preserving
    /// the data each one protects. Fails with
    /// [`SharedError::ResetWithoutQuiesce`] if `pids` still shows a live
    /// thread for any role — the supervisor clears each slot as it joins
    /// that actor's thread, so a non-empty table means someone is still
    /// running and could be blocked on one of these locks. See each
    /// primitive's `reset()` for the exact safety contract this enforces.
    pub fn reset_locks(&self) -> Result<(), SharedError> {
        if ActorRole::ALL.iter().any(|role| self.pids.get(*role).is_some()) {
            return Err(SharedError::ResetWithoutQuiesce);
        }
        self.action.reset();
        self.accel.reset();
        self.pwm.reset();
        self.gps.reset();
        Ok(())
    }
}
