//! Process-level parent, realized as a thread supervisor.
//!
//! SIGCHLD/SIGUSR1/SIGTERM become `SupervisorEvent` values on one `mpsc`
//! channel, and a crash is a caught panic inside an actor's closure rather
//! than a dead process. Every actor still owns exactly one writable field,
//! still reports through `Heartbeats`, and the supervisor still holds sole
//! authority to reset synchronization primitives — only the transport
//! carrying "a child died" or "reinitialize now" changed.

use drone_shared::{ActorRole, SharedRegion};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
#[cfg(test)]
use std::time::Duration;

use crate::actors;

/// Why an actor's thread ended, mirroring the process exit statuses a
/// multi-process build would report via `waitpid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The closure returned normally because `shutdown` was observed.
    Shutdown,
    /// The closure panicked; the payload itself isn't reproduced here, only
    /// that one occurred — it was already logged by the catching thread.
    Crashed,
}

/// Everything that can make the supervisor act, replacing SIGCHLD/SIGUSR1/SIGTERM.
pub enum SupervisorEvent {
    ChildExited(ActorRole, ExitReason),
    RecoveryRequested,
    ShutdownRequested,
    /// The battery actor hit charge == 0, which means the whole program
    /// terminates. Distinct from `ShutdownRequested` only in logging — both
    /// end the program, but this one says why.
    FatalBatteryDepleted,
}

/// Signal to every actor thread that it's time to return, the thread
/// equivalent of delivering SIGTERM to a child process.
#[derive(Clone)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

struct ActorHandle {
    role: ActorRole,
    join: JoinHandle<()>,
}

/// The body a spawned actor thread runs. A plain `fn` (`actors::run`)
/// already satisfies this; tests substitute a closure that can simulate a
/// crash without touching any real actor.
type ActorFn = Arc<dyn Fn(ActorRole, &Arc<SharedRegion>, &Shutdown, &Sender<SupervisorEvent>) + Send + Sync>;

/// Owns the shared region, the actor threads, and the supervisor event
/// channel. `run` is the supervisor's main loop.
pub struct Supervisor {
    region: Arc<SharedRegion>,
    events_tx: Sender<SupervisorEvent>,
    events_rx: Receiver<SupervisorEvent>,
    shutdown: Shutdown,
    handles: Vec<ActorHandle>,
    actor_fn: ActorFn,
}

impl Supervisor {
    pub fn new(region: Arc<SharedRegion>) -> Self {
        Self::with_actor_fn(region, Arc::new(actors::run))
    }

    /// Test-only seam: run a substitute actor body instead of `actors::run`,
    /// so the crash/respawn and recovery cycles can be exercised without a
    /// real actor's sockets or timing.
    #[cfg(test)]
    pub fn new_with_actor_fn(
        region: Arc<SharedRegion>,
        actor_fn: impl Fn(ActorRole, &Arc<SharedRegion>, &Shutdown, &Sender<SupervisorEvent>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::with_actor_fn(region, Arc::new(actor_fn))
    }

    fn with_actor_fn(region: Arc<SharedRegion>, actor_fn: ActorFn) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            region,
            events_tx,
            events_rx,
            shutdown: Shutdown::new(),
            handles: Vec::new(),
            actor_fn,
        }
    }

    /// A clone of the event sender, handed to the signal handler installer
    /// so external signals and in-process actor exits funnel through the
    /// same channel.
    pub fn events_sender(&self) -> Sender<SupervisorEvent> {
        self.events_tx.clone()
    }

    /// Spawn one thread per actor role, in a fixed order (Battery,
    /// Accelerometer, GPS, Flight, Telemetry, Watchdog).
    pub fn spawn_all(&mut self) {
        for role in ActorRole::ALL {
            self.spawn(role);
        }
    }

    fn spawn(&mut self, role: ActorRole) {
        let region = Arc::clone(&self.region);
        let shutdown = self.shutdown.clone();
        let events_tx = self.events_tx.clone();
        let actor_fn = Arc::clone(&self.actor_fn);

        let join = std::thread::Builder::new()
            .name(role.name().to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    actor_fn(role, &region, &shutdown, &events_tx);
                }));
                let reason = match outcome {
                    Ok(()) => ExitReason::Shutdown,
                    Err(payload) => {
                        let message = panic_message(&payload);
                        log::error!(target: "drone::supervisor", "{} panicked: {message}", role.name());
                        ExitReason::Crashed
                    }
                };
                // A send failure here just means the supervisor already shut
                // the channel down (program exiting); nothing to react to.
                let _ = events_tx.send(SupervisorEvent::ChildExited(role, reason));
            })
            .expect("failed to spawn actor thread");

        self.region.pids.set(role, join.thread().id());
        self.handles.push(ActorHandle { role, join });
    }

    fn respawn(&mut self, role: ActorRole) {
        self.handles.retain(|h| h.role != role || !h.join.is_finished());
        log::info!(target: "drone::supervisor", "respawning {}", role.name());
        self.spawn(role);
    }

    fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join.join();
            self.region.pids.clear(handle.role);
        }
    }

    /// Stop every actor thread and wait for them to return. `Shutdown`
    /// guarantees they notice within one tick of their own period; join
    /// blocks until they do.
    fn quiesce(&mut self) {
        self.shutdown.request();
        self.join_all();
    }

    /// A fresh `Shutdown` flag for the next generation of actor threads,
    /// issued after a recovery cycle so actors respawned post-reset don't
    /// inherit a flag already tripped by the quiesce that preceded them.
    fn rearm(&mut self) {
        self.shutdown = Shutdown::new();
    }

    /// Run until a terminal `SupervisorEvent` is received. Returns the
    /// process exit code (0 clean shutdown, 1 fatal).
    pub fn run(mut self) -> i32 {
        loop {
            let event = match self.events_rx.recv() {
                Ok(event) => event,
                Err(_) => return 0,
            };

            match event {
                SupervisorEvent::ChildExited(role, reason) => {
                    if self.shutdown.requested() {
                        // Expected: we're already tearing down.
                        continue;
                    }
                    match reason {
                        ExitReason::Shutdown => {
                            log::info!(target: "drone::supervisor", "{} exited cleanly", role.name());
                        }
                        ExitReason::Crashed => {
                            self.respawn(role);
                        }
                    }
                }
                SupervisorEvent::RecoveryRequested => {
                    log::warn!(target: "drone::supervisor", "recovery requested: quiescing all actors");
                    self.quiesce();
                    if let Err(e) = self.region.reset_locks() {
                        log::error!(target: "drone::supervisor", "{e}");
                    }
                    self.rearm();
                    self.spawn_all();
                }
                SupervisorEvent::ShutdownRequested => {
                    log::info!(target: "drone::supervisor", "shutdown requested");
                    self.quiesce();
                    return 0;
                }
                SupervisorEvent::FatalBatteryDepleted => {
                    log::error!(target: "drone::supervisor", "battery depleted to 0%: fatal shutdown");
                    self.quiesce();
                    return 1;
                }
            }

            // Drain threads that exited uneventfully while we handle other
            // events, so `handles` doesn't grow across a long run.
            self.handles.retain(|h| !h.join.is_finished());
        }
    }

    /// Block heartbeat polling off of `run`'s own thread would be circular;
    /// the watchdog is just another actor. This exists only so `main` can
    /// wait a grace period for actors to reach steady state before treating
    /// silence as done, used by tests.
    #[cfg(test)]
    pub fn wait_for_quiet(&self, timeout: Duration) {
        std::thread::sleep(timeout);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_shared::Action;
    use std::net::Ipv4Addr;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn test_region() -> Arc<SharedRegion> {
        Arc::new(SharedRegion::new(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST, 1, 2))
    }

    fn wait_until(deadline_msg: &str, mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !condition() {
            assert!(Instant::now() < deadline, "{deadline_msg}");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Panics on its first invocation, then ticks its own heartbeat until
    /// told to stop — simulates one crash followed by a healthy respawn.
    fn crash_once_then_heartbeat(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(ActorRole, &Arc<SharedRegion>, &Shutdown, &Sender<SupervisorEvent>) + Send + Sync {
        move |role, region, shutdown, _events| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("simulated crash");
            }
            while !shutdown.requested() {
                region.heartbeats.tick(role);
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }

    #[test]
    fn crashed_actor_is_respawned_and_resumes_heartbeating() {
        let region = test_region();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut supervisor =
            Supervisor::new_with_actor_fn(Arc::clone(&region), crash_once_then_heartbeat(Arc::clone(&calls)));
        let events = supervisor.events_sender();
        supervisor.spawn(ActorRole::Battery);

        let handle = std::thread::spawn(move || supervisor.run());

        wait_until("respawned actor never ticked its heartbeat", || {
            region.heartbeats.get(ActorRole::Battery) > 0
        });
        assert!(
            calls.load(Ordering::SeqCst) >= 2,
            "actor body should have run at least twice: the crash and the respawn"
        );

        events.send(SupervisorEvent::ShutdownRequested).unwrap();
        assert_eq!(handle.join().unwrap(), 0);
    }

    fn heartbeat_until_shutdown(
        role: ActorRole,
        region: &Arc<SharedRegion>,
        shutdown: &Shutdown,
        _events: &Sender<SupervisorEvent>,
    ) {
        while !shutdown.requested() {
            region.heartbeats.tick(role);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn recovery_requested_resets_locks_and_respawns_every_actor() {
        let region = test_region();
        let mut supervisor = Supervisor::new_with_actor_fn(Arc::clone(&region), heartbeat_until_shutdown);
        let events = supervisor.events_sender();
        supervisor.spawn_all();

        wait_until("not every actor ticked before recovery", || {
            ActorRole::ALL.iter().all(|r| region.heartbeats.get(*r) > 0)
        });

        *region.action.write() = Action::Fly;
        let pre_recovery: Vec<u32> = ActorRole::ALL.iter().map(|r| region.heartbeats.get(*r)).collect();

        let handle = std::thread::spawn(move || supervisor.run());
        events.send(SupervisorEvent::RecoveryRequested).unwrap();

        wait_until("respawned actors never resumed heartbeating", || {
            ActorRole::ALL
                .iter()
                .zip(&pre_recovery)
                .all(|(r, before)| region.heartbeats.get(*r) > *before)
        });
        // reset_locks reinitializes lock state, not the data it guards.
        assert_eq!(*region.action.read(), Action::Fly);

        events.send(SupervisorEvent::ShutdownRequested).unwrap();
        assert_eq!(handle.join().unwrap(), 0);
    }
}
