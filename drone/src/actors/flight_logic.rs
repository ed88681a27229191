//! Pure flight-controller transition logic, factored out of
//! `actors::flight_controller` so the state machine can be unit-tested
//! without a socket or a shared region.
//!
//! # The Abort→Land coupling
//!
//! `Abort` intentionally "falls through" into `Land`'s motor-decrease logic
//! in the same tick it may also revert `action` to `last_action`; this
//! coupling is preserved rather than "fixed" even though it reads oddly.
//! We go one step further than a single-tick coupling: for as long as the
//! aircraft is still landing, the *caller* (`actors::flight_controller`)
//! keeps feeding this function `Action::Abort` as the observed action even
//! after a tick reports `last_action` — see that module's `landing_in_progress`
//! flag. That's what lets "Abort keeps landing the aircraft until at rest"
//! hold even though a literal one-shot revert would otherwise hand control
//! straight back to whatever `last_action` was. Within *this* function,
//! every Abort tick unconditionally decrements the motors and targets
//! `Charge` on rest, regardless of battery — the battery threshold only
//! decides whether the reported action is `Abort` (battery still critical)
//! or `last_action` (battery fine, a no-op-looking revert that's overridden
//! back to `Abort` by the caller until rest).

use drone_shared::{Acceleration, Action, Motors};

/// Consecutive iterations of unchanged acceleration before `Fly` aborts.
pub const FLY_STALL_TICKS: u8 = 10;

/// Battery percentage below which `Abort`/`Charge` transitions behave
/// differently.
pub const LOW_BATTERY_PCT: u8 = 15;

#[derive(Debug, Clone, Copy)]
pub struct FlightControllerState {
    pub fly_timeout: u8,
    pub last_accel: Acceleration,
    pub last_action: Action,
}

impl FlightControllerState {
    pub fn new() -> Self {
        Self {
            fly_timeout: 0,
            last_accel: Acceleration::default(),
            last_action: Action::Idle,
        }
    }
}

impl Default for FlightControllerState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TickInput {
    pub action: Action,
    pub motors: Motors,
    pub accel: Acceleration,
    pub operator_cmd: Option<Action>,
    pub battery_pct: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub action: Action,
    pub motors: Motors,
}

/// Run one 50ms flight-controller iteration.
pub fn tick(state: &mut FlightControllerState, input: TickInput) -> TickOutput {
    let TickInput {
        action,
        mut motors,
        accel,
        operator_cmd,
        battery_pct,
    } = input;

    let mut next_action = action;
    let mut run_land_decrement = false;
    let mut land_target_on_rest = Action::Idle;

    match action {
        Action::Fly => {
            let avg_pwm = motors.mean();
            if avg_pwm < 0.7 {
                for m in &mut motors.0 {
                    *m = (*m + 0.005).min(1.0);
                }
            }
            if avg_pwm >= 0.5 {
                for m in &mut motors.0 {
                    *m -= accel.x + accel.y;
                }
            }

            if accel == state.last_accel {
                state.fly_timeout = state.fly_timeout.saturating_add(1);
                if state.fly_timeout >= FLY_STALL_TICKS {
                    next_action = Action::Abort;
                }
            } else {
                state.fly_timeout = 0;
            }

            if next_action == action {
                if let Some(cmd) = operator_cmd {
                    if matches!(cmd, Action::SampleGPS | Action::Land | Action::Abort) {
                        next_action = cmd;
                    }
                }
            }
        }
        Action::SampleGPS => {
            if let Some(cmd) = operator_cmd {
                if matches!(cmd, Action::Fly | Action::Abort) {
                    next_action = cmd;
                }
            }
        }
        Action::Idle => {
            if let Some(cmd) = operator_cmd {
                if matches!(cmd, Action::Fly | Action::Charge | Action::Abort) {
                    next_action = cmd;
                }
            }
        }
        Action::Charge => {
            if let Some(cmd) = operator_cmd {
                if matches!(cmd, Action::Idle | Action::Abort) {
                    if battery_pct >= LOW_BATTERY_PCT {
                        next_action = cmd;
                    } else {
                        log::info!(
                            target: "drone::flight_controller",
                            "ignoring Charge -> {cmd:?}: battery at {battery_pct}% is below {LOW_BATTERY_PCT}%"
                        );
                    }
                }
            }
        }
        Action::Abort => {
            // Ignores operator commands entirely.
            if battery_pct < LOW_BATTERY_PCT {
                next_action = Action::Abort;
            } else {
                next_action = state.last_action;
            }
            run_land_decrement = true;
            land_target_on_rest = Action::Charge;
        }
        Action::Land => {
            if let Some(cmd) = operator_cmd {
                if matches!(cmd, Action::Fly | Action::Abort) {
                    next_action = cmd;
                }
            }
            if next_action == action {
                run_land_decrement = true;
                land_target_on_rest = Action::Idle;
            }
        }
        // Unknown/reserved tag: fail safe.
        _ => {
            next_action = Action::Abort;
        }
    }

    if run_land_decrement {
        for m in &mut motors.0 {
            *m -= 0.01;
        }
        if motors.mean() <= 0.0 {
            next_action = land_target_on_rest;
        }
    }

    motors.clamp_all();
    state.last_accel = accel;
    if action != Action::Abort {
        state.last_action = action;
    }

    TickOutput {
        action: next_action,
        motors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motors(v: f32) -> Motors {
        Motors([v; 4])
    }

    #[test]
    fn fly_ramps_up_below_0_7() {
        let mut state = FlightControllerState::new();
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Fly,
                motors: motors(0.69999),
                accel: Acceleration::default(),
                operator_cmd: None,
                battery_pct: 100,
            },
        );
        assert!(out.motors.0[0] > 0.69999);
    }

    #[test]
    fn fly_does_not_ramp_up_at_exactly_0_7() {
        let mut state = FlightControllerState::new();
        // avg == 0.7 also triggers the >=0.5 subtraction branch, which with
        // zero acceleration is a no-op, isolating the < 0.7 boundary.
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Fly,
                motors: motors(0.7),
                accel: Acceleration::default(),
                operator_cmd: None,
                battery_pct: 100,
            },
        );
        assert_eq!(out.motors.0[0], 0.7);
    }

    #[test]
    fn fly_subtracts_accel_at_0_5_and_above() {
        let mut state = FlightControllerState::new();
        let accel = Acceleration {
            x: 0.1,
            y: 0.05,
            z: -9.8,
        };
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Fly,
                motors: motors(0.8),
                accel,
                operator_cmd: None,
                battery_pct: 100,
            },
        );
        assert!((out.motors.0[0] - (0.8 - 0.15)).abs() < 1e-6);
    }

    #[test]
    fn fly_motor_vector_stays_in_0_1() {
        let mut state = FlightControllerState::new();
        let accel = Acceleration {
            x: -5.0,
            y: -5.0,
            z: 0.0,
        };
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Fly,
                motors: motors(0.9),
                accel,
                operator_cmd: None,
                battery_pct: 100,
            },
        );
        for m in out.motors.0 {
            assert!((0.0..=1.0).contains(&m));
        }
    }

    #[test]
    fn fly_stall_aborts_after_ten_identical_samples() {
        let mut state = FlightControllerState::new();
        let accel = Acceleration {
            x: 0.0,
            y: 0.0,
            z: -9.8,
        };
        state.last_accel = accel;
        let mut out = TickOutput {
            action: Action::Fly,
            motors: motors(0.5),
        };
        for i in 0..FLY_STALL_TICKS {
            out = tick(
                &mut state,
                TickInput {
                    action: out.action,
                    motors: out.motors,
                    accel,
                    operator_cmd: None,
                    battery_pct: 100,
                },
            );
            if i + 1 < FLY_STALL_TICKS {
                assert_eq!(out.action, Action::Fly, "aborted too early at iteration {i}");
            }
        }
        assert_eq!(out.action, Action::Abort);
    }

    #[test]
    fn fly_accepts_eligible_operator_commands() {
        let mut state = FlightControllerState::new();
        for cmd in [Action::SampleGPS, Action::Land, Action::Abort] {
            let out = tick(
                &mut state,
                TickInput {
                    action: Action::Fly,
                    motors: motors(0.1),
                    accel: Acceleration::default(),
                    operator_cmd: Some(cmd),
                    battery_pct: 100,
                },
            );
            assert_eq!(out.action, cmd);
        }
    }

    #[test]
    fn fly_ignores_ineligible_operator_commands() {
        let mut state = FlightControllerState::new();
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Fly,
                motors: motors(0.1),
                accel: Acceleration::default(),
                operator_cmd: Some(Action::Charge),
                battery_pct: 100,
            },
        );
        assert_eq!(out.action, Action::Fly);
    }

    #[test]
    fn idle_accepts_fly_charge_abort_only() {
        let mut state = FlightControllerState::new();
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Idle,
                motors: motors(0.0),
                accel: Acceleration::default(),
                operator_cmd: Some(Action::Land),
                battery_pct: 100,
            },
        );
        assert_eq!(out.action, Action::Idle);
    }

    #[test]
    fn charge_requires_15_percent_to_leave() {
        let mut state = FlightControllerState::new();
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Charge,
                motors: motors(0.0),
                accel: Acceleration::default(),
                operator_cmd: Some(Action::Idle),
                battery_pct: 14,
            },
        );
        assert_eq!(out.action, Action::Charge);

        let out = tick(
            &mut state,
            TickInput {
                action: Action::Charge,
                motors: motors(0.0),
                accel: Acceleration::default(),
                operator_cmd: Some(Action::Idle),
                battery_pct: 15,
            },
        );
        assert_eq!(out.action, Action::Idle);
    }

    #[test]
    fn land_decrements_until_idle() {
        let mut state = FlightControllerState::new();
        let mut current = motors(0.03);
        let mut action = Action::Land;
        for _ in 0..5 {
            let out = tick(
                &mut state,
                TickInput {
                    action,
                    motors: current,
                    accel: Acceleration::default(),
                    operator_cmd: None,
                    battery_pct: 100,
                },
            );
            action = out.action;
            current = out.motors;
            if action == Action::Idle {
                break;
            }
        }
        assert_eq!(action, Action::Idle);
        assert_eq!(current, motors(0.0));
    }

    #[test]
    fn land_can_be_interrupted_by_fly() {
        let mut state = FlightControllerState::new();
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Land,
                motors: motors(0.3),
                accel: Acceleration::default(),
                operator_cmd: Some(Action::Fly),
                battery_pct: 100,
            },
        );
        assert_eq!(out.action, Action::Fly);
        assert_eq!(out.motors, motors(0.3), "interrupted landing must not decrement");
    }

    #[test]
    fn abort_with_low_battery_lands_then_charges() {
        let mut state = FlightControllerState::new();
        let mut current = motors(0.02);
        let mut action = Action::Abort;
        for _ in 0..5 {
            let out = tick(
                &mut state,
                TickInput {
                    action,
                    motors: current,
                    accel: Acceleration::default(),
                    operator_cmd: None,
                    battery_pct: 10,
                },
            );
            // Caller keeps re-presenting Abort until rest (see module docs);
            // emulate that here.
            action = if out.action == Action::Charge {
                out.action
            } else {
                Action::Abort
            };
            current = out.motors;
            if action == Action::Charge {
                break;
            }
        }
        assert_eq!(action, Action::Charge);
        assert_eq!(current, motors(0.0));
    }

    #[test]
    fn abort_with_healthy_battery_reports_last_action_until_rest() {
        let mut state = FlightControllerState::new();
        state.last_action = Action::Fly;
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Abort,
                motors: motors(0.5),
                accel: Acceleration::default(),
                operator_cmd: None,
                battery_pct: 100,
            },
        );
        assert_eq!(out.action, Action::Fly);
        assert_eq!(out.motors, motors(0.49));
    }

    #[test]
    fn unknown_action_fails_safe_to_abort() {
        let mut state = FlightControllerState::new();
        // `Reserved` is the one variant no transition ever produces.
        let out = tick(
            &mut state,
            TickInput {
                action: Action::Reserved,
                motors: motors(0.2),
                accel: Acceleration::default(),
                operator_cmd: None,
                battery_pct: 100,
            },
        );
        assert_eq!(out.action, Action::Abort);
    }
}
