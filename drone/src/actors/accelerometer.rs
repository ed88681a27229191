//! Accelerometer actor: sole writer of the acceleration triple.
//!
//! Acceleration is derived from the current motor PWM with additive
//! Gaussian noise. `MAX_THRUST`/`DIFF_FACTOR` are tunable parameters, not a
//! physical model; the flight controller's stall detection depends on the
//! value actually changing tick to tick, not on any particular curve.

use drone_shared::{Acceleration, ActorRole, SharedRegion};
use rand::Rng;
use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use crate::supervisor::Shutdown;

const TICK_PERIOD: Duration = Duration::from_millis(10);
const MAX_THRUST: f32 = 19.62;
const DIFF_FACTOR: f32 = 0.2;
const GRAVITY: f32 = 9.81;
const NOISE_XY_SIGMA: f32 = 0.02;
const NOISE_Z_SIGMA: f32 = 0.05;

pub fn run(region: &Arc<SharedRegion>, shutdown: &Shutdown) {
    let mut rng = rand::thread_rng();

    while !shutdown.requested() {
        std::thread::sleep(TICK_PERIOD);

        let motors = *region.pwm.lock();
        let thrust = motors.mean() * MAX_THRUST;
        let tilt_x = (motors.0[0] - motors.0[1]) * DIFF_FACTOR;
        let tilt_y = (motors.0[2] - motors.0[3]) * DIFF_FACTOR;

        let accel = Acceleration {
            x: tilt_x + gaussian(&mut rng, NOISE_XY_SIGMA),
            y: tilt_y + gaussian(&mut rng, NOISE_XY_SIGMA),
            z: thrust - GRAVITY + gaussian(&mut rng, NOISE_Z_SIGMA),
        };

        *region.accel.lock() = accel;
        region.heartbeats.tick(ActorRole::Accelerometer);
    }
}

/// One sample from a zero-mean Gaussian of the given standard deviation,
/// via the Box-Muller transform over two independent uniforms.
fn gaussian(rng: &mut impl Rng, sigma: f32) -> f32 {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    let mag = (-2.0 * u1.ln()).sqrt();
    mag * (2.0 * PI * u2).cos() * sigma
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_is_centered_near_zero_over_many_samples() {
        let mut rng = rand::thread_rng();
        let n = 5000;
        let sum: f32 = (0..n).map(|_| gaussian(&mut rng, 1.0)).sum();
        let mean = sum / n as f32;
        assert!(mean.abs() < 0.1, "sample mean {mean} too far from 0");
    }
}
