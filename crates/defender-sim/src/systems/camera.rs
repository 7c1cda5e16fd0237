//! Camera tracker: follows the player ship with a facing-dependent lead.

use hecs::World;
use serde::{Deserialize, Serialize};

use defender_core::components::{Active, ShipControl};
use defender_core::config::CameraConfig;
use defender_core::prototypes::PlayerTuning;
use defender_core::types::{Position, Velocity};

/// Camera placement in world space. Only x moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Move the camera one step toward `target_x`.
///
/// Gaps larger than the snap distance jump straight to the target. Smaller
/// gaps ease at a rate that slows down to `slow_follow_fraction` of the
/// base speed when the ship is slow or flying backward.
pub fn follow(
    camera: &mut Camera,
    target_x: f64,
    forward_speed_ratio: f64,
    base_follow_speed: f64,
    config: &CameraConfig,
    dt: f64,
) {
    let gap = target_x - camera.x;
    if gap.abs() > config.snap_distance {
        camera.x = target_x;
        return;
    }
    let follow_speed = lerp(
        config.slow_follow_fraction * base_follow_speed,
        base_follow_speed,
        clamp01(forward_speed_ratio),
    );
    camera.x += gap * (follow_speed * dt).min(1.0);
}

/// Track the first active player ship. Without a player the camera holds.
pub fn run(world: &mut World, camera: &mut Camera, config: &CameraConfig, dt: f64) {
    let tracked = world
        .query_mut::<(&Active, &Position, &Velocity, &ShipControl, &PlayerTuning)>()
        .into_iter()
        .next()
        .map(|(_, (_, pos, vel, ship, tuning))| {
            let facing = ship.facing.sign();
            let target = pos.x + tuning.camera_offset_x * facing;
            let ratio = if tuning.max_speed_x > 0.0 {
                vel.x * facing / tuning.max_speed_x
            } else {
                0.0
            };
            (target, ratio, tuning.camera_follow_speed)
        });

    camera.y = config.y;
    if let Some((target, ratio, base)) = tracked {
        follow(camera, target, ratio, base, config, dt);
    }
}
