//! Player steering and cannon.
//!
//! Input arrives already mapped to `[-1, 1]` per axis. Horizontal motion is
//! acceleration-driven with a stick-scaled top speed; vertical motion tracks
//! the stick directly.

use hecs::World;

use defender_core::commands::TickInput;
use defender_core::components::{Active, PlayerStats, ShipControl};
use defender_core::enums::Facing;
use defender_core::prototypes::PlayerTuning;
use defender_core::types::{Position, Velocity};

use crate::map::Map;
use crate::pool::entity_id;
use crate::systems::projectiles::ShotRequest;

/// Sign with zero counted as positive.
fn sign(v: f64) -> f64 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Advance one ship by `dt`. Returns true when the cannon fires this step.
pub fn steer(
    tuning: &PlayerTuning,
    input: &TickInput,
    y_bounds: (f64, f64),
    pos: &mut Position,
    vel: &mut Velocity,
    ship: &mut ShipControl,
    dt: f64,
) -> bool {
    let mut max_x = tuning.max_speed_x;
    let max_y = tuning.max_speed_y;
    if input.move_x.abs() > 0.0 {
        max_x *= lerp(tuning.min_speed_fraction, 1.0, input.move_x.abs());
    }

    let mut accel_x = input.move_x * tuning.acceleration_x;
    let accel_y = input.move_y * tuning.acceleration_y;
    // Turning around accelerates twice as hard.
    if sign(vel.x) != sign(input.move_x) {
        accel_x *= 2.0;
    }
    vel.x += accel_x * dt;
    vel.y += accel_y * dt;

    // Vertical speed follows the stick directly.
    vel.y = input.move_y * max_y;

    vel.x = vel.x.clamp(-max_x, max_x);
    vel.y = vel.y.clamp(-max_y, max_y);

    if input.move_x == 0.0 {
        vel.x += -vel.x * (tuning.brake_damping_x * dt).min(1.0);
    }
    if input.move_y == 0.0 {
        vel.y += -vel.y * (tuning.brake_damping_y * dt).min(1.0);
    }

    pos.x += vel.x * dt;
    pos.y += vel.y * dt;

    let lo = y_bounds.0 + tuning.vertical_margin;
    let hi = y_bounds.1 - tuning.vertical_margin;
    pos.y = if lo <= hi {
        pos.y.clamp(lo, hi)
    } else {
        (y_bounds.0 + y_bounds.1) / 2.0
    };

    if input.move_x != 0.0 {
        ship.facing = if input.move_x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
    }

    let fire = ship.fire_timer > tuning.fire_rate && input.fire;
    if fire {
        ship.fire_timer = 0.0;
    }
    ship.fire_timer += dt;
    fire
}

/// Build the shot a ship fires from its current state.
pub fn cannon_shot(
    tuning: &PlayerTuning,
    pos: &Position,
    vel: &Velocity,
    ship: &ShipControl,
    owner: hecs::Entity,
) -> ShotRequest {
    let facing = ship.facing.sign();
    let inherited_speed = if sign(vel.x) == facing {
        vel.x.abs()
    } else {
        0.0
    };
    ShotRequest {
        prototype: tuning.projectile,
        position: Position::new(
            pos.x + tuning.cannon_offset_x * facing,
            pos.y + tuning.cannon_offset_y,
        ),
        rotation: ship.facing.rotation(),
        owner: Some(entity_id(owner)),
        inherited_speed,
        direction: None,
    }
}

/// Steer every live ship and queue the shots they fire.
/// Ships that are game over neither move nor fire.
pub fn run(
    world: &mut World,
    input: &TickInput,
    map: &Map,
    dt: f64,
    shots: &mut Vec<ShotRequest>,
) {
    for (entity, (_active, pos, vel, ship, stats, tuning)) in world.query_mut::<(
        &Active,
        &mut Position,
        &mut Velocity,
        &mut ShipControl,
        &PlayerStats,
        &PlayerTuning,
    )>() {
        if stats.is_game_over() {
            continue;
        }
        if steer(tuning, input, map.bounds(), pos, vel, ship, dt) {
            shots.push(cannon_shot(tuning, pos, vel, ship, entity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn input(move_x: f64, move_y: f64, fire: bool) -> TickInput {
        TickInput {
            move_x,
            move_y,
            fire,
            submit: false,
        }
    }

    #[test]
    fn test_accelerates_to_scaled_top_speed() {
        let tuning = PlayerTuning::default();
        let mut pos = Position::default();
        let mut vel = Velocity::default();
        let mut ship = ShipControl::default();
        for _ in 0..600 {
            steer(&tuning, &input(0.5, 0.0, false), (-8.0, 8.0), &mut pos, &mut vel, &mut ship, DT);
        }
        // 20 * lerp(0.2, 1, 0.5) = 12
        assert!((vel.x - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_turning_doubles_acceleration() {
        let tuning = PlayerTuning::default();
        let mut pos = Position::default();
        let mut ship = ShipControl::default();

        let mut vel = Velocity::new(5.0, 0.0);
        steer(&tuning, &input(-1.0, 0.0, false), (-8.0, 8.0), &mut pos, &mut vel, &mut ship, DT);
        assert!((vel.x - (5.0 - 100.0 * DT)).abs() < 1e-9);
        assert_eq!(ship.facing, Facing::Left);

        let mut vel = Velocity::new(-5.0, 0.0);
        steer(&tuning, &input(-1.0, 0.0, false), (-8.0, 8.0), &mut pos, &mut vel, &mut ship, DT);
        assert!((vel.x - (-5.0 - 50.0 * DT)).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_input_brakes() {
        let tuning = PlayerTuning::default();
        let mut pos = Position::default();
        let mut vel = Velocity::new(10.0, 0.0);
        let mut ship = ShipControl::default();
        steer(&tuning, &input(0.0, 0.0, false), (-8.0, 8.0), &mut pos, &mut vel, &mut ship, DT);
        assert!((vel.x - 10.0 * (1.0 - 2.0 * DT)).abs() < 1e-9);
        assert_eq!(ship.facing, Facing::Right);
    }

    #[test]
    fn test_vertical_clamped_to_play_area() {
        let tuning = PlayerTuning::default();
        let mut pos = Position::default();
        let mut vel = Velocity::default();
        let mut ship = ShipControl::default();
        for _ in 0..300 {
            steer(&tuning, &input(0.0, 1.0, false), (-8.0, 8.0), &mut pos, &mut vel, &mut ship, DT);
        }
        assert!((pos.y - 7.7).abs() < 1e-9);
        assert!((vel.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fire_rate_gates_shots() {
        let tuning = PlayerTuning::default();
        let mut pos = Position::default();
        let mut vel = Velocity::default();
        let mut ship = ShipControl::default();
        let mut shots = 0;
        // One second of held fire at 60 Hz with a 0.1 s fire rate.
        for _ in 0..60 {
            if steer(&tuning, &input(0.0, 0.0, true), (-8.0, 8.0), &mut pos, &mut vel, &mut ship, DT) {
                shots += 1;
            }
        }
        assert!((8..=10).contains(&shots), "fired {shots} shots");
    }

    #[test]
    fn test_cannon_shot_mirrors_and_inherits() {
        let tuning = PlayerTuning::default();
        let mut world = World::new();
        let owner = world.spawn(());
        let pos = Position::new(2.0, 1.0);

        let ship = ShipControl {
            facing: Facing::Left,
            fire_timer: 0.0,
        };
        let shot = cannon_shot(&tuning, &pos, &Velocity::new(-6.0, 0.0), &ship, owner);
        assert!((shot.position.x - 1.4).abs() < 1e-12);
        assert!((shot.position.y - 0.9).abs() < 1e-12);
        assert_eq!(shot.rotation, std::f64::consts::PI);
        assert_eq!(shot.inherited_speed, 6.0);

        // Flying backward does not add speed.
        let shot = cannon_shot(&tuning, &pos, &Velocity::new(6.0, 0.0), &ship, owner);
        assert_eq!(shot.inherited_speed, 0.0);
    }
}
