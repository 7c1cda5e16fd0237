//! Enemy patrol and fire.
//!
//! Enemies drift diagonally, bounce off the top and bottom of the play area
//! and randomly reverse horizontally. While on screen they shoot at the
//! nearest living player.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use defender_core::components::{Active, EnemyBrain, PlayerStats};
use defender_core::prototypes::EnemyTuning;
use defender_core::types::Position;

use crate::map::Map;
use crate::sweep::nearest_dx;
use crate::systems::camera::Camera;
use crate::systems::projectiles::ShotRequest;

/// Update the patrol direction and position of one enemy.
///
/// The flip test `rand < flip_rate * dt` makes the flip frequency depend
/// on the tick rate. Kept as-is to match the tuned feel of the game.
pub fn patrol(
    tuning: &EnemyTuning,
    brain: &mut EnemyBrain,
    pos: &mut Position,
    y_bounds: (f64, f64),
    rng: &mut ChaCha8Rng,
    dt: f64,
) {
    if rng.gen::<f64>() < tuning.flip_rate * dt {
        brain.move_x = -brain.move_x;
    }

    if pos.y > y_bounds.1 - tuning.edge_margin {
        brain.move_y = -tuning.vertical_step;
    }
    if pos.y < y_bounds.0 + tuning.edge_margin {
        brain.move_y = tuning.vertical_step;
    }

    pos.x += tuning.speed * dt * brain.move_x;
    pos.y += tuning.speed * dt * brain.move_y;
}

/// Direction from `from` toward the nearest target by horizontal distance
/// through the seam. Falls back to a random heading when there is no target
/// or it sits exactly on `from`.
pub fn aim(
    from: &Position,
    targets: &[Position],
    map_width: f64,
    rng: &mut ChaCha8Rng,
) -> (f64, f64) {
    let nearest = targets
        .iter()
        .map(|t| (nearest_dx(from.x, t.x, map_width), t.y - from.y))
        .min_by(|a, b| a.0.abs().total_cmp(&b.0.abs()));

    if let Some((dx, dy)) = nearest {
        let len = (dx * dx + dy * dy).sqrt();
        if len > 1e-9 {
            return (dx / len, dy / len);
        }
    }
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    (angle.cos(), angle.sin())
}

/// Move every enemy and queue the shots of those on screen.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    map: &Map,
    camera: &Camera,
    view_half_width: f64,
    dt: f64,
    shots: &mut Vec<ShotRequest>,
) {
    let targets: Vec<Position> = world
        .query_mut::<(&Active, &Position, &PlayerStats)>()
        .into_iter()
        .filter(|(_, (_, _, stats))| !stats.is_game_over())
        .map(|(_, (_, pos, _))| *pos)
        .collect();

    for (_entity, (_active, pos, brain, tuning)) in
        world.query_mut::<(&Active, &mut Position, &mut EnemyBrain, &EnemyTuning)>()
    {
        patrol(tuning, brain, pos, map.bounds(), rng, dt);

        brain.fire_timer = (brain.fire_timer + dt).min(tuning.fire_interval);
        let on_screen = nearest_dx(camera.x, pos.x, map.width()).abs() <= view_half_width;
        if on_screen && brain.fire_timer >= tuning.fire_interval {
            brain.fire_timer = 0.0;
            let (dx, dy) = aim(pos, &targets, map.width(), rng);
            shots.push(ShotRequest {
                prototype: tuning.projectile,
                position: *pos,
                rotation: dy.atan2(dx),
                owner: None,
                inherited_speed: 0.0,
                direction: Some((dx, dy)),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_bounces_off_vertical_edges() {
        let tuning = EnemyTuning {
            flip_rate: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut brain = EnemyBrain::default();
        let mut pos = Position::new(0.0, -7.5);
        patrol(&tuning, &mut brain, &mut pos, (-8.0, 8.0), &mut rng, 0.1);
        assert_eq!(brain.move_y, 0.5);
        assert!((pos.y - (-7.5 + 0.1)).abs() < 1e-12);

        let mut pos = Position::new(0.0, 7.5);
        patrol(&tuning, &mut brain, &mut pos, (-8.0, 8.0), &mut rng, 0.1);
        assert_eq!(brain.move_y, -0.5);
    }

    #[test]
    fn test_initial_heading() {
        let tuning = EnemyTuning {
            flip_rate: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut brain = EnemyBrain::default();
        let mut pos = Position::default();
        patrol(&tuning, &mut brain, &mut pos, (-8.0, 8.0), &mut rng, 1.0);
        assert_eq!(pos, Position::new(2.0, -1.0));
    }

    #[test]
    fn test_flip_is_certain_at_high_rate() {
        let tuning = EnemyTuning {
            flip_rate: 1000.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut brain = EnemyBrain::default();
        let mut pos = Position::default();
        patrol(&tuning, &mut brain, &mut pos, (-8.0, 8.0), &mut rng, 1.0);
        assert_eq!(brain.move_x, -1.0);
    }

    #[test]
    fn test_aim_at_nearest_through_seam() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let from = Position::new(31.0, 0.0);
        let targets = [Position::new(20.0, 0.0), Position::new(-31.0, 0.0)];
        let (dx, dy) = aim(&from, &targets, 64.0, &mut rng);
        // -31 is 2 units to the right across the seam.
        assert!((dx - 1.0).abs() < 1e-12);
        assert!(dy.abs() < 1e-12);
    }

    #[test]
    fn test_aim_without_target_is_unit_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let (dx, dy) = aim(&Position::default(), &[], 64.0, &mut rng);
        assert!(((dx * dx + dy * dy).sqrt() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_only_on_screen_enemies_fire() {
        let map = Map::from_config(&defender_core::config::MapConfig::default()).unwrap();
        let mut world = World::new();
        let tuning = EnemyTuning {
            flip_rate: 0.0,
            fire_interval: 0.5,
            ..Default::default()
        };
        world.spawn((Active, Position::new(3.0, 0.0), EnemyBrain::default(), tuning));
        world.spawn((Active, Position::new(25.0, 0.0), EnemyBrain::default(), tuning));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut shots = Vec::new();
        for _ in 0..6 {
            run(&mut world, &mut rng, &map, &Camera::default(), 10.0, 0.1, &mut shots);
        }
        assert_eq!(shots.len(), 1);
        assert!((shots[0].position.x - 4.0).abs() < 0.5);
    }
}
