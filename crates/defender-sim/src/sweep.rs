//! Swept hit test for fast projectiles.
//!
//! A projectile moving `speed * dt` per tick can tunnel through a target
//! between two samples, so instead of sampling overlap we cast its box along
//! the travel direction and take the nearest target box it would enter.
//!
//! Targets are compared through the nearest horizontal image on the torus,
//! so a shot fired across the seam still connects before the wrap pass has
//! normalized the target.

use glam::DVec2;
use hecs::Entity;

use defender_core::components::HitBox;
use defender_core::types::Position;

/// Nearest target found by a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    pub target: Entity,
    /// Distance travelled from the origin to first contact.
    pub distance: f64,
}

/// Cast a ray from `origin` along unit `dir` against an AABB.
///
/// Returns the entry distance in `[0, max_dist]`, or `None` if the ray misses
/// or enters beyond `max_dist`. Starting inside the box counts as a hit at 0.
pub fn ray_vs_aabb(
    origin: DVec2,
    dir: DVec2,
    max_dist: f64,
    center: DVec2,
    half: DVec2,
) -> Option<f64> {
    let min = center - half;
    let max = center + half;
    let mut t_enter = 0.0_f64;
    let mut t_exit = max_dist;

    for axis in 0..2 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() <= 1e-12 {
            // Parallel to this slab: must already be between its planes.
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

/// Horizontal offset from `from` to `to` through the nearest torus image.
pub fn nearest_dx(from: f64, to: f64, width: f64) -> f64 {
    let mut dx = to - from;
    if width > 0.0 {
        dx -= width * (dx / width).round();
    }
    dx
}

/// Sweep a projectile box along `rotation` for `distance` and return the
/// closest candidate it would touch.
pub fn first_hit<I>(
    origin: Position,
    rotation: f64,
    distance: f64,
    projectile_box: HitBox,
    map_width: f64,
    candidates: I,
) -> Option<SweepHit>
where
    I: IntoIterator<Item = (Entity, Position, HitBox)>,
{
    if distance <= 0.0 {
        return None;
    }
    let o = DVec2::new(origin.x, origin.y);
    let dir = DVec2::from_angle(rotation);
    let pad = DVec2::new(projectile_box.half_width, projectile_box.half_height);

    let mut best: Option<SweepHit> = None;
    for (target, pos, hit_box) in candidates {
        let center = DVec2::new(origin.x + nearest_dx(origin.x, pos.x, map_width), pos.y);
        // Minkowski sum: casting a box equals casting a point at the grown box.
        let half = DVec2::new(hit_box.half_width, hit_box.half_height) + pad;
        if let Some(t) = ray_vs_aabb(o, dir, distance, center, half) {
            if best.map_or(true, |b| t < b.distance) {
                best = Some(SweepHit { target, distance: t });
            }
        }
    }
    best
}
