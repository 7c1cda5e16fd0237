//! Wrap coordinator: keeps the camera inside the map area and every active
//! entity within half a map width of the camera.
//!
//! Positions are never taken modulo the width. An entity that drifts past
//! the threshold is moved by whole widths, and its trail is moved by the
//! same amount in the same pass so the rendered trail never streaks across
//! the screen.

use hecs::World;

use defender_core::components::{Active, TrailHistory, WrapRule};
use defender_core::enums::WrapPolicy;
use defender_core::events::GameEvent;
use defender_core::types::Position;

use crate::map::Map;
use crate::pool::entity_id;
use crate::systems::camera::Camera;

/// Shift (a multiple of the map width) that brings `x` back inside the
/// policy's window around `reference`. Zero when already inside.
///
/// Only strict inequality triggers a shift, so a position sitting exactly on
/// the threshold stays put.
pub fn wrap_offset(x: f64, reference: f64, map: &Map, policy: WrapPolicy) -> f64 {
    let width = map.width();
    if !x.is_finite() || !reference.is_finite() {
        return 0.0;
    }
    let (lo, hi) = match policy {
        WrapPolicy::CenterHalfWidth => (-width / 2.0, width / 2.0),
        WrapPolicy::AreaBounds => (map.x_min(), map.x_max()),
    };

    let delta = x - reference;
    let mut shift = if delta > hi {
        -((delta - hi) / width).ceil() * width
    } else if delta < lo {
        ((lo - delta) / width).ceil() * width
    } else {
        return 0.0;
    };

    // Re-check with the exact expression a second pass would evaluate, so
    // one application always leaves the position normalized.
    for _ in 0..2 {
        let after = (x + shift) - reference;
        if after > hi {
            shift -= width;
        } else if after < lo {
            shift += width;
        } else {
            break;
        }
    }
    shift
}

/// Normalize the camera, then every active entity against it.
/// Emits one `WrapShift` event per moved entity.
pub fn run(world: &mut World, map: &Map, camera: &mut Camera, events: &mut Vec<GameEvent>) {
    let camera_shift = wrap_offset(camera.x, 0.0, map, WrapPolicy::AreaBounds);
    if camera_shift != 0.0 {
        camera.x += camera_shift;
        log::trace!("camera wrapped by {camera_shift}");
        events.push(GameEvent::WrapShift {
            entity: None,
            delta: camera_shift,
        });
    }

    // The followed player is wrapped by the pass below like any other entity,
    // which keeps its offset from the camera unchanged across a camera shift.
    for (entity, (_active, pos, rule, trail)) in world.query_mut::<(
        &Active,
        &mut Position,
        &WrapRule,
        Option<&mut TrailHistory>,
    )>() {
        let shift = wrap_offset(pos.x, camera.x, map, rule.policy);
        if shift == 0.0 {
            continue;
        }
        pos.x += shift;
        if let Some(trail) = trail {
            trail.shift_x(shift);
        }
        events.push(GameEvent::WrapShift {
            entity: Some(entity_id(entity)),
            delta: shift,
        });
    }
}
