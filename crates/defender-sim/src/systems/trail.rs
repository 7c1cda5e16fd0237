//! Trail recording for entities that render a motion trail.

use hecs::World;

use defender_core::components::{Active, TrailHistory};
use defender_core::types::Position;

/// Push the current position onto every active trail (newest first).
pub fn run(world: &mut World) {
    for (_entity, (_active, pos, trail)) in
        world.query_mut::<(&Active, &Position, &mut TrailHistory)>()
    {
        trail.record(*pos);
    }
}
