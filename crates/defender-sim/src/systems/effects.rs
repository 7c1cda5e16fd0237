//! Effect lifetime: finished effects go back to their pool.

use hecs::{Entity, World};

use defender_core::components::{Active, EffectState};
use defender_core::prototypes::EffectTuning;

/// Age every effect and queue the finished ones for release.
pub fn run(world: &mut World, dt: f64, release_buffer: &mut Vec<Entity>) {
    for (entity, (_active, state, tuning)) in
        world.query_mut::<(&Active, &mut EffectState, &EffectTuning)>()
    {
        state.elapsed += dt;
        if state.elapsed >= tuning.duration {
            release_buffer.push(entity);
        }
    }
}
