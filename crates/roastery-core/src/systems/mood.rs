//! Mood system - recompute transient mood modifiers from the shop context

use hecs::World;
use roastery_logic::personality::{InteractionContext, PersonalityProfile};

/// Replace every customer's mood modifiers for `context`.
pub fn mood_system(world: &mut World, context: &InteractionContext) {
    for (_, profile) in world.query_mut::<&mut PersonalityProfile>() {
        profile.apply_context(context);
    }
}
