use bevy::prelude::*;

use crate::candy::{Candy, CandyModels, PhysicsBody, SpawnedCandies, TriggerVolume, Velocity};
use crate::config::CandyConfig;
use crate::face::{AnimojiScene, Eye, FaceAnchor};
use crate::random::{Randomness, StdRandom};
use crate::scheduler::SpawnTimer;
use crate::talk::{Talk, TalkState};
use crate::tracking::TrackingUpdate;
use crate::view::ViewEvent;

pub mod api;
pub mod assets;
pub mod candy;
pub mod collision;
pub mod config;
pub mod error;
pub mod face;
pub mod random;
pub mod scheduler;
pub mod talk;
pub mod tracking;
pub mod view;

#[cfg(test)]
mod testing;

pub use crate::assets::AnimojiAssetsPlugin;

/// Every per-frame system of the game. They run in one chain, so spawning and
/// tracking never interleave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SystemSet)]
pub struct AnimojiSystems;

/// Face following, eye blinking and candy catching. Does not load assets; add
/// [`AnimojiAssetsPlugin`] for that.
pub struct AnimojiPlugin {
    pub config: CandyConfig,
}

impl AnimojiPlugin {
    pub fn new(config: CandyConfig) -> Self {
        Self { config }
    }
}

impl Plugin for AnimojiPlugin {
    fn name(&self) -> &str {
        "Animoji"
    }

    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Randomness>() {
            app.insert_resource(Randomness::new(StdRandom::from_entropy()));
        }

        app
            .insert_resource(self.config.clone())
            .insert_resource(SpawnTimer::new(self.config.spawn_interval))
            .init_resource::<SpawnedCandies>()
            .init_resource::<CandyModels>()
            .init_resource::<AnimojiScene>()
            .init_resource::<TalkState>()
            .add_event::<ViewEvent>()
            .add_event::<TrackingUpdate>()
            .add_event::<collision::CollisionCheck>()
            .add_event::<Talk>()
            .register_type::<Candy>()
            .register_type::<PhysicsBody>()
            .register_type::<Velocity>()
            .register_type::<TriggerVolume>()
            .register_type::<FaceAnchor>()
            .register_type::<Eye>()
            .add_systems(Update, (
                view::handle_view_events,
                face::tag_eyes,
                candy::apply_gravity,
                candy::spawn_candies,
                face::handle_tracking_updates,
                collision::check_candy_collisions,
                candy::despawn_fallen_candies,
                talk::handle_talk,
            ).chain().in_set(AnimojiSystems));
    }
}
