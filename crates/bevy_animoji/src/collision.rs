use bevy::prelude::*;
use tracing::info;

use crate::candy::{Candy, CandyId, SpawnedCandies};
use crate::config::CandyConfig;
use crate::talk::Talk;

/// Requests a catch pass against the face position of one tracking update.
#[derive(Debug, Clone, Copy, Default, Event)]
pub struct CollisionCheck {
    pub face: Vec3,
}

pub fn is_caught(face: Vec3, candy: Vec3, catch_distance: f32) -> bool {
    face.distance(candy) < catch_distance
}

/// Ids of live candy within reach of `face`, in spawn order.
pub fn caught_candies(
    face: Vec3,
    catch_distance: f32,
    candies: &SpawnedCandies,
    transforms: &Query<&Transform, With<Candy>>,
) -> Vec<CandyId> {
    candies.iter()
        .filter(|candy| transforms.get(candy.entity)
            .is_ok_and(|t| is_caught(face, t.translation, catch_distance)))
        .map(|candy| candy.id)
        .collect()
}

pub fn check_candy_collisions(
    mut commands: Commands,
    mut checks: EventReader<CollisionCheck>,
    mut talks: EventWriter<Talk>,
    config: Res<CandyConfig>,
    mut candies: ResMut<SpawnedCandies>,
    transforms: Query<&Transform, With<Candy>>,
) {
    for check in checks.read() {
        // Mark first, then remove, so the collection is never mutated mid-scan.
        let caught = caught_candies(check.face, config.catch_distance, &candies, &transforms);
        if caught.is_empty() {
            continue;
        }

        for candy in candies.remove_caught(&caught) {
            talks.send(Talk { candy: candy.id });
            commands.entity(candy.entity).despawn_recursive();
            info!(id = %candy.id, "candy caught");
        }
    }
}
