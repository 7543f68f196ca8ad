use bevy::prelude::*;
use tracing::{debug, trace};

use crate::collision::CollisionCheck;
use crate::error::AnimojiError;
use crate::tracking::TrackingUpdate;

pub const ANIMOJI_MODEL_PATH: &str = "models/Animoji.glb";

/// Root of the animoji scene. Follows the tracked face.
#[derive(Debug, Clone, Copy, Default, Component, Reflect)]
#[reflect(Component)]
pub struct FaceAnchor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component, Reflect)]
#[reflect(Component)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Recognises the eye nodes of the animoji model by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eyeL" => Some(Eye::Left),
            "eyeR" => Some(Eye::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub enum AnimojiStatus {
    #[default]
    Loading,
    Ready,
    Failed(AnimojiError),
}

#[derive(Debug, Default, Resource)]
pub struct AnimojiScene {
    pub scene: Handle<Scene>,
    pub status: AnimojiStatus,
}

impl AnimojiScene {
    pub fn new(scene: Handle<Scene>) -> Self {
        Self {
            scene,
            status: AnimojiStatus::Loading,
        }
    }
}

/// Horizontal eye scale for a blink intensity; a full blink flattens the eye.
pub fn eyelid_scale(blink: f32) -> f32 {
    1.0 - blink
}

pub fn tag_eyes(
    mut commands: Commands,
    names: Query<(Entity, &Name), Added<Name>>,
) {
    for (entity, name) in &names {
        if let Some(eye) = Eye::from_name(name.as_str()) {
            debug!(?eye, ?entity, "found animoji eye");
            commands.entity(entity).insert(eye);
        }
    }
}

pub fn handle_tracking_updates(
    mut updates: EventReader<TrackingUpdate>,
    mut anchors: Query<&mut Transform, (With<FaceAnchor>, Without<Eye>)>,
    mut eyes: Query<(&Eye, &mut Transform), Without<FaceAnchor>>,
    mut checks: EventWriter<CollisionCheck>,
) {
    for update in updates.read() {
        let Some(face) = update.face() else {
            continue;
        };

        for mut anchor in &mut anchors {
            *anchor = face.transform;
        }

        let Some((left, right)) = face.eye_blink() else {
            trace!("tracking update without eye blink, skipping");
            continue;
        };

        for (eye, mut transform) in &mut eyes {
            transform.scale.x = match eye {
                Eye::Left => eyelid_scale(left),
                Eye::Right => eyelid_scale(right),
            };
        }

        checks.send(CollisionCheck {
            face: face.transform.translation,
        });
    }
}
