use std::collections::HashMap;
use std::time::Duration;

use bevy::prelude::*;

use animoji_api::{EYE_BLINK_LEFT, EYE_BLINK_RIGHT};

use crate::AnimojiPlugin;
use crate::candy::{Candy, CandyKind, CandyModels};
use crate::config::CandyConfig;
use crate::face::FaceAnchor;
use crate::random::{RandomSource, Randomness};
use crate::tracking::{Face, TrackingUpdate};
use crate::view::ViewEvent;

/// Headless app with a manually driven clock and every candy model available.
pub fn test_app(config: CandyConfig, random: impl RandomSource) -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .insert_resource(Randomness::new(random))
        .add_plugins(AnimojiPlugin::new(config));

    let mut models = app.world_mut().resource_mut::<CandyModels>();
    for kind in CandyKind::ALL {
        models.insert(kind, Handle::default());
    }
    app
}

pub fn show_view(app: &mut App) {
    app.world_mut().send_event(ViewEvent::Appeared);
    app.update();
}

/// Runs one frame `seconds` long, then leaves the clock standing still.
pub fn advance(app: &mut App, seconds: f32) {
    app.world_mut().resource_mut::<Time>().advance_by(Duration::from_secs_f32(seconds));
    app.update();
    app.world_mut().resource_mut::<Time>().advance_by(Duration::ZERO);
}

pub fn tracked_face(position: Vec3, blink: Option<(f32, f32)>) -> Face {
    let mut blend_shapes = HashMap::new();
    if let Some((left, right)) = blink {
        blend_shapes.insert(EYE_BLINK_LEFT.to_string(), left);
        blend_shapes.insert(EYE_BLINK_RIGHT.to_string(), right);
    }
    Face {
        blend_shapes,
        transform: Transform::from_translation(position),
    }
}

/// Delivers a single-face tracking update and runs a frame.
pub fn set_face(app: &mut App, position: Vec3, blink: Option<(f32, f32)>) {
    app.world_mut().send_event(TrackingUpdate {
        faces: vec![tracked_face(position, blink)],
    });
    app.update();
}

pub fn face_anchor(app: &mut App) -> Entity {
    let mut anchors = app.world_mut().query_filtered::<Entity, With<FaceAnchor>>();
    anchors.single(app.world())
}

pub fn candies(app: &mut App) -> Vec<(Candy, Transform)> {
    let mut candies = app.world_mut().query::<(&Candy, &Transform)>();
    let mut found: Vec<(Candy, Transform)> = candies.iter(app.world())
        .map(|(candy, transform)| (*candy, *transform))
        .collect();
    found.sort_by_key(|(candy, _)| candy.id);
    found
}
