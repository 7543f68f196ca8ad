use bevy::prelude::*;
use bevy::window::WindowOccluded;
use tracing::info;

use crate::face::{AnimojiScene, FaceAnchor};
use crate::scheduler::SpawnTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub enum ViewEvent {
    Appeared,
    Disappeared,
}

/// Shows the animoji on first appearance and runs the spawn timer while visible.
pub fn handle_view_events(
    mut commands: Commands,
    mut events: EventReader<ViewEvent>,
    mut timer: ResMut<SpawnTimer>,
    animoji: Res<AnimojiScene>,
    anchors: Query<(), With<FaceAnchor>>,
) {
    let mut anchored = !anchors.is_empty();
    for event in events.read() {
        match event {
            ViewEvent::Appeared => {
                if !anchored {
                    commands.spawn((
                        SceneBundle {
                            scene: animoji.scene.clone(),
                            ..default()
                        },
                        FaceAnchor,
                        Name::new("animoji"),
                    ));
                    anchored = true;
                }
                if !timer.is_running() {
                    timer.start();
                    info!(interval = ?timer.interval(), "candy dropping started");
                }
            }
            ViewEvent::Disappeared => {
                if timer.is_running() {
                    timer.stop();
                    info!("candy dropping stopped");
                }
            }
        }
    }
}

/// Treats an occluded window as a hidden view.
pub fn forward_window_occlusion(
    mut occlusions: EventReader<WindowOccluded>,
    mut views: EventWriter<ViewEvent>,
) {
    for occlusion in occlusions.read() {
        views.send(if occlusion.occluded {
            ViewEvent::Disappeared
        } else {
            ViewEvent::Appeared
        });
    }
}
