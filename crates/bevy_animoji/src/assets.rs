use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use tracing::{error, info, warn};

use crate::candy::{CandyKind, CandyModels};
use crate::error::AnimojiError;
use crate::face::{AnimojiScene, AnimojiStatus, FaceAnchor, ANIMOJI_MODEL_PATH};

pub fn candy_model_path(kind: CandyKind) -> String {
    format!("models/{}.glb", kind.asset_name())
}

/// Models still being loaded.
#[derive(Debug, Default, Resource)]
struct PendingModels {
    candies: Vec<(CandyKind, Handle<Gltf>)>,
    animoji: Option<Handle<Gltf>>,
}

enum Resolved {
    Pending,
    Scene(Handle<Scene>),
    Failed(String),
}

fn resolve(asset_server: &AssetServer, gltfs: &Assets<Gltf>, handle: &Handle<Gltf>) -> Resolved {
    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltfs.get(handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            match scene {
                Some(scene) => Resolved::Scene(scene),
                None => Resolved::Failed("model has no scenes".into()),
            }
        }
        Some(LoadState::Failed(err)) => Resolved::Failed(err.to_string()),
        _ => Resolved::Pending,
    }
}

fn load_models(
    asset_server: Res<AssetServer>,
    mut pending: ResMut<PendingModels>,
) {
    for kind in CandyKind::ALL {
        pending.candies.push((kind, asset_server.load(candy_model_path(kind))));
    }
    pending.animoji = Some(asset_server.load(ANIMOJI_MODEL_PATH));
}

fn resolve_models(
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut pending: ResMut<PendingModels>,
    mut models: ResMut<CandyModels>,
    mut animoji: ResMut<AnimojiScene>,
    mut anchors: Query<&mut Handle<Scene>, With<FaceAnchor>>,
) {
    pending.candies.retain(|(kind, handle)| match resolve(&asset_server, &gltfs, handle) {
        Resolved::Pending => true,
        Resolved::Scene(scene) => {
            info!(?kind, "candy model loaded");
            models.insert(*kind, scene);
            false
        }
        Resolved::Failed(reason) => {
            warn!(?kind, %reason, "failed to load candy model, it will not be dropped");
            models.mark_failed(*kind);
            false
        }
    });

    let Some(handle) = pending.animoji.as_ref() else {
        return;
    };
    match resolve(&asset_server, &gltfs, handle) {
        Resolved::Pending => return,
        Resolved::Scene(scene) => {
            info!("animoji loaded");
            for mut anchor_scene in &mut anchors {
                *anchor_scene = scene.clone();
            }
            animoji.scene = scene;
            animoji.status = AnimojiStatus::Ready;
        }
        Resolved::Failed(reason) => {
            let err = AnimojiError::SceneLoad {
                path: ANIMOJI_MODEL_PATH.to_string(),
                reason,
            };
            error!("{}", err);
            animoji.status = AnimojiStatus::Failed(err);
        }
    }
    pending.animoji = None;
}

/// Loads the animoji and candy models through the [`AssetServer`].
pub struct AnimojiAssetsPlugin;

impl Plugin for AnimojiAssetsPlugin {
    fn name(&self) -> &str {
        "AnimojiAssets"
    }

    fn build(&self, app: &mut App) {
        app
            .init_resource::<PendingModels>()
            .add_systems(Startup, load_models)
            .add_systems(PreUpdate, resolve_models);
    }
}
