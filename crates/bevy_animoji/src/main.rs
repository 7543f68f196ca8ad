use std::net::SocketAddr;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use clap::Parser;

use bevy_animoji::{api, view, AnimojiAssetsPlugin, AnimojiPlugin, AnimojiSystems};
use bevy_animoji::config::CandyConfig;
use bevy_animoji::random::{Randomness, StdRandom};
use bevy_animoji::view::ViewEvent;

#[derive(Parser, Debug)]
struct Options {
    #[arg(long, default_value = "127.0.0.1:8888")]
    pub api_bind: String,
    /// Seconds between candy drops.
    #[arg(long, default_value = "2.0")]
    pub spawn_interval: f32,
    #[arg(long, default_value = "0.74")]
    pub horizontal_spread: f32,
    #[arg(long, default_value = "2.7")]
    pub drop_height: f32,
    #[arg(long, default_value = "0.16")]
    pub candy_scale: f32,
    #[arg(long, default_value = "0.2")]
    pub collider_size: f32,
    #[arg(long, default_value = "0.365")]
    pub catch_distance: f32,
    #[arg(long, default_value = "-3.0", allow_hyphen_values = true)]
    pub despawn_height: f32,
    #[arg(long, default_value = "9.81")]
    pub gravity: f32,
    /// Seconds the animoji talks after catching candy.
    #[arg(long, default_value = "1.5")]
    pub talk_duration: f32,
    /// Seed for candy placement. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Show the world inspector.
    #[arg(long)]
    pub inspector: bool,
}

impl Options {
    fn candy_config(&self) -> anyhow::Result<CandyConfig> {
        let config = CandyConfig {
            spawn_interval: Duration::try_from_secs_f32(self.spawn_interval)?,
            horizontal_spread: self.horizontal_spread,
            drop_height: self.drop_height,
            candy_scale: self.candy_scale,
            collider_size: self.collider_size,
            catch_distance: self.catch_distance,
            despawn_height: self.despawn_height,
            gravity: self.gravity,
            talk_duration: Duration::try_from_secs_f32(self.talk_duration)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let options = Options::parse();
    let config = options.candy_config()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let api_addr: SocketAddr = options.api_bind.parse()?;
    let (api_state, api_resource) = api::ApiState::new();
    runtime.spawn(async move {
        let listener = match tokio::net::TcpListener::bind(api_addr).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!("failed to bind API on {}: {}", api_addr, err);
                return;
            }
        };
        tracing::info!("serving tracking API on {}", api_addr);
        if let Err(err) = axum::serve(listener, api::new_api().with_state(api_state)).await {
            tracing::error!("failed to serve API: {}", err);
        }
    });

    let random = match options.seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };

    let mut app = App::new();
    app
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .insert_resource(Randomness::new(random))
        .add_plugins((AnimojiPlugin::new(config), AnimojiAssetsPlugin))
        .insert_resource(api_resource)
        .add_systems(Update, (
            api::update_api,
            view::forward_window_occlusion,
        ).before(AnimojiSystems))
        .add_systems(Startup, init);

    if options.inspector {
        app.add_plugins(WorldInspectorPlugin::new());
    }

    app.run();
    Ok(())
}

fn init(
    mut commands: Commands,
    mut views: EventWriter<ViewEvent>,
) {
    commands.spawn(DirectionalLightBundle {
        transform: Transform::from_xyz(1., 10., 5.)
            .looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    // Looks at the face from in front, high enough to see candy falling in.
    commands.spawn(Camera3dBundle {
        transform: Transform::from_xyz(0., 1., 4.)
            .looking_at(Vec3::new(0., 1., 0.), Vec3::Y),
        ..default()
    });

    views.send(ViewEvent::Appeared);
}
