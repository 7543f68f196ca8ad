use std::collections::{HashMap, HashSet};
use std::fmt;

use bevy::prelude::*;
use tracing::{debug, info};

use crate::config::CandyConfig;
use crate::face::FaceAnchor;
use crate::random::{RandomSource, Randomness};
use crate::scheduler::SpawnTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CandyKind {
    Lollipop,
    CandyCorn,
}

impl CandyKind {
    pub const ALL: [CandyKind; 2] = [CandyKind::Lollipop, CandyKind::CandyCorn];

    pub fn choose(random: &mut dyn RandomSource) -> Self {
        if random.coin_flip() {
            CandyKind::Lollipop
        } else {
            CandyKind::CandyCorn
        }
    }

    /// Name of the model asset for this kind.
    pub fn asset_name(self) -> &'static str {
        match self {
            CandyKind::Lollipop => "Lolipop",
            CandyKind::CandyCorn => "Candy_Corn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct CandyId(u64);

impl fmt::Display for CandyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candy-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Component, Reflect)]
#[reflect(Component)]
pub struct Candy {
    pub id: CandyId,
    pub kind: CandyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum BodyMode {
    #[default]
    Dynamic,
    Static,
}

#[derive(Debug, Clone, Copy, Default, Component, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub mode: BodyMode,
}

impl PhysicsBody {
    pub fn dynamic() -> Self {
        Self { mode: BodyMode::Dynamic }
    }
}

#[derive(Debug, Clone, Copy, Default, Component, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec3);

/// Box collision volume that reports overlaps without pushing anything.
#[derive(Debug, Clone, Copy, Component, Reflect)]
#[reflect(Component)]
pub struct TriggerVolume {
    pub half_extents: Vec3,
}

impl TriggerVolume {
    pub fn cube(size: f32) -> Self {
        Self {
            half_extents: Vec3::splat(size * 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedCandy {
    pub id: CandyId,
    pub entity: Entity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandyStats {
    pub spawned: u64,
    pub caught: u64,
    pub dropped: u64,
}

/// Live candy in spawn order.
#[derive(Debug, Default, Resource)]
pub struct SpawnedCandies {
    candies: Vec<SpawnedCandy>,
    next_id: u64,
    stats: CandyStats,
}

impl SpawnedCandies {
    pub fn next_id(&mut self) -> CandyId {
        let id = CandyId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, candy: SpawnedCandy) {
        self.candies.push(candy);
        self.stats.spawned += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item=&SpawnedCandy> {
        self.candies.iter()
    }

    pub fn len(&self) -> usize {
        self.candies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candies.is_empty()
    }

    pub fn contains(&self, id: CandyId) -> bool {
        self.candies.iter().any(|c| c.id == id)
    }

    pub fn stats(&self) -> CandyStats {
        self.stats
    }

    pub fn remove_caught(&mut self, ids: &[CandyId]) -> Vec<SpawnedCandy> {
        let taken = self.take(ids);
        self.stats.caught += taken.len() as u64;
        taken
    }

    pub fn remove_dropped(&mut self, ids: &[CandyId]) -> Vec<SpawnedCandy> {
        let taken = self.take(ids);
        self.stats.dropped += taken.len() as u64;
        taken
    }

    // Each live id appears once, so a candy is taken at most once.
    fn take(&mut self, ids: &[CandyId]) -> Vec<SpawnedCandy> {
        let mut taken = Vec::new();
        self.candies.retain(|candy| {
            if ids.contains(&candy.id) {
                taken.push(*candy);
                false
            } else {
                true
            }
        });
        taken
    }
}

/// Candy scenes by kind. Kinds without a usable scene are skipped when spawning.
#[derive(Debug, Default, Resource)]
pub struct CandyModels {
    scenes: HashMap<CandyKind, Handle<Scene>>,
    failed: HashSet<CandyKind>,
}

impl CandyModels {
    pub fn insert(&mut self, kind: CandyKind, scene: Handle<Scene>) {
        self.failed.remove(&kind);
        self.scenes.insert(kind, scene);
    }

    /// Returns `true` the first time a kind is marked.
    pub fn mark_failed(&mut self, kind: CandyKind) -> bool {
        self.failed.insert(kind)
    }

    pub fn get(&self, kind: CandyKind) -> Option<Handle<Scene>> {
        if self.failed.contains(&kind) {
            return None;
        }
        self.scenes.get(&kind).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item=(CandyKind, &Handle<Scene>)> {
        self.scenes.iter().map(|(kind, scene)| (*kind, scene))
    }
}

/// Where a candy appears for a face at `face` and a sampled horizontal offset.
pub fn drop_position(face: Vec3, offset: f32, config: &CandyConfig) -> Vec3 {
    Vec3::new(face.x + offset, face.y + config.drop_height, face.z)
}

pub fn spawn_candies(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<CandyConfig>,
    models: Res<CandyModels>,
    mut timer: ResMut<SpawnTimer>,
    mut random: ResMut<Randomness>,
    mut candies: ResMut<SpawnedCandies>,
    anchors: Query<&Transform, With<FaceAnchor>>,
) {
    for _ in 0..timer.tick(time.delta()) {
        let kind = CandyKind::choose(&mut *random.0);
        let Some(scene) = models.get(kind) else {
            debug!(?kind, "candy model unavailable, skipping spawn");
            continue;
        };

        let Ok(face) = anchors.get_single() else {
            debug!("no face anchor, skipping spawn");
            continue;
        };

        let offset = random.0.uniform(-config.horizontal_spread, config.horizontal_spread);
        let position = drop_position(face.translation, offset, &config);
        let id = candies.next_id();

        // Candy is a root entity, so its transform is relative to the world origin.
        let entity = commands.spawn((
            SceneBundle {
                scene,
                transform: Transform::from_translation(position)
                    .with_scale(Vec3::splat(config.candy_scale)),
                ..default()
            },
            Candy { id, kind },
            PhysicsBody::dynamic(),
            Velocity::default(),
            TriggerVolume::cube(config.collider_size),
            Name::new(id.to_string()),
        )).id();

        candies.push(SpawnedCandy { id, entity });
        debug!(%id, ?kind, ?position, "spawned candy");
    }
}

pub fn apply_gravity(
    time: Res<Time>,
    config: Res<CandyConfig>,
    mut bodies: Query<(&PhysicsBody, &mut Velocity, &mut Transform)>,
) {
    let dt = time.delta_seconds();
    if dt == 0. {
        return;
    }

    for (body, mut velocity, mut transform) in &mut bodies {
        if body.mode != BodyMode::Dynamic {
            continue;
        }
        velocity.0.y -= config.gravity * dt;
        transform.translation += velocity.0 * dt;
    }
}

/// Removes candy that fell out of the world, or whose entity is already gone.
pub fn despawn_fallen_candies(
    mut commands: Commands,
    config: Res<CandyConfig>,
    mut candies: ResMut<SpawnedCandies>,
    transforms: Query<&Transform, With<Candy>>,
) {
    let fallen: Vec<CandyId> = candies.iter()
        .filter(|candy| match transforms.get(candy.entity) {
            Ok(transform) => transform.translation.y < config.despawn_height,
            Err(_) => true,
        })
        .map(|candy| candy.id)
        .collect();
    if fallen.is_empty() {
        return;
    }

    for candy in candies.remove_dropped(&fallen) {
        if let Some(entity) = commands.get_entity(candy.entity) {
            entity.despawn_recursive();
        }
        debug!(id = %candy.id, "candy fell out of the world");
    }
    info!(live = candies.len(), stats = ?candies.stats(), "removed fallen candy");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::random::{SequenceRandom, StdRandom};
    use crate::testing::*;
    use crate::view::ViewEvent;

    use super::*;

    #[test]
    fn test_drop_position() {
        let config = CandyConfig::default();
        let position = drop_position(Vec3::ZERO, 0.5, &config);
        assert_eq!(position, Vec3::new(0.5, 2.7, 0.0));

        let position = drop_position(Vec3::new(1.0, -1.0, 2.0), -0.25, &config);
        assert_eq!(position, Vec3::new(0.75, -1.0 + 2.7, 2.0));
    }

    #[test]
    fn test_choose_kind() {
        let mut random = SequenceRandom::new([true, false], []);
        assert_eq!(CandyKind::choose(&mut random), CandyKind::Lollipop);
        assert_eq!(CandyKind::choose(&mut random), CandyKind::CandyCorn);
        assert_eq!(CandyKind::Lollipop.asset_name(), "Lolipop");
        assert_eq!(CandyKind::CandyCorn.asset_name(), "Candy_Corn");
    }

    #[test]
    fn test_take_removes_each_candy_once() {
        let mut candies = SpawnedCandies::default();
        let a = candies.next_id();
        let b = candies.next_id();
        assert_ne!(a, b);
        candies.push(SpawnedCandy { id: a, entity: Entity::from_raw(1) });
        candies.push(SpawnedCandy { id: b, entity: Entity::from_raw(2) });

        let taken = candies.remove_caught(&[a, a]);
        assert_eq!(taken.len(), 1);
        assert!(candies.remove_caught(&[a]).is_empty());
        assert!(!candies.contains(a));
        assert!(candies.contains(b));
        assert_eq!(candies.stats(), CandyStats { spawned: 2, caught: 1, dropped: 0 });
    }

    #[test]
    fn test_failed_model_is_unavailable() {
        let mut models = CandyModels::default();
        models.insert(CandyKind::Lollipop, Handle::default());
        assert!(models.get(CandyKind::Lollipop).is_some());
        assert!(models.get(CandyKind::CandyCorn).is_none());

        assert!(models.mark_failed(CandyKind::Lollipop));
        assert!(!models.mark_failed(CandyKind::Lollipop));
        assert!(models.get(CandyKind::Lollipop).is_none());
    }

    #[test]
    fn test_spawn_tick_adds_one_candy() {
        let mut app = test_app(CandyConfig::default(), SequenceRandom::new([true], [0.5]));
        show_view(&mut app);

        advance(&mut app, 1.0);
        assert!(app.world().resource::<SpawnedCandies>().is_empty());

        advance(&mut app, 1.0);
        let candies = candies(&mut app);
        assert_eq!(candies.len(), 1);
        let (candy, transform) = candies[0];
        assert_eq!(candy.kind, CandyKind::Lollipop);
        assert_eq!(transform.translation, Vec3::new(0.5, 2.7, 0.0));
        assert_eq!(transform.scale, Vec3::splat(0.16));

        let entity = app.world().resource::<SpawnedCandies>().iter().next().unwrap().entity;
        let volume = app.world().get::<TriggerVolume>(entity).unwrap();
        assert_eq!(volume.half_extents, Vec3::splat(0.1));
        assert_eq!(app.world().get::<PhysicsBody>(entity).unwrap().mode, BodyMode::Dynamic);
    }

    #[test]
    fn test_spawn_follows_face() {
        let mut app = test_app(CandyConfig::default(), SequenceRandom::new([false], [-0.25]));
        show_view(&mut app);
        set_face(&mut app, Vec3::new(1.0, 0.5, -2.0), Some((0., 0.)));

        advance(&mut app, 2.0);
        let candies = candies(&mut app);
        assert_eq!(candies.len(), 1);
        assert_eq!(candies[0].0.kind, CandyKind::CandyCorn);
        assert_eq!(candies[0].1.translation, Vec3::new(0.75, 0.5 + 2.7, -2.0));
    }

    #[test]
    fn test_failed_model_skips_tick() {
        let mut app = test_app(CandyConfig::default(), SequenceRandom::new([true, false], []));
        app.world_mut().resource_mut::<CandyModels>().mark_failed(CandyKind::Lollipop);
        show_view(&mut app);

        advance(&mut app, 2.0);
        assert!(app.world().resource::<SpawnedCandies>().is_empty());

        advance(&mut app, 2.0);
        let candies = candies(&mut app);
        assert_eq!(candies.len(), 1);
        assert_eq!(candies[0].0.kind, CandyKind::CandyCorn);
    }

    #[test]
    fn test_no_spawn_without_view() {
        let mut app = test_app(CandyConfig::default(), StdRandom::seeded(1));
        advance(&mut app, 10.0);
        assert!(app.world().resource::<SpawnedCandies>().is_empty());
    }

    #[test]
    fn test_offsets_stay_in_range() {
        let config = CandyConfig {
            gravity: 0.,
            ..Default::default()
        };
        let mut app = test_app(config, StdRandom::seeded(3));
        show_view(&mut app);

        for tick in 1..=40 {
            advance(&mut app, 2.0);
            assert_eq!(app.world().resource::<SpawnedCandies>().len(), tick);
        }

        for (_, transform) in candies(&mut app) {
            assert!((-0.74..=0.74).contains(&transform.translation.x));
            assert_eq!(transform.translation.y, 2.7);
            assert_eq!(transform.translation.z, 0.0);
        }
    }

    #[test]
    fn test_no_spawns_after_disappear() {
        let mut app = test_app(CandyConfig::default(), StdRandom::seeded(5));
        show_view(&mut app);
        advance(&mut app, 2.0);
        assert_eq!(app.world().resource::<SpawnedCandies>().stats().spawned, 1);

        app.world_mut().send_event(ViewEvent::Disappeared);
        app.update();
        for _ in 0..10 {
            advance(&mut app, 30.0);
        }
        assert_eq!(app.world().resource::<SpawnedCandies>().stats().spawned, 1);
    }

    #[test]
    fn test_gravity_pulls_candy_down() {
        let mut app = test_app(CandyConfig::default(), SequenceRandom::new([true], [0.]));
        show_view(&mut app);
        advance(&mut app, 2.0);

        advance(&mut app, 0.1);
        let (_, transform) = candies(&mut app)[0];
        assert!(transform.translation.y < 2.7);
        assert_eq!(transform.translation.x, 0.);
    }

    #[test]
    fn test_fallen_candy_is_removed() {
        let mut app = test_app(CandyConfig::default(), SequenceRandom::new([true], [0.7]));
        show_view(&mut app);
        advance(&mut app, 2.0);
        let entity = app.world().resource::<SpawnedCandies>().iter().next().unwrap().entity;

        app.world_mut().resource_mut::<SpawnTimer>().stop();
        for _ in 0..40 {
            advance(&mut app, 0.1);
        }

        let candies = app.world().resource::<SpawnedCandies>();
        assert!(candies.is_empty());
        assert_eq!(candies.stats(), CandyStats { spawned: 1, caught: 0, dropped: 1 });
        assert!(app.world().get_entity(entity).is_none());
    }

    #[test]
    fn test_spawn_interval_is_configurable() {
        let config = CandyConfig {
            spawn_interval: Duration::from_millis(500),
            ..Default::default()
        };
        let mut app = test_app(config, StdRandom::seeded(9));
        show_view(&mut app);
        advance(&mut app, 0.5);
        advance(&mut app, 0.5);
        assert_eq!(app.world().resource::<SpawnedCandies>().stats().spawned, 2);
    }
}
