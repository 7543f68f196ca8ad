use std::time::Duration;

use bevy::prelude::Resource;

use crate::error::AnimojiError;

/// Tunables for the candy game.
#[derive(Debug, Clone, Resource)]
pub struct CandyConfig {
    /// Time between spawn attempts.
    pub spawn_interval: Duration,
    /// Candy is dropped up to this far to either side of the face.
    pub horizontal_spread: f32,
    /// Height above the face at which candy appears.
    pub drop_height: f32,
    pub candy_scale: f32,
    /// Edge length of the candy trigger box.
    pub collider_size: f32,
    /// Candy closer than this to the face is caught.
    pub catch_distance: f32,
    /// Candy falling below this world height is removed.
    pub despawn_height: f32,
    pub gravity: f32,
    pub talk_duration: Duration,
}

impl Default for CandyConfig {
    fn default() -> Self {
        Self {
            spawn_interval: Duration::from_secs(2),
            horizontal_spread: 0.74,
            drop_height: 2.7,
            candy_scale: 0.16,
            collider_size: 0.2,
            catch_distance: 0.365,
            despawn_height: -3.0,
            gravity: 9.81,
            talk_duration: Duration::from_millis(1500),
        }
    }
}

impl CandyConfig {
    pub fn validate(&self) -> Result<(), AnimojiError> {
        if self.spawn_interval.is_zero() {
            return Err(AnimojiError::InvalidConfig("spawn interval must be positive".into()));
        }

        let positive = [
            ("candy scale", self.candy_scale),
            ("collider size", self.collider_size),
            ("catch distance", self.catch_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.) {
                return Err(AnimojiError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }

        if !(self.horizontal_spread.is_finite() && self.horizontal_spread >= 0.) {
            return Err(AnimojiError::InvalidConfig(format!(
                "horizontal spread must not be negative, got {}", self.horizontal_spread)));
        }

        for (name, value) in [("drop height", self.drop_height), ("despawn height", self.despawn_height), ("gravity", self.gravity)] {
            if !value.is_finite() {
                return Err(AnimojiError::InvalidConfig(format!("{name} must be finite")));
            }
        }

        Ok(())
    }
}
