//! The static arena: bounds and obstacle occupancy.
use crate::{
    config::ArenaConfig,
    error::{finite, non_negative, NavError},
    geometry::{planar, ArenaBounds},
};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Collision test against the static obstacles of a scene.
///
/// Implementations are read concurrently by every agent sharing the arena.
pub trait Occupancy: Send + Sync {
    /// Returns `true` if a disc of `radius` around the planar part of
    /// `position` overlaps an obstacle.
    fn is_occupied(&self, position: Vec3, radius: f32) -> bool;
}

impl<F> Occupancy for F
where
    F: Fn(Vec3, f32) -> bool + Send + Sync,
{
    fn is_occupied(&self, position: Vec3, radius: f32) -> bool {
        self(position, radius)
    }
}

/// An obstacle in the `(x, z)` plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Obstacle {
    /// A disc.
    Circle {
        /// Center, `x`.
        x: f32,
        /// Center, `z`.
        z: f32,
        /// Radius.
        radius: f32,
    },

    /// An axis-aligned rectangle.
    Rect {
        /// Minimum of `x`.
        min_x: f32,
        /// Maximum of `x`.
        max_x: f32,
        /// Minimum of `z`.
        min_z: f32,
        /// Maximum of `z`.
        max_z: f32,
    },
}

impl Obstacle {
    /// Returns `true` if a disc of `radius` around `p` overlaps the obstacle.
    ///
    /// Touching is not an overlap.
    pub fn overlaps(&self, p: Vec2, radius: f32) -> bool {
        match *self {
            Obstacle::Circle { x, z, radius: r } => p.distance(Vec2::new(x, z)) < r + radius,
            Obstacle::Rect {
                min_x,
                max_x,
                min_z,
                max_z,
            } => {
                let nearest = p.clamp(Vec2::new(min_x, min_z), Vec2::new(max_x, max_z));
                let d = p.distance(nearest);
                d < radius || (radius == 0.0 && d == 0.0)
            }
        }
    }

    fn validate(&self) -> Result<(), NavError> {
        match *self {
            Obstacle::Circle { x, z, radius } => {
                finite("obstacles.x", x)?;
                finite("obstacles.z", z)?;
                non_negative("obstacles.radius", radius)
            }
            Obstacle::Rect {
                min_x,
                max_x,
                min_z,
                max_z,
            } => ArenaBounds::new(min_x, max_x, min_z, max_z)
                .validate()
                .map_err(|e| match e {
                    NavError::InvalidConfig { reason, .. } => {
                        NavError::invalid("obstacles", reason)
                    }
                }),
        }
    }
}

/// A set of [`Obstacle`]s.
#[derive(Clone, Debug, Default)]
pub struct ObstacleMap {
    obstacles: Vec<Obstacle>,
}

impl ObstacleMap {
    /// Constructs the map, rejecting malformed obstacles.
    pub fn new(obstacles: Vec<Obstacle>) -> Result<Self, NavError> {
        for o in obstacles.iter() {
            o.validate()?;
        }
        Ok(Self { obstacles })
    }

    /// The obstacles.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

impl Occupancy for ObstacleMap {
    fn is_occupied(&self, position: Vec3, radius: f32) -> bool {
        let p = planar(position);
        self.obstacles.iter().any(|o| o.overlaps(p, radius))
    }
}

/// Bounds and obstacles of the scene, shared read-only by all agents.
///
/// Cloning is cheap; clones share the same occupancy test.
#[derive(Clone)]
pub struct Arena {
    bounds: ArenaBounds,
    occupancy: Arc<dyn Occupancy>,
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl Arena {
    /// Constructs an arena from a scene-supplied occupancy test.
    pub fn new(bounds: ArenaBounds, occupancy: Arc<dyn Occupancy>) -> Result<Self, NavError> {
        bounds.validate()?;
        Ok(Self { bounds, occupancy })
    }

    /// Constructs an arena with the obstacles listed in the configuration.
    pub fn from_config(config: &ArenaConfig) -> Result<Self, NavError> {
        let obstacles = ObstacleMap::new(config.obstacles.clone())?;
        Self::new(config.bounds, Arc::new(obstacles))
    }

    /// The bounds.
    pub fn bounds(&self) -> &ArenaBounds {
        &self.bounds
    }

    /// Collision test against the obstacles.
    pub fn is_occupied(&self, position: Vec3, radius: f32) -> bool {
        self.occupancy.is_occupied(position, radius)
    }
}
