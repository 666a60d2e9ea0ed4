//! Rejection sampling of spawn positions.
//!
//! Candidates are drawn uniformly from the arena shrunk by the spawn margin
//! and the first one that passes the validity test is accepted. The number
//! of draws is bounded; when every candidate is rejected the sampler falls
//! back to a fixed answer and logs a warning instead of failing, because a
//! rare unlucky episode start must not stop a training run.
use crate::{arena::Arena, config::SpawnConfig, geometry::planar_distance};
use glam::Vec3;
use log::warn;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Samples agent and target positions with an injected random source.
pub struct SpawnSampler<R: Rng = SmallRng> {
    rng: R,
}

impl SpawnSampler<SmallRng> {
    /// Constructs a sampler with a seeded [`SmallRng`].
    pub fn from_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Restarts the random sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}

fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.gen_range(lo..=hi)
    } else {
        0.5 * (lo + hi)
    }
}

impl<R: Rng> SpawnSampler<R> {
    /// Constructs a sampler drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws a candidate uniformly from the bounds shrunk by the margin, at height `y`.
    fn draw(&mut self, arena: &Arena, config: &SpawnConfig, y: f32) -> Vec3 {
        let b = arena.bounds();
        let m = config.spawn_margin;
        let x = uniform(&mut self.rng, b.min_x + m, b.max_x - m);
        let z = uniform(&mut self.rng, b.min_z + m, b.max_z - m);
        Vec3::new(x, y, z)
    }

    /// Samples a position whose `check_radius` disc is free of obstacles.
    ///
    /// The out-of-plane coordinate is held at `y`. After `max_spawn_tries`
    /// rejected candidates the arena center is returned.
    pub fn sample_position(&mut self, arena: &Arena, config: &SpawnConfig, y: f32) -> Vec3 {
        for _ in 0..config.max_spawn_tries {
            let candidate = self.draw(arena, config, y);
            if !arena.is_occupied(candidate, config.check_radius) {
                return candidate;
            }
        }

        let center = arena.bounds().center(y);
        warn!(
            "No free spawn position after {} tries, falling back to the arena center {:?}",
            config.max_spawn_tries, center
        );
        center
    }

    /// Samples a target position which is free of obstacles and at least
    /// `min_target_separation` away from `agent_position`.
    ///
    /// After `max_spawn_tries` rejected candidates the last candidate is
    /// accepted as is, even if it violates the separation.
    pub fn sample_target_position(
        &mut self,
        arena: &Arena,
        config: &SpawnConfig,
        agent_position: Vec3,
    ) -> Vec3 {
        let y = agent_position.y;
        let mut last = None;
        for _ in 0..config.max_spawn_tries {
            let candidate = self.draw(arena, config, y);
            last = Some(candidate);
            if !arena.is_occupied(candidate, config.check_radius)
                && planar_distance(candidate, agent_position) >= config.min_target_separation
            {
                return candidate;
            }
        }

        let fallback = last.unwrap_or_else(|| arena.bounds().center(y));
        warn!(
            "No valid target position after {} tries, accepting {:?} ({:.2} from the agent)",
            config.max_spawn_tries,
            fallback,
            planar_distance(fallback, agent_position)
        );
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arena::{Obstacle, ObstacleMap},
        geometry::ArenaBounds,
    };
    use std::sync::Arc;
    use test_log::test;

    fn open_arena() -> Arena {
        Arena::new(ArenaBounds::new(-10.0, 10.0, -5.0, 5.0), Arc::new(ObstacleMap::default())).unwrap()
    }

    #[test]
    fn test_samples_stay_inside_shrunk_bounds() {
        let arena = Arena::new(
            ArenaBounds::new(-10.0, 10.0, -5.0, 5.0),
            Arc::new(
                ObstacleMap::new(vec![Obstacle::Circle {
                    x: 0.0,
                    z: 0.0,
                    radius: 3.0,
                }])
                .unwrap(),
            ),
        )
        .unwrap();
        let config = SpawnConfig {
            spawn_margin: 1.5,
            check_radius: 0.5,
            max_spawn_tries: 100,
            min_target_separation: 5.0,
        };
        let mut sampler = SpawnSampler::from_seed(7);

        for _ in 0..500 {
            let p = sampler.sample_position(&arena, &config, 0.75);
            assert!(arena.bounds().contains_with_margin(p, config.spawn_margin));
            assert!(!arena.is_occupied(p, config.check_radius));
            assert_eq!(p.y, 0.75);
        }
    }

    #[test]
    fn test_fully_occupied_arena_falls_back_to_center() {
        let arena = Arena::new(ArenaBounds::new(0.0, 8.0, 0.0, 4.0), Arc::new(|_: Vec3, _: f32| true))
            .unwrap();
        let config = SpawnConfig::default();
        let mut sampler = SpawnSampler::from_seed(0);

        let p = sampler.sample_position(&arena, &config, 2.0);
        assert_eq!(p, Vec3::new(4.0, 2.0, 2.0));
    }

    #[test]
    fn test_target_keeps_minimum_separation() {
        let arena = open_arena();
        let config = SpawnConfig::default();
        let mut sampler = SpawnSampler::from_seed(11);

        for _ in 0..500 {
            let agent = sampler.sample_position(&arena, &config, 0.5);
            let target = sampler.sample_target_position(&arena, &config, agent);
            assert!(planar_distance(agent, target) >= config.min_target_separation);
            assert_eq!(target.y, agent.y);
        }
    }

    #[test]
    fn test_target_falls_back_to_last_candidate() {
        // The sampling window is a single point: every candidate is the agent position.
        let arena = Arena::new(ArenaBounds::new(0.0, 2.0, 0.0, 2.0), Arc::new(ObstacleMap::default()))
            .unwrap();
        let config = SpawnConfig {
            spawn_margin: 1.0,
            ..SpawnConfig::default()
        };
        let mut sampler = SpawnSampler::from_seed(3);

        let agent = sampler.sample_position(&arena, &config, 0.0);
        let target = sampler.sample_target_position(&arena, &config, agent);
        assert_eq!(agent, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(target, agent);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let arena = open_arena();
        let config = SpawnConfig::default();
        let mut a = SpawnSampler::from_seed(42);
        let mut b = SpawnSampler::from_seed(42);
        for _ in 0..10 {
            assert_eq!(
                a.sample_position(&arena, &config, 0.0),
                b.sample_position(&arena, &config, 0.0)
            );
        }
        a.reseed(5);
        b.reseed(5);
        assert_eq!(
            a.sample_position(&arena, &config, 0.0),
            b.sample_position(&arena, &config, 0.0)
        );
    }
}
