//! Performance optimizer orchestrator
//!
//! Single integration point for the per-frame optimization primitives:
//! named object pools, the dirty-tracked spatial grid, the entity batcher,
//! LOD/frustum render filtering and the frame throttle scheduler.
//!
//! Subsystem flags are orthogonal; a disabled subsystem answers with empty
//! or no-op results so callers never branch on configuration. Nothing here
//! returns a fatal error or panics - this layer sits on the hot path and
//! must never take down a frame. Misuse (unregistered pool, mismatched pool
//! type) logs a warning and degrades.

use std::any::Any;
use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::batch::EntityBatcher;
use crate::config::OptimizerConfig;
use crate::entity::{Camera, EntityId, EntityView};
use crate::lod::{LodLevel, LodThresholds};
use crate::pool::{ObjectPool, PoolHandle};
use crate::spatial::{GridStats, SpatialGrid};
use crate::throttle::ThrottleScheduler;
use crate::util::vec2::Vec2;

/// Pool occupancy counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolCounts {
    pub pool_size: usize,
    pub active_count: usize,
    pub total_count: usize,
}

/// Type-erased pool entry for the by-name registry
trait AnyPool {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn counts(&self) -> PoolCounts;
    fn release(&mut self, handle: PoolHandle) -> bool;
    fn release_all(&mut self);
    fn clear(&mut self);
}

impl<T: 'static> AnyPool for ObjectPool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn counts(&self) -> PoolCounts {
        PoolCounts {
            pool_size: self.pool_size(),
            active_count: self.active_count(),
            total_count: self.total_count(),
        }
    }
    fn release(&mut self, handle: PoolHandle) -> bool {
        ObjectPool::release(self, handle)
    }
    fn release_all(&mut self) {
        ObjectPool::release_all(self);
    }
    fn clear(&mut self) {
        ObjectPool::clear(self);
    }
}

/// LOD/visibility buckets produced by render filtering
#[derive(Debug, Clone, Default)]
pub struct RenderBuckets {
    pub high: Vec<EntityId>,
    pub medium: Vec<EntityId>,
    pub low: Vec<EntityId>,
    pub culled: Vec<EntityId>,
}

impl RenderBuckets {
    /// Entities across all four buckets
    pub fn total(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len() + self.culled.len()
    }
}

/// Aggregate statistics snapshot, refreshed once per [`PerformanceOptimizer::update`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptimizerStats {
    pub frame_count: u64,
    pub grid: GridStats,
    pub batch_count: usize,
    pub batched_entities: usize,
    pub pools: HashMap<String, PoolCounts>,
}

/// Plain snapshot of every tunable, for diagnostics or persistence by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub spatial_grid_enabled: bool,
    pub batching_enabled: bool,
    pub pooling_enabled: bool,
    pub lod_enabled: bool,
    pub cell_size: f32,
    pub lod_thresholds: LodThresholds,
    pub throttle_periods: BTreeMap<String, u32>,
    pub pool_names: Vec<String>,
}

/// Orchestrates pooling, spatial indexing, batching, LOD and throttling
pub struct PerformanceOptimizer {
    config: OptimizerConfig,
    frame_count: u64,
    pools: HashMap<String, Box<dyn AnyPool>>,
    grid: SpatialGrid,
    /// Grid must be rebuilt before the next spatial query is meaningful
    grid_dirty: bool,
    batcher: EntityBatcher,
    throttle: ThrottleScheduler,
    stats: OptimizerStats,
}

impl PerformanceOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        let grid = SpatialGrid::new(config.cell_size);
        Self {
            config,
            frame_count: 0,
            pools: HashMap::new(),
            grid,
            grid_dirty: true,
            batcher: EntityBatcher::new(),
            throttle: ThrottleScheduler::new(),
            stats: OptimizerStats::default(),
        }
    }

    /// Advance the frame counter and refresh the stats snapshot
    ///
    /// The one call that must happen exactly once per simulation frame;
    /// every other operation is on demand.
    pub fn update(&mut self) {
        self.frame_count += 1;
        self.update_stats();
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // ------------------------------------------------------------------
    // Pool registry
    // ------------------------------------------------------------------

    /// Create and register a named pool
    ///
    /// Re-registering a name replaces the previous pool (and warns).
    pub fn initialize_pool<T: 'static>(
        &mut self,
        name: &str,
        factory: impl FnMut() -> T + 'static,
        reset: impl FnMut(&mut T) + 'static,
        initial_size: usize,
        max_size: usize,
    ) {
        let pool = ObjectPool::new(factory, reset, initial_size, max_size);
        if self
            .pools
            .insert(name.to_string(), Box::new(pool))
            .is_some()
        {
            warn!(pool = name, "pool already registered, replacing");
        }
    }

    /// Typed access to a registered pool
    pub fn pool<T: 'static>(&self, name: &str) -> Option<&ObjectPool<T>> {
        let Some(entry) = self.pools.get(name) else {
            warn!(pool = name, "pool not registered");
            return None;
        };
        let typed = entry.as_any().downcast_ref::<ObjectPool<T>>();
        if typed.is_none() {
            warn!(pool = name, "pool registered with a different object type");
        }
        typed
    }

    /// Typed mutable access to a registered pool
    pub fn pool_mut<T: 'static>(&mut self, name: &str) -> Option<&mut ObjectPool<T>> {
        let Some(entry) = self.pools.get_mut(name) else {
            warn!(pool = name, "pool not registered");
            return None;
        };
        let typed = entry.as_any_mut().downcast_mut::<ObjectPool<T>>();
        if typed.is_none() {
            warn!(pool = name, "pool registered with a different object type");
        }
        typed
    }

    /// Check an object out of a named pool
    ///
    /// Returns `None` when pooling is disabled, the name is unregistered or
    /// the pool holds a different type.
    pub fn acquire_from_pool<T: 'static>(&mut self, name: &str) -> Option<PoolHandle> {
        if !self.config.pooling_enabled {
            return None;
        }
        self.pool_mut::<T>(name).map(ObjectPool::acquire)
    }

    /// Return an object to a named pool; inert for unknown names or handles
    pub fn release_to_pool(&mut self, name: &str, handle: PoolHandle) -> bool {
        if !self.config.pooling_enabled {
            return false;
        }
        match self.pools.get_mut(name) {
            Some(pool) => pool.release(handle),
            None => {
                warn!(pool = name, "pool not registered");
                false
            }
        }
    }

    /// Release every active object in a named pool
    pub fn release_all_in_pool(&mut self, name: &str) {
        match self.pools.get_mut(name) {
            Some(pool) => pool.release_all(),
            None => warn!(pool = name, "pool not registered"),
        }
    }

    /// Hard-reset a named pool's bookkeeping
    pub fn clear_pool(&mut self, name: &str) {
        match self.pools.get_mut(name) {
            Some(pool) => pool.clear(),
            None => warn!(pool = name, "pool not registered"),
        }
    }

    /// Occupancy counts for a named pool
    pub fn get_pool_stats(&self, name: &str) -> Option<PoolCounts> {
        let counts = self.pools.get(name).map(|p| p.counts());
        if counts.is_none() {
            warn!(pool = name, "pool not registered");
        }
        counts
    }

    /// Registered pool names, sorted
    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    // ------------------------------------------------------------------
    // Spatial grid
    // ------------------------------------------------------------------

    /// Flag the grid as stale; the next [`update_spatial_grid`](Self::update_spatial_grid)
    /// call will rebuild it. Call whenever entity positions may have changed.
    pub fn mark_spatial_grid_dirty(&mut self) {
        self.grid_dirty = true;
    }

    #[inline]
    pub fn spatial_grid_dirty(&self) -> bool {
        self.grid_dirty
    }

    /// Rebuild the grid from the given entities, but only when dirty
    pub fn update_spatial_grid<E: EntityView>(&mut self, entities: &[E]) {
        if !self.config.spatial_grid_enabled || !self.grid_dirty {
            return;
        }
        self.grid.rebuild(entities.iter());
        self.grid_dirty = false;
    }

    /// Entities indexed in cells overlapping the rectangle
    pub fn query_entities_in_area(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<EntityId> {
        if !self.config.spatial_grid_enabled {
            return Vec::new();
        }
        self.grid.query(x, y, width, height)
    }

    /// Entities near a point (square approximation of the radius)
    pub fn query_entities_near_point(&self, x: f32, y: f32, radius: f32) -> Vec<EntityId> {
        if !self.config.spatial_grid_enabled {
            return Vec::new();
        }
        self.grid.query_point(x, y, radius)
    }

    // ------------------------------------------------------------------
    // Batching
    // ------------------------------------------------------------------

    /// Rebuild the type-keyed batches from the given entities
    pub fn batch_entities<E: EntityView>(&mut self, entities: &[E]) {
        if !self.config.batching_enabled {
            return;
        }
        self.batcher.batch(entities.iter());
    }

    /// Entities batched under a type key; empty when batching is disabled
    pub fn get_batch(&self, type_name: &str) -> &[EntityId] {
        if !self.config.batching_enabled {
            return &[];
        }
        self.batcher.get_batch(type_name)
    }

    // ------------------------------------------------------------------
    // LOD and render filtering
    // ------------------------------------------------------------------

    /// LOD band for an entity as seen from the camera position
    ///
    /// `High` when LOD is disabled (always full detail) or when the entity
    /// has no transform to measure from.
    pub fn calculate_lod(&self, entity: &impl EntityView, camera_position: Vec2) -> LodLevel {
        if !self.config.lod_enabled {
            return LodLevel::High;
        }
        match entity.transform() {
            Some(transform) => {
                let distance = transform.position.distance_to(camera_position);
                LodLevel::classify(distance, &self.config.lod_thresholds)
            }
            None => LodLevel::High,
        }
    }

    /// Sort active entities into LOD/visibility buckets for rendering
    ///
    /// The LOD distance test runs first: entities culled by distance never
    /// pay for the frustum check. Survivors are tested against the camera's
    /// rectangle-visibility predicate and demoted to `culled` on failure.
    /// Entities missing a transform or a sprite contribute to no bucket.
    pub fn filter_entities_for_rendering<E: EntityView>(
        &self,
        entities: &[E],
        camera: &impl Camera,
    ) -> RenderBuckets {
        let mut buckets = RenderBuckets::default();
        let camera_position = camera.position();

        for entity in entities {
            if !entity.is_active() {
                continue;
            }
            let (Some(transform), Some(sprite)) = (entity.transform(), entity.sprite()) else {
                continue;
            };

            let lod = if self.config.lod_enabled {
                let distance = transform.position.distance_to(camera_position);
                LodLevel::classify(distance, &self.config.lod_thresholds)
            } else {
                LodLevel::High
            };
            if lod == LodLevel::Culled {
                buckets.culled.push(entity.id());
                continue;
            }

            let visible = camera.is_rect_visible(
                transform.position.x,
                transform.position.y,
                sprite.width,
                sprite.height,
            );
            if !visible {
                buckets.culled.push(entity.id());
                continue;
            }

            match lod {
                LodLevel::High => buckets.high.push(entity.id()),
                LodLevel::Medium => buckets.medium.push(entity.id()),
                LodLevel::Low => buckets.low.push(entity.id()),
                LodLevel::Culled => continue,
            }
        }
        buckets
    }

    // ------------------------------------------------------------------
    // Throttling
    // ------------------------------------------------------------------

    /// Whether a category's logic should run this frame
    pub fn should_update(&self, category: &str) -> bool {
        self.throttle.should_run(category, self.frame_count)
    }

    /// Set a category's period in frames
    pub fn set_throttle(&mut self, category: &str, frames: u32) {
        self.throttle.set_period(category, frames);
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    /// Pull live counts from the grid, batcher and every pool into the snapshot
    pub fn update_stats(&mut self) {
        self.stats.frame_count = self.frame_count;
        self.stats.grid = self.grid.stats();
        self.stats.batch_count = self.batcher.batch_count();
        self.stats.batched_entities = self.batcher.batched_entity_count();
        self.stats.pools.clear();
        for (name, pool) in &self.pools {
            self.stats.pools.insert(name.clone(), pool.counts());
        }
    }

    /// Last snapshot taken by [`update`](Self::update) or [`update_stats`](Self::update_stats)
    pub fn get_stats(&self) -> &OptimizerStats {
        &self.stats
    }

    /// Zero the snapshot; the next update repopulates it
    pub fn reset_stats(&mut self) {
        self.stats = OptimizerStats::default();
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn set_spatial_grid_enabled(&mut self, enabled: bool) {
        // Anything indexed while disabled is stale by definition
        if enabled && !self.config.spatial_grid_enabled {
            self.grid_dirty = true;
        }
        self.config.spatial_grid_enabled = enabled;
    }

    pub fn set_batching_enabled(&mut self, enabled: bool) {
        self.config.batching_enabled = enabled;
    }

    pub fn set_pooling_enabled(&mut self, enabled: bool) {
        self.config.pooling_enabled = enabled;
    }

    pub fn set_lod_enabled(&mut self, enabled: bool) {
        self.config.lod_enabled = enabled;
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Structured snapshot of every tunable for diagnostics/persistence
    pub fn export_config(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            spatial_grid_enabled: self.config.spatial_grid_enabled,
            batching_enabled: self.config.batching_enabled,
            pooling_enabled: self.config.pooling_enabled,
            lod_enabled: self.config.lod_enabled,
            cell_size: self.grid.cell_size(),
            lod_thresholds: self.config.lod_thresholds,
            throttle_periods: self
                .throttle
                .periods()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            pool_names: self.pool_names(),
        }
    }
}

impl Default for PerformanceOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Sprite, Transform};

    #[derive(Clone)]
    struct TestEntity {
        id: EntityId,
        active: bool,
        transform: Option<Transform>,
        sprite: Option<Sprite>,
        name: Option<&'static str>,
    }

    impl TestEntity {
        fn new(id: EntityId, x: f32, y: f32) -> Self {
            Self {
                id,
                active: true,
                transform: Some(Transform::new(x, y)),
                sprite: Some(Sprite::default()),
                name: Some("enemy"),
            }
        }
    }

    impl EntityView for TestEntity {
        fn id(&self) -> EntityId {
            self.id
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn transform(&self) -> Option<Transform> {
            self.transform
        }
        fn sprite(&self) -> Option<Sprite> {
            self.sprite
        }
        fn type_name(&self) -> Option<&str> {
            self.name
        }
    }

    /// Camera at a fixed position seeing a square window around itself
    struct TestCamera {
        position: Vec2,
        half_extent: f32,
    }

    impl Camera for TestCamera {
        fn position(&self) -> Vec2 {
            self.position
        }
        fn is_rect_visible(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
            x + width >= self.position.x - self.half_extent
                && x <= self.position.x + self.half_extent
                && y + height >= self.position.y - self.half_extent
                && y <= self.position.y + self.half_extent
        }
    }

    fn wide_camera() -> TestCamera {
        TestCamera {
            position: Vec2::ZERO,
            half_extent: 10_000.0,
        }
    }

    #[derive(Debug, Default)]
    struct Projectile {
        velocity: Vec2,
    }

    #[test]
    fn test_pool_registry_round_trip() {
        let mut opt = PerformanceOptimizer::default();
        opt.initialize_pool::<Projectile>(
            "projectiles",
            Projectile::default,
            |p| p.velocity = Vec2::ZERO,
            4,
            16,
        );

        let handle = opt.acquire_from_pool::<Projectile>("projectiles").unwrap();
        opt.pool_mut::<Projectile>("projectiles")
            .unwrap()
            .get_mut(handle)
            .unwrap()
            .velocity = Vec2::new(5.0, 0.0);

        let counts = opt.get_pool_stats("projectiles").unwrap();
        assert_eq!(counts.pool_size, 3);
        assert_eq!(counts.active_count, 1);
        assert_eq!(counts.total_count, 4);

        assert!(opt.release_to_pool("projectiles", handle));
        assert!(!opt.release_to_pool("projectiles", handle));
        assert_eq!(opt.get_pool_stats("projectiles").unwrap().active_count, 0);
    }

    #[test]
    fn test_unregistered_pool_degrades() {
        let mut opt = PerformanceOptimizer::default();
        assert!(opt.acquire_from_pool::<Projectile>("missing").is_none());
        let bogus = {
            opt.initialize_pool::<Projectile>("tmp", Projectile::default, |_| {}, 0, 4);
            opt.acquire_from_pool::<Projectile>("tmp").unwrap()
        };
        assert!(!opt.release_to_pool("missing", bogus));
        assert!(opt.get_pool_stats("missing").is_none());
    }

    #[test]
    fn test_pool_type_mismatch_degrades() {
        let mut opt = PerformanceOptimizer::default();
        opt.initialize_pool::<Projectile>("projectiles", Projectile::default, |_| {}, 2, 8);
        assert!(opt.acquire_from_pool::<String>("projectiles").is_none());
        assert!(opt.pool::<String>("projectiles").is_none());
        // The underlying pool is untouched
        assert_eq!(opt.get_pool_stats("projectiles").unwrap().total_count, 2);
    }

    #[test]
    fn test_pooling_disabled_is_noop() {
        let mut opt = PerformanceOptimizer::default();
        opt.initialize_pool::<Projectile>("projectiles", Projectile::default, |_| {}, 2, 8);
        let handle = opt.acquire_from_pool::<Projectile>("projectiles").unwrap();

        opt.set_pooling_enabled(false);
        assert!(opt.acquire_from_pool::<Projectile>("projectiles").is_none());
        assert!(!opt.release_to_pool("projectiles", handle));

        opt.set_pooling_enabled(true);
        assert!(opt.release_to_pool("projectiles", handle));
    }

    #[test]
    fn test_release_all_and_clear_by_name() {
        let mut opt = PerformanceOptimizer::default();
        opt.initialize_pool::<Projectile>("projectiles", Projectile::default, |_| {}, 0, 8);
        for _ in 0..3 {
            let _ = opt.acquire_from_pool::<Projectile>("projectiles");
        }
        opt.release_all_in_pool("projectiles");
        let counts = opt.get_pool_stats("projectiles").unwrap();
        assert_eq!(counts.active_count, 0);
        assert_eq!(counts.pool_size, 3);

        opt.clear_pool("projectiles");
        assert_eq!(opt.get_pool_stats("projectiles").unwrap().total_count, 0);
    }

    #[test]
    fn test_spatial_grid_rebuild_is_dirty_gated() {
        let mut opt = PerformanceOptimizer::default();
        let mut entities = vec![TestEntity::new(1, 100.0, 100.0)];

        // Fresh optimizer starts dirty: first update builds the index
        opt.update_spatial_grid(&entities);
        assert_eq!(opt.query_entities_in_area(0.0, 0.0, 200.0, 200.0), vec![1]);

        // Move the entity but skip the dirty mark: grid stays stale
        entities[0].transform = Some(Transform::new(5000.0, 5000.0));
        opt.update_spatial_grid(&entities);
        assert_eq!(opt.query_entities_in_area(0.0, 0.0, 200.0, 200.0), vec![1]);

        // Marking dirty makes the next update resynchronize
        opt.mark_spatial_grid_dirty();
        opt.update_spatial_grid(&entities);
        assert!(opt.query_entities_in_area(0.0, 0.0, 200.0, 200.0).is_empty());
        assert_eq!(
            opt.query_entities_near_point(5000.0, 5000.0, 100.0),
            vec![1]
        );
        assert!(!opt.spatial_grid_dirty());
    }

    #[test]
    fn test_spatial_disabled_returns_empty() {
        let mut opt = PerformanceOptimizer::default();
        let entities = vec![TestEntity::new(1, 100.0, 100.0)];
        opt.update_spatial_grid(&entities);

        opt.set_spatial_grid_enabled(false);
        assert!(opt.query_entities_in_area(0.0, 0.0, 200.0, 200.0).is_empty());
        assert!(opt.query_entities_near_point(100.0, 100.0, 50.0).is_empty());

        // Re-enabling marks the grid for rebuild
        opt.set_spatial_grid_enabled(true);
        assert!(opt.spatial_grid_dirty());
    }

    #[test]
    fn test_batching_through_optimizer() {
        let mut opt = PerformanceOptimizer::default();
        let mut entities = vec![
            TestEntity::new(1, 0.0, 0.0),
            TestEntity::new(2, 0.0, 0.0),
            TestEntity::new(3, 0.0, 0.0),
        ];
        entities[1].name = Some("particle");
        entities[2].name = None;

        opt.batch_entities(&entities);
        assert_eq!(opt.get_batch("enemy"), &[1]);
        assert_eq!(opt.get_batch("particle"), &[2]);
        assert_eq!(opt.get_batch("unknown"), &[3]);

        opt.set_batching_enabled(false);
        assert!(opt.get_batch("enemy").is_empty());
    }

    #[test]
    fn test_calculate_lod_bands() {
        let opt = PerformanceOptimizer::default();
        let camera = Vec2::ZERO;

        assert_eq!(
            opt.calculate_lod(&TestEntity::new(1, 250.0, 0.0), camera),
            LodLevel::High
        );
        assert_eq!(
            opt.calculate_lod(&TestEntity::new(2, 700.0, 0.0), camera),
            LodLevel::Low
        );
        assert_eq!(
            opt.calculate_lod(&TestEntity::new(3, 1200.0, 0.0), camera),
            LodLevel::Culled
        );
    }

    #[test]
    fn test_calculate_lod_disabled_or_missing_transform() {
        let mut opt = PerformanceOptimizer::default();

        let mut ghost = TestEntity::new(1, 0.0, 0.0);
        ghost.transform = None;
        assert_eq!(opt.calculate_lod(&ghost, Vec2::ZERO), LodLevel::High);

        opt.set_lod_enabled(false);
        let far = TestEntity::new(2, 99_999.0, 0.0);
        assert_eq!(opt.calculate_lod(&far, Vec2::ZERO), LodLevel::High);
    }

    #[test]
    fn test_filter_buckets_by_distance() {
        let opt = PerformanceOptimizer::default();
        let entities = vec![
            TestEntity::new(1, 100.0, 0.0),
            TestEntity::new(2, 400.0, 0.0),
            TestEntity::new(3, 700.0, 0.0),
            TestEntity::new(4, 1500.0, 0.0),
        ];

        let buckets = opt.filter_entities_for_rendering(&entities, &wide_camera());
        assert_eq!(buckets.high, vec![1]);
        assert_eq!(buckets.medium, vec![2]);
        assert_eq!(buckets.low, vec![3]);
        assert_eq!(buckets.culled, vec![4]);
    }

    #[test]
    fn test_filter_skips_incomplete_and_inactive_entities() {
        let opt = PerformanceOptimizer::default();
        let mut entities = vec![
            TestEntity::new(1, 10.0, 0.0),
            TestEntity::new(2, 10.0, 0.0),
            TestEntity::new(3, 10.0, 0.0),
            TestEntity::new(4, 10.0, 0.0),
        ];
        entities[1].sprite = None;
        entities[2].transform = None;
        entities[3].active = false;

        let buckets = opt.filter_entities_for_rendering(&entities, &wide_camera());
        assert_eq!(buckets.high, vec![1]);
        assert_eq!(buckets.total(), 1, "incomplete entities land in no bucket");
    }

    #[test]
    fn test_filter_frustum_failure_goes_to_culled() {
        let opt = PerformanceOptimizer::default();
        let camera = TestCamera {
            position: Vec2::ZERO,
            half_extent: 50.0,
        };
        let entities = vec![
            TestEntity::new(1, 10.0, 10.0),
            // Within the high LOD band but outside the view window
            TestEntity::new(2, 200.0, 200.0),
        ];

        let buckets = opt.filter_entities_for_rendering(&entities, &camera);
        assert_eq!(buckets.high, vec![1]);
        assert_eq!(buckets.culled, vec![2]);
    }

    #[test]
    fn test_filter_with_lod_disabled_keeps_everything_high() {
        let mut opt = PerformanceOptimizer::default();
        opt.set_lod_enabled(false);
        let entities = vec![
            TestEntity::new(1, 100.0, 0.0),
            TestEntity::new(2, 5000.0, 0.0),
        ];

        let buckets = opt.filter_entities_for_rendering(&entities, &wide_camera());
        assert_eq!(buckets.high, vec![1, 2]);
        assert!(buckets.culled.is_empty());
    }

    #[test]
    fn test_should_update_follows_frame_counter() {
        let mut opt = PerformanceOptimizer::default();
        opt.set_throttle("ai", 3);

        let mut ran_on = Vec::new();
        for _ in 0..10 {
            if opt.should_update("ai") {
                ran_on.push(opt.frame_count());
            }
            opt.update();
        }
        assert_eq!(ran_on, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_unknown_category_runs_every_frame() {
        let mut opt = PerformanceOptimizer::default();
        for _ in 0..5 {
            assert!(opt.should_update("never_configured"));
            opt.update();
        }
    }

    #[test]
    fn test_update_refreshes_stats() {
        let mut opt = PerformanceOptimizer::default();
        opt.initialize_pool::<Projectile>("projectiles", Projectile::default, |_| {}, 2, 8);
        let entities = vec![TestEntity::new(1, 50.0, 50.0)];
        opt.update_spatial_grid(&entities);
        opt.batch_entities(&entities);

        opt.update();
        let stats = opt.get_stats();
        assert_eq!(stats.frame_count, 1);
        assert_eq!(stats.grid.total_memberships, 1);
        assert_eq!(stats.batch_count, 1);
        assert_eq!(stats.batched_entities, 1);
        assert_eq!(stats.pools["projectiles"].total_count, 2);

        opt.reset_stats();
        assert_eq!(opt.get_stats().frame_count, 0);
        assert!(opt.get_stats().pools.is_empty());
    }

    #[test]
    fn test_export_config_snapshot() {
        let mut opt = PerformanceOptimizer::default();
        opt.initialize_pool::<Projectile>("projectiles", Projectile::default, |_| {}, 0, 8);
        opt.set_throttle("ai", 5);
        opt.set_lod_enabled(false);

        let snapshot = opt.export_config();
        assert!(!snapshot.lod_enabled);
        assert_eq!(snapshot.cell_size, crate::spatial::DEFAULT_CELL_SIZE);
        assert_eq!(snapshot.throttle_periods["ai"], 5);
        assert_eq!(snapshot.pool_names, vec!["projectiles".to_string()]);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ConfigSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.throttle_periods["ai"], 5);
        assert_eq!(back.pool_names, snapshot.pool_names);
    }
}
