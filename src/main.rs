use rand::Rng;
use tracing::{info, Level};

use entity_perf::config::OptimizerConfig;
use entity_perf::entity::{Camera, EntityId, EntityView, Sprite, Transform};
use entity_perf::optimizer::PerformanceOptimizer;
use entity_perf::util::vec2::Vec2;

/// Synthetic entity for the headless load test
struct SimEntity {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
    kind: &'static str,
}

impl EntityView for SimEntity {
    fn id(&self) -> EntityId {
        self.id
    }
    fn is_active(&self) -> bool {
        true
    }
    fn transform(&self) -> Option<Transform> {
        Some(Transform {
            position: self.position,
        })
    }
    fn sprite(&self) -> Option<Sprite> {
        Some(Sprite::default())
    }
    fn type_name(&self) -> Option<&str> {
        Some(self.kind)
    }
}

struct SimCamera {
    position: Vec2,
    half_width: f32,
    half_height: f32,
}

impl Camera for SimCamera {
    fn position(&self) -> Vec2 {
        self.position
    }
    fn is_rect_visible(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        x + width >= self.position.x - self.half_width
            && x <= self.position.x + self.half_width
            && y + height >= self.position.y - self.half_height
            && y <= self.position.y + self.half_height
    }
}

#[derive(Default)]
struct Particle {
    lifetime: f32,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("entity-perf load test v{}", env!("CARGO_PKG_VERSION"));

    let config = OptimizerConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: cell_size={}, lod={:?}",
        config.cell_size, config.lod_thresholds
    );

    let entity_count: usize = std::env::var("PERF_ENTITY_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);
    let frames: u64 = std::env::var("PERF_FRAMES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(300);

    let mut optimizer = PerformanceOptimizer::new(config);
    optimizer.initialize_pool::<Particle>(
        "particles",
        Particle::default,
        |p| p.lifetime = 0.0,
        256,
        1024,
    );

    let mut rng = rand::thread_rng();
    let mut entities: Vec<SimEntity> = (0..entity_count)
        .map(|i| SimEntity {
            id: i as EntityId,
            position: Vec2::new(rng.gen_range(-2000.0..2000.0), rng.gen_range(-2000.0..2000.0)),
            velocity: Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0)),
            kind: if i % 3 == 0 { "enemy" } else { "particle" },
        })
        .collect();

    let camera = SimCamera {
        position: Vec2::ZERO,
        half_width: 960.0,
        half_height: 540.0,
    };

    let dt = 1.0 / 60.0;
    let mut sparks = Vec::new();
    for _ in 0..frames {
        for e in &mut entities {
            e.position += e.velocity * dt;
        }
        optimizer.mark_spatial_grid_dirty();
        optimizer.update_spatial_grid(&entities);

        if optimizer.should_update("ai") {
            let near = optimizer.query_entities_near_point(0.0, 0.0, 500.0);
            tracing::debug!(count = near.len(), "ai pass over nearby entities");
        }

        optimizer.batch_entities(&entities);
        let buckets = optimizer.filter_entities_for_rendering(&entities, &camera);
        tracing::debug!(
            high = buckets.high.len(),
            culled = buckets.culled.len(),
            "render filter"
        );

        if optimizer.should_update("effects") {
            if let Some(handle) = optimizer.acquire_from_pool::<Particle>("particles") {
                sparks.push(handle);
            }
        }
        if let Some(pool) = optimizer.pool_mut::<Particle>("particles") {
            for (_, spark) in pool.iter_active_mut() {
                spark.lifetime += dt;
            }
        }
        if sparks.len() > 64 {
            let oldest = optimizer
                .pool::<Particle>("particles")
                .map(|pool| {
                    pool.iter_active()
                        .map(|(_, spark)| spark.lifetime)
                        .fold(0.0f32, f32::max)
                })
                .unwrap_or(0.0);
            tracing::debug!(oldest, "recycling spark burst");
            for handle in sparks.drain(..) {
                optimizer.release_to_pool("particles", handle);
            }
        }

        optimizer.update();
    }

    let stats = optimizer.get_stats();
    info!(
        "Done: {} frames, {} occupied cells ({} memberships, max {}/cell), {} batches",
        stats.frame_count,
        stats.grid.cell_count,
        stats.grid.total_memberships,
        stats.grid.max_per_cell,
        stats.batch_count
    );
    info!(
        "Config snapshot: {}",
        serde_json::to_string_pretty(&optimizer.export_config())?
    );

    Ok(())
}
