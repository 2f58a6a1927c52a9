//! Entity accessor contracts
//!
//! Entities live in an external ECS; this crate only reads them. The view
//! trait exposes the small fixed set of components the performance layer
//! consumes (transform, sprite, type name) as optional fields, resolved once
//! per query instead of repeated string lookups.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Entity identity, assigned and owned by the external ECS
pub type EntityId = u64;

/// Default sprite extent (per axis) when an entity has no sprite data
pub const DEFAULT_SPRITE_SIZE: f32 = 32.0;

/// Position component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

/// Renderable extent component; either axis may be absent upstream,
/// in which case the accessor supplies [`DEFAULT_SPRITE_SIZE`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub width: f32,
    pub height: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            width: DEFAULT_SPRITE_SIZE,
            height: DEFAULT_SPRITE_SIZE,
        }
    }
}

/// Read-only view of one entity, supplied by the external ECS
pub trait EntityView {
    fn id(&self) -> EntityId;
    /// Inactive entities are excluded from indexing, batching and rendering
    fn is_active(&self) -> bool;
    fn transform(&self) -> Option<Transform>;
    fn sprite(&self) -> Option<Sprite>;
    /// Classification key for batching; `None` falls back to `"unknown"`
    fn type_name(&self) -> Option<&str>;
}

/// Camera contract consumed by render filtering
pub trait Camera {
    fn position(&self) -> Vec2;
    fn is_rect_visible(&self, x: f32, y: f32, width: f32, height: f32) -> bool;
}

/// Axis-aligned bounding box in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

/// Bounding box of an entity: position plus sprite extents, with 32x32
/// fallback when no sprite data is available. `None` when the entity has no
/// transform (such entities are invisible to spatial indexing).
pub fn entity_bounds(entity: &impl EntityView) -> Option<Aabb> {
    let transform = entity.transform()?;
    let sprite = entity.sprite().unwrap_or_default();
    Some(Aabb {
        x: transform.position.x,
        y: transform.position.y,
        width: sprite.width,
        height: sprite.height,
    })
}
