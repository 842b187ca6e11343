//! World registry — keyed entity storage and per-tick fan-out.
//!
//! Categories are non-unique grouping keys ("rock", "woodlog"), not instance
//! identifiers: one key holds an ordered list of entities. Insertion order
//! is preserved both across categories and within one, so a run's update
//! fan-out and dispatch targets are deterministic.

use scene_entity::{OpError, WorldEntity, WorldOp};

/// Errors from dispatching a scripted event into the registry.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No category registered under this key.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// The category exists but holds no entities (every spawn failed).
    #[error("category has no entities: {0}")]
    EmptyCategory(String),

    /// The target entity rejected the operation.
    #[error("operation rejected by \"{key}\": {source}")]
    Rejected {
        key: String,
        #[source]
        source: OpError,
    },
}

#[derive(Debug)]
struct Category {
    key: String,
    entities: Vec<WorldEntity>,
}

/// Registry of all populated entities, keyed by category.
#[derive(Debug, Default)]
pub struct WorldRegistry {
    categories: Vec<Category>,
}

impl WorldRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a category exists under `key`, even if no entity is ever
    /// appended to it.
    pub fn ensure_category(&mut self, key: &str) {
        if self.position_of(key).is_none() {
            self.categories.push(Category {
                key: key.to_string(),
                entities: Vec::new(),
            });
        }
    }

    /// Append an entity under `key`, creating the category on first use.
    pub fn insert(&mut self, key: &str, entity: WorldEntity) {
        self.ensure_category(key);
        // ensure_category just made the lookup infallible.
        if let Some(index) = self.position_of(key) {
            self.categories[index].entities.push(entity);
        }
    }

    /// Entities under `key` in spawn order; empty when the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &[WorldEntity] {
        self.position_of(key)
            .map_or(&[], |index| self.categories[index].entities.as_slice())
    }

    /// The first-registered entity under `key` — the dispatch target.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&WorldEntity> {
        self.get(key).first()
    }

    /// Category keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.key.as_str())
    }

    /// Number of categories.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total entities across all categories.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.entities.len())
            .sum()
    }

    /// Apply `op` to the first entity registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for an unknown or empty key, or when the
    /// entity rejects the operation. Scripted content is assumed
    /// pre-validated, so errors here abort the caller's current batch only.
    pub fn dispatch(&mut self, key: &str, op: &WorldOp) -> Result<(), DispatchError> {
        let index = self
            .position_of(key)
            .ok_or_else(|| DispatchError::UnknownCategory(key.to_string()))?;
        let entity = self.categories[index]
            .entities
            .first_mut()
            .ok_or_else(|| DispatchError::EmptyCategory(key.to_string()))?;
        entity.apply(op).map_err(|source| DispatchError::Rejected {
            key: key.to_string(),
            source,
        })
    }

    /// Fan `update(dt)` out to every entity, category insertion order first,
    /// spawn order within a category.
    pub fn update(&mut self, dt: f32) {
        for category in &mut self.categories {
            for entity in &mut category.entities {
                entity.update(dt);
            }
        }
    }

    fn position_of(&self, key: &str) -> Option<usize> {
        self.categories.iter().position(|category| category.key == key)
    }
}
