//! hierarchical values resolved against their ancestors
//!
//! A [FlattenedDataSourceProvider] computes the flattened form of one named child container of a prim (for example
//! `xform`) from the prim's local container and the parent prim's already flattened container. Providers are
//! registered by name with a [FlatteningCache], which walks the prim hierarchy and memoizes flattened prims.
//!
//! Flattened results are always marked as fully resolved (for transforms: `resetXformStack = true`) so they are
//! never flattened a second time by accident.
mod cache;
mod combiner;
mod visibility;
mod xform;

pub use cache::{FlatteningCache, Providers};
pub use combiner::{multiply_matrices, CombineFn, CombinerDataSource};
pub use visibility::FlattenedVisibilityProvider;
pub use xform::FlattenedXformProvider;

use crate::{data_source::ContainerHandle, locator::LocatorSet, scene_path::ScenePath};

/// Inputs available when flattening one prim
#[derive(Debug, Clone, derive_new::new)]
pub struct FlattenContext<'a> {
    pub prim_path: &'a ScenePath,
    /// the prim's own (unflattened) container of the provider's name
    pub input: Option<ContainerHandle>,
    /// result of the same provider for the parent prim
    pub parent_flattened: Option<ContainerHandle>,
}

pub trait FlattenedDataSourceProvider: Send + Sync + std::fmt::Debug {
    fn flattened_data_source(&self, ctx: &FlattenContext<'_>) -> Option<ContainerHandle>;

    /// Given what is dirty in a prim's container of this provider, adjusts `locators` (relative to that container) to
    /// what becomes dirty on every descendant
    fn compute_dirty_locators_for_descendants(&self, locators: &mut LocatorSet);
}
