use super::{FlattenContext, FlattenedDataSourceProvider};
use crate::{data_source::ContainerHandle, locator::LocatorSet, schema::visibility::VisibilitySchema};

/// Inherited visibility: an authored local value wins, otherwise the parent's flattened visibility applies
#[derive(Debug, Default, Clone, Copy)]
pub struct FlattenedVisibilityProvider;

impl FlattenedDataSourceProvider for FlattenedVisibilityProvider {
    fn flattened_data_source(&self, ctx: &FlattenContext<'_>) -> Option<ContainerHandle> {
        let input = VisibilitySchema::new(ctx.input.clone());
        if input.visibility().is_some() {
            return input.container().cloned();
        }

        ctx.parent_flattened.clone()
    }

    fn compute_dirty_locators_for_descendants(&self, locators: &mut LocatorSet) {
        *locators = LocatorSet::universal_set();
    }
}
