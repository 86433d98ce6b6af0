use super::{multiply_matrices, CombinerDataSource, FlattenContext, FlattenedDataSourceProvider};
use crate::{
    data_source::{typed_value, ContainerHandle, DataSource, RetainedSampled, SampledHandle},
    locator::LocatorSet,
    schema::xform::XformSchema,
    value::Value,
};
use glam::DMat4;
use std::sync::{Arc, LazyLock};

static IDENTITY_XFORM: LazyLock<ContainerHandle> = LazyLock::new(|| {
    XformSchema::builder()
        .matrix(Arc::new(RetainedSampled::new(Value::Matrix(DMat4::IDENTITY))))
        .reset_xform_stack(resolved())
        .build()
});

fn resolved() -> SampledHandle {
    Arc::new(RetainedSampled::new(Value::Bool(true)))
}

/// Local-to-world transforms
///
/// | local reset | local matrix | parent matrix | result |
/// |---|---|---|---|
/// | yes | any | any | local container, or identity without a local matrix |
/// | no | none | none | identity |
/// | no | none | some | parent's flattened container |
/// | no | some | none | local matrix |
/// | no | some | some | `parent * local`, combined per sample time |
///
/// All results carry `resetXformStack = true`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlattenedXformProvider;

impl FlattenedDataSourceProvider for FlattenedXformProvider {
    fn flattened_data_source(&self, ctx: &FlattenContext<'_>) -> Option<ContainerHandle> {
        let input = XformSchema::new(ctx.input.clone());

        let reset = input
            .reset_xform_stack()
            .and_then(|reset| typed_value::<bool>(&DataSource::Sampled(reset), 0.0))
            .unwrap_or(false);
        if reset {
            // the local transform already is the full transform
            return match (input.matrix(), input.container()) {
                (Some(_), Some(container)) => Some(container.clone()),
                _ => Some(IDENTITY_XFORM.clone()),
            };
        }

        let parent = XformSchema::new(ctx.parent_flattened.clone());

        let flattened = match (input.matrix(), parent.matrix()) {
            (None, None) => IDENTITY_XFORM.clone(),
            (None, Some(_)) => match parent.container() {
                Some(container) => container.clone(),
                None => IDENTITY_XFORM.clone(),
            },
            (Some(local), None) => XformSchema::builder()
                .matrix(local)
                .reset_xform_stack(resolved())
                .build(),
            (Some(local), Some(parent)) => {
                tracing::trace!(path=%ctx.prim_path, "combining with parent transform");
                XformSchema::builder()
                    .matrix(Arc::new(CombinerDataSource::new(
                        parent,
                        local,
                        multiply_matrices,
                    )))
                    .reset_xform_stack(resolved())
                    .build()
            }
        };
        Some(flattened)
    }

    /// A changed transform changes the flattened transform of every descendant
    fn compute_dirty_locators_for_descendants(&self, locators: &mut LocatorSet) {
        *locators = LocatorSet::universal_set();
    }
}
