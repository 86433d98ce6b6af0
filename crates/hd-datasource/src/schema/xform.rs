//! `xform`: a prim's transform
//!
//! | name | kind | |
//! |---|---|---|
//! | `matrix` | sampled matrix | local transform, or the full transform if `resetXformStack` is set |
//! | `resetXformStack` | sampled bool | ignore all ancestors' transforms |
use super::Schema;
use crate::{
    data_source::{ContainerHandle, DataSource, SampledHandle},
    locator::Locator,
    retained_container,
};
use std::sync::Arc;

pub const XFORM: &str = "xform";
pub const MATRIX: &str = "matrix";
pub const RESET_XFORM_STACK: &str = "resetXformStack";

#[derive(Debug, Clone, Default)]
pub struct XformSchema(Schema);

impl XformSchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    /// The `xform` child of a prim container
    pub fn from_parent(prim: Option<&ContainerHandle>) -> Self {
        Self(Schema::child_of(prim, XFORM))
    }

    pub fn container(&self) -> Option<&ContainerHandle> {
        self.0.container()
    }

    pub fn matrix(&self) -> Option<SampledHandle> {
        self.0.get_sampled(MATRIX)
    }

    pub fn reset_xform_stack(&self) -> Option<SampledHandle> {
        self.0.get_sampled(RESET_XFORM_STACK)
    }

    pub fn default_locator() -> Locator {
        Locator::from([XFORM])
    }

    pub fn builder() -> XformBuilder {
        XformBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct XformBuilder {
    matrix: Option<SampledHandle>,
    reset_xform_stack: Option<SampledHandle>,
}

impl XformBuilder {
    pub fn matrix(mut self, matrix: SampledHandle) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn reset_xform_stack(mut self, reset_xform_stack: SampledHandle) -> Self {
        self.reset_xform_stack = Some(reset_xform_stack);
        self
    }

    pub fn build(self) -> ContainerHandle {
        Arc::new(retained_container! {
            MATRIX => self.matrix.map(DataSource::Sampled),
            RESET_XFORM_STACK => self.reset_xform_stack.map(DataSource::Sampled),
        })
    }
}
