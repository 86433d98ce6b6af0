//! `visibility`: whether a prim (and, by inheritance, its descendants) is drawn
use super::Schema;
use crate::{
    data_source::{ContainerHandle, DataSource, SampledHandle},
    locator::Locator,
    retained_container,
};
use std::sync::Arc;

pub const VISIBILITY: &str = "visibility";

#[derive(Debug, Clone, Default)]
pub struct VisibilitySchema(Schema);

impl VisibilitySchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    pub fn from_parent(prim: Option<&ContainerHandle>) -> Self {
        Self(Schema::child_of(prim, VISIBILITY))
    }

    pub fn container(&self) -> Option<&ContainerHandle> {
        self.0.container()
    }

    pub fn visibility(&self) -> Option<SampledHandle> {
        self.0.get_sampled(VISIBILITY)
    }

    pub fn default_locator() -> Locator {
        Locator::from([VISIBILITY])
    }

    pub fn build_retained(visibility: Option<SampledHandle>) -> ContainerHandle {
        Arc::new(retained_container! {
            VISIBILITY => visibility.map(DataSource::Sampled),
        })
    }
}
