//! `model`: asset level information about a prim
use super::Schema;
use crate::{
    data_source::{typed_value, ContainerHandle, DataSource, SampledHandle},
    locator::Locator,
    retained_container,
};
use std::sync::Arc;

pub const MODEL: &str = "model";
pub const ASSET_NAME: &str = "assetName";

#[derive(Debug, Clone, Default)]
pub struct ModelSchema(Schema);

impl ModelSchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    pub fn from_parent(prim: Option<&ContainerHandle>) -> Self {
        Self(Schema::child_of(prim, MODEL))
    }

    pub fn asset_name(&self) -> Option<SampledHandle> {
        self.0.get_sampled(ASSET_NAME)
    }

    /// Asset name as a string, empty if not authored
    pub fn asset_name_string(&self) -> String {
        self.asset_name()
            .and_then(|name| typed_value::<String>(&DataSource::Sampled(name), 0.0))
            .unwrap_or_default()
    }

    pub fn default_locator() -> Locator {
        Locator::from([MODEL])
    }

    pub fn build_retained(asset_name: Option<SampledHandle>) -> ContainerHandle {
        Arc::new(retained_container! {
            ASSET_NAME => asset_name.map(DataSource::Sampled),
        })
    }
}
