//! typed views over containers with a known layout
//!
//! A schema wraps an optional container and hands out its well-known children by capability. A schema over a
//! missing container is valid, every getter then yields `None`.
//!
//! Builders assemble retained containers from optional fields; only fields that were set end up in the container,
//! in declaration order.
pub mod material;
pub mod model;
pub mod visibility;
pub mod xform;

pub use material::{
    MaterialConnectionSchema, MaterialNetworkSchema, MaterialNodeParameterSchema, MaterialNodeSchema,
};
pub use model::ModelSchema;
pub use visibility::VisibilitySchema;
pub use xform::XformSchema;

use crate::{
    data_source::{ContainerHandle, DataSource, SampledHandle, VectorHandle},
    token::Token,
};

#[derive(Debug, Clone, Default)]
pub struct Schema {
    container: Option<ContainerHandle>,
}

impl Schema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self { container }
    }

    /// Schema over the child container `name` of `parent`
    pub fn child_of(parent: Option<&ContainerHandle>, name: &str) -> Self {
        Self::new(parent.and_then(|parent| crate::data_source::get_container(parent, &Token::from(name))))
    }

    pub fn container(&self) -> Option<&ContainerHandle> {
        self.container.as_ref()
    }

    pub fn is_defined(&self) -> bool {
        self.container.is_some()
    }

    pub fn get(&self, name: &str) -> Option<DataSource> {
        self.container.as_ref()?.get(&Token::from(name))
    }

    pub fn get_sampled(&self, name: &str) -> Option<SampledHandle> {
        match self.get(name)? {
            DataSource::Sampled(s) => Some(s),
            other => {
                tracing::warn!(name, found = other.kind(), "expected sampled data source");
                None
            }
        }
    }

    pub fn get_container(&self, name: &str) -> Option<ContainerHandle> {
        match self.get(name)? {
            DataSource::Container(c) => Some(c),
            other => {
                tracing::warn!(name, found = other.kind(), "expected container data source");
                None
            }
        }
    }

    pub fn get_vector(&self, name: &str) -> Option<VectorHandle> {
        match self.get(name)? {
            DataSource::Vector(v) => Some(v),
            other => {
                tracing::warn!(name, found = other.kind(), "expected vector data source");
                None
            }
        }
    }
}

/// Names of the children of an optional container, empty if missing
pub fn names_of(container: Option<&ContainerHandle>) -> Vec<Token> {
    container.map(|c| c.names()).unwrap_or_default()
}
