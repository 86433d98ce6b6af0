//! material networks
//!
//! ```text
//! material network
//! ├── nodes
//! │   └── <node name>
//! │       ├── nodeIdentifier      sampled token
//! │       ├── parameters
//! │       │   └── <param name>
//! │       │       ├── value       sampled
//! │       │       ├── colorSpace  sampled token
//! │       │       └── typeName    sampled token
//! │       ├── inputConnections
//! │       │   └── <input name>    vector of connections
//! │       └── nodeTypeInfo        container, conventions defined by the shading system
//! ├── terminals
//! │   └── <terminal name>         connection
//! ├── interfaceMappings
//! └── config                      container of sampled values
//!
//! connection
//! ├── upstreamNodePath            sampled token (node name)
//! └── upstreamNodeOutputName      sampled token
//! ```
use super::Schema;
use crate::{
    data_source::{
        typed_value, ContainerHandle, DataSource, RetainedVector, SampledHandle, VectorHandle,
    },
    locator::Locator,
    retained_container,
    token::Token,
};
use std::sync::Arc;

/// prim child holding the material network
pub const MATERIAL: &str = "material";

pub const NODES: &str = "nodes";
pub const TERMINALS: &str = "terminals";
pub const INTERFACE_MAPPINGS: &str = "interfaceMappings";
pub const CONFIG: &str = "config";

pub const NODE_IDENTIFIER: &str = "nodeIdentifier";
pub const PARAMETERS: &str = "parameters";
pub const INPUT_CONNECTIONS: &str = "inputConnections";
pub const NODE_TYPE_INFO: &str = "nodeTypeInfo";

pub const VALUE: &str = "value";
pub const COLOR_SPACE: &str = "colorSpace";
pub const TYPE_NAME: &str = "typeName";

pub const UPSTREAM_NODE_PATH: &str = "upstreamNodePath";
pub const UPSTREAM_NODE_OUTPUT_NAME: &str = "upstreamNodeOutputName";

#[derive(Debug, Clone, Default)]
pub struct MaterialNetworkSchema(Schema);

impl MaterialNetworkSchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    pub fn container(&self) -> Option<&ContainerHandle> {
        self.0.container()
    }

    pub fn nodes(&self) -> Option<ContainerHandle> {
        self.0.get_container(NODES)
    }

    pub fn terminals(&self) -> Option<ContainerHandle> {
        self.0.get_container(TERMINALS)
    }

    pub fn interface_mappings(&self) -> Option<ContainerHandle> {
        self.0.get_container(INTERFACE_MAPPINGS)
    }

    pub fn config(&self) -> Option<ContainerHandle> {
        self.0.get_container(CONFIG)
    }

    pub fn default_locator() -> Locator {
        Locator::from([MATERIAL])
    }

    pub fn build_retained(
        nodes: Option<ContainerHandle>,
        terminals: Option<ContainerHandle>,
        interface_mappings: Option<ContainerHandle>,
        config: Option<ContainerHandle>,
    ) -> ContainerHandle {
        Arc::new(retained_container! {
            NODES => nodes.map(DataSource::Container),
            TERMINALS => terminals.map(DataSource::Container),
            INTERFACE_MAPPINGS => interface_mappings.map(DataSource::Container),
            CONFIG => config.map(DataSource::Container),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterialNodeSchema(Schema);

impl MaterialNodeSchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    pub fn container(&self) -> Option<&ContainerHandle> {
        self.0.container()
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_defined()
    }

    pub fn node_identifier(&self) -> Option<SampledHandle> {
        self.0.get_sampled(NODE_IDENTIFIER)
    }

    pub fn parameters(&self) -> Option<ContainerHandle> {
        self.0.get_container(PARAMETERS)
    }

    pub fn input_connections(&self) -> Option<ContainerHandle> {
        self.0.get_container(INPUT_CONNECTIONS)
    }

    pub fn node_type_info(&self) -> Option<ContainerHandle> {
        self.0.get_container(NODE_TYPE_INFO)
    }

    pub fn build_retained(
        node_identifier: Option<SampledHandle>,
        parameters: Option<ContainerHandle>,
        input_connections: Option<ContainerHandle>,
        node_type_info: Option<ContainerHandle>,
    ) -> ContainerHandle {
        Arc::new(retained_container! {
            NODE_IDENTIFIER => node_identifier.map(DataSource::Sampled),
            PARAMETERS => parameters.map(DataSource::Container),
            INPUT_CONNECTIONS => input_connections.map(DataSource::Container),
            NODE_TYPE_INFO => node_type_info.map(DataSource::Container),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterialNodeParameterSchema(Schema);

impl MaterialNodeParameterSchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    pub fn value(&self) -> Option<SampledHandle> {
        self.0.get_sampled(VALUE)
    }

    pub fn color_space(&self) -> Option<SampledHandle> {
        self.0.get_sampled(COLOR_SPACE)
    }

    pub fn type_name(&self) -> Option<SampledHandle> {
        self.0.get_sampled(TYPE_NAME)
    }

    pub fn build_retained(
        value: Option<SampledHandle>,
        color_space: Option<SampledHandle>,
        type_name: Option<SampledHandle>,
    ) -> ContainerHandle {
        Arc::new(retained_container! {
            VALUE => value.map(DataSource::Sampled),
            COLOR_SPACE => color_space.map(DataSource::Sampled),
            TYPE_NAME => type_name.map(DataSource::Sampled),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MaterialConnectionSchema(Schema);

impl MaterialConnectionSchema {
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self(Schema::new(container))
    }

    pub fn is_defined(&self) -> bool {
        self.0.is_defined()
    }

    pub fn upstream_node_path(&self) -> Option<SampledHandle> {
        self.0.get_sampled(UPSTREAM_NODE_PATH)
    }

    pub fn upstream_node_output_name(&self) -> Option<SampledHandle> {
        self.0.get_sampled(UPSTREAM_NODE_OUTPUT_NAME)
    }

    /// Upstream node and output names, empty tokens where missing
    pub fn tokens(&self) -> (Token, Token) {
        let read = |ds: Option<SampledHandle>| {
            ds.and_then(|ds| typed_value::<Token>(&DataSource::Sampled(ds), 0.0))
                .unwrap_or_default()
        };
        (
            read(self.upstream_node_path()),
            read(self.upstream_node_output_name()),
        )
    }

    pub fn build_retained(upstream_node_path: Token, upstream_node_output_name: Token) -> ContainerHandle {
        Arc::new(retained_container! {
            UPSTREAM_NODE_PATH => DataSource::retained(upstream_node_path),
            UPSTREAM_NODE_OUTPUT_NAME => DataSource::retained(upstream_node_output_name),
        })
    }
}

/// Vector of connection containers, as stored under `inputConnections/<input name>`
pub fn connection_vector(connections: impl IntoIterator<Item = ContainerHandle>) -> VectorHandle {
    Arc::new(RetainedVector::new(
        connections.into_iter().map(DataSource::Container).collect(),
    ))
}
