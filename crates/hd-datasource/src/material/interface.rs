use super::{InputConnection, MaterialNetworkInterface, NodeParamData};
use crate::{
    data_source::{
        get_at, get_container, to_value, typed_value, ContainerHandle, DataSource, RetainedSampled,
        SampledHandle,
    },
    editor::ContainerDataSourceEditor,
    locator::Locator,
    scene_path::ScenePath,
    schema::{
        material::{
            connection_vector, COLOR_SPACE, INPUT_CONNECTIONS, NODES, NODE_IDENTIFIER, NODE_TYPE_INFO,
            PARAMETERS, TERMINALS, TYPE_NAME, VALUE,
        },
        names_of, MaterialConnectionSchema, MaterialNetworkSchema, MaterialNodeParameterSchema,
        MaterialNodeSchema, ModelSchema,
    },
    token::Token,
    value::Value,
};
use indexmap::{IndexMap, IndexSet};
use std::{cell::RefCell, sync::Arc};

/// The most recently read node of the base network, with its parameters and connections
///
/// Consecutive reads of the same node skip the lookups through the network. Selecting another node, or editing the
/// cached one, resets the cache.
#[derive(Debug, Default)]
pub struct NodeCache {
    node_name: Option<Token>,
    node: MaterialNodeSchema,
    parameters: Option<ContainerHandle>,
    connections: Option<ContainerHandle>,
}

impl NodeCache {
    fn select(&mut self, nodes: Option<&ContainerHandle>, node_name: &Token) {
        if self.node_name.as_ref() == Some(node_name) {
            return;
        }

        let node = MaterialNodeSchema::new(nodes.and_then(|nodes| get_container(nodes, node_name)));
        self.parameters = node.parameters();
        self.connections = node.input_connections();
        self.node = node;
        self.node_name = Some(node_name.clone());
    }

    pub fn node_name(&self) -> Option<&Token> {
        self.node_name.as_ref()
    }

    pub fn invalidate(&mut self) {
        *self = Self::default();
    }
}

/// Where a read is answered from
enum Resolved {
    /// closest recorded override at or above the locator, `None` for a deletion
    Override(Option<DataSource>),
    Base,
}

/// [MaterialNetworkInterface] over an immutable network container
///
/// Writes are recorded per [Locator] (last write wins, a write discards the recorded writes below it) and applied to
/// a [ContainerDataSourceEditor] over the base network. Reads consult the most specific recorded write first and fall
/// through to the base network otherwise.
///
/// Deleting a whole node is final for the session: later writes into that node are ignored.
///
/// Not meant for concurrent use while editing. [DataSourceMaterialNetworkInterface::finish] consumes the interface,
/// the container it returns is an ordinary immutable data source.
#[derive(Debug)]
pub struct DataSourceMaterialNetworkInterface {
    material_prim_path: ScenePath,
    /// the material prim, for information outside the network
    prim_container: Option<ContainerHandle>,
    network: ContainerHandle,
    network_schema: MaterialNetworkSchema,
    nodes: Option<ContainerHandle>,
    editor: ContainerDataSourceEditor,
    overrides: IndexMap<Locator, Option<DataSource>>,
    overridden_nodes: IndexSet<Token>,
    deleted_nodes: IndexSet<Token>,
    node_type_info_overrides: IndexMap<Token, ContainerDataSourceEditor>,
    terminals_overridden: bool,
    node_cache: RefCell<NodeCache>,
}

fn node_locator(node_name: &Token) -> Locator {
    Locator::new(vec![NODES.into(), node_name.clone()])
}

fn parameter_locator(node_name: &Token, param_name: &Token) -> Locator {
    node_locator(node_name)
        .append(PARAMETERS)
        .append(param_name.clone())
}

fn connection_locator(node_name: &Token, input_name: &Token) -> Locator {
    node_locator(node_name)
        .append(INPUT_CONNECTIONS)
        .append(input_name.clone())
}

fn terminal_locator(terminal_name: &Token) -> Locator {
    Locator::new(vec![TERMINALS.into(), terminal_name.clone()])
}

fn sampled(value: impl Into<Value>) -> SampledHandle {
    Arc::new(RetainedSampled::new(value.into()))
}

/// `rest` below `data_source`
fn descend(data_source: &DataSource, rest: &[Token]) -> Option<DataSource> {
    if rest.is_empty() {
        return Some(data_source.clone());
    }

    match data_source {
        DataSource::Container(container) => get_at(container, &Locator::from(rest)),
        _ => None,
    }
}

fn value_at_zero(data_source: Option<DataSource>) -> Option<Value> {
    match data_source? {
        DataSource::Sampled(sampled) => Some(sampled.value(0.0)),
        other => {
            tracing::warn!(found = other.kind(), "expected sampled data source");
            None
        }
    }
}

fn token_at_zero(data_source: Option<DataSource>) -> Token {
    data_source
        .and_then(|ds| typed_value::<Token>(&ds, 0.0))
        .unwrap_or_default()
}

fn connection_of(container: Option<ContainerHandle>) -> Option<InputConnection> {
    let schema = MaterialConnectionSchema::new(container);
    if !schema.is_defined() {
        return None;
    }

    let (upstream_node_name, upstream_output_name) = schema.tokens();
    Some(InputConnection::new(upstream_node_name, upstream_output_name))
}

fn container_of(data_source: Option<DataSource>) -> Option<ContainerHandle> {
    match data_source? {
        DataSource::Container(container) => Some(container),
        _ => None,
    }
}

impl DataSourceMaterialNetworkInterface {
    pub fn new(
        material_prim_path: ScenePath,
        network: ContainerHandle,
        prim_container: Option<ContainerHandle>,
    ) -> Self {
        let network_schema = MaterialNetworkSchema::new(Some(network.clone()));
        let nodes = network_schema.nodes();

        Self {
            material_prim_path,
            prim_container,
            editor: ContainerDataSourceEditor::new(Some(network.clone())),
            network,
            network_schema,
            nodes,
            overrides: Default::default(),
            overridden_nodes: Default::default(),
            deleted_nodes: Default::default(),
            node_type_info_overrides: Default::default(),
            terminals_overridden: false,
            node_cache: Default::default(),
        }
    }

    /// `true` once anything was written
    pub fn is_modified(&self) -> bool {
        !self.overrides.is_empty() || !self.node_type_info_overrides.is_empty()
    }

    /// The patched network, or the base network itself if nothing was written
    pub fn finish(self) -> ContainerHandle {
        if !self.is_modified() {
            tracing::trace!(path=%self.material_prim_path, "material network unmodified");
            return self.network;
        }

        tracing::trace!(
            path=%self.material_prim_path,
            overrides = self.overrides.len(),
            deleted_nodes = self.deleted_nodes.len(),
            "material network patched"
        );
        self.editor.finish()
    }

    fn resolve(&self, locator: &Locator) -> Resolved {
        if self.overrides.is_empty() {
            return Resolved::Base;
        }

        let mut prefix = locator.clone();
        loop {
            if let Some(value) = self.overrides.get(&prefix) {
                let rest = &locator.elements()[prefix.len()..];
                return Resolved::Override(value.as_ref().and_then(|ds| descend(ds, rest)));
            }

            if prefix.is_empty() {
                return Resolved::Base;
            }
            prefix = prefix.parent();
        }
    }

    /// Data source at `locator` within node `node_name`, `base` reads the unedited node
    fn read_node(
        &self,
        node_name: &Token,
        locator: &Locator,
        base: impl FnOnce(&NodeCache) -> Option<DataSource>,
    ) -> Option<DataSource> {
        if self.deleted_nodes.contains(node_name) {
            return None;
        }

        match self.resolve(locator) {
            Resolved::Override(value) => value,
            Resolved::Base => {
                let mut cache = self.node_cache.borrow_mut();
                cache.select(self.nodes.as_ref(), node_name);
                base(&cache)
            }
        }
    }

    fn parameter_field(&self, node_name: &Token, param_name: &Token, field: &str) -> Option<DataSource> {
        self.read_node(
            node_name,
            &parameter_locator(node_name, param_name).append(field),
            |cache| {
                get_container(cache.parameters.as_ref()?, param_name)?.get(&Token::from(field))
            },
        )
    }

    /// Node `node_name` as it currently reads, edits included
    fn edited_node(&self, node_name: &Token) -> MaterialNodeSchema {
        MaterialNodeSchema::new(container_of(get_at(
            &self.editor.finish(),
            &node_locator(node_name),
        )))
    }

    /// `nodeTypeInfo` without the edits made through [MaterialNetworkInterface::set_node_type_info_value]
    fn original_node_type_info(&self, node_name: &Token) -> Option<ContainerHandle> {
        container_of(self.read_node(
            node_name,
            &node_locator(node_name).append(NODE_TYPE_INFO),
            |cache| cache.node.node_type_info().map(DataSource::Container),
        ))
    }

    fn node_type_info(&self, node_name: &Token) -> Option<ContainerHandle> {
        if self.deleted_nodes.contains(node_name) {
            return None;
        }

        match self.node_type_info_overrides.get(node_name) {
            Some(editor) => Some(editor.finish()),
            None => self.original_node_type_info(node_name),
        }
    }

    /// `true` if writes into `node_name` are accepted
    fn writable(&self, node_name: &Token) -> bool {
        if self.deleted_nodes.contains(node_name) {
            tracing::warn!(
                path=%self.material_prim_path, node=%node_name,
                "ignoring edit of deleted node"
            );
            return false;
        }
        true
    }

    fn set_override(&mut self, locator: Locator, value: Option<DataSource>) {
        let node_name = match locator.first_element() {
            Some(first) if first.as_str() == NODES => locator.element(1).cloned(),
            _ => None,
        };
        if let Some(node_name) = &node_name {
            if !self.writable(node_name) {
                return;
            }
        }

        tracing::trace!(path=%self.material_prim_path, %locator, deleted = value.is_none(), "override");

        // recorded writes below this one are superseded
        self.overrides
            .retain(|existing, _| !locator.is_prefix_of(existing));
        self.overrides.insert(locator.clone(), value.clone());
        self.editor.set(&locator, value);

        match node_name {
            Some(node_name) => {
                let cache = self.node_cache.get_mut();
                if cache.node_name() == Some(&node_name) {
                    cache.invalidate();
                }
                self.overridden_nodes.insert(node_name);
            }
            None => {
                if locator.first_element().map(Token::as_str) == Some(TERMINALS) {
                    self.terminals_overridden = true;
                }
            }
        }
    }
}

impl MaterialNetworkInterface for DataSourceMaterialNetworkInterface {
    fn material_prim_path(&self) -> &ScenePath {
        &self.material_prim_path
    }

    fn model_asset_name(&self) -> String {
        ModelSchema::from_parent(self.prim_container.as_ref()).asset_name_string()
    }

    fn material_config_keys(&self) -> Vec<Token> {
        names_of(self.network_schema.config().as_ref())
    }

    fn material_config_value(&self, key: &Token) -> Option<Value> {
        let data_source = self.network_schema.config()?.get(key)?;
        to_value(&data_source, 0.0)
    }

    fn node_names(&self) -> Vec<Token> {
        if self.overridden_nodes.is_empty() {
            return names_of(self.nodes.as_ref());
        }

        let network = MaterialNetworkSchema::new(Some(self.editor.finish()));
        names_of(network.nodes().as_ref())
    }

    fn node_type(&self, node_name: &Token) -> Token {
        token_at_zero(self.read_node(
            node_name,
            &node_locator(node_name).append(NODE_IDENTIFIER),
            |cache| cache.node.node_identifier().map(DataSource::Sampled),
        ))
    }

    fn node_type_info_keys(&self, node_name: &Token) -> Vec<Token> {
        names_of(self.node_type_info(node_name).as_ref())
    }

    fn node_type_info_value(&self, node_name: &Token, key: &Token) -> Option<Value> {
        let data_source = self.node_type_info(node_name)?.get(key)?;
        to_value(&data_source, 0.0)
    }

    fn authored_node_parameter_names(&self, node_name: &Token) -> Vec<Token> {
        if self.deleted_nodes.contains(node_name) {
            return vec![];
        }

        if self.overridden_nodes.contains(node_name) {
            return names_of(self.edited_node(node_name).parameters().as_ref());
        }

        let mut cache = self.node_cache.borrow_mut();
        cache.select(self.nodes.as_ref(), node_name);
        names_of(cache.parameters.as_ref())
    }

    fn node_parameter_value(&self, node_name: &Token, param_name: &Token) -> Option<Value> {
        value_at_zero(self.parameter_field(node_name, param_name, VALUE))
    }

    fn node_parameter_data(&self, node_name: &Token, param_name: &Token) -> NodeParamData {
        NodeParamData {
            value: self.node_parameter_value(node_name, param_name),
            color_space: token_at_zero(self.parameter_field(node_name, param_name, COLOR_SPACE)),
            type_name: token_at_zero(self.parameter_field(node_name, param_name, TYPE_NAME)),
        }
    }

    fn node_input_connection_names(&self, node_name: &Token) -> Vec<Token> {
        if self.deleted_nodes.contains(node_name) {
            return vec![];
        }

        if self.overridden_nodes.contains(node_name) {
            return names_of(self.edited_node(node_name).input_connections().as_ref());
        }

        let mut cache = self.node_cache.borrow_mut();
        cache.select(self.nodes.as_ref(), node_name);
        names_of(cache.connections.as_ref())
    }

    fn node_input_connection(&self, node_name: &Token, input_name: &Token) -> Vec<InputConnection> {
        let data_source = self.read_node(
            node_name,
            &connection_locator(node_name, input_name),
            |cache| cache.connections.as_ref()?.get(input_name),
        );

        let Some(DataSource::Vector(connections)) = data_source else {
            return vec![];
        };

        (0..connections.len())
            .filter_map(|index| connections.element(index))
            .filter_map(|element| connection_of(container_of(Some(element))))
            .collect()
    }

    fn delete_node(&mut self, node_name: &Token) {
        if self.deleted_nodes.contains(node_name) {
            return;
        }

        self.set_override(node_locator(node_name), None);
        self.node_type_info_overrides.shift_remove(node_name);
        self.deleted_nodes.insert(node_name.clone());
    }

    fn set_node_type(&mut self, node_name: &Token, node_type: &Token) {
        let value = (!node_type.is_empty()).then(|| DataSource::retained(node_type.clone()));
        self.set_override(node_locator(node_name).append(NODE_IDENTIFIER), value);
    }

    fn set_node_type_info_value(&mut self, node_name: &Token, key: &Token, value: Value) {
        if !self.writable(node_name) {
            return;
        }

        if !self.node_type_info_overrides.contains_key(node_name) {
            let original = self.original_node_type_info(node_name);
            self.node_type_info_overrides
                .insert(node_name.clone(), ContainerDataSourceEditor::new(original));
        }

        let Some(type_info_editor) = self.node_type_info_overrides.get_mut(node_name) else {
            return;
        };
        type_info_editor.set(&Locator::from([key.clone()]), Some(DataSource::retained(value)));
        let type_info = type_info_editor.finish();

        self.editor.set(
            &node_locator(node_name).append(NODE_TYPE_INFO),
            Some(DataSource::Container(type_info)),
        );
        self.overridden_nodes.insert(node_name.clone());
    }

    fn set_node_parameter_value(&mut self, node_name: &Token, param_name: &Token, value: Value) {
        self.set_override(
            parameter_locator(node_name, param_name).append(VALUE),
            Some(DataSource::retained(value)),
        );
    }

    fn set_node_parameter_data(&mut self, node_name: &Token, param_name: &Token, data: &NodeParamData) {
        let parameter = MaterialNodeParameterSchema::build_retained(
            data.value.clone().map(sampled),
            (!data.color_space.is_empty()).then(|| sampled(data.color_space.clone())),
            (!data.type_name.is_empty()).then(|| sampled(data.type_name.clone())),
        );
        self.set_override(
            parameter_locator(node_name, param_name),
            Some(DataSource::Container(parameter)),
        );
    }

    fn delete_node_parameter(&mut self, node_name: &Token, param_name: &Token) {
        self.set_override(parameter_locator(node_name, param_name), None);
    }

    fn set_node_input_connection(
        &mut self,
        node_name: &Token,
        input_name: &Token,
        connections: &[InputConnection],
    ) {
        let connections = connection_vector(connections.iter().map(|connection| {
            MaterialConnectionSchema::build_retained(
                connection.upstream_node_name.clone(),
                connection.upstream_output_name.clone(),
            )
        }));
        self.set_override(
            connection_locator(node_name, input_name),
            Some(DataSource::Vector(connections)),
        );
    }

    fn delete_node_input_connection(&mut self, node_name: &Token, input_name: &Token) {
        self.set_override(connection_locator(node_name, input_name), None);
    }

    fn terminal_names(&self) -> Vec<Token> {
        if !self.terminals_overridden {
            return names_of(self.network_schema.terminals().as_ref());
        }

        let network = MaterialNetworkSchema::new(Some(self.editor.finish()));
        names_of(network.terminals().as_ref())
    }

    fn terminal_connection(&self, terminal_name: &Token) -> Option<InputConnection> {
        let locator = terminal_locator(terminal_name);
        let data_source = match self.resolve(&locator) {
            Resolved::Override(value) => value,
            Resolved::Base => self.network_schema.terminals()?.get(terminal_name),
        };
        connection_of(container_of(data_source))
    }

    fn delete_terminal(&mut self, terminal_name: &Token) {
        self.set_override(terminal_locator(terminal_name), None);
    }

    fn set_terminal_connection(&mut self, terminal_name: &Token, connection: &InputConnection) {
        let connection = MaterialConnectionSchema::build_retained(
            connection.upstream_node_name.clone(),
            connection.upstream_output_name.clone(),
        );
        self.set_override(
            terminal_locator(terminal_name),
            Some(DataSource::Container(connection)),
        );
    }
}
