//! read/write access to material networks
//!
//! [MaterialNetworkInterface] is the facade shading filters program against: list nodes, read and write node types,
//! parameters, connections and terminals. [DataSourceMaterialNetworkInterface] implements it over an immutable
//! network container, recording every write as an override and producing the patched network on
//! [DataSourceMaterialNetworkInterface::finish].
mod interface;
pub mod node_identifier;

pub use interface::{DataSourceMaterialNetworkInterface, NodeCache};

use crate::{scene_path::ScenePath, token::Token, value::Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_new::new)]
pub struct InputConnection {
    pub upstream_node_name: Token,
    pub upstream_output_name: Token,
}

/// Everything authored for one node parameter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeParamData {
    pub value: Option<Value>,
    /// empty if not authored
    pub color_space: Token,
    /// empty if not authored
    pub type_name: Token,
}

pub trait MaterialNetworkInterface {
    fn material_prim_path(&self) -> &ScenePath;

    /// Asset name of the model the material belongs to, empty if unknown
    fn model_asset_name(&self) -> String;

    fn material_config_keys(&self) -> Vec<Token>;
    fn material_config_value(&self, key: &Token) -> Option<Value>;

    fn node_names(&self) -> Vec<Token>;

    /// Empty if the node has no type (yet)
    fn node_type(&self, node_name: &Token) -> Token;

    fn node_type_info_keys(&self, node_name: &Token) -> Vec<Token>;
    fn node_type_info_value(&self, node_name: &Token, key: &Token) -> Option<Value>;

    fn authored_node_parameter_names(&self, node_name: &Token) -> Vec<Token>;
    fn node_parameter_value(&self, node_name: &Token, param_name: &Token) -> Option<Value>;
    fn node_parameter_data(&self, node_name: &Token, param_name: &Token) -> NodeParamData;

    fn node_input_connection_names(&self, node_name: &Token) -> Vec<Token>;
    fn node_input_connection(&self, node_name: &Token, input_name: &Token) -> Vec<InputConnection>;

    fn delete_node(&mut self, node_name: &Token);

    /// An empty `node_type` removes the type
    fn set_node_type(&mut self, node_name: &Token, node_type: &Token);
    fn set_node_type_info_value(&mut self, node_name: &Token, key: &Token, value: Value);

    fn set_node_parameter_value(&mut self, node_name: &Token, param_name: &Token, value: Value);
    fn set_node_parameter_data(&mut self, node_name: &Token, param_name: &Token, data: &NodeParamData);
    fn delete_node_parameter(&mut self, node_name: &Token, param_name: &Token);

    fn set_node_input_connection(
        &mut self,
        node_name: &Token,
        input_name: &Token,
        connections: &[InputConnection],
    );
    fn delete_node_input_connection(&mut self, node_name: &Token, input_name: &Token);

    fn terminal_names(&self) -> Vec<Token>;
    fn terminal_connection(&self, terminal_name: &Token) -> Option<InputConnection>;
    fn delete_terminal(&mut self, terminal_name: &Token);
    fn set_terminal_connection(&mut self, terminal_name: &Token, connection: &InputConnection);
}
