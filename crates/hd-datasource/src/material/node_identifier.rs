//! filling in missing node types from implementation source information
//!
//! Nodes authored by asset or source code carry no node type. Their `nodeTypeInfo` describes the implementation:
//!
//! | key | |
//! |---|---|
//! | `implementationSource` | `sourceAsset` or `sourceCode` |
//! | `<sourceType>:sourceAsset` | asset path of the shader |
//! | `<sourceType>:sourceAsset:subIdentifier` | entry within the asset |
//! | `<sourceType>:sourceCode` | inline shader source |
//! | `sdrMetadata` | dictionary passed on to the registry |
//!
//! Every key is looked up qualified with the source type first (`glslfx:sdrMetadata`), then bare (`sdrMetadata`).
//! A [ShaderRegistry] turns that information into a node identifier.
use super::MaterialNetworkInterface;
use crate::{token::Token, value::FromValue};
use indexmap::IndexMap;

pub const IMPLEMENTATION_SOURCE: &str = "implementationSource";
pub const SOURCE_ASSET: &str = "sourceAsset";
pub const SOURCE_ASSET_SUB_IDENTIFIER: &str = "sourceAsset:subIdentifier";
pub const SOURCE_CODE: &str = "sourceCode";
pub const SDR_METADATA: &str = "sdrMetadata";

pub type ShaderMetadata = IndexMap<Token, String>;

#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct ShaderNode {
    pub identifier: Token,
    pub source_type: Token,
}

/// Lookup service for shader node definitions
pub trait ShaderRegistry {
    fn node_from_asset(
        &self,
        asset: &str,
        metadata: &ShaderMetadata,
        sub_identifier: &Token,
        source_type: &Token,
    ) -> Option<ShaderNode>;

    fn node_from_source_code(
        &self,
        source_code: &str,
        source_type: &Token,
        metadata: &ShaderMetadata,
    ) -> Option<ShaderNode>;
}

/// Type info value `key`, qualified with `source_type` first
fn type_info<T, I>(interface: &I, node_name: &Token, source_type: &Token, key: &str) -> Option<T>
where
    T: FromValue,
    I: MaterialNetworkInterface + ?Sized,
{
    let qualified = Token::from(format!("{source_type}:{key}"));
    let value = interface
        .node_type_info_value(node_name, &qualified)
        .or_else(|| interface.node_type_info_value(node_name, &Token::from(key)))?;

    let typed = T::from_value(&value);
    if typed.is_none() {
        tracing::warn!(
            node=%node_name, key, expected = T::TYPE_NAME, found = value.type_name(),
            "unexpected node type info"
        );
    }
    typed
}

fn metadata<I>(interface: &I, node_name: &Token, source_type: &Token) -> ShaderMetadata
where
    I: MaterialNetworkInterface + ?Sized,
{
    type_info::<IndexMap<String, crate::value::Value>, _>(interface, node_name, source_type, SDR_METADATA)
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (Token::from(key), value.to_string()))
        .collect()
}

fn shader_node<I>(
    interface: &I,
    node_name: &Token,
    source_type: &Token,
    registry: &dyn ShaderRegistry,
) -> Option<ShaderNode>
where
    I: MaterialNetworkInterface + ?Sized,
{
    let implementation_source: String =
        type_info(interface, node_name, source_type, IMPLEMENTATION_SOURCE)?;

    match implementation_source.as_str() {
        SOURCE_ASSET => {
            let asset: String = type_info(interface, node_name, source_type, SOURCE_ASSET)?;
            let sub_identifier: Token =
                type_info(interface, node_name, source_type, SOURCE_ASSET_SUB_IDENTIFIER)
                    .unwrap_or_default();
            registry.node_from_asset(
                &asset,
                &metadata(interface, node_name, source_type),
                &sub_identifier,
                source_type,
            )
        }
        SOURCE_CODE => {
            let source_code: String = type_info(interface, node_name, source_type, SOURCE_CODE)?;
            if source_code.is_empty() {
                return None;
            }
            registry.node_from_source_code(
                &source_code,
                source_type,
                &metadata(interface, node_name, source_type),
            )
        }
        _ => None,
    }
}

/// Sets the node type of every node without one that the registry can identify
///
/// Returns the number of nodes that got a type.
#[tracing::instrument(level = "trace", skip_all, fields(%source_type))]
pub fn resolve_node_identifiers<I>(
    interface: &mut I,
    source_type: &Token,
    registry: &dyn ShaderRegistry,
) -> usize
where
    I: MaterialNetworkInterface + ?Sized,
{
    let mut resolved = 0;
    for node_name in interface.node_names() {
        if !interface.node_type(&node_name).is_empty() {
            continue;
        }

        let Some(node) = shader_node(&*interface, &node_name, source_type, registry) else {
            tracing::debug!(node=%node_name, "no shader node found");
            continue;
        };

        tracing::trace!(node=%node_name, identifier=%node.identifier, "resolved node identifier");
        interface.set_node_type(&node_name, &node.identifier);
        resolved += 1;
    }
    resolved
}
