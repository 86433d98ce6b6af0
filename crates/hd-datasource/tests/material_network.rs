//! Editing a material network through the data source interface

use hd_datasource::{
    data_source::{ContainerHandle, DataSource, RetainedSampled, SampledHandle},
    material::{
        node_identifier::{resolve_node_identifiers, ShaderMetadata, ShaderNode, ShaderRegistry},
        DataSourceMaterialNetworkInterface, InputConnection, MaterialNetworkInterface,
    },
    retained_container,
    scene_path::ScenePath,
    schema::{
        material::connection_vector, MaterialConnectionSchema, MaterialNetworkSchema,
        MaterialNodeParameterSchema, MaterialNodeSchema,
    },
    token::Token,
    value::Value,
    visit::dump,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn t(name: &str) -> Token {
    Token::from(name)
}

fn sampled(value: impl Into<Value>) -> SampledHandle {
    Arc::new(RetainedSampled::new(value.into()))
}

fn network() -> ContainerHandle {
    let surface = MaterialNodeSchema::build_retained(
        Some(sampled(t("UsdPreviewSurface"))),
        Some(Arc::new(retained_container! {
            "roughness" => DataSource::Container(
                MaterialNodeParameterSchema::build_retained(Some(sampled(0.5)), None, None),
            ),
        })),
        Some(Arc::new(retained_container! {
            "diffuseColor" => DataSource::Vector(connection_vector([
                MaterialConnectionSchema::build_retained(t("Texture"), t("rgb")),
            ])),
        })),
        None,
    );
    let texture = MaterialNodeSchema::build_retained(
        Some(sampled(t("UsdUVTexture"))),
        Some(Arc::new(retained_container! {
            "file" => DataSource::Container(MaterialNodeParameterSchema::build_retained(
                Some(sampled(Value::AssetPath("wood.png".into()))),
                Some(sampled(t("sRGB"))),
                None,
            )),
        })),
        None,
        None,
    );
    let unresolved = MaterialNodeSchema::build_retained(
        None,
        None,
        None,
        Some(Arc::new(retained_container! {
            "implementationSource" => DataSource::retained(t("sourceAsset")),
            "glslfx:sourceAsset" => DataSource::retained(Value::AssetPath("noise.glslfx".into())),
        })),
    );

    MaterialNetworkSchema::build_retained(
        Some(Arc::new(retained_container! {
            "Surface" => DataSource::Container(surface),
            "Texture" => DataSource::Container(texture),
            "Noise" => DataSource::Container(unresolved),
        })),
        Some(Arc::new(retained_container! {
            "surface" => DataSource::Container(
                MaterialConnectionSchema::build_retained(t("Surface"), t("surface")),
            ),
        })),
        None,
        None,
    )
}

fn interface(network: ContainerHandle) -> DataSourceMaterialNetworkInterface {
    DataSourceMaterialNetworkInterface::new(ScenePath::new("/Looks/Wood").unwrap(), network, None)
}

struct FileNameRegistry;

impl ShaderRegistry for FileNameRegistry {
    fn node_from_asset(
        &self,
        asset: &str,
        _metadata: &ShaderMetadata,
        _sub_identifier: &Token,
        source_type: &Token,
    ) -> Option<ShaderNode> {
        let name = asset.strip_suffix(".glslfx")?;
        Some(ShaderNode::new(t(name), source_type.clone()))
    }

    fn node_from_source_code(
        &self,
        _source_code: &str,
        _source_type: &Token,
        _metadata: &ShaderMetadata,
    ) -> Option<ShaderNode> {
        None
    }
}

#[test]
fn unedited_network_passes_through() {
    let network = network();
    let interface = interface(network.clone());

    assert_eq!(interface.node_names(), vec![t("Surface"), t("Texture"), t("Noise")]);
    assert_eq!(
        interface.node_input_connection(&t("Surface"), &t("diffuseColor")),
        vec![InputConnection::new(t("Texture"), t("rgb"))]
    );
    assert_eq!(
        interface.node_parameter_data(&t("Texture"), &t("file")).color_space,
        t("sRGB")
    );
    assert_eq!(
        interface.terminal_connection(&t("surface")),
        Some(InputConnection::new(t("Surface"), t("surface")))
    );

    assert!(!interface.is_modified());
    assert!(Arc::ptr_eq(&interface.finish(), &network));
}

#[test]
fn replace_texture_with_constant() {
    let network = network();
    let mut interface = interface(network.clone());

    interface.set_node_parameter_value(&t("Surface"), &t("roughness"), Value::Double(0.25));
    interface.delete_node(&t("Texture"));
    interface.set_node_type(&t("Constant"), &t("ConstantColor"));
    interface.set_node_parameter_value(&t("Constant"), &t("color"), Value::Double(0.75));
    interface.set_node_input_connection(
        &t("Surface"),
        &t("diffuseColor"),
        &[InputConnection::new(t("Constant"), t("out"))],
    );
    // deleted nodes stay deleted
    interface.set_node_parameter_value(&t("Texture"), &t("file"), Value::AssetPath("oak.png".into()));

    assert_eq!(interface.node_names(), vec![t("Surface"), t("Noise"), t("Constant")]);
    assert_eq!(interface.node_type(&t("Texture")), t(""));
    assert_eq!(interface.node_parameter_value(&t("Texture"), &t("file")), None);
    assert_eq!(
        interface.node_parameter_value(&t("Surface"), &t("roughness")),
        Some(Value::Double(0.25))
    );

    let resolved = resolve_node_identifiers(&mut interface, &t("glslfx"), &FileNameRegistry);
    assert_eq!(resolved, 1);

    let patched = interface.finish();
    insta::assert_snapshot!(dump(&DataSource::Container(patched), 0.0), @r###"
    nodes/Surface/nodeIdentifier = UsdPreviewSurface
    nodes/Surface/parameters/roughness/value = 0.25
    nodes/Surface/inputConnections/diffuseColor/0/upstreamNodePath = Constant
    nodes/Surface/inputConnections/diffuseColor/0/upstreamNodeOutputName = out
    nodes/Noise/nodeTypeInfo/implementationSource = sourceAsset
    nodes/Noise/nodeTypeInfo/glslfx:sourceAsset = noise.glslfx
    nodes/Noise/nodeIdentifier = noise
    nodes/Constant/nodeIdentifier = ConstantColor
    nodes/Constant/parameters/color/value = 0.75
    terminals/surface/upstreamNodePath = Surface
    terminals/surface/upstreamNodeOutputName = surface
    "###);

    // the input network is left alone
    insta::assert_snapshot!(dump(&DataSource::Container(network), 0.0), @r###"
    nodes/Surface/nodeIdentifier = UsdPreviewSurface
    nodes/Surface/parameters/roughness/value = 0.5
    nodes/Surface/inputConnections/diffuseColor/0/upstreamNodePath = Texture
    nodes/Surface/inputConnections/diffuseColor/0/upstreamNodeOutputName = rgb
    nodes/Texture/nodeIdentifier = UsdUVTexture
    nodes/Texture/parameters/file/value = wood.png
    nodes/Texture/parameters/file/colorSpace = sRGB
    nodes/Noise/nodeTypeInfo/implementationSource = sourceAsset
    nodes/Noise/nodeTypeInfo/glslfx:sourceAsset = noise.glslfx
    terminals/surface/upstreamNodePath = Surface
    terminals/surface/upstreamNodeOutputName = surface
    "###);
}

#[test]
fn retarget_terminal() {
    let mut interface = interface(network());

    interface.delete_terminal(&t("surface"));
    interface.set_terminal_connection(&t("displacement"), &InputConnection::new(t("Noise"), t("out")));

    assert_eq!(interface.terminal_names(), vec![t("displacement")]);
    assert_eq!(interface.terminal_connection(&t("surface")), None);
    assert_eq!(
        interface.terminal_connection(&t("displacement")),
        Some(InputConnection::new(t("Noise"), t("out")))
    );
}
