//! Snapshot tests
//!
//! Loads the scene files in /tests/fixtures/ and compares the text dump of flattened prims.

use hd_datasource::{
    data_source::DataSource,
    flatten::FlatteningCache,
    locator::{Locator, LocatorSet},
    scene::Scene,
    scene_path::ScenePath,
    visit::dump,
};
use std::path::Path;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HDDS_LOG"))
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(fixture: &str) -> Scene {
    init_logging();
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture);
    let mut scene = Scene::default();
    scene.load_file(&path).expect("valid scene file");
    scene
}

fn path(s: &str) -> ScenePath {
    ScenePath::new(s).unwrap()
}

/// Every prim of the cache, flattened and dumped below its path
fn render(cache: &FlatteningCache) -> String {
    let mut out = String::new();
    for prim_path in cache.scene().paths() {
        let prim = cache.prim(prim_path).unwrap();
        out.push_str(&format!("{prim_path}\n"));
        for line in dump(&DataSource::Container(prim), 0.0).lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

#[test]
fn every_fixture_flattens() {
    insta::glob!("fixtures/*.scene.*", |fixture| {
        init_logging();
        let mut scene = Scene::default();
        scene.load_file(fixture).unwrap();
        let cache = FlatteningCache::with_default_providers(scene);

        for prim_path in cache.scene().paths() {
            let prim = cache.prim(prim_path).unwrap();
            assert!(
                prim.get(&"xform".into()).is_some(),
                "{prim_path} of {} has no flattened transform",
                fixture.display()
            );
        }
    });
}

#[test]
fn lamp() {
    let cache = FlatteningCache::with_default_providers(load("lamp.scene.yaml"));

    insta::assert_snapshot!(render(&cache), @r###"
    /World
      xform/matrix = ((1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (1, 0, 0, 1))
      xform/resetXformStack = true
    /World/Lamp
      xform/matrix = ((1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (1, 2, 0, 1))
      xform/resetXformStack = true
      visibility/visibility = false
      attributes/intensity = 2.5
      attributes/kind = light
    /World/Lamp/Bulb
      attributes/on = true
      xform/matrix = ((1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (1, 2, 0, 1))
      xform/resetXformStack = true
      visibility/visibility = false
    /World/Rig
      xform/matrix = ((1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (0, 0, 5, 1))
      xform/resetXformStack = true
    "###);
}

#[test]
fn scaled() {
    let cache = FlatteningCache::with_default_providers(load("scaled.scene.json"));

    insta::assert_snapshot!(render(&cache), @r###"
    /Stage
      xform/matrix = ((2, 0, 0, 0), (0, 2, 0, 0), (0, 0, 2, 0), (3, 0, 0, 1))
      xform/resetXformStack = true
      visibility/visibility = true
    /Stage/Prop
      xform/matrix = ((2, 0, 0, 0), (0, 2, 0, 0), (0, 0, 2, 0), (5, 2, 2, 1))
      xform/resetXformStack = true
      attributes/tags = [a, b]
      visibility/visibility = true
    "###);
}

#[test]
fn moving_a_parent_moves_descendants() {
    let mut cache = FlatteningCache::with_default_providers(load("lamp.scene.yaml"));
    let bulb = cache.prim(&path("/World/Lamp/Bulb")).unwrap();
    let rig = cache.prim(&path("/World/Rig")).unwrap();

    let moved = Scene::from_yaml_str(
        r#"
prims:
  /World:
    xform:
      translate: [4, 0, 0]
"#,
    )
    .unwrap();
    let world = moved.prim(&path("/World")).unwrap().clone();

    let dirtied: LocatorSet = [Locator::from(["xform"])].into_iter().collect();
    let descendants = cache.update_prim(path("/World"), world, &dirtied);
    assert_eq!(descendants.to_string(), "{/xform}");

    let moved_bulb = cache.prim(&path("/World/Lamp/Bulb")).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&bulb, &moved_bulb));
    insta::assert_snapshot!(dump(&DataSource::Container(moved_bulb), 0.0), @r###"
    attributes/on = true
    xform/matrix = ((1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (4, 2, 0, 1))
    xform/resetXformStack = true
    visibility/visibility = false
    "###);

    // reset xform stack, but the cached entry is dropped regardless
    let moved_rig = cache.prim(&path("/World/Rig")).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&rig, &moved_rig));
}
