//! # hd-datasource - lazily composed scene data
//!
//! For CLI usage see `hdds --help`.
//!
//! ## Introduction for developers
//!
//! Read this to understand how the pieces fit together.
//!
//! ### Data sources
//!
//! Scene data is a tree of [data_source::DataSource]s:
//! - a `container` has named children
//! - a `sampled` data source produces a [value::Value] for a (shutter) time
//! - a `vector` has ordered children
//! - a `block` marks a deleted location
//!
//! Nothing is computed up front. A container only knows how to produce a child when asked, so composing data
//! sources is cheap and the cost is paid by whoever reads.
//!
//! A location inside a tree is a [locator::Locator] (`xform/matrix`). Invalidation is expressed as a
//! [locator::LocatorSet]: "everything below any of these locations may have changed".
//!
//! ```
//! # use hd_datasource::{data_source::{get_at, typed_value, ContainerHandle, DataSource}, locator::Locator};
//! # use hd_datasource::retained_container;
//! # use std::sync::Arc;
//! let prim: ContainerHandle = Arc::new(retained_container! {
//!     "visibility" => DataSource::container(retained_container! {
//!         "visibility" => DataSource::retained(false),
//!     }),
//! });
//! let visible = get_at(&prim, &Locator::from(["visibility", "visibility"])).unwrap();
//! assert_eq!(typed_value::<bool>(&visible, 0.0), Some(false));
//! ```
//!
//! ### Producing data: mapped projection
//!
//! see [mapped::MappedDataSource]
//!
//! A scene object (anything implementing [mapped::SceneObject]) exposes attributes and relationships by name.
//! [mapped::PropertyMappings] describe where each property lands in the container tree:
//!
//! | **property** | **locator** |
//! |-------------------|---------------------------|
//! | `size` | `geometry/size` |
//! | `material:binding`| `material/binding` |
//!
//! The mappings are turned into a tree once and shared by every projected object.
//!
//! ### Composing down the hierarchy: flattening
//!
//! see [flatten::FlatteningCache]
//!
//! Some values are inherited: a prim's world transform is its parent's world transform combined with its own, its
//! visibility is inherited unless authored. A [flatten::FlattenedDataSourceProvider] computes one such container from
//! the prim's own input and the parent's flattened result. The cache memoizes flattened prims per path and drops them
//! again when told which locators changed.
//!
//! ### Editing: material networks
//!
//! see [material::DataSourceMaterialNetworkInterface]
//!
//! Shading filters read and write material networks (nodes, parameters, connections, terminals) through
//! [material::MaterialNetworkInterface]. The data source implementation never touches the network it was given.
//! Writes are recorded as overrides and reads consult them first. Once done, `finish` hands out the patched network,
//! sharing everything that was not edited. Generic edits by locator are provided by
//! [editor::ContainerDataSourceEditor].
//!
//! ### Scene files
//!
//! [scene::Scene] loads prims from `*.scene.yaml` / `*.scene.json` files. This is only used by the `hdds` tool and
//! tests.
//!
pub mod data_source;
pub mod editor;
pub mod flatten;
pub mod locator;
pub mod mapped;
pub mod material;
pub mod scene;
pub mod scene_path;
pub mod schema;
pub mod token;
pub mod value;
pub mod visit;
