//! containers projecting the properties of an external object
//!
//! [PropertyMappings] declares where each attribute or relationship of a [SceneObject] appears inside a (nested)
//! container. The mappings are organized once, at construction, into
//! - a flat list of `(property name, absolute locator)` used by [PropertyMappings::invalidate]
//! - a tree mirroring the nested locators, stored as an arena of nodes. Each node holds its child names sorted
//!   lexicographically and, in a parallel list, what to serve for each name.
//!
//! The tree is immutable after construction and shared by every [MappedDataSource] built from the same mappings.
//! A nested container is just another [MappedDataSource] pointing at a different arena node.
//!
//! **Example**
//!
//! | property | locator (prefix `material`) | arena |
//! |---|---|---|
//! | `inputs:roughness` | `parameters/roughness` | node 0: `parameters -> node 1` |
//! | `inputs:opacity` | `parameters/opacity` | node 1: `opacity -> attr`, `roughness -> attr` |
//!
//! Invalidating `inputs:opacity` yields `{material/parameters/opacity}`.
mod object;

pub use object::{Attribute, RetainedSceneObject, SceneObject};

use crate::{
    data_source::{ContainerDataSource, DataSource, TimeSampled},
    locator::{Locator, LocatorSet},
    scene_path::ScenePath,
    token::Token,
    value::Value,
};
use std::sync::Arc;

/// Where a factory's result ends up
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    /// path of the scene object as seen by the consumer
    pub scene_path: &'a ScenePath,
    /// absolute locator of the data source being created
    pub locator: &'a Locator,
}

pub type AttributeFactory =
    Arc<dyn Fn(&Attribute, &MappingContext<'_>) -> Option<DataSource> + Send + Sync>;

pub type RelationshipFactory =
    Arc<dyn Fn(&[ScenePath], &MappingContext<'_>) -> Option<DataSource> + Send + Sync>;

#[derive(Clone)]
pub struct AttributeMapping {
    pub name: Token,
    /// relative to the mapped container, must not be empty
    pub locator: Locator,
    /// `None` is a configuration error reported on access
    pub factory: Option<AttributeFactory>,
}

impl AttributeMapping {
    /// Mapping using [default_attribute_factory]
    pub fn new(name: impl Into<Token>, locator: Locator) -> Self {
        Self {
            name: name.into(),
            locator,
            factory: Some(default_attribute_factory()),
        }
    }

    pub fn with_factory(mut self, factory: AttributeFactory) -> Self {
        self.factory = Some(factory);
        self
    }
}

#[derive(Clone)]
pub struct RelationshipMapping {
    pub name: Token,
    pub locator: Locator,
    pub factory: Option<RelationshipFactory>,
}

impl RelationshipMapping {
    pub fn new(name: impl Into<Token>, locator: Locator, factory: RelationshipFactory) -> Self {
        Self {
            name: name.into(),
            locator,
            factory: Some(factory),
        }
    }
}

#[derive(Clone)]
pub enum PropertyMapping {
    Attribute(AttributeMapping),
    Relationship(RelationshipMapping),
}

impl PropertyMapping {
    pub fn name(&self) -> &Token {
        match self {
            PropertyMapping::Attribute(m) => &m.name,
            PropertyMapping::Relationship(m) => &m.name,
        }
    }

    pub fn locator(&self) -> &Locator {
        match self {
            PropertyMapping::Attribute(m) => &m.locator,
            PropertyMapping::Relationship(m) => &m.locator,
        }
    }

    fn with_locator(&self, locator: Locator) -> Self {
        match self {
            PropertyMapping::Attribute(m) => PropertyMapping::Attribute(AttributeMapping {
                locator,
                ..m.clone()
            }),
            PropertyMapping::Relationship(m) => PropertyMapping::Relationship(RelationshipMapping {
                locator,
                ..m.clone()
            }),
        }
    }
}

impl std::fmt::Debug for PropertyMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            PropertyMapping::Attribute(_) => "Attribute",
            PropertyMapping::Relationship(_) => "Relationship",
        };
        write!(f, "{kind}({} -> {})", self.name(), self.locator())
    }
}

impl From<AttributeMapping> for PropertyMapping {
    fn from(value: AttributeMapping) -> Self {
        PropertyMapping::Attribute(value)
    }
}

impl From<RelationshipMapping> for PropertyMapping {
    fn from(value: RelationshipMapping) -> Self {
        PropertyMapping::Relationship(value)
    }
}

fn wrap_attribute(attribute: &Attribute, ctx: &MappingContext<'_>) -> Option<DataSource> {
    match attribute {
        Attribute::Constant(value) => Some(DataSource::retained(value.clone())),
        Attribute::TimeSampled(samples) => match TimeSampled::new(samples.clone()) {
            Some(sampled) => Some(DataSource::sampled(sampled)),
            None => {
                tracing::warn!(path=%ctx.scene_path, locator=%ctx.locator, "attribute has no samples");
                None
            }
        },
    }
}

fn first_target(targets: &[ScenePath], _ctx: &MappingContext<'_>) -> Option<DataSource> {
    targets
        .first()
        .map(|target| DataSource::retained(Value::Path(target.clone())))
}

fn all_targets(targets: &[ScenePath], _ctx: &MappingContext<'_>) -> Option<DataSource> {
    Some(DataSource::retained(Value::PathArray(targets.to_vec())))
}

/// Wraps a constant attribute as a constant data source and a time sampled one as [TimeSampled]
pub fn default_attribute_factory() -> AttributeFactory {
    Arc::new(wrap_attribute)
}

/// First forwarded target as a path, absent if there are no targets
pub fn path_from_relationship() -> RelationshipFactory {
    Arc::new(first_target)
}

/// All forwarded targets as a path array, possibly empty
pub fn path_array_from_relationship() -> RelationshipFactory {
    Arc::new(all_targets)
}

#[derive(Debug, PartialEq)]
pub enum MappingIssue {
    /// mappings need a non-trivial locator
    EmptyLocator { name: Token },
    /// the locator passes through or ends at a location already serving another property
    LocatorOccupied { name: Token, locator: Locator, existing: Token },
    /// the locator ends at a location that already holds nested mappings
    ContainerOccupied { name: Token, locator: Locator },
}

/// What to serve for a name within a node of the [MappingTree]
#[derive(Clone)]
enum DataSourceInfo {
    /// locator of the mapping is absolute
    Property(PropertyMapping),
    /// index of the nested node
    Container(usize),
}

#[derive(Default, Clone)]
struct ContainerMappings {
    /// sorted lexicographically
    names: Vec<Token>,
    /// parallel to `names`
    infos: Vec<DataSourceInfo>,
}

impl ContainerMappings {
    fn find(&self, name: &Token) -> Result<usize, usize> {
        self.names.binary_search(name)
    }
}

/// Arena of container nodes, node 0 is the root
struct MappingTree {
    nodes: Vec<ContainerMappings>,
}

impl MappingTree {
    fn new() -> Self {
        Self {
            nodes: vec![Default::default()],
        }
    }

    /// Index of the nested node `name` below `parent`, created if missing
    fn find_or_create_child(&mut self, parent: usize, name: &Token) -> Result<usize, Token> {
        match self.nodes[parent].find(name) {
            Ok(index) => match &self.nodes[parent].infos[index] {
                DataSourceInfo::Container(child) => Ok(*child),
                DataSourceInfo::Property(existing) => Err(existing.name().clone()),
            },
            Err(index) => {
                let child = self.nodes.len();
                self.nodes.push(Default::default());

                let node = &mut self.nodes[parent];
                node.names.insert(index, name.clone());
                node.infos.insert(index, DataSourceInfo::Container(child));
                Ok(child)
            }
        }
    }

    /// Adds `mapping` at `relative` (non-empty)
    fn add(&mut self, relative: &Locator, mapping: PropertyMapping) -> Result<(), MappingIssue> {
        let Some((leaf_name, path)) = relative.elements().split_last() else {
            return Err(MappingIssue::EmptyLocator {
                name: mapping.name().clone(),
            });
        };

        let mut node = 0;
        for name in path {
            node = self.find_or_create_child(node, name).map_err(|existing| {
                MappingIssue::LocatorOccupied {
                    name: mapping.name().clone(),
                    locator: relative.clone(),
                    existing,
                }
            })?;
        }

        let container = &mut self.nodes[node];
        match container.find(leaf_name) {
            Ok(index) => Err(match &container.infos[index] {
                DataSourceInfo::Property(existing) => MappingIssue::LocatorOccupied {
                    name: mapping.name().clone(),
                    locator: relative.clone(),
                    existing: existing.name().clone(),
                },
                DataSourceInfo::Container(_) => MappingIssue::ContainerOccupied {
                    name: mapping.name().clone(),
                    locator: relative.clone(),
                },
            }),
            Err(index) => {
                container.names.insert(index, leaf_name.clone());
                container
                    .infos
                    .insert(index, DataSourceInfo::Property(mapping));
                Ok(())
            }
        }
    }
}

/// Mappings for one kind of [MappedDataSource], built once and shared
pub struct PropertyMappings {
    /// flat list with absolute locators for invalidation
    absolute: Vec<(Token, Locator)>,
    tree: Arc<MappingTree>,
    issues: Vec<MappingIssue>,
}

impl PropertyMappings {
    /// `prefix` is the location of the mapped container within the consumer's (prim) container
    ///
    /// Invalid mappings are reported, skipped, and do not stop the construction.
    #[tracing::instrument(level = "trace", skip_all, fields(%prefix))]
    pub fn new(mappings: &[PropertyMapping], prefix: &Locator) -> Self {
        let mut tree = MappingTree::new();
        let mut absolute = Vec::with_capacity(mappings.len());
        let mut issues = vec![];

        for mapping in mappings {
            let locator = prefix.append_locator(mapping.locator());
            match tree.add(mapping.locator(), mapping.with_locator(locator.clone())) {
                Ok(()) => {
                    tracing::trace!(name=%mapping.name(), %locator, "mapping added");
                    absolute.push((mapping.name().clone(), locator));
                }
                Err(issue) => {
                    tracing::error!(?issue, "invalid property mapping skipped");
                    issues.push(issue);
                }
            }
        }

        Self {
            absolute,
            tree: Arc::new(tree),
            issues,
        }
    }

    /// Problems found during construction
    pub fn issues(&self) -> &[MappingIssue] {
        &self.issues
    }

    /// Absolute locators of the data sources serving any of `names`
    ///
    /// Names without a mapping contribute nothing.
    pub fn invalidate(&self, names: &[Token]) -> LocatorSet {
        let mut locators = LocatorSet::new();
        for name in names {
            for (mapped_name, locator) in &self.absolute {
                if mapped_name == name {
                    locators.insert(locator.clone());
                }
            }
        }
        locators
    }
}

impl std::fmt::Debug for PropertyMappings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMappings")
            .field("absolute", &self.absolute)
            .field("issues", &self.issues)
            .finish()
    }
}

/// Container serving the properties of a [SceneObject] according to [PropertyMappings]
///
/// Holds a shared reference to the object and to the mapping tree, so nested containers are cheap to hand out.
#[derive(Clone)]
pub struct MappedDataSource {
    object: Arc<dyn SceneObject>,
    scene_path: ScenePath,
    tree: Arc<MappingTree>,
    node: usize,
}

impl MappedDataSource {
    /// The scene path defaults to the object's own path
    pub fn new(object: Arc<dyn SceneObject>, mappings: &PropertyMappings) -> Self {
        let scene_path = object.path().clone();
        Self::with_scene_path(object, scene_path, mappings)
    }

    pub fn with_scene_path(
        object: Arc<dyn SceneObject>,
        scene_path: ScenePath,
        mappings: &PropertyMappings,
    ) -> Self {
        Self {
            object,
            scene_path,
            tree: mappings.tree.clone(),
            node: 0,
        }
    }

    /// See [PropertyMappings::invalidate]
    pub fn invalidate(names: &[Token], mappings: &PropertyMappings) -> LocatorSet {
        mappings.invalidate(names)
    }

    fn node(&self) -> &ContainerMappings {
        &self.tree.nodes[self.node]
    }

    fn serve(&self, mapping: &PropertyMapping) -> Option<DataSource> {
        let ctx = MappingContext {
            scene_path: &self.scene_path,
            locator: mapping.locator(),
        };

        match mapping {
            PropertyMapping::Attribute(m) => {
                let Some(attribute) = self.object.attribute(&m.name) else {
                    tracing::error!(
                        attribute=%m.name, path=%self.object.path(), locator=%m.locator,
                        "expected attribute to serve data source"
                    );
                    return None;
                };
                let Some(factory) = &m.factory else {
                    tracing::error!(
                        attribute=%m.name, path=%self.object.path(), locator=%m.locator,
                        "no factory to convert attribute"
                    );
                    return None;
                };
                factory(&attribute, &ctx)
            }
            PropertyMapping::Relationship(m) => {
                let Some(targets) = self.object.relationship_targets(&m.name) else {
                    tracing::error!(
                        relationship=%m.name, path=%self.object.path(), locator=%m.locator,
                        "expected relationship to serve data source"
                    );
                    return None;
                };
                let Some(factory) = &m.factory else {
                    tracing::error!(
                        relationship=%m.name, path=%self.object.path(), locator=%m.locator,
                        "no factory to convert relationship"
                    );
                    return None;
                };
                factory(&targets, &ctx)
            }
        }
    }
}

impl ContainerDataSource for MappedDataSource {
    fn names(&self) -> Vec<Token> {
        self.node().names.clone()
    }

    fn get(&self, name: &Token) -> Option<DataSource> {
        let index = self.node().find(name).ok()?;

        match &self.node().infos[index] {
            DataSourceInfo::Property(mapping) => self.serve(mapping),
            DataSourceInfo::Container(child) => Some(DataSource::Container(Arc::new(Self {
                node: *child,
                ..self.clone()
            }))),
        }
    }
}

impl std::fmt::Debug for MappedDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedDataSource")
            .field("object", &self.object.path())
            .field("names", &self.node().names)
            .finish()
    }
}
