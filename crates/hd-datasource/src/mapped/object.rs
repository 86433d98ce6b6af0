//! the external objects a [super::MappedDataSource] reads from
use crate::{data_source::Time, scene_path::ScenePath, token::Token, value::Value};

/// Scene graph object exposing named attributes and relationships
pub trait SceneObject: Send + Sync + std::fmt::Debug {
    fn path(&self) -> &ScenePath;

    fn attribute(&self, name: &Token) -> Option<Attribute>;

    /// Forwarded targets of the relationship `name`, `None` if there is no such relationship
    fn relationship_targets(&self, name: &Token) -> Option<Vec<ScenePath>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Constant(Value),
    TimeSampled(Vec<(Time, Value)>),
}

/// In-memory [SceneObject]
#[derive(Debug, Clone, derive_new::new)]
pub struct RetainedSceneObject {
    path: ScenePath,
    #[new(default)]
    attributes: indexmap::IndexMap<Token, Attribute>,
    #[new(default)]
    relationships: indexmap::IndexMap<Token, Vec<ScenePath>>,
}

impl RetainedSceneObject {
    pub fn with_attribute(mut self, name: impl Into<Token>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn with_relationship(mut self, name: impl Into<Token>, targets: Vec<ScenePath>) -> Self {
        self.relationships.insert(name.into(), targets);
        self
    }
}

impl SceneObject for RetainedSceneObject {
    fn path(&self) -> &ScenePath {
        &self.path
    }

    fn attribute(&self, name: &Token) -> Option<Attribute> {
        self.attributes.get(name).cloned()
    }

    fn relationship_targets(&self, name: &Token) -> Option<Vec<ScenePath>> {
        self.relationships.get(name).cloned()
    }
}
