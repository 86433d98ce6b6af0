//! scene descriptions: prim containers addressed by [ScenePath]
//!
//! A [Scene] is either assembled in code or loaded from `*.scene.yaml` / `*.scene.json` files:
//!
//! ```yaml
//! prims:
//!   /World:
//!     xform:
//!       translate: [1, 0, 0]
//!   /World/Lamp:
//!     xform:
//!       # 16 numbers, translation in the last four
//!       matrix: [2, 0, 0, 0,  0, 2, 0, 0,  0, 0, 2, 0,  0, 0, 0, 1]
//!       resetXformStack: true
//!     visibility: false
//!     attributes:
//!       intensity: 2.5
//! ```
//!
//! Each prim becomes a retained container with the children `xform`, `visibility` and `attributes`, where present.
//! Loading several files layers them: a prim defined again replaces the earlier definition.
use crate::{
    data_source::{ContainerHandle, DataSource, RetainedContainer, RetainedSampled},
    retained_container,
    scene_path::{ScenePath, ScenePathError},
    schema::{
        visibility::{VisibilitySchema, VISIBILITY},
        xform::{XformSchema, XFORM},
    },
    value::Value,
};
use glam::{DMat4, DVec3};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{path::Path, sync::Arc};

pub const ATTRIBUTES: &str = "attributes";

#[derive(Debug, Clone, Default)]
pub struct Scene {
    prims: IndexMap<ScenePath, ContainerHandle>,
}

impl Scene {
    pub fn insert(&mut self, path: ScenePath, prim: ContainerHandle) -> Option<ContainerHandle> {
        self.prims.insert(path, prim)
    }

    pub fn prim(&self, path: &ScenePath) -> Option<&ContainerHandle> {
        self.prims.get(path)
    }

    pub fn contains(&self, path: &ScenePath) -> bool {
        self.prims.contains_key(path)
    }

    /// Prim paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &ScenePath> {
        self.prims.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScenePath, &ContainerHandle)> {
        self.prims.iter()
    }

    /// Prims strictly below `path`
    pub fn descendants<'a>(&'a self, path: &'a ScenePath) -> impl Iterator<Item = &'a ScenePath> {
        self.prims
            .keys()
            .filter(move |candidate| *candidate != path && candidate.has_prefix(path))
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }
}

impl Scene {
    pub fn from_yaml_str(contents: &str) -> Result<Self, LoadError> {
        let mut scene = Scene::default();
        scene.insert_description(serde_yaml::from_str(contents)?)?;
        Ok(scene)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, LoadError> {
        let mut scene = Scene::default();
        scene.insert_description(serde_json::from_str(contents)?)?;
        Ok(scene)
    }

    /// Loads a single `.json` or `.yaml`/`.yml` file
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        let description = match file_path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&file_contents)?,
            _ => serde_yaml::from_str(&file_contents)?,
        };

        self.insert_description(description)
    }

    /// Loads all `*.scene.yaml` and `*.scene.json` files of a directory, in file name order
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_name = dir_entry.file_name().to_string_lossy().to_string();
            let is_scene_file = [".scene.yaml", ".scene.yml", ".scene.json"]
                .iter()
                .any(|suffix| file_name.ends_with(suffix));
            if is_scene_file {
                file_paths.push(dir_entry.path());
            }
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound);
        }

        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }

    fn insert_description(&mut self, description: SceneDescription) -> Result<(), LoadError> {
        for (path, prim) in description.prims {
            let path = ScenePath::new(&path).map_err(|source| LoadError::InvalidPath { path, source })?;
            let container = prim.into_container(&path)?;
            if self.insert(path.clone(), container).is_some() {
                tracing::debug!(%path, "prim redefined");
            }
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No files found in directory")]
    NoFilesFound,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse yaml file")]
    YamlParseFailed(#[from] serde_yaml::Error),
    #[error("Unable to parse json file")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error("Invalid prim path {path:?}")]
    InvalidPath {
        path: String,
        #[source]
        source: ScenePathError,
    },
    #[error("Matrix of prim {path} needs 16 elements, found {len}")]
    BadMatrix { path: ScenePath, len: usize },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDescription {
    #[serde(default)]
    prims: IndexMap<String, PrimDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PrimDescription {
    xform: Option<XformDescription>,
    visibility: Option<bool>,
    #[serde(default)]
    attributes: IndexMap<String, AttributeValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct XformDescription {
    matrix: Option<Vec<f64>>,
    translate: Option<[f64; 3]>,
    reset_xform_stack: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AttributeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<AttributeValue>),
    Dictionary(IndexMap<String, AttributeValue>),
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Bool(v) => Value::Bool(v),
            AttributeValue::Int(v) => Value::Int(v),
            AttributeValue::Double(v) => Value::Double(v),
            AttributeValue::String(v) => Value::String(v),
            AttributeValue::Array(v) => Value::Array(v.into_iter().map(Value::from).collect()),
            AttributeValue::Dictionary(v) => Value::Dictionary(
                v.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl XformDescription {
    /// `translate` is applied after `matrix`
    fn into_container(self, path: &ScenePath) -> Result<ContainerHandle, LoadError> {
        let matrix = match self.matrix {
            Some(elements) => {
                let elements: [f64; 16] = elements
                    .as_slice()
                    .try_into()
                    .map_err(|_| LoadError::BadMatrix {
                        path: path.clone(),
                        len: elements.len(),
                    })?;
                Some(DMat4::from_cols_array(&elements))
            }
            None => None,
        };

        let matrix = match (matrix, self.translate) {
            (matrix, Some(translate)) => Some(
                DMat4::from_translation(DVec3::from_array(translate))
                    * matrix.unwrap_or(DMat4::IDENTITY),
            ),
            (matrix, None) => matrix,
        };

        let mut builder = XformSchema::builder();
        if let Some(matrix) = matrix {
            builder = builder.matrix(Arc::new(RetainedSampled::new(Value::Matrix(matrix))));
        }
        if let Some(reset) = self.reset_xform_stack {
            builder = builder.reset_xform_stack(Arc::new(RetainedSampled::new(Value::Bool(reset))));
        }
        Ok(builder.build())
    }
}

impl PrimDescription {
    fn into_container(self, path: &ScenePath) -> Result<ContainerHandle, LoadError> {
        let xform = self
            .xform
            .map(|xform| xform.into_container(path))
            .transpose()?;

        let visibility = self.visibility.map(|visible| {
            VisibilitySchema::build_retained(Some(Arc::new(RetainedSampled::new(Value::Bool(visible)))))
        });

        let attributes = (!self.attributes.is_empty()).then(|| {
            DataSource::container(RetainedContainer::from_entries(
                self.attributes
                    .into_iter()
                    .map(|(name, value)| (name.into(), Some(DataSource::retained(Value::from(value))))),
            ))
        });

        Ok(Arc::new(retained_container! {
            XFORM => xform.map(DataSource::Container),
            VISIBILITY => visibility.map(DataSource::Container),
            ATTRIBUTES => attributes,
        }))
    }
}
