//! absolute paths of scene objects (`/World/Looks/Mat`)
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenePath(Arc<str>);

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScenePathError {
    #[error("scene path `{0}` must start with `/`")]
    NotAbsolute(String),
    #[error("scene path `{0}` contains an empty element")]
    EmptyElement(String),
    #[error("child name `{0}` must be a single non-empty element")]
    InvalidChildName(String),
}

impl ScenePath {
    pub fn new(path: &str) -> Result<Self, ScenePathError> {
        if !path.starts_with('/') {
            return Err(ScenePathError::NotAbsolute(path.to_string()));
        }

        if path == "/" {
            return Ok(Self::root());
        }

        if path[1..].split('/').any(str::is_empty) {
            return Err(ScenePathError::EmptyElement(path.to_string()));
        }

        Ok(Self(Arc::from(path)))
    }

    pub fn root() -> Self {
        Self(Arc::from("/"))
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last element, empty for the root
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn parent(&self) -> Option<ScenePath> {
        if self.is_root() {
            return None;
        }

        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(Arc::from(&self.0[..idx]))),
        }
    }

    /// `name` must be a single, non-empty element
    pub fn append_child(&self, name: &str) -> Result<ScenePath, ScenePathError> {
        if name.is_empty() || name.contains('/') {
            return Err(ScenePathError::InvalidChildName(name.to_string()));
        }

        if self.is_root() {
            Ok(Self(Arc::from(format!("/{name}"))))
        } else {
            Ok(Self(Arc::from(format!("{}/{name}", self.0))))
        }
    }

    /// `true` if `prefix` is this path or one of its ancestors
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if prefix.is_root() {
            return true;
        }

        match self.0.strip_prefix(&*prefix.0) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Number of elements, zero for the root
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('/').count()
        }
    }
}

impl std::str::FromStr for ScenePath {
    type Err = ScenePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenePath::new(s)
    }
}

impl std::fmt::Display for ScenePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl serde::Serialize for ScenePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
