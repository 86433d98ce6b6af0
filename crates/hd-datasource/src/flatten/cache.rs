use super::{
    FlattenContext, FlattenedDataSourceProvider, FlattenedVisibilityProvider, FlattenedXformProvider,
};
use crate::{
    data_source::{get_container, ContainerHandle, DataSource},
    editor::ContainerDataSourceEditor,
    locator::{Locator, LocatorSet},
    scene::Scene,
    scene_path::ScenePath,
    schema::{visibility::VISIBILITY, xform::XFORM, Schema},
    token::Token,
};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Providers by the name of the prim child container they flatten
pub type Providers = indexmap::IndexMap<Token, Arc<dyn FlattenedDataSourceProvider>>;

/// Flattened prims of a [Scene], memoized per path
///
/// A flattened prim is the scene's prim container with every provider's child replaced by its flattened form. Prims
/// missing from the scene still take part in flattening as empty ancestors.
///
/// Lookups may run concurrently; a prim computed twice by racing readers keeps the first stored result.
#[derive(Debug)]
pub struct FlatteningCache {
    scene: Scene,
    providers: Providers,
    flattened: RwLock<HashMap<ScenePath, ContainerHandle>>,
}

impl FlatteningCache {
    pub fn new(scene: Scene, providers: Providers) -> Self {
        Self {
            scene,
            providers,
            flattened: Default::default(),
        }
    }

    /// Flattens `xform` and `visibility`
    pub fn with_default_providers(scene: Scene) -> Self {
        let mut providers = Providers::new();
        providers.insert(XFORM.into(), Arc::new(FlattenedXformProvider));
        providers.insert(VISIBILITY.into(), Arc::new(FlattenedVisibilityProvider));
        Self::new(scene, providers)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Flattened prim at `path`, `None` if the scene has no such prim
    pub fn prim(&self, path: &ScenePath) -> Option<ContainerHandle> {
        if !self.scene.contains(path) {
            return None;
        }
        Some(self.flattened(path))
    }

    fn flattened(&self, path: &ScenePath) -> ContainerHandle {
        if let Some(cached) = self.flattened.read().get(path) {
            return cached.clone();
        }

        let parent = path.parent().map(|parent| self.flattened(&parent));
        let input = self.scene.prim(path);

        let mut editor = ContainerDataSourceEditor::new(input.cloned());
        for (name, provider) in &self.providers {
            let ctx = FlattenContext::new(
                path,
                Schema::child_of(input, name).container().cloned(),
                parent.as_ref().and_then(|parent| get_container(parent, name)),
            );
            let flattened = provider.flattened_data_source(&ctx);
            editor.set(&Locator::from([name.clone()]), flattened.map(DataSource::Container));
        }
        let flattened = editor.finish();
        tracing::trace!(%path, "flattened prim");

        self.flattened
            .write()
            .entry(path.clone())
            .or_insert(flattened)
            .clone()
    }

    /// Drops what `locators` (relative to the prim container) invalidates
    ///
    /// Returns the locators dirtied on every descendant of `path`. Whenever that set is not empty the cached
    /// descendants are dropped as well.
    #[tracing::instrument(level = "trace", skip_all, fields(%path, %locators))]
    pub fn dirty(&self, path: &ScenePath, locators: &LocatorSet) -> LocatorSet {
        let mut descendants = LocatorSet::new();
        for (name, provider) in &self.providers {
            let prefix = Locator::from([name.clone()]);
            if !locators.intersects(&prefix) {
                continue;
            }

            let mut relative = locators
                .intersection(&prefix)
                .replace_prefix(&prefix, &Locator::empty());
            provider.compute_dirty_locators_for_descendants(&mut relative);
            descendants.insert_set(&relative.replace_prefix(&Locator::empty(), &prefix));
        }

        let mut flattened = self.flattened.write();
        flattened.remove(path);
        if !descendants.is_empty() {
            flattened.retain(|candidate, _| !candidate.has_prefix(path));
            tracing::debug!(%path, %descendants, "descendants dirtied");
        }

        descendants
    }

    /// Replaces the prim at `path`, see [FlatteningCache::dirty] for `locators` and the result
    pub fn update_prim(&mut self, path: ScenePath, prim: ContainerHandle, locators: &LocatorSet) -> LocatorSet {
        self.scene.insert(path.clone(), prim);
        self.dirty(&path, locators)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        data_source::{get_at, typed_value},
        schema::xform::XformSchema,
    };
    use glam::{DMat4, DVec3};
    use pretty_assertions::assert_eq;

    const SCENE: &str = r#"
prims:
  /Root:
    xform:
      matrix: [1, 0, 0, 0,  0, 1, 0, 0,  0, 0, 1, 0,  0, 0, 0, 1]
      resetXformStack: true
    visibility: false
  /Root/Child:
    xform:
      translate: [1, 0, 0]
    attributes:
      size: 2
  /Root/Child/Leaf:
    xform:
      translate: [0, 2, 0]
    visibility: true
  /Other:
    attributes:
      size: 3
"#;

    fn path(s: &str) -> ScenePath {
        ScenePath::new(s).unwrap()
    }

    fn matrix_at(cache: &FlatteningCache, prim: &str) -> Option<DMat4> {
        let prim = cache.prim(&path(prim))?;
        typed_value(&get_at(&prim, &Locator::from(["xform", "matrix"]))?, 0.0)
    }

    fn visibility_at(cache: &FlatteningCache, prim: &str) -> Option<bool> {
        let prim = cache.prim(&path(prim))?;
        typed_value(&get_at(&prim, &Locator::from(["visibility", "visibility"]))?, 0.0)
    }

    fn cache() -> FlatteningCache {
        FlatteningCache::with_default_providers(Scene::from_yaml_str(SCENE).unwrap())
    }

    #[test]
    fn flattens_down_the_hierarchy() {
        let cache = cache();

        assert_eq!(matrix_at(&cache, "/Root"), Some(DMat4::IDENTITY));
        assert_eq!(
            matrix_at(&cache, "/Root/Child"),
            Some(DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0)))
        );
        assert_eq!(
            matrix_at(&cache, "/Root/Child/Leaf"),
            Some(DMat4::from_translation(DVec3::new(1.0, 2.0, 0.0)))
        );
        assert_eq!(matrix_at(&cache, "/Other"), Some(DMat4::IDENTITY));
        assert_eq!(matrix_at(&cache, "/Missing"), None);

        assert_eq!(visibility_at(&cache, "/Root/Child"), Some(false));
        assert_eq!(visibility_at(&cache, "/Root/Child/Leaf"), Some(true));
        assert_eq!(visibility_at(&cache, "/Other"), None);
    }

    #[test]
    fn unflattened_children_are_kept() {
        let cache = cache();
        let child = cache.prim(&path("/Root/Child")).unwrap();

        let size = get_at(&child, &Locator::from(["attributes", "size"])).unwrap();
        assert_eq!(typed_value::<i64>(&size, 0.0), Some(2));
        assert!(child.get(&"visibility".into()).is_some());
    }

    #[test]
    fn memoized() {
        let cache = cache();
        let first = cache.prim(&path("/Root/Child")).unwrap();
        let second = cache.prim(&path("/Root/Child")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn dirty_transform_dirties_descendants() {
        let cache = cache();
        let child = cache.prim(&path("/Root/Child")).unwrap();
        let other = cache.prim(&path("/Other")).unwrap();

        let descendants = cache.dirty(
            &path("/Root"),
            &[Locator::from(["xform", "matrix"])].into_iter().collect(),
        );

        assert_eq!(descendants, [Locator::from(["xform"])].into_iter().collect());
        assert!(!Arc::ptr_eq(&child, &cache.prim(&path("/Root/Child")).unwrap()));
        assert!(Arc::ptr_eq(&other, &cache.prim(&path("/Other")).unwrap()));
    }

    #[test]
    fn dirty_attribute_stays_local() {
        let cache = cache();
        let root = cache.prim(&path("/Root")).unwrap();
        let child = cache.prim(&path("/Root/Child")).unwrap();

        let descendants = cache.dirty(
            &path("/Root"),
            &[Locator::from(["attributes", "size"])].into_iter().collect(),
        );

        assert!(descendants.is_empty());
        assert!(!Arc::ptr_eq(&root, &cache.prim(&path("/Root")).unwrap()));
        assert!(Arc::ptr_eq(&child, &cache.prim(&path("/Root/Child")).unwrap()));
    }

    #[test]
    fn universal_dirty_covers_every_provider() {
        let cache = cache();
        let descendants = cache.dirty(&path("/Root"), &LocatorSet::universal_set());
        assert_eq!(
            descendants,
            [Locator::from(["visibility"]), Locator::from(["xform"])]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn update_prim_recomputes() {
        let mut cache = cache();
        assert_eq!(
            matrix_at(&cache, "/Root/Child/Leaf"),
            Some(DMat4::from_translation(DVec3::new(1.0, 2.0, 0.0)))
        );

        let moved = Arc::new(crate::retained_container! {
            XFORM => DataSource::Container(
                XformSchema::builder()
                    .matrix(Arc::new(crate::data_source::RetainedSampled::new(
                        DMat4::from_translation(DVec3::new(3.0, 0.0, 0.0)).into(),
                    )))
                    .build(),
            ),
        });
        cache.update_prim(path("/Root/Child"), moved, &LocatorSet::universal_set());

        assert_eq!(
            matrix_at(&cache, "/Root/Child/Leaf"),
            Some(DMat4::from_translation(DVec3::new(3.0, 2.0, 0.0)))
        );
    }

    #[test]
    fn concurrent_lookups_agree() {
        let cache = cache();
        let leaf = path("/Root/Child/Leaf");

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| cache.prim(&leaf).unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        for result in &results {
            assert!(Arc::ptr_eq(result, &results[0]));
        }
    }
}
