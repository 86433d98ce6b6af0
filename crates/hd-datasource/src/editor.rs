//! non-destructive edits layered over an immutable container
//!
//! [ContainerDataSourceEditor] records replacements and deletions by [Locator]. Nothing is copied from the base
//! container: [ContainerDataSourceEditor::finish] returns a lazily evaluated container that consults the recorded
//! edits first and falls through to the base everywhere else.
//!
//! Edit nodes are shared copy-on-write, so a finished container is a snapshot and later edits do not leak into it.
use crate::{
    data_source::{ContainerDataSource, ContainerHandle, DataSource, RetainedContainer},
    locator::Locator,
    token::Token,
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ContainerDataSourceEditor {
    base: Option<ContainerHandle>,
    root: Arc<EditNode>,
    edited: bool,
}

#[derive(Debug, Clone, Default)]
struct EditNode {
    entry: Entry,
    children: indexmap::IndexMap<Token, Arc<EditNode>>,
}

#[derive(Debug, Clone, Default)]
enum Entry {
    /// keep the underlying value, possibly with edits to its children
    #[default]
    Inherit,
    /// replace the underlying value
    Replace(DataSource),
    /// remove the underlying value
    Delete,
}

impl ContainerDataSourceEditor {
    pub fn new(base: Option<ContainerHandle>) -> Self {
        Self {
            base,
            root: Default::default(),
            edited: false,
        }
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Replace the value at `locator`, or delete it when `value` is `None` or a [DataSource::Block]
    ///
    /// Edits previously recorded below `locator` are discarded. Setting beneath a deleted or non-container location
    /// puts an empty container there first. The empty locator addresses the whole container, replacing it needs a
    /// container value.
    pub fn set(&mut self, locator: &Locator, value: Option<DataSource>) -> &mut Self {
        let entry = match value {
            None | Some(DataSource::Block) => Entry::Delete,
            Some(value) => Entry::Replace(value),
        };

        if locator.is_empty() && !matches!(entry, Entry::Replace(DataSource::Container(_))) {
            tracing::error!("only a container can replace the root of an edited container");
            return self;
        }

        tracing::trace!(%locator, ?entry, "edit");
        self.edited = true;

        let mut node = Arc::make_mut(&mut self.root);
        for name in locator.elements() {
            node.materialize_container();
            node = Arc::make_mut(node.children.entry(name.clone()).or_default());
        }

        node.entry = entry;
        node.children.clear();
        self
    }

    /// The edited container; the base itself when nothing was edited
    ///
    /// Without a base and without edits the result is an empty container.
    pub fn finish(&self) -> ContainerHandle {
        if !self.edited {
            if let Some(base) = &self.base {
                return base.clone();
            }
            return Arc::new(RetainedContainer::empty());
        }

        let base = match &self.root.entry {
            Entry::Replace(DataSource::Container(c)) => Some(c.clone()),
            _ => self.base.clone(),
        };

        Arc::new(EditedContainer {
            base,
            node: self.root.clone(),
        })
    }
}

impl EditNode {
    /// `true` if some location below holds a replacement
    fn has_replacement(&self) -> bool {
        self.children
            .values()
            .any(|child| matches!(child.entry, Entry::Replace(_)) || child.has_replacement())
    }

    /// Makes sure children can be layered onto this location
    fn materialize_container(&mut self) {
        match &self.entry {
            Entry::Inherit | Entry::Replace(DataSource::Container(_)) => {}
            Entry::Delete | Entry::Replace(_) => {
                self.entry = Entry::Replace(DataSource::Container(Arc::new(
                    RetainedContainer::empty(),
                )));
            }
        }
    }
}

/// Result of [ContainerDataSourceEditor::finish]
#[derive(Debug)]
struct EditedContainer {
    /// container the edits are layered on, after applying the replacement at this location
    base: Option<ContainerHandle>,
    node: Arc<EditNode>,
}

impl ContainerDataSource for EditedContainer {
    fn names(&self) -> Vec<Token> {
        let mut names: indexmap::IndexSet<Token> = self
            .base
            .as_ref()
            .map(|base| base.names())
            .unwrap_or_default()
            .into_iter()
            .collect();

        for (name, child) in &self.node.children {
            match &child.entry {
                Entry::Delete => {
                    names.shift_remove(name);
                }
                Entry::Replace(_) => {
                    names.insert(name.clone());
                }
                Entry::Inherit => {
                    // deletions alone do not create a location the base lacks
                    if child.has_replacement() {
                        names.insert(name.clone());
                    }
                }
            }
        }

        names.into_iter().collect()
    }

    fn get(&self, name: &Token) -> Option<DataSource> {
        let Some(child) = self.node.children.get(name) else {
            return self.base.as_ref()?.get(name);
        };

        let base = match &child.entry {
            Entry::Delete => return None,
            Entry::Replace(value) if child.children.is_empty() => return Some(value.clone()),
            Entry::Replace(value) => value.as_container().cloned(),
            Entry::Inherit => match self.base.as_ref().and_then(|base| base.get(name)) {
                Some(DataSource::Container(container)) => Some(container),
                original if !child.has_replacement() => return original,
                _ => None,
            },
        };

        Some(DataSource::Container(Arc::new(EditedContainer {
            base,
            node: child.clone(),
        })))
    }
}
