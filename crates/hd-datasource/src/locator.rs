//! addressing into nested containers and the set algebra used for invalidation
//!
//! A [Locator] is a path of names from the root of a container to a (possibly nested) value. The empty locator
//! addresses the root value itself.
//!
//! A [LocatorSet] is kept minimal: no element is an ancestor of another element. Inserting a locator that is
//! already covered is a no-op and inserting an ancestor removes the descendants it covers. Over-approximating
//! what is dirty is safe, under-approximating is not.
use crate::token::Token;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Locator {
    elements: Vec<Token>,
}

impl Locator {
    /// The trivial locator, addresses the root value
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(elements: Vec<Token>) -> Self {
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[Token] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&Token> {
        self.elements.get(index)
    }

    pub fn first_element(&self) -> Option<&Token> {
        self.elements.first()
    }

    pub fn last_element(&self) -> Option<&Token> {
        self.elements.last()
    }

    /// Locator without its last element; the empty locator is its own parent
    pub fn parent(&self) -> Locator {
        let n = self.elements.len().saturating_sub(1);
        Self::new(self.elements[..n].to_vec())
    }

    /// `true` if `prefix` equals this locator or is one of its ancestors
    pub fn has_prefix(&self, prefix: &Locator) -> bool {
        self.elements.starts_with(&prefix.elements)
    }

    /// `true` if this locator equals `other` or is one of its ancestors
    pub fn is_prefix_of(&self, other: &Locator) -> bool {
        other.has_prefix(self)
    }

    /// `true` if either locator is a prefix of the other
    pub fn intersects(&self, other: &Locator) -> bool {
        self.has_prefix(other) || other.has_prefix(self)
    }

    pub fn append(&self, name: impl Into<Token>) -> Locator {
        let mut elements = self.elements.clone();
        elements.push(name.into());
        Self::new(elements)
    }

    pub fn append_locator(&self, suffix: &Locator) -> Locator {
        let mut elements = self.elements.clone();
        elements.extend(suffix.elements.iter().cloned());
        Self::new(elements)
    }

    /// Replaces `old_prefix` with `new_prefix`, returns a copy of `self` if `old_prefix` does not apply
    pub fn replace_prefix(&self, old_prefix: &Locator, new_prefix: &Locator) -> Locator {
        if !self.has_prefix(old_prefix) {
            return self.clone();
        }

        let mut elements = new_prefix.elements.clone();
        elements.extend(self.elements[old_prefix.len()..].iter().cloned());
        Self::new(elements)
    }

    /// Elements after `prefix`, `None` if `prefix` does not apply
    pub fn strip_prefix(&self, prefix: &Locator) -> Option<&[Token]> {
        self.elements.strip_prefix(prefix.elements.as_slice())
    }
}

impl<T: Into<Token>> FromIterator<T> for Locator {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Token>, const N: usize> From<[T; N]> for Locator {
    fn from(value: [T; N]) -> Self {
        value.into_iter().collect()
    }
}

impl From<&[Token]> for Locator {
    fn from(value: &[Token]) -> Self {
        Self::new(value.to_vec())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = self.elements.iter().map(Token::as_str).collect();
        f.write_str(&parts.join("/"))
    }
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Locator({self})")
    }
}

/// Minimal set of locators
///
/// Elements are kept sorted. Because an ancestor sorts directly before its descendants, covered elements can be
/// found next to the insertion point.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct LocatorSet {
    locators: Vec<Locator>,
}

impl LocatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sentinel covering every locator, meaning "everything beneath this point is dirty"
    pub fn universal_set() -> Self {
        Self {
            locators: vec![Locator::empty()],
        }
    }

    pub fn is_universal(&self) -> bool {
        self.locators.first().is_some_and(Locator::is_empty)
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.locators.iter()
    }

    pub fn insert(&mut self, locator: Locator) {
        let index = match self.locators.binary_search(&locator) {
            Ok(_) => return,
            Err(index) => index,
        };

        // the closest smaller element is the only candidate ancestor (or an unrelated sibling)
        if index > 0 && self.locators[index - 1].is_prefix_of(&locator) {
            return;
        }

        let covered = self.locators[index..]
            .iter()
            .take_while(|existing| locator.is_prefix_of(existing))
            .count();

        if covered > 0 {
            tracing::trace!(%locator, covered, "ancestor replaces descendants");
        }

        self.locators
            .splice(index..index + covered, std::iter::once(locator));
    }

    pub fn insert_set(&mut self, other: &LocatorSet) {
        if self.is_universal() {
            return;
        }

        for locator in other.iter() {
            self.insert(locator.clone());
        }
    }

    /// `true` if some element is `locator` or one of its ancestors
    pub fn contains(&self, locator: &Locator) -> bool {
        let index = match self.locators.binary_search(locator) {
            Ok(_) => return true,
            Err(index) => index,
        };

        // same reasoning as in insert: only the closest smaller element can be an ancestor
        index > 0 && self.locators[index - 1].is_prefix_of(locator)
    }

    /// `true` if some element is an ancestor or a descendant of `locator`
    pub fn intersects(&self, locator: &Locator) -> bool {
        self.locators
            .iter()
            .any(|existing| existing.intersects(locator))
    }

    pub fn intersects_set(&self, other: &LocatorSet) -> bool {
        other.iter().any(|locator| self.intersects(locator))
    }

    /// Elements intersecting `locator`, with covering ancestors narrowed down to `locator`
    pub fn intersection(&self, locator: &Locator) -> LocatorSet {
        let mut result = LocatorSet::new();
        for existing in &self.locators {
            if existing.is_prefix_of(locator) {
                result.insert(locator.clone());
            } else if locator.is_prefix_of(existing) {
                result.insert(existing.clone());
            }
        }
        result
    }

    /// Re-roots every element under `old_prefix` to `new_prefix`, other elements are kept
    pub fn replace_prefix(&self, old_prefix: &Locator, new_prefix: &Locator) -> LocatorSet {
        self.iter()
            .map(|locator| locator.replace_prefix(old_prefix, new_prefix))
            .collect()
    }
}

impl FromIterator<Locator> for LocatorSet {
    fn from_iter<I: IntoIterator<Item = Locator>>(iter: I) -> Self {
        let mut set = LocatorSet::new();
        for locator in iter {
            set.insert(locator);
        }
        set
    }
}

impl<'a> IntoIterator for &'a LocatorSet {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}

impl std::fmt::Display for LocatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.locators.iter().map(|l| format!("/{l}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl std::fmt::Debug for LocatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocatorSet{self}")
    }
}
