//! the data source capability set
//!
//! A data source is one of
//! - a container: named children, looked up lazily
//! - a sampled value: a [Value] that may vary over (shutter) time
//! - a vector: ordered children
//! - a block: an explicit "nothing here", used to delete values when layering edits
//!
//! Consumers branch on the capability ([DataSource] variant), never on the concrete implementation.
//!
//! All data sources are immutable once shared and must be safe to query from several threads at once. Computed
//! implementations are pure functions of their inputs; repeated `get` calls may hand out distinct but
//! structurally equal children.
mod retained;

pub use retained::{RetainedContainer, RetainedSampled, RetainedVector, TimeSampled};

use crate::{
    locator::Locator,
    token::Token,
    value::{FromValue, Value},
};
use std::sync::Arc;

/// Shutter offset relative to the current frame
pub type Time = f32;

pub type ContainerHandle = Arc<dyn ContainerDataSource>;
pub type SampledHandle = Arc<dyn SampledDataSource>;
pub type VectorHandle = Arc<dyn VectorDataSource>;

#[derive(Clone)]
pub enum DataSource {
    Container(ContainerHandle),
    Sampled(SampledHandle),
    Vector(VectorHandle),
    Block,
}

pub trait ContainerDataSource: Send + Sync + std::fmt::Debug {
    /// Names of the children, in a stable order
    fn names(&self) -> Vec<Token>;

    /// Child with the given name, `None` if there is none
    fn get(&self, name: &Token) -> Option<DataSource>;
}

pub trait SampledDataSource: Send + Sync + std::fmt::Debug {
    fn value(&self, time: Time) -> Value;

    /// Times within `[start, end]` (plus the bracketing samples just outside it) that must be sampled to
    /// reconstruct the value over the interval
    fn contributing_sample_times(&self, start: Time, end: Time) -> SampleTimes {
        let _ = (start, end);
        SampleTimes::Static
    }
}

pub trait VectorDataSource: Send + Sync + std::fmt::Debug {
    fn len(&self) -> usize;

    fn element(&self, index: usize) -> Option<DataSource>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleTimes {
    /// The value does not vary over time
    Static,
    /// The value varies, these are the times to sample (sorted, unique)
    Samples(Vec<Time>),
    /// The value varies in a way that cannot be captured by a finite set of samples
    Unbounded,
}

impl SampleTimes {
    pub fn is_varying(&self) -> bool {
        !matches!(self, SampleTimes::Static)
    }

    /// Union of both, [SampleTimes::Unbounded] dominates
    pub fn merge(self, other: SampleTimes) -> SampleTimes {
        use SampleTimes::*;

        match (self, other) {
            (Unbounded, _) | (_, Unbounded) => Unbounded,
            (Static, other) | (other, Static) => other,
            (Samples(mut a), Samples(b)) => {
                a.extend(b);
                a.sort_by(|x, y| x.total_cmp(y));
                a.dedup();
                Samples(a)
            }
        }
    }
}

/// Merged contributing sample times of several sources over `[start, end]`
pub fn merge_contributing_sample_times(
    sources: &[&SampledHandle],
    start: Time,
    end: Time,
) -> SampleTimes {
    sources
        .iter()
        .map(|source| source.contributing_sample_times(start, end))
        .fold(SampleTimes::Static, SampleTimes::merge)
}

impl DataSource {
    pub fn container(container: impl ContainerDataSource + 'static) -> Self {
        DataSource::Container(Arc::new(container))
    }

    pub fn sampled(sampled: impl SampledDataSource + 'static) -> Self {
        DataSource::Sampled(Arc::new(sampled))
    }

    /// Constant sampled data source
    pub fn retained(value: impl Into<Value>) -> Self {
        DataSource::Sampled(Arc::new(RetainedSampled::new(value.into())))
    }

    pub fn as_container(&self) -> Option<&ContainerHandle> {
        match self {
            DataSource::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_sampled(&self) -> Option<&SampledHandle> {
        match self {
            DataSource::Sampled(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorHandle> {
        match self {
            DataSource::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, DataSource::Block)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::Container(_) => "container",
            DataSource::Sampled(_) => "sampled",
            DataSource::Vector(_) => "vector",
            DataSource::Block => "block",
        }
    }

    /// `true` if both handles point to the same instance
    pub fn ptr_eq(&self, other: &DataSource) -> bool {
        match (self, other) {
            (DataSource::Container(a), DataSource::Container(b)) => Arc::ptr_eq(a, b),
            (DataSource::Sampled(a), DataSource::Sampled(b)) => Arc::ptr_eq(a, b),
            (DataSource::Vector(a), DataSource::Vector(b)) => Arc::ptr_eq(a, b),
            (DataSource::Block, DataSource::Block) => true,
            _ => false,
        }
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Container(c) => c.fmt(f),
            DataSource::Sampled(s) => s.fmt(f),
            DataSource::Vector(v) => v.fmt(f),
            DataSource::Block => f.write_str("Block"),
        }
    }
}

impl From<ContainerHandle> for DataSource {
    fn from(value: ContainerHandle) -> Self {
        DataSource::Container(value)
    }
}

impl From<SampledHandle> for DataSource {
    fn from(value: SampledHandle) -> Self {
        DataSource::Sampled(value)
    }
}

impl From<VectorHandle> for DataSource {
    fn from(value: VectorHandle) -> Self {
        DataSource::Vector(value)
    }
}

/// Follows `locator` through nested containers
///
/// The empty locator yields `container` itself.
pub fn get_at(container: &ContainerHandle, locator: &Locator) -> Option<DataSource> {
    let mut current = DataSource::Container(container.clone());
    for name in locator.elements() {
        let DataSource::Container(c) = current else {
            return None;
        };
        current = c.get(name)?;
    }
    Some(current)
}

/// Child container with the given name, `None` for missing or non-container children
pub fn get_container(container: &ContainerHandle, name: &Token) -> Option<ContainerHandle> {
    match container.get(name)? {
        DataSource::Container(c) => Some(c),
        _ => None,
    }
}

/// Typed value of a sampled data source
///
/// Anything other than a sampled data source holding a `T` yields `None`; mismatches are logged.
pub fn typed_value<T: FromValue>(data_source: &DataSource, time: Time) -> Option<T> {
    let DataSource::Sampled(sampled) = data_source else {
        tracing::warn!(
            expected = T::TYPE_NAME,
            found = data_source.kind(),
            "expected sampled data source"
        );
        return None;
    };

    let value = sampled.value(time);
    let typed = T::from_value(&value);
    if typed.is_none() {
        tracing::warn!(
            expected = T::TYPE_NAME,
            found = value.type_name(),
            "sampled value type mismatch"
        );
    }
    typed
}

/// Evaluates a data source tree at `time` into a [Value]
///
/// Containers become dictionaries, vectors become arrays, blocks evaluate to `None` and are skipped.
pub fn to_value(data_source: &DataSource, time: Time) -> Option<Value> {
    match data_source {
        DataSource::Sampled(s) => Some(s.value(time)),
        DataSource::Container(c) => Some(Value::Dictionary(
            c.names()
                .into_iter()
                .filter_map(|name| {
                    let child = c.get(&name)?;
                    to_value(&child, time).map(|value| (name.to_string(), value))
                })
                .collect(),
        )),
        DataSource::Vector(v) => Some(Value::Array(
            (0..v.len())
                .filter_map(|index| v.element(index))
                .filter_map(|element| to_value(&element, time))
                .collect(),
        )),
        DataSource::Block => None,
    }
}
