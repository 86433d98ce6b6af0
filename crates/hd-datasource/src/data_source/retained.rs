//! data sources that hold their children/values directly
use super::{ContainerDataSource, DataSource, SampleTimes, SampledDataSource, Time, VectorDataSource};
use crate::{token::Token, value::Value};

/// Container backed by an ordered list of names and values built at construction
#[derive(Debug, Default, Clone)]
pub struct RetainedContainer {
    entries: indexmap::IndexMap<Token, DataSource>,
}

impl RetainedContainer {
    /// Builds a container from the non-null entries, keeping their order
    ///
    /// Later duplicates replace earlier values but keep the earlier position.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Token, Option<DataSource>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name, value)))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContainerDataSource for RetainedContainer {
    fn names(&self) -> Vec<Token> {
        self.entries.keys().cloned().collect()
    }

    fn get(&self, name: &Token) -> Option<DataSource> {
        self.entries.get(name).cloned()
    }
}

/// Constant value
#[derive(Debug, Clone, derive_new::new)]
pub struct RetainedSampled {
    value: Value,
}

impl SampledDataSource for RetainedSampled {
    fn value(&self, _time: Time) -> Value {
        self.value.clone()
    }
}

/// Value authored at discrete times, held between samples
#[derive(Debug, Clone)]
pub struct TimeSampled {
    /// sorted by time, never empty
    samples: Vec<(Time, Value)>,
}

impl TimeSampled {
    /// `None` if there are no samples
    pub fn new(mut samples: Vec<(Time, Value)>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        samples.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        samples.dedup_by(|(a, _), (b, _)| a == b);
        Some(Self { samples })
    }
}

impl SampledDataSource for TimeSampled {
    fn value(&self, time: Time) -> Value {
        let after = self.samples.partition_point(|(t, _)| *t <= time);
        let index = after.saturating_sub(1);
        self.samples[index].1.clone()
    }

    fn contributing_sample_times(&self, start: Time, end: Time) -> SampleTimes {
        if self.samples.len() < 2 {
            return SampleTimes::Static;
        }

        let first = self.samples.partition_point(|(t, _)| *t < start);
        let last = self.samples.partition_point(|(t, _)| *t <= end);

        // include the bracketing samples so the value over the whole interval can be reconstructed
        let from = first.saturating_sub(1);
        let to = (last + 1).min(self.samples.len());

        SampleTimes::Samples(self.samples[from..to].iter().map(|(t, _)| *t).collect())
    }
}

#[derive(Debug, Default, Clone, derive_new::new)]
pub struct RetainedVector {
    elements: Vec<DataSource>,
}

impl VectorDataSource for RetainedVector {
    fn len(&self) -> usize {
        self.elements.len()
    }

    fn element(&self, index: usize) -> Option<DataSource> {
        self.elements.get(index).cloned()
    }
}

/// Utility macro to create a [RetainedContainer]
///
/// Values may be a [DataSource] or an `Option<DataSource>`; `None` entries are left out.
/// ```
/// # use hd_datasource::{retained_container, data_source::DataSource};
/// let matrix: Option<DataSource> = None;
/// let xform = retained_container! {
///     "matrix" => matrix,
///     "resetXformStack" => DataSource::retained(true),
/// };
/// assert_eq!(xform.len(), 1);
/// ```
#[macro_export]
macro_rules! retained_container {
    { $($name:expr => $value:expr),* $(,)? } => {
        $crate::data_source::RetainedContainer::from_entries([
            $((
                $crate::token::Token::from($name),
                ::std::convert::Into::<::std::option::Option<$crate::data_source::DataSource>>::into($value),
            )),*
        ])
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_source::{ContainerHandle, SampledHandle};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn retained_container_keeps_declaration_order() {
        let container = retained_container! {
            "nodes" => DataSource::retained(1_i64),
            "terminals" => None::<DataSource>,
            "config" => DataSource::retained(2_i64),
        };
        assert_eq!(
            container.names(),
            vec![Token::from("nodes"), Token::from("config")]
        );
        assert!(container.get(&"terminals".into()).is_none());
    }

    #[test]
    fn shared_children() {
        let child: ContainerHandle = Arc::new(RetainedContainer::empty());
        let a = retained_container! { "child" => DataSource::Container(child.clone()) };
        let b = retained_container! { "child" => DataSource::Container(child.clone()) };

        let from_a = a.get(&"child".into()).unwrap();
        let from_b = b.get(&"child".into()).unwrap();
        assert!(from_a.ptr_eq(&from_b));
    }

    #[test]
    fn time_sampled_holds_values() {
        let ds = TimeSampled::new(vec![(1.0, Value::Int(10)), (-1.0, Value::Int(-10))]).unwrap();
        assert_eq!(ds.value(-5.0), Value::Int(-10));
        assert_eq!(ds.value(0.0), Value::Int(-10));
        assert_eq!(ds.value(1.0), Value::Int(10));
        assert_eq!(ds.value(3.0), Value::Int(10));
        assert!(TimeSampled::new(vec![]).is_none());
    }

    #[test]
    fn time_sampled_contributing_times_bracket_interval() {
        let ds: SampledHandle = Arc::new(
            TimeSampled::new(vec![
                (-2.0, Value::Int(0)),
                (-1.0, Value::Int(1)),
                (0.5, Value::Int(2)),
                (2.0, Value::Int(3)),
                (3.0, Value::Int(4)),
            ])
            .unwrap(),
        );

        assert_eq!(
            ds.contributing_sample_times(-0.5, 0.5),
            SampleTimes::Samples(vec![-1.0, 0.5, 2.0])
        );
        assert_eq!(
            ds.contributing_sample_times(5.0, 6.0),
            SampleTimes::Samples(vec![3.0])
        );

        let single = TimeSampled::new(vec![(0.0, Value::Int(1))]).unwrap();
        assert_eq!(single.contributing_sample_times(-1.0, 1.0), SampleTimes::Static);
    }
}
