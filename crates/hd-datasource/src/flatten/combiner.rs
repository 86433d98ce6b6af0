use crate::{
    data_source::{
        merge_contributing_sample_times, SampleTimes, SampledDataSource, SampledHandle, Time,
    },
    value::Value,
};
use glam::DMat4;

/// Associative combination of an ancestor's flattened value with a local value
pub type CombineFn = fn(parent: &Value, local: &Value) -> Value;

/// Lazily combines two sampled sources per sample time
///
/// The value at time 0 is computed once at construction, every other time is recomputed on each call.
#[derive(Debug)]
pub struct CombinerDataSource {
    parent: SampledHandle,
    local: SampledHandle,
    combine: CombineFn,
    cached_at_zero: Value,
}

impl CombinerDataSource {
    pub fn new(parent: SampledHandle, local: SampledHandle, combine: CombineFn) -> Self {
        let cached_at_zero = combine(&parent.value(0.0), &local.value(0.0));
        Self {
            parent,
            local,
            combine,
            cached_at_zero,
        }
    }
}

impl SampledDataSource for CombinerDataSource {
    fn value(&self, time: Time) -> Value {
        if time == 0.0 {
            return self.cached_at_zero.clone();
        }

        (self.combine)(&self.parent.value(time), &self.local.value(time))
    }

    fn contributing_sample_times(&self, start: Time, end: Time) -> SampleTimes {
        merge_contributing_sample_times(&[&self.parent, &self.local], start, end)
    }
}

/// Local transform applied first, then the parent's: `parent * local`
///
/// A non-matrix operand counts as identity.
pub fn multiply_matrices(parent: &Value, local: &Value) -> Value {
    let as_matrix = |value: &Value, role: &str| {
        value.get::<DMat4>().unwrap_or_else(|| {
            tracing::warn!(role, found = value.type_name(), "expected matrix, using identity");
            DMat4::IDENTITY
        })
    };

    Value::Matrix(as_matrix(parent, "parent") * as_matrix(local, "local"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data_source::{RetainedSampled, TimeSampled};
    use glam::DVec3;
    use pretty_assertions::assert_eq;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[derive(Debug, Default)]
    struct CountingSampled {
        calls: AtomicUsize,
    }

    impl SampledDataSource for CountingSampled {
        fn value(&self, time: Time) -> Value {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Value::Matrix(DMat4::from_translation(DVec3::new(time as f64, 0.0, 0.0)))
        }
    }

    #[test]
    fn time_zero_is_cached() {
        let local = Arc::new(CountingSampled::default());
        let parent: SampledHandle = Arc::new(RetainedSampled::new(Value::Matrix(DMat4::IDENTITY)));
        let combiner = CombinerDataSource::new(parent, local.clone(), multiply_matrices);
        assert_eq!(local.calls.load(Ordering::SeqCst), 1);

        combiner.value(0.0);
        combiner.value(0.0);
        assert_eq!(local.calls.load(Ordering::SeqCst), 1);

        assert_eq!(
            combiner.value(2.0),
            Value::Matrix(DMat4::from_translation(DVec3::new(2.0, 0.0, 0.0)))
        );
        combiner.value(2.0);
        assert_eq!(local.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn contributing_times_are_merged() {
        let parent: SampledHandle = Arc::new(
            TimeSampled::new(vec![
                (-1.0, Value::Matrix(DMat4::IDENTITY)),
                (1.0, Value::Matrix(DMat4::IDENTITY)),
            ])
            .unwrap(),
        );
        let local: SampledHandle = Arc::new(
            TimeSampled::new(vec![
                (0.0, Value::Matrix(DMat4::IDENTITY)),
                (1.0, Value::Matrix(DMat4::IDENTITY)),
            ])
            .unwrap(),
        );
        let combiner = CombinerDataSource::new(parent, local, multiply_matrices);

        assert_eq!(
            combiner.contributing_sample_times(-1.0, 1.0),
            SampleTimes::Samples(vec![-1.0, 0.0, 1.0])
        );
    }

    #[test]
    fn unbounded_dominates() {
        #[derive(Debug)]
        struct Procedural;

        impl SampledDataSource for Procedural {
            fn value(&self, _time: Time) -> Value {
                Value::Matrix(DMat4::IDENTITY)
            }

            fn contributing_sample_times(&self, _start: Time, _end: Time) -> SampleTimes {
                SampleTimes::Unbounded
            }
        }

        let parent: SampledHandle = Arc::new(RetainedSampled::new(Value::Matrix(DMat4::IDENTITY)));
        let combiner = CombinerDataSource::new(parent, Arc::new(Procedural), multiply_matrices);
        assert_eq!(
            combiner.contributing_sample_times(0.0, 1.0),
            SampleTimes::Unbounded
        );
    }

    #[test]
    fn order_of_application() {
        let scale = Value::Matrix(DMat4::from_scale(DVec3::splat(2.0)));
        let translate = Value::Matrix(DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0)));

        // local translation happens in the parent's scaled space
        let Value::Matrix(combined) = multiply_matrices(&scale, &translate) else {
            panic!("expected matrix");
        };
        assert_eq!(
            combined.transform_point3(DVec3::ZERO),
            DVec3::new(2.0, 0.0, 0.0)
        );
    }
}
