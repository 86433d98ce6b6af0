use super::{Visit, VisitLeaves};
use crate::{
    data_source::{DataSource, Time},
    locator::Locator,
};
use std::fmt::Write;

/// Line based text form of a data source tree evaluated at `time`
///
/// One `locator = value` line per leaf, blocks are written as `<block>`.
pub fn dump(data_source: &DataSource, time: Time) -> String {
    let mut out = String::new();
    let mut write_leaf = |locator: &Locator, leaf: &DataSource| {
        // writing to a String does not fail
        let _ = match leaf {
            DataSource::Sampled(sampled) => writeln!(out, "{locator} = {}", sampled.value(time)),
            _ => writeln!(out, "{locator} = <block>"),
        };
    };
    data_source.visit_leaves(&mut write_leaf as &mut dyn Visit);
    out
}
