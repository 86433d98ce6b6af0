//! visitor pattern helpers
mod dump;
pub use dump::dump;

use crate::{
    data_source::{ContainerHandle, DataSource},
    locator::Locator,
    token::Token,
};

/// Visitor that is handed every data source along with its location
pub trait Visit {
    fn visit(&mut self, locator: &Locator, data_source: &DataSource);
}

// blanket impl for FnMut
impl<F> Visit for F
where
    F: FnMut(&Locator, &DataSource),
{
    fn visit(&mut self, locator: &Locator, data_source: &DataSource) {
        self(locator, data_source)
    }
}

/// Recursively visit all leaf data sources (sampled values and blocks)
///
/// Containers are descended in name order, vectors in index order with the index as the locator element. Empty
/// containers and vectors produce no visit.
pub trait VisitLeaves {
    fn visit_leaves(&self, visitor: &mut dyn Visit);
}

impl VisitLeaves for ContainerHandle {
    fn visit_leaves(&self, visitor: &mut dyn Visit) {
        visit_container(self, &Locator::empty(), visitor)
    }
}

impl VisitLeaves for DataSource {
    fn visit_leaves(&self, visitor: &mut dyn Visit) {
        visit_data_source(self, &Locator::empty(), visitor)
    }
}

fn visit_container(container: &ContainerHandle, locator: &Locator, visitor: &mut dyn Visit) {
    for name in container.names() {
        // names may list children that turn out to be absent
        if let Some(child) = container.get(&name) {
            visit_data_source(&child, &locator.append(name), visitor);
        }
    }
}

fn visit_data_source(data_source: &DataSource, locator: &Locator, visitor: &mut dyn Visit) {
    match data_source {
        DataSource::Container(container) => visit_container(container, locator, visitor),
        DataSource::Vector(vector) => {
            for index in 0..vector.len() {
                if let Some(element) = vector.element(index) {
                    visit_data_source(&element, &locator.append(Token::from(index.to_string())), visitor);
                }
            }
        }
        DataSource::Sampled(_) | DataSource::Block => visitor.visit(locator, data_source),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        data_source::RetainedVector,
        retained_container,
        value::Value,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn visits_leaves_depth_first() {
        let container: ContainerHandle = Arc::new(retained_container! {
            "a" => DataSource::retained(1_i64),
            "b" => DataSource::Container(Arc::new(retained_container! {
                "c" => DataSource::Block,
                "empty" => DataSource::Container(Arc::new(retained_container! {})),
            })),
            "d" => DataSource::Vector(Arc::new(RetainedVector::new(vec![
                DataSource::retained(Value::Bool(true)),
                DataSource::retained("x"),
            ]))),
        });

        let mut visited = vec![];
        container.visit_leaves(&mut |locator: &Locator, data_source: &DataSource| {
            visited.push(format!("{locator} {}", data_source.kind()));
        });

        assert_eq!(
            visited,
            vec!["a sampled", "b/c block", "d/0 sampled", "d/1 sampled"]
        );
    }
}
