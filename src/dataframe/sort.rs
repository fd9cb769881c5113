//! Row ordering.
//!
//! Sorting only permutes the frame's logical row order. Keys are computed
//! once per row and compared with [`Value::compare_to`]; the sort is stable,
//! so consecutive sorts refine each other. Cell storage never moves, which
//! lets [`DataFrame::unsort`] restore insertion order.

use crate::dataframe::{DataFrame, RowContext};
use crate::error::{EngineError, Result};
use crate::expression::evaluate;
use crate::report;
use crate::syntax;
use crate::value::Value;
use std::cmp::Ordering;

impl DataFrame {
    /// Sort ascending by `columns`, the first column being the most
    /// significant
    pub fn sort_by(&mut self, columns: &[&str]) -> Result<&mut Self> {
        let mut indexes = Vec::with_capacity(columns.len());
        for name in columns {
            match self.column_index(name) {
                Some(index) => indexes.push(index),
                None => {
                    return report::fail(EngineError::configuration(format!(
                        "Cannot sort data frame '{}' by unknown column '{}'",
                        self.name(),
                        name
                    )))
                }
            }
        }

        let keys = self.sort_keys(|frame, physical| {
            indexes
                .iter()
                .map(|&column| frame.value_at_physical(column, physical))
                .collect()
        })?;
        log::debug!("{}: sort by {}", self.name(), columns.join(", "));
        self.apply_order(keys)
    }

    /// Sort ascending by the value of `expression` in each row
    pub fn sort_by_expression(&mut self, expression: &str) -> Result<&mut Self> {
        let parsed = syntax::parse_expression(expression)?;
        self.check_expression(&parsed)?;

        let keys = self.sort_keys(|frame, physical| {
            let mut context = RowContext::new(frame, physical);
            Ok(vec![evaluate(&parsed, &mut context)?])
        })?;
        log::debug!("{}: sort by expression {}", self.name(), expression);
        self.apply_order(keys)
    }

    /// Restore insertion order
    pub fn unsort(&mut self) -> &mut Self {
        if self.row_order.take().is_some() {
            log::debug!("{}: unsort", self.name());
        }
        self
    }

    /// Key of every row in current logical order, paired with its physical
    /// index
    fn sort_keys<F>(&self, key: F) -> Result<Vec<(usize, Vec<Value>)>>
    where
        F: Fn(&DataFrame, usize) -> Result<Vec<Value>>,
    {
        (0..self.row_count())
            .map(|row| {
                let physical = self.physical_row(row)?;
                Ok((physical, key(self, physical)?))
            })
            .collect()
    }

    fn apply_order(&mut self, mut keys: Vec<(usize, Vec<Value>)>) -> Result<&mut Self> {
        let mut failure = None;
        keys.sort_by(|(_, a), (_, b)| {
            for (left, right) in a.iter().zip(b) {
                match left.compare_to(right) {
                    Ok(Ordering::Equal) => continue,
                    Ok(ordering) => return ordering,
                    Err(error) => {
                        failure.get_or_insert(error);
                        return Ordering::Equal;
                    }
                }
            }
            Ordering::Equal
        });
        if let Some(error) = failure {
            return report::fail(error);
        }

        self.row_order = Some(keys.into_iter().map(|(physical, _)| physical).collect());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn frame() -> Result<DataFrame> {
        let mut frame = DataFrame::new("Frame");
        frame
            .add_string_column("Name")?
            .add_long_column("Bar")?
            .add_double_column("Baz")?
            .add_row(row!["Carl", 3, 1.5])?
            .add_row(row!["Alice", 2, 9.0])?
            .add_row(row!["Bob", 1, 0.5])?
            .add_row(row!["Alice", 1, 4.0])?;
        Ok(frame)
    }

    fn column(frame: &DataFrame, name: &str) -> Result<Vec<Value>> {
        (0..frame.row_count())
            .map(|row| frame.get_value(name, row))
            .collect()
    }

    #[test]
    fn test_sort_by_columns() -> Result<()> {
        let mut frame = frame()?;
        frame.sort_by(&["Name", "Bar"])?;
        assert_eq!(
            column(&frame, "Name")?,
            row!["Alice", "Alice", "Bob", "Carl"]
        );
        assert_eq!(column(&frame, "Bar")?, row![1, 2, 1, 3]);
        assert!(frame.is_sorted());

        frame.unsort();
        assert_eq!(column(&frame, "Bar")?, row![3, 2, 1, 1]);
        assert!(!frame.is_sorted());
        Ok(())
    }

    #[test]
    fn test_sort_by_expression() -> Result<()> {
        let mut frame = frame()?;
        frame.sort_by_expression("Bar * 10 - Baz")?;
        assert_eq!(column(&frame, "Baz")?, row![4.0, 0.5, 9.0, 1.5]);
        Ok(())
    }

    #[test]
    fn test_rows_added_after_sort_go_last() -> Result<()> {
        let mut frame = frame()?;
        frame.sort_by(&["Bar"])?;
        frame.add_row(row!["Aaron", 0, 0.0])?;
        assert_eq!(
            column(&frame, "Name")?,
            row!["Bob", "Alice", "Alice", "Carl", "Aaron"]
        );
        frame.unsort();
        assert_eq!(frame.get_string("Name", 4)?, "Aaron");
        Ok(())
    }

    #[test]
    fn test_unknown_column() -> Result<()> {
        let mut frame = frame()?;
        assert!(matches!(
            frame.sort_by(&["Name", "Waldo"]),
            Err(EngineError::Configuration(_))
        ));
        assert!(!frame.is_sorted());
        Ok(())
    }
}
