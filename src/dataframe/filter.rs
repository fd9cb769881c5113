//! Row selection by boolean expression.

use crate::dataframe::{DataFrame, RowContext};
use crate::error::{EngineError, Result};
use crate::expression::type_inference::ERR_CONDITION_NOT_BOOLEAN;
use crate::expression::{evaluate, expr_to_string, Expression};
use crate::report;
use crate::syntax;
use crate::value::{Value, ValueType};

impl DataFrame {
    /// Rows for which `condition` is true, in their current order
    pub fn select_by(&self, condition: &str) -> Result<DataFrame> {
        let (selected, _) = self.split(condition, false)?;
        Ok(selected)
    }

    /// Rows for which `condition` is true and all others, in one scan
    pub fn partition(&self, condition: &str) -> Result<(DataFrame, DataFrame)> {
        self.split(condition, true)
    }

    fn split(&self, condition: &str, keep_rejected: bool) -> Result<(DataFrame, DataFrame)> {
        let expression = self.parse_condition(condition)?;

        let mut selected = self.empty_copy();
        let mut rejected = self.empty_copy();
        for row in 0..self.row_count() {
            let physical = self.physical_row(row)?;
            let mut context = RowContext::new(self, physical);
            // void and non-boolean results reject the row
            let matched = matches!(evaluate(&expression, &mut context)?, Value::Boolean(true));
            if matched {
                selected.add_row(self.stored_values(physical))?;
            } else if keep_rejected {
                rejected.add_row(self.stored_values(physical))?;
            }
        }

        log::debug!(
            "{}: '{}' selected {} of {} rows",
            self.name(),
            condition,
            selected.row_count(),
            self.row_count()
        );
        Ok((selected, rejected))
    }

    fn parse_condition(&self, condition: &str) -> Result<Expression> {
        let expression = syntax::parse_expression(condition)?;
        let value_type = self.check_expression(&expression)?;
        if value_type != ValueType::Boolean {
            return report::fail(EngineError::TypeInference {
                description: ERR_CONDITION_NOT_BOOLEAN.to_string(),
                expression: expr_to_string(&expression),
            });
        }
        Ok(expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn people() -> Result<DataFrame> {
        let mut frame = DataFrame::new("People");
        frame
            .add_string_column("Name")?
            .add_long_column("Age")?
            .add_row(row!["Alice", 30])?
            .add_row(row!["Bob", 17])?
            .add_row(row!["Carol", 45])?
            .add_row(row!["Dan", None::<i64>])?;
        Ok(frame)
    }

    fn names(frame: &DataFrame) -> Result<Vec<String>> {
        (0..frame.row_count())
            .map(|row| frame.get_string("Name", row))
            .collect()
    }

    #[test]
    fn test_select_by() -> Result<()> {
        let frame = people()?;
        let adults = frame.select_by("Age >= 18")?;
        assert_eq!(names(&adults)?, vec!["Alice", "Carol"]);
        assert_eq!(adults.column_names(), frame.column_names());
        Ok(())
    }

    #[test]
    fn test_partition_keeps_void_results_in_rejected() -> Result<()> {
        let frame = people()?;
        let (adults, others) = frame.partition("Age >= 18")?;
        assert_eq!(names(&adults)?, vec!["Alice", "Carol"]);
        assert_eq!(names(&others)?, vec!["Bob", "Dan"]);
        assert!(others.is_null("Age", 1)?);
        Ok(())
    }

    #[test]
    fn test_selection_follows_sort_order() -> Result<()> {
        let mut frame = people()?;
        frame.sort_by(&["Name"])?;
        frame.sort_by_expression("-Age")?;
        let selected = frame.select_by("Age > 0")?;
        assert_eq!(names(&selected)?, vec!["Carol", "Alice", "Bob"]);
        assert!(!selected.is_sorted());
        Ok(())
    }

    #[test]
    fn test_non_boolean_condition_is_rejected() -> Result<()> {
        let frame = people()?;
        assert_eq!(
            frame.select_by("Age + 1").unwrap_err(),
            EngineError::TypeInference {
                description: ERR_CONDITION_NOT_BOOLEAN.to_string(),
                expression: "Age + 1".to_string(),
            }
        );
        assert!(matches!(
            frame.select_by("Missing == 1"),
            Err(EngineError::TypeInference { .. })
        ));
        assert!(matches!(frame.select_by("Age >="), Err(EngineError::Parse(_))));
        Ok(())
    }
}
