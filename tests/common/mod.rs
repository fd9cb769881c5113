#![allow(dead_code)]

use framescript::{DataFrame, Result, Value};

/// Cell values of a frame in logical row order
pub fn rows(frame: &DataFrame) -> Result<Vec<Vec<Value>>> {
    (0..frame.row_count())
        .map(|row| {
            (0..frame.column_count())
                .map(|column| frame.get_value_at(row, column))
                .collect()
        })
        .collect()
}

/// Asserts both frames have the same columns and the same cells in the same
/// logical order
pub fn assert_frames_equal(actual: &DataFrame, expected: &DataFrame) -> Result<()> {
    assert_eq!(actual.column_names(), expected.column_names());
    for name in expected.column_names() {
        assert_eq!(actual.column_type(name), expected.column_type(name), "type of {}", name);
    }
    assert_eq!(rows(actual)?, rows(expected)?);
    Ok(())
}

/// Values of one column in logical row order
pub fn column(frame: &DataFrame, name: &str) -> Result<Vec<Value>> {
    (0..frame.row_count())
        .map(|row| frame.get_value(name, row))
        .collect()
}
