mod common;

use common::{assert_frames_equal, column, rows};
use framescript::{row, DataFrame, EngineError, Result, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn names_frame() -> Result<DataFrame> {
    let mut frame = DataFrame::new("Frame");
    frame
        .add_string_column("Name")?
        .add_string_column("Foo")?
        .add_long_column("Bar")?
        .add_row(row!["Alice", "Pqr", 11])?
        .add_row(row!["Albert", "Abc", 12])?
        .add_row(row!["Bob", "Def", 13])?
        .add_row(row!["Carol", "Xyz", 14])?
        .add_row(row!["Abigail", "Def", 15])?;
    Ok(frame)
}

#[test]
fn test_select_by_or_condition() -> Result<()> {
    let frame = names_frame()?;
    let selected = frame.select_by("Foo == \"Def\" or Foo == \"Abc\"")?;

    assert_eq!(
        column(&selected, "Name")?,
        row!["Albert", "Bob", "Abigail"]
    );
    assert_eq!(selected.name(), "Frame");
    assert_eq!(frame.row_count(), 5);
    Ok(())
}

#[test]
fn test_select_by_string_operators() -> Result<()> {
    let frame = names_frame()?;

    let selected = frame.select_by("startsWith(Name, \"Al\") and not (Foo in (\"Pqr\", \"Xyz\"))")?;
    assert_eq!(column(&selected, "Name")?, row!["Albert"]);

    let selected = frame.select_by("\"ar\" in Name")?;
    assert_eq!(column(&selected, "Name")?, row!["Carol"]);
    Ok(())
}

#[test]
fn test_select_by_computed_column() -> Result<()> {
    let mut frame = names_frame()?;
    frame.add_computed_column("Label", "toUpper(Foo) + \"-\" + toString(Bar)")?;

    let selected = frame.select_by("Label == \"DEF-13\" or Bar > 14")?;
    assert_eq!(column(&selected, "Name")?, row!["Bob", "Abigail"]);
    assert_eq!(column(&selected, "Label")?, row!["DEF-13", "DEF-15"]);
    assert!(selected.column("Label").is_some_and(|c| c.is_computed()));
    Ok(())
}

#[test]
fn test_select_nothing_and_everything() -> Result<()> {
    let frame = names_frame()?;

    let none = frame.select_by("Bar > 100")?;
    assert_eq!(none.row_count(), 0);
    assert_eq!(none.column_names(), frame.column_names());

    let all = frame.select_by("Bar > 0")?;
    assert_frames_equal(&all, &frame)?;
    Ok(())
}

#[test]
fn test_null_cells_are_never_selected() -> Result<()> {
    let mut frame = DataFrame::new("Frame");
    frame
        .add_string_column("Name")?
        .add_double_column("Score")?
        .add_row(row!["Alice", 1.5])?
        .add_row(row!["Bob", None::<f64>])?
        .add_row(row![None::<&str>, 3.0])?;

    let (high, rest) = frame.partition("Score > 1.0")?;
    assert_eq!(column(&high, "Name")?, vec![Value::from("Alice"), Value::Void]);
    assert_eq!(column(&rest, "Name")?, row!["Bob"]);

    let named = frame.select_by("Name is not empty")?;
    assert_eq!(named.row_count(), 2);
    Ok(())
}

#[test]
fn test_ill_typed_condition_scans_nothing() -> Result<()> {
    let frame = names_frame()?;
    assert!(matches!(
        frame.select_by("Name > 3"),
        Err(EngineError::TypeInference { .. })
    ));
    assert!(matches!(
        frame.partition("Bar and true"),
        Err(EngineError::TypeInference { .. })
    ));
    Ok(())
}

#[test]
fn test_partition_reconstructs_frame() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let mut frame = DataFrame::new("Random");
        frame.add_long_column("Id")?.add_long_column("Value")?;
        let count = rng.gen_range(0..40);
        for id in 0..count {
            frame.add_row(row![id as i64, rng.gen_range(-50i64..50)])?;
        }
        let threshold = rng.gen_range(-60i64..60);

        let (selected, rejected) = frame.partition(&format!("Value < {}", threshold))?;
        assert_eq!(selected.row_count() + rejected.row_count(), frame.row_count());

        // merge both halves back by their ids
        let mut merged = rows(&selected)?;
        merged.extend(rows(&rejected)?);
        merged.sort_by_key(|cells| cells[0].as_long().unwrap_or_default());
        assert_eq!(merged, rows(&frame)?);

        for cells in rows(&selected)? {
            assert!(cells[1].as_long()? < threshold);
        }
        for cells in rows(&rejected)? {
            assert!(cells[1].as_long()? >= threshold);
        }
    }
    Ok(())
}
