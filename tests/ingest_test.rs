use anyhow::Result;
use bizhours::error::DirectoryError;
use bizhours::ingest::load_csv;
use bizhours::storage::{SqliteStorage, Storage};
use chrono::NaiveTime;
use std::io::Write;
use tempfile::tempdir;

const SAMPLE_CSV: &str = "\
ID,timezone,Rating,Max Rating,Review Count,categories,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday
1,America/New_York,4.5,5,120,Music;Food,9:00-12:00 13:00-18:00,9:00am - 5:00pm,9:00am - 5:00pm,9:00am - 5:00pm,9:00am - 5:00pm,\"11am - 2pm, 5pm - 10pm\",Closed
2,Europe/Lisbon,3.8,5,40,Art; Museum,Open 24 hours,Closed,Closed,Closed,Closed,Closed,Closed
3,America/New_York,not-a-number,5,10,Food,Closed,Closed,Closed,Closed,Closed,Closed,Closed
";

fn write_csv(dir: &tempfile::TempDir, content: &str) -> Result<std::path::PathBuf> {
    let path = dir.path().join("sample.csv");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path)
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn batch_load_skips_bad_rows_and_loads_the_rest() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(&dir, SAMPLE_CSV)?;
    let storage = SqliteStorage::open(dir.path().join("test.db"))?;

    let summary = load_csv(&csv_path, &storage).await?;
    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.businesses_loaded, 2);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].contains("Rating"));

    let all = storage.all_businesses().await?;
    assert_eq!(all.len(), 2);
    Ok(())
}

#[tokio::test]
async fn loaded_hours_reflect_the_source_shifts() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(&dir, SAMPLE_CSV)?;
    let storage = SqliteStorage::open(dir.path().join("test.db"))?;
    load_csv(&csv_path, &storage).await?;

    let all = storage.all_businesses().await?;
    let first = &all[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.categories, vec!["Music", "Food"]);
    assert_eq!(first.hours.len(), 7);

    // Monday: two 24-hour-clock shifts
    assert_eq!(first.hours[0].shifts.len(), 2);
    assert_eq!(first.hours[0].shifts[0].start, t(9, 0));
    assert_eq!(first.hours[0].shifts[1].end, t(18, 0));

    // Saturday: comma-separated am/pm shifts
    assert_eq!(first.hours[5].shifts.len(), 2);
    assert_eq!(first.hours[5].shifts[0].start, t(11, 0));
    assert_eq!(first.hours[5].shifts[0].end, t(14, 0));
    assert_eq!(first.hours[5].shifts[1].start, t(17, 0));
    assert_eq!(first.hours[5].shifts[1].end, t(22, 0));

    // Sunday: closed sentinel means zero shifts
    assert!(first.hours[6].shifts.is_empty());

    // "Open 24 hours" maps to a single full-day shift
    let second = &all[1];
    assert_eq!(second.categories, vec!["Art", "Museum"]);
    assert_eq!(second.hours[0].shifts.len(), 1);
    assert_eq!(second.hours[0].shifts[0].start, t(0, 0));
    assert_eq!(second.hours[0].shifts[0].end, t(23, 59));
    Ok(())
}

#[tokio::test]
async fn missing_columns_fail_the_whole_load() -> Result<()> {
    let dir = tempdir()?;
    let csv_path = write_csv(
        &dir,
        "ID,timezone,Rating\n1,America/New_York,4.5\n",
    )?;
    let storage = SqliteStorage::open(dir.path().join("test.db"))?;

    let err = load_csv(&csv_path, &storage).await.unwrap_err();
    match err {
        DirectoryError::SchemaContract(missing) => {
            assert!(missing.contains("Max Rating"));
            assert!(missing.contains("Review Count"));
            assert!(missing.contains("categories"));
            assert!(missing.contains("Monday"));
            assert!(missing.contains("Sunday"));
        }
        other => panic!("expected SchemaContract, got {:?}", other),
    }

    // Nothing was loaded
    assert!(storage.all_businesses().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn reloading_replaces_prior_data() -> Result<()> {
    let dir = tempdir()?;
    let storage = SqliteStorage::open(dir.path().join("test.db"))?;

    let csv_path = write_csv(&dir, SAMPLE_CSV)?;
    load_csv(&csv_path, &storage).await?;
    assert_eq!(storage.all_businesses().await?.len(), 2);

    let smaller = "\
ID,timezone,Rating,Max Rating,Review Count,categories,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday
9,UTC,5,5,1,Cafe,8:00-16:00,Closed,Closed,Closed,Closed,Closed,Closed
";
    let csv_path = write_csv(&dir, smaller)?;
    load_csv(&csv_path, &storage).await?;

    let all = storage.all_businesses().await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 9);
    Ok(())
}

#[tokio::test]
async fn unparseable_hours_are_warnings_not_skips() -> Result<()> {
    let dir = tempdir()?;
    let content = "\
ID,timezone,Rating,Max Rating,Review Count,categories,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday
1,UTC,4.0,5,3,Bar,whenever we feel like it,Closed,Closed,Closed,Closed,Closed,Closed
";
    let csv_path = write_csv(&dir, content)?;
    let storage = SqliteStorage::open(dir.path().join("test.db"))?;

    let summary = load_csv(&csv_path, &storage).await?;
    assert_eq!(summary.businesses_loaded, 1);
    assert_eq!(summary.rows_skipped, 0);
    assert!(summary.field_warnings > 0);

    // The business is stored with no Monday shifts rather than dropped.
    let all = storage.all_businesses().await?;
    assert!(all[0].hours[0].shifts.is_empty());
    Ok(())
}
