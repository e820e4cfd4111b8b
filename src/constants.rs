/// Column and label constants shared by the ingest and query layers.
/// The CSV column names are a contract with the upstream export and are
/// validated against the file header before any row is read.

/// Weekday column names, in source order. Each holds that day's raw hours text.
pub const DAYS_OF_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// Fixed (non-weekday) columns of the upstream export
pub const COL_ID: &str = "ID";
pub const COL_TIMEZONE: &str = "timezone";
pub const COL_RATING: &str = "Rating";
pub const COL_MAX_RATING: &str = "Max Rating";
pub const COL_REVIEW_COUNT: &str = "Review Count";
pub const COL_CATEGORIES: &str = "categories";

/// Label assigned when the source category field is blank.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Every column the loader requires, fixed columns first.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![
        COL_ID,
        COL_TIMEZONE,
        COL_RATING,
        COL_MAX_RATING,
        COL_REVIEW_COUNT,
        COL_CATEGORIES,
    ];
    cols.extend(DAYS_OF_WEEK);
    cols
}
