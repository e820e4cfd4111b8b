use crate::domain::{BusinessRecord, BusinessSummary, DayHours, DayOfWeek, Shift};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage seam for the directory. Written once per batch load, then
/// read-only; implementations must be safe for concurrent readers.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Atomically replaces the whole dataset with the given batch.
    /// On error the previously loaded dataset must remain intact.
    async fn replace_batch(&self, records: &[BusinessRecord]) -> Result<usize>;

    /// Businesses with at least one category row exactly matching `category`.
    async fn businesses_by_category(&self, category: &str) -> Result<Vec<BusinessSummary>>;

    /// Businesses with at least one shift on the given day.
    async fn businesses_by_day(&self, day: DayOfWeek) -> Result<Vec<BusinessSummary>>;

    /// Every business with its categories and hours, for predicates that
    /// cannot be pushed into the store (open-now is per-business-timezone).
    async fn all_businesses(&self) -> Result<Vec<BusinessSummary>>;
}

const SCHEMA: &str = r#"
PRAGMA journal_mode=WAL;
CREATE TABLE IF NOT EXISTS businesses (
    id            INTEGER PRIMARY KEY,
    timezone      TEXT NOT NULL,
    rating        REAL NOT NULL,
    max_rating    REAL NOT NULL,
    review_count  INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS categories (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id  INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    category     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS business_hours (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    business_id   INTEGER NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    day           TEXT NOT NULL,
    shift1_start  TEXT,
    shift1_end    TEXT,
    shift2_start  TEXT,
    shift2_end    TEXT
);
CREATE INDEX IF NOT EXISTS idx_categories_category ON categories(category);
CREATE INDEX IF NOT EXISTS idx_hours_business_day ON business_hours(business_id, day);
"#;

/// SQLite-backed storage. A single connection behind a mutex is enough here:
/// writes happen only during the batch load and reads are short point joins.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn summaries_for_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<BusinessSummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for &id in ids {
            let business = conn.query_row(
                "SELECT id, timezone, rating, max_rating, review_count FROM businesses WHERE id = ?1",
                params![id],
                |row| {
                    Ok(BusinessSummary {
                        id: row.get(0)?,
                        timezone: row.get(1)?,
                        rating: row.get(2)?,
                        max_rating: row.get(3)?,
                        review_count: row.get(4)?,
                        categories: Vec::new(),
                        hours: Vec::new(),
                    })
                },
            )?;
            let mut summary = business;

            let mut stmt =
                conn.prepare("SELECT category FROM categories WHERE business_id = ?1 ORDER BY id")?;
            let mut rows = stmt.query(params![id])?;
            while let Some(row) = rows.next()? {
                summary.categories.push(row.get(0)?);
            }

            let mut stmt = conn.prepare(
                "SELECT day, shift1_start, shift1_end, shift2_start, shift2_end
                 FROM business_hours WHERE business_id = ?1 ORDER BY id",
            )?;
            let mut rows = stmt.query(params![id])?;
            while let Some(row) = rows.next()? {
                let day_text: String = row.get(0)?;
                let day = match DayOfWeek::from_str(&day_text) {
                    Ok(day) => day,
                    Err(_) => {
                        warn!("Skipping hours row with unknown day '{}'", day_text);
                        continue;
                    }
                };
                let mut shifts = Vec::new();
                for (start_idx, end_idx) in [(1usize, 2usize), (3, 4)] {
                    let start: Option<String> = row.get(start_idx)?;
                    let end: Option<String> = row.get(end_idx)?;
                    if let (Some(start), Some(end)) = (start, end) {
                        match (parse_stored_time(&start), parse_stored_time(&end)) {
                            (Some(start), Some(end)) => {
                                if let Some(shift) = Shift::new(start, end) {
                                    shifts.push(shift);
                                }
                            }
                            _ => warn!(
                                "Skipping malformed stored shift {}-{} for business {}",
                                start, end, id
                            ),
                        }
                    }
                }
                summary.hours.push(DayHours { day, shifts });
            }

            summaries.push(summary);
        }
        Ok(summaries)
    }

    fn ids_from_query(conn: &Connection, sql: &str, param: Option<&str>) -> Result<Vec<i64>> {
        let mut stmt = conn.prepare(sql)?;
        let mut ids = Vec::new();
        match param {
            Some(p) => {
                let mut rows = stmt.query(params![p])?;
                while let Some(row) = rows.next()? {
                    ids.push(row.get(0)?);
                }
            }
            None => {
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    ids.push(row.get(0)?);
                }
            }
        }
        Ok(ids)
    }
}

fn parse_stored_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M").ok()
}

fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn replace_batch(&self, records: &[BusinessRecord]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        // The store is rebuilt per batch; the previous dataset survives a
        // rollback untouched.
        tx.execute("DELETE FROM business_hours", [])?;
        tx.execute("DELETE FROM categories", [])?;
        tx.execute("DELETE FROM businesses", [])?;

        for record in records {
            let b = &record.business;
            tx.execute(
                "INSERT INTO businesses (id, timezone, rating, max_rating, review_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![b.id, b.timezone, b.rating, b.max_rating, b.review_count],
            )?;
            for category in &record.categories {
                tx.execute(
                    "INSERT INTO categories (business_id, category) VALUES (?1, ?2)",
                    params![b.id, category],
                )?;
            }
            for day_hours in &record.hours {
                let shift1 = day_hours.shifts.first();
                let shift2 = day_hours.shifts.get(1);
                tx.execute(
                    "INSERT INTO business_hours
                     (business_id, day, shift1_start, shift1_end, shift2_start, shift2_end)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        b.id,
                        day_hours.day.as_str(),
                        shift1.map(|s| format_time(s.start)),
                        shift1.map(|s| format_time(s.end)),
                        shift2.map(|s| format_time(s.start)),
                        shift2.map(|s| format_time(s.end)),
                    ],
                )?;
            }
            debug!("Loaded business {}", b.id);
        }

        tx.commit()?;
        info!("Replaced dataset with {} businesses", records.len());
        Ok(records.len())
    }

    async fn businesses_by_category(&self, category: &str) -> Result<Vec<BusinessSummary>> {
        let conn = self.conn.lock().unwrap();
        let ids = Self::ids_from_query(
            &conn,
            "SELECT DISTINCT b.id FROM businesses b
             JOIN categories c ON c.business_id = b.id
             WHERE c.category = ?1 ORDER BY b.id",
            Some(category),
        )?;
        Self::summaries_for_ids(&conn, &ids)
    }

    async fn businesses_by_day(&self, day: DayOfWeek) -> Result<Vec<BusinessSummary>> {
        let conn = self.conn.lock().unwrap();
        // A day row with no shift1 is a closed day and does not match.
        let ids = Self::ids_from_query(
            &conn,
            "SELECT DISTINCT b.id FROM businesses b
             JOIN business_hours h ON h.business_id = b.id
             WHERE h.day = ?1 AND h.shift1_start IS NOT NULL ORDER BY b.id",
            Some(day.as_str()),
        )?;
        Self::summaries_for_ids(&conn, &ids)
    }

    async fn all_businesses(&self) -> Result<Vec<BusinessSummary>> {
        let conn = self.conn.lock().unwrap();
        let ids = Self::ids_from_query(&conn, "SELECT id FROM businesses ORDER BY id", None)?;
        Self::summaries_for_ids(&conn, &ids)
    }
}

/// In-memory storage implementation for development/testing
pub struct InMemoryStorage {
    records: Mutex<Vec<BusinessRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    fn summarize(record: &BusinessRecord) -> BusinessSummary {
        BusinessSummary {
            id: record.business.id,
            timezone: record.business.timezone.clone(),
            rating: record.business.rating,
            max_rating: record.business.max_rating,
            review_count: record.business.review_count,
            categories: record.categories.clone(),
            hours: record.hours.clone(),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn replace_batch(&self, records: &[BusinessRecord]) -> Result<usize> {
        let mut stored = self.records.lock().unwrap();
        *stored = records.to_vec();
        Ok(stored.len())
    }

    async fn businesses_by_category(&self, category: &str) -> Result<Vec<BusinessSummary>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.categories.iter().any(|c| c == category))
            .map(Self::summarize)
            .collect())
    }

    async fn businesses_by_day(&self, day: DayOfWeek) -> Result<Vec<BusinessSummary>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.hours.iter().any(|h| h.day == day && !h.is_closed()))
            .map(Self::summarize)
            .collect())
    }

    async fn all_businesses(&self) -> Result<Vec<BusinessSummary>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().map(Self::summarize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Business;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn record(id: i64, categories: &[&str], monday_shifts: &[(u32, u32, u32, u32)]) -> BusinessRecord {
        let mut hours: Vec<DayHours> = DayOfWeek::ALL.iter().map(|d| DayHours::closed(*d)).collect();
        hours[0].shifts = monday_shifts
            .iter()
            .map(|&(sh, sm, eh, em)| Shift::new(t(sh, sm), t(eh, em)).unwrap())
            .collect();
        BusinessRecord {
            business: Business {
                id,
                timezone: "UTC".to_string(),
                rating: 4.0,
                max_rating: 5.0,
                review_count: 10,
            },
            categories: categories.iter().map(|s| s.to_string()).collect(),
            hours,
        }
    }

    #[tokio::test]
    async fn sqlite_round_trips_a_batch() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        let records = vec![
            record(1, &["Music", "Food"], &[(9, 0, 12, 0), (13, 0, 18, 0)]),
            record(2, &["Art"], &[]),
        ];
        assert_eq!(storage.replace_batch(&records).await?, 2);

        let all = storage.all_businesses().await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].categories, vec!["Music", "Food"]);
        assert_eq!(all[0].hours.len(), 7);
        assert_eq!(all[0].hours[0].shifts.len(), 2);
        assert_eq!(all[0].hours[0].shifts[1].start, t(13, 0));
        assert!(all[1].hours[0].is_closed());
        Ok(())
    }

    #[tokio::test]
    async fn category_match_is_exact_and_case_sensitive() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        storage
            .replace_batch(&[record(1, &["Music"], &[(9, 0, 17, 0)])])
            .await?;
        assert_eq!(storage.businesses_by_category("Music").await?.len(), 1);
        assert!(storage.businesses_by_category("music").await?.is_empty());
        assert!(storage.businesses_by_category("Mus").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn day_query_excludes_closed_days() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        let records = vec![
            record(1, &["Music"], &[(9, 0, 17, 0)]),
            record(2, &["Music"], &[]),
        ];
        storage.replace_batch(&records).await?;

        let open_monday = storage.businesses_by_day(DayOfWeek::Monday).await?;
        assert_eq!(open_monday.len(), 1);
        assert_eq!(open_monday[0].id, 1);
        assert!(storage.businesses_by_day(DayOfWeek::Sunday).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn reload_replaces_the_previous_dataset() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        storage
            .replace_batch(&[record(1, &["Music"], &[(9, 0, 17, 0)])])
            .await?;
        storage
            .replace_batch(&[record(2, &["Food"], &[(8, 0, 16, 0)])])
            .await?;

        let all = storage.all_businesses().await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 2);
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_storage_matches_sqlite_behavior() -> Result<()> {
        let records = vec![
            record(1, &["Music"], &[(9, 0, 17, 0)]),
            record(2, &["Food"], &[]),
        ];
        let memory = InMemoryStorage::new();
        memory.replace_batch(&records).await?;

        assert_eq!(memory.businesses_by_category("Food").await?.len(), 1);
        assert_eq!(memory.businesses_by_day(DayOfWeek::Monday).await?.len(), 1);
        assert_eq!(memory.all_businesses().await?.len(), 2);
        Ok(())
    }
}
