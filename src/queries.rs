use crate::domain::{BusinessSummary, DayOfWeek};
use crate::error::Result;
use crate::storage::Storage;
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

/// Read-only query operations over the loaded directory. The clock for the
/// open-now predicate is injected so the query stays pure and testable.
pub struct QueryService {
    storage: Arc<dyn Storage>,
}

impl QueryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Businesses carrying the exact (trimmed, case-sensitive) category label.
    pub async fn by_category(&self, name: &str) -> Result<Vec<BusinessSummary>> {
        let name = name.trim();
        let matches = self.storage.businesses_by_category(name).await?;
        info!("Found {} businesses for category '{}'", matches.len(), name);
        Ok(matches)
    }

    /// Businesses open on the given weekday. The day string must be a real
    /// weekday name; anything else is a client-input error, not an empty
    /// result.
    pub async fn by_day(&self, day_text: &str) -> Result<Vec<BusinessSummary>> {
        let day: DayOfWeek = day_text.parse()?;
        let matches = self.storage.businesses_by_day(day).await?;
        info!("Found {} businesses open on {}", matches.len(), day);
        Ok(matches)
    }

    /// Businesses open at `now`, evaluated in each business's own stored
    /// timezone: the local weekday and time-of-day are derived per business
    /// before matching against its shifts.
    pub async fn open_at(&self, now: DateTime<Utc>) -> Result<Vec<BusinessSummary>> {
        let matches: Vec<BusinessSummary> = self
            .storage
            .all_businesses()
            .await?
            .into_iter()
            .filter(|business| is_open_at(business, now))
            .collect();
        info!("Found {} businesses open now", matches.len());
        Ok(matches)
    }
}

fn is_open_at(business: &BusinessSummary, now: DateTime<Utc>) -> bool {
    // Zones are validated at ingest; the fallback covers data loaded out of band.
    let tz: Tz = business.timezone.parse().unwrap_or_else(|_| {
        warn!(
            "Business {} has unknown timezone '{}', assuming UTC",
            business.id, business.timezone
        );
        Tz::UTC
    });
    let local = now.with_timezone(&tz);
    let day = DayOfWeek::from(local.weekday());
    let time = local.time();

    business
        .hours
        .iter()
        .any(|h| h.day == day && h.shifts.iter().any(|s| s.contains(time)))
}
