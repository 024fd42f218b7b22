use postgres::{Client, NoTls};
use tracing::info;

use crate::config::DbConfig;
use crate::ingest::VisitSource;
use crate::model::{IngestError, StorageError, VisitRecord};

/// Table and index DDL, safe to re-run.
const TABLE_DDL: &str = "
CREATE TABLE IF NOT EXISTS public.park_visits (
    id                  BIGSERIAL PRIMARY KEY,
    park                TEXT NOT NULL,
    unit_code           TEXT NOT NULL,
    park_type           TEXT NOT NULL,
    region              TEXT,
    state               TEXT,
    year                INT  NOT NULL CHECK (year BETWEEN 1900 AND 2100),
    month               INT  NOT NULL CHECK (month BETWEEN 1 AND 12),
    recreation_visits   BIGINT NOT NULL CHECK (recreation_visits >= 0)
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_park_month
ON public.park_visits (unit_code, year, month);

CREATE INDEX IF NOT EXISTS ix_state_year_month
ON public.park_visits (state, year, month);

CREATE INDEX IF NOT EXISTS ix_region_year
ON public.park_visits (region, year);

CREATE INDEX IF NOT EXISTS ix_park
ON public.park_visits (park);
";

/// Materialized views consumed by the status command and downstream BI
/// tools. Each carries a unique index so it can be refreshed
/// CONCURRENTLY.
const VIEW_DDL: &str = "
CREATE MATERIALIZED VIEW IF NOT EXISTS public.mv_state_month_visits AS
SELECT state, year, month, SUM(recreation_visits)::BIGINT AS visits
FROM public.park_visits
GROUP BY state, year, month;

CREATE UNIQUE INDEX IF NOT EXISTS ux_mv_state_month
ON public.mv_state_month_visits (state, year, month);

CREATE MATERIALIZED VIEW IF NOT EXISTS public.mv_region_month_visits AS
SELECT region, year, month, SUM(recreation_visits)::BIGINT AS visits
FROM public.park_visits
GROUP BY region, year, month;

CREATE UNIQUE INDEX IF NOT EXISTS ux_mv_region_month
ON public.mv_region_month_visits (region, year, month);

CREATE MATERIALIZED VIEW IF NOT EXISTS public.mv_park_yearly_totals AS
SELECT unit_code, MAX(park) AS park, year,
       SUM(recreation_visits)::BIGINT AS visits_year
FROM public.park_visits
GROUP BY unit_code, year;

CREATE UNIQUE INDEX IF NOT EXISTS ux_mv_park_yearly
ON public.mv_park_yearly_totals (unit_code, year);

CREATE MATERIALIZED VIEW IF NOT EXISTS public.mv_park_yoy AS
WITH yearly AS (
    SELECT unit_code, MAX(park) AS park, year,
           SUM(recreation_visits)::BIGINT AS visits_year
    FROM public.park_visits
    GROUP BY unit_code, year
)
SELECT unit_code, park, year, visits_year,
       (CASE
            WHEN LAG(visits_year) OVER w IS NULL OR LAG(visits_year) OVER w = 0 THEN NULL
            ELSE (visits_year - LAG(visits_year) OVER w) * 100.0 / LAG(visits_year) OVER w
        END)::DOUBLE PRECISION AS yoy_pct
FROM yearly
WINDOW w AS (PARTITION BY unit_code ORDER BY year);

CREATE UNIQUE INDEX IF NOT EXISTS ux_mv_park_yoy
ON public.mv_park_yoy (unit_code, year);
";

const STAGING_DDL: &str = "
CREATE TEMP TABLE park_visits_staging
(LIKE public.park_visits INCLUDING DEFAULTS)
ON COMMIT DROP;
";

const STAGING_INSERT: &str = "
INSERT INTO park_visits_staging
    (park, unit_code, park_type, region, state, year, month, recreation_visits)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
";

/// Merge from staging into the target table. Idempotent on
/// (unit_code, year, month): re-running the same batch rewrites rows to
/// identical values.
const UPSERT_SQL: &str = "
INSERT INTO public.park_visits
    (park, unit_code, park_type, region, state, year, month, recreation_visits)
SELECT park, unit_code, park_type, region, state, year, month, recreation_visits
FROM park_visits_staging
ON CONFLICT (unit_code, year, month) DO UPDATE
SET park              = EXCLUDED.park,
    park_type         = EXCLUDED.park_type,
    region            = EXCLUDED.region,
    state             = EXCLUDED.state,
    recreation_visits = EXCLUDED.recreation_visits;
";

/// Refresh order; later views read the same base table, not each other.
pub const MATERIALIZED_VIEWS: [&str; 4] = [
    "mv_state_month_visits",
    "mv_region_month_visits",
    "mv_park_yearly_totals",
    "mv_park_yoy",
];

/// One row of `mv_state_month_visits`.
#[derive(Debug, Clone)]
pub struct StateMonthVisits {
    pub state: String,
    pub year: i32,
    pub month: i32,
    pub visits: i64,
}

/// One row of `mv_park_yoy` with a non-null growth figure.
#[derive(Debug, Clone)]
pub struct ParkYoy {
    pub unit_code: String,
    pub park: String,
    pub year: i32,
    pub yoy_pct: f64,
    pub visits_year: i64,
}

pub struct PgStorage {
    client: Client,
}

impl PgStorage {
    pub fn connect(config: &DbConfig) -> Result<Self, StorageError> {
        let client = Client::connect(&config.connection_string(), NoTls)?;
        Ok(Self { client })
    }

    /// Creates the table, its indexes and the materialized views if they
    /// do not exist yet.
    pub fn ensure_schema(&mut self) -> Result<(), StorageError> {
        self.client.batch_execute(TABLE_DDL)?;
        self.client.batch_execute(VIEW_DDL)?;
        Ok(())
    }

    /// Upserts a normalized batch through a temp staging table. Returns
    /// the number of rows merged into the target.
    pub fn upsert_visits(&mut self, records: &[VisitRecord]) -> Result<u64, StorageError> {
        let mut tx = self.client.transaction()?;
        tx.batch_execute(STAGING_DDL)?;

        let insert = tx.prepare(STAGING_INSERT)?;
        for record in records {
            tx.execute(
                &insert,
                &[
                    &record.park,
                    &record.unit_code,
                    &record.park_type,
                    &record.region,
                    &record.state,
                    &record.year,
                    &(record.month as i32),
                    &record.recreation_visits,
                ],
            )?;
        }

        let merged = tx.execute(UPSERT_SQL, &[])?;
        tx.commit()?;
        Ok(merged)
    }

    pub fn refresh_views(&mut self) -> Result<(), StorageError> {
        for view in MATERIALIZED_VIEWS {
            self.client.batch_execute(&format!(
                "REFRESH MATERIALIZED VIEW CONCURRENTLY public.{};",
                view
            ))?;
            info!("Refreshed: public.{}", view);
        }
        Ok(())
    }

    pub fn row_count(&mut self) -> Result<i64, StorageError> {
        let row = self
            .client
            .query_one("SELECT COUNT(*) FROM public.park_visits", &[])?;
        Ok(row.get(0))
    }

    /// Full table scan for the serving dataset.
    pub fn load_all(&mut self) -> Result<Vec<VisitRecord>, StorageError> {
        let rows = self.client.query(
            "SELECT park, unit_code, park_type, region, state, year, month, recreation_visits
             FROM public.park_visits
             ORDER BY unit_code, year, month",
            &[],
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let month: i32 = row.get(6);
            records.push(VisitRecord {
                park: row.get(0),
                unit_code: row.get(1),
                park_type: row.get(2),
                region: row.get::<_, Option<String>>(3).unwrap_or_default(),
                state: row.get::<_, Option<String>>(4).unwrap_or_default(),
                year: row.get(5),
                month: month as u32,
                recreation_visits: row.get(7),
                is_forecast: false,
            });
        }
        Ok(records)
    }

    /// State leaders of the most recent year, from the state-month view.
    pub fn top_states_latest_year(
        &mut self,
        limit: i64,
    ) -> Result<Vec<StateMonthVisits>, StorageError> {
        let rows = self.client.query(
            "SELECT state, year, month, visits
             FROM public.mv_state_month_visits
             WHERE year = (SELECT MAX(year) FROM public.mv_state_month_visits)
             ORDER BY visits DESC
             LIMIT $1",
            &[&limit],
        )?;

        Ok(rows
            .iter()
            .map(|row| StateMonthVisits {
                state: row.get::<_, Option<String>>(0).unwrap_or_default(),
                year: row.get(1),
                month: row.get(2),
                visits: row.get(3),
            })
            .collect())
    }

    /// Fastest growing parks by year-over-year percentage.
    pub fn top_yoy_parks(&mut self, limit: i64) -> Result<Vec<ParkYoy>, StorageError> {
        let rows = self.client.query(
            "SELECT unit_code, park, year, yoy_pct, visits_year
             FROM public.mv_park_yoy
             WHERE yoy_pct IS NOT NULL
             ORDER BY yoy_pct DESC
             LIMIT $1",
            &[&limit],
        )?;

        Ok(rows
            .iter()
            .map(|row| ParkYoy {
                unit_code: row.get(0),
                park: row.get(1),
                year: row.get(2),
                yoy_pct: row.get(3),
                visits_year: row.get(4),
            })
            .collect())
    }
}

/// Database-backed dataset source for the server, with the connection
/// settings captured so the attempt can fail cleanly into the CSV
/// fallback.
pub struct PgVisitSource {
    pub config: DbConfig,
}

#[async_trait::async_trait]
impl VisitSource for PgVisitSource {
    fn describe(&self) -> String {
        format!("postgres {}@{}", self.config.dbname, self.config.host)
    }

    async fn load(&self) -> Result<Vec<VisitRecord>, IngestError> {
        let mut storage = PgStorage::connect(&self.config)
            .map_err(|e| IngestError::SourceUnavailable(e.to_string()))?;
        storage
            .load_all()
            .map_err(|e| IngestError::SourceUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_targets_the_record_key() {
        assert!(UPSERT_SQL.contains("ON CONFLICT (unit_code, year, month) DO UPDATE"));
        // The key columns themselves must not be rewritten.
        assert!(!UPSERT_SQL.contains("unit_code = EXCLUDED"));
        assert!(!UPSERT_SQL.contains("year = EXCLUDED"));
        assert!(!UPSERT_SQL.contains("month = EXCLUDED"));
    }

    #[test]
    fn staging_lives_only_for_the_transaction() {
        assert!(STAGING_DDL.contains("TEMP TABLE"));
        assert!(STAGING_DDL.contains("ON COMMIT DROP"));
    }

    #[test]
    fn every_view_is_created_and_refreshable() {
        for view in MATERIALIZED_VIEWS {
            assert!(VIEW_DDL.contains(view), "missing DDL for {}", view);
        }
        // CONCURRENTLY refresh needs a unique index per view.
        assert_eq!(VIEW_DDL.matches("CREATE UNIQUE INDEX").count(), 4);
    }
}
