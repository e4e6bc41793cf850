//! `SQLite` implementation of [`BaselineRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use meterhub_app::ports::BaselineRepository;
use meterhub_domain::baseline::Baseline;
use meterhub_domain::error::{ConflictError, MeterHubError, NotFoundError};
use meterhub_domain::id::MeterId;
use meterhub_domain::interval::TimeInterval;

use crate::error::{StorageError, is_foreign_key_violation, write_error};
use crate::pool::begin_write;
use crate::timestamp;

/// Wrapper for converting database rows into domain [`Baseline`].
struct Wrapper(Baseline);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let meter_id: i64 = row.try_get("meter_id")?;
        let apply_start: String = row.try_get("apply_start")?;
        let apply_end: String = row.try_get("apply_end")?;
        let calc_start: String = row.try_get("calc_start")?;
        let calc_end: String = row.try_get("calc_end")?;
        let note: Option<String> = row.try_get("note")?;
        let baseline_value: f64 = row.try_get("baseline_value")?;

        let apply_range =
            TimeInterval::new(timestamp::decode(&apply_start)?, timestamp::decode(&apply_end)?)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let calc_range =
            TimeInterval::new(timestamp::decode(&calc_start)?, timestamp::decode(&calc_end)?)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Baseline {
            meter_id: MeterId::new(meter_id),
            apply_range,
            calc_range,
            note,
            baseline_value: Some(baseline_value),
        }))
    }
}

const METER_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM meters WHERE id = ?)";

// The value is the mean of the meter's readings lying entirely inside the
// calculation range. No row is inserted when there are none.
const INSERT: &str = r"
    INSERT INTO baselines (meter_id, apply_start, apply_end, calc_start, calc_end, note, baseline_value)
    SELECT ?1, ?2, ?3, ?4, ?5, ?6, computed.value
    FROM (
        SELECT AVG(reading) AS value
        FROM readings
        WHERE meter_id = ?1 AND start_timestamp >= ?4 AND end_timestamp <= ?5
    ) AS computed
    WHERE computed.value IS NOT NULL
    RETURNING meter_id, apply_start, apply_end, calc_start, calc_end, note, baseline_value
";

const SELECT_BY_METER: &str = r"
    SELECT meter_id, apply_start, apply_end, calc_start, calc_end, note, baseline_value
    FROM baselines
    WHERE meter_id = ?
    ORDER BY apply_start
";

const SELECT_ALL: &str = r"
    SELECT meter_id, apply_start, apply_end, calc_start, calc_end, note, baseline_value
    FROM baselines
    ORDER BY meter_id, apply_start
";

/// `SQLite`-backed baseline repository.
pub struct SqliteBaselineRepository {
    pool: SqlitePool,
}

impl SqliteBaselineRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl BaselineRepository for SqliteBaselineRepository {
    async fn insert(&self, baseline: Baseline) -> Result<Baseline, MeterHubError> {
        baseline.ensure_uncomputed()?;
        let meter_not_found = || -> MeterHubError {
            NotFoundError {
                entity: "Meter",
                id: baseline.meter_id.to_string(),
            }
            .into()
        };

        let mut tx = begin_write(&self.pool).await?;

        let meter_exists: bool = sqlx::query_scalar(METER_EXISTS)
            .bind(baseline.meter_id.get())
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        if !meter_exists {
            return Err(meter_not_found());
        }

        let stored: Option<Wrapper> = sqlx::query_as(INSERT)
            .bind(baseline.meter_id.get())
            .bind(timestamp::encode(baseline.apply_range.start()))
            .bind(timestamp::encode(baseline.apply_range.end()))
            .bind(timestamp::encode(baseline.calc_range.start()))
            .bind(timestamp::encode(baseline.calc_range.end()))
            .bind(baseline.note.as_deref())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    return meter_not_found();
                }
                write_error(err, || ConflictError::UniqueConstraint {
                    entity: "Baseline",
                    key: format!(
                        "meter {} from {}",
                        baseline.meter_id,
                        baseline.apply_range.start()
                    ),
                })
            })?;

        let Some(Wrapper(stored)) = stored else {
            return Err(NotFoundError {
                entity: "Readings",
                id: format!(
                    "meter {} between {} and {}",
                    baseline.meter_id,
                    baseline.calc_range.start(),
                    baseline.calc_range.end()
                ),
            }
            .into());
        };

        tx.commit().await.map_err(StorageError::from)?;

        Ok(stored)
    }

    async fn get_all_for_meter(&self, meter_id: MeterId) -> Result<Vec<Baseline>, MeterHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_METER)
            .bind(meter_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_all(&self) -> Result<Vec<Baseline>, MeterHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
