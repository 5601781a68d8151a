//! PostgreSQL 저장소 구현.
//!
//! 시세 스냅샷(`market_quotes`)과 경제 지표 관측값(`economic_observations`)을
//! 저장하는 repository를 제공합니다. Redis가 비어 있을 때의 2차 캐시이자
//! 프리로더 결과의 영속 저장소입니다.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use spartan_core::{
    AssetClass, CanonicalSymbol, DatabaseSettings, EconomicSeries, Observation, ProviderId, Quote,
    SeriesId,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    pub async fn connect(url: &str, settings: &DatabaseSettings) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// 설정에서 연결하고 필요하면 마이그레이션을 실행합니다. URL이 없으면 None.
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Option<Self>> {
        let Some(url) = &settings.url else {
            return Ok(None);
        };

        let db = Self::connect(url, settings).await?;
        if settings.run_migrations {
            db.migrate().await?;
        }
        Ok(Some(db))
    }

    /// 기존 연결 풀에서 Database 인스턴스를 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DataError::MigrationError(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::QueryError(e.to_string()))?;
        Ok(true)
    }
}

// =============================================================================
// Quote Repository
// =============================================================================

/// 시세 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct QuoteRecord {
    pub symbol: String,
    pub asset_class: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: f64,
    pub volume: Decimal,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl TryFrom<QuoteRecord> for Quote {
    type Error = DataError;

    fn try_from(record: QuoteRecord) -> Result<Self> {
        Ok(Quote {
            symbol: record.symbol,
            asset_class: record.asset_class.parse::<AssetClass>()?,
            price: record.price,
            change: record.change,
            change_percent: record.change_percent,
            volume: record.volume,
            source: record.source.parse::<ProviderId>()?,
            fetched_at: record.fetched_at,
        })
    }
}

/// 시세 스냅샷 repository.
///
/// (symbol, asset_class)당 최신 한 건만 유지합니다.
#[derive(Clone)]
pub struct QuoteRepository {
    db: Database,
}

impl QuoteRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 시세를 저장하거나 갱신합니다.
    #[instrument(skip(self, quote), fields(symbol = %quote.symbol))]
    pub async fn upsert(&self, quote: &Quote) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO market_quotes
                (symbol, asset_class, price, change, change_percent, volume, source, fetched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (symbol, asset_class) DO UPDATE SET
                price = EXCLUDED.price,
                change = EXCLUDED.change,
                change_percent = EXCLUDED.change_percent,
                volume = EXCLUDED.volume,
                source = EXCLUDED.source,
                fetched_at = EXCLUDED.fetched_at
            "#,
        )
        .bind(&quote.symbol)
        .bind(quote.asset_class.as_str())
        .bind(quote.price)
        .bind(quote.change)
        .bind(quote.change_percent)
        .bind(quote.volume)
        .bind(quote.source.as_str())
        .bind(quote.fetched_at)
        .execute(self.db.pool())
        .await?;

        debug!("시세 저장 완료");
        Ok(())
    }

    /// 저장된 시세 중 `max_age_secs`보다 최신인 것을 조회합니다.
    pub async fn find_fresh(
        &self,
        symbol: &CanonicalSymbol,
        max_age_secs: i64,
    ) -> Result<Option<Quote>> {
        let record: Option<QuoteRecord> = sqlx::query_as(
            r#"
            SELECT symbol, asset_class, price, change, change_percent, volume, source, fetched_at
            FROM market_quotes
            WHERE symbol = $1 AND asset_class = $2
              AND fetched_at > NOW() - make_interval(secs => $3)
            "#,
        )
        .bind(symbol.key())
        .bind(symbol.asset_class().as_str())
        .bind(max_age_secs as f64)
        .fetch_optional(self.db.pool())
        .await?;

        record.map(Quote::try_from).transpose()
    }

    /// 나이와 무관하게 저장된 시세가 있는지 확인합니다.
    pub async fn exists(&self, symbol: &CanonicalSymbol) -> Result<bool> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM market_quotes WHERE symbol = $1 AND asset_class = $2)",
        )
        .bind(symbol.key())
        .bind(symbol.asset_class().as_str())
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.0)
    }
}

// =============================================================================
// Economic Observation Repository
// =============================================================================

#[derive(Debug, Clone, FromRow)]
struct ObservationRecord {
    observation_date: NaiveDate,
    value: f64,
}

/// 경제 지표 관측값 repository.
#[derive(Clone)]
pub struct ObservationRepository {
    db: Database,
}

impl ObservationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 시계열 관측값을 저장하고 갱신 시각을 기록합니다.
    #[instrument(skip(self, series), fields(series_id = %series.series_id, count = series.observations.len()))]
    pub async fn upsert_series(&self, series: &EconomicSeries) -> Result<usize> {
        let dates: Vec<NaiveDate> = series.observations.iter().map(|o| o.date).collect();
        let values: Vec<f64> = series.observations.iter().map(|o| o.value).collect();

        let mut tx = self.db.pool().begin().await?;

        // UNNEST 패턴으로 일괄 삽입
        let result = sqlx::query(
            r#"
            INSERT INTO economic_observations (series_id, observation_date, value)
            SELECT $1, * FROM UNNEST($2::date[], $3::float8[])
            ON CONFLICT (series_id, observation_date) DO UPDATE SET
                value = EXCLUDED.value
            "#,
        )
        .bind(series.series_id.as_str())
        .bind(&dates)
        .bind(&values)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO economic_series_meta (series_id, title, last_refreshed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (series_id) DO UPDATE SET
                title = COALESCE(EXCLUDED.title, economic_series_meta.title),
                last_refreshed_at = EXCLUDED.last_refreshed_at
            "#,
        )
        .bind(series.series_id.as_str())
        .bind(series.title.as_deref())
        .bind(series.fetched_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() as usize)
    }

    /// 마지막 갱신이 `max_age_secs` 이내인 시계열의 최근 `limit`개 관측값.
    ///
    /// 갱신 기록이 오래됐거나 관측값이 없으면 None.
    pub async fn find_fresh(
        &self,
        series_id: &SeriesId,
        limit: usize,
        max_age_secs: i64,
    ) -> Result<Option<EconomicSeries>> {
        let refreshed: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT last_refreshed_at FROM economic_series_meta
            WHERE series_id = $1 AND last_refreshed_at > NOW() - make_interval(secs => $2)
            "#,
        )
        .bind(series_id.as_str())
        .bind(max_age_secs as f64)
        .fetch_optional(self.db.pool())
        .await?;

        let Some((refreshed_at,)) = refreshed else {
            return Ok(None);
        };

        let series = self.latest(series_id, limit).await?;
        Ok(series.map(|mut s| {
            s.fetched_at = refreshed_at;
            s
        }))
    }

    /// 갱신 시각과 무관하게 최근 `limit`개 관측값을 조회합니다.
    pub async fn latest(&self, series_id: &SeriesId, limit: usize) -> Result<Option<EconomicSeries>> {
        let records: Vec<ObservationRecord> = sqlx::query_as(
            r#"
            SELECT observation_date, value FROM economic_observations
            WHERE series_id = $1
            ORDER BY observation_date DESC
            LIMIT $2
            "#,
        )
        .bind(series_id.as_str())
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        if records.is_empty() {
            return Ok(None);
        }

        let observations = records
            .into_iter()
            .map(|r| Observation {
                date: r.observation_date,
                value: r.value,
            })
            .collect();

        Ok(Some(EconomicSeries::new(series_id.clone(), observations)))
    }
}
