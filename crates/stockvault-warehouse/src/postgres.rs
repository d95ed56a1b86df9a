use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use stockvault_core::PriceBar;
use tracing::{debug, info, warn};

use crate::schema::{POSTGRES_CREATE_TABLE, POSTGRES_UPSERT};
use crate::store::{PriceStore, StoreFuture};
use crate::StoreError;

const STORE_ID: &str = "postgres";

/// Connection settings for [`PostgresStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` applied to every statement.
    pub statement_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 5432,
            user: String::from("postgres"),
            password: String::new(),
            database: String::from("postgres"),
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(60),
        }
    }
}

impl PostgresConfig {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Networked relational store backed by a single Postgres connection.
#[derive(Debug)]
pub struct PostgresStore {
    options: PgConnectOptions,
    connect_timeout: Duration,
    statement_timeout: Duration,
    pool: Option<PgPool>,
}

impl PostgresStore {
    pub fn new(config: &PostgresConfig) -> Self {
        Self {
            options: config.connect_options(),
            connect_timeout: config.connect_timeout,
            statement_timeout: config.statement_timeout,
            pool: None,
        }
    }

    /// Build a store from a `postgres://` URL with default timeouts.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| StoreError::InvalidConfig(format!("postgres url: {e}")))?;
        let defaults = PostgresConfig::default();

        Ok(Self {
            options,
            connect_timeout: defaults.connect_timeout,
            statement_timeout: defaults.statement_timeout,
            pool: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.pool.is_some()
    }

    async fn open(&mut self) -> Result<(), StoreError> {
        if self.pool.is_some() {
            return Ok(());
        }

        let options = self.options.clone().options([(
            "statement_timeout",
            format!("{}ms", self.statement_timeout.as_millis()),
        )]);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| match e {
                sqlx::Error::PoolTimedOut => StoreError::Timeout {
                    store: STORE_ID,
                    after: self.connect_timeout,
                },
                other => StoreError::Postgres(other),
            })?;

        if let Err(error) = sqlx::query(POSTGRES_CREATE_TABLE).execute(&pool).await {
            pool.close().await;
            return Err(error.into());
        }

        info!(store = STORE_ID, "store initialized");
        self.pool = Some(pool);
        Ok(())
    }

    async fn upsert(&self, bars: &[PriceBar]) -> Result<(), StoreError> {
        if bars.is_empty() {
            return Ok(());
        }

        let pool = self
            .pool
            .as_ref()
            .ok_or(StoreError::NotInitialized { store: STORE_ID })?;

        let mut tx = pool.begin().await?;
        for bar in bars {
            let result = sqlx::query(POSTGRES_UPSERT)
                .bind(bar.timestamp.to_primitive())
                .bind(bar.symbol.as_str())
                .bind(bar.open)
                .bind(bar.high)
                .bind(bar.low)
                .bind(bar.close)
                .bind(bar.volume)
                .bind(&bar.currency)
                .bind(&bar.instrument_name)
                .bind(bar.instrument_type.as_str())
                .execute(&mut *tx)
                .await;

            if let Err(error) = result {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(store = STORE_ID, error = %rollback_error, "rollback failed");
                }
                return Err(error.into());
            }
        }
        tx.commit().await?;

        debug!(store = STORE_ID, rows = bars.len(), "batch committed");
        Ok(())
    }
}

impl PriceStore for PostgresStore {
    fn identify(&self) -> &'static str {
        STORE_ID
    }

    fn initialize(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(self.open())
    }

    fn batch_upsert<'a>(&'a mut self, bars: &'a [PriceBar]) -> StoreFuture<'a, ()> {
        Box::pin(self.upsert(bars))
    }

    fn close(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            if let Some(pool) = self.pool.take() {
                pool.close().await;
                info!(store = STORE_ID, "store closed");
            }
            Ok(())
        })
    }
}
