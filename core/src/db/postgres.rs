// YelpCamp
// Copyright 2024 The YelpCamp Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Common utilities to interact with a PostgreSQL database.

use crate::db::{Db, DbError, DbResult, Executor, TxExecutor, schema_statements};
use crate::env::{EnvResult, get_optional_var, get_required_var};
use async_trait::async_trait;
use derivative::Derivative;
use log::warn;
use sqlx::Transaction;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{
    PgConnectOptions, PgConnection, PgDatabaseError, PgPool, PgPoolOptions, Postgres,
};
use std::future::Future;
use std::time::Duration;

/// Default value for the `max_retries` configuration property.
const DEFAULT_MAX_RETRIES: u16 = 60;

/// How long to wait for a free connection before considering the database unavailable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Classifies the sqlx error `e` into a `DbError`.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => match e.try_downcast_ref::<PgDatabaseError>() {
            Some(pg) => match pg.code() {
                "23503" /* foreign_key_violation */ => DbError::NotFound,
                "23505" /* unique_violation */ => DbError::AlreadyExists,
                "53300" /* too_many_connections */ => DbError::Unavailable,
                number => DbError::BackendError(format!("pgsql error {}: {}", number, e)),
            },
            None => DbError::BackendError(e.to_string()),
        },
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to a PostgreSQL database.
#[derive(Derivative)]
#[derivative(Debug, Default)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct PostgresOptions {
    /// Server hostname or address.
    pub host: String,

    /// Server port, usually 5432.
    pub port: u16,

    /// Name of the database holding the application tables.
    pub database: String,

    /// Role to log in as.
    pub username: String,

    /// Secret for `username`.  Never printed.
    #[derivative(Debug = "ignore")]
    pub password: String,

    /// Lower bound on the pool size.  Uses the sqlx default when unset.
    pub min_connections: Option<u32>,

    /// Upper bound on the pool size.  Uses the sqlx default when unset.
    pub max_connections: Option<u32>,

    /// How many times an operation is retried while the server reports itself as unavailable.
    pub max_retries: u16,
}

impl PostgresOptions {
    /// Reads the options from the `<prefix>_*` environment variables.
    ///
    /// `HOST`, `PORT`, `DATABASE`, `USERNAME` and `PASSWORD` must be set.  `MIN_CONNECTIONS`,
    /// `MAX_CONNECTIONS` and `MAX_RETRIES` may be omitted.
    pub fn from_env(prefix: &str) -> EnvResult<PostgresOptions> {
        Ok(PostgresOptions {
            host: get_required_var::<String>(prefix, "HOST")?,
            port: get_required_var::<u16>(prefix, "PORT")?,
            database: get_required_var::<String>(prefix, "DATABASE")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
            max_retries: get_optional_var::<u16>(prefix, "MAX_RETRIES")?
                .unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }

    /// Returns the sizing configuration for the connection pool.
    fn pool_options(&self) -> PgPoolOptions {
        let mut pool_options = PgPoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT);
        if let Some(min_connections) = self.min_connections {
            pool_options = pool_options.min_connections(min_connections);
        }
        if let Some(max_connections) = self.max_connections {
            pool_options = pool_options.max_connections(max_connections);
        }
        pool_options
    }

    /// Returns the parameters for every new connection.
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }
}

/// Executor for PostgreSQL queries.
#[derive(Debug)]
pub enum PostgresExecutor {
    /// A connection checked out from the pool.
    PoolExec(PoolConnection<Postgres>),

    /// An open transaction.
    TxExec(Transaction<'static, Postgres>),
}

impl PostgresExecutor {
    /// Gets the connection to pass to `sqlx` queries.
    pub fn conn(&mut self) -> &mut PgConnection {
        match self {
            PostgresExecutor::PoolExec(conn) => &mut **conn,
            PostgresExecutor::TxExec(tx) => &mut **tx,
        }
    }

    /// Commits the wrapped transaction.  Only `TxExecutor` calls this, so the executor always
    /// wraps a transaction.
    pub(super) async fn commit(self) -> DbResult<()> {
        match self {
            PostgresExecutor::PoolExec(_) => unreachable!("Do not call commit on direct executors"),
            PostgresExecutor::TxExec(tx) => tx.commit().await.map_err(map_sqlx_error),
        }
    }
}

/// Randomized and growing delays between attempts to reach a database that is unavailable.
struct Backoff {
    /// Delay to apply before the next attempt.
    delay: Duration,

    /// Number of attempts that can still be made.
    attempts_left: u16,
}

impl Backoff {
    /// Upper bound past which the delay stops growing.
    const MAX_DELAY: Duration = Duration::from_secs(5);

    /// Creates a backoff that allows `max_retries` more attempts.
    fn new(max_retries: u16) -> Self {
        let delay = Duration::from_millis(100 + u64::from(rand::random::<u16>() % 900));
        Self { delay, attempts_left: max_retries }
    }

    /// Sleeps before the next attempt.  Returns false without sleeping if the attempts are
    /// exhausted.
    async fn wait(&mut self) -> bool {
        if self.attempts_left == 0 {
            return false;
        }
        self.attempts_left -= 1;

        warn!(
            "Database is unavailable; waiting {}ms before retrying with {} attempts left",
            self.delay.as_millis(),
            self.attempts_left
        );
        tokio::time::sleep(self.delay).await;

        if self.delay < Self::MAX_DELAY {
            self.delay += Duration::from_millis(u64::from(rand::random::<u16>() % 1000));
        }
        true
    }
}

/// Runs `op` until it succeeds, fails with something other than unavailability, or runs out of
/// the `max_retries` extra attempts.
async fn with_retries<Op, OpFut, T>(op: Op, max_retries: u16) -> DbResult<T>
where
    Op: Fn() -> OpFut,
    OpFut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut backoff = Backoff::new(max_retries);
    loop {
        match op().await.map_err(map_sqlx_error) {
            Err(DbError::Unavailable) if backoff.wait().await => continue,
            result => return result,
        }
    }
}

/// `Db` implementation backed by a PostgreSQL connection pool.
pub struct PostgresDb {
    /// Pool shared by all executors handed out by this database.
    pool: PgPool,

    /// Extra attempts to make when the pool cannot hand out a connection.
    max_retries: u16,
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("PostgreSQL pool dropped while still open; call close() first");
        }
    }
}

impl PostgresDb {
    /// Creates a lazily-initialized pool based on `opts`.  No connection is established until the
    /// first operation.
    pub fn connect(opts: PostgresOptions) -> DbResult<Self> {
        let pool = opts.pool_options().connect_lazy_with(opts.connect_options());
        Ok(Self { pool, max_retries: opts.max_retries })
    }

    /// Gets a pooled executor without wrapping it in the generic `Executor`.
    pub async fn typed_ex(&self) -> DbResult<PostgresExecutor> {
        let conn = with_retries(|| self.pool.acquire(), self.max_retries).await?;
        Ok(PostgresExecutor::PoolExec(conn))
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        let ex = self.typed_ex().await?;
        Ok(Executor::Postgres(ex))
    }

    async fn begin(&self) -> DbResult<TxExecutor> {
        let tx = with_retries(|| self.pool.begin(), self.max_retries).await?;
        Ok(TxExecutor(Executor::Postgres(PostgresExecutor::TxExec(tx))))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Runs every statement in `schema`, as split by `schema_statements`.
pub async fn run_schema(e: &mut PostgresExecutor, schema: &str) -> DbResult<()> {
    for stmt in schema_statements(schema)? {
        sqlx::query(&stmt).execute(e.conn()).await.map_err(map_sqlx_error)?;
    }
    Ok(())
}

/// Test utilities for the PostgreSQL connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Connects to the server described by the `PGSQL_TEST_*` variables.  Panics on failure.
    ///
    /// Tables land in `pg_temp` and vanish when the session ends, which only holds if the pool
    /// keeps exactly one connection alive for the lifetime of the test.
    pub async fn setup() -> PostgresDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let mut opts = PostgresOptions::from_env("PGSQL_TEST").unwrap();
        opts.min_connections = Some(1);
        opts.max_connections = Some(1);
        let db = PostgresDb::connect(opts).unwrap();

        let mut ex = db.typed_ex().await.unwrap();
        sqlx::query("SET search_path TO pg_temp").execute(ex.conn()).await.unwrap();
        db
    }
}
