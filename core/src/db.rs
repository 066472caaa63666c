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

//! Database access shared by all services.
//!
//! Services talk to a `Db` and never to a concrete backend.  Production deployments use
//! PostgreSQL; local runs and tests use SQLite, usually in memory.  The backends are compiled in
//! only when their feature is enabled.

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Failures reported by the persistence layer.
///
/// Backends translate the conditions that callers can act on into specific variants and leave
/// everything else in `BackendError`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// An insertion collided with an existing row.
    #[error("Already exists")]
    AlreadyExists,

    /// Any failure that has no more specific variant.
    #[error("Database error: {0}")]
    BackendError(String),

    /// A stored row could not be turned back into a valid model object.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// The row targeted by an operation does not exist.
    #[error("Entity not found")]
    NotFound,

    /// The database cannot take more work right now, typically because the pool is exhausted.
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// Handle to issue queries against whichever backend is in use.
///
/// sqlx queries are typed by backend, so callers `match` on this and write one arm per backend.
/// The wrapped executor may be a pooled connection or an open transaction.
pub enum Executor {
    /// PostgreSQL connection or transaction.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// SQLite connection or transaction.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteExecutor),
}

/// An `Executor` bound to an open transaction.
///
/// Dropping this without calling `commit` rolls the transaction back.
pub struct TxExecutor(Executor);

impl TxExecutor {
    /// Gives access to the executor for the queries that are part of the transaction.
    pub fn ex(&mut self) -> &mut Executor {
        &mut self.0
    }

    /// Makes all changes done through this transaction permanent.
    pub async fn commit(self) -> DbResult<()> {
        match self.0 {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => ex.commit().await,

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => ex.commit().await,
        }
    }
}

/// Breaks `schema` into the statements to run one by one.
///
/// `--` comments are dropped before splitting at semicolons, so comments may contain semicolons
/// but statements may not.
#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub(crate) fn schema_statements(schema: &str) -> DbResult<Vec<String>> {
    let comment_re = regex::RegexBuilder::new("--.*$")
        .multi_line(true)
        .build()
        .map_err(|e| DbError::BackendError(format!("Invalid comment regex: {}", e)))?;
    Ok(comment_re
        .replace_all(schema, "")
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_owned)
        .collect())
}

/// A connection pool to some database.
///
/// An instance is built once at startup and handed to the services that need it, so tests can
/// hand them their own in-memory database instead.
#[async_trait]
pub trait Db {
    /// Gets an executor that runs each query on its own, outside of any transaction.
    async fn ex(&self) -> DbResult<Executor>;

    /// Opens a new transaction.
    async fn begin(&self) -> DbResult<TxExecutor>;

    /// Shuts down the pool.  Later calls to `ex` and `begin` fail.
    async fn close(&self);
}

/// Helpers to run the same test functions against every backend.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Defines the `#[tokio::test]` `name`, which calls `module::name` with the database produced
    /// by `setup`.  An optional attribute, such as `#[ignore]`, is attached to the test.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Defines one test per `name` with `generate_one_test`.
    ///
    /// `setup` must evaluate to a database that already holds the schema the tests expect.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}
