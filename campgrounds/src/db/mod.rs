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

//! Database abstraction to persist campgrounds.

use crate::model::{Campground, CampgroundId, CampgroundInfo, Price};
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
#[cfg(feature = "postgres")]
use yelpcamp_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use yelpcamp_core::db::sqlite;
use yelpcamp_core::db::{DbError, DbResult, Executor};


/// Initializes the database schema.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Builds a campground out of the raw values of a row.
fn build_campground(
    id: String,
    title: String,
    price: f64,
    image: String,
    location: String,
    description: String,
) -> DbResult<Campground> {
    let id = CampgroundId::parse(&id)?;
    let info = CampgroundInfo::new(title, Price::new(price)?, image, location, description)?;
    Ok(Campground::new(id, info))
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Campground {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(postgres::map_sqlx_error)?;
        let price: f64 = row.try_get("price").map_err(postgres::map_sqlx_error)?;
        let image: String = row.try_get("image").map_err(postgres::map_sqlx_error)?;
        let location: String = row.try_get("location").map_err(postgres::map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(postgres::map_sqlx_error)?;
        build_campground(id, title, price, image, location, description)
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Campground {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(sqlite::map_sqlx_error)?;
        let price: f64 = row.try_get("price").map_err(sqlite::map_sqlx_error)?;
        let image: String = row.try_get("image").map_err(sqlite::map_sqlx_error)?;
        let location: String = row.try_get("location").map_err(sqlite::map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(sqlite::map_sqlx_error)?;
        build_campground(id, title, price, image, location, description)
    }
}

/// Checks that a statement that should have modified exactly one row did so.
fn expect_one_row(rows_affected: u64, what: &str) -> DbResult<()> {
    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError(format!("{} affected more than one row", what))),
    }
}

/// Gets all campgrounds in the order in which they were created.
pub(crate) async fn get_campgrounds(ex: &mut Executor) -> DbResult<Vec<Campground>> {
    let query_str = "
        SELECT id, title, price, image, location, description
        FROM campgrounds
        ORDER BY seq";
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let rows = sqlx::query(query_str)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Campground::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let rows = sqlx::query(query_str)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Campground::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Creates a new campground with identifier `id` and details `info`.
pub(crate) async fn create_campground(
    ex: &mut Executor,
    id: CampgroundId,
    info: &CampgroundInfo,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO campgrounds (id, title, price, image, location, description)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .bind(info.title().as_str())
                .bind(info.price().as_f64())
                .bind(info.image().as_str())
                .bind(info.location().as_str())
                .bind(info.description().as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO campgrounds (id, title, price, image, location, description)
                VALUES (?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .bind(info.title().as_str())
                .bind(info.price().as_f64())
                .bind(info.image().as_str())
                .bind(info.location().as_str())
                .bind(info.description().as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected, "Insertion")
}

/// Gets the campground identified by `id`.
pub(crate) async fn get_campground(ex: &mut Executor, id: CampgroundId) -> DbResult<Campground> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT id, title, price, image, location, description
                FROM campgrounds
                WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Campground::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, title, price, image, location, description
                FROM campgrounds
                WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Campground::try_from(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Replaces the details of the existing campground `id` with `info`.  The identifier is never
/// modified.
pub(crate) async fn update_campground(
    ex: &mut Executor,
    id: CampgroundId,
    info: &CampgroundInfo,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE campgrounds
                SET title = $1, price = $2, image = $3, location = $4, description = $5
                WHERE id = $6";
            let done = sqlx::query(query_str)
                .bind(info.title().as_str())
                .bind(info.price().as_f64())
                .bind(info.image().as_str())
                .bind(info.location().as_str())
                .bind(info.description().as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE campgrounds
                SET title = ?, price = ?, image = ?, location = ?, description = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(info.title().as_str())
                .bind(info.price().as_f64())
                .bind(info.image().as_str())
                .bind(info.location().as_str())
                .bind(info.description().as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected, "Update")
}

/// Deletes the existing campground `id`.
pub(crate) async fn delete_campground(ex: &mut Executor, id: CampgroundId) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM campgrounds WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM campgrounds WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected, "Deletion")
}
