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

//! Server-rendered web service to list, create, update and delete campgrounds.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use std::error::Error;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use yelpcamp_core::db::Db;
use yelpcamp_core::env::{EnvResult, get_optional_var};

pub(crate) mod db;
pub(crate) mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Default address to bind the server to.
const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default port to bind the server to.
const DEFAULT_PORT: u16 = 3000;

/// Configuration options for the server.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ServerOptions {
    /// Address to bind the server to.
    pub address: IpAddr,

    /// Port to bind the server to.
    pub port: u16,

    /// Connection string for an SQLite database.  If not present, the server uses PostgreSQL.
    pub sqlite: Option<String>,
}

impl ServerOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_ADDRESS`, `<prefix>_PORT` and `<prefix>_SQLITE`.
    pub fn from_env(prefix: &str) -> EnvResult<Self> {
        Ok(Self {
            address: get_optional_var::<IpAddr>(prefix, "ADDRESS")?.unwrap_or(DEFAULT_ADDRESS),
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT),
            sqlite: get_optional_var::<String>(prefix, "SQLITE")?,
        })
    }

    /// Returns the socket address to bind the server to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

/// Connects to the database selected by `opts` and initializes its schema.
///
/// SQLite is used when `opts` names an SQLite database.  Otherwise, PostgreSQL is configured from
/// the `PGSQL_PROD_*` environment variables.
pub async fn connect_db(opts: &ServerOptions) -> Result<Arc<dyn Db + Send + Sync>, Box<dyn Error>> {
    let db = open_db(opts).await?;
    if let Err(e) = db::init_schema(&mut db.ex().await?).await {
        db.close().await;
        return Err(e.into());
    }
    Ok(db)
}

/// Opens the database selected by `opts` without initializing it.
async fn open_db(opts: &ServerOptions) -> Result<Arc<dyn Db + Send + Sync>, Box<dyn Error>> {
    #[cfg(feature = "sqlite")]
    {
        if let Some(conn_str) = opts.sqlite.as_ref() {
            info!("Using SQLite database {}", conn_str);
            let db = yelpcamp_core::db::sqlite::connect(conn_str).await?;
            return Ok(Arc::new(db));
        }
    }

    #[cfg(feature = "postgres")]
    {
        use yelpcamp_core::db::postgres::{PostgresDb, PostgresOptions};

        if opts.sqlite.is_none() {
            let pg_opts = PostgresOptions::from_env("PGSQL_PROD")?;
            info!(
                "Using PostgreSQL database {} on {}:{}",
                pg_opts.database, pg_opts.host, pg_opts.port
            );
            let db = PostgresDb::connect(pg_opts)?;
            return Ok(Arc::new(db));
        }
    }

    Err("The requested database backend is not supported by this build".into())
}

/// Waits until the process receives a request to terminate.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C; shutting down"),
        Err(e) => error!("Cannot wait for Ctrl-C: {}", e),
    }
}

/// Serves the application on `bind_addr` backed by `db` until the process is asked to terminate.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(db);
    let app = app(driver);

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Serving on http://{}/", bind_addr);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
