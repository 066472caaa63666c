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

//! Test utilities for the REST layer.

use crate::db;
use crate::driver::Driver;
use crate::model::testutils::test_info;
use crate::model::{Campground, CampgroundId, CampgroundInfo};
use crate::rest::app;
use axum::Router;
use std::sync::Arc;
use yelpcamp_core::db::{Db, DbError};

/// Builds the fields of a campground form that describes `info`.
pub(crate) fn form_for(info: &CampgroundInfo) -> Vec<(&'static str, String)> {
    vec![
        ("campground[title]", info.title().clone()),
        ("campground[price]", info.price().to_string()),
        ("campground[image]", info.image().clone()),
        ("campground[location]", info.location().clone()),
        ("campground[description]", info.description().clone()),
    ]
}

/// State of a running test.
pub(crate) struct TestContext {
    /// The app under test.
    app: Router,

    /// The database backing the app.
    db: Arc<dyn Db + Send + Sync>,
}

impl TestContext {
    /// Initializes the app against an in-memory database.
    pub(crate) async fn setup() -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(yelpcamp_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let app = app(Driver::new(db.clone()));
        Self { app, db }
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Closes the database so that further operations fail.
    pub(crate) async fn close_db(&self) {
        self.db.close().await;
    }

    /// Creates a campground with the details given by `test_info(n)` directly in the database.
    pub(crate) async fn create_campground(&self, n: u16) -> Campground {
        let id = CampgroundId::generate();
        let info = test_info(n);
        db::create_campground(&mut self.db.ex().await.unwrap(), id, &info).await.unwrap();
        Campground::new(id, info)
    }

    /// Gets the campground `id` directly from the database, if it exists.
    pub(crate) async fn get_campground(&self, id: CampgroundId) -> Option<Campground> {
        match db::get_campground(&mut self.db.ex().await.unwrap(), id).await {
            Ok(campground) => Some(campground),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets all campgrounds directly from the database.
    pub(crate) async fn get_campgrounds(&self) -> Vec<Campground> {
        db::get_campgrounds(&mut self.db.ex().await.unwrap()).await.unwrap()
    }
}
