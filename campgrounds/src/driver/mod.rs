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

//! Business logic for the service.

use std::sync::Arc;
use yelpcamp_core::db::{Db, DbError};
use yelpcamp_core::driver::DriverError;

mod campground;
mod campgrounds;
#[cfg(test)]
pub(crate) mod testutils;

/// Message reported when a campground does not exist.
pub(crate) const CAMPGROUND_NOT_FOUND: &str = "Campground not found";

/// Converts a database error `e` for an operation on a single campground into a driver error,
/// naming the campground when it does not exist.
fn campground_error(e: DbError) -> DriverError {
    match e {
        DbError::NotFound => DriverError::NotFound(CAMPGROUND_NOT_FOUND.to_owned()),
        e => DriverError::from(e),
    }
}

/// Business logic.
///
/// Every operation issues a single statement through `Db::ex`, so each one is atomic on its own
/// but two calls are not atomic together.  Operations consume the driver to make chaining them
/// an explicit choice of the caller.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>) -> Self {
        Self { db }
    }
}
