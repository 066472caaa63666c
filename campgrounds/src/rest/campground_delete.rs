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

//! Deletion of an existing campground.

use crate::driver::Driver;
use crate::rest::CampgroundIdParam;
use axum::extract::State;
use axum::response::Redirect;
use yelpcamp_core::rest::{EmptyBody, RestError};

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    CampgroundIdParam(id): CampgroundIdParam,
    _: EmptyBody,
) -> Result<Redirect, RestError> {
    driver.delete_campground(id).await?;
    Ok(Redirect::to("/campgrounds"))
}
