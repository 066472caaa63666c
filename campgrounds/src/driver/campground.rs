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

//! Operations on one campground.

use crate::db;
use crate::driver::{Driver, campground_error};
use crate::model::*;
use log::info;
use yelpcamp_core::driver::DriverResult;

impl Driver {
    /// Gets the campground identified by `id`.
    pub(crate) async fn get_campground(self, id: CampgroundId) -> DriverResult<Campground> {
        let campground =
            db::get_campground(&mut self.db.ex().await?, id).await.map_err(campground_error)?;
        Ok(campground)
    }

    /// Replaces the details of the campground identified by `id` with `info`.
    pub(crate) async fn update_campground(
        self,
        id: CampgroundId,
        info: CampgroundInfo,
    ) -> DriverResult<Campground> {
        db::update_campground(&mut self.db.ex().await?, id, &info)
            .await
            .map_err(campground_error)?;
        info!("Updated campground {}", id);
        Ok(Campground::new(id, info))
    }

    /// Deletes the campground identified by `id`.
    pub(crate) async fn delete_campground(self, id: CampgroundId) -> DriverResult<()> {
        db::delete_campground(&mut self.db.ex().await?, id).await.map_err(campground_error)?;
        info!("Deleted campground {}", id);
        Ok(())
    }
}
