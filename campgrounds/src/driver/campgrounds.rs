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

//! Operations on the collection of campgrounds.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use log::info;
use yelpcamp_core::driver::DriverResult;

impl Driver {
    /// Gets all campgrounds in the order in which they were created.
    pub(crate) async fn get_campgrounds(self) -> DriverResult<Vec<Campground>> {
        let campgrounds = db::get_campgrounds(&mut self.db.ex().await?).await?;
        Ok(campgrounds)
    }

    /// Creates a new campground with the given details and assigns it a fresh identifier.
    pub(crate) async fn create_campground(self, info: CampgroundInfo) -> DriverResult<Campground> {
        let id = CampgroundId::generate();
        db::create_campground(&mut self.db.ex().await?, id, &info).await?;
        info!("Created campground {}", id);
        Ok(Campground::new(id, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::testutils::test_info;
    use yelpcamp_core::driver::DriverError;

    #[tokio::test]
    async fn test_get_campgrounds_none() {
        let context = TestContext::setup().await;

        let campgrounds = context.driver().get_campgrounds().await.unwrap();
        assert!(campgrounds.is_empty());
    }

    #[tokio::test]
    async fn test_get_campgrounds_some() {
        let context = TestContext::setup().await;

        let c1 = context.create_campground(1).await;
        let c2 = context.create_campground(2).await;

        let campgrounds = context.driver().get_campgrounds().await.unwrap();
        assert_eq!(vec![c1, c2], campgrounds);
    }

    #[tokio::test]
    async fn test_create_campground_assigns_new_ids() {
        let context = TestContext::setup().await;

        let c1 = context.driver().create_campground(test_info(1)).await.unwrap();
        let c2 = context.driver().create_campground(test_info(1)).await.unwrap();
        assert_ne!(c1.id(), c2.id());
        assert_eq!(c1.info(), c2.info());

        assert_eq!(c1, db::get_campground(&mut context.ex().await, *c1.id()).await.unwrap());
        assert_eq!(c2, db::get_campground(&mut context.ex().await, *c2.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_campground_db_unavailable() {
        let context = TestContext::setup().await;
        context.close_db().await;

        match context.driver().create_campground(test_info(1)).await {
            Err(DriverError::BackendError(_)) => (),
            e => panic!("Unexpected result: {:?}", e),
        }
    }
}
