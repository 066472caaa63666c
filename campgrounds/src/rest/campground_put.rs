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

//! Update of an existing campground.

use crate::driver::Driver;
use crate::model::CampgroundInfo;
use crate::rest::CampgroundIdParam;
use crate::rest::campground_form::CampgroundForm;
use axum::extract::State;
use axum::response::Redirect;
use yelpcamp_core::rest::{RestError, ValidatedForm};

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    CampgroundIdParam(id): CampgroundIdParam,
    ValidatedForm(form): ValidatedForm<CampgroundForm>,
) -> Result<Redirect, RestError> {
    let info = CampgroundInfo::try_from(form)?;
    let campground = driver.update_campground(id, info).await?;
    Ok(Redirect::to(&format!("/campgrounds/{}", campground.id())))
}

#[cfg(test)]
mod tests {
    use crate::model::CampgroundId;
    use crate::model::testutils::test_info;
    use crate::rest::testutils::*;
    use axum::http;
    use yelpcamp_core::rest::testutils::OneShotBuilder;
    use yelpcamp_core::test_payload_must_be_form;

    fn route(id: &str) -> (http::Method, String) {
        (http::Method::PUT, format!("/campgrounds/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let campground1 = context.create_campground(1).await;
        let campground2 = context.create_campground(2).await;

        let location =
            OneShotBuilder::new(context.app(), route(&campground1.id().to_string()))
                .send_form(form_for(&test_info(7)))
                .await
                .expect_redirect()
                .await;
        assert_eq!(format!("/campgrounds/{}", campground1.id()), location);

        let updated = context.get_campground(*campground1.id()).await.unwrap();
        assert_eq!(&test_info(7), updated.info());
        assert_eq!(Some(campground2.clone()), context.get_campground(*campground2.id()).await);
    }

    #[tokio::test]
    async fn test_via_method_override() {
        let context = TestContext::setup().await;
        let campground = context.create_campground(1).await;

        let route = (http::Method::POST, format!("/campgrounds/{}", campground.id()));
        OneShotBuilder::new(context.app(), route)
            .with_query([("_method", "put")])
            .send_form(form_for(&test_info(8)))
            .await
            .expect_redirect()
            .await;

        let updated = context.get_campground(*campground.id()).await.unwrap();
        assert_eq!(&test_info(8), updated.info());
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route(&CampgroundId::generate().to_string()))
            .send_form(form_for(&test_info(1)))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Campground not found$")
            .await;

        assert!(context.get_campgrounds().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_does_not_modify() {
        let context = TestContext::setup().await;
        let campground = context.create_campground(1).await;

        let mut form = form_for(&test_info(2));
        form[1].1 = "cheap".to_owned();
        form[3].1 = String::new();
        OneShotBuilder::new(context.app(), route(&campground.id().to_string()))
            .send_form(form)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("^\"price\" must be a number,\"location\" is not allowed to be empty$")
            .await;

        assert_eq!(Some(campground.clone()), context.get_campground(*campground.id()).await);
    }

    #[tokio::test]
    async fn test_backend_error() {
        let context = TestContext::setup().await;
        let campground = context.create_campground(1).await;
        context.close_db().await;

        OneShotBuilder::new(context.into_app(), route(&campground.id().to_string()))
            .send_form(form_for(&test_info(2)))
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^Something went wrong$")
            .await;
    }

    test_payload_must_be_form!(
        TestContext::setup().await.into_app(),
        route(&CampgroundId::generate().to_string())
    );
}
