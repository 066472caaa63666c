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

//! Creation of a new campground.

use crate::driver::Driver;
use crate::model::CampgroundInfo;
use crate::rest::campground_form::CampgroundForm;
use axum::extract::State;
use axum::response::Redirect;
use yelpcamp_core::rest::{RestError, ValidatedForm};

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    ValidatedForm(form): ValidatedForm<CampgroundForm>,
) -> Result<Redirect, RestError> {
    let info = CampgroundInfo::try_from(form)?;
    let campground = driver.create_campground(info).await?;
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

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/campgrounds".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let location = OneShotBuilder::new(context.app(), route())
            .send_form(form_for(&test_info(3)))
            .await
            .expect_redirect()
            .await;

        let id = location.strip_prefix("/campgrounds/").unwrap();
        let id = CampgroundId::parse(id).unwrap();
        let campground = context.get_campground(id).await.unwrap();
        assert_eq!(&test_info(3), campground.info());
    }

    #[tokio::test]
    async fn test_each_creation_gets_a_new_id() {
        let context = TestContext::setup().await;

        let location1 = OneShotBuilder::new(context.app(), route())
            .send_form(form_for(&test_info(1)))
            .await
            .expect_redirect()
            .await;
        let location2 = OneShotBuilder::new(context.app(), route())
            .send_form(form_for(&test_info(1)))
            .await
            .expect_redirect()
            .await;

        assert_ne!(location1, location2);
        assert_eq!(2, context.get_campgrounds().await.len());
    }

    #[tokio::test]
    async fn test_ignores_unknown_fields() {
        let context = TestContext::setup().await;

        let mut form = form_for(&test_info(1));
        form.push(("campground[rating]", "5".to_owned()));
        form.push(("other", "value".to_owned()));
        OneShotBuilder::new(context.app(), route()).send_form(form).await.expect_redirect().await;

        let infos: Vec<_> =
            context.get_campgrounds().await.into_iter().map(|c| c.info().clone()).collect();
        assert_eq!(vec![test_info(1)], infos);
    }

    #[tokio::test]
    async fn test_bad_price() {
        let context = TestContext::setup().await;

        let mut form = form_for(&test_info(1));
        form[1].1 = "-5".to_owned();
        OneShotBuilder::new(context.app(), route())
            .send_form(form)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("^\"price\" must be greater than or equal to 0$")
            .await;

        assert!(context.get_campgrounds().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let context = TestContext::setup().await;

        let form = vec![("campground[title]", "Only a title".to_owned())];
        OneShotBuilder::new(context.app(), route())
            .send_form(form)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error(concat!(
                "^\"price\" is required,",
                "\"image\" is required,",
                "\"location\" is required,",
                "\"description\" is required$",
            ))
            .await;

        assert!(context.get_campgrounds().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_title() {
        let context = TestContext::setup().await;

        let mut form = form_for(&test_info(1));
        form[0].1 = String::new();
        OneShotBuilder::new(context.app(), route())
            .send_form(form)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("^\"title\" is not allowed to be empty$")
            .await;
    }

    #[tokio::test]
    async fn test_backend_error() {
        let context = TestContext::setup().await;
        context.close_db().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_form(form_for(&test_info(1)))
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^Something went wrong$")
            .await;
    }

    test_payload_must_be_form!(TestContext::setup().await.into_app(), route());
}
