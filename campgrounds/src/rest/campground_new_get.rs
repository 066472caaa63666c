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

//! Form to create a new campground.

use crate::rest::views;
use axum::response::Html;
use yelpcamp_core::rest::{EmptyBody, RestError};

/// GET handler for this page.
pub(crate) async fn handler(_: EmptyBody) -> Result<Html<String>, RestError> {
    Ok(views::new_form())
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use yelpcamp_core::rest::testutils::OneShotBuilder;
    use yelpcamp_core::test_payload_must_be_empty;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/campgrounds/new".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let body = OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert!(body.contains("action=\"/campgrounds\""));
        for field in ["title", "price", "image", "location", "description"] {
            assert!(body.contains(&format!("name=\"campground[{}]\"", field)));
        }
    }

    #[tokio::test]
    async fn test_not_confused_with_id() {
        let context = TestContext::setup().await;
        context.create_campground(1).await;

        OneShotBuilder::new(context.into_app(), route())
            .send_empty()
            .await
            .expect_html("<h1>New Campground</h1>")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
