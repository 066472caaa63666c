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

//! Catch-all for requests that no route handles.

use yelpcamp_core::rest::RestError;

/// Handler for any path or method that the app does not serve.
pub(crate) async fn handler() -> RestError {
    RestError::NotFound("Page Not Found".to_owned())
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use yelpcamp_core::rest::testutils::OneShotBuilder;

    #[tokio::test]
    async fn test_unknown_path() {
        let context = TestContext::setup().await;

        for path in ["/nonexistent", "/campgrounds/new/extra", "/campgrounds/a/b/c"] {
            OneShotBuilder::new(context.app(), (http::Method::GET, path))
                .send_empty()
                .await
                .expect_status(http::StatusCode::NOT_FOUND)
                .expect_error("^Page Not Found$")
                .await;
        }
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), (http::Method::DELETE, "/"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Page Not Found$")
            .await;
    }
}
