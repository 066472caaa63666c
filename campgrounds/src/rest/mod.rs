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

//! Web interface of the service.

use crate::driver::{CAMPGROUND_NOT_FOUND, Driver};
use crate::model::CampgroundId;
use async_trait::async_trait;
use axum::Router;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use tower_http::catch_panic::CatchPanicLayer;
use yelpcamp_core::rest::{RestError, panic_response, with_method_override};

mod campground_delete;
mod campground_edit_get;
mod campground_form;
mod campground_get;
mod campground_new_get;
mod campground_put;
mod campgrounds_get;
mod campgrounds_post;
mod fallback;
mod home_get;
#[cfg(test)]
mod testutils;
mod views;

/// Extractor for the campground identifier in the `:id` segment of the path.
///
/// Identifiers that cannot be decoded or parsed cannot name any campground, so they are rejected
/// as not found.
pub(crate) struct CampgroundIdParam(pub(crate) CampgroundId);

#[async_trait]
impl<S> FromRequestParts<S> for CampgroundIdParam
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) =
            Path::<String>::from_request_parts(parts, state).await.map_err(|e| match e {
                PathRejection::FailedToDeserializePathParams(_) => {
                    RestError::NotFound(CAMPGROUND_NOT_FOUND.to_owned())
                }
                e => RestError::InternalError(e.body_text()),
            })?;
        match CampgroundId::parse(&id) {
            Ok(id) => Ok(CampgroundIdParam(id)),
            Err(_) => Err(RestError::NotFound(CAMPGROUND_NOT_FOUND.to_owned())),
        }
    }
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;

    let router = Router::new()
        .route("/", get(home_get::handler).fallback(fallback::handler))
        .route(
            "/campgrounds",
            get(campgrounds_get::handler)
                .post(campgrounds_post::handler)
                .fallback(fallback::handler),
        )
        .route("/campgrounds/new", get(campground_new_get::handler).fallback(fallback::handler))
        .route(
            "/campgrounds/:id",
            get(campground_get::handler)
                .put(campground_put::handler)
                .delete(campground_delete::handler)
                .fallback(fallback::handler),
        )
        .route(
            "/campgrounds/:id/edit",
            get(campground_edit_get::handler).fallback(fallback::handler),
        )
        .fallback(fallback::handler)
        .with_state(driver)
        .layer(CatchPanicLayer::custom(panic_response));

    with_method_override(router)
}
