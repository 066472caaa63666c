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

//! Support for HTML forms that need to issue methods other than GET and POST.
//!
//! Browsers can only submit forms with GET and POST, so forms that update or delete entities post
//! to a URL like `/entity/1?_method=DELETE` and this module rewrites the request method before it
//! is routed.

use axum::Router;
use axum::extract::Request;
use http::Method;
use log::debug;
use serde::Deserialize;
use tower::Layer;
use tower::util::MapRequestLayer;

/// Query parameters that can carry a method override.
#[derive(Deserialize)]
struct OverrideQuery {
    /// The method to use instead of the one in the request.
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Rewrites the method of a POST `req` to the one given in the `_method` query parameter.
///
/// Only PUT, PATCH and DELETE are accepted as overrides.  Any other value, or a query that cannot
/// be parsed, leaves the request untouched.
pub fn method_override(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }

    let query = match req.uri().query() {
        Some(query) => query,
        None => return req,
    };
    let method = match serde_urlencoded::from_str::<OverrideQuery>(query) {
        Ok(OverrideQuery { method: Some(method) }) => method,
        Ok(_) => return req,
        Err(e) => {
            debug!("Ignoring unparseable query for method override: {}", e);
            return req;
        }
    };

    let method = match method.to_ascii_uppercase().as_str() {
        "PUT" => Method::PUT,
        "PATCH" => Method::PATCH,
        "DELETE" => Method::DELETE,
        other => {
            debug!("Ignoring unsupported method override {}", other);
            return req;
        }
    };
    *req.method_mut() = method;
    req
}

/// Wraps `router` so that `method_override` applies to every request before it is routed.
pub fn with_method_override(router: Router) -> Router {
    Router::new().fallback_service(MapRequestLayer::new(method_override).layer(router))
}
