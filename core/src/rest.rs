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

//! Building blocks for the web layer of a service.
//!
//! Services expose an `app` function that builds their `axum::Router`.  Each endpoint lives in its
//! own file named `<resource>_<method>.rs`, next to the tests that exercise it through a `route`
//! helper returning the method and path under test.  Keeping one endpoint per file means a test
//! can only ever hit the endpoint it is named after.
//!
//! Handlers fail with `RestError`.  Validation failures, missing entities, database outages and
//! unmatched routes all end up in its `IntoResponse` implementation, which is the only place that
//! produces error pages.

use crate::driver::DriverError;
use crate::model::ModelError;
use crate::template;
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, Request};
use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use log::{error, warn};
use std::any::Any;

mod form;
pub use form::{FormSchema, ValidatedForm, validate_form};

mod method_override;
pub use method_override::{method_override, with_method_override};

/// Message shown to the user when an error does not carry a message of its own or when the error
/// details must not be exposed.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

/// Template for the error page.
const ERROR_TEMPLATE: &str = include_str!("rest/error.html");

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity or page does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,
}

impl RestError {
    /// Returns the HTTP status code that represents this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Returns the message to show to the user.
    ///
    /// Internal errors never expose their details.
    pub fn public_message(&self) -> String {
        let message = match self {
            RestError::InternalError(_) => return DEFAULT_ERROR_MESSAGE.to_owned(),
            e => e.to_string(),
        };
        if message.is_empty() { DEFAULT_ERROR_MESSAGE.to_owned() } else { message }
    }
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::InvalidInput(_) => RestError::InvalidRequest(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with status {}: {}", status.as_u16(), self);
        }
        error_page(status, &self.public_message())
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Renders the error page for a response with `status` and the user-facing `message`.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let code = status.as_u16().to_string();
    let message = template::escape(message);
    let html = template::apply(
        ERROR_TEMPLATE,
        &[
            ("status", code.as_str()),
            ("reason", status.canonical_reason().unwrap_or("Error")),
            ("message", message.as_str()),
        ],
    );
    (status, Html(html)).into_response()
}

/// Converts a panic caught while serving a request into an error page.
///
/// This is meant to be used with `tower_http::catch_panic::CatchPanicLayer::custom` so that a
/// panicking handler still yields a response.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    warn!("Request handler panicked: {}", details);
    error_page(StatusCode::INTERNAL_SERVER_ERROR, DEFAULT_ERROR_MESSAGE)
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.  This future-proofs the service.
pub struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// Common test code for the REST server.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use axum::Router;
    use axum::http::{self, HeaderName, HeaderValue};
    use serde::Serialize;
    use tower::util::ServiceExt;

    /// Maximum body size for testing purposes.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a single request to the server.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router for the app being tested.
        app: Router,

        /// Builder for the request that will be sent to the app.
        builder: axum::http::request::Builder,
    }

    impl OneShotBuilder {
        /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Extends the URI in the request with a `query`.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            let uri = self.builder.uri_ref().unwrap().to_string();
            assert!(!uri.contains('?'), "URI already contains a query: {}", uri);
            assert!(!uri.contains('#'), "URI contains a fragment: {}", uri);
            self.builder = self.builder.uri(format!(
                "{}?{}",
                uri,
                serde_urlencoded::to_string(query).unwrap()
            ));
            self
        }

        /// Sets the header `name` to `value` in the outgoing request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            self.builder = self.builder.header(name, value);
            self
        }

        /// Sends the request with `body` as the payload, labelled as `content_type`.
        async fn send_body(self, content_type: Option<&str>, body: String) -> ResponseChecker {
            let mut builder = self.builder;
            if let Some(content_type) = content_type {
                builder = builder.header(http::header::CONTENT_TYPE, content_type);
            }
            let request = builder.body(axum::body::Body::from(body)).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Sends the request without a payload.
        pub async fn send_empty(self) -> ResponseChecker {
            self.send_body(None, String::new()).await
        }

        /// Sends the request with a plain `text` payload.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            self.send_body(Some(mime::TEXT_PLAIN.as_ref()), text.into()).await
        }

        /// Sends the request with `form` URL-encoded in the payload, as a browser would.
        pub async fn send_form<T: Serialize>(self, form: T) -> ResponseChecker {
            let body = serde_urlencoded::to_string(&form).unwrap();
            self.send_body(Some(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref()), body).await
        }
    }

    /// Extracts the user-facing message out of an error page, undoing HTML escaping.
    fn parse_error_message(body: &str) -> Option<String> {
        let re = regex::Regex::new(r#"(?s)<p class="message">(.*?)</p>"#).unwrap();
        let captures = re.captures(body)?;
        let message = captures[1]
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");
        Some(message)
    }

    /// Validator for the outcome of a request sent by a `OneShotBuilder`.
    #[must_use]
    pub struct ResponseChecker {
        /// Actual response that we received from the app.
        response: Response,

        /// Expected HTTP status code in the response above.
        exp_status: http::StatusCode,
    }

    impl From<Response> for ResponseChecker {
        fn from(response: Response) -> Self {
            Self { response, exp_status: http::StatusCode::OK }
        }
    }

    impl ResponseChecker {
        /// Sets the expected exit HTTP status to `status`.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Performs common validation operations on the response.
        pub fn verify(&self) {
            assert_eq!(self.exp_status, self.response.status());
        }

        /// Consumes the response and returns its body as UTF-8.
        async fn into_text(self) -> String {
            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            String::from_utf8(body.to_vec()).unwrap()
        }

        /// Finishes checking the response and expects it to contain an empty body.
        pub async fn expect_empty(self) {
            self.verify();

            let body = self.into_text().await;
            assert!(body.is_empty(), "Body not empty; got {}", body);
        }

        /// Finishes checking the response and expects its body to be an error page whose message
        /// matches `exp_re`.
        pub async fn expect_error(self, exp_re: &str) {
            self.verify();

            let body = self.into_text().await;
            let message = match parse_error_message(&body) {
                Some(message) => message,
                None => panic!("Invalid error page; content was {}", body),
            };
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(
                re.is_match(&message),
                "Error message '{}' does not match re '{}'",
                message,
                exp_re
            );
        }

        /// Finishes checking the response and expects it to be an HTML page, which is not an
        /// error page, whose body matches `exp_re`.
        pub async fn expect_html(self, exp_re: &str) {
            assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

            self.verify();

            let content_type = self
                .response
                .headers()
                .get(http::header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_owned())
                .unwrap_or_default();
            assert!(
                content_type.starts_with(mime::TEXT_HTML.as_ref()),
                "Unexpected content type {}",
                content_type
            );

            let body = self.into_text().await;
            assert!(
                parse_error_message(&body).is_none(),
                "Use expect_error to validate error pages"
            );
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
        }

        /// Finishes checking the response and expects it to be a `303 See Other` redirect.
        ///
        /// Returns the target of the redirection.
        pub async fn expect_redirect(mut self) -> String {
            self.exp_status = http::StatusCode::SEE_OTHER;
            self.verify();

            match self.response.headers().get(http::header::LOCATION) {
                Some(location) => location.to_str().unwrap().to_owned(),
                None => panic!("Redirect without a Location header"),
            }
        }

        /// Finishes checking the response and returns the body of the response as UTF-8.
        pub async fn take_body_as_text(self) -> String {
            self.verify();

            self.into_text().await
        }
    }

    /// Generates a test to verify that an API that does not expect a payload fails as necessary.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("should not be here")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("should be empty")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;

    /// Generates a test to verify that an API that expects a form in its body fails when it gets
    /// something else.
    #[macro_export]
    macro_rules! test_payload_must_be_form {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_form() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("this is not a form")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .with_header(
                        axum::http::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .send_text("this is not a form")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("is required")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_form;
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use axum::Router;
    use axum::routing::get;
    use tower_http::catch_panic::CatchPanicLayer;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InternalError("x".to_owned()).status()
        );
        assert_eq!(StatusCode::BAD_REQUEST, RestError::InvalidRequest("x".to_owned()).status());
        assert_eq!(StatusCode::NOT_FOUND, RestError::NotFound("x".to_owned()).status());
        assert_eq!(StatusCode::PAYLOAD_TOO_LARGE, RestError::PayloadNotEmpty.status());
    }

    #[test]
    fn test_public_message_hides_internal_details() {
        assert_eq!(
            DEFAULT_ERROR_MESSAGE,
            RestError::InternalError("connection refused".to_owned()).public_message()
        );
        assert_eq!(
            "\"price\" must be a number",
            RestError::InvalidRequest("\"price\" must be a number".to_owned()).public_message()
        );
    }

    #[test]
    fn test_public_message_defaults_when_empty() {
        let err = RestError::InvalidRequest(String::new());
        assert_eq!(DEFAULT_ERROR_MESSAGE, err.public_message());
        assert_eq!(DEFAULT_ERROR_MESSAGE, RestError::NotFound(String::new()).public_message());
    }

    #[test]
    fn test_from_driver_error() {
        assert_eq!(
            RestError::InternalError("db down".to_owned()),
            RestError::from(DriverError::BackendError("db down".to_owned()))
        );
        assert_eq!(
            RestError::InvalidRequest("bad".to_owned()),
            RestError::from(DriverError::InvalidInput("bad".to_owned()))
        );
        assert_eq!(
            RestError::NotFound("gone".to_owned()),
            RestError::from(DriverError::NotFound("gone".to_owned()))
        );
    }

    async fn failing_handler() -> RestResult<&'static str> {
        Err(RestError::InvalidRequest("<b>bad</b> & wrong".to_owned()))
    }

    async fn internal_error_handler() -> RestResult<&'static str> {
        Err(RestError::InternalError("secret details".to_owned()))
    }

    async fn panicking_handler() -> &'static str {
        panic!("Oops");
    }

    fn test_app() -> Router {
        Router::new()
            .route("/fail", get(failing_handler))
            .route("/internal", get(internal_error_handler))
            .route("/panic", get(panicking_handler))
            .route("/empty", get(|_: EmptyBody| async { "ok" }))
            .layer(CatchPanicLayer::custom(panic_response))
    }

    #[tokio::test]
    async fn test_error_page_escapes_message() {
        let body = OneShotBuilder::new(test_app(), (http::Method::GET, "/fail"))
            .send_empty()
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .take_body_as_text()
            .await;
        assert!(body.contains("400 Bad Request"));
        assert!(body.contains("&lt;b&gt;bad&lt;/b&gt; &amp; wrong"));
        assert!(!body.contains("<b>bad</b>"));
    }

    #[tokio::test]
    async fn test_error_page_message_roundtrip() {
        OneShotBuilder::new(test_app(), (http::Method::GET, "/fail"))
            .send_empty()
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_error("^<b>bad</b> & wrong$")
            .await;
    }

    #[tokio::test]
    async fn test_internal_error_uses_default_message() {
        let body = OneShotBuilder::new(test_app(), (http::Method::GET, "/internal"))
            .send_empty()
            .await
            .expect_status(StatusCode::INTERNAL_SERVER_ERROR)
            .take_body_as_text()
            .await;
        assert!(body.contains(DEFAULT_ERROR_MESSAGE));
        assert!(!body.contains("secret details"));
    }

    #[tokio::test]
    async fn test_panic_becomes_error_page() {
        OneShotBuilder::new(test_app(), (http::Method::GET, "/panic"))
            .send_empty()
            .await
            .expect_status(StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error(DEFAULT_ERROR_MESSAGE)
            .await;
    }

    #[tokio::test]
    async fn test_empty_body_ok() {
        let body = OneShotBuilder::new(test_app(), (http::Method::GET, "/empty"))
            .send_empty()
            .await
            .take_body_as_text()
            .await;
        assert_eq!("ok", body);
    }

    test_payload_must_be_empty!(test_app(), (http::Method::GET, "/empty"));
}
