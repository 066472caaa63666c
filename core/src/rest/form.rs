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

//! Validation of form submissions before they reach the handlers.

use crate::rest::RestError;
use async_trait::async_trait;
use axum::Form;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Describes a form whose fields are submitted wrapped in an object, as in `object[field]=value`,
/// and whose contents are validated declaratively.
pub trait FormSchema: DeserializeOwned + Validate {
    /// Name of the object that wraps all fields of the form.
    const OBJECT: &'static str;

    /// Names of the fields in the order in which their violations are reported.
    const FIELDS: &'static [&'static str];
}

/// Extracts the fields nested under `T::OBJECT` from the raw form `pairs` and deserializes them.
///
/// Pairs that do not belong to the object are ignored.
fn parse_object<T: FormSchema>(pairs: &[(String, String)]) -> Result<T, RestError> {
    let prefix = format!("{}[", T::OBJECT);
    let fields = pairs
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(']'))
                .map(|name| (name, value.as_str()))
        })
        .collect::<Vec<(&str, &str)>>();

    let encoded = serde_urlencoded::to_string(&fields)
        .map_err(|e| RestError::InvalidRequest(e.to_string()))?;
    serde_urlencoded::from_str::<T>(&encoded).map_err(|e| RestError::InvalidRequest(e.to_string()))
}

/// Flattens `errors` into their messages, sorted by the field order declared in `T::FIELDS`.
fn violations<T: FormSchema>(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();

    let mut messages = vec![];
    for field in T::FIELDS {
        if let Some(errors) = field_errors.get(*field) {
            for error in errors.iter() {
                match &error.message {
                    Some(message) => messages.push(message.to_string()),
                    None => messages.push(format!("\"{}\" is invalid ({})", field, error.code)),
                }
            }
        }
    }
    if messages.is_empty() {
        messages.push(errors.to_string());
    }
    messages
}

/// Validates `form` and converts any violations into a single `InvalidRequest` error whose
/// message joins all of them with commas.
pub fn validate_form<T: FormSchema>(form: &T) -> Result<(), RestError> {
    form.validate().map_err(|e| RestError::InvalidRequest(violations::<T>(&e).join(",")))
}

/// A request body extractor for forms of type `T` that only succeeds if `T` passes validation.
///
/// Handlers that take this extractor never run for invalid submissions: the rejection is a
/// `RestError` and therefore renders as an error page.
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: FormSchema,
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| RestError::InvalidRequest(e.body_text()))?;
        let form = parse_object::<T>(&pairs)?;
        validate_form(&form)?;
        Ok(ValidatedForm(form))
    }
}
