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

//! Schema of the form used to create and update campgrounds.

use crate::model::{CampgroundInfo, Price};
use serde::Deserialize;
use validator::{Validate, ValidationError};
use yelpcamp_core::model::{ModelError, ModelResult};
use yelpcamp_core::rest::FormSchema;

/// Checks that a non-empty `price` is a finite number that is not negative.
///
/// Empty prices are reported by the `length` check instead.
fn validate_price(price: &str) -> Result<(), ValidationError> {
    if price.is_empty() {
        return Ok(());
    }
    match price.trim().parse::<f64>() {
        Ok(value) if !value.is_finite() => Err(ValidationError::new("number")
            .with_message("\"price\" must be a number".into())),
        Ok(value) if value < 0.0 => Err(ValidationError::new("min")
            .with_message("\"price\" must be greater than or equal to 0".into())),
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("number")
            .with_message("\"price\" must be a number".into())),
    }
}

/// Campground submission, as sent by the new and edit forms in `campground[<field>]` fields.
///
/// All fields are optional at the deserialization level so that missing fields are reported as
/// violations instead of as deserialization errors.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CampgroundForm {
    /// Name of the campground.
    #[validate(
        required(message = "\"title\" is required"),
        length(min = 1, message = "\"title\" is not allowed to be empty")
    )]
    title: Option<String>,

    /// Nightly price, as typed by the user.
    #[validate(
        required(message = "\"price\" is required"),
        length(min = 1, message = "\"price\" is not allowed to be empty"),
        custom(function = "validate_price")
    )]
    price: Option<String>,

    /// URL of a picture of the campground.
    #[validate(
        required(message = "\"image\" is required"),
        length(min = 1, message = "\"image\" is not allowed to be empty")
    )]
    image: Option<String>,

    /// Where the campground is.
    #[validate(
        required(message = "\"location\" is required"),
        length(min = 1, message = "\"location\" is not allowed to be empty")
    )]
    location: Option<String>,

    /// Free-form description.
    #[validate(
        required(message = "\"description\" is required"),
        length(min = 1, message = "\"description\" is not allowed to be empty")
    )]
    description: Option<String>,
}

impl FormSchema for CampgroundForm {
    const OBJECT: &'static str = "campground";
    const FIELDS: &'static [&'static str] = &["title", "price", "image", "location", "description"];
}

/// Takes the value of the required field `name` out of the form.
fn required(name: &str, value: Option<String>) -> ModelResult<String> {
    value.ok_or_else(|| ModelError(format!("\"{}\" is required", name)))
}

impl TryFrom<CampgroundForm> for CampgroundInfo {
    type Error = ModelError;

    fn try_from(form: CampgroundForm) -> ModelResult<Self> {
        let price = required("price", form.price)?;
        let price = match price.trim().parse::<f64>() {
            Ok(price) => Price::new(price)?,
            Err(_) => return Err(ModelError("\"price\" must be a number".to_owned())),
        };
        CampgroundInfo::new(
            required("title", form.title)?,
            price,
            required("image", form.image)?,
            required("location", form.location)?,
            required("description", form.description)?,
        )
    }
}
