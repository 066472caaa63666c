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

//! High-level data types.

use derive_getters::Getters;
use derive_more::Display;
use uuid::Uuid;
use yelpcamp_core::model::{ModelError, ModelResult};

/// Unique identifier of a persisted campground.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub(crate) struct CampgroundId(Uuid);

impl CampgroundId {
    /// Generates a new random identifier.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier from its textual representation.
    pub(crate) fn parse(s: &str) -> ModelResult<Self> {
        match Uuid::parse_str(s) {
            Ok(uuid) => Ok(Self(uuid)),
            Err(e) => Err(ModelError(format!("Invalid campground identifier '{}': {}", s, e))),
        }
    }
}

/// Nightly price of a campground.  Guaranteed to be finite and not negative.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub(crate) struct Price(f64);

impl Price {
    /// Creates a new price after validating that it is a finite non-negative amount.
    pub(crate) fn new(price: f64) -> ModelResult<Self> {
        if !price.is_finite() {
            return Err(ModelError("Price must be a finite number".to_owned()));
        }
        if price < 0.0 {
            return Err(ModelError("Price cannot be negative".to_owned()));
        }
        Ok(Self(price))
    }

    /// Returns the price as a floating point number.
    pub(crate) fn as_f64(&self) -> f64 {
        self.0
    }
}

/// The user-supplied details of a campground.
#[derive(Clone, Debug, Getters, PartialEq)]
pub(crate) struct CampgroundInfo {
    /// Name of the campground.
    title: String,

    /// Nightly price.
    price: Price,

    /// URL of a picture of the campground.
    image: String,

    /// Where the campground is.
    location: String,

    /// Free-form description.
    description: String,
}

impl CampgroundInfo {
    /// Creates a new set of campground details, none of which can be empty.
    pub(crate) fn new<S: Into<String>>(
        title: S,
        price: Price,
        image: S,
        location: S,
        description: S,
    ) -> ModelResult<Self> {
        let title = title.into();
        let image = image.into();
        let location = location.into();
        let description = description.into();

        let fields = [
            ("title", &title),
            ("image", &image),
            ("location", &location),
            ("description", &description),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(ModelError(format!("Campground {} cannot be empty", name)));
            }
        }

        Ok(Self { title, price, image, location, description })
    }
}

/// A campground that has been persisted and thus has an identifier.
#[derive(Clone, Debug, Getters, PartialEq)]
pub(crate) struct Campground {
    /// Identifier assigned at creation time.
    id: CampgroundId,

    /// The details of the campground.
    info: CampgroundInfo,
}

impl Campground {
    /// Creates a new campground from its parts.
    pub(crate) fn new(id: CampgroundId, info: CampgroundInfo) -> Self {
        Self { id, info }
    }
}
