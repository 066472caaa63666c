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

//! HTML views of the service.
//!
//! All values that come from the database are escaped before they are inserted into a template.

use crate::model::Campground;
use axum::response::Html;
use yelpcamp_core::template::{apply, escape};

/// Wraps the contents of every page.
const LAYOUT: &str = include_str!("views/layout.html");

/// Landing page.
const HOME: &str = include_str!("views/home.html");

/// Listing of all campgrounds.
const INDEX: &str = include_str!("views/index.html");

/// One campground within the listing.
const INDEX_ITEM: &str = include_str!("views/index_item.html");

/// Placeholder for the listing when there are no campgrounds.
const INDEX_EMPTY: &str = include_str!("views/index_empty.html");

/// Form to create a campground.
const NEW: &str = include_str!("views/new.html");

/// Details of one campground.
const SHOW: &str = include_str!("views/show.html");

/// Form to edit a campground.
const EDIT: &str = include_str!("views/edit.html");

/// Renders a full page titled `title` with the given `content`.
fn page(title: &str, content: &str) -> Html<String> {
    Html(apply(LAYOUT, &[("title", escape(title).as_str()), ("content", content)]))
}

/// Renders `template` with the escaped fields of `campground`.
fn render_campground(template: &'static str, campground: &Campground) -> String {
    let info = campground.info();
    apply(
        template,
        &[
            ("id", campground.id().to_string().as_str()),
            ("title", escape(info.title()).as_str()),
            ("price", info.price().to_string().as_str()),
            ("image", escape(info.image()).as_str()),
            ("location", escape(info.location()).as_str()),
            ("description", escape(info.description()).as_str()),
        ],
    )
}

/// Renders the landing page.
pub(crate) fn home() -> Html<String> {
    page("Home", HOME)
}

/// Renders the listing of `campgrounds`.
pub(crate) fn index(campgrounds: &[Campground]) -> Html<String> {
    let items = if campgrounds.is_empty() {
        INDEX_EMPTY.to_owned()
    } else {
        campgrounds.iter().map(|c| render_campground(INDEX_ITEM, c)).collect::<Vec<_>>().join("\n")
    };
    page("All Campgrounds", &apply(INDEX, &[("campgrounds", items.as_str())]))
}

/// Renders the form to create a new campground.
pub(crate) fn new_form() -> Html<String> {
    page("New Campground", NEW)
}

/// Renders the details of `campground`.
pub(crate) fn show(campground: &Campground) -> Html<String> {
    page(campground.info().title(), &render_campground(SHOW, campground))
}

/// Renders the form to edit `campground`, prefilled with its current details.
pub(crate) fn edit_form(campground: &Campground) -> Html<String> {
    page("Edit Campground", &render_campground(EDIT, campground))
}
