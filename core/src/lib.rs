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

//! Shared foundation for YelpCamp services.
//!
//! A service is split in layers, each in a module of the same name, where every layer only talks
//! to the one below it:
//!
//! 1.  `model`: domain types.  Constructors validate their input so that an instance is always
//!     consistent; there is no other logic here.
//!
//! 1.  `db`: queries.  Free functions take an `Executor` and run one statement per backend.
//!
//! 1.  `driver`: business operations.  A `Driver` owns the injected `Db` and runs each operation
//!     in one go.
//!
//! 1.  `rest`: the web interface.  An `axum::Router` whose handlers call into the `Driver` and
//!     render pages or redirect.
//!
//! 1.  `main`: reads the configuration from the environment, connects to the database and
//!     serves the router until asked to stop.
//!
//! Every layer has its own error type (`ModelError`, `DbError`, `DriverError`, `RestError`) with
//! `From` conversions to the next one up.  `?` carries a failure from wherever it happens to the
//! REST layer, where it becomes an HTTP status and an error page.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
pub mod template;
