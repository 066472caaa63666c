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

//! Error types for the business logic layer.
//!
//! Services define their own `Driver`, which holds the injected database:
//!
//! ```rust
//! use std::sync::Arc;
//! use yelpcamp_core::db::Db;
//!
//! #[derive(Clone)]
//! pub(crate) struct Driver {
//!     /// Persistence for the service.
//!     db: Arc<dyn Db + Send + Sync>,
//! }
//! ```
//!
//! Driver operations take `self` by value.  Each one is a complete unit of work against the
//! database, and a caller that wants to chain two of them has to clone the driver explicitly.

use crate::db::DbError;
use crate::model::ModelError;

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates an error in the input data.
    #[error("{0}")]
    InvalidInput(String),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::AlreadyExists => DriverError::InvalidInput(e.to_string()),
            DbError::BackendError(_) => DriverError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => DriverError::BackendError(e.to_string()),
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput(e.to_string())
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db_error() {
        assert_eq!(
            DriverError::NotFound("Entity not found".to_owned()),
            DriverError::from(DbError::NotFound)
        );
        assert_eq!(
            DriverError::BackendError("Unavailable".to_owned()),
            DriverError::from(DbError::Unavailable)
        );
        assert_eq!(
            DriverError::BackendError("Data integrity error: bad row".to_owned()),
            DriverError::from(DbError::DataIntegrityError("bad row".to_owned()))
        );
    }

    #[test]
    fn test_from_model_error() {
        assert_eq!(
            DriverError::InvalidInput("Price cannot be negative".to_owned()),
            DriverError::from(ModelError("Price cannot be negative".to_owned()))
        );
    }
}
