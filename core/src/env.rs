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

//! Typed access to configuration stored in environment variables.
//!
//! Every setting lives in a variable named `<prefix>_<suffix>`, where the prefix identifies the
//! component being configured (such as `YELPCAMP` or `PGSQL_PROD`).

use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Errors while reading configuration from the environment.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EnvError {
    /// A variable has a value that cannot be converted to the requested type.
    #[error("Invalid value '{value}' in environment variable {name}: {reason}")]
    Invalid {
        /// Name of the offending variable.
        name: String,

        /// Raw value of the variable.
        value: String,

        /// Why the conversion failed.
        reason: String,
    },

    /// A required variable is not set.
    #[error("Required environment variable {0} not present")]
    Missing(String),

    /// A variable is set but its value is not valid UTF-8.
    #[error("Non-Unicode value in environment variable {0}")]
    NotUnicode(String),
}

/// Result type for this module.
pub type EnvResult<T> = Result<T, EnvError>;

/// Reads the variable `name` and parses it as a `T`.  Unset variables yield `None`.
fn read<T>(name: String) -> EnvResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let value = match env::var(&name) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => return Err(EnvError::NotUnicode(name)),
    };
    match value.parse::<T>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(EnvError::Invalid { name, value, reason: e.to_string() }),
    }
}

/// Gets the required variable `<prefix>_<suffix>` parsed as a `T`.
pub fn get_required_var<T>(prefix: &str, suffix: &str) -> EnvResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let name = format!("{}_{}", prefix, suffix);
    read(name.clone())?.ok_or(EnvError::Missing(name))
}

/// Gets the optional variable `<prefix>_<suffix>` parsed as a `T`.
pub fn get_optional_var<T>(prefix: &str, suffix: &str) -> EnvResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    read(format!("{}_{}", prefix, suffix))
}
