// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Common errors and macros.

use std::error::Error;
use std::{result, str};

use arrow_schema::ArrowError;

/// Error enumeration for record assembly.
// Note: we don't implement PartialEq as the semantics for the
// external variant are not well defined
#[derive(Debug)]
pub enum DremelError {
    /// Structural violation in the level or value streams: mismatched
    /// repetition/definition counts, out-of-range levels, capacity overflow.
    /// Usually indicates corrupt input rather than a programming error.
    Corrupt(String),
    /// The external typed decoder reported a failure, or returned fewer
    /// values than its contract requires.
    Decode(String),
    /// An external error variant
    External(Box<dyn Error + Send + Sync>),
}

impl std::fmt::Display for DremelError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            DremelError::Corrupt(message) => write!(fmt, "Corrupt: {message}"),
            DremelError::Decode(message) => write!(fmt, "Decode: {message}"),
            DremelError::External(e) => write!(fmt, "External: {e}"),
        }
    }
}

impl Error for DremelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DremelError::External(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<str::Utf8Error> for DremelError {
    fn from(e: str::Utf8Error) -> DremelError {
        DremelError::External(Box::new(e))
    }
}

impl From<ArrowError> for DremelError {
    fn from(e: ArrowError) -> DremelError {
        DremelError::External(Box::new(e))
    }
}

/// A specialized `Result` for record-assembly errors.
pub type Result<T, E = DremelError> = result::Result<T, E>;

// ----------------------------------------------------------------------
// Convenient macros for different errors

macro_rules! corrupt_err {
    ($fmt:expr) => (crate::errors::DremelError::Corrupt($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::errors::DremelError::Corrupt(format!($fmt, $($args),*)));
}

macro_rules! decode_err {
    ($fmt:expr) => (crate::errors::DremelError::Decode($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::errors::DremelError::Decode(format!($fmt, $($args),*)));
}
