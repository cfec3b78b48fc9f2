// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the [`Error`] type for database operations.

use std::fmt;

use crate::rr::rdata::TextError;

/// An error type for simple-database operations.
///
/// Drivers return this type from their callbacks too. They will most
/// often use [`Error::NotFound`] (the name or zone does not exist) or
/// [`Error::Driver`] (anything else), and propagate the errors of
/// [`NodeBuilder`](super::NodeBuilder) methods with `?`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A driver with the given name is already registered.
    AlreadyExists,

    /// The driver registry has no free slots.
    NoCapacity,

    /// The requested driver, zone, name, or RRset does not exist.
    NotFound,

    /// The operation is not supported by simple databases.
    NotImplemented,

    /// An RRset iterator has no more RRsets.
    NoMore,

    /// A record was added to an RRset whose TTL differs from the
    /// record's.
    TtlMismatch,

    /// Formatted record text did not fit in its scratch buffer.
    Overflow,

    /// The name found by a lookup could not be reconstructed.
    InconsistentDatabase,

    /// RDATA text still did not fit after the maximum number of buffer
    /// enlargements.
    RdataTooLarge,

    /// A record's type text was not a known type mnemonic.
    UnknownType(&'static str),

    /// A record's RDATA text failed to parse.
    InvalidRdata(TextError),

    /// A driver-specific failure.
    Driver(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AlreadyExists => f.write_str("a driver with this name is already registered"),
            Self::NoCapacity => f.write_str("the driver registry is full"),
            Self::NotFound => f.write_str("not found"),
            Self::NotImplemented => f.write_str("not implemented by simple databases"),
            Self::NoMore => f.write_str("no more RRsets"),
            Self::TtlMismatch => f.write_str("record TTL does not match its RRset's TTL"),
            Self::Overflow => f.write_str("record text is too long"),
            Self::InconsistentDatabase => f.write_str("inconsistent database"),
            Self::RdataTooLarge => f.write_str("RDATA does not fit in the largest buffer"),
            Self::UnknownType(reason) => write!(f, "invalid record type: {}", reason),
            Self::InvalidRdata(error) => write!(f, "invalid RDATA: {}", error),
            Self::Driver(message) => write!(f, "driver error: {}", message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRdata(error) => Some(error),
            _ => None,
        }
    }
}

impl From<TextError> for Error {
    fn from(error: TextError) -> Self {
        Self::InvalidRdata(error)
    }
}
