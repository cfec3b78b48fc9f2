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

//! Implementation of the [`RdataBuffer`] type.

use super::{Rdata, TextError, MAX_RDATA_LEN};

/// A fixed-capacity output buffer for RDATA.
///
/// The text parser writes RDATA into an `RdataBuffer` and fails with
/// [`TextError::NoSpace`] as soon as a write would go past the
/// capacity. Callers that do not know how large the RDATA will be start
/// small and retry with a larger buffer. The capacity is never larger
/// than [`MAX_RDATA_LEN`], so whatever fits in the buffer is valid
/// RDATA.
#[derive(Debug)]
pub struct RdataBuffer {
    octets: Vec<u8>,
    capacity: usize,
}

impl RdataBuffer {
    /// Creates an empty buffer that accepts up to `capacity` octets (or
    /// [`MAX_RDATA_LEN`], whichever is smaller).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_RDATA_LEN);
        Self {
            octets: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the maximum number of octets the buffer accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of octets written so far.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the octets written so far.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Appends a single octet.
    pub fn push(&mut self, octet: u8) -> Result<(), TextError> {
        self.extend_from_slice(&[octet])
    }

    /// Appends `data`. Nothing is written if it does not all fit.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), TextError> {
        if self.octets.len() + data.len() > self.capacity {
            Err(TextError::NoSpace)
        } else {
            self.octets.extend_from_slice(data);
            Ok(())
        }
    }

    /// Appends a 16-bit value in network byte order.
    pub fn push_u16(&mut self, value: u16) -> Result<(), TextError> {
        self.extend_from_slice(&value.to_be_bytes())
    }

    /// Appends a 32-bit value in network byte order.
    pub fn push_u32(&mut self, value: u32) -> Result<(), TextError> {
        self.extend_from_slice(&value.to_be_bytes())
    }

    /// Discards everything written so far.
    pub fn clear(&mut self) {
        self.octets.clear();
    }

    /// Consumes the buffer, producing the [`Rdata`] written to it.
    pub fn into_rdata(self) -> Rdata {
        // The capacity check in extend_from_slice keeps the length
        // within MAX_RDATA_LEN.
        Rdata::try_from(self.octets).unwrap_or_else(|_| unreachable!())
    }
}
