// Copyright 2021 Matthew Ingwersen.
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

//! Implementation of the [`NameBuilder`] structure.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// Builds [`Name`]s octet by octet in fixed-size buffers.
///
/// A new `NameBuilder` starts with a single null label; finishing it
/// right away yields the root. Octets are added to the current label
/// with [`NameBuilder::try_push`], and [`NameBuilder::next_label`]
/// closes the current label and starts a new one. Every method checks
/// the DNS length limits as it goes and leaves the builder unchanged
/// when it fails.
///
/// ```
/// use sdb::name::{Name, NameBuilder};
/// let mut builder = NameBuilder::new();
/// for c in b"example" {
///     builder.try_push(*c).unwrap();
/// }
/// builder.next_label().unwrap();
/// builder.try_push_slice(b"test").unwrap();
/// builder.next_label().unwrap(); // start the null label
/// assert_eq!(builder.finish().unwrap(), "example.test.".parse::<Name>().unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct NameBuilder {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    label_start: usize,
    label_len: u8,
}

impl NameBuilder {
    /// Constructs a new `NameBuilder`, which initially contains a
    /// single null label.
    pub fn new() -> Self {
        let mut wire_repr = ArrayVec::new();
        wire_repr.push(0);
        let mut label_offsets = ArrayVec::new();
        label_offsets.push(0);
        Self {
            wire_repr,
            label_offsets,
            label_start: 0,
            label_len: 0,
        }
    }

    /// Returns whether the name currently in the builder ends with the
    /// null label.
    pub fn is_fully_qualified(&self) -> bool {
        self.label_len == 0
    }

    /// Tries to add the given octet to the current label.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        if self.label_len as usize >= MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else if self.wire_repr.try_push(octet).is_ok() {
            self.label_len += 1;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Tries to add the given slice to the current label.
    pub fn try_push_slice(&mut self, octets: &[u8]) -> Result<(), Error> {
        if self.label_len as usize + octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else if self.wire_repr.try_extend_from_slice(octets).is_ok() {
            self.label_len += octets.len() as u8;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Finishes the current label and starts a new one. This fails if
    /// the current label is null, since only the last label of a name
    /// may be null.
    pub fn next_label(&mut self) -> Result<(), Error> {
        if self.is_fully_qualified() {
            Err(Error::NullNonTerminal)
        } else if self.wire_repr.is_full() {
            Err(Error::NameTooLong)
        } else {
            self.wire_repr[self.label_start] = self.label_len;
            self.label_start = self.wire_repr.len();
            self.label_len = 0;

            // Neither push can fail: wire_repr is not full, and since
            // every earlier label is non-null, the label count stays
            // within MAX_N_LABELS.
            self.wire_repr.push(0);
            self.label_offsets.push(self.label_start as u8);
            Ok(())
        }
    }

    /// Finishes construction, producing the [`Name`]. Fails if the last
    /// label is not null.
    pub fn finish(self) -> Result<Name, Error> {
        if self.is_fully_qualified() {
            Ok(Name::from_parts(&self.wire_repr, self.label_offsets))
        } else {
            Err(Error::NonNullTerminal)
        }
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builder_makes_root() {
        assert!(NameBuilder::new().finish().unwrap().is_root());
    }

    #[test]
    fn failed_pushes_leave_builder_unchanged() {
        let mut builder = NameBuilder::new();
        builder.try_push_slice(&[b'x'; MAX_LABEL_LEN]).unwrap();
        assert_eq!(builder.try_push(b'x'), Err(Error::LabelTooLong));
        builder.next_label().unwrap();
        assert_eq!(builder.next_label(), Err(Error::NullNonTerminal));
        let name = builder.finish().unwrap();
        assert_eq!(name.len(), 2);
        assert_eq!(name.label(0), &[b'x'; MAX_LABEL_LEN][..]);
    }

    #[test]
    fn finish_requires_null_label() {
        let mut builder = NameBuilder::new();
        builder.try_push_slice(b"test").unwrap();
        assert_eq!(builder.finish(), Err(Error::NonNullTerminal));
    }
}
