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

//! Implementation of data structures related to domain names.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::str::FromStr;

use arrayvec::ArrayVec;

mod builder;
mod error;
pub use builder::NameBuilder;
pub use error::Error;

/// The maximum number of labels in a domain name.
const MAX_N_LABELS: usize = 128;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A structure to represent an absolute domain name.
///
/// A `Name` owns its uncompressed on-the-wire representation, as
/// defined in [RFC 1035 § 3.1], along with the offset of each label in
/// that representation. The label count always includes the final null
/// label, so the root has one label and `example.` has two.
///
/// `Name`s can be constructed
///
/// * through the [`FromStr`] implementation, which requires a fully
///   qualified name;
/// * through [`Name::from_str_relative`], which completes relative
///   names with an origin;
/// * through a [`NameBuilder`]; and
/// * from uncompressed on-the-wire names through
///   [`Name::try_from_uncompressed`].
///
/// Comparison and hashing are ASCII-case-insensitive, while case is
/// preserved in the representation.
///
/// [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
#[derive(Clone)]
pub struct Name {
    wire_repr: Box<[u8]>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
}

#[allow(clippy::len_without_is_empty)] // A domain name is never empty!
impl Name {
    /// Assembles a `Name` from a valid wire representation and its
    /// label offsets.
    fn from_parts(wire_repr: &[u8], label_offsets: ArrayVec<u8, MAX_N_LABELS>) -> Self {
        Self {
            wire_repr: wire_repr.into(),
            label_offsets,
        }
    }

    /// Returns a `Name` representing the DNS root, `.`.
    pub fn root() -> Self {
        NameBuilder::new().finish().unwrap_or_else(|_| unreachable!())
    }

    /// Returns whether this `Name` is equal to or a subdomain of
    /// `other`.
    pub fn eq_or_subdomain_of(&self, other: &Name) -> bool {
        self.len() >= other.len()
            && self
                .labels()
                .rev()
                .zip(other.labels().rev())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.len() == 1
    }

    /// Returns label `n` of the `Name` (without its length octet).
    /// Panics if `n >= self.len()`.
    pub fn label(&self, n: usize) -> &[u8] {
        let offset = self.label_offsets[n] as usize;
        let len = self.wire_repr[offset] as usize;
        &self.wire_repr[offset + 1..offset + 1 + len]
    }

    /// Returns an iterator over the labels in this `Name`.
    pub fn labels(&self) -> Labels {
        Labels {
            name: self,
            front: 0,
            back: self.len(),
        }
    }

    /// Returns the number of labels in this `Name`, including the null
    /// label.
    pub fn len(&self) -> usize {
        self.label_offsets.len()
    }

    /// Returns the superdomain obtained by skipping the first `skip`
    /// labels of the `Name`, or `None` if there aren't enough labels.
    pub fn superdomain(&self, skip: usize) -> Option<Name> {
        if skip < self.len() {
            let start = self.label_offsets[skip];
            let label_offsets = self.label_offsets[skip..]
                .iter()
                .map(|offset| offset - start)
                .collect();
            Some(Self::from_parts(
                &self.wire_repr[start as usize..],
                label_offsets,
            ))
        } else {
            None
        }
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.wire_repr
    }

    /// Tries to parse an uncompressed name present at the start of the
    /// provided buffer. The name need not occupy the entire buffer;
    /// extra data is ignored. If the name is valid, the new `Name` is
    /// returned along with the length of the name in octets.
    pub fn try_from_uncompressed(octets: &[u8]) -> Result<(Self, usize), Error> {
        let mut builder = NameBuilder::new();
        let mut index = 0;
        loop {
            let len = *octets.get(index).ok_or(Error::UnexpectedEnd)? as usize;
            if len == 0 {
                return builder.finish().map(|name| (name, index + 1));
            } else if len > MAX_LABEL_LEN {
                return Err(Error::InvalidLabelType);
            }
            let label = octets
                .get(index + 1..index + 1 + len)
                .ok_or(Error::UnexpectedEnd)?;
            builder.try_push_slice(label)?;
            builder.next_label()?;
            index += len + 1;
        }
    }

    /// Parses a name in presentation format, completing it with
    /// `origin` if it is not fully qualified. The text `@` stands for
    /// `origin` itself.
    pub fn from_str_relative(text: &str, origin: &Name) -> Result<Self, Error> {
        if text == "@" {
            return Ok(origin.clone());
        }
        let mut builder = parse_into_builder(text)?;
        if !builder.is_fully_qualified() {
            builder.next_label()?;
            for label in origin.labels().filter(|l| !l.is_empty()) {
                builder.try_push_slice(label)?;
                builder.next_label()?;
            }
        }
        builder.finish()
    }

    /// Returns the presentation format of the `Name`. When
    /// `omit_final_dot` is set, the trailing dot of names other than
    /// the root is left off.
    pub fn to_text(&self, omit_final_dot: bool) -> String {
        let mut text = self.to_string();
        if omit_final_dot && !self.is_root() {
            text.pop();
        }
        text
    }
}

/// Writes a label in presentation format, escaping as described by
/// [RFC 4343 § 2.1].
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
fn fmt_label(label: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    for octet in label {
        match *octet {
            b'.' => f.write_str("\\.")?,
            b'\\' => f.write_str("\\\\")?,
            o if o.is_ascii_graphic() => write!(f, "{}", o as char)?,
            o => write!(f, "\\{:03}", o)?,
        }
    }
    Ok(())
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            // Every label is followed by a dot, except the null label
            // that ends the name.
            for label in self.labels().take(self.len() - 1) {
                fmt_label(label, f)?;
                f.write_str(".")?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.wire_repr.eq_ignore_ascii_case(&other.wire_repr)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.wire_repr.len());
        for octet in self.wire_repr.iter() {
            state.write_u8(octet.to_ascii_lowercase());
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the labels in a [`Name`], from the leftmost label
/// to the null label.
///
/// To use this iterator, construct one from a [`Name`] using
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    name: &'a Name,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.front += 1;
            Some(self.name.label(self.front - 1))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(self.name.label(self.back))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Allows for conversion of a Rust [`str`] into a [`Name`]. The passed
/// string must be strictly ASCII and fully qualified. Escape sequences
/// as defined by [RFC 4343 § 2.1] are supported.
///
/// [RFC 4343 § 2.1]: https://datatracker.ietf.org/doc/html/rfc4343#section-2.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_into_builder(s)?.finish()
    }
}

/// Feeds presentation-format text into a new [`NameBuilder`]. The
/// result may or may not be fully qualified.
fn parse_into_builder(s: &str) -> Result<NameBuilder, Error> {
    let mut builder = NameBuilder::new();
    if s.is_empty() {
        return Err(Error::StrEmpty);
    } else if s == "." {
        return Ok(builder);
    }

    // NOTE: to check that the string is ASCII, it suffices to check
    // that each octet is ASCII as we go. This is because all
    // multi-byte characters start with an octet that is not ASCII.
    let mut remaining_octets = s.as_bytes();
    while let Some(&octet) = remaining_octets.first() {
        if octet == b'\\' {
            let (value, consumed) = parse_escape(&remaining_octets[1..])?;
            builder.try_push(value)?;
            remaining_octets = &remaining_octets[consumed + 1..];
        } else if octet == b'.' {
            builder.next_label()?;
            remaining_octets = &remaining_octets[1..];
        } else if !octet.is_ascii() {
            return Err(Error::StrNotAscii);
        } else {
            builder.try_push(octet)?;
            remaining_octets = &remaining_octets[1..];
        }
    }
    Ok(builder)
}

/// Parses an escape sequence. We expect `remaining_octets` to start
/// with the octet immediately *after* the backslash that introduces the
/// escape sequence.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    match remaining_octets {
        [] => Err(Error::InvalidEscape),
        [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            let value = 100 * (a - b'0') as usize + 10 * (b - b'0') as usize + (c - b'0') as usize;
            u8::try_from(value)
                .map(|v| (v, 3))
                .or(Err(Error::InvalidEscape))
        }
        [a, ..] if a.is_ascii_digit() => Err(Error::InvalidEscape),
        [a, ..] => Ok((*a, 1)),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
