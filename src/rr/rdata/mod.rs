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

//! Implementation of the [`Rdata`] type and DNS RDATA processing.

use std::fmt::{self, Write};
use std::ops::Deref;

use crate::util::nibble_to_ascii_hex_digit;

mod buffer;
mod present;
pub mod text;
pub use buffer::RdataBuffer;
pub use present::DisplayAs;
pub use text::TextError;

/// The maximum length of RDATA, fixed by the 16-bit RDLENGTH field.
pub const MAX_RDATA_LEN: usize = u16::MAX as usize;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// A type for owned record RDATA.
///
/// The RDATA of a record is limited to 65,535 octets. The `Rdata` type
/// is a wrapper over `Box<[u8]>` that can only be constructed if the
/// underlying data has a valid length. RDATA is most often produced by
/// the text parser in [`text`] through an [`RdataBuffer`].
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Rdata {
    octets: Box<[u8]>,
}

impl Rdata {
    /// Returns empty RDATA.
    pub fn empty() -> Self {
        Self {
            octets: Box::new([]),
        }
    }

    /// Returns the underlying octets.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl Deref for Rdata {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.octets
    }
}

impl TryFrom<&[u8]> for Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        if octets.len() > MAX_RDATA_LEN {
            Err(RdataTooLongError)
        } else {
            Ok(Self {
                octets: octets.into(),
            })
        }
    }
}

impl TryFrom<Vec<u8>> for Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: Vec<u8>) -> Result<Self, Self::Error> {
        if octets.len() > MAX_RDATA_LEN {
            Err(RdataTooLongError)
        } else {
            Ok(Self {
                octets: octets.into_boxed_slice(),
            })
        }
    }
}

/// Displays the RDATA in the RFC 3597 format for RDATA of unknown
/// type. See [`Rdata::display_as`] for type-aware output.
impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.len())?;
        if !self.is_empty() {
            f.write_char(' ')?;
            for octet in self.iter() {
                f.write_char(char::from(nibble_to_ascii_hex_digit(octet >> 4)))?;
                f.write_char(char::from(nibble_to_ascii_hex_digit(octet & 0xf)))?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// An error signaling that RDATA would exceed 65,535 octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RdataTooLongError;

impl fmt::Display for RdataTooLongError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RDATA is longer than 65,535 octets")
    }
}

impl std::error::Error for RdataTooLongError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_limited() {
        assert!(Rdata::try_from(vec![0; MAX_RDATA_LEN]).is_ok());
        assert_eq!(
            Rdata::try_from(vec![0; MAX_RDATA_LEN + 1]),
            Err(RdataTooLongError)
        );
    }

    #[test]
    fn display_uses_generic_format() {
        let rdata = Rdata::try_from(&b"\x0a\x00\xff"[..]).unwrap();
        assert_eq!(rdata.to_string(), "\\# 3 0a00ff");
        assert_eq!(Rdata::empty().to_string(), "\\# 0");
    }
}
