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

//! Type-aware presentation of RDATA, and the validation that falls out
//! of it.

use std::fmt::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr};

use super::Rdata;
use crate::class::Class;
use crate::name::Name;
use crate::rr::Type;

impl Rdata {
    /// Returns a [`Display`](fmt::Display) adapter that formats the
    /// RDATA as the text form of type `rr_type` in class `class`. RDATA
    /// of unknown types, or RDATA that is malformed for its type, is
    /// shown in the RFC 3597 `\#` form.
    pub fn display_as(&self, class: Class, rr_type: Type) -> DisplayAs {
        DisplayAs {
            rdata: self,
            class,
            rr_type,
        }
    }
}

/// The adapter returned by [`Rdata::display_as`].
pub struct DisplayAs<'a> {
    rdata: &'a Rdata,
    class: Class,
    rr_type: Type,
}

impl fmt::Display for DisplayAs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut text = String::new();
        match render(&mut text, self.rdata.octets(), self.class, self.rr_type) {
            Ok(()) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.rdata),
        }
    }
}

/// Returns whether `octets` is well-formed RDATA for `rr_type` in
/// `class`. RDATA of types without a known format is always accepted.
pub(super) fn is_valid(octets: &[u8], class: Class, rr_type: Type) -> bool {
    !matches!(
        render(&mut String::new(), octets, class, rr_type),
        Err(Unrenderable::Malformed)
    )
}

enum Unrenderable {
    UnknownType,
    Malformed,
}

impl From<fmt::Error> for Unrenderable {
    fn from(_: fmt::Error) -> Self {
        Self::Malformed
    }
}

/// Writes the text form of `octets` into `out`.
fn render(out: &mut String, octets: &[u8], class: Class, rr_type: Type) -> Result<(), Unrenderable> {
    let mut reader = Reader { octets };
    match rr_type {
        Type::NS
        | Type::MD
        | Type::MF
        | Type::CNAME
        | Type::MB
        | Type::MG
        | Type::MR
        | Type::PTR
        | Type::DNAME => write!(out, "{}", reader.name()?)?,
        Type::A if class == Class::IN => {
            let octets: [u8; 4] = reader.array()?;
            write!(out, "{}", Ipv4Addr::from(octets))?;
        }
        Type::SOA => {
            write!(out, "{} {}", reader.name()?, reader.name()?)?;
            for _ in 0..5 {
                write!(out, " {}", reader.u32()?)?;
            }
        }
        Type::HINFO => {
            write_character_string(out, reader.character_string()?)?;
            out.push(' ');
            write_character_string(out, reader.character_string()?)?;
        }
        Type::MINFO => write!(out, "{} {}", reader.name()?, reader.name()?)?,
        Type::MX => write!(out, "{} {}", reader.u16()?, reader.name()?)?,
        Type::TXT => {
            write_character_string(out, reader.character_string()?)?;
            while !reader.octets.is_empty() {
                out.push(' ');
                write_character_string(out, reader.character_string()?)?;
            }
        }
        Type::AAAA if class == Class::IN => {
            let octets: [u8; 16] = reader.array()?;
            write!(out, "{}", Ipv6Addr::from(octets))?;
        }
        Type::SRV if class == Class::IN => write!(
            out,
            "{} {} {} {}",
            reader.u16()?,
            reader.u16()?,
            reader.u16()?,
            reader.name()?
        )?,
        _ => return Err(Unrenderable::UnknownType),
    }

    if reader.octets.is_empty() {
        Ok(())
    } else {
        Err(Unrenderable::Malformed)
    }
}

/// Writes a quoted `<character-string>`.
fn write_character_string(out: &mut String, octets: &[u8]) -> fmt::Result {
    out.push('"');
    for octet in octets {
        match *octet {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            o if o == b' ' || o.is_ascii_graphic() => out.push(o as char),
            o => write!(out, "\\{:03}", o)?,
        }
    }
    out.push('"');
    Ok(())
}

/// Reads fields from the front of RDATA.
struct Reader<'a> {
    octets: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], Unrenderable> {
        if len > self.octets.len() {
            Err(Unrenderable::Malformed)
        } else {
            let (taken, rest) = self.octets.split_at(len);
            self.octets = rest;
            Ok(taken)
        }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], Unrenderable> {
        self.take(N)?
            .try_into()
            .or(Err(Unrenderable::Malformed))
    }

    fn u16(&mut self) -> Result<u16, Unrenderable> {
        self.array().map(u16::from_be_bytes)
    }

    fn u32(&mut self) -> Result<u32, Unrenderable> {
        self.array().map(u32::from_be_bytes)
    }

    fn name(&mut self) -> Result<Name, Unrenderable> {
        let (name, len) =
            Name::try_from_uncompressed(self.octets).or(Err(Unrenderable::Malformed))?;
        self.octets = &self.octets[len..];
        Ok(name)
    }

    fn character_string(&mut self) -> Result<&'a [u8], Unrenderable> {
        let len = self.take(1)?[0] as usize;
        self.take(len)
    }
}
