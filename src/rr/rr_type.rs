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

//! Implementation of the [`Type`] type for DNS RR types.

use std::fmt;
use std::str::FromStr;

use crate::util::{parse_generic_mnemonic, Caseless};

/// Represents the type of a resource record.
///
/// An RR type is represented on the wire as an unsigned 16-bit integer,
/// so this is basically a wrapper around [`u16`] with nice
/// [`Debug`](fmt::Debug), [`Display`](fmt::Display), and [`FromStr`]
/// implementations, as well as constants for the types that the lookup
/// code and the RDATA text parser care about.
///
/// [`Type::ANY`] is a query type: an RRset of that type never exists,
/// but asking for it makes a lookup return every RRset at a node.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

impl Type {
    pub const A: Type = Type(1);
    pub const NS: Type = Type(2);
    pub const MD: Type = Type(3);
    pub const MF: Type = Type(4);
    pub const CNAME: Type = Type(5);
    pub const SOA: Type = Type(6);
    pub const MB: Type = Type(7);
    pub const MG: Type = Type(8);
    pub const MR: Type = Type(9);
    pub const NULL: Type = Type(10);
    pub const PTR: Type = Type(12);
    pub const HINFO: Type = Type(13);
    pub const MINFO: Type = Type(14);
    pub const MX: Type = Type(15);
    pub const TXT: Type = Type(16);
    pub const SIG: Type = Type(24);
    pub const AAAA: Type = Type(28);
    pub const SRV: Type = Type(33);
    pub const DNAME: Type = Type(39);
    pub const ANY: Type = Type(255);
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

/// Type mnemonics recognized in text, besides RFC 3597 `TYPEnnn`.
const MNEMONICS: &[(&str, Type)] = &[
    ("A", Type::A),
    ("NS", Type::NS),
    ("MD", Type::MD),
    ("MF", Type::MF),
    ("CNAME", Type::CNAME),
    ("SOA", Type::SOA),
    ("MB", Type::MB),
    ("MG", Type::MG),
    ("MR", Type::MR),
    ("NULL", Type::NULL),
    ("PTR", Type::PTR),
    ("HINFO", Type::HINFO),
    ("MINFO", Type::MINFO),
    ("MX", Type::MX),
    ("TXT", Type::TXT),
    ("SIG", Type::SIG),
    ("AAAA", Type::AAAA),
    ("SRV", Type::SRV),
    ("DNAME", Type::DNAME),
    ("ANY", Type::ANY),
    ("*", Type::ANY),
];

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let found = MNEMONICS
            .iter()
            .find(|(mnemonic, _)| Caseless(mnemonic) == Caseless(text));
        match found {
            Some(&(_, rr_type)) => Ok(rr_type),
            None => match parse_generic_mnemonic(text, "TYPE") {
                Some(value) => value.map(Self::from),
                None => Err("unknown type"),
            },
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::A => f.write_str("A"),
            Self::NS => f.write_str("NS"),
            Self::MD => f.write_str("MD"),
            Self::MF => f.write_str("MF"),
            Self::CNAME => f.write_str("CNAME"),
            Self::SOA => f.write_str("SOA"),
            Self::MB => f.write_str("MB"),
            Self::MG => f.write_str("MG"),
            Self::MR => f.write_str("MR"),
            Self::NULL => f.write_str("NULL"),
            Self::PTR => f.write_str("PTR"),
            Self::HINFO => f.write_str("HINFO"),
            Self::MINFO => f.write_str("MINFO"),
            Self::MX => f.write_str("MX"),
            Self::TXT => f.write_str("TXT"),
            Self::SIG => f.write_str("SIG"),
            Self::AAAA => f.write_str("AAAA"),
            Self::SRV => f.write_str("SRV"),
            Self::DNAME => f.write_str("DNAME"),
            Self::ANY => f.write_str("ANY"),
            Self(value) => write!(f, "TYPE{value}"), // RFC 3597 § 5
        }
    }
}
