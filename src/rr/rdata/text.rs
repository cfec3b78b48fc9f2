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

//! Parsing of RDATA from presentation (text) format.
//!
//! The entry point is [`parse`], which reads the RDATA portion of a
//! master-file record (everything after the type field) and writes the
//! on-the-wire RDATA into an [`RdataBuffer`]. The syntax follows
//! [RFC 1035 § 5.1]: fields are separated by whitespace, parentheses
//! group fields and are otherwise ignored, `;` starts a comment, and
//! `<character-string>`s may be quoted. Any type may use the
//! [RFC 3597 § 5] generic form `\# <length> <hex>`; types without a
//! known text form require it.
//!
//! [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
//! [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use arrayvec::ArrayVec;

use super::{present, RdataBuffer};
use crate::class::Class;
use crate::name::{self, Name};
use crate::rr::Type;
use crate::util::ascii_hex_digit_to_nibble;

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error raised while parsing RDATA text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextError {
    /// The output [`RdataBuffer`] is too small for the RDATA. Retrying
    /// with a larger buffer may succeed.
    NoSpace,

    /// A `<character-string>` was longer than 255 octets.
    CharacterStringTooLong,

    /// The type has no known text form, so the RFC 3597 `\#` form must
    /// be used.
    GenericFormRequired,

    /// An IPv4 or IPv6 address failed to parse.
    InvalidAddress,

    /// An escape sequence was malformed.
    InvalidEscape,

    /// A hexadecimal digit in `\#` RDATA was invalid.
    InvalidHex,

    /// An integer field failed to parse or was out of range.
    InvalidInteger,

    /// A domain name failed to parse.
    InvalidName(name::Error),

    /// RDATA given in `\#` form is not valid for its (known) type.
    InvalidRdataForType,

    /// The number of hex octets given in `\#` form does not match the
    /// stated length.
    LengthMismatch,

    /// There was text left over after the RDATA.
    TrailingData,

    /// Parentheses were not balanced.
    UnbalancedParens,

    /// The text ended before the RDATA was complete.
    UnexpectedEnd,

    /// A quoted string was not closed.
    UnterminatedQuote,
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoSpace => f.write_str("output buffer is too small"),
            Self::CharacterStringTooLong => f.write_str("<character-string> is too long"),
            Self::GenericFormRequired => {
                f.write_str("RDATA of this type must be given in \\# form")
            }
            Self::InvalidAddress => f.write_str("invalid address"),
            Self::InvalidEscape => f.write_str("invalid escape sequence"),
            Self::InvalidHex => f.write_str("invalid hexadecimal digit"),
            Self::InvalidInteger => f.write_str("invalid integer"),
            Self::InvalidName(error) => write!(f, "invalid domain name: {}", error),
            Self::InvalidRdataForType => f.write_str("RDATA is not valid for its type"),
            Self::LengthMismatch => f.write_str("\\# RDATA does not match its length"),
            Self::TrailingData => f.write_str("unexpected text after RDATA"),
            Self::UnbalancedParens => f.write_str("unbalanced parentheses"),
            Self::UnexpectedEnd => f.write_str("unexpected end of RDATA"),
            Self::UnterminatedQuote => f.write_str("unterminated quoted string"),
        }
    }
}

impl std::error::Error for TextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidName(error) => Some(error),
            _ => None,
        }
    }
}

impl From<name::Error> for TextError {
    fn from(error: name::Error) -> Self {
        Self::InvalidName(error)
    }
}

////////////////////////////////////////////////////////////////////////
// ENTRY POINT                                                        //
////////////////////////////////////////////////////////////////////////

/// Parses `text` as RDATA of type `rr_type` in class `class`, writing
/// the result into `buffer`. Relative domain names are completed with
/// `origin`.
///
/// On failure the buffer holds partial output and should be cleared (or
/// replaced) before reuse. A [`TextError::NoSpace`] failure means the
/// text itself may be fine and a larger buffer should be tried.
pub fn parse(
    text: &str,
    class: Class,
    rr_type: Type,
    origin: &Name,
    buffer: &mut RdataBuffer,
) -> Result<(), TextError> {
    let mut parser = Parser {
        fields: Fields::new(text),
        origin,
        buffer,
    };

    let first = parser.fields.peek()?;
    if matches!(first, Some(Field { text: "\\#", quoted: false })) {
        parser.fields.next_field()?;
        parser.parse_generic()?;
        if !present::is_valid(parser.buffer.octets(), class, rr_type) {
            return Err(TextError::InvalidRdataForType);
        }
    } else {
        match rr_type {
            Type::NS
            | Type::MD
            | Type::MF
            | Type::CNAME
            | Type::MB
            | Type::MG
            | Type::MR
            | Type::PTR
            | Type::DNAME => parser.parse_name()?,
            Type::A if class == Class::IN => parser.parse_in_a()?,
            Type::SOA => parser.parse_soa()?,
            Type::HINFO => {
                parser.parse_character_string()?;
                parser.parse_character_string()?;
            }
            Type::MINFO => {
                parser.parse_name()?;
                parser.parse_name()?;
            }
            Type::MX => {
                parser.parse_u16()?;
                parser.parse_name()?;
            }
            Type::TXT => parser.parse_txt()?,
            Type::AAAA if class == Class::IN => parser.parse_in_aaaa()?,
            Type::SRV if class == Class::IN => {
                parser.parse_u16()?;
                parser.parse_u16()?;
                parser.parse_u16()?;
                parser.parse_name()?;
            }
            _ => return Err(TextError::GenericFormRequired),
        }
    }
    parser.expect_end()
}

////////////////////////////////////////////////////////////////////////
// FIELD SPLITTING                                                    //
////////////////////////////////////////////////////////////////////////

/// A field of RDATA text. For quoted fields, `text` excludes the
/// quotes. Escape sequences are left in place.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Field<'a> {
    text: &'a str,
    quoted: bool,
}

/// Splits RDATA text into [`Field`]s.
struct Fields<'a> {
    text: &'a str,
    position: usize,
    depth: usize,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            depth: 0,
        }
    }

    /// Returns the next field without consuming it.
    fn peek(&self) -> Result<Option<Field<'a>>, TextError> {
        Self {
            text: self.text,
            position: self.position,
            depth: self.depth,
        }
        .next_field()
    }

    /// Consumes and returns the next field, or `None` at the end of the
    /// text.
    fn next_field(&mut self) -> Result<Option<Field<'a>>, TextError> {
        let octets = self.text.as_bytes();
        while let Some(&octet) = octets.get(self.position) {
            match octet {
                b'(' => self.depth += 1,
                b')' => self.depth = self.depth.checked_sub(1).ok_or(TextError::UnbalancedParens)?,
                b';' => {
                    while octets.get(self.position).map_or(false, |o| *o != b'\n') {
                        self.position += 1;
                    }
                    continue;
                }
                b'"' => return self.quoted_field().map(Some),
                o if o.is_ascii_whitespace() => (),
                _ => return self.unquoted_field().map(Some),
            }
            self.position += 1;
        }
        if self.depth == 0 {
            Ok(None)
        } else {
            Err(TextError::UnbalancedParens)
        }
    }

    fn quoted_field(&mut self) -> Result<Field<'a>, TextError> {
        let octets = self.text.as_bytes();
        let start = self.position + 1;
        let mut end = start;
        loop {
            match octets.get(end) {
                Some(b'"') => break,
                Some(b'\\') => end += 2,
                Some(_) => end += 1,
                None => return Err(TextError::UnterminatedQuote),
            }
        }
        self.position = end + 1;
        Ok(Field {
            text: &self.text[start..end],
            quoted: true,
        })
    }

    fn unquoted_field(&mut self) -> Result<Field<'a>, TextError> {
        let octets = self.text.as_bytes();
        let start = self.position;
        let mut end = start;
        while let Some(&octet) = octets.get(end) {
            match octet {
                b'\\' if end + 1 >= octets.len() => return Err(TextError::InvalidEscape),
                b'\\' => end += 2,
                b'(' | b')' | b';' | b'"' => break,
                o if o.is_ascii_whitespace() => break,
                _ => end += 1,
            }
        }
        self.position = end;
        Ok(Field {
            text: &self.text[start..end],
            quoted: false,
        })
    }
}

////////////////////////////////////////////////////////////////////////
// TYPE-SPECIFIC PARSING                                              //
////////////////////////////////////////////////////////////////////////

struct Parser<'a, 'b> {
    fields: Fields<'a>,
    origin: &'b Name,
    buffer: &'b mut RdataBuffer,
}

impl<'a> Parser<'a, '_> {
    fn field(&mut self) -> Result<Field<'a>, TextError> {
        self.fields.next_field()?.ok_or(TextError::UnexpectedEnd)
    }

    fn expect_end(&mut self) -> Result<(), TextError> {
        match self.fields.next_field()? {
            None => Ok(()),
            Some(_) => Err(TextError::TrailingData),
        }
    }

    fn parse_number<T: FromStr>(&mut self) -> Result<T, TextError> {
        self.field()?
            .text
            .parse()
            .or(Err(TextError::InvalidInteger))
    }

    fn parse_u16(&mut self) -> Result<(), TextError> {
        let value = self.parse_number()?;
        self.buffer.push_u16(value)
    }

    fn parse_u32(&mut self) -> Result<(), TextError> {
        let value = self.parse_number()?;
        self.buffer.push_u32(value)
    }

    fn parse_name(&mut self) -> Result<(), TextError> {
        let field = self.field()?;
        let name = Name::from_str_relative(field.text, self.origin)?;
        self.buffer.extend_from_slice(name.wire_repr())
    }

    fn parse_character_string(&mut self) -> Result<(), TextError> {
        let field = self.field()?;
        let mut string = ArrayVec::<u8, 255>::new();
        unescape(field.text.as_bytes(), |octet| {
            string
                .try_push(octet)
                .or(Err(TextError::CharacterStringTooLong))
        })?;
        self.buffer.push(string.len() as u8)?;
        self.buffer.extend_from_slice(&string)
    }

    fn parse_in_a(&mut self) -> Result<(), TextError> {
        let address: Ipv4Addr = self
            .field()?
            .text
            .parse()
            .or(Err(TextError::InvalidAddress))?;
        self.buffer.extend_from_slice(&address.octets())
    }

    fn parse_in_aaaa(&mut self) -> Result<(), TextError> {
        let address: Ipv6Addr = self
            .field()?
            .text
            .parse()
            .or(Err(TextError::InvalidAddress))?;
        self.buffer.extend_from_slice(&address.octets())
    }

    fn parse_soa(&mut self) -> Result<(), TextError> {
        self.parse_name()?; // MNAME
        self.parse_name()?; // RNAME
        for _ in 0..5 {
            // SERIAL, REFRESH, RETRY, EXPIRE, MINIMUM
            self.parse_u32()?;
        }
        Ok(())
    }

    fn parse_txt(&mut self) -> Result<(), TextError> {
        self.parse_character_string()?;
        while self.fields.peek()?.is_some() {
            self.parse_character_string()?;
        }
        Ok(())
    }

    /// Parses the RFC 3597 generic form after the `\#` marker. The hex
    /// digits may be split across any number of fields.
    fn parse_generic(&mut self) -> Result<(), TextError> {
        let len: u16 = self.parse_number()?;
        let mut remaining = len as usize;
        let mut high_nibble = None;
        while let Some(field) = self.fields.next_field()? {
            for digit in field.text.bytes() {
                let nibble = ascii_hex_digit_to_nibble(digit).ok_or(TextError::InvalidHex)?;
                match high_nibble.take() {
                    None => high_nibble = Some(nibble),
                    Some(high) => {
                        remaining = remaining
                            .checked_sub(1)
                            .ok_or(TextError::LengthMismatch)?;
                        self.buffer.push((high << 4) | nibble)?;
                    }
                }
            }
        }
        if remaining == 0 && high_nibble.is_none() {
            Ok(())
        } else {
            Err(TextError::LengthMismatch)
        }
    }
}

/// Decodes the escape sequences of [RFC 1035 § 5.1] in `octets`, passing
/// each resulting octet to `sink`.
///
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
fn unescape<F>(octets: &[u8], mut sink: F) -> Result<(), TextError>
where
    F: FnMut(u8) -> Result<(), TextError>,
{
    let mut rest = octets;
    while let Some((&octet, tail)) = rest.split_first() {
        if octet != b'\\' {
            sink(octet)?;
            rest = tail;
            continue;
        }
        match tail {
            [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
                let value =
                    100 * (a - b'0') as u16 + 10 * (b - b'0') as u16 + (c - b'0') as u16;
                sink(u8::try_from(value).or(Err(TextError::InvalidEscape))?)?;
                rest = &tail[3..];
            }
            [a, ..] if !a.is_ascii_digit() => {
                sink(*a)?;
                rest = &tail[1..];
            }
            _ => return Err(TextError::InvalidEscape),
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_to_vec(text: &str, rr_type: Type) -> Result<Vec<u8>, TextError> {
        let mut buffer = RdataBuffer::new(65535);
        parse(text, Class::IN, rr_type, &Name::root(), &mut buffer)?;
        Ok(buffer.octets().to_vec())
    }

    #[test]
    fn a_parses() {
        assert_eq!(parse_to_vec("192.0.2.1", Type::A), Ok(vec![192, 0, 2, 1]));
        assert_eq!(
            parse_to_vec("192.0.2", Type::A),
            Err(TextError::InvalidAddress)
        );
        assert_eq!(
            parse_to_vec("192.0.2.1 192.0.2.2", Type::A),
            Err(TextError::TrailingData)
        );
    }

    #[test]
    fn aaaa_parses() {
        let octets = parse_to_vec("2001:db8::1", Type::AAAA).unwrap();
        assert_eq!(octets.len(), 16);
        assert_eq!(&octets[..4], &[0x20, 0x01, 0x0d, 0xb8]);
        assert_eq!(octets[15], 1);
    }

    #[test]
    fn names_are_made_absolute_against_origin() {
        assert_eq!(
            parse_to_vec("ns1.example", Type::NS),
            Ok(b"\x03ns1\x07example\x00".to_vec())
        );
        assert_eq!(
            parse_to_vec("ns1.example.", Type::NS),
            Ok(b"\x03ns1\x07example\x00".to_vec())
        );
        assert_eq!(
            parse_to_vec("target.example.", Type::DNAME),
            Ok(b"\x06target\x07example\x00".to_vec())
        );
    }

    #[test]
    fn soa_parses_across_parentheses_and_comments() {
        let text = "ns1.example. hostmaster.example. (\n\
                    42 ; serial\n\
                    28800 7200 604800 86400 )";
        let octets = parse_to_vec(text, Type::SOA).unwrap();
        let mut expected = b"\x03ns1\x07example\x00\x0ahostmaster\x07example\x00".to_vec();
        for value in [42u32, 28800, 7200, 604800, 86400] {
            expected.extend_from_slice(&value.to_be_bytes());
        }
        assert_eq!(octets, expected);
        assert_eq!(
            parse_to_vec("ns1.example. hostmaster.example. ( 1 2 3 4 5", Type::SOA),
            Err(TextError::UnbalancedParens)
        );
        assert_eq!(
            parse_to_vec("ns1.example. hostmaster.example. 1 2 3 4", Type::SOA),
            Err(TextError::UnexpectedEnd)
        );
    }

    #[test]
    fn mx_and_srv_parse() {
        assert_eq!(
            parse_to_vec("10 mail.example.", Type::MX),
            Ok(b"\x00\x0a\x04mail\x07example\x00".to_vec())
        );
        assert_eq!(
            parse_to_vec("1 2 53 ns.example.", Type::SRV),
            Ok(b"\x00\x01\x00\x02\x00\x35\x02ns\x07example\x00".to_vec())
        );
        assert_eq!(
            parse_to_vec("65536 mail.example.", Type::MX),
            Err(TextError::InvalidInteger)
        );
    }

    #[test]
    fn txt_parses_quoted_and_unquoted_strings() {
        assert_eq!(
            parse_to_vec("\"hello world\" plain \"esc\\\"aped\\065\"", Type::TXT),
            Ok(b"\x0bhello world\x05plain\x09esc\"apedA".to_vec())
        );
        assert_eq!(
            parse_to_vec("\"unterminated", Type::TXT),
            Err(TextError::UnterminatedQuote)
        );
        assert_eq!(parse_to_vec("", Type::TXT), Err(TextError::UnexpectedEnd));
        assert_eq!(
            parse_to_vec(&"x".repeat(256), Type::TXT),
            Err(TextError::CharacterStringTooLong)
        );
    }

    #[test]
    fn hinfo_parses() {
        assert_eq!(
            parse_to_vec("\"PDP-11\" UNIX", Type::HINFO),
            Ok(b"\x06PDP-11\x04UNIX".to_vec())
        );
    }

    #[test]
    fn generic_form_parses() {
        assert_eq!(
            parse_to_vec("\\# 4 c000 0201", Type::A),
            Ok(vec![192, 0, 2, 1])
        );
        assert_eq!(
            parse_to_vec("\\# 2 abcd", Type::from(65280)),
            Ok(vec![0xab, 0xcd])
        );
        assert_eq!(parse_to_vec("\\# 0", Type::NULL), Ok(vec![]));
        assert_eq!(
            parse_to_vec("\\# 3 abcd", Type::from(65280)),
            Err(TextError::LengthMismatch)
        );
        assert_eq!(
            parse_to_vec("\\# 1 zz", Type::from(65280)),
            Err(TextError::InvalidHex)
        );
        assert_eq!(
            parse_to_vec("\\# 3 c00002", Type::A),
            Err(TextError::InvalidRdataForType)
        );
    }

    #[test]
    fn unknown_types_require_generic_form() {
        assert_eq!(
            parse_to_vec("abcd", Type::from(65280)),
            Err(TextError::GenericFormRequired)
        );
        let mut buffer = RdataBuffer::new(64);
        assert_eq!(
            parse("192.0.2.1", Class::CH, Type::A, &Name::root(), &mut buffer),
            Err(TextError::GenericFormRequired)
        );
    }

    #[test]
    fn small_buffers_report_no_space() {
        let mut buffer = RdataBuffer::new(8);
        assert_eq!(
            parse(
                "ns1.example. hostmaster.example. 1 2 3 4 5",
                Class::IN,
                Type::SOA,
                &Name::root(),
                &mut buffer
            ),
            Err(TextError::NoSpace)
        );
        let mut buffer = RdataBuffer::new(4);
        assert_eq!(
            parse("192.0.2.1", Class::IN, Type::A, &Name::root(), &mut buffer),
            Ok(())
        );
    }
}
