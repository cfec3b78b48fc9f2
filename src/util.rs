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

//! Crate-private utilities.

/// A wrapper around [`str`] references whose [`PartialEq`] and [`Eq`]
/// implementations are ASCII-case-insensitive.
pub struct Caseless<'a>(pub &'a str);

impl PartialEq for Caseless<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl Eq for Caseless<'_> {}

/// Parses an RFC 3597 numeric mnemonic such as `TYPE65280` or
/// `CLASS1`. Returns `None` if `text` does not start with `prefix`
/// (case-insensitively); otherwise the result of parsing the decimal
/// value that follows.
pub fn parse_generic_mnemonic(text: &str, prefix: &str) -> Option<Result<u16, &'static str>> {
    text.get(0..prefix.len())
        .filter(|p| p.eq_ignore_ascii_case(prefix))
        .map(|_| {
            text[prefix.len()..]
                .parse::<u16>()
                .or(Err("value is not a valid unsigned 16-bit integer"))
        })
}

/// Converts a nibble into an ASCII hex character. Lower-case hex digits
/// are used. The passed value must be less than 16.
pub fn nibble_to_ascii_hex_digit(nibble: u8) -> u8 {
    assert!(nibble < 16);
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'a' + nibble - 10
    }
}

/// Converts an ASCII hexadecimal digit to its numeric value. This
/// returns [`None`] if `digit` is not one of the ASCII characters
/// `0` through `9`, `A` through `F`, or `a` through `f`.
pub fn ascii_hex_digit_to_nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_mnemonics_parse() {
        assert_eq!(parse_generic_mnemonic("TYPE39", "TYPE"), Some(Ok(39)));
        assert_eq!(parse_generic_mnemonic("type39", "TYPE"), Some(Ok(39)));
        assert!(matches!(
            parse_generic_mnemonic("TYPE70000", "TYPE"),
            Some(Err(_))
        ));
        assert_eq!(parse_generic_mnemonic("A", "TYPE"), None);
    }

    #[test]
    fn hex_digits_round_trip() {
        for nibble in 0..16 {
            let digit = nibble_to_ascii_hex_digit(nibble);
            assert_eq!(ascii_hex_digit_to_nibble(digit), Some(nibble));
        }
        assert_eq!(ascii_hex_digit_to_nibble(b'G'), None);
    }
}
