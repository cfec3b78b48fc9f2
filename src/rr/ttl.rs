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

//! Implementation of the [`Ttl`] type.

use std::fmt;

/// The time-to-live of a resource record.
///
/// [RFC 2181 § 8] says that TTL values with the most significant bit
/// set should be treated as zero, and the [`From<u32>`] implementation
/// does exactly that. Drivers hand TTLs over as plain `u32`s, so this
/// is where the rule is applied to everything a simple database stores.
///
/// [RFC 2181 § 8]: https://datatracker.ietf.org/doc/html/rfc2181#section-8
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Ttl(u32);

impl From<u32> for Ttl {
    fn from(raw: u32) -> Self {
        if raw > i32::MAX as u32 {
            Self(0)
        } else {
            Self(raw)
        }
    }
}

impl From<Ttl> for u32 {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttls_with_high_bit_become_zero() {
        let i32_max = i32::MAX as u32;
        assert_eq!(u32::from(Ttl::from(86400)), 86400);
        assert_eq!(u32::from(Ttl::from(i32_max)), i32_max);
        assert_eq!(u32::from(Ttl::from(i32_max + 1)), 0);
        assert_eq!(Ttl::default(), Ttl::from(0));
    }
}
