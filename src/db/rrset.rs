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

//! Internal-use data structures for storing the RRsets of a node.

use super::Error;
use crate::rr::{Rdata, Type};

/// Stores an RRset in memory.
///
/// This is missing the NAME and CLASS fields. It's not necessary to
/// store these, since the owning node and database provide them. The
/// TTL is kept exactly as the driver gave it; the RFC 2181 reading of
/// it happens when it is presented.
#[derive(Clone, Debug)]
pub struct Rrset {
    pub rr_type: Type,
    pub ttl: u32,
    pub rdatas: Vec<Rdata>,
}

/// Stores all of the RRsets at a node, in the order in which their
/// types were first added. There is at most one [`Rrset`] per type.
#[derive(Clone, Debug, Default)]
pub struct RrsetList {
    rrsets: Vec<Rrset>,
}

impl RrsetList {
    /// Checks that a record of type `rr_type` with TTL `ttl` could be
    /// added, i.e. that an existing [`Rrset`] of that type has the
    /// same TTL.
    pub fn check_ttl(&self, rr_type: Type, ttl: u32) -> Result<(), Error> {
        match self.lookup(rr_type) {
            Some((_, rrset)) if rrset.ttl != ttl => Err(Error::TtlMismatch),
            _ => Ok(()),
        }
    }

    /// Adds a resource record to the `RrsetList`, creating its
    /// [`Rrset`] with TTL `ttl` if needed.
    ///
    /// This will fail if the TTL of the new record does not match
    /// the rest of the records in its [`Rrset`]; the list is left
    /// unchanged in that case. Records are kept in the order added,
    /// duplicates included.
    pub fn add(&mut self, rr_type: Type, ttl: u32, rdata: Rdata) -> Result<(), Error> {
        match self.rrsets.iter_mut().find(|r| r.rr_type == rr_type) {
            Some(rrset) if rrset.ttl != ttl => Err(Error::TtlMismatch),
            Some(rrset) => {
                rrset.rdatas.push(rdata);
                Ok(())
            }
            None => {
                self.rrsets.push(Rrset {
                    rr_type,
                    ttl,
                    rdatas: vec![rdata],
                });
                Ok(())
            }
        }
    }

    /// Looks up the [`Rrset`] of type `rr_type`, returning it with its
    /// index in the list.
    pub fn lookup(&self, rr_type: Type) -> Option<(usize, &Rrset)> {
        self.rrsets
            .iter()
            .enumerate()
            .find(|(_, r)| r.rr_type == rr_type)
    }

    /// Returns the [`Rrset`] at `index`.
    pub fn get(&self, index: usize) -> Option<&Rrset> {
        self.rrsets.get(index)
    }

    /// Returns the number of RRsets in the list.
    pub fn len(&self) -> usize {
        self.rrsets.len()
    }

    /// Returns whether the list has no RRsets.
    pub fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn rdata(octets: &[u8]) -> Rdata {
        Rdata::try_from(octets).unwrap()
    }

    #[test]
    fn rrsetlist_works() {
        let loopback1 = rdata(&[127, 0, 0, 1]);
        let loopback2 = rdata(&[127, 0, 0, 2]);
        let domain = rdata(b"\x04test\x00");
        let mut rrsets = RrsetList::default();
        rrsets.add(Type::CNAME, 7200, domain.clone()).unwrap();
        rrsets.add(Type::A, 3600, loopback1.clone()).unwrap();
        rrsets.add(Type::A, 3600, loopback2.clone()).unwrap();

        let (index, a_rrset) = rrsets.lookup(Type::A).unwrap();
        assert_eq!(index, 1);
        assert_eq!(a_rrset.rdatas, [loopback1, loopback2]);
        let (index, cname_rrset) = rrsets.lookup(Type::CNAME).unwrap();
        assert_eq!(index, 0);
        assert_eq!(cname_rrset.rdatas, [domain]);
        assert!(rrsets.lookup(Type::AAAA).is_none());
        assert_eq!(rrsets.len(), 2);
    }

    #[test]
    fn rrsetlist_rejects_ttl_mismatch() {
        let domain1 = rdata(b"\x04test\x00");
        let domain2 = rdata(b"\x07invalid\x00");
        let mut rrsets = RrsetList::default();
        rrsets.add(Type::NS, 3600, domain1).unwrap();
        assert_eq!(rrsets.check_ttl(Type::NS, 7200), Err(Error::TtlMismatch));
        assert_eq!(
            rrsets.add(Type::NS, 7200, domain2),
            Err(Error::TtlMismatch),
        );
        let (_, ns_rrset) = rrsets.lookup(Type::NS).unwrap();
        assert_eq!(ns_rrset.ttl, 3600);
        assert_eq!(ns_rrset.rdatas.len(), 1);
    }

    #[test]
    fn rrsetlist_compares_raw_ttls() {
        let mut rrsets = RrsetList::default();
        rrsets.add(Type::A, 0, rdata(&[192, 0, 2, 1])).unwrap();
        // Both TTLs read as 0 under RFC 2181, but they still differ.
        assert_eq!(
            rrsets.add(Type::A, 0x8000_0000, rdata(&[192, 0, 2, 2])),
            Err(Error::TtlMismatch)
        );
        rrsets.add(Type::TXT, u32::MAX, rdata(b"\x01x")).unwrap();
        assert_eq!(rrsets.lookup(Type::TXT).unwrap().1.ttl, u32::MAX);
    }
}
