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

//! Implementation of [`Node`]s and the [`NodeBuilder`] that drivers
//! fill.

use std::fmt::{self, Write};
use std::sync::Arc;

use arrayvec::ArrayString;
use log::trace;

use super::iter::RrsetIter;
use super::rrset::{Rrset, RrsetList};
use super::{Database, Error};
use crate::class::Class;
use crate::name::Name;
use crate::rr::rdata::{self, RdataBuffer, TextError, MAX_RDATA_LEN};
use crate::rr::{Rdata, Ttl, Type};

/// The SOA timers (REFRESH, RETRY, EXPIRE, MINIMUM) used by
/// [`NodeBuilder::put_soa`], in seconds.
pub const SOA_REFRESH: u32 = 28800;
pub const SOA_RETRY: u32 = 7200;
pub const SOA_EXPIRE: u32 = 604800;
pub const SOA_MINIMUM: u32 = 86400;

/// The TTL of SOA records added by [`NodeBuilder::put_soa`].
pub const SOA_TTL: u32 = 86400;

/// The size of the scratch buffer in which [`NodeBuilder::put_soa`]
/// formats SOA text: two names of up to 1023 characters, five 10-digit
/// numbers, and the separating spaces.
const SOA_TEXT_CAPACITY: usize = 2 * 1023 + 5 * 10 + 6;

////////////////////////////////////////////////////////////////////////
// RDATA BUFFER LIMITS                                                //
////////////////////////////////////////////////////////////////////////

/// Controls the buffer used to parse RDATA text.
///
/// Parsing starts with a buffer of `initial_buffer` octets. Whenever
/// the parser reports that the buffer is too small, the size is doubled
/// and the parse is tried again, for at most `max_attempts` attempts in
/// total. The defaults (64 octets, 11 attempts) reach 65,536 octets,
/// which is enough for any RDATA.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RdataLimits {
    pub initial_buffer: usize,
    pub max_attempts: u32,
}

impl Default for RdataLimits {
    fn default() -> Self {
        Self {
            initial_buffer: 64,
            max_attempts: 11,
        }
    }
}

impl RdataLimits {
    /// Parses `text` as RDATA of type `rr_type` in class `class`,
    /// growing the buffer as described above. Relative names in the
    /// text are completed with the root.
    pub fn parse(&self, text: &str, class: Class, rr_type: Type) -> Result<Rdata, Error> {
        let root = Name::root();
        let mut size = self.initial_buffer.max(1);
        for _ in 0..self.max_attempts {
            let mut buffer = RdataBuffer::new(size);
            match rdata::text::parse(text, class, rr_type, &root, &mut buffer) {
                Ok(()) => return Ok(buffer.into_rdata()),
                Err(TextError::NoSpace) if buffer.capacity() < MAX_RDATA_LEN => {
                    trace!("{} octets are too few for {} RDATA; retrying.", size, rr_type);
                    size = size.saturating_mul(2);
                }
                Err(TextError::NoSpace) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::RdataTooLarge)
    }
}

////////////////////////////////////////////////////////////////////////
// NODE CONSTRUCTION                                                  //
////////////////////////////////////////////////////////////////////////

/// The construction context handed to [`Driver`](super::Driver)
/// callbacks.
///
/// A driver adds the records of the name being looked up with
/// [`NodeBuilder::put_record`] and [`NodeBuilder::put_soa`]. Once the
/// callbacks return, the records are frozen into a [`Node`]; records
/// can never be added to a node afterward.
#[derive(Debug)]
pub struct NodeBuilder {
    class: Class,
    limits: RdataLimits,
    rrsets: RrsetList,
}

impl NodeBuilder {
    pub(super) fn new(class: Class, limits: RdataLimits) -> Self {
        Self {
            class,
            limits,
            rrsets: RrsetList::default(),
        }
    }

    /// Adds a record of the type named by `type_text` (e.g. `"A"` or
    /// `"TYPE65280"`) with TTL `ttl` and RDATA in presentation format.
    ///
    /// All records of one type at a node form one RRset, and they must
    /// share a TTL: adding a record whose TTL differs from its RRset's
    /// fails with [`Error::TtlMismatch`] and leaves the RRset as it
    /// was.
    pub fn put_record(&mut self, type_text: &str, ttl: u32, data: &str) -> Result<(), Error> {
        let rr_type: Type = type_text.parse().map_err(Error::UnknownType)?;
        self.rrsets.check_ttl(rr_type, ttl)?;
        let rdata = self.limits.parse(data, self.class, rr_type)?;
        self.rrsets.add(rr_type, ttl, rdata)
    }

    /// Adds an SOA record with the given MNAME, RNAME, and SERIAL. The
    /// timers are [`SOA_REFRESH`], [`SOA_RETRY`], [`SOA_EXPIRE`], and
    /// [`SOA_MINIMUM`], and the TTL is [`SOA_TTL`].
    pub fn put_soa(&mut self, mname: &str, rname: &str, serial: u32) -> Result<(), Error> {
        let mut text = ArrayString::<SOA_TEXT_CAPACITY>::new();
        write!(
            text,
            "{} {} {} {} {} {} {}",
            mname, rname, serial, SOA_REFRESH, SOA_RETRY, SOA_EXPIRE, SOA_MINIMUM
        )
        .or(Err(Error::Overflow))?;
        self.put_record("SOA", SOA_TTL, &text)
    }

    /// Returns the number of RRsets added so far.
    pub fn rrset_count(&self) -> usize {
        self.rrsets.len()
    }

    pub(super) fn finish(self, db: Database, name: Name) -> Node {
        Node {
            inner: Arc::new(NodeInner {
                db,
                name,
                rrsets: self.rrsets,
            }),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// NODES                                                              //
////////////////////////////////////////////////////////////////////////

/// A handle to the records of one name, as supplied by a driver.
///
/// Nodes are created during lookups and are immutable. Cloning a `Node`
/// attaches another handle; dropping one detaches it. The records are
/// freed when the last handle (including those held by [`RrsetRef`]s
/// and [`RrsetIter`]s) goes away. Each node holds a handle to its
/// [`Database`], keeping the database alive too.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    db: Database,
    name: Name,
    rrsets: RrsetList,
}

impl Node {
    /// Attaches a new handle to the node.
    pub fn attach(&self) -> Self {
        self.clone()
    }

    /// Detaches this handle.
    pub fn detach(self) {}

    /// Returns the number of live handles to the node.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns the name of the node.
    pub fn name(&self) -> &Name {
        &self.inner.name
    }

    /// Returns the database the node belongs to.
    pub fn database(&self) -> &Database {
        &self.inner.db
    }

    /// Returns the number of RRsets at the node.
    pub fn rrset_count(&self) -> usize {
        self.inner.rrsets.len()
    }

    /// Looks up the RRset of type `rr_type`.
    ///
    /// Fails with [`Error::NotImplemented`] for SIG, since simple
    /// databases have no DNSSEC support, and with [`Error::NotFound`]
    /// if the node has no such RRset.
    pub fn find_rrset(&self, rr_type: Type) -> Result<RrsetRef, Error> {
        if rr_type == Type::SIG {
            return Err(Error::NotImplemented);
        }
        self.inner
            .rrsets
            .lookup(rr_type)
            .map(|(index, _)| RrsetRef::new(self.clone(), index))
            .ok_or(Error::NotFound)
    }

    /// Returns an iterator over the RRsets at the node, in the order
    /// the driver added them.
    pub fn rrsets(&self) -> impl Iterator<Item = RrsetRef> + '_ {
        (0..self.rrset_count()).map(|index| RrsetRef::new(self.clone(), index))
    }

    /// Returns a cursor over the RRsets at the node.
    pub fn all_rrsets(&self) -> RrsetIter {
        RrsetIter::new(self.clone())
    }

    pub(super) fn rrset(&self, index: usize) -> Option<&Rrset> {
        self.inner.rrsets.get(index)
    }
}

/// Lists every record at the node in master-file format.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rrset in self.rrsets() {
            write!(f, "{}", rrset)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.inner.name)
            .field("rrsets", &self.inner.rrsets)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// RRSET REFERENCES                                                   //
////////////////////////////////////////////////////////////////////////

/// An RRset at a [`Node`]. The `RrsetRef` holds a handle to the node,
/// so the RRset stays valid for as long as the `RrsetRef` exists.
#[derive(Clone)]
pub struct RrsetRef {
    node: Node,
    index: usize,
}

impl RrsetRef {
    /// Creates a reference to RRset `index` of `node`. The index must
    /// be in range.
    pub(super) fn new(node: Node, index: usize) -> Self {
        assert!(index < node.rrset_count());
        Self { node, index }
    }

    fn rrset(&self) -> &Rrset {
        // The index was checked in RrsetRef::new, and nodes are
        // immutable.
        self.node
            .rrset(self.index)
            .unwrap_or_else(|| unreachable!())
    }

    /// Returns the node the RRset belongs to.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Returns the type of the RRset.
    pub fn rr_type(&self) -> Type {
        self.rrset().rr_type
    }

    /// Returns the class of the RRset, which is that of its database.
    pub fn class(&self) -> Class {
        self.node.database().class()
    }

    /// Returns the TTL of the RRset, read according to RFC 2181 (values
    /// above 2^31 - 1 are 0).
    pub fn ttl(&self) -> Ttl {
        Ttl::from(self.rrset().ttl)
    }

    /// Returns the TTL of the RRset exactly as the driver gave it.
    pub fn raw_ttl(&self) -> u32 {
        self.rrset().ttl
    }

    /// Returns the RDATA of the records, in the order added.
    pub fn rdatas(&self) -> &[Rdata] {
        &self.rrset().rdatas
    }

    /// Returns the number of records in the RRset.
    pub fn len(&self) -> usize {
        self.rdatas().len()
    }

    /// Returns whether the RRset has no records. (Never true for RRsets
    /// built by a [`NodeBuilder`].)
    pub fn is_empty(&self) -> bool {
        self.rdatas().is_empty()
    }
}

/// Writes one master-file line per record.
impl fmt::Display for RrsetRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (class, rr_type) = (self.class(), self.rr_type());
        for rdata in self.rdatas() {
            writeln!(
                f,
                "{} {} {} {} {}",
                self.node.name(),
                self.ttl(),
                class,
                rr_type,
                rdata.display_as(class, rr_type)
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for RrsetRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RrsetRef")
            .field("name", self.node.name())
            .field("rrset", self.rrset())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
