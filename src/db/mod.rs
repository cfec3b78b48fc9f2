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

//! Simple databases: read-only DNS zones whose data comes from pluggable
//! drivers.
//!
//! A full zone database keeps every record of a zone in a tree. A
//! *simple* database keeps nothing. Whenever a query examines a name,
//! the database asks a [`Driver`] for that name's records, which the
//! driver supplies as text. The records are parsed into a [`Node`],
//! used to answer the query, and freed when no longer referenced. This
//! makes it easy to serve zones out of an external source (an SQL
//! database, a directory service, a script) without loading them.
//!
//! ## Drivers and the registry
//!
//! Drivers implement the [`Driver`] trait and are registered by name in
//! a [`Registry`]. A [`Database`] is created for a zone origin and a
//! driver name; the driver's [`Driver::create`] callback may build
//! per-zone state at that point, and [`Driver::destroy`] receives it
//! back when the last handle to the database goes away.
//! [`MemoryDriver`] is a ready-made driver serving [`ZoneTable`]s.
//!
//! ## Lookups
//!
//! Since a driver answers for one name at a time, [`Database::find`]
//! reconstructs the structure of the zone by walking from the origin
//! down to the query name and building the node at each step. Along
//! the way it detects zone cuts (NS RRsets below the apex), DNAME
//! redirections, and, at the query name itself, aliases (CNAME). See
//! [`Database::find`] for the exact rules and [`Outcome`] for the
//! possible results.
//!
//! Simple databases are read-only and have a single version. The
//! operations of full databases that would modify the zone, load or
//! dump it, or iterate over all of its names fail with
//! [`Error::NotImplemented`].

mod database;
mod driver;
mod error;
mod find;
mod iter;
mod memory;
mod node;
mod registry;
mod rrset;

pub use database::{Database, DbType, Options, Version};
pub use driver::Driver;
pub use error::Error;
pub use find::{FindResult, Outcome};
pub use iter::RrsetIter;
pub use memory::{MemoryDriver, ZoneTable};
pub use node::{
    Node, NodeBuilder, RdataLimits, RrsetRef, SOA_EXPIRE, SOA_MINIMUM, SOA_REFRESH, SOA_RETRY,
    SOA_TTL,
};
pub use registry::{register, unregister, Registry, DEFAULT_CAPACITY};
