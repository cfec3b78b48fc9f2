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

//! Implementation of the [`Database`] type.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};

use super::driver::{AnyZoneData, DynDriver};
use super::node::{NodeBuilder, RdataLimits};
use super::{Error, Node, Registry};
use crate::class::Class;
use crate::name::Name;
use crate::rr::{Rdata, Ttl, Type};

////////////////////////////////////////////////////////////////////////
// OPTIONS AND VERSIONS                                               //
////////////////////////////////////////////////////////////////////////

/// The kind of database to create. Simple databases only serve zones.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DbType {
    #[default]
    Zone,
    Cache,
}

/// Options for [`Database::create_with`].
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub db_type: DbType,
    pub class: Class,
    pub rdata_limits: RdataLimits,
}

/// A database version.
///
/// Simple databases have no transactions: their only version is
/// [`Version::Single`], which always reflects whatever the driver
/// currently returns. [`Version::Serial`] is for databases with real
/// versions and is never produced here.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Version {
    Single,
    Serial(u32),
}

////////////////////////////////////////////////////////////////////////
// DATABASE                                                           //
////////////////////////////////////////////////////////////////////////

/// A handle to a simple database: a zone whose data comes from a
/// [`Driver`](super::Driver).
///
/// Cloning a `Database` (or calling [`Database::attach`]) attaches
/// another handle, and dropping one (or calling
/// [`Database::detach`]) detaches it. Every [`Node`] also holds a
/// handle. When the last handle goes away, the driver's
/// [`destroy`](super::Driver::destroy) callback receives the zone
/// state, exactly once.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    origin: Name,
    zone_text: String,
    class: Class,
    driver_name: String,
    driver: Arc<dyn DynDriver>,
    zone_data: Option<AnyZoneData>,
    rdata_limits: RdataLimits,
}

impl Database {
    /// Creates a database for the zone `origin` in class `class`,
    /// served by the driver registered in the process-wide registry
    /// under `driver_name`. `args` are passed to the driver's
    /// [`create`](super::Driver::create) callback.
    pub fn create(
        origin: &Name,
        class: Class,
        driver_name: &str,
        args: &[&str],
    ) -> Result<Self, Error> {
        let options = Options {
            class,
            ..Default::default()
        };
        Self::create_with(Registry::global(), origin, driver_name, args, &options)
    }

    /// Creates a database using the driver registered in `registry`
    /// under `driver_name`.
    ///
    /// Fails with [`Error::NotFound`] if there is no such driver, with
    /// [`Error::NotImplemented`] if `options` asks for a cache, and
    /// with the driver's error if its `create` callback fails.
    pub fn create_with(
        registry: &Registry,
        origin: &Name,
        driver_name: &str,
        args: &[&str],
        options: &Options,
    ) -> Result<Self, Error> {
        let driver = registry.get(driver_name).ok_or(Error::NotFound)?;
        if options.db_type != DbType::Zone {
            return Err(Error::NotImplemented);
        }

        let zone_text = origin.to_text(true);
        let zone_data = driver.create(&zone_text, args)?;
        debug!(
            "Created simple database for zone {} ({}) with driver {}.",
            origin, options.class, driver_name
        );
        Ok(Self {
            inner: Arc::new(Inner {
                origin: origin.clone(),
                zone_text,
                class: options.class,
                driver_name: driver_name.to_owned(),
                driver,
                zone_data,
                rdata_limits: options.rdata_limits,
            }),
        })
    }

    /// Attaches a new handle to the database.
    pub fn attach(&self) -> Self {
        self.clone()
    }

    /// Detaches this handle.
    pub fn detach(self) {}

    /// Returns the number of live handles to the database, including
    /// those held by nodes.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn origin(&self) -> &Name {
        &self.inner.origin
    }

    pub fn class(&self) -> Class {
        self.inner.class
    }

    /// Returns the origin in the text form given to the driver.
    pub fn zone_text(&self) -> &str {
        &self.inner.zone_text
    }

    pub fn driver_name(&self) -> &str {
        &self.inner.driver_name
    }

    /// Simple databases never hold DNSSEC-signed data.
    pub fn is_secure(&self) -> bool {
        false
    }

    /// The data lives with the driver, not in the database.
    pub fn is_persistent(&self) -> bool {
        true
    }

    /// Nodes exist only while referenced, so the count is always 0.
    pub fn node_count(&self) -> usize {
        0
    }

    ////////////////////////////////////////////////////////////////////
    // VERSIONS                                                       //
    ////////////////////////////////////////////////////////////////////

    pub fn current_version(&self) -> Version {
        Version::Single
    }

    pub fn new_version(&self) -> Result<Version, Error> {
        Err(Error::NotImplemented)
    }

    /// Attaches to `version`, which must be [`Version::Single`].
    pub fn attach_version(&self, version: &Version) -> Version {
        assert_eq!(*version, Version::Single, "not a version of this database");
        Version::Single
    }

    /// Closes `version`, which must be [`Version::Single`]. Since
    /// nothing can be written, `commit` must be `false`.
    pub fn close_version(&self, version: Version, commit: bool) {
        assert_eq!(version, Version::Single, "not a version of this database");
        assert!(!commit, "simple databases cannot commit");
    }

    ////////////////////////////////////////////////////////////////////
    // UNSUPPORTED OPERATIONS                                         //
    ////////////////////////////////////////////////////////////////////

    pub fn begin_load(&self) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn end_load(&self) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn dump(&self, _version: &Version, _path: &Path) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn find_zone_cut(&self, _name: &Name) -> Result<Node, Error> {
        Err(Error::NotImplemented)
    }

    pub fn create_iterator(&self) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn add_rrset(
        &self,
        _node: &Node,
        _version: &Version,
        _rr_type: Type,
        _ttl: Ttl,
        _rdatas: &[Rdata],
    ) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn subtract_rrset(
        &self,
        _node: &Node,
        _version: &Version,
        _rr_type: Type,
        _rdatas: &[Rdata],
    ) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn delete_rrset(&self, _node: &Node, _version: &Version, _rr_type: Type) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    pub fn expire_node(&self, _node: &Node) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }

    ////////////////////////////////////////////////////////////////////
    // NODE LOOKUP                                                    //
    ////////////////////////////////////////////////////////////////////

    /// Builds the [`Node`] for `name` by asking the driver for its
    /// records.
    ///
    /// For the zone origin, the driver's `authority` callback is called
    /// as well. A failed `lookup` is tolerated at the origin (the
    /// authority records may stand alone), but a failed `authority` is
    /// not. Elsewhere, a failed `lookup` is returned as is.
    ///
    /// Simple databases never create nodes on demand, so `create` must
    /// be `false`.
    pub fn find_node(&self, name: &Name, create: bool) -> Result<Node, Error> {
        assert!(!create, "simple databases cannot create nodes");
        let inner = &*self.inner;
        let name_text = name.to_text(true);
        let is_origin = *name == inner.origin;
        let zone_data = inner.zone_data.as_ref();

        let mut builder = NodeBuilder::new(inner.class, inner.rdata_limits);
        match inner
            .driver
            .lookup(&inner.zone_text, &name_text, zone_data, &mut builder)
        {
            Ok(()) => (),
            Err(e) if is_origin => trace!("Lookup of origin {} failed ({}); continuing.", name, e),
            Err(e) => return Err(e),
        }
        if is_origin {
            inner
                .driver
                .authority(&inner.zone_text, zone_data, &mut builder)?;
        }

        trace!("Built node {} with {} RRset(s).", name, builder.rrset_count());
        Ok(builder.finish(self.clone(), name.clone()))
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        debug!("Destroying simple database for zone {}.", self.origin);
        self.driver.destroy(&self.zone_text, self.zone_data.take());
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Database")
            .field("origin", &self.inner.origin)
            .field("class", &self.inner.class)
            .field("driver_name", &self.inner.driver_name)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
