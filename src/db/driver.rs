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

//! Definition of the [`Driver`] trait.

use std::any::Any;

use super::{Error, NodeBuilder};

/// The capability interface implemented by simple-database drivers.
///
/// A driver answers for the data of zones, one name at a time. When a
/// query walks through a zone, the database calls [`Driver::lookup`]
/// for each name it examines and hands the driver a [`NodeBuilder`];
/// the driver adds that name's records to the builder in text form.
/// For the zone apex, [`Driver::authority`] is called as well, to add
/// the SOA and NS records.
///
/// Zone names and owner names are passed as text without the trailing
/// dot (the root is `.`).
///
/// Drivers may keep per-zone state. [`Driver::create`] builds it when a
/// database is created and [`Driver::destroy`] receives it back when
/// the last handle to that database goes away. Every callback may be
/// invoked from many threads at once.
pub trait Driver: Send + Sync + 'static {
    /// Per-zone state built by [`Driver::create`].
    type ZoneData: Send + Sync + 'static;

    /// Adds the records of `name` in `zone` to `node`. Returns
    /// [`Error::NotFound`] if the name does not exist.
    fn lookup(
        &self,
        zone: &str,
        name: &str,
        data: Option<&Self::ZoneData>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error>;

    /// Adds the authority records (SOA and NS) of `zone` to `node`.
    fn authority(
        &self,
        zone: &str,
        data: Option<&Self::ZoneData>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error>;

    /// Builds the per-zone state for `zone` from the driver arguments
    /// given when the database was created. The default builds none.
    fn create(&self, zone: &str, args: &[&str]) -> Result<Option<Self::ZoneData>, Error> {
        let _ = (zone, args);
        Ok(None)
    }

    /// Tears down the per-zone state of `zone`. The default drops it.
    fn destroy(&self, zone: &str, data: Option<Self::ZoneData>) {
        let _ = (zone, data);
    }
}

/// Boxed per-zone state with its type erased.
pub(super) type AnyZoneData = Box<dyn Any + Send + Sync>;

/// An object-safe form of [`Driver`], so that drivers of different
/// types can share the registry.
pub(super) trait DynDriver: Send + Sync {
    fn lookup(
        &self,
        zone: &str,
        name: &str,
        data: Option<&AnyZoneData>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error>;

    fn authority(
        &self,
        zone: &str,
        data: Option<&AnyZoneData>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error>;

    fn create(&self, zone: &str, args: &[&str]) -> Result<Option<AnyZoneData>, Error>;

    fn destroy(&self, zone: &str, data: Option<AnyZoneData>);
}

impl<D: Driver> DynDriver for D {
    fn lookup(
        &self,
        zone: &str,
        name: &str,
        data: Option<&AnyZoneData>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error> {
        Driver::lookup(self, zone, name, downcast_ref::<D>(data), node)
    }

    fn authority(
        &self,
        zone: &str,
        data: Option<&AnyZoneData>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error> {
        Driver::authority(self, zone, downcast_ref::<D>(data), node)
    }

    fn create(&self, zone: &str, args: &[&str]) -> Result<Option<AnyZoneData>, Error> {
        Driver::create(self, zone, args).map(|data| data.map(|d| Box::new(d) as AnyZoneData))
    }

    fn destroy(&self, zone: &str, data: Option<AnyZoneData>) {
        let data = data
            .and_then(|d| d.downcast::<D::ZoneData>().ok())
            .map(|d| *d);
        Driver::destroy(self, zone, data)
    }
}

/// Recovers a driver's typed zone state. The state stored with a
/// database always comes from the same driver's `create`, so the
/// downcast only fails if there is no state.
fn downcast_ref<D: Driver>(data: Option<&AnyZoneData>) -> Option<&D::ZoneData> {
    data.and_then(|d| d.downcast_ref::<D::ZoneData>())
}
