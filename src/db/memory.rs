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

//! Implementation of [`MemoryDriver`], a [`Driver`] backed by in-memory
//! record tables.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::{Driver, Error, NodeBuilder};
use crate::name::Name;

/// A record in text form, as a driver hands it to a [`NodeBuilder`].
#[derive(Clone, Debug)]
struct TextRecord {
    rr_type: String,
    ttl: u32,
    data: String,
}

#[derive(Clone, Debug)]
struct Soa {
    mname: String,
    rname: String,
    serial: u32,
}

/// The records of one zone, kept as text.
#[derive(Clone, Debug)]
pub struct ZoneTable {
    origin: Name,
    soa: Option<Soa>,
    authority: Vec<TextRecord>,
    records: HashMap<Name, Vec<TextRecord>>,
}

impl ZoneTable {
    pub fn new(origin: Name) -> Self {
        Self {
            origin,
            soa: None,
            authority: Vec::new(),
            records: HashMap::new(),
        }
    }

    pub fn origin(&self) -> &Name {
        &self.origin
    }

    /// Sets the SOA record served at the apex. Its timers and TTL are
    /// the ones [`NodeBuilder::put_soa`] uses.
    pub fn set_soa(&mut self, mname: &str, rname: &str, serial: u32) {
        self.soa = Some(Soa {
            mname: mname.to_owned(),
            rname: rname.to_owned(),
            serial,
        });
    }

    /// Adds an apex record served by the authority callback (usually
    /// NS).
    pub fn add_authority(&mut self, rr_type: &str, ttl: u32, data: &str) {
        self.authority.push(TextRecord {
            rr_type: rr_type.to_owned(),
            ttl,
            data: data.to_owned(),
        });
    }

    /// Adds a record owned by `owner`. Records are handed out in the
    /// order they were added.
    pub fn add_record(&mut self, owner: Name, rr_type: &str, ttl: u32, data: &str) {
        self.records.entry(owner).or_default().push(TextRecord {
            rr_type: rr_type.to_owned(),
            ttl,
            data: data.to_owned(),
        });
    }

    /// Returns the number of names with records (not counting the
    /// authority records).
    pub fn name_count(&self) -> usize {
        self.records.len()
    }
}

/// A [`Driver`] that serves zones from [`ZoneTable`]s.
///
/// Tables are loaded before the driver is registered. A database can
/// only be created for a zone the driver has a table for. Driver
/// callbacks see only the zone's origin, so a driver holds at most one
/// table per origin; zones of different classes sharing an origin need
/// separate drivers.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    zones: HashMap<Name, Arc<ZoneTable>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `zone`. Fails with [`Error::AlreadyExists`] if a table is
    /// already loaded for its origin.
    pub fn load(&mut self, zone: ZoneTable) -> Result<(), Error> {
        match self.zones.entry(zone.origin.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(zone));
                Ok(())
            }
        }
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}

fn parse_name(text: &str) -> Result<Name, Error> {
    Name::from_str_relative(text, &Name::root()).or(Err(Error::NotFound))
}

impl Driver for MemoryDriver {
    type ZoneData = Arc<ZoneTable>;

    fn lookup(
        &self,
        _zone: &str,
        name: &str,
        data: Option<&Arc<ZoneTable>>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error> {
        let table = data.ok_or(Error::NotFound)?;
        let records = table
            .records
            .get(&parse_name(name)?)
            .ok_or(Error::NotFound)?;
        for record in records {
            node.put_record(&record.rr_type, record.ttl, &record.data)?;
        }
        Ok(())
    }

    fn authority(
        &self,
        _zone: &str,
        data: Option<&Arc<ZoneTable>>,
        node: &mut NodeBuilder,
    ) -> Result<(), Error> {
        let table = data.ok_or(Error::NotFound)?;
        if let Some(ref soa) = table.soa {
            node.put_soa(&soa.mname, &soa.rname, soa.serial)?;
        }
        for record in &table.authority {
            node.put_record(&record.rr_type, record.ttl, &record.data)?;
        }
        Ok(())
    }

    fn create(&self, zone: &str, args: &[&str]) -> Result<Option<Arc<ZoneTable>>, Error> {
        let table = self.zones.get(&parse_name(zone)?).ok_or(Error::NotFound)?;
        if !args.is_empty() {
            debug!("Ignoring {} argument(s) for in-memory zone {}.", args.len(), zone);
        }
        Ok(Some(table.clone()))
    }

    fn destroy(&self, zone: &str, data: Option<Arc<ZoneTable>>) {
        drop(data);
        debug!("Released in-memory zone {}.", zone);
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Options, Registry};
    use crate::rr::{Ttl, Type};

    fn name(text: &str) -> Name {
        text.parse().unwrap()
    }

    fn registry_with(zone: ZoneTable) -> Registry {
        let mut driver = MemoryDriver::new();
        driver.load(zone).unwrap();
        let registry = Registry::new();
        registry.register("memory", driver).unwrap();
        registry
    }

    #[test]
    fn unknown_zones_cannot_be_created() {
        let registry = registry_with(ZoneTable::new(name("example.")));
        let result = Database::create_with(
            &registry,
            &name("example.net."),
            "memory",
            &[],
            &Options::default(),
        );
        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[test]
    fn origins_are_loaded_once() {
        let mut first = ZoneTable::new(name("example."));
        first.add_record(name("www.example."), "TXT", 60, "\"in-data\"");
        let mut second = ZoneTable::new(name("Example."));
        second.add_record(name("www.example."), "TXT", 60, "\"ch-data\"");

        let mut driver = MemoryDriver::new();
        driver.load(first).unwrap();
        assert_eq!(driver.load(second), Err(Error::AlreadyExists));
        assert_eq!(driver.zone_count(), 1);

        let registry = Registry::new();
        registry.register("memory", driver).unwrap();
        let db = Database::create_with(&registry, &name("example."), "memory", &[], &Options::default())
            .unwrap();
        let node = db.find_node(&name("www.example."), false).unwrap();
        let txt = node.find_rrset(Type::TXT).unwrap();
        assert_eq!(txt.rdatas()[0].octets(), b"\x07in-data");
    }

    #[test]
    fn records_keep_insertion_order() {
        let mut zone = ZoneTable::new(name("example."));
        zone.add_record(name("host.example."), "TXT", 60, "second");
        zone.add_record(name("host.example."), "A", 60, "192.0.2.1");
        zone.add_record(name("HOST.example."), "TXT", 60, "first");
        assert_eq!(zone.name_count(), 1);
        let registry = registry_with(zone);
        let db = Database::create_with(
            &registry,
            &name("example."),
            "memory",
            &["ignored"],
            &Options::default(),
        )
        .unwrap();

        let node = db.find_node(&name("Host.Example."), false).unwrap();
        let types: Vec<Type> = node.rrsets().map(|r| r.rr_type()).collect();
        assert_eq!(types, [Type::TXT, Type::A]);
        let txt = node.find_rrset(Type::TXT).unwrap();
        assert_eq!(txt.rdatas()[0].octets(), b"\x06second");
        assert_eq!(txt.rdatas()[1].octets(), b"\x05first");
    }

    #[test]
    fn apex_gets_authority_records() {
        let mut zone = ZoneTable::new(name("example."));
        zone.set_soa("ns1.example.", "hostmaster.example.", 7);
        zone.add_authority("NS", 3600, "ns1.example.");
        zone.add_authority("NS", 3600, "ns2.example.");
        zone.add_record(name("example."), "MX", 300, "10 mail.example.");
        let registry = registry_with(zone);
        let db = Database::create_with(&registry, &name("example."), "memory", &[], &Options::default())
            .unwrap();

        let apex = db.find_node(&name("example."), false).unwrap();
        let types: Vec<Type> = apex.rrsets().map(|r| r.rr_type()).collect();
        assert_eq!(types, [Type::MX, Type::SOA, Type::NS]);
        assert_eq!(apex.find_rrset(Type::NS).unwrap().len(), 2);
    }

    #[test]
    fn out_of_range_ttls_are_read_as_zero() {
        let mut zone = ZoneTable::new(name("example."));
        zone.add_record(name("big.example."), "TXT", 0x8000_0000, "\"big\"");
        let registry = registry_with(zone);
        let db = Database::create_with(&registry, &name("example."), "memory", &[], &Options::default())
            .unwrap();
        let node = db.find_node(&name("big.example."), false).unwrap();
        let txt = node.find_rrset(Type::TXT).unwrap();
        assert_eq!(txt.raw_ttl(), 0x8000_0000);
        assert_eq!(txt.ttl(), Ttl::from(0));
        assert!(txt.to_string().starts_with("big.example. 0 IN TXT"));
    }

    #[test]
    fn missing_names_are_not_found() {
        let registry = registry_with(ZoneTable::new(name("example.")));
        let db = Database::create_with(&registry, &name("example."), "memory", &[], &Options::default())
            .unwrap();
        assert_eq!(
            db.find_node(&name("nowhere.example."), false).err(),
            Some(Error::NotFound)
        );
    }

    #[test]
    fn bad_record_text_fails_the_lookup() {
        let mut zone = ZoneTable::new(name("example."));
        zone.add_record(name("bad.example."), "A", 60, "not-an-address");
        zone.add_record(name("odd.example."), "BOGUS", 60, "whatever");
        let registry = registry_with(zone);
        let db = Database::create_with(&registry, &name("example."), "memory", &[], &Options::default())
            .unwrap();
        assert!(matches!(
            db.find_node(&name("bad.example."), false),
            Err(Error::InvalidRdata(_))
        ));
        assert!(matches!(
            db.find_node(&name("odd.example."), false),
            Err(Error::UnknownType(_))
        ));
    }

    #[test]
    fn root_zone_is_supported() {
        let mut zone = ZoneTable::new(Name::root());
        zone.set_soa("a.root-servers.net.", "nstld.verisign-grs.com.", 1);
        zone.add_record(name("arpa."), "NS", 172800, "a.root-servers.net.");
        let registry = registry_with(zone);
        let db = Database::create_with(&registry, &Name::root(), "memory", &[], &Options::default())
            .unwrap();
        assert_eq!(db.zone_text(), ".");
        assert!(db.find_node(&name("arpa."), false).is_ok());
        assert!(db.find_node(&Name::root(), false).is_ok());
    }
}
