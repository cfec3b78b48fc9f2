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

//! The lookup algorithm of simple databases.

use std::fmt;

use log::{debug, warn};

use super::{Database, Error, Node, RrsetRef, Version};
use crate::name::Name;
use crate::rr::Type;

/// The outcome of [`Database::find`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The requested RRset was found (or, for ANY queries, the name
    /// exists).
    Success,

    /// The name does not exist.
    NxDomain,

    /// The name exists, but has no RRset of the requested type (and no
    /// CNAME).
    NxRrset,

    /// The name is at or below a zone cut. The NS RRset is returned.
    Delegation,

    /// The name is below a DNAME. The DNAME RRset is returned.
    Dname,

    /// The name is an alias. The CNAME RRset is returned.
    Cname,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::NxDomain => f.write_str("no such domain"),
            Self::NxRrset => f.write_str("no such RRset"),
            Self::Delegation => f.write_str("delegation"),
            Self::Dname => f.write_str("DNAME redirection"),
            Self::Cname => f.write_str("alias"),
        }
    }
}

/// The result of [`Database::find`].
#[derive(Debug)]
pub struct FindResult {
    pub outcome: Outcome,

    /// The name at which the lookup stopped, i.e. the owner of `node`
    /// and `rrset`. This is `None` when the query name is outside the
    /// zone.
    pub found_name: Option<Name>,

    /// The node at which the lookup stopped, if one was requested and
    /// the name exists.
    pub node: Option<Node>,

    /// The RRset that determined the outcome: the requested RRset for
    /// [`Outcome::Success`] (except ANY queries), and the NS, DNAME, or
    /// CNAME RRset for the redirecting outcomes.
    pub rrset: Option<RrsetRef>,
}

impl Database {
    /// Looks up `name` and type `rr_type` in the zone.
    ///
    /// Since a driver only answers for one name at a time, the zone
    /// tree is reconstructed by walking from the origin toward `name`,
    /// one label at a time, and building the node at each step:
    ///
    /// 1. The origin itself is only examined if it is the query name.
    /// 2. A name the driver cannot look up counts as nonexistent, and
    ///    the walk continues with the next longer name.
    /// 3. Above the query name, a DNAME ends the walk with
    ///    [`Outcome::Dname`] (or with success, when the query is for
    ///    DNAME).
    /// 4. Below the origin, an NS RRset ends the walk with
    ///    [`Outcome::Delegation`] (or with success, when the query is for
    ///    NS).
    /// 5. At the query name, ANY queries succeed outright. Otherwise the
    ///    requested RRset gives success, then a CNAME gives
    ///    [`Outcome::Cname`] (unless CNAME was requested), and otherwise
    ///    the outcome is [`Outcome::NxRrset`].
    ///
    /// Names outside the zone give [`Outcome::NxDomain`]. The node at
    /// which the walk stops is returned if `want_node` is set; all
    /// other nodes are released. Driver errors while building the
    /// origin's node are returned as errors.
    pub fn find(
        &self,
        name: &Name,
        version: Option<&Version>,
        rr_type: Type,
        want_node: bool,
    ) -> Result<FindResult, Error> {
        if let Some(version) = version {
            assert_eq!(*version, Version::Single, "not a version of this database");
        }
        if !name.eq_or_subdomain_of(self.origin()) {
            return Ok(FindResult {
                outcome: Outcome::NxDomain,
                found_name: None,
                node: None,
                rrset: None,
            });
        }

        let n_origin_labels = self.origin().len();
        let n_labels = name.len();
        let mut outcome = Outcome::NxDomain;
        let mut node = None;
        let mut rrset = None;
        let mut n_found_labels = n_labels;

        for i in n_origin_labels..=n_labels {
            if i == n_origin_labels && i != n_labels {
                continue;
            }
            n_found_labels = i;
            // i never exceeds n_labels, so the suffix always exists.
            let suffix = name
                .superdomain(n_labels - i)
                .unwrap_or_else(|| unreachable!());
            let current = match self.find_node(&suffix, false) {
                Ok(current) => current,
                Err(e) if i == n_origin_labels => return Err(e),
                Err(Error::NotFound) => {
                    outcome = Outcome::NxDomain;
                    continue;
                }
                Err(e) => {
                    warn!("Lookup of {} failed ({}); treating it as nonexistent.", suffix, e);
                    outcome = Outcome::NxDomain;
                    continue;
                }
            };

            if i < n_labels {
                if let Ok(dname) = current.find_rrset(Type::DNAME) {
                    outcome = if rr_type == Type::DNAME {
                        Outcome::Success
                    } else {
                        Outcome::Dname
                    };
                    rrset = Some(dname);
                    node = Some(current);
                    break;
                }
            }

            if i != n_origin_labels {
                if let Ok(ns) = current.find_rrset(Type::NS) {
                    outcome = if rr_type == Type::NS {
                        Outcome::Success
                    } else {
                        Outcome::Delegation
                    };
                    rrset = Some(ns);
                    node = Some(current);
                    break;
                }
            }

            if i < n_labels {
                continue;
            }

            if rr_type == Type::ANY {
                outcome = Outcome::Success;
            } else if let Ok(found) = current.find_rrset(rr_type) {
                outcome = Outcome::Success;
                rrset = Some(found);
            } else {
                match current.find_rrset(Type::CNAME) {
                    Ok(cname) if rr_type != Type::CNAME => {
                        outcome = Outcome::Cname;
                        rrset = Some(cname);
                    }
                    _ => outcome = Outcome::NxRrset,
                }
            }
            node = Some(current);
        }

        let found_name = name
            .superdomain(n_labels - n_found_labels)
            .ok_or(Error::InconsistentDatabase)?;
        debug!("Lookup of {} {} ended at {}: {}.", name, rr_type, found_name, outcome);
        Ok(FindResult {
            outcome,
            found_name: Some(found_name),
            node: node.filter(|_| want_node),
            rrset,
        })
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use lazy_static::lazy_static;

    use super::*;
    use crate::class::Class;
    use crate::db::{Driver, MemoryDriver, NodeBuilder, Options, Registry, ZoneTable};

    lazy_static! {
        static ref ORIGIN: Name = "example.".parse().unwrap();
        static ref REGISTRY: Registry = {
            let registry = Registry::new();
            registry.register("memory", example_driver()).unwrap();
            registry
        };
    }

    fn name(text: &str) -> Name {
        text.parse().unwrap()
    }

    fn example_driver() -> MemoryDriver {
        let mut zone = ZoneTable::new(ORIGIN.clone());
        zone.set_soa("ns1.example.", "hostmaster.example.", 42);
        zone.add_authority("NS", 3600, "ns1.example.");
        zone.add_record(name("ns1.example."), "A", 3600, "192.0.2.53");
        zone.add_record(name("www.example."), "A", 300, "192.0.2.1");
        zone.add_record(name("www.example."), "TXT", 300, "\"web\"");
        zone.add_record(name("sub.example."), "NS", 3600, "ns.sub.example.");
        zone.add_record(name("host.sub.example."), "A", 300, "192.0.2.9");
        zone.add_record(name("alias.example."), "DNAME", 300, "target.example.");
        zone.add_record(name("x.alias.example."), "A", 300, "192.0.2.7");
        zone.add_record(name("ftp.example."), "CNAME", 300, "www.example.");
        let mut driver = MemoryDriver::new();
        driver.load(zone).unwrap();
        driver
    }

    fn database() -> Database {
        Database::create_with(&REGISTRY, &ORIGIN, "memory", &[], &Options::default()).unwrap()
    }

    fn find(db: &Database, query: &str, rr_type: Type) -> FindResult {
        db.find(&name(query), None, rr_type, true).unwrap()
    }

    #[test]
    fn exact_match_succeeds() {
        let db = database();
        let result = find(&db, "www.example.", Type::A);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(name("www.example.")));
        let rrset = result.rrset.unwrap();
        assert_eq!(rrset.rr_type(), Type::A);
        assert_eq!(rrset.rdatas()[0].octets(), &[192, 0, 2, 1]);
        assert_eq!(result.node.unwrap().name(), &name("www.example."));
    }

    #[test]
    fn ns_query_below_apex_is_nxrrset() {
        let db = database();
        let result = find(&db, "www.example.", Type::NS);
        assert_eq!(result.outcome, Outcome::NxRrset);
        assert!(result.rrset.is_none());
        assert!(result.node.is_some());
    }

    #[test]
    fn apex_query_uses_authority_data() {
        let db = database();
        let result = find(&db, "example.", Type::SOA);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.rrset.unwrap().ttl(), crate::rr::Ttl::from(86400));
        // The apex NS RRset is not a delegation.
        let result = find(&db, "example.", Type::A);
        assert_eq!(result.outcome, Outcome::NxRrset);
        let result = find(&db, "example.", Type::NS);
        assert_eq!(result.outcome, Outcome::Success);
    }

    #[test]
    fn delegation_stops_at_zone_cut() {
        let db = database();
        let result = find(&db, "host.sub.example.", Type::A);
        assert_eq!(result.outcome, Outcome::Delegation);
        assert_eq!(result.found_name, Some(name("sub.example.")));
        assert_eq!(result.node.unwrap().name(), &name("sub.example."));
        assert_eq!(result.rrset.unwrap().rr_type(), Type::NS);

        let result = find(&db, "sub.example.", Type::A);
        assert_eq!(result.outcome, Outcome::Delegation);
        let result = find(&db, "host.sub.example.", Type::NS);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(name("sub.example.")));
    }

    #[test]
    fn dname_redirects_names_below_it() {
        let db = database();
        let result = find(&db, "x.alias.example.", Type::A);
        assert_eq!(result.outcome, Outcome::Dname);
        assert_eq!(result.found_name, Some(name("alias.example.")));
        assert_eq!(result.rrset.unwrap().rr_type(), Type::DNAME);

        let result = find(&db, "alias.example.", Type::DNAME);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(name("alias.example.")));
        let result = find(&db, "x.alias.example.", Type::DNAME);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(name("alias.example.")));
    }

    #[test]
    fn cname_applies_only_as_fallback() {
        let db = database();
        let result = find(&db, "ftp.example.", Type::A);
        assert_eq!(result.outcome, Outcome::Cname);
        assert_eq!(result.rrset.unwrap().rr_type(), Type::CNAME);
        let result = find(&db, "ftp.example.", Type::CNAME);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.rrset.unwrap().rr_type(), Type::CNAME);
        let result = find(&db, "www.example.", Type::CNAME);
        assert_eq!(result.outcome, Outcome::NxRrset);
    }

    #[test]
    fn any_queries_succeed_for_existing_names() {
        let db = database();
        let result = find(&db, "www.example.", Type::ANY);
        assert_eq!(result.outcome, Outcome::Success);
        assert!(result.rrset.is_none());
        let node = result.node.unwrap();
        let types: Vec<Type> = node.rrsets().map(|r| r.rr_type()).collect();
        assert_eq!(types, [Type::A, Type::TXT]);

        let mut iter = node.all_rrsets();
        assert_eq!(iter.current().err(), Some(Error::NoMore));
        iter.first().unwrap();
        assert_eq!(iter.current().unwrap().rr_type(), Type::A);
        iter.next().unwrap();
        assert_eq!(iter.current().unwrap().rr_type(), Type::TXT);
        assert_eq!(iter.next(), Err(Error::NoMore));
    }

    #[test]
    fn missing_names_are_nxdomain() {
        let db = database();
        let result = find(&db, "missing.example.", Type::A);
        assert_eq!(result.outcome, Outcome::NxDomain);
        assert_eq!(result.found_name, Some(name("missing.example.")));
        assert!(result.node.is_none());
        assert!(result.rrset.is_none());
    }

    #[test]
    fn missing_intermediate_names_are_skipped() {
        let db = database();
        // "sub2.example." does not exist, but deeper data could.
        let result = find(&db, "deep.sub2.example.", Type::A);
        assert_eq!(result.outcome, Outcome::NxDomain);
        assert_eq!(result.found_name, Some(name("deep.sub2.example.")));
    }

    #[test]
    fn root_zone_walk_covers_every_suffix() {
        let mut zone = ZoneTable::new(Name::root());
        zone.set_soa("a.root-servers.net.", "nstld.verisign-grs.com.", 1);
        zone.add_record(name("a.b.c."), "A", 60, "192.0.2.3");
        let mut driver = MemoryDriver::new();
        driver.load(zone).unwrap();
        let registry = Registry::new();
        registry.register("memory", driver).unwrap();
        let db = Database::create_with(&registry, &Name::root(), "memory", &[], &Options::default())
            .unwrap();

        let result = find(&db, "a.b.c.", Type::A);
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(name("a.b.c.")));
        let result = db.find(&Name::root(), None, Type::SOA, false).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(Name::root()));
    }

    #[test]
    fn names_outside_the_zone_are_nxdomain() {
        let db = database();
        let result = find(&db, "www.example.com.", Type::A);
        assert_eq!(result.outcome, Outcome::NxDomain);
        assert_eq!(result.found_name, None);
    }

    #[test]
    fn intermediate_nodes_are_released() {
        let db = database();
        let before = db.reference_count();
        let result = find(&db, "www.example.", Type::A);
        // One handle for the returned node; the RRset shares it.
        assert_eq!(db.reference_count(), before + 1);
        let node = result.node.unwrap();
        assert_eq!(node.reference_count(), 2);
        drop(result.rrset);
        assert_eq!(node.reference_count(), 1);
        drop(node);
        assert_eq!(db.reference_count(), before);
    }

    #[test]
    fn nodes_are_not_returned_unless_wanted() {
        let db = database();
        let result = db
            .find(&name("www.example."), Some(&Version::Single), Type::A, false)
            .unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert!(result.node.is_none());
        assert!(result.rrset.is_some());
    }

    #[test]
    fn lookups_are_idempotent() {
        let db = database();
        let first = find(&db, "www.example.", Type::A);
        let second = find(&db, "www.example.", Type::A);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(
            first.rrset.unwrap().rdatas(),
            second.rrset.unwrap().rdatas()
        );
    }

    #[test]
    fn sig_rrsets_are_not_implemented() {
        let db = database();
        let node = find(&db, "www.example.", Type::A).node.unwrap();
        assert_eq!(node.find_rrset(Type::SIG).err(), Some(Error::NotImplemented));
        assert_eq!(node.find_rrset(Type::MX).err(), Some(Error::NotFound));
    }

    #[test]
    fn concurrent_lookups_agree() {
        let db = database();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.attach();
                thread::spawn(move || {
                    (0..50)
                        .map(|_| find(&db, "host.sub.example.", Type::A).outcome)
                        .all(|outcome| outcome == Outcome::Delegation)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    ////////////////////////////////////////////////////////////////////
    // DRIVER FAILURES                                                //
    ////////////////////////////////////////////////////////////////////

    /// A driver whose lookups fail with a driver error for names
    /// starting with "broken" and succeed without records for names
    /// starting with "empty". Its authority callback fails for zones
    /// starting with "bad".
    struct FlakyDriver {
        lookups: Arc<AtomicUsize>,
    }

    impl Driver for FlakyDriver {
        type ZoneData = ();

        fn lookup(
            &self,
            _zone: &str,
            name: &str,
            _data: Option<&()>,
            node: &mut NodeBuilder,
        ) -> Result<(), Error> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if name.starts_with("broken") {
                Err(Error::Driver("backend unavailable".to_owned()))
            } else if name.starts_with("leaf") {
                node.put_record("A", 60, "192.0.2.200")
            } else if name.starts_with("empty") {
                Ok(())
            } else {
                Err(Error::NotFound)
            }
        }

        fn authority(
            &self,
            zone: &str,
            _data: Option<&()>,
            node: &mut NodeBuilder,
        ) -> Result<(), Error> {
            if zone.starts_with("bad") {
                Err(Error::Driver("no SOA".to_owned()))
            } else {
                node.put_soa("ns1.flaky.", "hostmaster.flaky.", 1)
            }
        }
    }

    fn flaky_registry() -> (Registry, Arc<AtomicUsize>) {
        let lookups = Arc::new(AtomicUsize::new(0));
        let registry = Registry::new();
        registry
            .register(
                "flaky",
                FlakyDriver {
                    lookups: lookups.clone(),
                },
            )
            .unwrap();
        (registry, lookups)
    }

    #[test]
    fn intermediate_driver_errors_are_tolerated() {
        let (registry, lookups) = flaky_registry();
        let origin = name("flaky.");
        let db = Database::create_with(&registry, &origin, "flaky", &[], &Options::default())
            .unwrap();
        let result = db
            .find(&name("leaf.broken.flaky."), None, Type::A, true)
            .unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(result.found_name, Some(name("leaf.broken.flaky.")));
        // The origin is skipped, so only two lookups happen.
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn any_query_on_empty_node_succeeds() {
        let (registry, _) = flaky_registry();
        let db = Database::create_with(&registry, &name("flaky."), "flaky", &[], &Options::default())
            .unwrap();
        let result = db.find(&name("empty.flaky."), None, Type::ANY, true).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        let node = result.node.unwrap();
        assert_eq!(node.rrset_count(), 0);
        let mut iter = node.all_rrsets();
        assert_eq!(iter.first(), Err(Error::NoMore));
        assert_eq!(iter.current().err(), Some(Error::NoMore));

        let result = db.find(&name("empty.flaky."), None, Type::A, true).unwrap();
        assert_eq!(result.outcome, Outcome::NxRrset);
    }

    #[test]
    fn origin_authority_errors_are_returned() {
        let (registry, _) = flaky_registry();
        let origin = name("bad.");
        let db = Database::create_with(&registry, &origin, "flaky", &[], &Options::default())
            .unwrap();
        assert_eq!(
            db.find(&origin, None, Type::SOA, true).err(),
            Some(Error::Driver("no SOA".to_owned()))
        );
        // Queries below the origin never build the origin's node.
        let result = db.find(&name("leaf.bad."), None, Type::A, true).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
    }

    #[test]
    fn origin_lookup_failure_is_tolerated() {
        let (registry, _) = flaky_registry();
        let origin = name("flaky.");
        let db = Database::create_with(&registry, &origin, "flaky", &[], &Options::default())
            .unwrap();
        let result = db.find(&origin, None, Type::ANY, true).unwrap();
        assert_eq!(result.outcome, Outcome::Success);
        let node = result.node.unwrap();
        assert_eq!(node.rrset_count(), 1);
        assert_eq!(node.find_rrset(Type::SOA).unwrap().ttl(), crate::rr::Ttl::from(86400));
        assert_eq!(node.database().class(), Class::IN);
    }
}
