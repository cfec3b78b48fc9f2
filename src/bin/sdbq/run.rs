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

//! Implements the `query` and `check` commands.

use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;
use std::process;

use anyhow::{anyhow, Context, Result};
use env_logger::Env;
use log::{error, info};

use sdb::db::{Database, MemoryDriver, Options, Outcome, Registry, ZoneTable};
use sdb::name::Name;
use sdb::rr::Type;

use crate::args::{CheckArgs, QueryArgs};
use crate::config::{self, Config, ZoneConfig};

/// Runs a lookup.
pub fn query(args: QueryArgs) {
    init_logging();
    exit_on_failure(try_querying(args));
}

/// Loads every zone and builds its apex.
pub fn check(args: CheckArgs) {
    init_logging();
    exit_on_failure(try_checking(args));
}

fn init_logging() {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));
}

fn exit_on_failure(result: Result<()>) {
    if let Err(e) = result {
        let mut message = String::from("Failed:");
        for (i, cause) in e.chain().enumerate() {
            let _ = write!(message, "\n[{}] {}", i + 1, cause);
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
}

fn try_querying(args: QueryArgs) -> Result<()> {
    let (_registry, databases) = load(&args.config)?;
    let db = databases
        .iter()
        .filter(|db| db.class() == args.class && args.name.eq_or_subdomain_of(db.origin()))
        .max_by_key(|db| db.origin().len())
        .ok_or_else(|| anyhow!("no configured zone contains {}/{}", args.name, args.class))?;
    info!("Looking up {} {} in zone {}.", args.name, args.rr_type, db.origin());

    let version = db.current_version();
    let result = db
        .find(&args.name, Some(&version), args.rr_type, true)
        .with_context(|| format!("failed to look up {}", args.name))?;

    let found_name = result
        .found_name
        .as_ref()
        .map_or_else(|| "-".to_owned(), Name::to_string);
    println!(";; {} (stopped at {})", result.outcome, found_name);
    match (&result.rrset, &result.node) {
        (Some(rrset), _) => print!("{}", rrset),
        (None, Some(node)) if result.outcome == Outcome::Success && args.rr_type == Type::ANY => {
            print!("{}", node)
        }
        _ => (),
    }
    Ok(())
}

fn try_checking(args: CheckArgs) -> Result<()> {
    let (_registry, databases) = load(&args.config)?;
    for db in &databases {
        let apex = db
            .find_node(db.origin(), false)
            .with_context(|| format!("failed to build the apex of {}", db.origin()))?;
        if apex.find_rrset(Type::SOA).is_err() {
            return Err(anyhow!("zone {} has no SOA record", db.origin()));
        }
        println!("{}/{}: {} RRset(s) at the apex", db.origin(), db.class(), apex.rrset_count());
    }
    Ok(())
}

/// Loads the configuration, registers its drivers, and creates a
/// database for each configured zone.
fn load(path: &Path) -> Result<(Registry, Vec<Database>)> {
    info!("Loading the configuration from {}.", path.display());
    let config = config::load_from_path(path).context("failed to load the configuration")?;
    let registry = build_registry(&config)?;
    let databases = create_databases(&registry, &config)?;
    Ok((registry, databases))
}

/// Builds one [`MemoryDriver`] per driver name in the configuration,
/// loaded with that driver's zones, and registers them.
fn build_registry(config: &Config) -> Result<Registry> {
    let mut drivers: HashMap<&str, MemoryDriver> = HashMap::new();
    for zone_config in &config.zones {
        let table = build_zone_table(zone_config)
            .with_context(|| format!("invalid zone {}", zone_config.origin.0))?;
        drivers
            .entry(zone_config.driver.as_str())
            .or_default()
            .load(table)
            .with_context(|| {
                format!(
                    "zone {} is configured twice for driver {}",
                    zone_config.origin.0, zone_config.driver
                )
            })?;
    }

    let registry = Registry::with_capacity(config.registry_capacity);
    for (name, driver) in drivers {
        registry
            .register(name, driver)
            .with_context(|| format!("failed to register driver {}", name))?;
    }
    Ok(registry)
}

fn build_zone_table(zone_config: &ZoneConfig) -> Result<ZoneTable> {
    let origin = &zone_config.origin.0;
    let mut table = ZoneTable::new(origin.clone());
    if let Some(ref soa) = zone_config.soa {
        table.set_soa(&soa.mname, &soa.rname, soa.serial);
    }
    for record in &zone_config.authority {
        table.add_authority(&record.rr_type, record.ttl, &record.data);
    }
    for record in &zone_config.records {
        let owner = Name::from_str_relative(&record.name, origin)
            .with_context(|| format!("invalid owner name {}", record.name))?;
        if !owner.eq_or_subdomain_of(origin) {
            return Err(anyhow!("{} is outside the zone", owner));
        }
        table.add_record(owner, &record.rr_type, record.ttl, &record.data);
    }
    Ok(table)
}

fn create_databases(registry: &Registry, config: &Config) -> Result<Vec<Database>> {
    config
        .zones
        .iter()
        .map(|zone_config| {
            let options = Options {
                class: zone_config.class.0,
                rdata_limits: (&config.rdata).into(),
                ..Default::default()
            };
            let args: Vec<&str> = zone_config.args.iter().map(String::as_str).collect();
            Database::create_with(
                registry,
                &zone_config.origin.0,
                &zone_config.driver,
                &args,
                &options,
            )
            .with_context(|| format!("failed to create the database for {}", zone_config.origin.0))
        })
        .collect()
}
