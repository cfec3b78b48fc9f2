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

//! Implements the configuration file.

use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use paste::paste;
use serde::{de, Deserialize};

use sdb::class::Class;
use sdb::db::{RdataLimits, DEFAULT_CAPACITY};
use sdb::name::Name;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = fs::read(path.as_ref()).context("failed to read the configuration file")?;
    let config = parse(&raw_config)?;
    log_config_summary(&config);
    Ok(config)
}

/// Parses a configuration from the contents of a configuration file.
pub fn parse(raw_config: &[u8]) -> Result<Config> {
    toml::from_slice(raw_config).context("failed to parse the configuration file")
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        return;
    }

    let mut message = format!(
        "Configuration loaded:\n\
         Registry capacity: {}\n\
         RDATA buffer:      {} octets, {} attempts\n\
         Zones:             ",
        config.registry_capacity, config.rdata.initial_buffer, config.rdata.max_attempts,
    );
    if config.zones.is_empty() {
        message.push_str("none");
    } else {
        let _ = write!(message, "{}", config.zones.len());
        for zone in &config.zones {
            let _ = write!(
                message,
                "\n  {}/{} via {} ({} records)",
                zone.origin.0,
                zone.class.0,
                zone.driver,
                zone.records.len()
            );
        }
    }
    debug!("{}", message);
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_registry_capacity")]
    pub registry_capacity: usize,
    #[serde(default)]
    pub rdata: RdataConfig,
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

fn default_registry_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Limits on the buffer used to parse record data.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RdataConfig {
    #[serde(default = "default_initial_buffer")]
    pub initial_buffer: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RdataConfig {
    fn default() -> Self {
        Self {
            initial_buffer: default_initial_buffer(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_initial_buffer() -> usize {
    RdataLimits::default().initial_buffer
}

fn default_max_attempts() -> u32 {
    RdataLimits::default().max_attempts
}

impl From<&RdataConfig> for RdataLimits {
    fn from(config: &RdataConfig) -> Self {
        Self {
            initial_buffer: config.initial_buffer,
            max_attempts: config.max_attempts,
        }
    }
}

/// The configuration of a single zone.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub origin: ConfigName,
    #[serde(default = "default_zone_class")]
    pub class: ConfigClass,
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub soa: Option<SoaConfig>,
    #[serde(default)]
    pub authority: Vec<RecordConfig>,
    #[serde(default)]
    pub records: Vec<OwnedRecordConfig>,
}

fn default_zone_class() -> ConfigClass {
    ConfigClass(Class::IN)
}

fn default_driver() -> String {
    "memory".to_owned()
}

/// The apex SOA of a zone. The timers are fixed.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoaConfig {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
}

/// A record at the zone apex, served with the authority data.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordConfig {
    #[serde(rename = "type")]
    pub rr_type: String,
    pub ttl: u32,
    pub data: String,
}

/// A record with an owner. Relative owner names are completed with the
/// zone origin, and `@` stands for the origin itself.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnedRecordConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub rr_type: String,
    pub ttl: u32,
    pub data: String,
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS OVER SDB TYPES FOR SERDE                                  //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X` type
/// from [`sdb`], using its [`FromStr`](std::str::FromStr)
/// implementation.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $description:literal) => {
        /// A macro-generated deserializable wrapper over an [`sdb`] type.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            #[derive(Debug)]
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Name, "domain name");
make_serde_wrapper!(ConfigClass, Class, "DNS class");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_configuration_parses() {
        let config = parse(
            br#"
            registry_capacity = 4

            [rdata]
            initial_buffer = 128

            [[zones]]
            origin = "example."
            args = ["ro"]

            [zones.soa]
            mname = "ns1.example."
            rname = "hostmaster.example."
            serial = 2022010101

            [[zones.authority]]
            type = "NS"
            ttl = 3600
            data = "ns1.example."

            [[zones.records]]
            name = "www"
            type = "A"
            ttl = 300
            data = "192.0.2.1"
            "#,
        )
        .unwrap();
        assert_eq!(config.registry_capacity, 4);
        assert_eq!(config.rdata.initial_buffer, 128);
        assert_eq!(config.rdata.max_attempts, 11);
        let zone = &config.zones[0];
        assert_eq!(zone.origin.0, "example.".parse().unwrap());
        assert_eq!(zone.class.0, Class::IN);
        assert_eq!(zone.driver, "memory");
        assert_eq!(zone.args, ["ro"]);
        assert_eq!(zone.soa.as_ref().unwrap().serial, 2022010101);
        assert_eq!(zone.authority[0].rr_type, "NS");
        assert_eq!(zone.records[0].name, "www");
    }

    #[test]
    fn defaults_apply_to_empty_configuration() {
        let config = parse(b"").unwrap();
        assert_eq!(config.registry_capacity, DEFAULT_CAPACITY);
        assert_eq!(RdataLimits::from(&config.rdata), RdataLimits::default());
        assert!(config.zones.is_empty());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse(b"[[zones]]\norigin = \"a..b.\"\n").is_err());
        assert!(parse(b"[[zones]]\norigin = \"example.\"\nclass = \"XX\"\n").is_err());
        assert!(parse(b"bogus = 1\n").is_err());
    }
}
