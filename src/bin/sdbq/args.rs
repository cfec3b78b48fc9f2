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

//! Implements command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sdb::class::Class;
use sdb::name::Name;
use sdb::rr::Type;

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Query zones served through simple databases
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a name in the configured zones
    Query(QueryArgs),

    /// Load the configured zones and build each zone's apex
    Check(CheckArgs),
}

#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Set the configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,

    /// The domain name to look up
    #[clap(value_name = "NAME")]
    pub name: Name,

    /// The RR type to look up
    #[clap(long = "type", short = 't', default_value = "A", value_name = "TYPE")]
    pub rr_type: Type,

    /// The class of the zone to search
    #[clap(long, short = 'c', default_value = "IN", value_name = "CLASS")]
    pub class: Class,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Set the configuration file to use
    #[clap(long, value_name = "FILE")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_arguments_parse() {
        let args = Args::try_parse_from([
            "sdbq",
            "query",
            "--config",
            "zones.toml",
            "www.example.",
            "-t",
            "txt",
        ])
        .unwrap();
        match args.command {
            Command::Query(query) => {
                assert_eq!(query.name, "www.example.".parse().unwrap());
                assert_eq!(query.rr_type, Type::TXT);
                assert_eq!(query.class, Class::IN);
            }
            Command::Check(_) => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn invalid_names_are_rejected() {
        assert!(Args::try_parse_from(["sdbq", "query", "--config", "z.toml", "a..b."]).is_err());
    }
}
