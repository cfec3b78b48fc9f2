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

//! A "simple database" backend for authoritative DNS data.
//!
//! Instead of loading a zone into an in-memory tree, a simple database
//! asks a pluggable [`Driver`](db::Driver) for the records at each
//! name as queries arrive. Drivers supply records in presentation
//! (text) format; this crate parses them, groups them into RRsets, and
//! runs the authoritative lookup algorithm over them. See the
//! [`db`] module for the details.

pub mod class;
pub mod db;
pub mod name;
pub mod rr;
mod util;
