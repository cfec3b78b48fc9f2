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

//! Implementation of the [`RrsetIter`] cursor.

use super::{Error, Node, RrsetRef};

/// A cursor over all RRsets at a [`Node`], used to answer ANY queries.
///
/// The cursor starts unpositioned. [`RrsetIter::first`] moves it to the
/// first RRset, [`RrsetIter::next`] to the following one, and
/// [`RrsetIter::current`] returns the RRset under the cursor. Both
/// movements fail with [`Error::NoMore`] when they run off the end.
/// The cursor holds a handle to its node for as long as it exists.
///
/// For plain Rust iteration, see [`Node::rrsets`].
pub struct RrsetIter {
    node: Node,
    position: Option<usize>,
}

impl RrsetIter {
    pub(super) fn new(node: Node) -> Self {
        Self {
            node,
            position: None,
        }
    }

    /// Returns the node being iterated over.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Positions the cursor at the first RRset.
    pub fn first(&mut self) -> Result<(), Error> {
        self.seek(0)
    }

    /// Advances the cursor to the next RRset. On an unpositioned
    /// cursor, this is the same as [`RrsetIter::first`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(), Error> {
        self.seek(self.position.map_or(0, |p| p + 1))
    }

    /// Returns the RRset under the cursor, or fails with
    /// [`Error::NoMore`] if the cursor is not positioned.
    pub fn current(&self) -> Result<RrsetRef, Error> {
        self.position
            .map(|index| RrsetRef::new(self.node.clone(), index))
            .ok_or(Error::NoMore)
    }

    fn seek(&mut self, index: usize) -> Result<(), Error> {
        if self.node.rrset(index).is_some() {
            self.position = Some(index);
            Ok(())
        } else {
            self.position = None;
            Err(Error::NoMore)
        }
    }
}
