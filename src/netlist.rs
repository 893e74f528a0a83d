// SPDX-License-Identifier: Apache-2.0
//! Graph entities annotated by the clustering pass.
//!
//! Slices and nets are produced by the partitioner upstream; this module
//! holds them in a flat arena so later passes can tag them in place and
//! snapshot the result between build phases.

use crate::keyspace::KeySpace;
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetId(pub usize);

/// Identifier of a set of slices eligible to be clustered together,
/// typically all slices of one original vertex. Opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// chip coordinate (x, y).
pub type Coord = (u32, u32);

/// slice -> chip coordinate, total over all placed slices.
///
/// iteration order of this map is the order the clustering pass first
/// encounters coordinates, which fixes cluster index assignment.
pub type Placements = IndexMap<SliceId, Coord>;

/// slice -> group; slices absent from the map are ungrouped.
pub type Groups = IndexMap<SliceId, GroupId>;

/// A contiguous partition of an oversized vertex, independently placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSlice {
    pub name: CompactString,
    /// the range of atoms of the original vertex covered by this slice.
    pub atoms: Range<u32>,
    /// group-local cluster index, written by the clustering pass.
    ///
    /// stays `None` for ungrouped slices.
    pub cluster: Option<u32>,
}

/// A packet flow from one source slice to its sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub source: SliceId,
    pub sinks: Vec<SliceId>,
    pub keyspace: KeySpace,
}

/// Flat arena of slices and nets.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    pub slices: Vec<VertexSlice>,
    pub nets: Vec<Net>,
}

impl Netlist {
    pub fn new() -> Netlist {
        Default::default()
    }

    pub fn add_slice(
        &mut self, name: impl Into<CompactString>, atoms: Range<u32>,
    ) -> SliceId {
        let id = SliceId(self.slices.len());
        self.slices.push(VertexSlice {
            name: name.into(),
            atoms,
            cluster: None,
        });
        id
    }

    pub fn add_net(
        &mut self, source: SliceId, sinks: Vec<SliceId>, keyspace: KeySpace,
    ) -> NetId {
        let id = NetId(self.nets.len());
        self.nets.push(Net { source, sinks, keyspace });
        id
    }

    pub fn slice(&self, id: SliceId) -> &VertexSlice {
        &self.slices[id.0]
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.0]
    }

    /// Serialize to the inter-phase snapshot format.
    ///
    /// Written after clustering so the routing-table builder can run as a
    /// separate phase over finalized keys.
    pub fn write_snapshot<W: Write>(
        &self, writer: W,
    ) -> Result<(), serde_bare::error::Error> {
        serde_bare::to_writer(writer, self)
    }

    /// Read a snapshot written by [`Netlist::write_snapshot`].
    pub fn read_snapshot<R: Read>(
        reader: R,
    ) -> Result<Netlist, serde_bare::error::Error> {
        serde_bare::from_reader(reader)
    }
}
