// SPDX-License-Identifier: Apache-2.0
//! Cluster identification over placed vertex slices.
//!
//! A vertex partitioned across several chips forms one cluster per chip.
//! Packets from distinct clusters would otherwise look identical to a
//! receiver, so every net leaving a cluster carries the cluster index in
//! its key:
//!
//! ```text
//!    +--------+                      +--------+
//!    |        | ------- (a) ------>  |        |
//!    |  (A)   |                      |  (B)   |
//!    |        | <------ (b) -------  |        |
//!    +--------+                      +--------+
//! ```
//!
//! Traffic on `(a)` must be distinguishable from traffic on `(b)`; a
//! group-local cluster field in the key suffices. Indices are only unique
//! within a group, so unrelated groups reuse small integers and the field
//! stays narrow.
//!
//! Ungrouped standard-scheme traffic keeps `cluster = 0` unconditionally.
//! If ungrouped and grouped traffic ever share a physical route this can
//! collide with a legitimate cluster 0; flagged for hardware-routing
//! review rather than changed here.

use crate::netlist::{Coord, GroupId, Groups, NetId, Netlist, Placements, SliceId};
use indexmap::IndexMap;
use itertools::Itertools;

#[derive(Default)]
struct Cluster {
    slices: Vec<SliceId>,
    nets: Vec<NetId>,
}

/// Assign group-local cluster indices and rewrite net keys.
///
/// Buckets every placed grouped slice by (group, coordinate), then walks
/// each group's buckets in first-encounter order handing out indices
/// 0, 1, 2, ... — one per distinct coordinate. Every slice in a bucket
/// gets the index as its `cluster` attribute and every standard-scheme
/// net sourced in the bucket has its key rewritten with it. A group on a
/// single chip still gets index 0, keeping the field populated uniformly.
///
/// Standard-scheme nets with ungrouped sources are rewritten with
/// `cluster = 0`. Nets under a foreign addressing scheme are never
/// touched. Grouped slices absent from `placements` are invisible unless
/// they source a standard-scheme net.
///
/// Mutates `netlist` in place; run it to completion before anything reads
/// cluster attributes or keys.
///
/// # Panics
///
/// If a standard-scheme net's source slice is grouped but unplaced. That
/// breaks the caller's invariant (every grouped slice owning nets is
/// placed) and skipping it would leave a stale cluster field for the
/// routing-table builder to trust.
pub fn identify_clusters(
    netlist: &mut Netlist,
    placements: &Placements,
    groups: &Groups,
) {
    let timer_cluster = clilog::stimer!("identify clusters");

    // group -> coordinate -> cluster bucket, both levels in
    // first-encounter order.
    let mut group_clusters: IndexMap<GroupId, IndexMap<Coord, Cluster>> =
        IndexMap::new();

    for (&slice, &coord) in placements {
        if let Some(&group) = groups.get(&slice) {
            group_clusters
                .entry(group).or_default()
                .entry(coord).or_default()
                .slices.push(slice);
        }
    }

    for net_i in 0..netlist.nets.len() {
        let net = &netlist.nets[net_i];
        if !net.keyspace.is_standard_scheme() {
            continue;
        }
        match groups.get(&net.source) {
            Some(group) => {
                let coord = *placements.get(&net.source).unwrap_or_else(|| {
                    panic!(
                        "net source slice {} ({}) is grouped but unplaced",
                        net.source.0, netlist.slices[net.source.0].name
                    )
                });
                // the bucket exists: the source is placed and grouped,
                // so the placement sweep above created it
                group_clusters.get_mut(group).unwrap()
                    .get_mut(&coord).unwrap()
                    .nets.push(NetId(net_i));
            }
            None => {
                netlist.nets[net_i].keyspace =
                    netlist.nets[net_i].keyspace.with_cluster(0);
            }
        }
    }

    for (group, clusters) in &group_clusters {
        clilog::debug!(
            "group {}: {} cluster(s) at {}",
            group.0, clusters.len(),
            clusters.keys().map(|(x, y)| format!("({},{})", x, y)).join(" ")
        );
        for (cluster_id, cluster) in clusters.values().enumerate() {
            let cluster_id = cluster_id as u32;
            for &slice in &cluster.slices {
                netlist.slices[slice.0].cluster = Some(cluster_id);
            }
            for &net in &cluster.nets {
                netlist.nets[net.0].keyspace =
                    netlist.nets[net.0].keyspace.with_cluster(cluster_id);
            }
        }
    }

    clilog::finish!(timer_cluster);
}
