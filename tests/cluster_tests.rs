// SPDX-License-Identifier: Apache-2.0
//! Cluster identification: index assignment, key rewriting, and the
//! opt-out/contract edge cases.

use gridmap::cluster::identify_clusters;
use gridmap::keyspace::KeySpace;
use gridmap::netlist::{GroupId, Groups, Netlist, Placements};

#[test]
fn same_chip_same_cluster_other_chip_next_cluster() {
    let mut netlist = Netlist::new();
    let s1 = netlist.add_slice("v.0", 0..32);
    let s2 = netlist.add_slice("v.1", 32..64);
    let s3 = netlist.add_slice("v.2", 64..96);
    let n1 = netlist.add_net(s1, vec![s3], KeySpace::standard(0, 0));
    let n3 = netlist.add_net(s3, vec![s1], KeySpace::standard(0, 1));

    let mut placements = Placements::new();
    placements.insert(s1, (0, 0));
    placements.insert(s2, (0, 0));
    placements.insert(s3, (1, 0));

    let mut groups = Groups::new();
    groups.insert(s1, GroupId(0));
    groups.insert(s2, GroupId(0));
    groups.insert(s3, GroupId(0));

    identify_clusters(&mut netlist, &placements, &groups);

    assert_eq!(netlist.slice(s1).cluster, Some(0));
    assert_eq!(netlist.slice(s2).cluster, Some(0));
    assert_eq!(netlist.slice(s3).cluster, Some(1));
    assert_eq!(netlist.net(n1).keyspace.cluster(), 0);
    assert_eq!(netlist.net(n3).keyspace.cluster(), 1);
}

#[test]
fn single_chip_group_still_gets_cluster_zero() {
    let mut netlist = Netlist::new();
    let s = netlist.add_slice("lone", 0..8);
    let n = netlist.add_net(s, vec![s], KeySpace::standard(3, 0));

    let mut placements = Placements::new();
    placements.insert(s, (2, 2));
    let mut groups = Groups::new();
    groups.insert(s, GroupId(9));

    identify_clusters(&mut netlist, &placements, &groups);

    assert_eq!(netlist.slice(s).cluster, Some(0));
    assert_eq!(netlist.net(n).keyspace.cluster(), 0);
}

#[test]
fn ungrouped_source_defaults_to_cluster_zero() {
    let mut netlist = Netlist::new();
    let s4 = netlist.add_slice("input", 0..1);
    let n4 = netlist.add_net(s4, vec![s4], KeySpace::standard(1, 0));

    let mut placements = Placements::new();
    placements.insert(s4, (0, 0));
    let groups = Groups::new();

    identify_clusters(&mut netlist, &placements, &groups);

    assert_eq!(netlist.net(n4).keyspace.cluster(), 0);
    assert_eq!(netlist.slice(s4).cluster, None);
}

#[test]
fn cluster_indices_are_group_local() {
    // two unrelated groups both start counting at 0
    let mut netlist = Netlist::new();
    let a0 = netlist.add_slice("a.0", 0..4);
    let a1 = netlist.add_slice("a.1", 4..8);
    let b0 = netlist.add_slice("b.0", 0..4);

    let mut placements = Placements::new();
    placements.insert(a0, (0, 0));
    placements.insert(a1, (1, 1));
    placements.insert(b0, (1, 1));

    let mut groups = Groups::new();
    groups.insert(a0, GroupId(0));
    groups.insert(a1, GroupId(0));
    groups.insert(b0, GroupId(1));

    identify_clusters(&mut netlist, &placements, &groups);

    assert_eq!(netlist.slice(a0).cluster, Some(0));
    assert_eq!(netlist.slice(a1).cluster, Some(1));
    assert_eq!(netlist.slice(b0).cluster, Some(0));
}

#[test]
fn foreign_scheme_nets_are_untouched() {
    let mut netlist = Netlist::new();
    let s1 = netlist.add_slice("v.0", 0..4);
    let s2 = netlist.add_slice("v.1", 4..8);
    // s2 sits on the second chip of its group: were this net clustered,
    // its key would get cluster 1
    let n = netlist.add_net(s2, vec![s1], KeySpace::foreign(2));

    let mut placements = Placements::new();
    placements.insert(s1, (0, 0));
    placements.insert(s2, (0, 1));
    let mut groups = Groups::new();
    groups.insert(s1, GroupId(0));
    groups.insert(s2, GroupId(0));

    let before = netlist.net(n).keyspace;
    identify_clusters(&mut netlist, &placements, &groups);

    assert_eq!(netlist.net(n).keyspace, before);
    // the slice itself is still clustered; only the key is out of scope
    assert_eq!(netlist.slice(s2).cluster, Some(1));
}

#[test]
fn unplaced_grouped_slice_without_nets_is_invisible() {
    let mut netlist = Netlist::new();
    let placed = netlist.add_slice("v.0", 0..4);
    let unplaced = netlist.add_slice("v.1", 4..8);

    let mut placements = Placements::new();
    placements.insert(placed, (0, 0));
    let mut groups = Groups::new();
    groups.insert(placed, GroupId(0));
    groups.insert(unplaced, GroupId(0));

    identify_clusters(&mut netlist, &placements, &groups);

    assert_eq!(netlist.slice(placed).cluster, Some(0));
    assert_eq!(netlist.slice(unplaced).cluster, None);
}

#[test]
#[should_panic(expected = "grouped but unplaced")]
fn grouped_unplaced_net_source_is_a_contract_violation() {
    let mut netlist = Netlist::new();
    let s = netlist.add_slice("v.0", 0..4);
    netlist.add_net(s, vec![s], KeySpace::standard(0, 0));

    let placements = Placements::new();
    let mut groups = Groups::new();
    groups.insert(s, GroupId(0));

    identify_clusters(&mut netlist, &placements, &groups);
}

#[test]
fn rewriting_cluster_preserves_other_fields() {
    let mut netlist = Netlist::new();
    let s1 = netlist.add_slice("v.0", 0..4);
    let s2 = netlist.add_slice("v.1", 4..8);
    let key = KeySpace::standard(5, 3).with_index(9);
    let n = netlist.add_net(s2, vec![s1], key);

    let mut placements = Placements::new();
    placements.insert(s1, (0, 0));
    placements.insert(s2, (3, 0));
    let mut groups = Groups::new();
    groups.insert(s1, GroupId(0));
    groups.insert(s2, GroupId(0));

    identify_clusters(&mut netlist, &placements, &groups);

    let rewritten = netlist.net(n).keyspace;
    assert_eq!(rewritten.cluster(), 1);
    assert_eq!(rewritten.object(), 5);
    assert_eq!(rewritten.connection(), 3);
    assert_eq!(rewritten.index(), 9);
}
