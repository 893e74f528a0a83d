// SPDX-License-Identifier: Apache-2.0
//! Structured packet-address bit-fields.
//!
//! Every packet on the target carries a 32-bit routing key. The standard
//! addressing scheme splits it into named fields; receivers match on key
//! prefixes, so rewriting one field must leave the rest untouched.

use serde::{Deserialize, Serialize};

const USER_BITS: u32 = 3;
const OBJECT_BITS: u32 = 8;
/// width of the cluster field; bounds the number of chips a single group
/// may be spread across.
pub const CLUSTER_BITS: u32 = 6;
const CONNECTION_BITS: u32 = 7;
const INDEX_BITS: u32 = 8;

fn check_field(name: &str, value: u32, bits: u32) -> u32 {
    assert!(
        value < (1u32 << bits),
        "keyspace field `{}` value {} exceeds its {}-bit width",
        name, value, bits
    );
    value
}

/// A 32-bit routing key with named fields.
///
/// Packed layout, msb to lsb:
/// `user(3) | object(8) | cluster(6) | connection(7) | index(8)`.
///
/// `user == 0` marks the standard scheme; keys with any other user value
/// belong to foreign addressing schemes and are opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpace {
    user: u32,
    object: u32,
    cluster: u32,
    connection: u32,
    index: u32,
}

impl KeySpace {
    /// A standard-scheme key for one outgoing connection of an object.
    /// Cluster and index fields start at zero.
    pub fn standard(object: u32, connection: u32) -> KeySpace {
        KeySpace {
            user: 0,
            object: check_field("object", object, OBJECT_BITS),
            cluster: 0,
            connection: check_field("connection", connection, CONNECTION_BITS),
            index: 0,
        }
    }

    /// A key under a foreign addressing scheme. Such keys opt out of
    /// cluster assignment entirely.
    pub fn foreign(user: u32) -> KeySpace {
        assert!(user != 0, "user 0 is reserved for the standard scheme");
        KeySpace {
            user: check_field("user", user, USER_BITS),
            object: 0,
            cluster: 0,
            connection: 0,
            index: 0,
        }
    }

    pub fn is_standard_scheme(&self) -> bool {
        self.user == 0
    }

    /// Rebuild the key with only the cluster field replaced.
    pub fn with_cluster(self, cluster: u32) -> KeySpace {
        KeySpace {
            cluster: check_field("cluster", cluster, CLUSTER_BITS),
            ..self
        }
    }

    /// Rebuild the key with only the index field replaced.
    pub fn with_index(self, index: u32) -> KeySpace {
        KeySpace {
            index: check_field("index", index, INDEX_BITS),
            ..self
        }
    }

    pub fn user(&self) -> u32 {
        self.user
    }

    pub fn object(&self) -> u32 {
        self.object
    }

    pub fn cluster(&self) -> u32 {
        self.cluster
    }

    pub fn connection(&self) -> u32 {
        self.connection
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Assemble the key bits.
    pub fn pack(&self) -> u32 {
        (self.user << (OBJECT_BITS + CLUSTER_BITS + CONNECTION_BITS + INDEX_BITS))
            | (self.object << (CLUSTER_BITS + CONNECTION_BITS + INDEX_BITS))
            | (self.cluster << (CONNECTION_BITS + INDEX_BITS))
            | (self.connection << INDEX_BITS)
            | self.index
    }
}
