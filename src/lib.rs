// SPDX-License-Identifier: Apache-2.0
pub mod transform;

pub mod params;

pub mod keyspace;

pub mod netlist;

pub mod cluster;

pub mod registry;
