// SPDX-License-Identifier: Apache-2.0
//! Compressed connection transforms.
//!
//! Connections frequently carry transforms with structurally-zero rows and
//! columns (a connection into a slice of a larger vertex, or a one-hot
//! selection). Dropping the zero structure makes connections comparable
//! regardless of which global indices happened to be zero, which is what
//! lets the downstream deduplication actually fire.

use ndarray::{Array2, ArrayView2};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A dense transform stored without its all-zero rows and columns.
///
/// The compact matrix is a construction-time snapshot and is never mutated
/// afterwards. Transforms containing NaN are outside the contract: equality
/// over them would not be reflexive.
#[derive(Debug, Clone)]
pub struct SparseTransform {
    full_out_size: usize,
    full_in_size: usize,
    /// row indices of the original transform kept in the compact form,
    /// ascending.
    out_indices: Vec<usize>,
    /// column indices kept, ascending.
    in_indices: Vec<usize>,
    compact_values: Array2<f64>,
}

/// fold -0.0 into 0.0 so bit-level hashing agrees with `==`.
fn canon(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl SparseTransform {
    /// Compress a dense transform.
    ///
    /// An all-zero transform yields empty index sequences and a 0x0
    /// compact matrix. Never fails.
    pub fn new(transform: ArrayView2<f64>) -> SparseTransform {
        let (full_out_size, full_in_size) = transform.dim();
        let out_indices: Vec<usize> = (0..full_out_size)
            .filter(|&i| transform.row(i).iter().any(|&v| v != 0.0))
            .collect();
        let in_indices: Vec<usize> = (0..full_in_size)
            .filter(|&j| transform.column(j).iter().any(|&v| v != 0.0))
            .collect();
        let compact_values = Array2::from_shape_fn(
            (out_indices.len(), in_indices.len()),
            |(r, c)| canon(transform[[out_indices[r], in_indices[c]]]),
        );
        SparseTransform {
            full_out_size, full_in_size,
            out_indices, in_indices, compact_values,
        }
    }

    /// Reconstruct the original full-size transform.
    ///
    /// Returns a fresh matrix each call: zeros everywhere except at the
    /// retained rows and columns.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.full_out_size, self.full_in_size));
        for (r, &i) in self.out_indices.iter().enumerate() {
            for (c, &j) in self.in_indices.iter().enumerate() {
                dense[[i, j]] = self.compact_values[[r, c]];
            }
        }
        dense
    }

    /// (rows, columns) of the original dense transform.
    pub fn full_shape(&self) -> (usize, usize) {
        (self.full_out_size, self.full_in_size)
    }

    pub fn out_indices(&self) -> &[usize] {
        &self.out_indices
    }

    pub fn in_indices(&self) -> &[usize] {
        &self.in_indices
    }

    pub fn compact_values(&self) -> ArrayView2<f64> {
        self.compact_values.view()
    }

    /// fast content hash over the reconstructed dense form.
    ///
    /// hashing the dense form keeps the contract independent of the
    /// internal compact layout.
    fn dense_content_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        for &v in self.to_dense().iter() {
            h.write_u64(v.to_bits());
        }
        h.finish()
    }
}

impl PartialEq for SparseTransform {
    fn eq(&self, other: &Self) -> bool {
        self.full_out_size == other.full_out_size
            && self.full_in_size == other.full_in_size
            && self.out_indices == other.out_indices
            && self.in_indices == other.in_indices
            && self.compact_values == other.compact_values
    }
}

impl Eq for SparseTransform {}

impl Hash for SparseTransform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.in_indices.hash(state);
        self.out_indices.hash(state);
        self.full_in_size.hash(state);
        self.full_out_size.hash(state);
        state.write_u64(self.dense_content_hash());
    }
}
