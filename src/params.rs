// SPDX-License-Identifier: Apache-2.0
//! Canonical transmission parameters.
//!
//! One value per connection, describing what the connection computes. Two
//! connections whose parameters compare equal can share a single hardware
//! resource (decoder rows, filter slots), so equality here directly
//! controls routing-table pressure on the target.

use crate::transform::SparseTransform;
use cachedhash::CachedHash;
use indexmap::IndexSet;
use ndarray::{Array2, ArrayView2};
use std::hash::{Hash, Hasher};
use std::mem::discriminant;
use std::ops::Range;
use std::sync::Arc;

/// Opaque handle to a transform function in a caller-owned table.
///
/// Two connections compute the same function only if they reference the
/// same table entry. Function equivalence by value is undecidable and is
/// deliberately not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

/// Opaque handle to a learning rule instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LearningRuleId(pub usize);

/// What a connection computes, keyed by its origin.
///
/// Values of different variants never compare equal, whatever their
/// transforms.
#[derive(Debug, Clone)]
pub enum TransmissionParameters {
    /// a generic connection: the transform is the whole story.
    Standard {
        transform: SparseTransform,
    },
    /// originates at an ensemble; carries decoders and possibly a
    /// learning rule.
    Ensemble {
        transform: SparseTransform,
        learning_rule: Option<LearningRuleId>,
    },
    /// originates at a passthrough node.
    Passthrough {
        transform: SparseTransform,
    },
    /// originates at a function node; carries the input slice it reads
    /// and the function it applies.
    Node {
        transform: SparseTransform,
        pre_slice: Range<usize>,
        function: FunctionId,
    },
}

impl TransmissionParameters {
    pub fn standard(transform: ArrayView2<f64>) -> TransmissionParameters {
        TransmissionParameters::Standard {
            transform: SparseTransform::new(transform),
        }
    }

    pub fn ensemble(
        transform: ArrayView2<f64>,
        learning_rule: Option<LearningRuleId>,
    ) -> TransmissionParameters {
        TransmissionParameters::Ensemble {
            transform: SparseTransform::new(transform),
            learning_rule,
        }
    }

    pub fn passthrough(transform: ArrayView2<f64>) -> TransmissionParameters {
        TransmissionParameters::Passthrough {
            transform: SparseTransform::new(transform),
        }
    }

    pub fn node(
        transform: ArrayView2<f64>,
        pre_slice: Range<usize>,
        function: FunctionId,
    ) -> TransmissionParameters {
        TransmissionParameters::Node {
            transform: SparseTransform::new(transform),
            pre_slice,
            function,
        }
    }

    /// the compressed transform.
    pub fn sparse(&self) -> &SparseTransform {
        match self {
            TransmissionParameters::Standard { transform }
            | TransmissionParameters::Ensemble { transform, .. }
            | TransmissionParameters::Passthrough { transform }
            | TransmissionParameters::Node { transform, .. } => transform,
        }
    }

    /// the full-size transform, reconstructed.
    pub fn transform(&self) -> Array2<f64> {
        self.sparse().to_dense()
    }
}

impl PartialEq for TransmissionParameters {
    fn eq(&self, other: &Self) -> bool {
        use TransmissionParameters::*;
        match (self, other) {
            (Standard { transform: a }, Standard { transform: b }) => a == b,
            (Passthrough { transform: a }, Passthrough { transform: b }) => a == b,
            (
                Ensemble { transform: a, learning_rule: la },
                Ensemble { transform: b, learning_rule: lb },
            ) => {
                // an active learning rule makes the effective transform
                // unpredictable; such a connection is never shareable,
                // not even with itself
                la.is_none() && lb.is_none() && a == b
            }
            (
                Node { transform: a, pre_slice: sa, function: fa },
                Node { transform: b, pre_slice: sb, function: fb },
            ) => a == b && sa == sb && fa == fb,
            _ => false,
        }
    }
}

// Marker only. `eq` is intentionally non-reflexive for ensembles carrying
// a learning rule; the interner relies on that to keep such parameters
// unshared.
impl Eq for TransmissionParameters {}

impl Hash for TransmissionParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use TransmissionParameters::*;
        discriminant(self).hash(state);
        match self {
            Standard { transform } | Passthrough { transform } => {
                transform.hash(state);
            }
            Ensemble { transform, learning_rule } => {
                transform.hash(state);
                learning_rule.hash(state);
            }
            Node { transform, pre_slice, function } => {
                transform.hash(state);
                pre_slice.hash(state);
                function.hash(state);
            }
        }
    }
}

/// Interning store collapsing value-equal parameters to one shared
/// canonical instance.
#[derive(Default)]
pub struct ParamStore {
    unique: IndexSet<Arc<CachedHash<TransmissionParameters>>>,
}

impl ParamStore {
    pub fn new() -> ParamStore {
        Default::default()
    }

    /// Return the canonical shared instance for `params`.
    ///
    /// Ensembles carrying a learning rule never unify: each call stores a
    /// fresh entry.
    pub fn canonicalize(
        &mut self,
        params: TransmissionParameters,
    ) -> Arc<CachedHash<TransmissionParameters>> {
        let entry = Arc::new(CachedHash::new(params));
        let (idx, _) = self.unique.insert_full(entry);
        self.unique.get_index(idx).unwrap().clone()
    }

    /// the number of distinct canonical entries.
    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }
}
