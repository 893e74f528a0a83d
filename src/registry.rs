// SPDX-License-Identifier: Apache-2.0
//! Build-time dispatch from connection origin to parameter builder.
//!
//! The origin of a connection (ensemble, node, passthrough, generic) is
//! resolved once while the model is constructed; after that, building its
//! transmission parameters is a table lookup over a closed set of variant
//! tags. The table is validated for duplicate registration at startup and
//! overriding an entry requires an explicit flag.

use crate::params::{FunctionId, LearningRuleId, ParamStore, TransmissionParameters};
use cachedhash::CachedHash;
use indexmap::IndexMap;
use ndarray::Array2;
use rayon::prelude::*;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// The closed set of connection origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginKind {
    Generic,
    Ensemble,
    Passthrough,
    Node,
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OriginKind::Generic => "generic",
            OriginKind::Ensemble => "ensemble",
            OriginKind::Passthrough => "passthrough",
            OriginKind::Node => "node",
        };
        write!(f, "{}", s)
    }
}

/// Per-connection description, resolved once during model construction.
#[derive(Debug, Clone)]
pub enum ConnectionOrigin {
    Generic {
        transform: Array2<f64>,
    },
    Ensemble {
        transform: Array2<f64>,
        learning_rule: Option<LearningRuleId>,
    },
    Passthrough {
        transform: Array2<f64>,
    },
    Node {
        transform: Array2<f64>,
        pre_slice: Range<usize>,
        function: FunctionId,
    },
}

impl ConnectionOrigin {
    pub fn kind(&self) -> OriginKind {
        match self {
            ConnectionOrigin::Generic { .. } => OriginKind::Generic,
            ConnectionOrigin::Ensemble { .. } => OriginKind::Ensemble,
            ConnectionOrigin::Passthrough { .. } => OriginKind::Passthrough,
            ConnectionOrigin::Node { .. } => OriginKind::Node,
        }
    }
}

/// Builds transmission parameters from one connection origin.
///
/// Handlers are only ever invoked on origins of the kind they were
/// registered for.
pub type ParamBuilder = fn(&ConnectionOrigin) -> TransmissionParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// a builder is already registered for this kind and override was not
    /// requested.
    DuplicateKind(OriginKind),
    /// no builder is registered for this kind.
    UnknownKind(OriginKind),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateKind(kind) => {
                write!(f, "builder for origin kind `{}` already registered", kind)
            }
            RegistryError::UnknownKind(kind) => {
                write!(f, "no builder registered for origin kind `{}`", kind)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Registration table from origin kind to parameter builder.
#[derive(Default)]
pub struct BuilderRegistry {
    builders: IndexMap<OriginKind, ParamBuilder>,
}

impl BuilderRegistry {
    pub fn new() -> BuilderRegistry {
        Default::default()
    }

    /// A registry with the four standard builders installed.
    pub fn with_default_builders() -> BuilderRegistry {
        let mut registry = BuilderRegistry::new();
        registry.register(OriginKind::Generic, build_generic, false).unwrap();
        registry.register(OriginKind::Ensemble, build_ensemble, false).unwrap();
        registry.register(OriginKind::Passthrough, build_passthrough, false).unwrap();
        registry.register(OriginKind::Node, build_node, false).unwrap();
        clilog::debug!("installed {} default parameter builders",
                       registry.builders.len());
        registry
    }

    /// Register `builder` for `kind`.
    ///
    /// Registering a kind twice is an error unless `allow_override` is
    /// set, in which case the new builder replaces the old one.
    pub fn register(
        &mut self,
        kind: OriginKind,
        builder: ParamBuilder,
        allow_override: bool,
    ) -> Result<(), RegistryError> {
        if self.builders.contains_key(&kind) && !allow_override {
            return Err(RegistryError::DuplicateKind(kind));
        }
        self.builders.insert(kind, builder);
        Ok(())
    }

    /// Build transmission parameters for one connection.
    pub fn build(
        &self, origin: &ConnectionOrigin,
    ) -> Result<TransmissionParameters, RegistryError> {
        let builder = self.builders.get(&origin.kind())
            .ok_or(RegistryError::UnknownKind(origin.kind()))?;
        Ok(builder(origin))
    }
}

fn build_generic(origin: &ConnectionOrigin) -> TransmissionParameters {
    match origin {
        ConnectionOrigin::Generic { transform } => {
            TransmissionParameters::standard(transform.view())
        }
        _ => panic!("generic builder invoked on {} origin", origin.kind()),
    }
}

fn build_ensemble(origin: &ConnectionOrigin) -> TransmissionParameters {
    match origin {
        ConnectionOrigin::Ensemble { transform, learning_rule } => {
            TransmissionParameters::ensemble(transform.view(), *learning_rule)
        }
        _ => panic!("ensemble builder invoked on {} origin", origin.kind()),
    }
}

fn build_passthrough(origin: &ConnectionOrigin) -> TransmissionParameters {
    match origin {
        ConnectionOrigin::Passthrough { transform } => {
            TransmissionParameters::passthrough(transform.view())
        }
        _ => panic!("passthrough builder invoked on {} origin", origin.kind()),
    }
}

fn build_node(origin: &ConnectionOrigin) -> TransmissionParameters {
    match origin {
        ConnectionOrigin::Node { transform, pre_slice, function } => {
            TransmissionParameters::node(
                transform.view(), pre_slice.clone(), *function,
            )
        }
        _ => panic!("node builder invoked on {} origin", origin.kind()),
    }
}

/// Build and intern parameters for a batch of connections.
///
/// Construction is pure and runs in parallel; interning is sequential so
/// canonical order follows input order. The returned vector is parallel
/// to `origins`.
pub fn canonicalize_batch(
    registry: &BuilderRegistry,
    origins: &[ConnectionOrigin],
    store: &mut ParamStore,
) -> Result<Vec<Arc<CachedHash<TransmissionParameters>>>, RegistryError> {
    let built = origins.par_iter()
        .map(|origin| registry.build(origin))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(built.into_iter().map(|params| store.canonicalize(params)).collect())
}
