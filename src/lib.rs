//! Library for minimizing finite-state transducers, that is Mealy machines (outputs on
//! transitions) and Moore machines (outputs on states).
//!
//! The central type is [`TransitionModel`], a complete deterministic transducer whose states
//! and input symbols are addressed by position and carry display names. The first state is
//! always the initial one. Models are built with a [`ModelBuilder`], which checks that the
//! transition function is total and that no transition points to an undeclared state, or read
//! from a semicolon separated table with the functions in [`table`].
//!
//! Minimization ([`TransitionModel::minimize`]) runs in three stages, each a pure function of
//! the previous one:
//! - states that are not reachable from the initial state are removed
//!   ([`TransitionModel::prune_unreachable`]),
//! - the remaining states are partitioned into groups of equivalent states by partition
//!   refinement ([`minimization::partition_refinement::refine`]), starting from the outputs
//!   and splitting groups until all members agree on the groups their successors belong to,
//! - every group becomes one state of the result, named `X0, X1, ...` where `X0` contains the
//!   old initial state ([`minimization::MinimizedModelBuilder`]).
//!
//! ```
//! use transducers::prelude::*;
//!
//! let mm = ModelBuilder::moore()
//!     .with_state_outputs([("A", "0"), ("B", "0"), ("C", "1")])
//!     .with_edges([("A", "a", "B"), ("B", "a", "C"), ("C", "a", "C")])
//!     .into_model()
//!     .unwrap();
//! let min = mm.minimize().unwrap();
//! assert_eq!(min.size(), 3);
//! assert!(min.bisimilar(&mm));
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use transducers::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        error::ModelError,
        math::{EquivalenceGroup, GroupId, Partition},
        minimization::{partition_refinement, MinimizedModelBuilder, Renaming},
        model::{
            reachable::ReachableStateIndices, show_word, Kind, ModelBuilder, Output, Outputs,
            StateIndex, SymbolIndex, TransitionModel,
        },
        table,
    };
}

/// Type aliases for the collections used throughout the crate and the partition data structure.
pub mod math;

/// Errors that can occur when constructing, reading or minimizing machines.
pub mod error;
pub use error::ModelError;

/// Defines the transducers themselves.
pub mod model;
pub use model::{Kind, ModelBuilder, TransitionModel};

/// Contains the minimization pipeline.
pub mod minimization;

pub mod table;

/// Implements the generation of random transducers.
#[cfg(feature = "random")]
pub mod random;
