use itertools::Itertools;
use tracing::trace;

use crate::{
    math::{GroupId, Partition},
    model::{Kind, OutputSymbols, Outputs, TransitionModel},
};

/// Hands out the canonical names of minimized states, which are a prefix followed by a
/// running number. Every minimization run threads its own renaming through the rebuild,
/// so numbering always starts fresh unless a partially used renaming is passed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renaming {
    prefix: String,
    next: usize,
}

impl Default for Renaming {
    fn default() -> Self {
        Self::with_prefix("X")
    }
}

impl Renaming {
    /// Creates a renaming that produces `prefix0`, `prefix1`, ...
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Produces the next unused name.
    pub fn fresh(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }

    /// How many names have been handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Turns a model together with a stable [`Partition`] of its states into the quotient
/// machine, in which every group is collapsed into one freshly named state.
///
/// The group that contains the initial state of `model` is named first, so it becomes the
/// new initial state. The remaining groups follow ordered by the initial output block they
/// descend from and within a block by creation order. Transitions and outputs of a group
/// are those of its representative.
#[derive(Debug)]
pub struct MinimizedModelBuilder<'a> {
    model: &'a TransitionModel,
    partition: &'a Partition,
    renaming: Renaming,
}

impl<'a> MinimizedModelBuilder<'a> {
    /// Panics if `partition` does not partition exactly the states of `model`.
    pub fn new(model: &'a TransitionModel, partition: &'a Partition) -> Self {
        assert_eq!(
            partition.states(),
            model.size(),
            "partition does not cover the states of the model"
        );
        debug_assert!(partition.is_consistent(), "malformed partition");
        Self {
            model,
            partition,
            renaming: Renaming::default(),
        }
    }

    /// Uses `renaming` for naming the new states.
    pub fn with_renaming(mut self, renaming: Renaming) -> Self {
        self.renaming = renaming;
        self
    }

    /// The order in which groups become states of the minimized machine.
    pub fn group_order(&self) -> Vec<GroupId> {
        let initial = self.partition.group_of(self.model.initial());
        std::iter::once(initial)
            .chain(
                self.partition
                    .groups()
                    .filter(|(id, _)| *id != initial)
                    .sorted_by_key(|(id, group)| (group.block(), *id))
                    .map(|(id, _)| id),
            )
            .collect()
    }

    /// Builds the minimized machine.
    pub fn build(self) -> TransitionModel {
        let order = self.group_order();
        let mut renaming = self.renaming;

        let mut position = vec![usize::MAX; self.partition.size()];
        for (i, id) in order.iter().enumerate() {
            position[id.index()] = i;
        }
        let states: Vec<String> = order.iter().map(|_| renaming.fresh()).collect();

        let representatives = order
            .iter()
            .map(|&id| self.partition.group(id).representative())
            .collect_vec();

        let mut successors = Vec::with_capacity(states.len() * self.model.alphabet().len());
        for &r in &representatives {
            successors.extend(
                self.model
                    .successors(r)
                    .iter()
                    .map(|&p| position[self.partition.group_of(p).index()]),
            );
        }

        let mut symbols = OutputSymbols::default();
        let outputs = match self.model.kind() {
            Kind::Moore => Outputs::Moore(
                representatives
                    .iter()
                    .map(|&r| {
                        symbols.intern(self.model.state_output(r).expect("moore machine"))
                    })
                    .collect(),
            ),
            Kind::Mealy => Outputs::Mealy(
                representatives
                    .iter()
                    .flat_map(|&r| self.model.symbol_indices().map(move |a| (r, a)))
                    .map(|(r, a)| {
                        symbols.intern(self.model.transition_output(r, a).expect("mealy machine"))
                    })
                    .collect(),
            ),
        };

        for (name, &r) in states.iter().zip(&representatives) {
            trace!("{name} is represented by {}", self.model.state_name(r));
        }

        TransitionModel::from_parts(
            self.model.alphabet().to_vec(),
            states,
            successors,
            outputs,
            symbols,
        )
    }
}
