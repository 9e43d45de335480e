use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{
    error::ModelError,
    model::{OutputSymbols, Outputs, StateIndex, TransitionModel},
};

/// Allows iterating over the indices of all states that can be reached from some origin,
/// in breadth-first order. The origin itself is always produced first.
#[derive(Debug, Clone)]
pub struct ReachableStateIndices<'a> {
    model: &'a TransitionModel,
    seen: BitSet,
    queue: VecDeque<StateIndex>,
}

impl<'a> ReachableStateIndices<'a> {
    /// Starts the exploration in `origin`.
    pub fn new(model: &'a TransitionModel, origin: StateIndex) -> Self {
        let mut seen = BitSet::with_capacity(model.size());
        seen.insert(origin);
        Self {
            model,
            seen,
            queue: VecDeque::from([origin]),
        }
    }

    /// Consumes the iterator and gives back the set of all reachable states.
    pub fn into_set(mut self) -> BitSet {
        while self.next().is_some() {}
        self.seen
    }
}

impl<'a> Iterator for ReachableStateIndices<'a> {
    type Item = StateIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let q = self.queue.pop_front()?;
        for &p in self.model.successors(q) {
            if self.seen.insert(p) {
                self.queue.push_back(p);
            }
        }
        Some(q)
    }
}

impl TransitionModel {
    /// Iterates over the states reachable from the initial state.
    pub fn reachable_state_indices(&self) -> ReachableStateIndices<'_> {
        self.reachable_state_indices_from(self.initial())
    }

    /// Iterates over the states reachable from `origin`.
    pub fn reachable_state_indices_from(&self, origin: StateIndex) -> ReachableStateIndices<'_> {
        ReachableStateIndices::new(self, origin)
    }

    /// Returns a copy of `self` that only contains the states reachable from the initial state.
    /// Surviving states keep their relative order and the alphabet is left untouched. Fails with
    /// [`ModelError::EmptyStateSet`] if there is no initial state.
    pub fn prune_unreachable(&self) -> Result<TransitionModel, ModelError> {
        if self.size() == 0 {
            return Err(ModelError::EmptyStateSet);
        }
        let reachable = self.reachable_state_indices().into_set();
        if reachable.len() == self.size() {
            trace!("all {} states are reachable", self.size());
            return Ok(self.clone());
        }
        debug!(
            "removing {} of {} states which are unreachable",
            self.size() - reachable.len(),
            self.size()
        );
        Ok(self.restrict(&reachable))
    }

    /// Keeps only the states in `keep`, which has to be closed under successors.
    fn restrict(&self, keep: &BitSet) -> TransitionModel {
        let mut renumbered = vec![None; self.size()];
        let retained: Vec<StateIndex> = self
            .state_indices()
            .filter(|&q| keep.contains(q))
            .collect();
        for (i, &q) in retained.iter().enumerate() {
            renumbered[q] = Some(i);
        }
        let rename = |q: StateIndex| -> StateIndex {
            renumbered[q].expect("set of kept states must be closed under successors")
        };

        let states = retained.iter().map(|&q| self.states[q].clone()).collect();
        let mut successors = Vec::with_capacity(retained.len() * self.alphabet.len());
        for &q in &retained {
            successors.extend(self.successors(q).iter().map(|&p| rename(p)));
        }

        let mut symbols = OutputSymbols::default();
        let outputs = match &self.outputs {
            Outputs::Moore(_) => Outputs::Moore(
                retained
                    .iter()
                    .map(|&q| symbols.intern(self.state_output(q).expect("moore machine")))
                    .collect(),
            ),
            Outputs::Mealy(_) => Outputs::Mealy(
                retained
                    .iter()
                    .flat_map(|&q| self.symbol_indices().map(move |a| (q, a)))
                    .map(|(q, a)| {
                        symbols.intern(self.transition_output(q, a).expect("mealy machine"))
                    })
                    .collect(),
            ),
        };

        TransitionModel::from_parts(self.alphabet.clone(), states, successors, outputs, symbols)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test]
    fn reachable_states_in_bfs_order() {
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "0"), ("C", "1"), ("D", "1")])
            .with_edges([
                ("A", "a", "C"),
                ("B", "a", "A"),
                ("C", "a", "D"),
                ("D", "a", "D"),
            ])
            .into_model()
            .unwrap();
        assert_eq!(mm.reachable_state_indices().collect_vec(), vec![0, 2, 3]);
        assert_eq!(mm.reachable_state_indices_from(3).collect_vec(), vec![3]);
    }

    #[test_log::test]
    fn pruning_keeps_relative_order() {
        let mm = ModelBuilder::mealy()
            .with_states(["S", "dead", "T", "U"])
            .with_transitions([
                ("S", "a", "U", "0"),
                ("S", "b", "T", "1"),
                ("dead", "a", "S", "7"),
                ("dead", "b", "dead", "8"),
                ("T", "a", "T", "0"),
                ("T", "b", "U", "0"),
                ("U", "a", "S", "1"),
                ("U", "b", "U", "1"),
            ])
            .into_model()
            .unwrap();
        let pruned = mm.prune_unreachable().unwrap();
        assert_eq!(pruned.states(), &["S", "T", "U"]);
        assert_eq!(pruned.alphabet(), mm.alphabet());
        assert_eq!(pruned.successors(0), &[2, 1]);
        assert_eq!(pruned.transition_output(1, 1), Some("0"));
        assert_eq!(pruned.output_symbols().find("7"), None);
    }

    #[test]
    fn pruning_without_dead_states_is_a_noop() {
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "1")])
            .with_edges([("A", "a", "B"), ("B", "a", "A")])
            .into_model()
            .unwrap();
        assert_eq!(mm.prune_unreachable().unwrap(), mm);
    }
}
