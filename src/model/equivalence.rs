use std::collections::VecDeque;

use crate::{
    math::Set,
    model::{StateIndex, SymbolIndex, TransitionModel},
};

impl TransitionModel {
    /// Attempts to construct a shortest word that separates state `p` of `self` from state `q`
    /// of `other`, meaning the outputs produced when running it from the two states differ.
    /// If the two states are bisimilar, the function returns `None`. For Moore machines the
    /// empty word is a witness if `p` and `q` already carry different outputs.
    ///
    /// Outputs are compared by their string content. Panics if the machines are of different
    /// kinds or do not share the same input alphabet.
    pub fn witness_inequivalence(
        &self,
        p: StateIndex,
        other: &TransitionModel,
        q: StateIndex,
    ) -> Option<Vec<SymbolIndex>> {
        assert_eq!(self.kind(), other.kind(), "machines must be of the same kind");
        assert_eq!(
            self.alphabet(),
            other.alphabet(),
            "machines must share their alphabet"
        );

        let mut seen = Set::from_iter([(p, q)]);
        let mut queue = VecDeque::from([(vec![], p, q)]);
        while let Some((word, l, r)) = queue.pop_front() {
            if self.state_output(l) != other.state_output(r) {
                return Some(word);
            }
            for a in self.symbol_indices() {
                if self.transition_output(l, a) != other.transition_output(r, a) {
                    let mut witness = word.clone();
                    witness.push(a);
                    return Some(witness);
                }
            }
            for a in self.symbol_indices() {
                let next = (self.successor(l, a), other.successor(r, a));
                if seen.insert(next) {
                    let mut extended = word.clone();
                    extended.push(a);
                    queue.push_back((extended, next.0, next.1));
                }
            }
        }
        None
    }

    /// Returns true if both machines produce the same outputs on every input word when
    /// started in their respective initial states.
    pub fn bisimilar(&self, other: &TransitionModel) -> bool {
        self.witness_inequivalence(self.initial(), other, other.initial())
            .is_none()
    }

    /// Returns true if no input word distinguishes the states `p` and `q` of `self`.
    pub fn equivalent_states(&self, p: StateIndex, q: StateIndex) -> bool {
        self.witness_inequivalence(p, self, q).is_none()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Cycles through `modulus` states, emitting `1` on every state whose position is
    /// congruent to `period - 1`.
    fn counter(modulus: usize, period: usize) -> TransitionModel {
        let states: Vec<String> = (0..modulus).map(|i| format!("c{i}")).collect();
        ModelBuilder::moore()
            .with_state_outputs(states.iter().enumerate().map(|(i, s)| {
                let out = if i % period == period - 1 { "1" } else { "0" };
                (s.clone(), out)
            }))
            .with_edges(
                (0..modulus).map(|i| (states[i].clone(), "t", states[(i + 1) % modulus].clone())),
            )
            .into_model()
            .unwrap()
    }

    #[test]
    fn moore_witnesses_are_shortest() {
        let three = counter(3, 3);
        let six = counter(6, 6);
        assert_eq!(three.witness_inequivalence(0, &six, 0), Some(vec![0, 0]));
        assert!(!three.bisimilar(&six));
        assert_eq!(three.witness_inequivalence(2, &six, 0), Some(vec![]));

        let folded = counter(4, 2).minimize().unwrap();
        assert_eq!(folded.size(), 2);
        assert!(counter(2, 2).bisimilar(&folded));
        assert!(counter(6, 3).bisimilar(&three));
    }

    #[test]
    fn mealy_equivalence() {
        let mm1 = ModelBuilder::mealy()
            .with_states(["0", "1", "2"])
            .with_transitions([
                ("0", "a", "1", "0"),
                ("0", "b", "0", "1"),
                ("1", "a", "1", "0"),
                ("1", "b", "0", "2"),
                ("2", "a", "1", "0"),
                ("2", "b", "0", "0"),
            ])
            .into_model()
            .unwrap();
        let mm2 = ModelBuilder::mealy()
            .with_states(["0", "1", "2"])
            .with_transitions([
                ("0", "a", "1", "0"),
                ("0", "b", "0", "1"),
                ("1", "a", "1", "0"),
                ("1", "b", "0", "2"),
                ("2", "a", "1", "0"),
                ("2", "b", "1", "0"),
            ])
            .into_model()
            .unwrap();

        assert!(mm1.bisimilar(&mm2));
        assert!(mm1.equivalent_states(0, 0));
        assert_eq!(mm1.witness_inequivalence(0, &mm1, 1), Some(vec![1]));
    }
}
