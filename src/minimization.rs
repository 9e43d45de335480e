/// Computation of the coarsest stable partition.
pub mod partition_refinement;
/// Construction of the quotient machine from a partition.
pub mod rebuild;

use tracing::debug;

use crate::{error::ModelError, model::TransitionModel};

pub use rebuild::{MinimizedModelBuilder, Renaming};

impl TransitionModel {
    /// Returns the unique minimal machine that produces the same outputs as `self` on every
    /// input word. The states of the result are named `X0, X1, ...` where `X0` is the new
    /// initial state.
    ///
    /// Minimization first removes all states that cannot be reached from the initial state,
    /// then computes the coarsest partition of the remaining states into equivalent ones with
    /// [`partition_refinement::refine`] and finally collapses every group into a single state.
    pub fn minimize(&self) -> Result<TransitionModel, ModelError> {
        self.minimize_with(Renaming::default())
    }

    /// Works like [`Self::minimize`] but names the new states using `renaming`.
    pub fn minimize_with(&self, renaming: Renaming) -> Result<TransitionModel, ModelError> {
        let pruned = self.prune_unreachable()?;
        let partition = partition_refinement::refine(&pruned)?;
        let minimized = MinimizedModelBuilder::new(&pruned, &partition)
            .with_renaming(renaming)
            .build();
        debug!(
            "minimized {} machine from {} to {} states",
            self.kind(),
            self.size(),
            minimized.size()
        );
        Ok(minimized)
    }

    /// Returns true if every state is reachable and no two states are equivalent.
    pub fn is_minimal(&self) -> Result<bool, ModelError> {
        if self.reachable_state_indices().count() != self.size() {
            return Ok(false);
        }
        Ok(partition_refinement::refine(self)?.size() == self.size())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn moore_merges_equivalent_states() {
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "0"), ("C", "1")])
            .with_edges([("A", "a", "B"), ("B", "a", "A"), ("C", "a", "C")])
            .into_model()
            .unwrap();
        let min = mm.minimize().unwrap();
        // C cannot be reached, A and B collapse
        assert_eq!(min.size(), 1);
        assert!(min.bisimilar(&mm));

        let connected = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "0"), ("C", "1")])
            .with_alphabet(["a", "b"])
            .with_edges([
                ("A", "a", "B"),
                ("B", "a", "A"),
                ("C", "a", "C"),
                ("A", "b", "C"),
                ("B", "b", "C"),
                ("C", "b", "C"),
            ])
            .into_model()
            .unwrap();
        let min = connected.minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert_eq!(min.states(), &["X0", "X1"]);
        assert_eq!(min.state_output(0), Some("0"));
        assert_eq!(min.state_output(1), Some("1"));
        assert_eq!(min.successors(0), &[0, 1]);
        assert_eq!(min.successors(1), &[1, 1]);
        assert!(min.bisimilar(&connected));
    }

    #[test]
    fn mealy_merges_identical_rows_only() {
        let mm = ModelBuilder::mealy()
            .with_states(["A", "B", "C"])
            .with_transitions([
                ("A", "x", "B", "0"),
                ("A", "y", "C", "1"),
                ("B", "x", "B", "0"),
                ("B", "y", "C", "1"),
                ("C", "x", "A", "0"),
                ("C", "y", "C", "0"),
            ])
            .into_model()
            .unwrap();
        let min = mm.minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert_eq!(min.successors(0), &[0, 1]);
        assert_eq!(min.transition_output(0, 1), Some("1"));
        assert_eq!(min.transition_output(1, 1), Some("0"));
        assert!(min.bisimilar(&mm));
        assert!(min.is_minimal().unwrap());
        assert!(!mm.is_minimal().unwrap());
    }

    #[test]
    fn unreachable_states_never_survive() {
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "1"), ("Z", "2")])
            .with_edges([("A", "a", "B"), ("B", "a", "A"), ("Z", "a", "A")])
            .into_model()
            .unwrap();
        let min = mm.minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert!(min.state_indices().all(|q| min.state_output(q) != Some("2")));
    }

    #[test]
    fn initial_state_becomes_x0() {
        // the initial state emits the largest output, its block is ordered last
        let mm = ModelBuilder::moore()
            .with_state_outputs([("S", "z"), ("T", "a"), ("U", "m")])
            .with_edges([("S", "i", "T"), ("T", "i", "U"), ("U", "i", "S")])
            .into_model()
            .unwrap();
        let min = mm.minimize_with(Renaming::with_prefix("q")).unwrap();
        assert_eq!(min.states(), &["q0", "q1", "q2"]);
        assert_eq!(min.state_output(0), Some("z"));
        assert_eq!(min.state_output(1), Some("a"));
        assert_eq!(min.state_output(2), Some("m"));
        assert_eq!(min.successors(0), &[1]);
    }

    #[test]
    fn minimization_is_idempotent() {
        let mm = ModelBuilder::mealy()
            .with_states(["p", "q", "r", "s"])
            .with_transitions([
                ("p", "0", "q", "a"),
                ("p", "1", "r", "b"),
                ("q", "0", "s", "a"),
                ("q", "1", "r", "b"),
                ("r", "0", "p", "b"),
                ("r", "1", "r", "a"),
                ("s", "0", "q", "a"),
                ("s", "1", "r", "b"),
            ])
            .into_model()
            .unwrap();
        let once = mm.minimize().unwrap();
        let twice = once.minimize().unwrap();
        assert_eq!(once.size(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn single_state_machines() {
        let mm = ModelBuilder::mealy()
            .with_states(["only"])
            .with_transitions([("only", "a", "only", "o")])
            .into_model()
            .unwrap();
        let min = mm.minimize().unwrap();
        assert_eq!(min.states(), &["X0"]);
        assert_eq!(min.transition_output(0, 0), Some("o"));
    }
}
