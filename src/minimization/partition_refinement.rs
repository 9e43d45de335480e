use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::{
    error::ModelError,
    math::{GroupId, Partition},
    model::{StateIndex, TransitionModel},
};

/// Computes the coarsest partition of the states of `model` into groups of behaviourally
/// equivalent states, starting from the immediate output signature of every state (see
/// [`TransitionModel::output_signature`]).
pub fn refine(model: &TransitionModel) -> Result<Partition, ModelError> {
    refine_by(model, |q| model.output_signature(q))
}

/// Runs partition refinement on `model` where the initial grouping is given by `signature`.
/// States start out in the same group if and only if their signatures are equal, the
/// initial groups are ordered by signature. Afterwards groups are split until every member
/// of a group moves into the same groups as the group's representative on every input.
///
/// Every pass compares against the partition as it was at the start of the pass and the
/// loop only stops once a whole pass did not split anything. Since each productive pass
/// creates at least one group, there are at most `|states|` passes.
pub fn refine_by<S, F>(model: &TransitionModel, signature: F) -> Result<Partition, ModelError>
where
    S: Ord,
    F: Fn(StateIndex) -> S,
{
    if model.size() == 0 {
        return Err(ModelError::EmptyStateSet);
    }
    if model.alphabet().is_empty() {
        return Err(ModelError::EmptyAlphabet);
    }

    let mut blocks: BTreeMap<S, Vec<StateIndex>> = BTreeMap::new();
    for q in model.state_indices() {
        blocks.entry(signature(q)).or_default().push(q);
    }
    let mut partition = Partition::from_blocks(blocks.into_values());
    trace!("initial partition has {} groups", partition.size());

    let mut passes = 0;
    loop {
        passes += 1;
        let splits = refinement_pass(model, &mut partition);
        trace!(
            "pass {passes} split off {splits} groups, now at {}",
            partition.size()
        );
        if splits == 0 {
            break;
        }
    }
    debug!(
        "partition refinement stabilized after {passes} passes with {} groups for {} states",
        partition.size(),
        model.size()
    );
    debug_assert!(partition.is_consistent());
    Ok(partition)
}

/// The groups that the successors of `q` belong to, in column order.
fn target_groups(model: &TransitionModel, partition: &Partition, q: StateIndex) -> Vec<GroupId> {
    model
        .successors(q)
        .iter()
        .map(|&p| partition.group_of(p))
        .collect()
}

/// Splits every group whose members disagree with the representative on some target group.
/// Members that disagree but agree among each other end up in the same new group.
/// Returns the number of newly created groups.
fn refinement_pass(model: &TransitionModel, partition: &mut Partition) -> usize {
    let snapshot = partition.clone();
    let mut splits = 0;

    for (id, group) in snapshot.groups() {
        if group.len() <= 1 {
            continue;
        }
        let baseline = target_groups(model, &snapshot, group.representative());

        let mut deviating: BTreeMap<Vec<GroupId>, Vec<StateIndex>> = BTreeMap::new();
        for &q in &group.members()[1..] {
            let targets = target_groups(model, &snapshot, q);
            if targets != baseline {
                deviating.entry(targets).or_default().push(q);
            }
        }

        let mut split_off: Vec<_> = deviating.into_values().collect();
        split_off.sort_by_key(|members| members[0]);
        for members in split_off {
            let new = partition.split_off(id, members);
            trace!(
                "split {new} off {id}: {:?}",
                partition
                    .group(new)
                    .members()
                    .iter()
                    .map(|&q| model.state_name(q))
                    .collect::<Vec<_>>()
            );
            splits += 1;
        }
    }
    splits
}

#[cfg(test)]
mod tests {
    use super::refine;
    use crate::prelude::*;

    #[test_log::test]
    fn moore_blocks_split_until_stable() {
        // 0 --a--> 1 --a--> 2 --a--> 3 --a--> 3, only 3 emits 1
        let mm = ModelBuilder::moore()
            .with_state_outputs([("q0", "0"), ("q1", "0"), ("q2", "0"), ("q3", "1")])
            .with_edges([
                ("q0", "a", "q1"),
                ("q1", "a", "q2"),
                ("q2", "a", "q3"),
                ("q3", "a", "q3"),
            ])
            .into_model()
            .unwrap();
        let partition = refine(&mm).unwrap();
        assert_eq!(partition.size(), 4);
        assert!(partition.is_consistent());
        for p in mm.state_indices() {
            for q in mm.state_indices() {
                assert_eq!(partition.equivalent(p, q), p == q);
            }
        }
    }

    #[test]
    fn equivalent_states_share_a_group() {
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "0"), ("C", "1")])
            .with_edges([("A", "a", "B"), ("B", "a", "A"), ("C", "a", "C")])
            .into_model()
            .unwrap();
        let partition = refine(&mm).unwrap();
        assert_eq!(partition.size(), 2);
        assert!(partition.equivalent(0, 1));
        assert!(!partition.equivalent(0, 2));
        assert_eq!(partition.group(partition.group_of(1)).representative(), 0);
    }

    #[test]
    fn mealy_starts_from_output_vectors() {
        let mm = ModelBuilder::mealy()
            .with_states(["A", "B", "C", "D"])
            .with_transitions([
                ("A", "x", "B", "0"),
                ("A", "y", "C", "1"),
                ("B", "x", "D", "0"),
                ("B", "y", "A", "1"),
                ("C", "x", "A", "0"),
                ("C", "y", "C", "0"),
                ("D", "x", "B", "0"),
                ("D", "y", "C", "1"),
            ])
            .into_model()
            .unwrap();
        let partition = refine(&mm).unwrap();
        // C is the only state emitting 0 on y, B moves into A's group on y whereas
        // A and D move into C's, which separates B from A and D
        assert!(partition.equivalent(0, 3));
        assert!(!partition.equivalent(0, 1));
        assert!(!partition.equivalent(0, 2));
        assert_eq!(partition.size(), 3);
    }

    #[test]
    fn states_split_in_the_same_pass_are_merged() {
        // B and C deviate from A in the same way and therefore stay together
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "0"), ("C", "0"), ("D", "1")])
            .with_edges([
                ("A", "a", "A"),
                ("B", "a", "D"),
                ("C", "a", "D"),
                ("D", "a", "D"),
            ])
            .into_model()
            .unwrap();
        let partition = refine(&mm).unwrap();
        assert_eq!(partition.size(), 3);
        assert!(partition.equivalent(1, 2));
        assert_eq!(partition.group(partition.group_of(2)).block(), 0);
    }

    #[test]
    fn custom_signatures() {
        let mm = ModelBuilder::moore()
            .with_state_outputs([("A", "0"), ("B", "1")])
            .with_edges([("A", "a", "B"), ("B", "a", "A")])
            .into_model()
            .unwrap();
        let coarse = super::refine_by(&mm, |_| ()).unwrap();
        assert_eq!(coarse.size(), 1);
    }
}
