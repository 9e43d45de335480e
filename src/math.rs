use crate::model::StateIndex;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// Stable handle of an [`EquivalenceGroup`] inside a [`Partition`]. Handles are handed out
/// in creation order and are never reused or invalidated while the partition is refined,
/// so comparing two handles is the same as comparing group identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// Position of the group in the arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// A non-empty set of states which are (so far) believed to be indistinguishable.
///
/// Members are kept sorted by state index, the first member is the representative.
/// Every group also remembers the initial output block it descends from, this is
/// used for ordering groups when they are renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceGroup {
    members: Vec<StateIndex>,
    block: usize,
}

impl EquivalenceGroup {
    pub(crate) fn new(mut members: Vec<StateIndex>, block: usize) -> Self {
        assert!(!members.is_empty(), "equivalence groups may not be empty");
        members.sort_unstable();
        Self { members, block }
    }

    /// The designated representative, which is the member that comes first in the state order.
    pub fn representative(&self) -> StateIndex {
        self.members[0]
    }

    /// All members in increasing order.
    pub fn members(&self) -> &[StateIndex] {
        &self.members
    }

    /// Number of members, always at least one.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Groups are never empty, this is only here to keep clippy happy.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if `q` is a member.
    pub fn contains(&self, q: StateIndex) -> bool {
        self.members.binary_search(&q).is_ok()
    }

    /// Index of the initial output block this group was split from.
    pub fn block(&self) -> usize {
        self.block
    }
}

/// A partition of the states `0..n` into [`EquivalenceGroup`]s. Groups live in an arena
/// and are addressed through [`GroupId`]s, each state maps to the handle of the group
/// owning it. Splitting moves states into freshly allocated groups and never touches
/// the handles of existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<EquivalenceGroup>,
    owner: Vec<GroupId>,
}

impl Partition {
    /// Builds a partition from the given blocks, block `i` receives [`GroupId`] `i` and is
    /// its own initial block. Panics if the blocks do not cover `0..n` exactly once.
    pub fn from_blocks<I, B>(blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = StateIndex>,
    {
        let groups: Vec<_> = blocks
            .into_iter()
            .enumerate()
            .map(|(i, b)| EquivalenceGroup::new(b.into_iter().collect(), i))
            .collect();
        let size = groups.iter().map(|g| g.len()).sum();
        let mut owner = vec![None; size];
        for (i, group) in groups.iter().enumerate() {
            for &q in group.members() {
                let slot = owner
                    .get_mut(q)
                    .expect("blocks must cover a contiguous range of states");
                assert!(slot.is_none(), "state {q} appears in more than one block");
                *slot = Some(GroupId(i));
            }
        }
        Self {
            groups,
            owner: owner
                .into_iter()
                .map(|o| o.expect("every state must be covered"))
                .collect(),
        }
    }

    /// Handle of the group that currently owns `q`.
    pub fn group_of(&self, q: StateIndex) -> GroupId {
        self.owner[q]
    }

    /// Looks up a group by its handle.
    pub fn group(&self, id: GroupId) -> &EquivalenceGroup {
        &self.groups[id.0]
    }

    /// Iterates over all groups together with their handles, in creation order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &EquivalenceGroup)> + '_ {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }

    /// The number of groups.
    pub fn size(&self) -> usize {
        self.groups.len()
    }

    /// The number of states that are partitioned.
    pub fn states(&self) -> usize {
        self.owner.len()
    }

    /// Returns true if `p` and `q` are in the same group.
    pub fn equivalent(&self, p: StateIndex, q: StateIndex) -> bool {
        self.owner[p] == self.owner[q]
    }

    /// Moves `members` out of the group `from` into a freshly allocated group which
    /// inherits the initial block of `from`. Returns the handle of the new group.
    pub(crate) fn split_off(&mut self, from: GroupId, members: Vec<StateIndex>) -> GroupId {
        let id = GroupId(self.groups.len());
        let block = self.groups[from.0].block;
        self.groups[from.0]
            .members
            .retain(|q| members.binary_search(q).is_err());
        assert!(
            !self.groups[from.0].members.is_empty(),
            "splitting may not empty the group {from}"
        );
        let group = EquivalenceGroup::new(members, block);
        for &q in group.members() {
            debug_assert_eq!(self.owner[q], from);
            self.owner[q] = id;
        }
        self.groups.push(group);
        id
    }

    /// Checks that every state belongs to exactly one group and that the group it is
    /// mapped to actually contains it.
    pub fn is_consistent(&self) -> bool {
        let mut seen = vec![false; self.owner.len()];
        for (id, group) in self.groups() {
            if group.is_empty() {
                return false;
            }
            for &q in group.members() {
                match seen.get_mut(q) {
                    Some(s) if !*s && self.owner[q] == id => *s = true,
                    _ => return false,
                }
            }
        }
        seen.into_iter().all(|s| s)
    }
}
