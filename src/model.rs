use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use thiserror::Error;

mod symbols;
pub use symbols::{Output, OutputSymbols};

mod builder;
pub use builder::ModelBuilder;

/// Breadth-first exploration of the states reachable from the initial state.
pub mod reachable;

mod equivalence;

/// States are addressed by their position in the state list, the initial state is always `0`.
pub type StateIndex = usize;
/// Input symbols are addressed by their position (column) in the input alphabet.
pub type SymbolIndex = usize;

/// Distinguishes the two kinds of transducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// Outputs are attached to transitions.
    Mealy,
    /// Outputs are attached to states.
    Moore,
}

/// Produced when a string names neither kind of machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown machine kind `{0}`, expected `mealy` or `moore`")]
pub struct UnknownKind(String);

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mealy" => Ok(Kind::Mealy),
            "moore" => Ok(Kind::Moore),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Mealy => write!(f, "mealy"),
            Kind::Moore => write!(f, "moore"),
        }
    }
}

/// Where the outputs of a machine live. For Mealy machines there is one output per
/// transition, stored row by row (state major, then input symbol). For Moore machines
/// there is one output per state.
#[derive(Debug, Clone)]
pub enum Outputs {
    /// Transition outputs of a Mealy machine.
    Mealy(Vec<Output>),
    /// State outputs of a Moore machine.
    Moore(Vec<Output>),
}

impl Outputs {
    /// The kind of machine these outputs belong to.
    pub fn kind(&self) -> Kind {
        match self {
            Outputs::Mealy(_) => Kind::Mealy,
            Outputs::Moore(_) => Kind::Moore,
        }
    }
}

/// A complete deterministic transducer. The transition function is total over
/// `states × alphabet` and every target is a declared state, which is guaranteed
/// by [`ModelBuilder`]. The first state is the initial one.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    alphabet: Vec<String>,
    states: Vec<String>,
    successors: Vec<StateIndex>,
    outputs: Outputs,
    symbols: OutputSymbols,
}

impl TransitionModel {
    /// Assembles a model from raw parts that are already known to be consistent.
    pub(crate) fn from_parts(
        alphabet: Vec<String>,
        states: Vec<String>,
        successors: Vec<StateIndex>,
        outputs: Outputs,
        symbols: OutputSymbols,
    ) -> Self {
        debug_assert_eq!(successors.len(), states.len() * alphabet.len());
        debug_assert!(successors.iter().all(|&q| q < states.len()));
        debug_assert_eq!(
            match &outputs {
                Outputs::Mealy(o) => o.len(),
                Outputs::Moore(o) => o.len() * alphabet.len(),
            },
            states.len() * alphabet.len()
        );
        Self {
            alphabet,
            states,
            successors,
            outputs,
            symbols,
        }
    }

    /// Whether this is a Mealy or a Moore machine.
    pub fn kind(&self) -> Kind {
        self.outputs.kind()
    }

    /// The input symbols in column order.
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }

    /// The state names in table order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// The initial state, which is always the first one.
    pub fn initial(&self) -> StateIndex {
        0
    }

    /// Iterates over all state indices in order.
    pub fn state_indices(&self) -> std::ops::Range<StateIndex> {
        0..self.states.len()
    }

    /// Iterates over all input symbol indices in column order.
    pub fn symbol_indices(&self) -> std::ops::Range<SymbolIndex> {
        0..self.alphabet.len()
    }

    /// The name of state `q`.
    pub fn state_name(&self, q: StateIndex) -> &str {
        &self.states[q]
    }

    /// Finds a state by its name.
    pub fn find_state(&self, name: &str) -> Option<StateIndex> {
        self.states.iter().position(|s| s == name)
    }

    /// Finds an input symbol by its name.
    pub fn find_symbol(&self, name: &str) -> Option<SymbolIndex> {
        self.alphabet.iter().position(|s| s == name)
    }

    /// Translates a word given by symbol names into symbol indices, `None` if some symbol
    /// is unknown.
    pub fn parse_word<'a, I: IntoIterator<Item = &'a str>>(
        &self,
        word: I,
    ) -> Option<Vec<SymbolIndex>> {
        word.into_iter().map(|sym| self.find_symbol(sym)).collect()
    }

    /// The targets of all transitions leaving `q`, in column order.
    pub fn successors(&self, q: StateIndex) -> &[StateIndex] {
        let width = self.alphabet.len();
        &self.successors[q * width..(q + 1) * width]
    }

    /// The target of the transition from `q` on `a`.
    pub fn successor(&self, q: StateIndex, a: SymbolIndex) -> StateIndex {
        self.successors(q)[a]
    }

    /// The output of state `q`, only present for Moore machines.
    pub fn state_output(&self, q: StateIndex) -> Option<&str> {
        match &self.outputs {
            Outputs::Moore(o) => Some(self.symbols.resolve(o[q])),
            Outputs::Mealy(_) => None,
        }
    }

    /// The output emitted when taking the transition from `q` on `a`, only present for Mealy
    /// machines.
    pub fn transition_output(&self, q: StateIndex, a: SymbolIndex) -> Option<&str> {
        match &self.outputs {
            Outputs::Mealy(o) => Some(self.symbols.resolve(o[q * self.alphabet.len() + a])),
            Outputs::Moore(_) => None,
        }
    }

    /// The immediate output signature of `q`, which is what two states need to share in
    /// order to start out in the same group during partition refinement. For a Moore machine
    /// this is the output of the state, for a Mealy machine it is the sequence of outputs
    /// on all input symbols in column order.
    pub fn output_signature(&self, q: StateIndex) -> Vec<&str> {
        match &self.outputs {
            Outputs::Moore(o) => vec![self.symbols.resolve(o[q])],
            Outputs::Mealy(o) => {
                let width = self.alphabet.len();
                o[q * width..(q + 1) * width]
                    .iter()
                    .map(|&out| self.symbols.resolve(out))
                    .collect()
            }
        }
    }

    /// Follows `word` from `from` and returns the state that is reached.
    pub fn reached(&self, from: StateIndex, word: &[SymbolIndex]) -> StateIndex {
        word.iter().fold(from, |q, &a| self.successor(q, a))
    }

    /// Runs `word` from `from` and collects the produced outputs. A Mealy machine emits
    /// one output per symbol. A Moore machine emits the output of `from` followed by the
    /// output of every state that is entered, so `n + 1` outputs for a word of length `n`.
    pub fn run(&self, from: StateIndex, word: &[SymbolIndex]) -> Vec<&str> {
        let mut outputs = Vec::with_capacity(word.len() + 1);
        let mut q = from;
        if let Some(out) = self.state_output(q) {
            outputs.push(out);
        }
        for &a in word {
            if let Some(out) = self.transition_output(q, a) {
                outputs.push(out);
            }
            q = self.successor(q, a);
            if let Some(out) = self.state_output(q) {
                outputs.push(out);
            }
        }
        outputs
    }

    pub(crate) fn output_symbols(&self) -> &OutputSymbols {
        &self.symbols
    }
}

impl PartialEq for TransitionModel {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.alphabet == other.alphabet
            && self.states == other.states
            && self.successors == other.successors
            && self
                .state_indices()
                .all(|q| self.output_signature(q) == other.output_signature(q))
    }
}
impl Eq for TransitionModel {}

impl Display for TransitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        let header = match self.kind() {
            Kind::Mealy => vec!["State".to_string()],
            Kind::Moore => vec!["State".to_string(), "Output".to_string()],
        };
        builder.push_record(header.into_iter().chain(self.alphabet.iter().cloned()));
        for q in self.state_indices() {
            let mut row = vec![self.states[q].clone()];
            row.extend(self.state_output(q).map(str::to_string));
            row.extend(self.symbol_indices().map(|a| {
                let target = self.state_name(self.successor(q, a));
                match self.transition_output(q, a) {
                    Some(out) => format!("{target}/{out}"),
                    None => target.to_string(),
                }
            }));
            builder.push_record(row);
        }
        write!(
            f,
            "{}",
            builder.build().with(tabled::settings::Style::rounded())
        )
    }
}

/// Renders a word of symbol indices using the symbol names of `model`.
pub fn show_word(model: &TransitionModel, word: &[SymbolIndex]) -> String {
    if word.is_empty() {
        "ε".to_string()
    } else {
        word.iter().map(|&a| model.alphabet()[a].as_str()).join(" ")
    }
}
