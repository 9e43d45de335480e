use crate::{
    error::ModelError,
    math::{Map, Set},
    model::{Kind, OutputSymbols, Outputs, StateIndex, TransitionModel},
};

/// Helper struct for the construction of a [`TransitionModel`]. It collects declared states,
/// input symbols, state outputs and transitions by name and checks all of them at once in
/// [`ModelBuilder::into_model`].
///
/// States are declared explicitly (for Moore machines [`ModelBuilder::with_state_outputs`] also
/// declares), the first declared state becomes the initial one. Input symbols may be declared
/// up front, symbols that only appear on transitions are appended in order of first appearance.
///
/// # Example
///
/// ```
/// use transducers::prelude::*;
///
/// let mm = ModelBuilder::moore()
///     .with_state_outputs([("A", "0"), ("B", "1")])
///     .with_edges([("A", "a", "B"), ("B", "a", "A")])
///     .into_model()
///     .unwrap();
/// assert_eq!(mm.size(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    kind: Kind,
    states: Vec<String>,
    alphabet: Vec<String>,
    state_outputs: Vec<(String, String)>,
    transitions: Vec<(String, String, String, Option<String>)>,
}

impl ModelBuilder {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            states: vec![],
            alphabet: vec![],
            state_outputs: vec![],
            transitions: vec![],
        }
    }

    /// Starts building a Mealy machine.
    pub fn mealy() -> Self {
        Self::new(Kind::Mealy)
    }

    /// Starts building a Moore machine.
    pub fn moore() -> Self {
        Self::new(Kind::Moore)
    }

    /// Declares the given states in order.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Declares the given input symbols in order.
    pub fn with_alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alphabet.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Assigns outputs to states of a Moore machine. States that have not been declared
    /// yet are declared in the given order.
    pub fn with_state_outputs<I, S, O>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = (S, O)>,
        S: Into<String>,
        O: Into<String>,
    {
        for (state, output) in outputs {
            self.add_state_output(state, output);
        }
        self
    }

    /// Adds Mealy transitions given as `(source, input, target, output)`.
    pub fn with_transitions<I, S, A, T, O>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (S, A, T, O)>,
        S: Into<String>,
        A: Into<String>,
        T: Into<String>,
        O: Into<String>,
    {
        for (source, symbol, target, output) in transitions {
            self.add_transition(source, symbol, target, output);
        }
        self
    }

    /// Adds Moore transitions given as `(source, input, target)`.
    pub fn with_edges<I, S, A, T>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (S, A, T)>,
        S: Into<String>,
        A: Into<String>,
        T: Into<String>,
    {
        for (source, symbol, target) in edges {
            self.add_edge(source, symbol, target);
        }
        self
    }

    /// Assigns `output` to `state`, see [`Self::with_state_outputs`].
    pub fn add_state_output(&mut self, state: impl Into<String>, output: impl Into<String>) {
        self.state_outputs.push((state.into(), output.into()));
    }

    /// Adds a single Mealy transition.
    pub fn add_transition(
        &mut self,
        source: impl Into<String>,
        symbol: impl Into<String>,
        target: impl Into<String>,
        output: impl Into<String>,
    ) {
        self.transitions
            .push((source.into(), symbol.into(), target.into(), Some(output.into())));
    }

    /// Adds a single Moore transition.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        symbol: impl Into<String>,
        target: impl Into<String>,
    ) {
        self.transitions
            .push((source.into(), symbol.into(), target.into(), None));
    }

    /// Checks everything that was collected and produces the [`TransitionModel`].
    pub fn into_model(self) -> Result<TransitionModel, ModelError> {
        let ModelBuilder {
            kind,
            states,
            alphabet,
            state_outputs,
            transitions,
        } = self;

        let mut state_ids: Map<String, StateIndex> = Map::default();
        let mut state_names = Vec::with_capacity(states.len());
        for state in states {
            if state_ids.contains_key(&state) {
                return Err(ModelError::DuplicateState(state));
            }
            state_ids.insert(state.clone(), state_names.len());
            state_names.push(state);
        }

        let mut symbols = OutputSymbols::default();
        let mut state_output = Map::default();
        if !state_outputs.is_empty() && kind == Kind::Mealy {
            return Err(ModelError::malformed(
                0,
                "state outputs given for a Mealy machine",
            ));
        }
        for (state, output) in state_outputs {
            let q = *state_ids.entry(state.clone()).or_insert_with(|| {
                state_names.push(state.clone());
                state_names.len() - 1
            });
            if state_output.insert(q, symbols.intern(&output)).is_some() {
                return Err(ModelError::DuplicateState(state));
            }
        }

        if state_names.is_empty() {
            return Err(ModelError::EmptyStateSet);
        }

        let mut symbol_ids: Map<String, usize> = Map::default();
        let mut symbol_names = Vec::with_capacity(alphabet.len());
        for symbol in alphabet {
            if symbol_ids.contains_key(&symbol) {
                return Err(ModelError::DuplicateInputSymbol(symbol));
            }
            symbol_ids.insert(symbol.clone(), symbol_names.len());
            symbol_names.push(symbol);
        }
        for (_, symbol, _, _) in &transitions {
            if !symbol_ids.contains_key(symbol) {
                symbol_ids.insert(symbol.clone(), symbol_names.len());
                symbol_names.push(symbol.clone());
            }
        }
        if symbol_names.is_empty() {
            return Err(ModelError::EmptyAlphabet);
        }

        let width = symbol_names.len();
        let mut successors: Vec<Option<StateIndex>> = vec![None; state_names.len() * width];
        let mut edge_outputs = vec![None; state_names.len() * width];
        let mut seen = Set::default();
        for (source, symbol, target, output) in transitions {
            let Some(&p) = state_ids.get(&source) else {
                return Err(ModelError::UnknownStateReference { state: source });
            };
            let Some(&q) = state_ids.get(&target) else {
                return Err(ModelError::UnknownStateReference { state: target });
            };
            let a = symbol_ids[&symbol];
            if !seen.insert((p, a)) {
                return Err(ModelError::ConflictingTransition {
                    state: source,
                    symbol,
                });
            }
            match (kind, output) {
                (Kind::Mealy, Some(out)) => {
                    edge_outputs[p * width + a] = Some(symbols.intern(&out))
                }
                (Kind::Moore, None) => {}
                (Kind::Mealy, None) => {
                    return Err(ModelError::malformed(
                        0,
                        format!("transition from `{source}` on `{symbol}` has no output"),
                    ))
                }
                (Kind::Moore, Some(_)) => {
                    return Err(ModelError::malformed(
                        0,
                        format!(
                            "transition from `{source}` on `{symbol}` of a Moore machine \
                             carries an output"
                        ),
                    ))
                }
            }
            successors[p * width + a] = Some(q);
        }

        let missing = |i: usize| ModelError::MissingTransition {
            state: state_names[i / width].clone(),
            symbol: symbol_names[i % width].clone(),
        };
        let successors = successors
            .into_iter()
            .enumerate()
            .map(|(i, q)| q.ok_or_else(|| missing(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = match kind {
            Kind::Mealy => Outputs::Mealy(
                edge_outputs
                    .into_iter()
                    .enumerate()
                    .map(|(i, o)| o.ok_or_else(|| missing(i)))
                    .collect::<Result<_, _>>()?,
            ),
            Kind::Moore => Outputs::Moore(
                (0..state_names.len())
                    .map(|q| {
                        state_output
                            .get(&q)
                            .copied()
                            .ok_or_else(|| ModelError::MissingOutput(state_names[q].clone()))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(TransitionModel::from_parts(
            symbol_names,
            state_names,
            successors,
            outputs,
            symbols,
        ))
    }
}
