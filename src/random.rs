use crate::model::{Kind, OutputSymbols, Outputs, TransitionModel};

/// Name of the `i`-th input symbol, `a` to `z` and afterwards `s26`, `s27`, ...
fn symbol_name(i: usize) -> String {
    if i < 26 {
        char::from(b'a' + i as u8).to_string()
    } else {
        format!("s{i}")
    }
}

/// Generates a random complete machine of the given kind with `size` states over `symbols`
/// input symbols. Every transition target is drawn uniformly, as are the outputs, which are
/// taken from `0..outputs`. Depending on the draw, some states may not be reachable from the
/// initial state `q0`.
///
/// Panics if `size`, `symbols` or `outputs` is zero.
pub fn random_machine(
    rng: &mut fastrand::Rng,
    kind: Kind,
    size: usize,
    symbols: usize,
    outputs: usize,
) -> TransitionModel {
    assert!(size > 0, "a machine needs at least one state");
    assert!(symbols > 0, "a machine needs at least one input symbol");
    assert!(outputs > 0, "a machine needs at least one output symbol");

    let alphabet = (0..symbols).map(symbol_name).collect();
    let states = (0..size).map(|i| format!("q{i}")).collect();
    let successors = (0..size * symbols).map(|_| rng.usize(..size)).collect();

    let mut interner = OutputSymbols::default();
    let mut draw = |rng: &mut fastrand::Rng| interner.intern(&rng.usize(..outputs).to_string());
    let outputs = match kind {
        Kind::Mealy => Outputs::Mealy((0..size * symbols).map(|_| draw(rng)).collect()),
        Kind::Moore => Outputs::Moore((0..size).map(|_| draw(rng)).collect()),
    };

    TransitionModel::from_parts(alphabet, states, successors, outputs, interner)
}

/// Works as [`random_machine`] for Mealy machines.
pub fn random_mealy(
    rng: &mut fastrand::Rng,
    size: usize,
    symbols: usize,
    outputs: usize,
) -> TransitionModel {
    random_machine(rng, Kind::Mealy, size, symbols, outputs)
}

/// Works as [`random_machine`] for Moore machines.
pub fn random_moore(
    rng: &mut fastrand::Rng,
    size: usize,
    symbols: usize,
    outputs: usize,
) -> TransitionModel {
    random_machine(rng, Kind::Moore, size, symbols, outputs)
}
