use std::path::PathBuf;

use thiserror::Error;

/// Abstracts the errors that can occur while constructing, reading, writing or minimizing
/// a machine. All of them are fatal for the minimization run they occur in.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The machine has no states, so there is no initial state.
    #[error("machine has no states, the initial state is undefined")]
    EmptyStateSet,
    /// The machine has no input symbols.
    #[error("machine has no input symbols")]
    EmptyAlphabet,
    /// The table does not have the expected shape.
    #[error("malformed table in line {line}: {reason}")]
    MalformedTable {
        /// One based line in the table, `0` if unknown.
        line: usize,
        /// Human readable explanation.
        reason: String,
    },
    /// A transition points to a state that is not declared.
    #[error("transition targets state `{state}` which is not declared")]
    UnknownStateReference {
        /// Name of the referenced state.
        state: String,
    },
    /// The same state name is declared twice.
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),
    /// The same input symbol is declared twice.
    #[error("input symbol `{0}` is declared more than once")]
    DuplicateInputSymbol(String),
    /// The transition function is not total.
    #[error("state `{state}` has no transition on input `{symbol}`")]
    MissingTransition {
        /// Name of the source state.
        state: String,
        /// Name of the input symbol.
        symbol: String,
    },
    /// A Moore state has no output symbol.
    #[error("state `{0}` has no output symbol")]
    MissingOutput(String),
    /// A state has more than one transition on the same input symbol.
    #[error("state `{state}` has more than one transition on input `{symbol}`")]
    ConflictingTransition {
        /// Name of the source state.
        state: String,
        /// Name of the input symbol.
        symbol: String,
    },
    /// A table file could not be opened, read or written.
    #[error("could not access `{}`: {source}", .path.display())]
    Io {
        /// The file that was accessed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The delimited reader or writer failed.
    #[error("could not process table: {0}")]
    Csv(#[from] csv::Error),
}

impl ModelError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            line,
            reason: reason.into(),
        }
    }
}
