//! Reading and writing machines as semicolon separated tables.
//!
//! A Mealy table starts with a header row consisting of an empty cell followed by one cell per
//! state. Every following row starts with an input symbol and then contains one
//! `next/output` cell per state column.
//!
//! ```text
//! ;A;B
//! x;B/0;A/1
//! y;A/1;B/0
//! ```
//!
//! A Moore table has two header rows, the first holds the outputs of the states and the second
//! their names (both after an empty cell). The remaining rows start with an input symbol which
//! is followed by one target state per column.
//!
//! ```text
//! ;0;0;1
//! ;A;B;C
//! a;B;A;C
//! ```
//!
//! Cells are trimmed, blank lines are ignored and trailing empty cells are tolerated. Quotes
//! carry no meaning, a `"` is part of the cell it appears in.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use tracing::{debug, info, trace};

use crate::{
    error::ModelError,
    model::{Kind, ModelBuilder, TransitionModel},
};

const DELIMITER: u8 = b';';

/// Reads a machine of the given kind from `reader`.
pub fn read<R: Read>(kind: Kind, reader: R) -> Result<TransitionModel, ModelError> {
    match kind {
        Kind::Mealy => read_mealy(reader),
        Kind::Moore => read_moore(reader),
    }
}

/// A row of the table together with the line it starts in.
struct Row {
    line: usize,
    cells: Vec<String>,
}

impl Row {
    /// Makes sure the row has exactly `width` cells, dropping trailing empty ones.
    fn fit(mut self, width: usize) -> Result<Self, ModelError> {
        while self.cells.len() > width && self.cells.last().is_some_and(|c| c.is_empty()) {
            self.cells.pop();
        }
        if self.cells.len() != width {
            return Err(ModelError::malformed(
                self.line,
                format!("expected {width} cells but found {}", self.cells.len()),
            ));
        }
        Ok(self)
    }

    /// The cells after the leading one, which need to be non-empty names.
    fn names(&self, what: &str) -> Result<Vec<String>, ModelError> {
        self.cells[1..]
            .iter()
            .map(|c| {
                if c.is_empty() {
                    Err(ModelError::malformed(self.line, format!("empty {what}")))
                } else {
                    Ok(c.clone())
                }
            })
            .collect()
    }
}

fn rows<R: Read>(reader: R) -> impl Iterator<Item = Result<Row, ModelError>> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .into_records()
        .map(|record| {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            Ok(Row {
                line,
                cells: record.iter().map(str::to_string).collect(),
            })
        })
        .filter(|row| !matches!(row, Ok(r) if r.cells.iter().all(|c| c.is_empty())))
}

/// The next row, which has to name at least one state (or output) after the leading cell.
fn header<I>(rows: &mut I, what: &str) -> Result<Row, ModelError>
where
    I: Iterator<Item = Result<Row, ModelError>>,
{
    match rows.next() {
        Some(row) => {
            let mut row = row?;
            while row.cells.len() > 1 && row.cells.last().is_some_and(|c| c.is_empty()) {
                row.cells.pop();
            }
            if row.cells.len() < 2 {
                return Err(ModelError::malformed(row.line, format!("row of {what} is empty")));
            }
            Ok(row)
        }
        None => Err(ModelError::EmptyStateSet),
    }
}

/// Reads a Mealy machine, see the module documentation for the format.
pub fn read_mealy<R: Read>(reader: R) -> Result<TransitionModel, ModelError> {
    let mut rows = rows(reader);
    let header = header(&mut rows, "states")?;
    let states = header.names("state name")?;
    let width = states.len() + 1;

    let mut builder = ModelBuilder::mealy().with_states(states.iter().cloned());
    let mut alphabet = vec![];
    for row in rows {
        let row = row?.fit(width)?;
        let symbol = &row.cells[0];
        if symbol.is_empty() {
            return Err(ModelError::malformed(row.line, "missing input symbol"));
        }
        for (state, cell) in states.iter().zip(&row.cells[1..]) {
            let Some((target, output)) = cell.split_once('/') else {
                return Err(ModelError::malformed(
                    row.line,
                    format!("transition `{cell}` has no `/` separating target and output"),
                ));
            };
            builder.add_transition(state, symbol, target.trim(), output.trim());
        }
        alphabet.push(symbol.clone());
    }
    trace!("read mealy table with {} states", states.len());
    builder.with_alphabet(alphabet).into_model()
}

/// Reads a Moore machine, see the module documentation for the format.
pub fn read_moore<R: Read>(reader: R) -> Result<TransitionModel, ModelError> {
    let mut rows = rows(reader);
    let outputs = header(&mut rows, "outputs")?;
    let states = match rows.next() {
        Some(row) => row?,
        None => {
            return Err(ModelError::malformed(
                outputs.line + 1,
                "missing row of state names",
            ))
        }
    };
    let width = outputs.cells.len().max(states.cells.len());
    let outputs = outputs.fit(width)?;
    let states = states.fit(width)?;
    let names = states.names("state name")?;
    let outputs = outputs.names("output")?;

    let mut builder = ModelBuilder::moore().with_state_outputs(names.iter().cloned().zip(outputs));
    let mut alphabet = vec![];
    for row in rows {
        let row = row?.fit(width)?;
        let symbol = &row.cells[0];
        if symbol.is_empty() {
            return Err(ModelError::malformed(row.line, "missing input symbol"));
        }
        for (state, target) in names.iter().zip(&row.cells[1..]) {
            if target.is_empty() {
                return Err(ModelError::malformed(
                    row.line,
                    format!("missing target of `{state}` on `{symbol}`"),
                ));
            }
            builder.add_edge(state, symbol, target);
        }
        alphabet.push(symbol.clone());
    }
    trace!("read moore table with {} states", names.len());
    builder.with_alphabet(alphabet).into_model()
}

/// Writes `model` as a table in the format matching its kind. Rows follow the alphabet order
/// and columns the state order.
pub fn write<W: Write>(model: &TransitionModel, writer: W) -> Result<(), ModelError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .flexible(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let with_lead = |cells: Vec<String>| std::iter::once(String::new()).chain(cells);
    if model.kind() == Kind::Moore {
        out.write_record(with_lead(
            model
                .state_indices()
                .map(|q| model.state_output(q).expect("moore machine").to_string())
                .collect(),
        ))?;
    }
    out.write_record(with_lead(model.states().to_vec()))?;

    for a in model.symbol_indices() {
        let row = model.state_indices().map(|q| {
            let target = model.state_name(model.successor(q, a));
            match model.transition_output(q, a) {
                Some(output) => format!("{target}/{output}"),
                None => target.to_string(),
            }
        });
        out.write_record(std::iter::once(model.alphabet()[a].clone()).chain(row))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads a table from the file at `path`.
pub fn read_file<P: AsRef<Path>>(kind: Kind, path: P) -> Result<TransitionModel, ModelError> {
    let path = path.as_ref();
    debug!("reading {kind} machine from {}", path.display());
    let file = File::open(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read(kind, file)
}

/// Writes `model` to the file at `path`, replacing existing content.
pub fn write_file<P: AsRef<Path>>(model: &TransitionModel, path: P) -> Result<(), ModelError> {
    let path = path.as_ref();
    debug!("writing {} machine to {}", model.kind(), path.display());
    let file = File::create(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write(model, file)
}

/// Outcome of [`minimize_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Kind of the machine that was minimized.
    pub kind: Kind,
    /// Number of states in the input table.
    pub states_before: usize,
    /// Number of states in the written table.
    pub states_after: usize,
}

/// Reads a machine of the given kind from `input`, minimizes it and writes the result to
/// `output`. Nothing is written if reading or minimizing fails.
pub fn minimize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    kind: Kind,
    input: P,
    output: Q,
) -> Result<Summary, ModelError> {
    let model = read_file(kind, input)?;
    let minimized = model.minimize()?;
    write_file(&minimized, output)?;
    info!(
        "minimized {kind} machine from {} to {} states",
        model.size(),
        minimized.size()
    );
    Ok(Summary {
        kind,
        states_before: model.size(),
        states_after: minimized.size(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    const MEALY: &str = "\
;A;B;C
x;B/0;B/0;A/0
y;C/1;C/1;C/0
";

    const MOORE: &str = "\
;0;0;1;2
;A;B;C;D
a;B;A;C;A
b;C;C;C;D
";

    #[test_log::test]
    fn reads_mealy_tables() {
        let mm = read_mealy(MEALY.as_bytes()).unwrap();
        assert_eq!(mm.states(), &["A", "B", "C"]);
        assert_eq!(mm.alphabet(), &["x", "y"]);
        assert_eq!(mm.successor(2, 0), 0);
        assert_eq!(mm.transition_output(0, 1), Some("1"));
    }

    #[test]
    fn reads_moore_tables() {
        let mm = read_moore(MOORE.as_bytes()).unwrap();
        assert_eq!(mm.kind(), Kind::Moore);
        assert_eq!(mm.states(), &["A", "B", "C", "D"]);
        assert_eq!(mm.state_output(3), Some("2"));
        assert_eq!(mm.successors(3), &[0, 3]);
    }

    #[test]
    fn writes_minimized_tables() {
        let min = read_mealy(MEALY.as_bytes()).unwrap().minimize().unwrap();
        let mut buf = vec![];
        write(&min, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            ";X0;X1\nx;X0/0;X0/0\ny;X1/1;X1/0\n"
        );

        let min = read_moore(MOORE.as_bytes()).unwrap().minimize().unwrap();
        let mut buf = vec![];
        write(&min, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            ";0;1\n;X0;X1\na;X0;X1\nb;X1;X1\n"
        );
    }

    #[test]
    fn tolerates_blank_lines_and_padding() {
        let table = "; A ; B ;\n\nx; B/0 ;A/1;\n\n";
        let mm = read_mealy(table.as_bytes()).unwrap();
        assert_eq!(mm.states(), &["A", "B"]);
        assert_eq!(mm.successors(0), &[1]);
    }

    #[test]
    fn reports_malformed_tables() {
        assert!(matches!(
            read_mealy(";A;B\nx;B/0\n".as_bytes()),
            Err(ModelError::MalformedTable { line: 2, .. })
        ));
        assert!(matches!(
            read_mealy(";A\nx;A0\n".as_bytes()),
            Err(ModelError::MalformedTable { line: 2, .. })
        ));
        assert!(matches!(
            read_mealy(";A\nx;B/0\n".as_bytes()),
            Err(ModelError::UnknownStateReference { state }) if state == "B"
        ));
        assert!(matches!(
            read_mealy("".as_bytes()),
            Err(ModelError::EmptyStateSet)
        ));
        assert!(matches!(
            read_mealy(";A\n".as_bytes()),
            Err(ModelError::EmptyAlphabet)
        ));
        assert!(matches!(
            read_moore(";0;1\n;A\na;A\n".as_bytes()),
            Err(ModelError::MalformedTable { line: 2, .. })
        ));
        assert!(matches!(
            read_moore(";0\n".as_bytes()),
            Err(ModelError::MalformedTable { line: 2, .. })
        ));
    }

    #[test]
    fn quotes_are_plain_text() {
        let table = ";\"A\";B\nx;B/0;\"A\"/1\n";
        let mm = read_mealy(table.as_bytes()).unwrap();
        assert_eq!(mm.states(), &["\"A\"", "B"]);
        assert_eq!(mm.successor(1, 0), 0);

        let mut buf = vec![];
        write(&mm, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), table);

        assert!(matches!(
            read_mealy(";A;B\nx;\"B/0;A/1\n".as_bytes()),
            Err(ModelError::UnknownStateReference { state }) if state == "\"B"
        ));
    }

    #[test]
    fn missing_files_are_io_failures() {
        let res = read_file(Kind::Mealy, "/this/file/does/not/exist.csv");
        assert!(matches!(res, Err(ModelError::Io { .. })));
    }
}
