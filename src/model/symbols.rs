use crate::math::Bijection;

/// Interned handle of an output symbol. Two handles obtained from the same
/// [`OutputSymbols`] are equal if and only if the underlying strings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Output(u32);

/// Interner for output symbols, associates every distinct output string with a unique [`Output`].
#[derive(Debug, Clone, Default)]
pub struct OutputSymbols(Bijection<Output, String>);

impl OutputSymbols {
    /// Returns the handle for `name`, allocating a new one if `name` has not been seen before.
    pub fn intern(&mut self, name: &str) -> Output {
        if let Some(output) = self.0.get_by_right(name) {
            return *output;
        }
        let output = Output(self.0.len() as u32);
        self.0.insert(output, name.to_string());
        output
    }

    /// Gives back the string for a handle. Panics if the handle was produced by a different
    /// interner.
    pub fn resolve(&self, output: Output) -> &str {
        self.0
            .get_by_left(&output)
            .expect("output handle does not belong to this interner")
    }

    /// Looks up the handle of `name` without interning it.
    pub fn find(&self, name: &str) -> Option<Output> {
        self.0.get_by_right(name).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
