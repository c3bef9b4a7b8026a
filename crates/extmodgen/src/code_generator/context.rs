use crate::{symbol_pool::SymbolPool, types::ModuleFlavor};

/// Accumulated output of one emission run
///
/// Every line goes through [`EmitContext::push`], which also feeds the symbol
/// pool, so the symbol table always matches the emitted source.
#[derive(Debug)]
pub(crate) struct EmitContext<'a> {
    pub(crate) module: &'a str,
    pub(crate) module_upper: String,
    pub(crate) flavor: ModuleFlavor,
    lines: Vec<String>,
    symbols: SymbolPool,
}

impl<'a> EmitContext<'a> {
    pub(crate) fn new(module: &'a str, flavor: ModuleFlavor, symbols: SymbolPool) -> Self {
        Self {
            module,
            module_upper: module.to_uppercase(),
            flavor,
            lines: Vec::new(),
            symbols,
        }
    }

    /// Append one output entry; it may span several physical lines.
    pub(crate) fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.symbols.scan(&line);
        self.lines.push(line);
    }

    pub(crate) fn blank(&mut self) {
        self.push(String::new());
    }

    /// Append a blank line unless the previous entry already is one.
    pub(crate) fn ensure_blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.blank();
        }
    }

    /// `{module}_{suffix}`
    pub(crate) fn scoped(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.module)
    }

    pub(crate) fn enable_flag(&self) -> String {
        self.flavor.enable_flag(&self.module_upper)
    }

    #[cfg(test)]
    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn finish(self) -> (Vec<String>, Vec<String>) {
        (self.lines, self.symbols.finalize())
    }
}
