//! Collection of interned-string (qstr) identifiers referenced by the output

use regex::Regex;

use crate::types::FxIndexSet;

/// Prefix MicroPython uses for interned-string identifiers
pub const DEFAULT_SYMBOL_PREFIX: &str = "MP_QSTR_";

/// Names the runtime always interns; they must not be redeclared.
pub const BUILTIN_SYMBOLS: &[&str] = &["__name__"];

#[derive(Debug)]
pub struct SymbolPool {
    prefix: String,
    pattern: Regex,
    excluded: Vec<String>,
    seen: FxIndexSet<String>,
}

impl SymbolPool {
    pub fn new(prefix: &str) -> Self {
        let pattern = Regex::new(&format!("{}[_a-zA-Z0-9]+", regex::escape(prefix)))
            .expect("escaped prefix is a valid pattern");
        Self {
            prefix: prefix.to_owned(),
            pattern,
            excluded: BUILTIN_SYMBOLS.iter().map(|s| (*s).to_owned()).collect(),
            seen: FxIndexSet::default(),
        }
    }

    /// Also drop `name` from the finalized table.
    #[must_use]
    pub fn excluding(mut self, name: impl Into<String>) -> Self {
        self.excluded.push(name.into());
        self
    }

    /// Record every prefixed token found in `line`.
    pub fn scan(&mut self, line: &str) {
        for token in self.pattern.find_iter(line) {
            let name = &token.as_str()[self.prefix.len()..];
            if !self.seen.contains(name) {
                self.seen.insert(name.to_owned());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Sorted, deduplicated names without their prefix
    pub fn finalize(self) -> Vec<String> {
        let mut names: Vec<String> = self
            .seen
            .into_iter()
            .filter(|name| !self.excluded.contains(name))
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for SymbolPool {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOL_PREFIX)
    }
}

/// Render the `qstrdefs.h` body for `names` inside the `enable_flag` guard.
pub fn render_symbol_table(names: &[String], enable_flag: &str) -> String {
    let mut table = format!("#if {enable_flag}\n");
    for name in names {
        table.push_str("Q(");
        table.push_str(name);
        table.push_str(")\n");
    }
    table.push_str("#endif\n");
    table
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_finalize_sorts_dedups_and_excludes() {
        let mut pool = SymbolPool::default();
        pool.scan("    { MP_ROM_QSTR(MP_QSTR_foo), MP_ROM_PTR(&x_obj) },");
        pool.scan("    { MP_ROM_QSTR(MP_QSTR_bar), MP_ROM_PTR(&y_obj) },");
        pool.scan("    { MP_ROM_QSTR(MP_QSTR_foo), MP_ROM_PTR(&z_obj) },");
        pool.scan("    { MP_ROM_QSTR(MP_QSTR___name__), MP_ROM_QSTR(MP_QSTR_mod) },");
        let pool = pool.excluding("mod");
        assert_eq!(pool.finalize(), vec!["bar".to_owned(), "foo".to_owned()]);
    }

    #[test]
    fn test_scan_ignores_unprefixed_identifiers() {
        let mut pool = SymbolPool::default();
        pool.scan("STATIC mp_obj_t example_func(void) {");
        assert!(pool.is_empty());
        pool.scan(".name = MP_QSTR_Class,");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_custom_prefix() {
        let mut pool = SymbolPool::new("NAME_");
        pool.scan("NAME_foo NAME_bar NAME_foo MP_QSTR_other");
        assert_eq!(pool.finalize(), vec!["bar".to_owned(), "foo".to_owned()]);
    }

    #[test]
    fn test_render_symbol_table() {
        let table = render_symbol_table(
            &["a".to_owned(), "b".to_owned()],
            "MODULE_EXAMPLE_ENABLED",
        );
        insta::assert_snapshot!(table, @r"
        #if MODULE_EXAMPLE_ENABLED
        Q(a)
        Q(b)
        #endif
        ");
    }
}
