//! Shared type definitions for the extmodgen crate
//!
//! This module contains common types that are used across the front-end, the
//! code generator and the writer, avoiding circular dependencies between them.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// How the generated C module is hooked into a MicroPython build
///
/// An external (user C) module carries its own enable flag and registers
/// itself; a core-port module is compiled into the port and guarded by the
/// port's `MICROPY_PY_*` configuration switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModuleFlavor {
    /// User C module built through `USER_C_MODULES`
    #[default]
    External,

    /// Module compiled as part of a port (`modfoo.c`)
    CorePort,
}

impl ModuleFlavor {
    /// Check if this is an external user C module
    pub fn is_external(&self) -> bool {
        matches!(self, ModuleFlavor::External)
    }

    /// Preprocessor symbol that enables the module
    pub fn enable_flag(&self, module_upper: &str) -> String {
        match self {
            ModuleFlavor::External => format!("MODULE_{module_upper}_ENABLED"),
            ModuleFlavor::CorePort => format!("MICROPY_PY_{module_upper}"),
        }
    }

    /// File name of the generated C source
    pub fn source_file_name(&self, module: &str) -> String {
        match self {
            ModuleFlavor::External => format!("{module}.c"),
            ModuleFlavor::CorePort => format!("mod{module}.c"),
        }
    }
}

impl std::fmt::Display for ModuleFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleFlavor::External => write!(f, "external"),
            ModuleFlavor::CorePort => write!(f, "core-port"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_flag_per_flavor() {
        assert_eq!(
            ModuleFlavor::External.enable_flag("EXAMPLE"),
            "MODULE_EXAMPLE_ENABLED"
        );
        assert_eq!(
            ModuleFlavor::CorePort.enable_flag("EXAMPLE"),
            "MICROPY_PY_EXAMPLE"
        );
    }

    #[test]
    fn test_source_file_name_per_flavor() {
        assert_eq!(ModuleFlavor::External.source_file_name("foo"), "foo.c");
        assert_eq!(ModuleFlavor::CorePort.source_file_name("foo"), "modfoo.c");
    }
}
