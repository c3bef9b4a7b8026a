//! Writing the generated artifacts to disk

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::code_generator::GeneratedModule;

/// File name of the interned-string table
pub const SYMBOL_TABLE_FILE_NAME: &str = "qstrdefs.h";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { source: PathBuf, symbols: PathBuf },
    /// An artifact already exists and overwriting was not requested
    Preexisting(PathBuf),
}

/// Write the C source and the symbol table of `module` into `dir`.
///
/// Nothing is written if either file exists, unless `force` is set.
pub fn write_artifacts(module: &GeneratedModule, dir: &Path, force: bool) -> Result<WriteOutcome> {
    let source = dir.join(module.source_file_name());
    let symbols = dir.join(SYMBOL_TABLE_FILE_NAME);

    if !force && let Some(existing) = [&source, &symbols].into_iter().find(|p| p.exists()) {
        warn!(
            "{} already exists, use --force-overwrite to replace it",
            existing.display()
        );
        return Ok(WriteOutcome::Preexisting(existing.clone()));
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    fs::write(&source, module.source_text())
        .with_context(|| format!("Failed to write {}", source.display()))?;
    fs::write(&symbols, module.symbol_table())
        .with_context(|| format!("Failed to write {}", symbols.display()))?;
    info!("Wrote {} and {}", source.display(), symbols.display());

    Ok(WriteOutcome::Written { source, symbols })
}
