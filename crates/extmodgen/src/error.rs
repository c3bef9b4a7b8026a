//! Error taxonomy of the generator core
//!
//! Every variant here aborts the whole emission run. A pre-existing output
//! file is not an error; see [`crate::writer::WriteOutcome`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The argument shape does not map to any calling convention
    #[error("unsupported signature for `{function}`: {reason}")]
    UnsupportedSignature { function: String, reason: String },

    /// A constant value has a kind outside none/bool/int/float/str/tuple
    #[error("unsupported literal type `{kind}` in constant `{name}`")]
    UnsupportedLiteralType { name: String, kind: String },

    /// Comment reflowing was attempted on text without non-blank content
    #[error("documentation text is empty")]
    EmptyDocumentation,

    /// The Python source could not be parsed
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;
