// Library half of the `extmodgen` binary; the CLI in main.rs drives it.

pub mod code_generator;
pub mod comment;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod frontend;
pub mod literal;
pub mod signature;
pub mod symbol_pool;
pub mod types;
pub mod writer;
