//! Generates typed TypeScript contract wrappers from ABI documents.
//!
//! The pipeline is a single forward pass: [`parser`] extracts ABI entries,
//! [`transpiler`] resolves their types and groups overloads, and [`generator`]
//! writes the TypeScript module.

pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod transpiler;


pub use config::GenerateOptions;
pub use error::{AbiError, Result};

/// Runs the whole pipeline over one ABI document.
pub fn generate_typings(source: &str, options: &GenerateOptions) -> Result<String> {
    let entries = parser::extract_with(source, &options.selection)?;
    let model = transpiler::convert(entries, options.type_policy)?;
    generator::generate(&model, options)
}
