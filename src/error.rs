use thiserror::Error;

use crate::transpiler::ast::EntryKind;

/// Failures of the ABI to TypeScript pipeline. Every variant is terminal for
/// the document being processed.
#[derive(Debug, Error)]
pub enum AbiError {
    /// The input is not parseable JSON or has no recognizable ABI shape
    #[error("malformed ABI input: {0}")]
    MalformedInput(String),

    /// A multi-contract document without a single-contract selection
    #[error("ambiguous ABI source: {reason} (contracts: {})", .contracts.join(", "))]
    AmbiguousSource {
        reason: String,
        contracts: Vec<String>,
    },

    #[error("unsupported type `{descriptor}` in `{entry}`")]
    UnsupportedType { descriptor: String, entry: String },

    #[error("more than one {kind} entry")]
    DuplicateSpecialMember { kind: EntryKind },

    #[error("duplicate {kind} signature `{signature}`")]
    DuplicateSignature { kind: EntryKind, signature: String },
}

impl From<serde_json::Error> for AbiError {
    fn from(err: serde_json::Error) -> Self {
        AbiError::MalformedInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AbiError>;
