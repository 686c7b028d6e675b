use crate::parser::SourceSelection;
use crate::transpiler::types::UnsupportedTypePolicy;

pub const DEFAULT_RUNTIME_PATH: &str = "./typechain-runtime";

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Display name the contract class and its types are derived from.
    pub module_name: String,
    /// Import path of the runtime shim, relative to the generated module.
    pub runtime_path: String,
    pub selection: SourceSelection,
    pub type_policy: UnsupportedTypePolicy,
}

impl GenerateOptions {
    pub fn new(module_name: impl Into<String>) -> Self {
        GenerateOptions {
            module_name: module_name.into(),
            ..Default::default()
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            module_name: "Contract".to_string(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            selection: SourceSelection::default(),
            type_policy: UnsupportedTypePolicy::default(),
        }
    }
}
