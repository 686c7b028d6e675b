pub mod descriptor;

use crate::error::{AbiError, Result};
use crate::transpiler::ast::AbiEntry;
use serde_json::{Map, Value};
use tracing::debug;

/// How a multi-contract document is narrowed down to one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceSelection {
    /// Take the first contract in document order.
    #[default]
    First,
    /// Require a single contract; several contracts are accepted only when
    /// their entries are identical.
    Single,
    /// Take the contract stored under this key. `path/File.sol:Name` keys
    /// also match on `Name`.
    Named(String),
}

pub fn extract(source: &str) -> Result<Vec<AbiEntry>> {
    extract_with(source, &SourceSelection::First)
}

/// Pulls the ABI entries out of a bare array, an `{ "abi": [...] }` artifact
/// or a combined output document keyed by contract.
pub fn extract_with(source: &str, selection: &SourceSelection) -> Result<Vec<AbiEntry>> {
    let document: Value = serde_json::from_str(source)?;

    match document {
        Value::Array(items) => parse_entries(items),
        Value::Object(mut map) => {
            if let Some(abi) = map.remove("abi") {
                return parse_entries(abi_items(abi)?);
            }
            if matches!(map.get("contracts"), Some(Value::Object(_))) {
                if let Some(Value::Object(contracts)) = map.remove("contracts") {
                    map = contracts;
                }
            }
            extract_combined(map, selection)
        }
        _ => Err(AbiError::MalformedInput(
            "expected a JSON array or object".to_string(),
        )),
    }
}

fn extract_combined(map: Map<String, Value>, selection: &SourceSelection) -> Result<Vec<AbiEntry>> {
    let mut contracts = Vec::new();
    for (name, value) in map {
        if let Value::Object(mut contract) = value {
            if let Some(abi) = contract.remove("abi") {
                contracts.push((name, abi));
            }
        }
    }

    if contracts.is_empty() {
        return Err(AbiError::MalformedInput(
            "document contains no `abi` array".to_string(),
        ));
    }
    debug!(count = contracts.len(), "found combined output document");

    let names: Vec<String> = contracts.iter().map(|(name, _)| name.clone()).collect();

    match selection {
        SourceSelection::First => {
            let (name, abi) = contracts.swap_remove(0);
            debug!(contract = %name, "selected first contract");
            parse_entries(abi_items(abi)?)
        }
        SourceSelection::Named(wanted) => {
            let position = contracts.iter().position(|(name, _)| {
                name == wanted || name.rsplit_once(':').map(|(_, short)| short) == Some(wanted.as_str())
            });
            match position {
                Some(index) => {
                    let (_, abi) = contracts.swap_remove(index);
                    parse_entries(abi_items(abi)?)
                }
                None => Err(AbiError::AmbiguousSource {
                    reason: format!("no contract named `{wanted}`"),
                    contracts: names,
                }),
            }
        }
        SourceSelection::Single => {
            let mut parsed = Vec::with_capacity(contracts.len());
            for (_, abi) in contracts {
                parsed.push(parse_entries(abi_items(abi)?)?);
            }
            let first = parsed.swap_remove(0);
            if parsed.iter().any(|entries| *entries != first) {
                return Err(AbiError::AmbiguousSource {
                    reason: "contracts have differing entries".to_string(),
                    contracts: names,
                });
            }
            Ok(first)
        }
    }
}

fn abi_items(abi: Value) -> Result<Vec<Value>> {
    match abi {
        Value::Array(items) => Ok(items),
        // Older solc combined output stores the ABI as an encoded string.
        Value::String(encoded) => match serde_json::from_str::<Value>(&encoded)? {
            Value::Array(items) => Ok(items),
            _ => Err(AbiError::MalformedInput(
                "`abi` string does not hold an array".to_string(),
            )),
        },
        _ => Err(AbiError::MalformedInput(
            "`abi` field is not an array".to_string(),
        )),
    }
}

fn parse_entries(items: Vec<Value>) -> Result<Vec<AbiEntry>> {
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        if item.get("type").and_then(Value::as_str) == Some("error") {
            debug!(index, "skipping custom error entry");
            continue;
        }
        let entry: AbiEntry = serde_json::from_value(item)
            .map_err(|e| AbiError::MalformedInput(format!("entry {index}: {e}")))?;
        entries.push(entry);
    }

    debug!(count = entries.len(), "extracted ABI entries");
    Ok(entries)
}
