//! Identifier normalization for generated TypeScript.
//!
//! ABI names are case-normalized with `heck` and stripped to the characters
//! TypeScript allows in identifiers. A [`Scope`] hands out identifiers for one
//! namespace: a candidate that is a reserved word or already taken gets `_`
//! appended until it is free.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use std::collections::HashSet;

/// Strict-mode reserved words plus names that cannot bind a parameter or
/// class method.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "constructor", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in", "instanceof", "interface",
    "let", "new", "null", "package", "private", "protected", "public", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void",
    "while", "with", "yield",
];

/// Members every generated class inherits from the runtime shim.
pub const RUNTIME_MEMBERS: &[&str] = &[
    "ABI",
    "address",
    "signerOrProvider",
    "call",
    "staticCall",
    "sendTransaction",
    "sendRawTransaction",
    "eventFilter",
];

pub struct Scope {
    taken: HashSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::with_reserved(&[])
    }

    pub fn with_reserved(extra: &[&str]) -> Self {
        let taken = RESERVED_WORDS
            .iter()
            .chain(extra)
            .map(|word| word.to_string())
            .collect();
        Scope { taken }
    }

    pub fn claim(&mut self, candidate: String) -> String {
        let mut ident = candidate;
        while self.taken.contains(&ident) {
            ident.push('_');
        }
        self.taken.insert(ident.clone());
        ident
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// lowerCamelCase identifier for members and parameters, or `fallback`
/// when nothing usable is left.
pub fn member_ident(raw: &str, fallback: &str) -> String {
    non_empty(sanitize(&raw.to_lower_camel_case()), fallback)
}

/// UpperCamelCase identifier for classes and type aliases.
pub fn type_ident(raw: &str, fallback: &str) -> String {
    non_empty(sanitize(&raw.to_upper_camel_case()), fallback)
}

fn non_empty(ident: String, fallback: &str) -> String {
    if ident.is_empty() {
        fallback.to_string()
    } else {
        ident
    }
}

fn sanitize(raw: &str) -> String {
    let ident: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Object property key for a raw ABI name, quoted when it is not a plain
/// identifier.
pub fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

pub fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
