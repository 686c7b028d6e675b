use super::ast::*;
use super::types::{self, ResolvedType, UnsupportedTypePolicy};
use crate::error::{AbiError, Result};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    pub name: String,
    pub ty: ResolvedType,
    pub indexed: bool,
}

#[derive(Debug, Clone)]
pub struct ContractConstructor {
    pub inputs: Vec<ResolvedParam>,
    pub mutability: Mutability,
}

#[derive(Debug, Clone)]
pub struct ContractFunction {
    pub name: String,
    pub signature: String,
    pub inputs: Vec<ResolvedParam>,
    pub outputs: Vec<ResolvedParam>,
    pub mutability: Mutability,
}

#[derive(Debug, Clone)]
pub struct ContractEvent {
    pub name: String,
    pub signature: String,
    pub inputs: Vec<ResolvedParam>,
    pub anonymous: bool,
}

/// A fallback or receive entry.
#[derive(Debug, Clone, Copy)]
pub struct SpecialMember {
    pub mutability: Mutability,
}

/// A member that can share its name with others of the same kind.
pub trait Overload {
    const KIND: EntryKind;

    fn name(&self) -> &str;
    fn signature(&self) -> &str;
    fn inputs(&self) -> &[ResolvedParam];
}

impl Overload for ContractFunction {
    const KIND: EntryKind = EntryKind::Function;

    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &str {
        &self.signature
    }

    fn inputs(&self) -> &[ResolvedParam] {
        &self.inputs
    }
}

impl Overload for ContractEvent {
    const KIND: EntryKind = EntryKind::Event;

    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &str {
        &self.signature
    }

    fn inputs(&self) -> &[ResolvedParam] {
        &self.inputs
    }
}

/// Same-named members in declaration order. Signatures within a group are unique.
#[derive(Debug, Clone)]
pub struct OverloadGroup<T> {
    pub name: String,
    pub members: Vec<T>,
}

impl<T: Overload> OverloadGroup<T> {
    pub fn is_overloaded(&self) -> bool {
        self.members.len() > 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractModel {
    pub constructor: Option<ContractConstructor>,
    /// No constructor entry was declared; a no-argument one is implied.
    pub implicit_constructor: bool,
    pub functions: Vec<OverloadGroup<ContractFunction>>,
    pub events: Vec<OverloadGroup<ContractEvent>>,
    pub fallback: Option<SpecialMember>,
    pub receive: Option<SpecialMember>,
    /// The entries the model was built from, in input order.
    pub abi: Vec<AbiEntry>,
}

/// Effective mutability of a function, constructor or fallback entry.
pub fn classify_mutability(entry: &AbiEntry) -> Mutability {
    match entry.state_mutability {
        Some(mutability) => mutability,
        None => legacy_mutability(entry),
    }
}

// ABIs from before `stateMutability` existed only carry `constant` and
// `payable` flags.
fn legacy_mutability(entry: &AbiEntry) -> Mutability {
    if entry.constant == Some(true) {
        Mutability::View
    } else if entry.payable == Some(true) {
        Mutability::Payable
    } else {
        Mutability::Nonpayable
    }
}

pub fn convert_abi(entries: Vec<AbiEntry>, policy: UnsupportedTypePolicy) -> Result<ContractModel> {
    let mut model = ContractModel::default();
    let mut function_index = HashMap::new();
    let mut event_index = HashMap::new();

    for entry in &entries {
        match entry.kind {
            EntryKind::Constructor => {
                if model.constructor.is_some() {
                    return Err(AbiError::DuplicateSpecialMember { kind: entry.kind });
                }
                model.constructor = Some(ContractConstructor {
                    inputs: resolve_params(&entry.inputs, entry, policy)?,
                    mutability: classify_mutability(entry),
                });
            }
            EntryKind::Fallback => set_special(&mut model.fallback, entry)?,
            EntryKind::Receive => set_special(&mut model.receive, entry)?,
            EntryKind::Function => {
                let inputs = resolve_params(&entry.inputs, entry, policy)?;
                let name = required_name(entry)?;
                let function = ContractFunction {
                    signature: signature(&name, &inputs),
                    name,
                    inputs,
                    outputs: resolve_params(&entry.outputs, entry, policy)?,
                    mutability: classify_mutability(entry),
                };
                push_overload(&mut model.functions, &mut function_index, function)?;
            }
            EntryKind::Event => {
                let inputs = resolve_params(&entry.inputs, entry, policy)?;
                let name = required_name(entry)?;
                let event = ContractEvent {
                    signature: signature(&name, &inputs),
                    name,
                    inputs,
                    anonymous: entry.anonymous,
                };
                push_overload(&mut model.events, &mut event_index, event)?;
            }
        }
    }

    model.implicit_constructor = model.constructor.is_none();
    model.abi = entries;

    debug!(
        functions = model.functions.len(),
        events = model.events.len(),
        implicit_constructor = model.implicit_constructor,
        "classified ABI entries"
    );
    Ok(model)
}

fn resolve_params(
    params: &[Parameter],
    entry: &AbiEntry,
    policy: UnsupportedTypePolicy,
) -> Result<Vec<ResolvedParam>> {
    params
        .iter()
        .map(|param| {
            Ok(ResolvedParam {
                name: param.name.clone(),
                ty: types::resolve(param, entry.display_name(), policy)?,
                indexed: param.indexed,
            })
        })
        .collect()
}

fn required_name(entry: &AbiEntry) -> Result<String> {
    match &entry.name {
        Some(name) if !name.is_empty() => Ok(name.clone()),
        _ => Err(AbiError::MalformedInput(format!(
            "{} entry without a name",
            entry.kind
        ))),
    }
}

fn set_special(slot: &mut Option<SpecialMember>, entry: &AbiEntry) -> Result<()> {
    if slot.is_some() {
        return Err(AbiError::DuplicateSpecialMember { kind: entry.kind });
    }
    *slot = Some(SpecialMember {
        mutability: classify_mutability(entry),
    });
    Ok(())
}

fn signature(name: &str, inputs: &[ResolvedParam]) -> String {
    let types: Vec<String> = inputs.iter().map(|param| param.ty.canonical()).collect();
    format!("{}({})", name, types.join(","))
}

fn push_overload<T: Overload>(
    groups: &mut Vec<OverloadGroup<T>>,
    index: &mut HashMap<String, usize>,
    member: T,
) -> Result<()> {
    match index.get(member.name()) {
        Some(&position) => {
            let group = &mut groups[position];
            if group.members.iter().any(|m| m.signature() == member.signature()) {
                return Err(AbiError::DuplicateSignature {
                    kind: T::KIND,
                    signature: member.signature().to_string(),
                });
            }
            debug!(signature = member.signature(), "adding overload");
            group.members.push(member);
        }
        None => {
            index.insert(member.name().to_string(), groups.len());
            groups.push(OverloadGroup {
                name: member.name().to_string(),
                members: vec![member],
            });
        }
    }
    Ok(())
}
