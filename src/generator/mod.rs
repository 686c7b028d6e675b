use crate::config::GenerateOptions;
use crate::error::Result;
use crate::transpiler::ast::Mutability;
use crate::transpiler::converter::{
    ContractEvent, ContractFunction, ContractModel, Overload, OverloadGroup, ResolvedParam,
};
use crate::transpiler::naming::{
    member_ident, property_name, string_literal, type_ident, Scope, RUNTIME_MEMBERS,
};
use crate::transpiler::types::{is_named_record, render_record};
use tracing::debug;

const RUNTIME_IMPORTS: &[&str] = &[
    "BigNumberish",
    "PayableTxOptions",
    "SignerOrProvider",
    "TransactionHandle",
    "TxOptions",
    "TypeChainContract",
    "TypedEventFilter",
];

/// Type names and accessor stem generated for one event member.
struct EventPlan<'a> {
    event: &'a ContractEvent,
    stem: String,
    log_type: String,
    filter_type: String,
    /// Filter key per input, `None` for non-indexed inputs.
    filter_keys: Vec<Option<String>>,
}

pub fn generate(model: &ContractModel, options: &GenerateOptions) -> Result<String> {
    let mut output = String::new();
    write_preamble(&mut output, &options.runtime_path);

    if model.abi.is_empty() {
        debug!("empty ABI, emitting preamble only");
        return Ok(output);
    }

    let mut reserved = vec!["BigNumber", "Promise"];
    reserved.extend_from_slice(RUNTIME_IMPORTS);
    let mut types = Scope::with_reserved(&reserved);
    let contract = types.claim(type_ident(&options.module_name, "Contract"));

    output.push_str(&generate_deploy_types(model, &contract, &mut types));

    let events = plan_events(model, &contract, &mut types);
    for plan in &events {
        output.push_str(&generate_event_types(plan));
    }

    output.push_str(&generate_class(model, &contract, &events)?);
    Ok(output)
}

fn write_preamble(output: &mut String, runtime_path: &str) {
    output.push_str("/* Generated by abi2ts. Do not edit. */\n");
    output.push_str("/* tslint:disable */\n");
    output.push_str("/* eslint-disable */\n");
    output.push_str("import { BigNumber } from \"bignumber.js\";\n");
    output.push_str("import {\n");
    for symbol in RUNTIME_IMPORTS {
        output.push_str(&format!("  {symbol},\n"));
    }
    output.push_str(&format!("}} from {};\n\n", string_literal(runtime_path)));
}

fn generate_deploy_types(model: &ContractModel, contract: &str, types: &mut Scope) -> String {
    let args_type = types.claim(format!("{contract}DeployArgs"));
    let options_type_name = types.claim(format!("{contract}DeployOptions"));

    let (inputs, mutability) = match &model.constructor {
        Some(constructor) => (constructor.inputs.as_slice(), constructor.mutability),
        None => (&[][..], Mutability::Nonpayable),
    };

    let mut output = String::new();
    if model.implicit_constructor {
        output.push_str("// No constructor declared: deployment takes no arguments.\n");
    }

    let mut scope = Scope::new();
    let labeled: Vec<String> = param_names(inputs, &mut scope)
        .iter()
        .zip(inputs)
        .map(|(name, param)| format!("{}: {}", name, param.ty.input_expression))
        .collect();

    output.push_str(&format!(
        "export type {} = [{}];\n",
        args_type,
        labeled.join(", ")
    ));
    output.push_str(&format!(
        "export type {} = {};\n\n",
        options_type_name,
        options_type(mutability)
    ));
    output
}

fn plan_events<'a>(model: &'a ContractModel, contract: &str, types: &mut Scope) -> Vec<EventPlan<'a>> {
    let mut plans = Vec::new();

    for group in &model.events {
        for event in &group.members {
            let stem = format!(
                "{}{}",
                type_ident(&event.name, "Event"),
                overload_suffix(group, event)
            );
            let log_type = types.claim(format!("{contract}{stem}Event"));
            let filter_type = types.claim(format!("{contract}{stem}Filter"));

            let mut scope = Scope::new();
            let names = param_names(&event.inputs, &mut scope);
            let filter_keys = names
                .into_iter()
                .zip(&event.inputs)
                .map(|(name, param)| param.indexed.then_some(name))
                .collect();

            plans.push(EventPlan {
                event,
                stem,
                log_type,
                filter_type,
                filter_keys,
            });
        }
    }

    plans
}

fn generate_event_types(plan: &EventPlan) -> String {
    let event = plan.event;
    let mut output = format!("/** {} */\n", doc_text(&event.signature));

    let named = is_named_record(event.inputs.iter().map(|param| param.name.as_str()));
    if named {
        output.push_str(&format!("export interface {} {{\n", plan.log_type));
        for param in &event.inputs {
            output.push_str(&format!(
                "  {}: {};\n",
                property_name(&param.name),
                log_field_type(param)
            ));
        }
        output.push_str("}\n\n");
    } else {
        let fields: Vec<String> = event.inputs.iter().map(log_field_type).collect();
        output.push_str(&format!(
            "export type {} = [{}];\n\n",
            plan.log_type,
            fields.join(", ")
        ));
    }

    let indexed: Vec<(&String, &ResolvedParam)> = plan
        .filter_keys
        .iter()
        .zip(&event.inputs)
        .filter_map(|(key, param)| key.as_ref().map(|key| (key, param)))
        .collect();

    if indexed.is_empty() {
        output.push_str(&format!("export interface {} {{}}\n\n", plan.filter_type));
    } else {
        output.push_str(&format!("export interface {} {{\n", plan.filter_type));
        for (key, param) in indexed {
            output.push_str(&format!("  {}?: {} | null;\n", key, filter_field_type(param)));
        }
        output.push_str("}\n\n");
    }

    output
}

fn generate_class(model: &ContractModel, contract: &str, events: &[EventPlan]) -> Result<String> {
    let mut members = Scope::with_reserved(RUNTIME_MEMBERS);
    let mut blocks = Vec::new();

    blocks.push(format!(
        "  public static readonly ABI = {};\n",
        serde_json::to_string(&model.abi)?
    ));
    blocks.push(format!(
        concat!(
            "  constructor(address: string, signerOrProvider: SignerOrProvider) {{\n",
            "    super(address, signerOrProvider, {}.ABI);\n",
            "  }}\n"
        ),
        contract
    ));

    if let Some(fallback) = &model.fallback {
        let ident = members.claim("fallback".to_string());
        blocks.push(format!(
            concat!(
                "  /** fallback() {mutability} */\n",
                "  public {ident}(data: string, options?: {options}): Promise<TransactionHandle> {{\n",
                "    return this.sendRawTransaction(data, options);\n",
                "  }}\n"
            ),
            mutability = fallback.mutability,
            ident = ident,
            options = options_type(fallback.mutability)
        ));
    }

    if model.receive.is_some() {
        let ident = members.claim("receive".to_string());
        blocks.push(format!(
            concat!(
                "  /** receive() payable */\n",
                "  public {}(options?: PayableTxOptions): Promise<TransactionHandle> {{\n",
                "    return this.sendRawTransaction(\"0x\", options);\n",
                "  }}\n"
            ),
            ident
        ));
    }

    for group in &model.functions {
        for function in &group.members {
            blocks.push(generate_function(function, &overload_suffix(group, function), &mut members));
        }
    }

    for plan in events {
        blocks.push(generate_event_filter(plan, &mut members));
    }

    let mut output = format!("export class {} extends TypeChainContract {{\n", contract);
    output.push_str(&blocks.join("\n"));
    output.push_str("}\n");
    Ok(output)
}

fn generate_function(function: &ContractFunction, suffix: &str, members: &mut Scope) -> String {
    let base = member_ident(&function.name, "method");

    let mut scope = Scope::with_reserved(&["options"]);
    let names = param_names(&function.inputs, &mut scope);
    let mut params: Vec<String> = names
        .iter()
        .zip(&function.inputs)
        .map(|(name, param)| format!("{}: {}", name, param.ty.input_expression))
        .collect();
    let args = format!("[{}]", names.join(", "));
    let signature = string_literal(&function.signature);
    let returns = return_type(&function.outputs);

    let mut output = format!(
        "  /** {} {} */\n",
        doc_text(&function.signature),
        function.mutability
    );

    if function.mutability.is_read_only() {
        let ident = members.claim(format!("{base}{suffix}"));
        output.push_str(&format!(
            "  public {}({}): Promise<{}> {{\n",
            ident,
            params.join(", "),
            returns
        ));
        output.push_str(&format!("    return this.call({signature}, {args});\n"));
        output.push_str("  }\n");
        return output;
    }

    params.push(format!("options?: {}", options_type(function.mutability)));
    let params = params.join(", ");

    let ident = members.claim(format!("{base}{suffix}"));
    output.push_str(&format!(
        "  public {ident}({params}): Promise<TransactionHandle> {{\n"
    ));
    output.push_str(&format!(
        "    return this.sendTransaction({signature}, {args}, options);\n"
    ));
    output.push_str("  }\n\n");

    let static_ident = members.claim(format!("{base}Static{suffix}"));
    output.push_str(&format!(
        "  public {static_ident}({params}): Promise<{returns}> {{\n"
    ));
    output.push_str(&format!(
        "    return this.staticCall({signature}, {args}, options);\n"
    ));
    output.push_str("  }\n");
    output
}

fn generate_event_filter(plan: &EventPlan, members: &mut Scope) -> String {
    let ident = members.claim(format!("filter{}", plan.stem));
    let topics: Vec<String> = plan
        .filter_keys
        .iter()
        .flatten()
        .map(|key| format!("filter.{key}"))
        .collect();
    let signature = if plan.event.anonymous {
        "null".to_string()
    } else {
        string_literal(&plan.event.signature)
    };

    let mut output = format!("  /** {} */\n", doc_text(&plan.event.signature));
    output.push_str(&format!(
        "  public {}(filter: {} = {{}}): TypedEventFilter<{}> {{\n",
        ident, plan.filter_type, plan.log_type
    ));
    output.push_str(&format!(
        "    return this.eventFilter({}, [{}]);\n",
        signature,
        topics.join(", ")
    ));
    output.push_str("  }\n");
    output
}

/// Empty for a plain member; for an overloaded one `_` followed by the input
/// types' signature tokens.
fn overload_suffix<T: Overload>(group: &OverloadGroup<T>, member: &T) -> String {
    if !group.is_overloaded() {
        return String::new();
    }
    let tokens: Vec<String> = member
        .inputs()
        .iter()
        .map(|param| param.ty.ty.signature_token())
        .collect();
    format!("_{}", tokens.join("_"))
}

fn param_names(params: &[ResolvedParam], scope: &mut Scope) -> Vec<String> {
    params
        .iter()
        .enumerate()
        .map(|(index, param)| scope.claim(member_ident(&param.name, &format!("arg{index}"))))
        .collect()
}

fn return_type(outputs: &[ResolvedParam]) -> String {
    match outputs {
        [] => "void".to_string(),
        [single] => single.ty.expression.clone(),
        _ => {
            let fields: Vec<(&str, String)> = outputs
                .iter()
                .map(|param| (param.name.as_str(), param.ty.expression.clone()))
                .collect();
            render_record(&fields)
        }
    }
}

/// ABI text placed inside a block comment; `*/` must not end it early.
fn doc_text(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn options_type(mutability: Mutability) -> &'static str {
    match mutability {
        Mutability::Payable => "PayableTxOptions",
        _ => "TxOptions",
    }
}

fn log_field_type(param: &ResolvedParam) -> String {
    if param.indexed && param.ty.kind.is_hashed_topic() {
        "string".to_string()
    } else {
        param.ty.expression.clone()
    }
}

fn filter_field_type(param: &ResolvedParam) -> String {
    if param.ty.kind.is_hashed_topic() {
        "string".to_string()
    } else {
        param.ty.input_expression.clone()
    }
}
