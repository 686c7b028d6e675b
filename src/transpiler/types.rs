use super::ast::Parameter;
use super::naming::property_name;
use crate::error::{AbiError, Result};
use crate::parser::descriptor::parse_descriptor;
use std::collections::HashSet;
use tracing::debug;

/// Integers up to this width fit in a JavaScript `number` without loss.
const MAX_NATIVE_INT_BITS: u16 = 48;

/// What to do with a type descriptor that has no TypeScript mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedTypePolicy {
    #[default]
    Reject,
    /// Render the offending type as `any`.
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    Bool,
    Address,
    String,
    Bytes,
    FixedBytes(u8),
    Uint(u16),
    Int(u16),
    /// A descriptor let through by [`UnsupportedTypePolicy::Any`].
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Scalar(ScalarType),
    Sequence { inner: Box<AbiType>, len: Option<usize> },
    Struct(Vec<StructField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: AbiType,
}

/// Runtime shape of a value, used to pick wrapper shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Bool,
    Address,
    String,
    Bytes,
    FixedBytes,
    Number,
    BigNumber,
    Opaque,
    Sequence,
    Struct,
}

impl RuntimeKind {
    /// Indexed event arguments of these kinds are stored as their keccak hash.
    pub fn is_hashed_topic(self) -> bool {
        matches!(
            self,
            RuntimeKind::String | RuntimeKind::Bytes | RuntimeKind::Sequence | RuntimeKind::Struct
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Output,
    Input,
}

/// A resolved parameter type: the TypeScript expressions for values coming out
/// of and going into the contract, plus the parsed type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub expression: String,
    pub input_expression: String,
    pub kind: RuntimeKind,
    pub ty: AbiType,
}

impl ResolvedType {
    pub fn new(ty: AbiType) -> Self {
        ResolvedType {
            expression: render(&ty, Form::Output),
            input_expression: render(&ty, Form::Input),
            kind: ty.kind(),
            ty,
        }
    }

    pub fn canonical(&self) -> String {
        self.ty.canonical()
    }
}

impl AbiType {
    pub fn kind(&self) -> RuntimeKind {
        match self {
            AbiType::Scalar(scalar) => match scalar {
                ScalarType::Bool => RuntimeKind::Bool,
                ScalarType::Address => RuntimeKind::Address,
                ScalarType::String => RuntimeKind::String,
                ScalarType::Bytes => RuntimeKind::Bytes,
                ScalarType::FixedBytes(_) => RuntimeKind::FixedBytes,
                ScalarType::Uint(bits) | ScalarType::Int(bits) => {
                    if *bits <= MAX_NATIVE_INT_BITS {
                        RuntimeKind::Number
                    } else {
                        RuntimeKind::BigNumber
                    }
                }
                ScalarType::Opaque(_) => RuntimeKind::Opaque,
            },
            AbiType::Sequence { .. } => RuntimeKind::Sequence,
            AbiType::Struct(_) => RuntimeKind::Struct,
        }
    }

    /// Canonical ABI spelling, as used in function and event signatures.
    pub fn canonical(&self) -> String {
        match self {
            AbiType::Scalar(scalar) => match scalar {
                ScalarType::Bool => "bool".to_string(),
                ScalarType::Address => "address".to_string(),
                ScalarType::String => "string".to_string(),
                ScalarType::Bytes => "bytes".to_string(),
                ScalarType::FixedBytes(size) => format!("bytes{size}"),
                ScalarType::Uint(bits) => format!("uint{bits}"),
                ScalarType::Int(bits) => format!("int{bits}"),
                ScalarType::Opaque(descriptor) => descriptor.clone(),
            },
            AbiType::Sequence { inner, len: None } => format!("{}[]", inner.canonical()),
            AbiType::Sequence {
                inner,
                len: Some(len),
            } => format!("{}[{len}]", inner.canonical()),
            AbiType::Struct(fields) => {
                let inner: Vec<String> = fields.iter().map(|f| f.ty.canonical()).collect();
                format!("({})", inner.join(","))
            }
        }
    }

    /// Identifier-safe encoding in prefix notation: array markers precede their
    /// element and tuples carry their arity, so distinct types never share a token.
    /// Opaque spellings are marked `opaque_` and escape every character other
    /// than an ASCII alphanumeric (and `Z` itself) as `Z` plus two hex digits.
    pub fn signature_token(&self) -> String {
        match self {
            AbiType::Scalar(ScalarType::Opaque(descriptor)) => {
                let mut token = "opaque_".to_string();
                for byte in descriptor.bytes() {
                    if byte.is_ascii_alphanumeric() && byte != b'Z' {
                        token.push(char::from(byte));
                    } else {
                        token.push_str(&format!("Z{byte:02X}"));
                    }
                }
                token
            }
            AbiType::Scalar(_) => self.canonical(),
            AbiType::Sequence { inner, len: None } => format!("array_{}", inner.signature_token()),
            AbiType::Sequence {
                inner,
                len: Some(len),
            } => format!("array{len}_{}", inner.signature_token()),
            AbiType::Struct(fields) => {
                let mut token = format!("tuple{}", fields.len());
                for field in fields {
                    token.push('_');
                    token.push_str(&field.ty.signature_token());
                }
                token
            }
        }
    }
}

/// Resolves one parameter of the entry named `entry`.
pub fn resolve(param: &Parameter, entry: &str, policy: UnsupportedTypePolicy) -> Result<ResolvedType> {
    let ty = resolve_type(&param.param_type, &param.components, entry, policy)?;
    Ok(ResolvedType::new(ty))
}

fn resolve_type(
    descriptor: &str,
    components: &[Parameter],
    entry: &str,
    policy: UnsupportedTypePolicy,
) -> Result<AbiType> {
    let parsed = match parse_descriptor(descriptor) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(descriptor, %err, "type descriptor did not parse");
            return unsupported(descriptor, descriptor, entry, policy);
        }
    };

    let mut ty = if parsed.base == "tuple" {
        if components.is_empty() {
            return Err(AbiError::MalformedInput(format!(
                "`{descriptor}` in `{entry}` has no components"
            )));
        }
        let mut fields = Vec::with_capacity(components.len());
        for component in components {
            fields.push(StructField {
                name: component.name.clone(),
                ty: resolve_type(&component.param_type, &component.components, entry, policy)?,
            });
        }
        AbiType::Struct(fields)
    } else {
        match elementary(&parsed.base) {
            Some(scalar) => AbiType::Scalar(scalar),
            None => unsupported(&parsed.base, descriptor, entry, policy)?,
        }
    };

    for len in parsed.dimensions {
        ty = AbiType::Sequence {
            inner: Box::new(ty),
            len,
        };
    }

    Ok(ty)
}

/// `base` is the part rendered as `any` under the lenient policy, `descriptor`
/// the full text reported on rejection.
fn unsupported(
    base: &str,
    descriptor: &str,
    entry: &str,
    policy: UnsupportedTypePolicy,
) -> Result<AbiType> {
    match policy {
        UnsupportedTypePolicy::Reject => Err(AbiError::UnsupportedType {
            descriptor: descriptor.to_string(),
            entry: entry.to_string(),
        }),
        UnsupportedTypePolicy::Any => {
            debug!(descriptor, entry, "rendering unsupported type as any");
            Ok(AbiType::Scalar(ScalarType::Opaque(base.to_string())))
        }
    }
}

fn elementary(base: &str) -> Option<ScalarType> {
    match base {
        "bool" => Some(ScalarType::Bool),
        "address" => Some(ScalarType::Address),
        "string" => Some(ScalarType::String),
        "bytes" => Some(ScalarType::Bytes),
        "uint" => Some(ScalarType::Uint(256)),
        "int" => Some(ScalarType::Int(256)),
        _ => {
            if let Some(bits) = base.strip_prefix("uint") {
                integer_width(bits).map(ScalarType::Uint)
            } else if let Some(bits) = base.strip_prefix("int") {
                integer_width(bits).map(ScalarType::Int)
            } else if let Some(size) = base.strip_prefix("bytes") {
                decimal::<u8>(size)
                    .filter(|size| (1..=32).contains(size))
                    .map(ScalarType::FixedBytes)
            } else {
                None
            }
        }
    }
}

fn integer_width(bits: &str) -> Option<u16> {
    decimal::<u16>(bits).filter(|bits| bits % 8 == 0 && (8..=256).contains(bits))
}

fn decimal<T: std::str::FromStr>(digits: &str) -> Option<T> {
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn render(ty: &AbiType, form: Form) -> String {
    match ty {
        AbiType::Scalar(scalar) => scalar_expression(scalar, form).to_string(),
        AbiType::Sequence { inner, .. } => format!("{}[]", render(inner, form)),
        AbiType::Struct(fields) => {
            let rendered: Vec<(&str, String)> = fields
                .iter()
                .map(|field| (field.name.as_str(), render(&field.ty, form)))
                .collect();
            render_record(&rendered)
        }
    }
}

fn scalar_expression(scalar: &ScalarType, form: Form) -> &'static str {
    match scalar {
        ScalarType::Bool => "boolean",
        ScalarType::Address | ScalarType::String | ScalarType::Bytes | ScalarType::FixedBytes(_) => {
            "string"
        }
        ScalarType::Uint(bits) | ScalarType::Int(bits) => {
            if *bits <= MAX_NATIVE_INT_BITS {
                "number"
            } else if form == Form::Input {
                "BigNumberish"
            } else {
                "BigNumber"
            }
        }
        ScalarType::Opaque(_) => "any",
    }
}

/// Whether a field list can be rendered as an object type: every field named,
/// no name repeated.
pub fn is_named_record<'a>(names: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    let mut any = false;
    for name in names {
        if name.is_empty() || !seen.insert(name) {
            return false;
        }
        any = true;
    }
    any
}

/// Renders `(name, expression)` pairs in declaration order: an object type when
/// the fields are a named record, a tuple type otherwise.
pub fn render_record(fields: &[(&str, String)]) -> String {
    if is_named_record(fields.iter().map(|(name, _)| *name)) {
        let body: Vec<String> = fields
            .iter()
            .map(|(name, expression)| format!("{}: {}", property_name(name), expression))
            .collect();
        format!("{{ {} }}", body.join("; "))
    } else {
        let body: Vec<&str> = fields.iter().map(|(_, expression)| expression.as_str()).collect();
        format!("[{}]", body.join(", "))
    }
}
