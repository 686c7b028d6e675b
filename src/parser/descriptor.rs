use pest::error::{Error, ErrorVariant};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/abi_type.pest"]
pub struct TypeDescriptorParser;

/// A type descriptor split into its base name and array dimensions,
/// innermost dimension first. `None` marks a dynamic-length dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub base: String,
    pub dimensions: Vec<Option<usize>>,
}

pub fn parse_descriptor(descriptor: &str) -> Result<TypeDescriptor, Box<Error<Rule>>> {
    let mut pairs = TypeDescriptorParser::parse(Rule::descriptor, descriptor)?;

    let mut parsed = TypeDescriptor {
        base: String::new(),
        dimensions: Vec::new(),
    };

    if let Some(root) = pairs.next() {
        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::base => {
                    parsed.base = pair.as_str().to_string();
                }
                Rule::dimension => {
                    let span = pair.as_span();
                    let length = match pair.into_inner().next() {
                        Some(length) => Some(length.as_str().parse::<usize>().map_err(|_| {
                            Error::new_from_span(
                                ErrorVariant::CustomError {
                                    message: "array length out of range".to_string(),
                                },
                                span,
                            )
                        })?),
                        None => None,
                    };
                    parsed.dimensions.push(length);
                }
                _ => {}
            }
        }
    }

    Ok(parsed)
}
