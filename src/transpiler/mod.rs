pub mod ast;
pub mod converter;
pub mod naming;
pub mod types;

use crate::error::Result;
use ast::AbiEntry;
use types::UnsupportedTypePolicy;

pub fn convert(
    entries: Vec<AbiEntry>,
    policy: UnsupportedTypePolicy,
) -> Result<converter::ContractModel> {
    converter::convert_abi(entries, policy)
}
