//! Standard library tools for readlisp

pub mod comparison;
pub mod conditions;
pub mod hash_tables;
pub mod numeric;
pub mod reader_printer;
pub mod sequences;
pub mod strings;
pub mod symbols;
pub mod type_predicates;

use crate::reader::ReaderConfig;
use crate::tools::ToolRegistry;

/// Register all standard library tools
pub fn register_all(registry: &mut ToolRegistry, config: ReaderConfig) {
    numeric::register(registry);
    comparison::register(registry);
    sequences::register(registry);
    type_predicates::register(registry);
    symbols::register(registry);
    hash_tables::register(registry);
    strings::register(registry);
    conditions::register(registry);
    reader_printer::register(registry, config);
}
