//! Schema declarations in YAML or TOML

mod parser;

pub use parser::*;
