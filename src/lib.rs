//! Resolve a program's declared types into a closed JSON-schema vocabulary.
pub mod client_name;
pub mod config;
pub mod decl;
pub mod emit;
pub mod error;
pub mod ir;
pub mod load;
pub mod resolve;

#[cfg(test)]
mod test_utils;
