//! gem-manifest - read and edit Ruby dependency manifests
//!
//! This crate reads `Gemfile` and `*.gemspec` files into structured
//! dependency declarations and rewrites single declarations in place
//! (pin, unpin, add) while leaving the rest of the file untouched.

pub mod config;
pub mod edit;
pub mod error;
pub mod file_types;
pub mod parsers;
pub mod tools;
pub mod validation;
