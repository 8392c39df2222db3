//! CLI command implementations

pub mod launch;

pub use launch::execute as launch;
