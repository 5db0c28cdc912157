//! Common types and utilities for swagger2proto
//!
//! This crate contains the error type and the proto3 intermediate
//! representation shared by the parser, generator, and CLI components.

mod proto;

pub use proto::*;

use thiserror::Error;

/// Errors that can occur during proto generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The source document could not be read or decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// A `$ref` string matched no known shape or no existing definition
    #[error("Unresolvable reference {reference:?} in {context}")]
    UnresolvedReference { reference: String, context: String },

    /// Two generated identifiers ended up identical after normalization
    #[error("Name collision in {scope}: {name:?} is generated more than once")]
    NameCollision { scope: String, name: String },

    #[error("Generation error: {0}")]
    Generation(String),
}

impl GeneratorError {
    pub fn unresolved(reference: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            context: context.into(),
        }
    }

    pub fn collision(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NameCollision {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;
