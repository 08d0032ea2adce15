//! Declarative type descriptions driving the data codec.
//!
//! A [`TypeSchema`] describes the shape of a value exchanged with an on-chain
//! program: a primitive, a collection, an option, a struct, or a tagged enum.
//! Schemas are plain data. They are built once, never mutated, and stored
//! verbatim in cache records.

#![warn(missing_docs)]

pub mod primitive;
pub mod schema;

pub use primitive::Primitive;
pub use schema::{FieldSchema, SchemaError, TypeSchema, VariantSchema};
