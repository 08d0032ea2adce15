//! Schema-driven conversion between host values and canonical data.
//!
//! [`encode`] turns a permissive host [`Value`] into canonical [`Data`] as
//! described by a [`TypeSchema`]; [`decode`] does the reverse and rejects any
//! structural deviation. For every canonical `data` accepted by `decode`,
//! `encode(schema, decode(schema, data)) == data`.
//!
//! [`Data`]: plinth_common::Data
//! [`TypeSchema`]: plinth_schema::TypeSchema

#![warn(missing_docs)]

pub mod address;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod option;
mod primitive;
pub mod real;
mod shape;
pub mod value;

pub use address::{Address, Credential, StakingCredential, StakingHash};
pub use codec::Codec;
pub use config::{CodecConfig, REAL_PRECISION};
pub use decode::decode;
pub use encode::encode;
pub use real::{ParseRealError, Real};
pub use error::CodecError;
pub use value::Value;

/// Path of the root value in error messages.
pub(crate) const ROOT: &str = "$";
