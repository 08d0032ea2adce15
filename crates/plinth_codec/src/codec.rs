//! A schema bound to a network configuration.

use plinth_common::Data;
use plinth_schema::{SchemaError, TypeSchema};

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::value::Value;

/// A [`TypeSchema`] together with the [`CodecConfig`] it is used under.
///
/// Validator parameters, datums, redeemers, and user-function arguments
/// each carry one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct Codec {
    schema: TypeSchema,
    config: CodecConfig,
}

impl Codec {
    /// Binds `schema` to `config` after checking the schema is well formed.
    pub fn new(schema: TypeSchema, config: CodecConfig) -> Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Self { schema, config })
    }

    /// Returns the bound schema.
    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    /// Returns the bound configuration.
    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Encodes a host value.
    pub fn encode(&self, value: &Value) -> Result<Data, CodecError> {
        crate::encode(&self.schema, value, &self.config)
    }

    /// Decodes canonical data.
    pub fn decode(&self, data: &Data) -> Result<Value, CodecError> {
        crate::decode(&self.schema, data, &self.config)
    }
}
