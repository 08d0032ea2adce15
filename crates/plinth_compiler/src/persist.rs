//! Conversion between build bundles and cache records.
//!
//! Programs are stored as hex of their serialized bytes and loaded back
//! through the toolchain with the recorded format version.

use std::collections::BTreeMap;
use std::sync::Arc;

use plinth_cache::{ArgumentRecord, CacheRecord, UserFuncRecord, ValidatorRecord};
use plinth_codec::{Codec, CodecConfig};
use plinth_common::{ContentHash, Program, ProgramPair};
use plinth_schema::TypeSchema;

use crate::compiled::{Bundle, CompiledValidator};
use crate::error::BuildError;
use crate::toolchain::{Argument, DebugInfo, FuncSignature, Toolchain};
use crate::user_func::UserFunc;
use crate::validator::Purpose;

/// Flattens a bundle into its cache record. `version` is the format
/// version of the user-function programs.
pub(crate) fn to_record(bundle: &Bundle, debug: bool, version: &str) -> CacheRecord {
    CacheRecord {
        debug,
        validators: bundle
            .validators
            .iter()
            .map(|(name, v)| (name.clone(), validator_record(v)))
            .collect(),
        user_funcs: bundle
            .user_funcs
            .iter()
            .map(|(name, f)| (name.clone(), user_func_record(f, version)))
            .collect(),
    }
}

fn validator_record(v: &CompiledValidator) -> ValidatorRecord {
    ValidatorRecord {
        purpose: v.purpose.as_str().to_string(),
        hash: v.hash_hex(),
        bytecode: hex::encode(v.programs.optimized.to_bytes()),
        unoptimized_bytecode: v
            .programs
            .unoptimized
            .as_ref()
            .map(|p| hex::encode(p.to_bytes())),
        ir: v.debug.ir.clone(),
        source_map: v.debug.source_map.clone(),
        unoptimized_ir: v.unoptimized_debug.ir.clone(),
        unoptimized_source_map: v.unoptimized_debug.source_map.clone(),
        version: v.version.clone(),
        codec: v.redeemer.config(),
        redeemer: v.redeemer.schema().clone(),
        datum: v.datum.as_ref().map(|d| d.schema().clone()),
        dependencies: v
            .dependencies
            .iter()
            .map(|(name, hash)| (name.clone(), hex::encode(hash)))
            .collect(),
    }
}

fn user_func_record(f: &UserFunc, version: &str) -> UserFuncRecord {
    let programs = f.programs();
    let signature = f.signature();
    UserFuncRecord {
        bytecode: hex::encode(programs.optimized.to_bytes()),
        unoptimized_bytecode: programs
            .unoptimized
            .as_ref()
            .map(|p| hex::encode(p.to_bytes())),
        ir: f.debug().ir.clone(),
        source_map: f.debug().source_map.clone(),
        unoptimized_ir: f.unoptimized_debug().ir.clone(),
        unoptimized_source_map: f.unoptimized_debug().source_map.clone(),
        version: version.to_string(),
        arguments: signature
            .arguments
            .iter()
            .map(|a| ArgumentRecord {
                name: a.name.clone(),
                schema: a.schema.clone(),
                optional: a.optional,
            })
            .collect(),
        returns: signature.returns.clone(),
        requires_context: signature.requires_context,
        requires_current_validator: signature.requires_current_validator,
    }
}

/// Rebuilds a bundle from a cache record, loading every program through
/// `toolchain`.
pub(crate) fn restore(
    record: CacheRecord,
    key: ContentHash,
    toolchain: &dyn Toolchain,
    indices: Arc<BTreeMap<String, usize>>,
    config: CodecConfig,
    check_divergence: bool,
) -> Result<Bundle, BuildError> {
    let mut validators = BTreeMap::new();
    for (name, r) in record.validators {
        let compiled = restore_validator(&name, r, toolchain)?;
        validators.insert(name, compiled);
    }

    let mut user_funcs = BTreeMap::new();
    for (name, r) in record.user_funcs {
        let programs = load_pair(
            &name,
            &r.bytecode,
            r.unoptimized_bytecode.as_deref(),
            &r.version,
            toolchain,
        )?;
        let signature = FuncSignature {
            arguments: r
                .arguments
                .into_iter()
                .map(|a| Argument {
                    name: a.name,
                    schema: a.schema,
                    optional: a.optional,
                })
                .collect(),
            returns: r.returns,
            requires_context: r.requires_context,
            requires_current_validator: r.requires_current_validator,
        };
        let func = UserFunc::new(
            name.clone(),
            programs,
            signature,
            Arc::clone(&indices),
            config,
            check_divergence,
        )
        .with_debug(
            DebugInfo {
                ir: r.ir,
                source_map: r.source_map,
            },
            DebugInfo {
                ir: r.unoptimized_ir,
                source_map: r.unoptimized_source_map,
            },
        );
        user_funcs.insert(name, func);
    }

    Ok(Bundle {
        cache_key: key,
        from_cache: true,
        validators,
        user_funcs,
    })
}

fn restore_validator(
    name: &str,
    r: ValidatorRecord,
    toolchain: &dyn Toolchain,
) -> Result<CompiledValidator, BuildError> {
    let purpose: Purpose = r.purpose.parse().map_err(|_| BuildError::UnknownPurpose {
        validator: name.to_string(),
        purpose: r.purpose.clone(),
    })?;
    let hash = decode_hex(name, "hash", &r.hash)?;
    let programs = load_pair(
        name,
        &r.bytecode,
        r.unoptimized_bytecode.as_deref(),
        &r.version,
        toolchain,
    )?;
    if programs.hash() != hash {
        return Err(BuildError::CorruptCacheRecord {
            reason: format!("{name}: stored hash does not match the stored program"),
        });
    }
    let dependencies = r
        .dependencies
        .iter()
        .map(|(dep, h)| Ok((dep.clone(), decode_hex(name, dep, h)?)))
        .collect::<Result<BTreeMap<_, _>, BuildError>>()?;

    Ok(CompiledValidator {
        name: name.to_string(),
        purpose,
        hash,
        programs,
        version: r.version,
        redeemer: codec(name, r.redeemer, r.codec)?,
        datum: r.datum.map(|d| codec(name, d, r.codec)).transpose()?,
        dependencies,
        debug: DebugInfo {
            ir: r.ir,
            source_map: r.source_map,
        },
        unoptimized_debug: DebugInfo {
            ir: r.unoptimized_ir,
            source_map: r.unoptimized_source_map,
        },
    })
}

fn load_pair(
    name: &str,
    bytecode: &str,
    unoptimized: Option<&str>,
    version: &str,
    toolchain: &dyn Toolchain,
) -> Result<ProgramPair, BuildError> {
    let load = |hex_bytes: &str| -> Result<Arc<dyn Program>, BuildError> {
        let bytes = decode_hex(name, "bytecode", hex_bytes)?;
        toolchain
            .load_program(&bytes, version)
            .map_err(|source| BuildError::ProgramLoad {
                name: name.to_string(),
                source,
            })
    };
    let mut pair = ProgramPair::new(load(bytecode)?);
    if let Some(unoptimized) = unoptimized {
        pair = pair.with_unoptimized(load(unoptimized)?);
    }
    Ok(pair)
}

fn decode_hex(name: &str, field: &str, s: &str) -> Result<Vec<u8>, BuildError> {
    hex::decode(s).map_err(|e| BuildError::CorruptCacheRecord {
        reason: format!("{name}: {field} is not valid hex: {e}"),
    })
}

fn codec(
    name: &str,
    schema: TypeSchema,
    config: CodecConfig,
) -> Result<Codec, BuildError> {
    Codec::new(schema, config).map_err(|source| BuildError::InvalidSchema {
        validator: name.to_string(),
        source,
    })
}
