//! Two-pass compilation of a validator set in hash-dependency order.
//!
//! Validators embed each other's digests, and a digest is only known once
//! the embedding validator is compiled. The build breaks the circularity in
//! two passes:
//!
//! 1. In topological order of the hash-dependency graph, compile each
//!    validator optimized. Every validator of the set is described to the
//!    front-end, but only the declared hash dependencies carry their digest;
//!    every other entry is an empty placeholder. A validator's own digest is
//!    left to the front-end. The optimized program's digest
//!    is final and checked against its expected value, if declared.
//! 2. With every digest known, recompile each validator unoptimized with
//!    its own digest as a literal. User functions compiled along the way
//!    are harvested; functions already harvested are excluded from later
//!    compilations so each is stored once.
//!
//! The build result is cached under a digest of its inputs and only stored
//! after both passes succeed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::DiGraph;
use plinth_cache::{cache_key, BuildCache, KeyInputs, ValidatorKey};
use plinth_codec::{Codec, CodecConfig};
use plinth_common::{ContentHash, Data, Program, ProgramPair};
use tracing::{debug, info};

use crate::compiled::{Bundle, CompiledValidator};
use crate::error::BuildError;
use crate::persist;
use crate::toolchain::{
    CompileOptions, CompileOutput, CompileRequest, DebugInfo, HarvestedFunc, Toolchain,
    ValidatorRef,
};
use crate::user_func::UserFunc;
use crate::validator::{Validator, ValidatorSet};

/// Settings of one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Network flag.
    pub is_mainnet: bool,
    /// Keep debug artifacts and check user functions for optimizer divergence.
    pub debug: bool,
    /// Digests the build must reproduce, keyed by validator name.
    pub expected_hashes: BTreeMap<String, Vec<u8>>,
    /// Values substituted for named parameters in every validator.
    pub parameters: BTreeMap<String, Data>,
}

impl BuildOptions {
    /// Returns the codec configuration implied by the network flag.
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::new(self.is_mainnet)
    }
}

/// Outcome of pass 1 for one validator.
struct Resolved<'a> {
    validator: &'a Validator,
    program: Arc<dyn Program>,
    hash: Vec<u8>,
    debug: DebugInfo,
}

/// Compiles one [`ValidatorSet`] with one [`Toolchain`].
pub struct Compiler<'a> {
    toolchain: &'a dyn Toolchain,
    set: &'a ValidatorSet,
    options: &'a BuildOptions,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler.
    pub fn new(toolchain: &'a dyn Toolchain, set: &'a ValidatorSet, options: &'a BuildOptions) -> Self {
        Self {
            toolchain,
            set,
            options,
        }
    }

    /// Computes the digest of this build's inputs.
    pub fn cache_key(&self) -> Result<ContentHash, BuildError> {
        let validators = self
            .set
            .validators()
            .map(|v| ValidatorKey {
                name: &v.name,
                source: &v.source,
                purpose: v.purpose.as_str(),
                modules: &v.modules,
                hash_dependencies: &v.hash_dependencies,
                depends_on_own_hash: v.depends_on_own_hash,
                redeemer: &v.redeemer,
                datum: v.datum.as_ref(),
            })
            .collect();
        let inputs = KeyInputs {
            compiler_version: self.toolchain.version(),
            debug: self.options.debug,
            is_mainnet: self.options.is_mainnet,
            validators,
            modules: self.set.modules().collect(),
            parameters: self
                .options
                .parameters
                .iter()
                .map(|(name, data)| (name.as_str(), data))
                .collect(),
        };
        Ok(cache_key(&inputs)?)
    }

    /// Builds the set, consulting and then filling `cache` when given.
    #[tracing::instrument(level = "debug", skip_all, fields(
        validators = self.set.len(),
        debug = self.options.debug,
    ))]
    pub fn build(&self, cache: Option<&mut BuildCache>) -> Result<Bundle, BuildError> {
        self.set.check()?;
        if let Some(name) = self
            .options
            .expected_hashes
            .keys()
            .find(|name| self.set.get(name).is_none())
        {
            return Err(BuildError::UnknownValidator {
                validator: name.clone(),
            });
        }

        let key = self.cache_key()?;
        let indices = Arc::new(self.set.indices());
        let mut cache = cache;

        if let Some(cache) = cache.as_mut() {
            if let Some(record) = cache.lookup(&key) {
                let bundle = persist::restore(
                    record,
                    key,
                    self.toolchain,
                    indices,
                    self.options.codec_config(),
                    self.options.debug,
                )?;
                for v in bundle.validators.values() {
                    self.check_expected(&v.name, &v.hash)?;
                }
                info!(%key, "restored build from cache");
                return Ok(bundle);
            }
        }

        let order = self.hash_order()?;
        let resolved = self.resolve_hashes(&order)?;
        let bundle = self.patch(resolved, key, indices)?;

        if let Some(cache) = cache {
            let record =
                persist::to_record(&bundle, self.options.debug, self.toolchain.format_version());
            cache.store(&key, &record)?;
        }
        info!(%key, validators = bundle.validators.len(), user_funcs = bundle.user_funcs.len(), "build complete");
        Ok(bundle)
    }

    /// Orders validators so that every hash dependency precedes its dependents.
    fn hash_order(&self) -> Result<Vec<&'a Validator>, BuildError> {
        let mut graph = DiGraph::<&'a Validator, ()>::new();
        let nodes: BTreeMap<&str, _> = self
            .set
            .validators()
            .map(|v| (v.name.as_str(), graph.add_node(v)))
            .collect();

        for v in self.set.validators() {
            let to = nodes[v.name.as_str()];
            for dep in v.external_dependencies() {
                let from = nodes.get(dep).ok_or_else(|| BuildError::UnknownDependency {
                    validator: v.name.clone(),
                    dependency: dep.to_string(),
                })?;
                graph.add_edge(*from, to, ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|n| graph[n]).collect()),
            Err(_) => {
                let mut members: Vec<String> = tarjan_scc(&graph)
                    .into_iter()
                    .filter(|scc| scc.len() > 1)
                    .flatten()
                    .map(|n| graph[n].name.clone())
                    .collect();
                members.sort();
                Err(BuildError::DependencyCycle { validators: members })
            }
        }
    }

    /// Pass 1: compile optimized programs and fix every digest.
    #[tracing::instrument(level = "debug", skip_all)]
    fn resolve_hashes(
        &self,
        order: &[&'a Validator],
    ) -> Result<BTreeMap<String, Resolved<'a>>, BuildError> {
        let mut resolved: BTreeMap<String, Resolved<'a>> = BTreeMap::new();
        for &v in order {
            // Only declared dependencies see a digest, so an undeclared
            // reference fails regardless of compilation order.
            let deps: BTreeSet<&str> = v.external_dependencies().collect();
            let known = |name: &str| {
                deps.contains(name)
                    .then(|| resolved.get(name).map(|r| r.hash.clone()))
                    .flatten()
            };
            let options = CompileOptions {
                optimize: true,
                is_mainnet: self.options.is_mainnet,
                validators: self.validator_refs(known),
                own_hash: None,
                depends_on_own_hash: v.needs_own_hash(),
                parameters: self.options.parameters.clone(),
                excluded_user_funcs: BTreeSet::new(),
            };
            let output = self.compile(v, &options, &mut |_: HarvestedFunc| {})?;
            let hash = output.program.hash();
            self.check_expected(&v.name, &hash)?;
            debug!(validator = %v.name, hash = %hex::encode(&hash), "resolved validator hash");
            resolved.insert(
                v.name.clone(),
                Resolved {
                    validator: v,
                    program: output.program,
                    hash,
                    debug: output.debug,
                },
            );
        }
        Ok(resolved)
    }

    /// Pass 2: compile unoptimized programs with every digest known and
    /// harvest user functions.
    #[tracing::instrument(level = "debug", skip_all)]
    fn patch(
        &self,
        resolved: BTreeMap<String, Resolved<'a>>,
        key: ContentHash,
        indices: Arc<BTreeMap<String, usize>>,
    ) -> Result<Bundle, BuildError> {
        let hashes: BTreeMap<String, Vec<u8>> = resolved
            .iter()
            .map(|(name, r)| (name.clone(), r.hash.clone()))
            .collect();
        let refs = self.validator_refs(|name| hashes.get(name).cloned());
        let config = self.options.codec_config();

        let mut harvested: BTreeMap<String, HarvestedFunc> = BTreeMap::new();
        let mut validators = BTreeMap::new();
        for (name, first) in resolved {
            let v = first.validator;
            let options = CompileOptions {
                optimize: false,
                is_mainnet: self.options.is_mainnet,
                validators: refs.clone(),
                own_hash: Some(first.hash.clone()),
                depends_on_own_hash: v.needs_own_hash(),
                parameters: self.options.parameters.clone(),
                excluded_user_funcs: harvested.keys().cloned().collect(),
            };
            let output = self.compile(v, &options, &mut |func: HarvestedFunc| {
                if !harvested.contains_key(&func.name) {
                    debug!(validator = %v.name, func = %func.name, "harvested user function");
                    harvested.insert(func.name.clone(), func);
                }
            })?;

            let dependencies = v
                .hash_dependencies
                .iter()
                .filter_map(|d| hashes.get(d).map(|h| (d.clone(), h.clone())))
                .collect();
            let (debug, unoptimized_debug) = if self.options.debug {
                (first.debug, output.debug)
            } else {
                (DebugInfo::default(), DebugInfo::default())
            };
            let compiled = CompiledValidator {
                name: name.clone(),
                purpose: v.purpose,
                hash: first.hash,
                programs: ProgramPair::new(first.program).with_unoptimized(output.program),
                version: self.toolchain.format_version().to_string(),
                redeemer: self.codec(v, &v.redeemer, config)?,
                datum: v
                    .datum
                    .as_ref()
                    .map(|d| self.codec(v, d, config))
                    .transpose()?,
                dependencies,
                debug,
                unoptimized_debug,
            };
            validators.insert(name, compiled);
        }

        let user_funcs = harvested
            .into_iter()
            .map(|(name, func)| {
                let (debug, unoptimized_debug) = if self.options.debug {
                    (func.debug, func.unoptimized_debug)
                } else {
                    (DebugInfo::default(), DebugInfo::default())
                };
                let user_func = UserFunc::new(
                    name.clone(),
                    func.programs,
                    func.signature,
                    Arc::clone(&indices),
                    config,
                    self.options.debug,
                )
                .with_debug(debug, unoptimized_debug);
                (name, user_func)
            })
            .collect();

        Ok(Bundle {
            cache_key: key,
            from_cache: false,
            validators,
            user_funcs,
        })
    }

    /// Describes every validator of the set, in name order, with the digests
    /// `known` returns and placeholders for the rest.
    fn validator_refs(&self, known: impl Fn(&str) -> Option<Vec<u8>>) -> Vec<ValidatorRef> {
        self.set
            .validators()
            .enumerate()
            .map(|(index, v)| ValidatorRef {
                name: v.name.clone(),
                hash_type: v.purpose.hash_type(),
                index,
                hash: known(&v.name).unwrap_or_default(),
            })
            .collect()
    }

    fn compile(
        &self,
        v: &Validator,
        options: &CompileOptions,
        on_user_func: &mut dyn FnMut(HarvestedFunc),
    ) -> Result<CompileOutput, BuildError> {
        let modules = v
            .modules
            .iter()
            .map(|m| {
                self.set
                    .module(m)
                    .map(|source| (m.as_str(), source))
                    .ok_or_else(|| BuildError::UnknownModule {
                        validator: v.name.clone(),
                        module: m.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let request = CompileRequest {
            name: &v.name,
            source: &v.source,
            modules,
            options,
        };
        self.toolchain
            .compile(&request, on_user_func)
            .map_err(|source| BuildError::Frontend {
                validator: v.name.clone(),
                source,
            })
    }

    fn codec(
        &self,
        v: &Validator,
        schema: &plinth_schema::TypeSchema,
        config: CodecConfig,
    ) -> Result<Codec, BuildError> {
        Codec::new(schema.clone(), config).map_err(|source| BuildError::InvalidSchema {
            validator: v.name.clone(),
            source,
        })
    }

    fn check_expected(&self, name: &str, actual: &[u8]) -> Result<(), BuildError> {
        match self.options.expected_hashes.get(name) {
            Some(expected) if expected.as_slice() != actual => Err(BuildError::HashMismatch {
                validator: name.to_string(),
                expected: hex::encode(expected),
                actual: hex::encode(actual),
            }),
            _ => Ok(()),
        }
    }
}

/// Builds `set` with `toolchain`, consulting and filling `cache` when given.
pub fn build(
    toolchain: &dyn Toolchain,
    set: &ValidatorSet,
    options: &BuildOptions,
    cache: Option<&mut BuildCache>,
) -> Result<Bundle, BuildError> {
    Compiler::new(toolchain, set, options).build(cache)
}
