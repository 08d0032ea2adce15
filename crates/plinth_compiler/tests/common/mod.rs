//! A fake front-end for integration tests.
//!
//! Sources are line based:
//!
//! - `hash NAME` embeds the digest of validator `NAME`; compiling fails if
//!   that digest is still a placeholder.
//! - `func NAME` compiles a user function that sums its integer arguments.
//!   Functions are only emitted by unoptimized compilations.
//! - anything else is opaque text that only affects the digest.
//!
//! A program's bytes are a readable description of what went into it, and
//! its 28-byte digest is derived from those bytes.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use plinth_common::{ContentHash, Data, EvalError, LoadError, Program, ProgramLoader, ProgramPair};
use plinth_compiler::{
    Argument, CompileOutput, CompileRequest, DebugInfo, FrontendError, FuncSignature,
    HarvestedFunc, Toolchain,
};
use plinth_schema::{Primitive, TypeSchema};

pub const FORMAT_VERSION: &str = "fake-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeProgram {
    bytes: Vec<u8>,
}

impl FakeProgram {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Program for FakeProgram {
    fn hash(&self) -> Vec<u8> {
        let first = ContentHash::from_bytes(&self.bytes);
        let second = ContentHash::from_bytes(first.as_bytes());
        let mut out = first.as_bytes().to_vec();
        out.extend_from_slice(&second.as_bytes()[..12]);
        out
    }

    /// User functions sum their integer arguments; a negative sum fails.
    fn eval(&self, args: &[Data]) -> Result<Data, EvalError> {
        let sum: i128 = args
            .iter()
            .map(|a| match a {
                Data::Int(n) => *n,
                Data::Constr { fields, .. } => fields
                    .iter()
                    .map(|f| if let Data::Int(n) = f { *n } else { 0 })
                    .sum(),
                _ => 0,
            })
            .sum();
        if sum < 0 {
            return Err(EvalError::new(format!("negative sum {sum}")));
        }
        Ok(Data::Int(sum))
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// What one `compile` call was given.
#[derive(Debug, Clone)]
pub struct CompileCall {
    pub name: String,
    pub optimize: bool,
    pub placeholders: Vec<String>,
    pub own_hash: Option<Vec<u8>>,
    pub depends_on_own_hash: bool,
    pub excluded: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeToolchain {
    compiles: Cell<usize>,
    harvests: Cell<usize>,
    loads: Cell<usize>,
    calls: RefCell<Vec<CompileCall>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compiles(&self) -> usize {
        self.compiles.get()
    }

    pub fn harvests(&self) -> usize {
        self.harvests.get()
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    pub fn calls(&self) -> Vec<CompileCall> {
        self.calls.borrow().clone()
    }
}

impl ProgramLoader for FakeToolchain {
    fn load_program(&self, bytes: &[u8], version: &str) -> Result<Arc<dyn Program>, LoadError> {
        if version != FORMAT_VERSION {
            return Err(LoadError {
                reason: format!("unsupported format {version}"),
            });
        }
        self.loads.set(self.loads.get() + 1);
        Ok(Arc::new(FakeProgram {
            bytes: bytes.to_vec(),
        }))
    }
}

impl Toolchain for FakeToolchain {
    fn version(&self) -> &str {
        "fake-compiler 0.1.0"
    }

    fn format_version(&self) -> &str {
        FORMAT_VERSION
    }

    fn compile(
        &self,
        request: &CompileRequest<'_>,
        on_user_func: &mut dyn FnMut(HarvestedFunc),
    ) -> Result<CompileOutput, FrontendError> {
        self.compiles.set(self.compiles.get() + 1);
        let options = request.options;
        self.calls.borrow_mut().push(CompileCall {
            name: request.name.to_string(),
            optimize: options.optimize,
            placeholders: options
                .validators
                .iter()
                .filter(|r| r.is_placeholder())
                .map(|r| r.name.clone())
                .collect(),
            own_hash: options.own_hash.clone(),
            depends_on_own_hash: options.depends_on_own_hash,
            excluded: options.excluded_user_funcs.iter().cloned().collect(),
        });

        let mut content = format!("validator {} mainnet={}", request.name, options.is_mainnet);
        for (name, source) in &request.modules {
            content.push_str(&format!(" module {name}={source}"));
        }
        for (name, data) in &options.parameters {
            content.push_str(&format!(" param {name}={data}"));
        }
        for line in request.source.lines().map(str::trim) {
            if let Some(dep) = line.strip_prefix("hash ") {
                let r = options
                    .validators
                    .iter()
                    .find(|r| r.name == dep)
                    .ok_or_else(|| FrontendError::new(format!("unknown validator {dep}")))?;
                if r.is_placeholder() {
                    return Err(FrontendError::new(format!("hash of {dep} is not known yet")));
                }
                content.push_str(&format!(" hash {dep}={}", hex::encode(&r.hash)));
            } else if let Some(func) = line.strip_prefix("func ") {
                if !options.optimize && !options.excluded_user_funcs.contains(func) {
                    self.harvests.set(self.harvests.get() + 1);
                    on_user_func(user_func(func));
                }
            } else if line.starts_with("fail") {
                return Err(FrontendError::new(format!("syntax error in {}", request.name)));
            } else if !line.is_empty() {
                content.push_str(&format!(" text {line}"));
            }
        }
        if options.depends_on_own_hash {
            content.push_str(" own-hash");
        }

        let program = if options.optimize {
            FakeProgram::new(format!("opt {content}"))
        } else {
            let own = options.own_hash.as_deref().map(hex::encode).unwrap_or_default();
            FakeProgram::new(format!("raw {content} self={own}"))
        };
        Ok(CompileOutput {
            program: Arc::new(program),
            debug: DebugInfo {
                ir: Some(format!("ir of {}", request.name)),
                source_map: None,
            },
        })
    }
}

fn user_func(name: &str) -> HarvestedFunc {
    let int = TypeSchema::primitive(Primitive::Int);
    HarvestedFunc {
        name: name.to_string(),
        programs: ProgramPair::new(Arc::new(FakeProgram::new(format!("func {name}"))))
            .with_unoptimized(Arc::new(FakeProgram::new(format!("func {name} raw")))),
        debug: DebugInfo {
            ir: Some(format!("ir of {name}")),
            source_map: None,
        },
        unoptimized_debug: DebugInfo::default(),
        signature: FuncSignature {
            arguments: vec![
                Argument::required("amount", int.clone()),
                Argument::optional("bonus", int.clone()),
            ],
            returns: Some(int),
            requires_context: false,
            requires_current_validator: true,
        },
    }
}
