//! Calling harvested user functions from the host.

use std::collections::BTreeMap;
use std::sync::Arc;

use plinth_codec::{decode, encode, option, CodecConfig, CodecError, Value};
use plinth_common::{Data, EvalError, ProgramPair};
use tracing::debug;

use crate::error::CallError;
use crate::toolchain::{DebugInfo, FuncSignature};

/// Arguments of one call.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    args: Vec<(String, Value)>,
    context: Option<Data>,
    current_validator: Option<String>,
}

impl CallArgs {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies a named argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// Supplies the script context.
    pub fn context(mut self, context: Data) -> Self {
        self.context = Some(context);
        self
    }

    /// Names the validator the call is made on behalf of.
    pub fn current_validator(mut self, name: impl Into<String>) -> Self {
        self.current_validator = Some(name.into());
        self
    }
}

/// A user function compiled alongside a validator set.
#[derive(Debug, Clone)]
pub struct UserFunc {
    name: String,
    programs: ProgramPair,
    signature: FuncSignature,
    validator_indices: Arc<BTreeMap<String, usize>>,
    config: CodecConfig,
    check_divergence: bool,
    debug: DebugInfo,
    unoptimized_debug: DebugInfo,
}

impl UserFunc {
    /// Binds compiled programs to their signature.
    ///
    /// `validator_indices` resolves current-validator names. When
    /// `check_divergence` is set and an unoptimized program is present, every
    /// call evaluates both programs and compares the outcomes.
    pub fn new(
        name: impl Into<String>,
        programs: ProgramPair,
        signature: FuncSignature,
        validator_indices: Arc<BTreeMap<String, usize>>,
        config: CodecConfig,
        check_divergence: bool,
    ) -> Self {
        Self {
            name: name.into(),
            programs,
            signature,
            validator_indices,
            config,
            check_divergence,
            debug: DebugInfo::default(),
            unoptimized_debug: DebugInfo::default(),
        }
    }

    /// Attaches diagnostics of the optimized and unoptimized programs.
    pub fn with_debug(mut self, debug: DebugInfo, unoptimized_debug: DebugInfo) -> Self {
        self.debug = debug;
        self.unoptimized_debug = unoptimized_debug;
        self
    }

    /// Returns the qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the programs.
    pub fn programs(&self) -> &ProgramPair {
        &self.programs
    }

    /// Returns the call signature.
    pub fn signature(&self) -> &FuncSignature {
        &self.signature
    }

    /// Returns the codec configuration arguments are encoded with.
    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Returns diagnostics of the optimized program.
    pub fn debug(&self) -> &DebugInfo {
        &self.debug
    }

    /// Returns diagnostics of the unoptimized program.
    pub fn unoptimized_debug(&self) -> &DebugInfo {
        &self.unoptimized_debug
    }

    /// Calls the function and decodes the result with the return schema.
    ///
    /// Without a return schema the raw result is returned as [`Value::Data`].
    pub fn call(&self, args: CallArgs) -> Result<Value, CallError> {
        let result = self.call_raw(args)?;
        match &self.signature.returns {
            Some(schema) => decode(schema, &result, &self.config).map_err(|e| self.codec_error(e)),
            None => Ok(Value::Data(result)),
        }
    }

    /// Calls the function and returns the raw result.
    pub fn call_raw(&self, args: CallArgs) -> Result<Data, CallError> {
        let positional = self.positional_args(args)?;
        debug!(func = %self.name, args = positional.len(), "calling user function");

        let optimized = self.programs.optimized.eval(&positional);
        if self.check_divergence {
            if let Some(unoptimized) = &self.programs.unoptimized {
                self.compare(&optimized, &unoptimized.eval(&positional))?;
            }
        }
        optimized.map_err(|e| CallError::EvalFailed {
            func: self.name.clone(),
            message: e.message,
        })
    }

    /// Lays out declared arguments, then the context, then the current
    /// validator index.
    fn positional_args(&self, args: CallArgs) -> Result<Vec<Data>, CallError> {
        let CallArgs {
            args: mut supplied,
            context,
            current_validator,
        } = args;

        if let Some((name, _)) = supplied
            .iter()
            .find(|(name, _)| !self.signature.arguments.iter().any(|a| &a.name == name))
        {
            return Err(CallError::UnknownArgument {
                func: self.name.clone(),
                argument: name.clone(),
            });
        }

        for (i, (name, _)) in supplied.iter().enumerate() {
            if supplied[..i].iter().any(|(earlier, _)| earlier == name) {
                return Err(CallError::DuplicateArgument {
                    func: self.name.clone(),
                    argument: name.clone(),
                });
            }
        }

        let mut out = Vec::with_capacity(self.signature.arguments.len() + 2);
        for arg in &self.signature.arguments {
            let value = supplied
                .iter()
                .position(|(name, _)| name == &arg.name)
                .map(|i| supplied.swap_remove(i).1);
            let data = match (value, arg.optional) {
                (Some(v), optional) => {
                    let encoded =
                        encode(&arg.schema, &v, &self.config).map_err(|e| self.codec_error(e))?;
                    if optional {
                        option::wrap(Some(encoded))
                    } else {
                        encoded
                    }
                }
                (None, true) => option::wrap(None),
                (None, false) => {
                    return Err(CallError::MissingArgument {
                        func: self.name.clone(),
                        argument: arg.name.clone(),
                    })
                }
            };
            out.push(data);
        }

        if self.signature.requires_context {
            let context = context.ok_or_else(|| CallError::MissingContext {
                func: self.name.clone(),
            })?;
            out.push(context);
        }

        if self.signature.requires_current_validator {
            let name = current_validator.ok_or_else(|| CallError::MissingCurrentValidator {
                func: self.name.clone(),
            })?;
            let index = self
                .validator_indices
                .get(&name)
                .ok_or_else(|| CallError::UnknownValidator {
                    func: self.name.clone(),
                    validator: name.clone(),
                })?;
            out.push(Data::constr(*index as u64, Vec::new()));
        }

        Ok(out)
    }

    fn compare(
        &self,
        optimized: &Result<Data, EvalError>,
        unoptimized: &Result<Data, EvalError>,
    ) -> Result<(), CallError> {
        let agree = match (optimized, unoptimized) {
            (Ok(a), Ok(b)) => a == b,
            (Err(_), Err(_)) => true,
            _ => false,
        };
        if agree {
            return Ok(());
        }
        Err(CallError::OptimizerDivergence {
            func: self.name.clone(),
            optimized: outcome(optimized),
            unoptimized: outcome(unoptimized),
        })
    }

    fn codec_error(&self, source: CodecError) -> CallError {
        CallError::Codec {
            func: self.name.clone(),
            source,
        }
    }
}

fn outcome(result: &Result<Data, EvalError>) -> String {
    match result {
        Ok(data) => data.to_string(),
        Err(e) => format!("error '{}'", e.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::Argument;
    use plinth_common::Program;
    use plinth_schema::{Primitive, TypeSchema};

    /// Echoes its arguments back as a list, or fails when the first
    /// argument is the integer 13.
    #[derive(Debug)]
    struct Echo {
        offset: i128,
    }

    impl Program for Echo {
        fn hash(&self) -> Vec<u8> {
            vec![0; 28]
        }

        fn eval(&self, args: &[Data]) -> Result<Data, EvalError> {
            if args.first() == Some(&Data::Int(13)) {
                return Err(EvalError::new("unlucky"));
            }
            let mut out = args.to_vec();
            out.push(Data::Int(self.offset));
            Ok(Data::List(out))
        }

        fn to_bytes(&self) -> Vec<u8> {
            Vec::new()
        }
    }

    fn int() -> TypeSchema {
        TypeSchema::primitive(Primitive::Int)
    }

    fn func(signature: FuncSignature, unoptimized_offset: Option<i128>) -> UserFunc {
        let mut programs = ProgramPair::new(Arc::new(Echo { offset: 0 }));
        if let Some(offset) = unoptimized_offset {
            programs = programs.with_unoptimized(Arc::new(Echo { offset }));
        }
        let indices = BTreeMap::from([("a".to_string(), 0), ("b".to_string(), 1)]);
        UserFunc::new(
            "m::f",
            programs,
            signature,
            Arc::new(indices),
            CodecConfig::default(),
            true,
        )
    }

    fn two_args() -> FuncSignature {
        FuncSignature {
            arguments: vec![Argument::required("x", int()), Argument::optional("y", int())],
            ..FuncSignature::default()
        }
    }

    #[test]
    fn optional_argument_uses_option_convention() {
        let f = func(two_args(), None);
        let out = f.call_raw(CallArgs::new().arg("x", Value::Int(1))).unwrap();
        assert_eq!(
            out,
            Data::List(vec![Data::Int(1), Data::constr(1, vec![]), Data::Int(0)])
        );
        let out = f
            .call_raw(CallArgs::new().arg("y", Value::Int(2)).arg("x", Value::Int(1)))
            .unwrap();
        assert_eq!(
            out,
            Data::List(vec![
                Data::Int(1),
                Data::constr(0, vec![Data::Int(2)]),
                Data::Int(0)
            ])
        );
    }

    #[test]
    fn missing_and_unknown_arguments() {
        let f = func(two_args(), None);
        assert!(matches!(
            f.call_raw(CallArgs::new()),
            Err(CallError::MissingArgument { argument, .. }) if argument == "x"
        ));
        assert!(matches!(
            f.call_raw(CallArgs::new().arg("x", Value::Int(1)).arg("z", Value::Int(1))),
            Err(CallError::UnknownArgument { argument, .. }) if argument == "z"
        ));
    }

    #[test]
    fn repeated_argument_is_rejected() {
        let f = func(two_args(), None);
        let err = f
            .call_raw(CallArgs::new().arg("x", Value::Int(1)).arg("x", Value::Int(2)))
            .unwrap_err();
        assert!(matches!(&err, CallError::DuplicateArgument { argument, .. } if argument == "x"));
        assert!(err.to_string().contains("'x' supplied more than once"));

        // Optional arguments are checked too.
        assert!(matches!(
            f.call_raw(
                CallArgs::new()
                    .arg("x", Value::Int(1))
                    .arg("y", Value::Int(2))
                    .arg("y", Value::Int(3))
            ),
            Err(CallError::DuplicateArgument { argument, .. }) if argument == "y"
        ));
    }

    #[test]
    fn context_and_current_validator_are_appended() {
        let signature = FuncSignature {
            requires_context: true,
            requires_current_validator: true,
            ..FuncSignature::default()
        };
        let f = func(signature, None);
        let out = f
            .call_raw(CallArgs::new().context(Data::Int(99)).current_validator("b"))
            .unwrap();
        assert_eq!(
            out,
            Data::List(vec![Data::Int(99), Data::constr(1, vec![]), Data::Int(0)])
        );

        assert!(matches!(
            f.call_raw(CallArgs::new().current_validator("b")),
            Err(CallError::MissingContext { .. })
        ));
        assert!(matches!(
            f.call_raw(CallArgs::new().context(Data::Int(0))),
            Err(CallError::MissingCurrentValidator { .. })
        ));
        assert!(matches!(
            f.call_raw(CallArgs::new().context(Data::Int(0)).current_validator("zz")),
            Err(CallError::UnknownValidator { validator, .. }) if validator == "zz"
        ));
    }

    #[test]
    fn eval_failure_carries_engine_message() {
        let f = func(two_args(), None);
        let err = f.call_raw(CallArgs::new().arg("x", Value::Int(13))).unwrap_err();
        assert!(matches!(err, CallError::EvalFailed { message, .. } if message == "unlucky"));
    }

    #[test]
    fn divergence_is_reported() {
        let f = func(two_args(), Some(5));
        let err = f.call_raw(CallArgs::new().arg("x", Value::Int(1))).unwrap_err();
        assert!(matches!(err, CallError::OptimizerDivergence { .. }));

        let agreeing = func(two_args(), Some(0));
        assert!(agreeing.call_raw(CallArgs::new().arg("x", Value::Int(1))).is_ok());
    }

    #[test]
    fn result_is_decoded_with_return_schema() {
        let signature = FuncSignature {
            arguments: vec![Argument::required("x", int())],
            returns: Some(TypeSchema::list(int())),
            ..FuncSignature::default()
        };
        let f = func(signature, None);
        let value = f.call(CallArgs::new().arg("x", Value::Int(4))).unwrap();
        assert_eq!(value, Value::List(vec![Value::Int(4), Value::Int(0)]));

        let raw = func(two_args(), None);
        let value = raw.call(CallArgs::new().arg("x", Value::Int(4))).unwrap();
        assert!(matches!(value, Value::Data(_)));
    }

    #[test]
    fn bad_argument_is_a_codec_error() {
        let f = func(two_args(), None);
        let err = f.call_raw(CallArgs::new().arg("x", Value::text("nope"))).unwrap_err();
        assert!(matches!(err, CallError::Codec { .. }));
    }
}
