//! Host functions as script callables.
//!
//! Calling a `FunctionWrapper` checks arity against the host signature,
//! coerces each argument to its parameter type (extra arguments of a variadic
//! function to the variadic element type), runs the body, and maps results
//! back: none becomes `None`, one becomes that value, several become a tuple.
//! A trailing non-nil `Error` result becomes the script error instead.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tether_native::{NativeFunc, NativeType, NativeValue};
use tether_value::{
    arity_mismatch, host_error, unexpected_keywords, variadic_arity_mismatch, Callable,
    EvalError, EvalResult, ScriptObject, Value,
};

use crate::coerce::coerce;
use crate::config::WrapCtx;
use crate::dispatch::to_value_in;

/// Name given to functions converted without one.
pub(crate) const ANONYMOUS: &str = "native_fn";

/// Host function seen from a script.
#[derive(Debug)]
pub struct FunctionWrapper {
    name: String,
    func: NativeFunc,
    ctx: WrapCtx,
    frozen: AtomicBool,
}

impl FunctionWrapper {
    pub(crate) fn new(name: &str, func: NativeFunc, ctx: &WrapCtx) -> Self {
        FunctionWrapper {
            name: name.to_string(),
            func,
            ctx: ctx.child(false),
            frozen: AtomicBool::new(ctx.frozen),
        }
    }

    pub fn func(&self) -> &NativeFunc {
        &self.func
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    fn check_arity(&self, got: usize) -> Result<(), EvalError> {
        let sig = self.func.sig();
        let min = sig.min_args();
        if sig.variadic {
            if got < min {
                return Err(variadic_arity_mismatch(&self.name, min, got));
            }
        } else if got != min {
            return Err(arity_mismatch(&self.name, min, got));
        }
        Ok(())
    }

    fn convert_args(&self, args: &[Value]) -> Result<Vec<NativeValue>, EvalError> {
        let sig = self.func.sig();
        let fixed = sig.min_args();
        let tag = &self.ctx.tag;
        let argument = |i: usize, value: &Value, ty: &NativeType| {
            coerce(value, ty, tag)
                .map_err(|e| e.with_context(&format!("{}: argument {}", self.name, i + 1)))
        };

        let mut natives = Vec::with_capacity(sig.params.len());
        for (i, (value, ty)) in args.iter().zip(&sig.params[..fixed]).enumerate() {
            natives.push(argument(i, value, ty)?);
        }
        if sig.variadic {
            let elem = sig
                .params
                .last()
                .and_then(NativeType::elem)
                .cloned()
                .unwrap_or(NativeType::Any);
            let rest = args[fixed..]
                .iter()
                .enumerate()
                .map(|(j, value)| argument(fixed + j, value, &elem))
                .collect::<Result<Vec<_>, _>>()?;
            natives.push(NativeValue::slice(elem, rest));
        }
        Ok(natives)
    }

    fn convert_results(&self, mut results: Vec<NativeValue>) -> EvalResult {
        let sig = self.func.sig();
        if results.len() != sig.results.len() {
            return Err(EvalError::new(format!(
                "{}: host function returned {} values, signature declares {}",
                self.name,
                results.len(),
                sig.results.len()
            )));
        }
        if sig.returns_error() {
            if let Some(NativeValue::Error(err)) = results.pop() {
                return Err(host_error(&err.message()));
            }
        }

        let ctx = self.ctx.child(false);
        match results.as_slice() {
            [] => Ok(Value::None),
            [one] => to_value_in(one, None, &ctx),
            many => {
                let items = many
                    .iter()
                    .map(|r| to_value_in(r, None, &ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::tuple(items))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %self.name, args = args.len()))]
    fn call_native(&self, args: &[Value], kwargs: &[(String, Value)]) -> EvalResult {
        if !kwargs.is_empty() {
            return Err(unexpected_keywords(&self.name));
        }
        self.check_arity(args.len())?;
        let natives = self.convert_args(args)?;
        let results = self.func.invoke(natives);
        self.convert_results(results)
    }
}

impl fmt::Display for FunctionWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native function {}: {}>", self.name, self.func.sig())
    }
}

impl ScriptObject for FunctionWrapper {
    fn type_name(&self) -> String {
        format!("tether_fn<{}>", self.func.sig())
    }

    fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Functions are immutable and hash by identity.
    #[allow(clippy::cast_possible_truncation, reason = "hash values are 32-bit")]
    fn hash(&self) -> Result<u32, EvalError> {
        Ok(self.func.addr() as u32)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_callable(&self) -> Option<&dyn Callable> {
        Some(self)
    }
}

impl Callable for FunctionWrapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> EvalResult {
        self.call_native(args, kwargs)
    }
}

/// Wrap a host function value as a script callable named `name`.
///
/// # Panics
///
/// Panics if `native` is not a `NativeValue::Func`.
#[track_caller]
pub fn make_callable(name: &str, native: &NativeValue) -> Value {
    let NativeValue::Func(func) = native else {
        panic!("make_callable: {name} is not a function");
    };
    let ctx = WrapCtx {
        tag: crate::config::Tag::default(),
        frozen: false,
    };
    Value::object(FunctionWrapper::new(name, func.clone(), &ctx))
}

#[cfg(test)]
mod tests;
