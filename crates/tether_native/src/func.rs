//! Host functions.
//!
//! A `NativeFunc` is a signature plus a type-erased body. The body receives
//! arguments already coerced to the parameter types (a variadic tail arrives
//! as a single slice) and returns one value per declared result.

use std::fmt;
use std::sync::Arc;

use crate::types::NativeType;
use crate::value::NativeValue;

/// Parameter and result types of a host function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncSig {
    pub params: Vec<NativeType>,
    /// The last parameter is a `Slice` collecting any extra arguments.
    pub variadic: bool,
    pub results: Vec<NativeType>,
}

impl FuncSig {
    pub fn new(params: Vec<NativeType>, results: Vec<NativeType>) -> Self {
        FuncSig {
            params,
            variadic: false,
            results,
        }
    }

    /// Signature whose last parameter is `...elem`.
    pub fn variadic(mut params: Vec<NativeType>, elem: NativeType, results: Vec<NativeType>) -> Self {
        params.push(NativeType::slice(elem));
        FuncSig {
            params,
            variadic: true,
            results,
        }
    }

    /// Whether the last result follows the host error-return convention.
    pub fn returns_error(&self) -> bool {
        matches!(self.results.last(), Some(NativeType::Error))
    }

    /// Minimum number of arguments a call must supply.
    pub fn min_args(&self) -> usize {
        if self.variadic {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }
}

impl fmt::Display for FuncSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param.elem() {
                Some(elem) if self.variadic && i == last => write!(f, "...{elem}")?,
                _ => write!(f, "{param}")?,
            }
        }
        write!(f, ")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [one] => write!(f, " -> {one}"),
            many => {
                write!(f, " -> (")?;
                for (i, result) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{result}")?;
                }
                write!(f, ")")
            }
        }
    }
}

type FnBody = dyn Fn(Vec<NativeValue>) -> Vec<NativeValue> + Send + Sync;

/// Host function value.
#[derive(Clone)]
pub struct NativeFunc {
    sig: Arc<FuncSig>,
    body: Arc<FnBody>,
}

impl NativeFunc {
    pub fn new(
        sig: FuncSig,
        body: impl Fn(Vec<NativeValue>) -> Vec<NativeValue> + Send + Sync + 'static,
    ) -> Self {
        NativeFunc {
            sig: Arc::new(sig),
            body: Arc::new(body),
        }
    }

    pub fn sig(&self) -> &FuncSig {
        &self.sig
    }

    pub fn sig_arc(&self) -> &Arc<FuncSig> {
        &self.sig
    }

    /// Run the body. Arguments must already match the signature.
    pub fn invoke(&self, args: Vec<NativeValue>) -> Vec<NativeValue> {
        (self.body)(args)
    }

    /// Identity of the body; clones of one function compare equal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.body).cast::<()>() as usize
    }
}

impl fmt::Debug for NativeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunc({})", self.sig)
    }
}

#[cfg(test)]
mod tests;
