//! Primitive codec: bool, integers, floats, strings, bytes.
//!
//! Host integers of every width map to the script's single integer type and
//! come back at their declared width when a target type is known. Without a
//! target type (`from_value`), integers come back as `i64`, then `u64`, then
//! as a lossy `f64`.

use tether_native::{FloatKind, IntKind, NativeType, NativeValue, UintKind};
use tether_value::{numeric_overflow, type_mismatch, EvalError, Int, Value};

/// Script value for a primitive host value, `None` for anything else.
pub(crate) fn encode(native: &NativeValue) -> Option<Value> {
    Some(match native {
        NativeValue::Bool(b) => Value::Bool(*b),
        NativeValue::Int(_, n) => Value::int(*n),
        NativeValue::Uint(_, n) => Value::int(*n),
        NativeValue::Float(_, f) => Value::Float(*f),
        NativeValue::Str(s) => Value::string(s.as_str()),
        NativeValue::Bytes(b) => Value::bytes(b.as_slice()),
        _ => return None,
    })
}

/// Host value for a primitive script value, `None` for anything else.
pub(crate) fn decode(value: &Value) -> Option<NativeValue> {
    Some(match value {
        Value::Bool(b) => NativeValue::Bool(*b),
        Value::Int(n) => decode_int(*n),
        Value::Float(f) => NativeValue::Float(FloatKind::F64, *f),
        Value::Str(s) => NativeValue::Str(s.to_string()),
        Value::Bytes(b) => NativeValue::Bytes(b.to_vec()),
        _ => return None,
    })
}

fn decode_int(n: Int) -> NativeValue {
    if let Some(i) = n.to_i64() {
        return NativeValue::Int(IntKind::I64, i);
    }
    if let Some(u) = n.to_u64() {
        return NativeValue::Uint(UintKind::U64, u);
    }
    tracing::debug!(value = %n, "integer exceeds 64 bits, converting to f64");
    NativeValue::Float(FloatKind::F64, n.to_f64())
}

/// Coerce to a primitive target type. `None` when `ty` is not primitive.
pub(crate) fn coerce(value: &Value, ty: &NativeType) -> Option<Result<NativeValue, EvalError>> {
    let mismatch = || type_mismatch(&value.type_name(), &ty.to_string());
    let result = match ty {
        NativeType::Bool => value.as_bool().map(NativeValue::Bool).ok_or_else(mismatch),
        NativeType::Int(kind) => integral(value).ok_or_else(mismatch).and_then(|n| {
            i64::try_from(n)
                .ok()
                .filter(|_| kind.fits(n))
                .map(|i| NativeValue::Int(*kind, i))
                .ok_or_else(|| numeric_overflow(&n.to_string(), kind.name()))
        }),
        NativeType::Uint(kind) => integral(value).ok_or_else(mismatch).and_then(|n| {
            u64::try_from(n)
                .ok()
                .filter(|_| kind.fits(n))
                .map(|u| NativeValue::Uint(*kind, u))
                .ok_or_else(|| numeric_overflow(&n.to_string(), kind.name()))
        }),
        NativeType::Float(kind) => match value {
            Value::Float(f) => narrow_float(*f, *kind)
                .ok_or_else(|| numeric_overflow(&value.to_string(), kind.name())),
            Value::Int(n) => int_to_float(*n, *kind)
                .ok_or_else(|| numeric_overflow(&n.to_string(), kind.name())),
            _ => Err(mismatch()),
        },
        NativeType::Str => match value {
            Value::Str(s) => Ok(NativeValue::Str(s.to_string())),
            Value::Bytes(b) => String::from_utf8(b.to_vec())
                .map(NativeValue::Str)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        NativeType::Bytes => match value {
            Value::Bytes(b) => Ok(NativeValue::Bytes(b.to_vec())),
            Value::Str(s) => Ok(NativeValue::Bytes(s.as_bytes().to_vec())),
            _ => Err(mismatch()),
        },
        _ => return None,
    };
    Some(result)
}

/// Integer value of an int, or of a float with no fractional part.
fn integral(value: &Value) -> Option<i128> {
    match value {
        Value::Int(n) => Some(n.raw()),
        Value::Float(f) => {
            #[allow(clippy::cast_possible_truncation, reason = "checked by the round trip")]
            let n = *f as i128;
            #[allow(clippy::cast_precision_loss, reason = "checked by the round trip")]
            let exact = f.is_finite() && n as f64 == *f;
            exact.then_some(n)
        }
        _ => None,
    }
}

/// `f32` targets accept any finite value in range, rounding to nearest.
fn narrow_float(f: f64, kind: FloatKind) -> Option<NativeValue> {
    match kind {
        FloatKind::F64 => Some(NativeValue::Float(kind, f)),
        FloatKind::F32 => {
            #[allow(clippy::cast_possible_truncation, reason = "range checked below")]
            let narrowed = f as f32;
            (narrowed.is_finite() || !f.is_finite())
                .then(|| NativeValue::Float(kind, f64::from(narrowed)))
        }
    }
}

/// Ints convert to floats only when exactly representable.
fn int_to_float(n: Int, kind: FloatKind) -> Option<NativeValue> {
    let f = n.to_f64();
    #[allow(clippy::cast_possible_truncation, reason = "checked by the round trip")]
    let exact = match kind {
        FloatKind::F64 => f as i128 == n.raw(),
        FloatKind::F32 => f as f32 as i128 == n.raw(),
    };
    exact.then(|| match kind {
        FloatKind::F64 => NativeValue::Float(kind, f),
        #[allow(clippy::cast_possible_truncation, reason = "exactness checked above")]
        FloatKind::F32 => NativeValue::Float(kind, f64::from(f as f32)),
    })
}
