//! Script view of host slices and fixed-length arrays.
//!
//! A `SliceWrapper` shares the host's storage: writes through the wrapper are
//! visible to the host and vice versa. Elements are converted on every read
//! and coerced to the element type on every write. Mutation is refused once
//! the wrapper is frozen and while any iterator over it is live. Arrays
//! accept element writes but nothing that changes their length.
//!
//! No lock on the storage is held while a script value is being coerced.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tether_native::{NativeType, NativeValue, SeqRef};
use tether_value::{
    element_not_found, fixed_length_violation, frozen_violation, index_out_of_range,
    invalid_index_type, mutation_during_iteration, no_such_method, not_assignable,
    value_not_found, EvalError, EvalResult, HasAttrs, Indexable, Iterable, ScriptObject, Value,
    ValueIter,
};

use crate::coerce::coerce;
use crate::config::WrapCtx;
use crate::dispatch::{freeze_reachable, to_value_in};
use crate::method::{
    optional_int_arg, require_args, require_args_between, require_int_arg, BuiltinMethod,
    MethodRecv,
};

/// Method names, sorted.
pub(crate) const SLICE_METHODS: &[&str] = &[
    "append", "clear", "extend", "find", "index", "insert", "pop", "remove",
];

#[derive(Debug)]
struct SliceState {
    seq: SeqRef,
    fixed: bool,
    ctx: WrapCtx,
    frozen: AtomicBool,
    iterators: AtomicUsize,
}

/// Host slice or array seen from a script.
#[derive(Clone, Debug)]
pub struct SliceWrapper(Arc<SliceState>);

impl SliceWrapper {
    pub(crate) fn new(seq: SeqRef, fixed: bool, ctx: &WrapCtx) -> Self {
        SliceWrapper(Arc::new(SliceState {
            seq,
            fixed,
            ctx: ctx.child(false),
            frozen: AtomicBool::new(ctx.frozen),
            iterators: AtomicUsize::new(0),
        }))
    }

    pub fn seq(&self) -> &SeqRef {
        &self.0.seq
    }

    pub fn is_fixed(&self) -> bool {
        self.0.fixed
    }

    /// The wrapped host value, sharing storage with the wrapper.
    pub fn to_native(&self) -> NativeValue {
        if self.0.fixed {
            NativeValue::Array(self.0.seq.clone())
        } else {
            NativeValue::Slice(self.0.seq.clone())
        }
    }

    pub fn len(&self) -> usize {
        self.0.seq.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    /// Whether an iterator over this wrapper is still live.
    pub fn is_iterating(&self) -> bool {
        self.0.iterators.load(Ordering::Acquire) > 0
    }

    fn elem(&self) -> NativeType {
        self.0.seq.read().elem.clone()
    }

    fn noun(&self) -> &'static str {
        if self.0.fixed {
            "array"
        } else {
            "slice"
        }
    }

    fn child_ctx(&self) -> WrapCtx {
        self.0.ctx.child(self.is_frozen())
    }

    fn convert(&self, item: &NativeValue) -> EvalResult {
        to_value_in(item, None, &self.child_ctx())
    }

    fn coerce_elem(&self, value: &Value, op: &str) -> Result<NativeValue, EvalError> {
        coerce(value, &self.elem(), &self.0.ctx.tag).map_err(|e| e.with_context(op))
    }

    fn check_mutable(&self, action: &str) -> Result<(), EvalError> {
        if self.is_frozen() {
            return Err(frozen_violation(action, self.noun()));
        }
        if self.is_iterating() {
            return Err(mutation_during_iteration(action, self.noun()));
        }
        Ok(())
    }

    fn check_resizable(&self, action: &str) -> Result<(), EvalError> {
        if self.0.fixed {
            return Err(fixed_length_violation(action, &self.type_name()));
        }
        Ok(())
    }

    #[cold]
    fn out_of_range(&self, index: impl Into<i128>) -> EvalError {
        index_out_of_range(&self.type_name(), index.into(), self.len())
    }

    /// Element at `index`; negative indexes count from the end.
    pub fn get(&self, index: i64) -> EvalResult {
        let item = {
            let data = self.0.seq.read();
            resolve_index(index, data.items.len()).map(|i| data.items[i].clone())
        };
        match item {
            Some(item) => self.convert(&item),
            None => Err(self.out_of_range(index)),
        }
    }

    pub fn set(&self, index: i64, value: &Value) -> Result<(), EvalError> {
        self.check_mutable("assign to")?;
        let native = self.coerce_elem(value, "index")?;
        let stored = {
            let mut data = self.0.seq.write();
            let len = data.items.len();
            resolve_index(index, len).map(|i| data.items[i] = native)
        };
        stored.ok_or_else(|| self.out_of_range(index))
    }

    pub fn append(&self, value: &Value) -> Result<(), EvalError> {
        self.check_mutable("append to")?;
        self.check_resizable("append to")?;
        let native = self.coerce_elem(value, "append")?;
        self.0.seq.write().items.push(native);
        Ok(())
    }

    /// Append every element of a script iterable.
    pub fn extend(&self, iterable: &Value) -> Result<(), EvalError> {
        self.check_mutable("extend")?;
        self.check_resizable("extend")?;
        let elem = self.elem();
        let tag = &self.0.ctx.tag;
        // Collected before locking: `iterable` may be this wrapper.
        let natives = iterable
            .iterate()?
            .map(|item| {
                item.and_then(|v| coerce(&v, &elem, tag).map_err(|e| e.with_context("extend")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.0.seq.write().items.extend(natives);
        Ok(())
    }

    /// Insert before `index`, clamped to `[0, len]`.
    pub fn insert(&self, index: i64, value: &Value) -> Result<(), EvalError> {
        self.check_mutable("insert into")?;
        self.check_resizable("insert into")?;
        let native = self.coerce_elem(value, "insert")?;
        let mut data = self.0.seq.write();
        let pos = clamp_index(index, data.items.len());
        data.items.insert(pos, native);
        Ok(())
    }

    /// Remove the first element equal to `value`.
    pub fn remove(&self, value: &Value) -> Result<(), EvalError> {
        self.check_mutable("remove from")?;
        self.check_resizable("remove from")?;
        let needle = self.coerce_elem(value, "remove")?;
        let removed = {
            let mut data = self.0.seq.write();
            let pos = data.items.iter().position(|item| item.same_value(&needle));
            pos.map(|i| data.items.remove(i))
        };
        match removed {
            Some(_) => Ok(()),
            None => Err(element_not_found(&value.to_string()).with_context("remove")),
        }
    }

    /// Remove and return the element at `index` (default: the last).
    pub fn pop(&self, index: Option<i64>) -> EvalResult {
        self.check_mutable("pop from")?;
        self.check_resizable("pop from")?;
        let index = index.unwrap_or(-1);
        let removed = {
            let mut data = self.0.seq.write();
            let len = data.items.len();
            resolve_index(index, len).map(|i| data.items.remove(i))
        };
        match removed {
            Some(item) => self.convert(&item),
            None => Err(self.out_of_range(index).with_context("pop")),
        }
    }

    /// Position of the first match in `[start, end)`, or an error.
    pub fn index(&self, value: &Value, start: Option<i64>, end: Option<i64>) -> Result<i64, EvalError> {
        self.search("index", value, start, end)?
            .ok_or_else(|| value_not_found(&value.to_string()).with_context("index"))
    }

    /// Position of the first match in `[start, end)`, or `-1`.
    pub fn find(&self, value: &Value, start: Option<i64>, end: Option<i64>) -> Result<i64, EvalError> {
        Ok(self.search("find", value, start, end)?.unwrap_or(-1))
    }

    fn search(
        &self,
        op: &str,
        value: &Value,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Option<i64>, EvalError> {
        let needle = self.coerce_elem(value, op)?;
        let data = self.0.seq.read();
        let len = data.items.len();
        let lo = clamp_index(start.unwrap_or(0), len);
        let hi = end.map_or(len, |end| clamp_index(end, len));
        Ok((lo..hi)
            .find(|&i| data.items[i].same_value(&needle))
            .and_then(|i| i64::try_from(i).ok()))
    }

    pub fn clear(&self) -> Result<(), EvalError> {
        self.check_mutable("clear")?;
        self.check_resizable("clear")?;
        self.0.seq.write().items.clear();
        Ok(())
    }

    fn index_arg(&self, index: &Value) -> Result<i64, EvalError> {
        match index {
            Value::Int(n) => n.to_i64().ok_or_else(|| self.out_of_range(n.raw())),
            other => Err(invalid_index_type(&self.type_name(), &other.type_name())),
        }
    }
}

/// Position for `index` in a sequence of `len`, if in range.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index < 0 { index.checked_add(len)? } else { index };
    (0..len).contains(&i).then(|| usize::try_from(i).ok()).flatten()
}

/// Slice bound: negative counts from the end, then clamped to `[0, len]`.
fn clamp_index(index: i64, len: usize) -> usize {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let i = if index < 0 { index.saturating_add(signed_len) } else { index };
    usize::try_from(i.clamp(0, signed_len)).unwrap_or(len)
}

pub(crate) fn call_method(slice: &SliceWrapper, method: &str, args: &[Value]) -> EvalResult {
    match method {
        "append" => {
            require_args(method, 1, args)?;
            slice.append(&args[0])?;
            Ok(Value::None)
        }
        "clear" => {
            require_args(method, 0, args)?;
            slice.clear()?;
            Ok(Value::None)
        }
        "extend" => {
            require_args(method, 1, args)?;
            slice.extend(&args[0])?;
            Ok(Value::None)
        }
        "find" | "index" => {
            require_args_between(method, 1, 3, args)?;
            let start = optional_int_arg(method, args.get(1))?;
            let end = optional_int_arg(method, args.get(2))?;
            let pos = if method == "find" {
                slice.find(&args[0], start, end)?
            } else {
                slice.index(&args[0], start, end)?
            };
            Ok(Value::int(pos))
        }
        "insert" => {
            require_args(method, 2, args)?;
            let index = require_int_arg(method, &args[0])?;
            slice.insert(index, &args[1])?;
            Ok(Value::None)
        }
        "pop" => {
            require_args_between(method, 0, 1, args)?;
            let index = optional_int_arg(method, args.first())?;
            slice.pop(index)
        }
        "remove" => {
            require_args(method, 1, args)?;
            slice.remove(&args[0])?;
            Ok(Value::None)
        }
        _ => Err(no_such_method(&slice.type_name(), method)),
    }
}

impl fmt::Display for SliceWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_native())
    }
}

impl ScriptObject for SliceWrapper {
    fn type_name(&self) -> String {
        let prefix = if self.0.fixed { "tether_array" } else { "tether_slice" };
        format!("{prefix}<{}>", self.to_native().native_type())
    }

    fn freeze(&self) {
        if !self.0.frozen.swap(true, Ordering::AcqRel) {
            freeze_reachable(&self.to_native());
        }
    }

    fn truth(&self) -> bool {
        !self.is_empty()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_attrs(&self) -> Option<&dyn HasAttrs> {
        Some(self)
    }

    fn as_indexable(&self) -> Option<&dyn Indexable> {
        Some(self)
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }
}

impl HasAttrs for SliceWrapper {
    fn attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(SLICE_METHODS
            .iter()
            .copied()
            .find(|m| *m == name)
            .map(|m| Value::object(BuiltinMethod::new(m, MethodRecv::Slice(self.clone())))))
    }

    fn attr_names(&self) -> Vec<String> {
        SLICE_METHODS.iter().map(|m| (*m).to_string()).collect()
    }

    fn set_attr(&self, name: &str, _value: Value) -> Result<(), EvalError> {
        Err(not_assignable(name))
    }
}

impl Indexable for SliceWrapper {
    fn len(&self) -> usize {
        SliceWrapper::len(self)
    }

    fn get_index(&self, index: &Value) -> EvalResult {
        self.get(self.index_arg(index)?)
    }

    fn set_index(&self, index: &Value, value: Value) -> Result<(), EvalError> {
        self.set(self.index_arg(index)?, &value)
    }
}

impl Iterable for SliceWrapper {
    fn iterate(&self) -> ValueIter {
        self.0.iterators.fetch_add(1, Ordering::AcqRel);
        Box::new(SliceIter {
            slice: self.clone(),
            next: 0,
            done: false,
        })
    }
}

/// Iterator over a slice wrapper. Mutation of the slice is refused until it
/// is exhausted or dropped.
struct SliceIter {
    slice: SliceWrapper,
    next: usize,
    done: bool,
}

impl SliceIter {
    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.slice.0.iterators.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl Iterator for SliceIter {
    type Item = EvalResult;

    fn next(&mut self) -> Option<EvalResult> {
        if self.done {
            return None;
        }
        let item = self.slice.0.seq.read().items.get(self.next).cloned();
        match item {
            Some(item) => {
                self.next += 1;
                Some(self.slice.convert(&item))
            }
            None => {
                self.finish();
                None
            }
        }
    }
}

impl Drop for SliceIter {
    fn drop(&mut self) {
        self.finish();
    }
}
