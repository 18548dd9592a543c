//! Property-based tests for the conversion engine.
//!
//! 1. Every primitive scalar survives host -> script -> host at its declared
//!    width.
//! 2. Narrow integer targets accept exactly the values that fit.
//! 3. Negative slice indexes address the same element as `len + i`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    reason = "Proptest strategies produce values of the needed range"
)]

use proptest::prelude::*;
use tether_convert::{from_value_as, to_value, SliceWrapper};
use tether_native::{FloatKind, IntKind, NativeType, NativeValue, UintKind};
use tether_value::Value;

fn round_trip(native: &NativeValue) -> NativeValue {
    let value = to_value(native).unwrap();
    from_value_as(&value, &native.native_type()).unwrap()
}

proptest! {
    #[test]
    fn bool_round_trip(b in any::<bool>()) {
        let native = NativeValue::Bool(b);
        prop_assert_eq!(round_trip(&native), native);
    }

    #[test]
    fn bytes_round_trip(b in prop::collection::vec(any::<u8>(), 0..64)) {
        let native = NativeValue::Bytes(b);
        prop_assert_eq!(round_trip(&native), native);
    }

    #[test]
    fn narrow_signed_round_trip(a in any::<i8>(), b in any::<i16>(), c in any::<i32>()) {
        for native in [
            NativeValue::Int(IntKind::I8, a.into()),
            NativeValue::Int(IntKind::I16, b.into()),
            NativeValue::Int(IntKind::I32, c.into()),
        ] {
            prop_assert_eq!(round_trip(&native), native);
        }
    }

    #[test]
    fn narrow_unsigned_round_trip(a in any::<u8>(), b in any::<u16>(), c in any::<u32>()) {
        for native in [
            NativeValue::Uint(UintKind::U8, a.into()),
            NativeValue::Uint(UintKind::U16, b.into()),
            NativeValue::Uint(UintKind::U32, c.into()),
        ] {
            prop_assert_eq!(round_trip(&native), native);
        }
    }

    #[test]
    fn f32_round_trip(
        x in prop::num::f32::NORMAL
            | prop::num::f32::SUBNORMAL
            | prop::num::f32::ZERO
            | prop::num::f32::INFINITE
    ) {
        let native = NativeValue::Float(FloatKind::F32, f64::from(x));
        prop_assert_eq!(round_trip(&native), native);
    }

    #[test]
    fn i64_round_trip(n in any::<i64>()) {
        let value = to_value(&n.into()).unwrap();
        let back = from_value_as(&value, &NativeType::Int(IntKind::I64)).unwrap();
        prop_assert_eq!(back, NativeValue::Int(IntKind::I64, n));
    }

    #[test]
    fn u64_round_trip(n in any::<u64>()) {
        let value = to_value(&n.into()).unwrap();
        let back = from_value_as(&value, &NativeType::Uint(UintKind::U64)).unwrap();
        prop_assert_eq!(back, NativeValue::Uint(UintKind::U64, n));
    }

    #[test]
    fn f64_round_trip(x in any::<f64>()) {
        let value = to_value(&x.into()).unwrap();
        let back = from_value_as(&value, &NativeType::Float(FloatKind::F64)).unwrap();
        prop_assert_eq!(back, NativeValue::Float(FloatKind::F64, x));
    }

    #[test]
    fn string_round_trip(s in ".*") {
        let value = to_value(&s.clone().into()).unwrap();
        prop_assert_eq!(value.as_str(), Some(s.as_str()));
        let back = from_value_as(&value, &NativeType::Str).unwrap();
        prop_assert_eq!(back, NativeValue::Str(s));
    }

    #[test]
    fn i8_targets_accept_exactly_what_fits(n in any::<i32>()) {
        let result = from_value_as(&Value::int(n), &NativeType::Int(IntKind::I8));
        prop_assert_eq!(result.is_ok(), i8::try_from(n).is_ok());
    }

    #[test]
    fn negative_indexes_mirror_positive(
        items in prop::collection::vec(any::<i64>(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let len = items.len();
        let native = NativeValue::slice(
            NativeType::Int(IntKind::I64),
            items.iter().map(|&n| n.into()).collect(),
        );
        let value = to_value(&native).unwrap();
        let slice = value.downcast_ref::<SliceWrapper>().unwrap();

        let i = pick.index(len);
        let negative = i as i64 - len as i64;
        prop_assert_eq!(slice.get(negative).unwrap(), slice.get(i as i64).unwrap());
        prop_assert_eq!(slice.get(i as i64).unwrap(), Value::int(items[i]));
    }
}
