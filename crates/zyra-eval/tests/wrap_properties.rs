//! Property tests for fixed-width wraparound.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use proptest::prelude::*;
use zyra_eval::arith::binary;
use zyra_eval::Value;
use zyra_types::ast::BinOp;
use zyra_types::IntType;

fn any_int_type() -> impl Strategy<Value = IntType> {
    proptest::sample::select(IntType::ALL.to_vec())
}

fn unsigned_type() -> impl Strategy<Value = IntType> {
    any_int_type().prop_filter("unsigned", |ty| !ty.is_signed())
}

fn signed_type() -> impl Strategy<Value = IntType> {
    any_int_type().prop_filter("signed", |ty| ty.is_signed())
}

fn add(a: &Value, b: &Value) -> Value {
    binary(BinOp::Add, a, b, 28).unwrap()
}

proptest! {
    #[test]
    fn wrap_stays_in_range(ty in any_int_type(), n in any::<i128>()) {
        let wrapped = ty.wrap(&BigInt::from(n));
        prop_assert!(ty.contains(&wrapped));
    }

    #[test]
    fn wrap_is_identity_in_range(ty in any_int_type(), n in any::<i8>()) {
        let n = BigInt::from(n);
        if ty.contains(&n) {
            prop_assert_eq!(ty.wrap(&n), n);
        }
    }

    #[test]
    fn wrap_is_congruent_modulo_width(ty in any_int_type(), n in any::<i64>()) {
        let n = BigInt::from(n);
        let diff = ty.wrap(&n) - &n;
        prop_assert!((diff % ty.modulus()).is_zero());
    }

    #[test]
    fn unsigned_complement_sums_to_zero(ty in unsigned_type(), v in any::<u64>()) {
        let v = BigInt::from(v) % ty.modulus();
        let a = Value::int(v.clone(), ty);
        let b = Value::int(ty.modulus() - v, ty);
        let sum = add(&a, &b);
        prop_assert_eq!(sum.type_name(), ty.name());
        prop_assert_eq!(sum.as_integer(), Some(&BigInt::zero()));
    }

    #[test]
    fn signed_max_plus_one_is_min(ty in signed_type()) {
        let max = Value::int(ty.max(), ty);
        let one = Value::int(BigInt::one(), ty);
        let sum = add(&max, &one);
        prop_assert_eq!(sum.as_integer(), Some(&ty.min()));
    }

    #[test]
    fn mixed_widths_take_wider_type(
        a in any_int_type(),
        b in any_int_type(),
        x in any::<i16>(),
        y in any::<i16>(),
    ) {
        let sum = add(&Value::int(BigInt::from(x), a), &Value::int(BigInt::from(y), b));
        let bits = match &sum {
            Value::Int(n, ty) => {
                prop_assert!(ty.contains(n));
                ty.bits()
            }
            other => return Err(TestCaseError::fail(format!("not an int: {other:?}"))),
        };
        prop_assert_eq!(bits, a.bits().max(b.bits()));
    }
}
