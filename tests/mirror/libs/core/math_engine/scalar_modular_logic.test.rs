// [tests/mirror/libs/core/math_engine/scalar_modular_logic.test.rs]
/**
 * =================================================================
 * APARATO: SCALAR RING INTEGRITY TEST (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA ARITMÉTICA MODULO N
 * =================================================================
 */

use kangaroo_core_math::prelude::*;

fn order_minus_one() -> Scalar {
    let mut limbs = SECP256K1_CURVE_ORDER_N;
    limbs[0] -= 1;
    Scalar { scalar_limbs: limbs }
}

#[test]
fn certify_order_reduction() {
    let reduced_order = Scalar::from_limbs_reduced(SECP256K1_CURVE_ORDER_N);
    assert!(reduced_order.is_zero(), "REDUCTION_FAULT: n mod n != 0");
}

#[test]
fn certify_additive_wraparound() {
    // (n - 1) + 1 ≡ 0
    assert!(
        order_minus_one().add_mod_n(&Scalar::ONE).is_zero(),
        "RING_FAULT: (n - 1) + 1 != 0"
    );

    // 0 - 1 ≡ n - 1
    assert_eq!(
        Scalar::ZERO.subtract_mod_n(&Scalar::ONE),
        order_minus_one(),
        "RING_FAULT: 0 - 1 != n - 1"
    );

    // Acarreo de 2^256: (n - 1) + (n - 1) ≡ n - 2
    let mut expected_limbs = SECP256K1_CURVE_ORDER_N;
    expected_limbs[0] -= 2;
    assert_eq!(
        order_minus_one().add_mod_n(&order_minus_one()),
        Scalar { scalar_limbs: expected_limbs },
        "CARRY_FAULT: (n-1) + (n-1) != n - 2"
    );
}

#[test]
fn certify_signed_distance_integration() {
    let base = Scalar::from_u128(1_000_000);

    assert_eq!(base.add_signed_mod_n(-1_000_000), Scalar::ZERO);
    assert_eq!(base.add_signed_mod_n(500), Scalar::from_u128(1_000_500));

    // Distancia negativa mayor que el escalar: envoltura por n
    let wrapped = Scalar::ZERO.add_signed_mod_n(-1);
    assert_eq!(wrapped, order_minus_one(), "SIGNED_FAULT: 0 + (-1) != n - 1");
}

#[test]
fn certify_hex_and_byte_codecs() {
    let scalar = Scalar::from_hex("00000000000000000000000000000000000000000000000000000000DEADBEEF")
        .expect("HEX_PANIC");
    assert_eq!(
        scalar.to_hex(),
        "00000000000000000000000000000000000000000000000000000000DEADBEEF"
    );
    assert_eq!(Scalar::from_u256_be(&scalar.to_u256_be()), scalar);
    assert!(scalar.bit_at(0) && scalar.bit_at(31) && !scalar.bit_at(32));
}
