// [tests/mirror/libs/core/math_engine/arithmetic_integrity.test.rs]
/**
 * =================================================================
 * APARATO: ARITHMETIC KERNEL INTEGRITY TEST (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA ARITMÉTICA U256 CRUDA
 * =================================================================
 */

use kangaroo_core_math::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;

#[test]
fn certify_add_subtract_roundtrip() {
    let alpha = limbs_from_hex("DEADBEEFCAFEBABE0123456789ABCDEF").unwrap();
    let beta = limbs_from_hex("FFFFFFFFFFFFFFFF").unwrap();

    let (sum, carry) = add_limbs(&alpha, &beta);
    assert!(!carry, "CARRY_FAULT: small operands must not overflow");

    let (difference, borrow) = subtract_limbs(&sum, &beta);
    assert!(!borrow);
    assert_eq!(difference, alpha, "ROUNDTRIP_FAULT: (a + b) - b != a");
}

#[test]
fn certify_carry_and_borrow_propagation() {
    let all_ones = [u64::MAX; 4];
    let one = limbs_from_u128(1);

    let (wrapped, carry) = add_limbs(&all_ones, &one);
    assert!(carry, "CARRY_FAULT: 2^256 - 1 + 1 must carry out");
    assert!(is_zero_limbs(&wrapped));

    let (underflow, borrow) = subtract_limbs(&[0u64; 4], &one);
    assert!(borrow, "BORROW_FAULT: 0 - 1 must borrow");
    assert_eq!(underflow, all_ones);
}

#[test]
fn certify_comparison_and_bit_probes() {
    let low = limbs_from_u128(0x10);
    let high = limbs_from_hex("0100000000000000000000000000000000").unwrap();

    assert_eq!(compare_limbs(&low, &high), Ordering::Less);
    assert_eq!(compare_limbs(&high, &high), Ordering::Equal);

    assert_eq!(bit_length(&low), 5);
    assert_eq!(trailing_zero_bits(&low), 4);
    assert_eq!(trailing_zero_bits(&[0u64; 4]), 256);
    assert!(bit_at(&low, 4));
    assert!(!bit_at(&low, 3));
}

#[test]
fn certify_hex_and_byte_codecs() {
    let original_hex = "00000000000000000000000000000000000000000000000000000000DEADBEEF";
    let decoded = limbs_from_hex(original_hex).unwrap();
    assert_eq!(limbs_to_hex(&decoded), original_hex);

    let byte_roundtrip = limbs_from_be_bytes(&limbs_to_be_bytes(&decoded));
    assert_eq!(byte_roundtrip, decoded);

    assert!(limbs_from_hex("0xDEADBEEF").is_ok(), "PREFIX_FAULT: 0x prefix must be accepted");
    assert!(limbs_from_hex(&"F".repeat(65)).is_err(), "WIDTH_FAULT: 65 digits must be rejected");
}

#[test]
fn certify_bounded_random_sampling() {
    let mut entropy_source = StdRng::seed_from_u64(7);
    let exclusive_bound = limbs_from_u128(1_000_000);

    for _ in 0..2_000 {
        let sample = random_limbs_below(&exclusive_bound, &mut entropy_source);
        assert_eq!(
            compare_limbs(&sample, &exclusive_bound),
            Ordering::Less,
            "SAMPLING_FAULT: draw escaped the exclusive bound"
        );
    }
}
